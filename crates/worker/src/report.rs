//! Outcome summary of one job run.

use batchjob_core::config::FailurePolicy;
use batchjob_core::record::JobRecord;
use serde::Serialize;

use crate::error::{JobError, JobStep};

/// Process exit code for a job that completed every step.
pub const EXIT_SUCCESS: u8 = 0;

/// Process exit code for a job with at least one failed step under
/// [`FailurePolicy::Abort`].
pub const EXIT_STEP_FAILED: u8 = 1;

/// A step that failed, with its rendered error.
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub step: JobStep,
    pub message: String,
}

impl From<&JobError> for StepFailure {
    fn from(err: &JobError) -> Self {
        Self {
            step: err.step(),
            message: err.to_string(),
        }
    }
}

/// What a job run did. Returned by
/// [`JobCoordinator::run`](crate::coordinator::JobCoordinator::run).
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub file_name: String,
    pub policy: FailurePolicy,
    /// The record, if it was written to the table.
    pub record: Option<JobRecord>,
    /// Key of the uploaded result object, if the upload succeeded.
    pub output_key: Option<String>,
    pub failures: Vec<StepFailure>,
    /// Steps not attempted because an earlier step failed under `Abort`.
    pub skipped: Vec<JobStep>,
    /// Whole seconds between job start and the timing measurement.
    pub elapsed_secs: i64,
}

impl JobReport {
    pub fn new(file_name: impl Into<String>, policy: FailurePolicy) -> Self {
        Self {
            file_name: file_name.into(),
            policy,
            record: None,
            output_key: None,
            failures: Vec::new(),
            skipped: Vec::new(),
            elapsed_secs: 0,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// First failure, if any.
    pub fn first_failure(&self) -> Option<&StepFailure> {
        self.failures.first()
    }

    pub fn failed_steps(&self) -> Vec<JobStep> {
        self.failures.iter().map(|f| f.step).collect()
    }

    /// Exit code for the process.
    ///
    /// Under [`FailurePolicy::Continue`] the job always exits 0: failures
    /// are only visible in the job log.
    pub fn exit_code(&self) -> u8 {
        match self.policy {
            FailurePolicy::Continue => EXIT_SUCCESS,
            FailurePolicy::Abort if self.succeeded() => EXIT_SUCCESS,
            FailurePolicy::Abort => EXIT_STEP_FAILED,
        }
    }
}
