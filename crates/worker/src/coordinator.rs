//! Sequencing of a single batch job.
//!
//! [`JobCoordinator::run`] performs, in order:
//!
//! 1. download `{input_prefix}{file_name}` into the local working file,
//! 2. send the file to the inference endpoint and overwrite it with the response,
//! 3. measure elapsed time and write the [`JobRecord`] to the record table,
//! 4. upload the working file to `{output_prefix}{end_time}-{base}.csv`.
//!
//! Every step returns its own [`JobError`]. What happens after a failure is
//! decided by the configured [`FailurePolicy`]. The elapsed-time measurement
//! in step 3 cannot fail and always runs, so every job logs exactly one
//! start line and one elapsed line.

use std::path::Path;
use std::sync::Arc;

use batchjob_cloud::{InferenceClient, ObjectStore, RecordStore};
use batchjob_core::clock::{Clock, SystemClock};
use batchjob_core::config::{FailurePolicy, JobConfig};
use batchjob_core::joblog::JobLogger;
use batchjob_core::naming;
use batchjob_core::record::JobRecord;
use tracing::Instrument;

use crate::error::{JobError, JobStep};
use crate::report::{JobReport, StepFailure};

/// Job log message for the start of a job.
pub const MSG_JOB_STARTED: &str = "Starting Processing Batch Job";

/// Prefix of the job log message reporting elapsed time.
pub const MSG_ELAPSED_PREFIX: &str = "Total processing time - ";

/// Runs one job against the configured collaborators.
pub struct JobCoordinator {
    config: JobConfig,
    object_store: Arc<dyn ObjectStore>,
    inference: Arc<dyn InferenceClient>,
    records: Arc<dyn RecordStore>,
    logger: JobLogger,
    clock: Arc<dyn Clock>,
}

impl JobCoordinator {
    pub fn new(
        config: JobConfig,
        object_store: Arc<dyn ObjectStore>,
        inference: Arc<dyn InferenceClient>,
        records: Arc<dyn RecordStore>,
        logger: JobLogger,
    ) -> Self {
        Self {
            config,
            object_store,
            inference,
            records,
            logger,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock used for job timing.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run the job to completion. Never panics and never returns an error;
    /// the outcome is in the returned [`JobReport`] and the job log.
    pub async fn run(&self) -> JobReport {
        let span = tracing::info_span!(
            "batch_job",
            file = %self.config.file_name,
            bucket = %self.config.input_bucket,
            policy = %self.config.failure_policy,
        );
        self.run_steps().instrument(span).await
    }

    async fn run_steps(&self) -> JobReport {
        let config = &self.config;
        let file = config.file_name.as_str();
        let local_path = config.local_path();
        let mut report = JobReport::new(file, config.failure_policy);

        self.logger.info(file, MSG_JOB_STARTED);
        tracing::info!(path = %local_path.display(), "Job started");

        let start = self.clock.now();
        let mut halted = false;

        // Download
        if let Err(e) = self.download(&local_path).await {
            halted = self.fail(&mut report, &e);
        }

        // Infer and overwrite the working file
        if halted {
            self.skip(&mut report, JobStep::Infer);
        } else if let Err(e) = self.infer(&local_path).await {
            halted = self.fail(&mut report, &e);
        }

        // Timing
        let end = self.clock.now();
        let elapsed = end - start;
        report.elapsed_secs = elapsed.num_seconds().max(0);
        self.logger.info(
            file,
            &format!("{MSG_ELAPSED_PREFIX}{}", naming::format_duration(elapsed)),
        );

        // Record
        if halted {
            self.skip(&mut report, JobStep::Record);
        } else {
            let record = JobRecord::new(
                file,
                &config.input_bucket,
                &config.output_prefix,
                start,
                end,
            );
            match self.record(&record).await {
                Ok(()) => report.record = Some(record),
                Err(e) => halted = self.fail(&mut report, &e),
            }
        }

        // Upload
        if halted {
            self.skip(&mut report, JobStep::Upload);
        } else {
            let key = naming::output_key(&config.output_prefix, end, file);
            match self.upload(&local_path, &key).await {
                Ok(()) => report.output_key = Some(key),
                Err(e) => {
                    self.fail(&mut report, &e);
                }
            }
        }

        tracing::info!(
            succeeded = report.succeeded(),
            failures = report.failures.len(),
            elapsed_secs = report.elapsed_secs,
            "Job finished",
        );
        report
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    async fn download(&self, local_path: &Path) -> Result<(), JobError> {
        let bucket = &self.config.input_bucket;
        let key = self.config.input_key();

        let bytes = self
            .object_store
            .download(bucket, &key, local_path)
            .await
            .map_err(|source| JobError::Download {
                bucket: bucket.clone(),
                key: key.clone(),
                source,
            })?;

        self.logger.debug(
            &self.config.file_name,
            &format!(
                "Downloaded {bytes} bytes from {} to {}",
                naming::object_uri(bucket, &key),
                local_path.display()
            ),
        );
        Ok(())
    }

    async fn infer(&self, local_path: &Path) -> Result<(), JobError> {
        let endpoint = &self.config.endpoint_name;

        let payload = tokio::fs::read(local_path)
            .await
            .map_err(|source| JobError::ReadPayload {
                path: local_path.to_path_buf(),
                source,
            })?;

        self.logger.debug(
            &self.config.file_name,
            &format!(
                "Invoking endpoint {endpoint} with {} bytes as {}",
                payload.len(),
                self.config.content_type
            ),
        );

        let response = self
            .inference
            .invoke(endpoint, &self.config.content_type, payload)
            .await
            .map_err(|source| JobError::Inference {
                endpoint: endpoint.clone(),
                source,
            })?;

        tokio::fs::write(local_path, &response)
            .await
            .map_err(|source| JobError::WriteResult {
                path: local_path.to_path_buf(),
                source,
            })?;

        self.logger.debug(
            &self.config.file_name,
            &format!(
                "Wrote {} bytes of inference output to {}",
                response.len(),
                local_path.display()
            ),
        );
        Ok(())
    }

    async fn record(&self, record: &JobRecord) -> Result<(), JobError> {
        let table = &self.config.table_name;

        self.records
            .put_record(table, record)
            .await
            .map_err(|source| JobError::Record {
                table: table.clone(),
                source,
            })?;

        self.logger.info(
            &self.config.file_name,
            &format!("Added batch job details to {table}"),
        );
        Ok(())
    }

    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), JobError> {
        let bucket = &self.config.input_bucket;

        let bytes = self
            .object_store
            .upload(local_path, bucket, key)
            .await
            .map_err(|source| JobError::Upload {
                bucket: bucket.clone(),
                key: key.to_string(),
                source,
            })?;

        self.logger.debug(
            &self.config.file_name,
            &format!("Uploaded {bytes} bytes to {}", naming::object_uri(bucket, key)),
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Failure bookkeeping
    // -----------------------------------------------------------------------

    /// Log and record a step failure. Returns `true` if the remaining
    /// steps must be skipped.
    fn fail(&self, report: &mut JobReport, err: &JobError) -> bool {
        let step = err.step();
        self.logger.error(&self.config.file_name, &err.to_string());
        tracing::error!(step = step.as_str(), error = %err, "Job step failed");
        report.failures.push(StepFailure::from(err));

        self.config.failure_policy == FailurePolicy::Abort
    }

    fn skip(&self, report: &mut JobReport, step: JobStep) {
        self.logger.debug(
            &self.config.file_name,
            &format!("Skipping {} step after earlier failure", step.as_str()),
        );
        report.skipped.push(step);
    }
}
