//! Per-step job errors.

use std::path::PathBuf;

use batchjob_cloud::CloudError;

/// Failure of one coordinator step. Each variant names the step it came from.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Error retrieving {key} from bucket {bucket}: {source}")]
    Download {
        bucket: String,
        key: String,
        #[source]
        source: CloudError,
    },

    #[error("Error reading local payload {}: {source}", .path.display())]
    ReadPayload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error invoking inference endpoint {endpoint}: {source}")]
    Inference {
        endpoint: String,
        #[source]
        source: CloudError,
    },

    #[error("Error writing inference result to {}: {source}", .path.display())]
    WriteResult {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error adding batch job details to table {table}: {source}")]
    Record {
        table: String,
        #[source]
        source: CloudError,
    },

    #[error("Error uploading {key} to bucket {bucket}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: CloudError,
    },
}

impl JobError {
    /// The step that produced this error.
    pub fn step(&self) -> JobStep {
        match self {
            Self::Download { .. } => JobStep::Download,
            Self::ReadPayload { .. } | Self::Inference { .. } | Self::WriteResult { .. } => {
                JobStep::Infer
            }
            Self::Record { .. } => JobStep::Record,
            Self::Upload { .. } => JobStep::Upload,
        }
    }
}

/// The four fallible stages of a job, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStep {
    Download,
    Infer,
    Record,
    Upload,
}

impl JobStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Infer => "infer",
            Self::Record => "record",
            Self::Upload => "upload",
        }
    }
}
