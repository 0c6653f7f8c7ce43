//! Job configuration loaded from environment variables.
//!
//! Everything the job needs is read and validated once at startup by
//! [`JobConfig::from_env`]; nothing downstream touches the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;
use crate::naming;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default inference endpoint name.
pub const DEFAULT_ENDPOINT_NAME: &str = "Detection-EndPoint";

/// Default record table name.
pub const DEFAULT_TABLE_NAME: &str = "BatchProcessingJob";

/// Content type declared for every inference request, whatever the file type.
pub const DEFAULT_CONTENT_TYPE: &str = "text/csv";

/// Value of `DEBUG` that enables DEBUG-level job log lines.
pub const DEBUG_SENTINEL: &str = "LOGTYPE";

// ---------------------------------------------------------------------------
// FailurePolicy
// ---------------------------------------------------------------------------

/// What the coordinator does after a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Skip every remaining fallible step after the first failure.
    #[default]
    Abort,
    /// Log the failure and attempt every later step anyway.
    Continue,
}

impl FailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Continue => "continue",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            _ => Err(ConfigError::Invalid {
                var: "FAILURE_POLICY",
                value: s.to_string(),
                reason: "must be one of: abort, continue".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// JobConfig
// ---------------------------------------------------------------------------

/// Validated configuration for a single job run.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Bucket holding both the input and output prefixes.
    pub input_bucket: String,
    /// Object name with any path prefix stripped.
    pub file_name: String,
    /// Region used by every cloud client.
    pub region: String,
    /// Whether DEBUG job log lines are emitted.
    pub debug: bool,
    pub endpoint_name: String,
    pub table_name: String,
    pub content_type: String,
    pub input_prefix: String,
    pub output_prefix: String,
    /// Scratch directory for the local working file.
    pub work_dir: PathBuf,
    pub failure_policy: FailurePolicy,
}

impl JobConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var          | Required | Default              |
    /// |------------------|----------|----------------------|
    /// | `INPUT_BUCKET`   | yes      | --                   |
    /// | `FILE_NAME`      | yes      | --                   |
    /// | `REGION`         | yes      | --                   |
    /// | `DEBUG`          | no       | unset                |
    /// | `ENDPOINT_NAME`  | no       | `Detection-EndPoint` |
    /// | `TABLE_NAME`     | no       | `BatchProcessingJob` |
    /// | `CONTENT_TYPE`   | no       | `text/csv`           |
    /// | `INPUT_PREFIX`   | no       | `input/`             |
    /// | `OUTPUT_PREFIX`  | no       | `output/`            |
    /// | `WORK_DIR`       | no       | OS temp dir          |
    /// | `FAILURE_POLICY` | no       | `abort`              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input_bucket = required(&lookup, "INPUT_BUCKET")?;
        let raw_file_name = required(&lookup, "FILE_NAME")?;
        let region = required(&lookup, "REGION")?;

        let file_name = naming::strip_path_prefix(&raw_file_name).to_string();
        if matches!(file_name.as_str(), "" | "." | "..") {
            return Err(ConfigError::Invalid {
                var: "FILE_NAME",
                value: raw_file_name,
                reason: "does not name a file".into(),
            });
        }

        let debug = lookup("DEBUG").as_deref() == Some(DEBUG_SENTINEL);

        let failure_policy = match lookup("FAILURE_POLICY") {
            Some(v) if !v.trim().is_empty() => v.parse()?,
            _ => FailurePolicy::default(),
        };

        let work_dir = lookup("WORK_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        Ok(Self {
            input_bucket,
            file_name,
            region,
            debug,
            endpoint_name: optional(&lookup, "ENDPOINT_NAME", DEFAULT_ENDPOINT_NAME),
            table_name: optional(&lookup, "TABLE_NAME", DEFAULT_TABLE_NAME),
            content_type: optional(&lookup, "CONTENT_TYPE", DEFAULT_CONTENT_TYPE),
            input_prefix: optional(&lookup, "INPUT_PREFIX", naming::DEFAULT_INPUT_PREFIX),
            output_prefix: optional(&lookup, "OUTPUT_PREFIX", naming::DEFAULT_OUTPUT_PREFIX),
            work_dir,
            failure_policy,
        })
    }

    /// Local path reused for both the downloaded input and the inference result.
    pub fn local_path(&self) -> PathBuf {
        self.work_dir.join(&self.file_name)
    }

    /// Key of the input object inside the bucket.
    pub fn input_key(&self) -> String {
        naming::input_key(&self.input_prefix, &self.file_name)
    }
}

/// Helper: read a variable that must be present and non-blank.
fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Err(ConfigError::Missing(var)),
        Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(var)),
        Some(v) => Ok(v.trim().to_string()),
    }
}

/// Helper: read a variable, falling back to `default` when unset or blank.
fn optional<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
