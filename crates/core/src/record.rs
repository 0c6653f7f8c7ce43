//! The per-job audit record written to the record table.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::naming;

// ---------------------------------------------------------------------------
// Attribute names
// ---------------------------------------------------------------------------

/// Partition key attribute.
pub const ATTR_FILE_NAME: &str = "FileName";
pub const ATTR_START_TIME: &str = "StartTime";
pub const ATTR_END_TIME: &str = "EndTime";
pub const ATTR_PROCESSING_TIME: &str = "ProcessingTime";
pub const ATTR_OUTPUT_PATH: &str = "OutputPath";

// ---------------------------------------------------------------------------
// JobRecord
// ---------------------------------------------------------------------------

/// Completion record for one job execution.
///
/// Built once after inference, persisted once, then discarded. All
/// fields are pre-formatted strings because the table stores them as
/// such.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub file_name: String,
    pub input_bucket: String,
    /// `MM-DD-YYYY-HH:MM:SS.mmm`
    pub start_time: String,
    /// `MM-DD-YYYY-HH:MM:SS.mmm`
    pub end_time: String,
    /// Whole seconds with an `s` suffix.
    pub processing_duration: String,
    /// `s3://{bucket}/{output_key}`; always the key the upload step uses.
    pub output_path: String,
}

impl JobRecord {
    /// Build a record for a job that ran from `start` to `end`.
    pub fn new(
        file_name: &str,
        input_bucket: &str,
        output_prefix: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        let key = naming::output_key(output_prefix, end, file_name);
        Self {
            file_name: file_name.to_string(),
            input_bucket: input_bucket.to_string(),
            start_time: naming::format_timestamp(start),
            end_time: naming::format_timestamp(end),
            processing_duration: naming::format_duration(end - start),
            output_path: naming::object_uri(input_bucket, &key),
        }
    }

    /// The five flat string attributes persisted to the table, key first.
    ///
    /// `input_bucket` is not stored separately; it is embedded in
    /// `OutputPath`.
    pub fn attributes(&self) -> [(&'static str, &str); 5] {
        [
            (ATTR_FILE_NAME, self.file_name.as_str()),
            (ATTR_START_TIME, self.start_time.as_str()),
            (ATTR_END_TIME, self.end_time.as_str()),
            (ATTR_PROCESSING_TIME, self.processing_duration.as_str()),
            (ATTR_OUTPUT_PATH, self.output_path.as_str()),
        ]
    }
}
