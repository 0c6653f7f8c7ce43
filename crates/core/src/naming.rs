//! Object key, timestamp, and duration naming conventions.
//!
//! All job artefacts are named deterministically from the input file
//! name and the job's end time, so the record written to the table and
//! the object uploaded to the bucket always agree.

use chrono::{Duration, NaiveDateTime};

/// Default key prefix for input objects.
pub const DEFAULT_INPUT_PREFIX: &str = "input/";

/// Default key prefix for output objects.
pub const DEFAULT_OUTPUT_PREFIX: &str = "output/";

/// Extension appended to every output object.
pub const OUTPUT_EXTENSION: &str = ".csv";

/// `MM-DD-YYYY-HH:MM:SS.mmm`
const TIMESTAMP_FORMAT: &str = "%m-%d-%Y-%H:%M:%S%.3f";

/// Strip any `/`-separated path prefix from an object name.
///
/// `"uploads/2024/sample.csv"` becomes `"sample.csv"`.
pub fn strip_path_prefix(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// The part of a file name before its first `.`.
///
/// ```
/// use batchjob_core::naming::base_name;
///
/// assert_eq!(base_name("sample.csv"), "sample");
/// assert_eq!(base_name("a.b.csv"), "a");
/// assert_eq!(base_name("noext"), "noext");
/// ```
pub fn base_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Key of the input object: `{prefix}{file_name}`.
pub fn input_key(prefix: &str, file_name: &str) -> String {
    format!("{prefix}{file_name}")
}

/// Key of the output object: `{prefix}{end_time}-{base_name}.csv`.
pub fn output_key(prefix: &str, end_time: NaiveDateTime, file_name: &str) -> String {
    format!(
        "{prefix}{}-{}{OUTPUT_EXTENSION}",
        format_timestamp(end_time),
        base_name(file_name),
    )
}

/// Full `s3://` URI of an object.
pub fn object_uri(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

/// Format a timestamp as `MM-DD-YYYY-HH:MM:SS.mmm` (milliseconds truncated).
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Whole elapsed seconds with an `s` suffix, e.g. `"42s"`.
///
/// Negative durations (clock moved backwards) are reported as `"0s"`.
pub fn format_duration(elapsed: Duration) -> String {
    format!("{}s", elapsed.num_seconds().max(0))
}
