//! `batchjob-worker` library crate.
//!
//! Holds the job coordinator and its report types; the binary entrypoint
//! lives in `main.rs`.

pub mod coordinator;
pub mod error;
pub mod report;

pub use coordinator::JobCoordinator;
pub use error::{JobError, JobStep};
pub use report::{JobReport, StepFailure};
