//! Domain types shared by the batch inference job runner.
//!
//! - [`config`] -- validated job configuration loaded from the environment.
//! - [`record`] -- the [`JobRecord`](record::JobRecord) audit entity.
//! - [`naming`] -- object key, timestamp and duration formatting.
//! - [`joblog`] -- the `File: {name} {LEVEL}: {message}` job log.
//! - [`clock`] -- wall-clock abstraction used for job timing.

pub mod clock;
pub mod config;
pub mod error;
pub mod joblog;
pub mod naming;
pub mod record;
