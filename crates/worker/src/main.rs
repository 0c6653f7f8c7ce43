//! `batchjob-worker` -- runs one batch inference job and exits.
//!
//! Downloads one input object, sends it to a hosted inference endpoint,
//! records a completion entry in the job table, and uploads the result.
//! Job log lines go to stdout; diagnostic tracing goes to stderr.
//!
//! # Environment variables
//!
//! | Variable         | Required | Default              | Description                               |
//! |------------------|----------|----------------------|-------------------------------------------|
//! | `INPUT_BUCKET`   | yes      | --                   | Bucket with `input/` and `output/` keys   |
//! | `FILE_NAME`      | yes      | --                   | Input object name (path prefix stripped)  |
//! | `REGION`         | yes      | --                   | AWS region for every client               |
//! | `DEBUG`          | no       | --                   | `LOGTYPE` enables DEBUG job log lines     |
//! | `ENDPOINT_NAME`  | no       | `Detection-EndPoint` | Inference endpoint name                   |
//! | `TABLE_NAME`     | no       | `BatchProcessingJob` | Job record table                          |
//! | `CONTENT_TYPE`   | no       | `text/csv`           | Declared inference content type           |
//! | `INPUT_PREFIX`   | no       | `input/`             | Input key prefix                          |
//! | `OUTPUT_PREFIX`  | no       | `output/`            | Output key prefix                         |
//! | `WORK_DIR`       | no       | OS temp dir          | Local scratch directory                   |
//! | `FAILURE_POLICY` | no       | `abort`              | `abort` or `continue` after a failed step |

use std::process::ExitCode;
use std::sync::Arc;

use batchjob_cloud::AwsClients;
use batchjob_core::config::JobConfig;
use batchjob_core::joblog::JobLogger;
use batchjob_worker::JobCoordinator;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code for an invalid configuration; no job step is attempted.
const EXIT_CONFIG_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "batchjob_worker=info,batchjob_cloud=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match JobConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid job configuration");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    tracing::info!(
        bucket = %config.input_bucket,
        file = %config.file_name,
        region = %config.region,
        endpoint = %config.endpoint_name,
        table = %config.table_name,
        policy = %config.failure_policy,
        "Starting batchjob-worker",
    );

    let clients = AwsClients::connect(&config.region).await;
    let logger = JobLogger::stdout(config.debug);

    let coordinator = JobCoordinator::new(
        config,
        Arc::new(clients.object_store),
        Arc::new(clients.inference),
        Arc::new(clients.records),
        logger,
    );

    let report = coordinator.run().await;

    match serde_json::to_string(&report) {
        Ok(json) => tracing::debug!(report = %json, "Job report"),
        Err(e) => tracing::warn!(error = %e, "Failed to serialise job report"),
    }

    ExitCode::from(report.exit_code())
}
