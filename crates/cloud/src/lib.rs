//! Managed cloud service clients used by the batch job runner.
//!
//! Each service sits behind an `async_trait` so the job coordinator can
//! run against in-memory implementations in tests:
//!
//! - [`ObjectStore`] -- bucket/key blob storage, backed by S3.
//! - [`InferenceClient`] -- hosted model endpoint, backed by SageMaker runtime.
//! - [`RecordStore`] -- key-value audit table, backed by DynamoDB.

pub mod error;
pub mod inference;
pub mod records;
pub mod storage;

use aws_config::{BehaviorVersion, Region};

pub use error::CloudError;
pub use inference::{InferenceClient, SageMakerInference};
pub use records::{DynamoRecordStore, RecordStore};
pub use storage::{ObjectStore, S3ObjectStore};

/// The three AWS-backed clients a job needs, sharing one SDK config.
pub struct AwsClients {
    pub object_store: S3ObjectStore,
    pub inference: SageMakerInference,
    pub records: DynamoRecordStore,
}

impl AwsClients {
    /// Load credentials from the default provider chain and build every
    /// client for `region`.
    pub async fn connect(region: &str) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        tracing::debug!(region, "AWS SDK configuration loaded");

        Self {
            object_store: S3ObjectStore::new(aws_sdk_s3::Client::new(&sdk_config)),
            inference: SageMakerInference::new(aws_sdk_sagemakerruntime::Client::new(&sdk_config)),
            records: DynamoRecordStore::new(aws_sdk_dynamodb::Client::new(&sdk_config)),
        }
    }
}
