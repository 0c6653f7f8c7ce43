//! Job record persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use batchjob_core::record::JobRecord;

use crate::error::CloudError;

/// Key-value table holding one audit record per job.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put_record(&self, table: &str, record: &JobRecord) -> Result<(), CloudError>;
}

/// Convert a record into a DynamoDB item of five string attributes.
pub fn record_item(record: &JobRecord) -> HashMap<String, AttributeValue> {
    record
        .attributes()
        .into_iter()
        .map(|(name, value)| (name.to_string(), AttributeValue::S(value.to_string())))
        .collect()
}

/// [`RecordStore`] backed by DynamoDB `PutItem`.
#[derive(Debug, Clone)]
pub struct DynamoRecordStore {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoRecordStore {
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn put_record(&self, table: &str, record: &JobRecord) -> Result<(), CloudError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(record_item(record)))
            .send()
            .await
            .map_err(|e| CloudError::RecordStore(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(table, file_name = %record.file_name, "Job record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchjob_core::record::{ATTR_FILE_NAME, ATTR_OUTPUT_PATH};
    use chrono::NaiveDate;

    fn sample_record() -> JobRecord {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        JobRecord::new(
            "sample.csv",
            "b",
            "output/",
            day.and_hms_opt(9, 0, 0).unwrap(),
            day.and_hms_opt(9, 0, 7).unwrap(),
        )
    }

    #[test]
    fn item_has_five_string_attributes() {
        let item = record_item(&sample_record());

        assert_eq!(item.len(), 5);
        assert!(item.values().all(|v| v.is_s()));
    }

    #[test]
    fn item_values_match_record() {
        let item = record_item(&sample_record());

        assert_eq!(
            item.get(ATTR_FILE_NAME),
            Some(&AttributeValue::S("sample.csv".into()))
        );
        assert_eq!(
            item.get(ATTR_OUTPUT_PATH),
            Some(&AttributeValue::S(
                "s3://b/output/01-02-2024-09:00:07.000-sample.csv".into()
            ))
        );
        assert_eq!(
            item.get("ProcessingTime"),
            Some(&AttributeValue::S("7s".into()))
        );
    }
}
