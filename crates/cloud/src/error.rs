/// Error type for calls to the managed cloud services.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The requested object does not exist.
    #[error("Object s3://{bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    /// Any other object store failure (permissions, network, etc.).
    #[error("Object store error: {0}")]
    ObjectStore(String),

    /// The inference endpoint call failed.
    #[error("Inference endpoint error: {0}")]
    Inference(String),

    /// The record table write failed.
    #[error("Record store error: {0}")]
    RecordStore(String),

    /// Reading or writing the local working file failed.
    #[error("Local file error: {0}")]
    Io(#[from] std::io::Error),
}
