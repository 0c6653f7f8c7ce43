//! Hosted inference endpoint invocation.

use async_trait::async_trait;
use aws_sdk_sagemakerruntime::error::DisplayErrorContext;
use aws_sdk_sagemakerruntime::primitives::Blob;

use crate::error::CloudError;

/// A remote model endpoint called with a declared content type.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Send `body` to `endpoint` and return the raw response bytes.
    ///
    /// The response is not inspected or validated.
    async fn invoke(
        &self,
        endpoint: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, CloudError>;
}

/// [`InferenceClient`] backed by the SageMaker runtime `InvokeEndpoint` API.
#[derive(Debug, Clone)]
pub struct SageMakerInference {
    client: aws_sdk_sagemakerruntime::Client,
}

impl SageMakerInference {
    pub fn new(client: aws_sdk_sagemakerruntime::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InferenceClient for SageMakerInference {
    async fn invoke(
        &self,
        endpoint: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, CloudError> {
        let request_bytes = body.len();

        let output = self
            .client
            .invoke_endpoint()
            .endpoint_name(endpoint)
            .content_type(content_type)
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| CloudError::Inference(DisplayErrorContext(&e).to_string()))?;

        // An absent body is treated as an empty response.
        let response = output.body.map(Blob::into_inner).unwrap_or_default();

        tracing::debug!(
            endpoint,
            request_bytes,
            response_bytes = response.len(),
            "Inference endpoint invoked",
        );
        Ok(response)
    }
}
