use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use cadence_types::GenerationRequest;

use crate::traits::{ChunkStream, GenerationClient};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Generation service reached over HTTP (`POST {base_url}/chat`)
pub struct HttpGenerationClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpGenerationClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_connect_timeout(base_url, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Only connection setup is bounded; a response body may stream for as
    /// long as the service keeps producing.
    pub fn with_connect_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/plain"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn stream_chat(&self, request: GenerationRequest) -> Result<ChunkStream> {
        tracing::debug!(
            chat_id = %request.chat_id,
            messages = request.messages.len(),
            "Opening generation stream"
        );

        let response = self
            .http_client
            .post(format!("{}/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Generation service error ({}): {}", status, error_text);
        }

        let chunks = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| anyhow::anyhow!("Stream error: {}", e))
        });

        Ok(Box::pin(chunks))
    }
}
