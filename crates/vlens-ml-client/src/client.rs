//! Inference sidecar HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::RgbImage;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use vlens_media::{
    encode_jpeg, EmotionClassifier, MediaError, MediaResult, ObjectDetector, RecognitionSession,
    RecognizedSegment, SpeechRecognizer,
};
use vlens_models::LabelTree;

use crate::error::{MlError, MlResult};
use crate::types::{
    ChunkRequest, EmotionsResponse, HealthResponse, ImageRequest, ObjectsResponse,
    RecognitionResponse, SessionRequest, SessionResponse,
};

/// Configuration for ML client.
#[derive(Debug, Clone)]
pub struct MlClientConfig {
    /// Base URL of the sidecar
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
    /// First retry delay, doubled per attempt
    pub retry_base_delay: Duration,
}

impl Default for MlClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl MlClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("VLENS_ML_URL").unwrap_or(defaults.base_url),
            timeout: std::env::var("VLENS_ML_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: std::env::var("VLENS_ML_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            retry_base_delay: defaults.retry_base_delay,
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Client for the inference sidecar.
///
/// Implements `SpeechRecognizer`, `ObjectDetector` and `EmotionClassifier`.
#[derive(Debug, Clone)]
pub struct MlClient {
    http: Client,
    config: MlClientConfig,
}

impl MlClient {
    /// Create a new ML client.
    pub fn new(config: MlClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(MlClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Fetch the sidecar health report.
    pub async fn health(&self) -> MlResult<HealthResponse> {
        let url = self.url("/health");
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(MlError::ServiceUnavailable(format!(
                "health check returned {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Check if the sidecar is healthy.
    pub async fn health_check(&self) -> MlResult<bool> {
        match self.health().await {
            Ok(health) => Ok(health.is_healthy()),
            Err(e) => {
                warn!("ML service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// POST a JSON body and decode the JSON reply, retrying transient failures.
    ///
    /// Only for idempotent endpoints.
    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> MlResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let response = self.with_retry(|| self.send_json(path, body)).await?;
        Self::decode(path, response).await
    }

    /// POST a JSON body exactly once.
    ///
    /// Session calls create or mutate recognizer state on the sidecar; a timed out
    /// chunk must not be replayed.
    async fn post_json_once<Req, Resp>(&self, path: &str, body: &Req) -> MlResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let response = self.send_json(path, body).await?;
        Self::decode(path, response).await
    }

    async fn send_json<Req>(&self, path: &str, body: &Req) -> MlResult<Response>
    where
        Req: Serialize + Sync,
    {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self.http.post(&url).json(body).send().await?;
        match response.status() {
            StatusCode::SERVICE_UNAVAILABLE => Err(MlError::ServiceUnavailable(format!(
                "{} returned 503",
                path
            ))),
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                Err(MlError::RequestFailed(format!(
                    "ML service returned {}: {}",
                    status, text
                )))
            }
            _ => Ok(response),
        }
    }

    async fn decode<Resp: DeserializeOwned>(path: &str, response: Response) -> MlResult<Resp> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| MlError::InvalidResponse(format!("{}: {}", path, e)))
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_base_delay * 2u32.pow(attempt);
                    warn!(
                        "ML request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(MlError::RequestFailed("Unknown error".to_string())))
    }

    fn image_request(frame: &RgbImage) -> MlResult<ImageRequest> {
        Ok(ImageRequest {
            image_base64: STANDARD.encode(encode_jpeg(frame)?),
        })
    }
}

/// Encode PCM as little-endian bytes, base64.
fn encode_pcm(pcm: &[i16]) -> String {
    let bytes: Vec<u8> = pcm.iter().flat_map(|s| s.to_le_bytes()).collect();
    STANDARD.encode(bytes)
}

/// Streaming session on the sidecar.
pub struct MlRecognitionSession {
    client: MlClient,
    session_id: String,
}

impl MlRecognitionSession {
    pub fn id(&self) -> &str {
        &self.session_id
    }
}

#[async_trait]
impl RecognitionSession for MlRecognitionSession {
    async fn accept_chunk(&mut self, pcm: &[i16]) -> MediaResult<Option<RecognizedSegment>> {
        let path = format!("/asr/sessions/{}/chunk", self.session_id);
        let request = ChunkRequest {
            pcm_base64: encode_pcm(pcm),
        };
        let response: RecognitionResponse = self.client.post_json_once(&path, &request).await?;

        if response.is_final {
            Ok(response.into_segment())
        } else {
            Ok(None)
        }
    }

    async fn finish(&mut self) -> MediaResult<Option<RecognizedSegment>> {
        let path = format!("/asr/sessions/{}/finish", self.session_id);
        let response: RecognitionResponse = self
            .client
            .post_json_once(&path, &serde_json::json!({}))
            .await?;
        Ok(response.into_segment())
    }
}

#[async_trait]
impl SpeechRecognizer for MlClient {
    async fn ensure_ready(&self) -> MediaResult<()> {
        let health = self
            .health()
            .await
            .map_err(|e| MediaError::provider_unavailable(e.to_string()))?;

        if health.speech_ready() {
            Ok(())
        } else {
            Err(MediaError::provider_unavailable(format!(
                "speech model not loaded (status: {})",
                health.status
            )))
        }
    }

    async fn start(&self, sample_rate: u32) -> MediaResult<Box<dyn RecognitionSession>> {
        let response: SessionResponse = self
            .post_json_once("/asr/sessions", &SessionRequest { sample_rate })
            .await?;
        debug!(session_id = %response.session_id, sample_rate, "Started recognition session");

        Ok(Box::new(MlRecognitionSession {
            client: self.clone(),
            session_id: response.session_id,
        }))
    }

    fn name(&self) -> &'static str {
        "ml-sidecar"
    }
}

#[async_trait]
impl ObjectDetector for MlClient {
    async fn detect(&self, frame: &RgbImage) -> MediaResult<LabelTree> {
        let request = Self::image_request(frame)?;
        let response: ObjectsResponse = self.post_json("/detect/objects", &request).await?;
        Ok(response.labels)
    }

    fn name(&self) -> &'static str {
        "ml-sidecar"
    }
}

#[async_trait]
impl EmotionClassifier for MlClient {
    async fn classify(&self, frame: &RgbImage) -> MediaResult<Vec<String>> {
        let request = Self::image_request(frame)?;
        let response: EmotionsResponse = self.post_json("/detect/emotions", &request).await?;
        Ok(response.dominant_labels())
    }

    fn name(&self) -> &'static str {
        "ml-sidecar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MlClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8001");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_encode_pcm_little_endian() {
        assert_eq!(encode_pcm(&[1, -2]), STANDARD.encode([0x01, 0x00, 0xFE, 0xFF]));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client =
            MlClient::new(MlClientConfig::default().with_base_url("http://sidecar:9000/")).unwrap();
        assert_eq!(client.url("/health"), "http://sidecar:9000/health");
    }
}
