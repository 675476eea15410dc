use std::time::Duration;

use reqwest::multipart;
use url::Url;

use crate::{ApiError, StatusResponse, UploadReceipt, UploadResponse};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Cadence of the status poll. One process-wide default, not per-call.
    pub poll_interval: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Seam to the remote analysis service: one upload endpoint, one
/// status-by-id endpoint.
#[async_trait::async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError>;

    async fn status(&self, analysis_id: &str) -> Result<StatusResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAnalysisApi {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestAnalysisApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(settings.base_url.trim_end_matches('/'))
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base.as_str().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|err| ApiError::InvalidUrl(err.to_string()))
    }
}

#[async_trait::async_trait]
impl AnalysisApi for ReqwestAnalysisApi {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError> {
        let url = self.endpoint("upload")?;
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            // The service reports failures as an error body on 4xx/5xx.
            if let Some(message) = parse_error_body(&body) {
                return Err(ApiError::Service(message));
            }
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|err| ApiError::MalformedResponse(err.to_string()))?;
        if !parsed.success {
            return Err(ApiError::Service(
                parsed.error.unwrap_or_else(|| "Upload failed".to_string()),
            ));
        }
        let analysis_id = parsed
            .analysis_id
            .ok_or_else(|| ApiError::MalformedResponse("missing analysis_id".to_string()))?;
        Ok(UploadReceipt {
            analysis_id,
            filename: parsed.filename,
        })
    }

    async fn status(&self, analysis_id: &str) -> Result<StatusResponse, ApiError> {
        let url = self.endpoint(&format!("status/{analysis_id}"))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            if let Some(message) = parse_error_body(&body) {
                return Err(ApiError::Service(message));
            }
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        serde_json::from_str(&body).map_err(|err| ApiError::MalformedResponse(err.to_string()))
    }
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: String,
}

fn parse_error_body(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|parsed| parsed.error)
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Network(err.to_string())
}
