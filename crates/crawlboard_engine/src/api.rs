use std::time::Duration;

use board_logging::{board_debug, board_warn};
use bytes::Bytes;
use crawlboard_core::{CrawlRecord, Job, JobAction, JobId, NewJob, StatsSnapshot};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::ApiError;

/// Delay before the live channel dials again after losing its connection.
pub const RECONNECT_BACKOFF: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub reconnect_backoff: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            reconnect_backoff: RECONNECT_BACKOFF,
        }
    }
}

/// Thin client for the crawl panel's job API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            http,
            base: parse_base_url(&settings.base_url)?,
        })
    }

    pub fn events_url(&self) -> Result<Url, ApiError> {
        self.endpoint("api/jobs/events/")
    }

    pub async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
        let body = self
            .execute(self.http.get(self.endpoint("api/jobs/stats/")?))
            .await?;
        decode(&body)
    }

    /// Fetches every job. Both a bare array and a paginated envelope with a
    /// `results` array are accepted; any other shape is an empty list.
    pub async fn jobs(&self) -> Result<Vec<Job>, ApiError> {
        let body = self
            .execute(self.http.get(self.endpoint("api/jobs/")?))
            .await?;
        parse_listing(&body)
    }

    pub async fn create_job(&self, job: &NewJob) -> Result<(), ApiError> {
        let payload = serde_json::to_vec(job).map_err(|err| ApiError::Decode(err.to_string()))?;
        let request = self
            .http
            .post(self.endpoint("api/jobs/")?)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        self.execute(request).await?;
        Ok(())
    }

    pub async fn run_action(&self, action: JobAction, job_id: JobId) -> Result<(), ApiError> {
        let request = match action {
            JobAction::Start => self
                .http
                .post(self.endpoint(&format!("api/jobs/{job_id}/start/"))?),
            JobAction::Cancel => self
                .http
                .post(self.endpoint(&format!("api/jobs/{job_id}/cancel/"))?),
            JobAction::Delete => self
                .http
                .delete(self.endpoint(&format!("api/jobs/{job_id}/"))?),
        };
        self.execute(request).await?;
        Ok(())
    }

    pub async fn records(&self, job_id: JobId, limit: u32) -> Result<Vec<CrawlRecord>, ApiError> {
        let mut url = self.endpoint(&format!("api/jobs/{job_id}/records/"))?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let body = self.execute(self.http.get(url)).await?;
        parse_listing(&body)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Bytes, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            let detail = extract_detail(&body);
            board_warn!("{} answered {} ({:?})", url, status, detail);
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }
        board_debug!("{} answered {} with {} bytes", url, status, body.len());
        Ok(body)
    }
}

/// Makes relative joins keep any path prefix of the configured base.
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&normalized).map_err(|err| ApiError::InvalidUrl(format!("{trimmed}: {err}")))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::Decode(err.to_string()))
}

pub(crate) fn parse_listing<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, ApiError> {
    let items = match decode::<Value>(body)? {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|err| ApiError::Decode(err.to_string())))
        .collect()
}

/// Pulls a human-readable reason out of an error body.
///
/// Looks at `detail`, then `error`, then `message`; otherwise joins
/// per-field validation errors such as `{"name": ["required"]}`.
pub(crate) fn extract_detail(body: &[u8]) -> Option<String> {
    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
        return None;
    };
    for key in ["detail", "error", "message"] {
        if let Some(text) = map.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    let fields: Vec<String> = map
        .iter()
        .filter_map(|(field, value)| {
            let messages: Vec<&str> = match value {
                Value::String(text) => vec![text.as_str()],
                Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            (!messages.is_empty()).then(|| format!("{field}: {}", messages.join(" ")))
        })
        .collect();
    (!fields.is_empty()).then(|| fields.join("; "))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Network(err.to_string())
}
