use crawlboard_core::{CrawlRecord, Job, JobAction, JobId, PushMessage, StatsSnapshot};
use thiserror::Error;

/// Fallback shown when the backend rejects a request without explaining why.
pub const GENERIC_FAILURE: &str = "Unknown error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    StatsLoaded(Result<StatsSnapshot, ApiError>),
    JobsLoaded(Result<Vec<Job>, ApiError>),
    JobCreated(Result<(), ApiError>),
    ActionFinished {
        action: JobAction,
        job_id: JobId,
        result: Result<(), ApiError>,
    },
    RecordsLoaded {
        job_id: JobId,
        result: Result<Vec<CrawlRecord>, ApiError>,
    },
    Channel(ChannelEvent),
}

/// Lifecycle and traffic of the live update channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    Message(PushMessage),
    Disconnected { reason: String },
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid endpoint: {0}")]
    InvalidUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP status {status}")]
    Rejected { status: u16, detail: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text for an alert: the server's own explanation when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Rejected { detail: None, .. } => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("event stream answered with HTTP status {0}")]
    Status(u16),
    #[error("event stream broke: {0}")]
    Stream(String),
    #[error("event stream ended")]
    Ended,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Client(#[from] ApiError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
}
