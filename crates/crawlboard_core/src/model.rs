use serde::{Deserialize, Serialize};

pub type JobId = u64;

/// Lifecycle status of a crawl job as reported by the backend.
///
/// Statuses the dashboard does not know are kept verbatim so they can still
/// be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Other(raw) => raw,
        }
    }

    /// Completed or failed: the push channel stops reporting the job and the
    /// card needs a full re-render to show its final badge.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "cancelled" => JobStatus::Cancelled,
            _ => JobStatus::Other(raw),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Last-known snapshot of one crawl job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub province_id: Option<i64>,
    pub township_id: Option<i64>,
    pub province_name: Option<String>,
    pub township_name: Option<String>,
    pub status: JobStatus,
    pub total_records: u64,
    pub fetched_records: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub progress_percentage: u32,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub error_message: Option<String>,
    pub task_id: Option<String>,
    pub records_count: Option<u64>,
}

impl Job {
    /// Overwrites the fields carried by a push delta, leaving the rest intact.
    pub fn merge(&mut self, delta: &JobDelta) {
        if let Some(value) = delta.progress_percentage {
            self.progress_percentage = value;
        }
        if let Some(value) = delta.fetched_records {
            self.fetched_records = value;
        }
        if let Some(value) = delta.total_records {
            self.total_records = value;
        }
        if let Some(value) = delta.current_page {
            self.current_page = value;
        }
        if let Some(value) = delta.total_pages {
            self.total_pages = value;
        }
        if let Some(status) = &delta.status {
            self.status = status.clone();
        }
    }
}

/// Partial progress update for one job, as pushed by the live channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobDelta {
    pub id: JobId,
    #[serde(default)]
    pub progress_percentage: Option<u32>,
    #[serde(default)]
    pub fetched_records: Option<u64>,
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u64>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

/// Aggregate counters computed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    pub total_jobs: u64,
    pub pending_jobs: u64,
    pub running_jobs: u64,
    pub completed_jobs: u64,
    pub failed_jobs: u64,
    pub total_records: u64,
}

/// One crawled record shown in the records modal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlRecord {
    pub id: Option<u64>,
    pub request_number: Option<String>,
    pub applicant_name: Option<String>,
    pub license_title: Option<String>,
    pub organization_title: Option<String>,
    pub province_title: Option<String>,
    pub township_title: Option<String>,
    pub status_title: Option<String>,
    pub responded_at: Option<String>,
    pub created_at: Option<String>,
}

/// Body of a job-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewJob {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub province_id: Option<i64>,
    pub township_id: Option<i64>,
    pub province_name: Option<String>,
    pub township_name: Option<String>,
}
