//! Display model of the dashboard and the pure functions that build it.
//!
//! A [`Page`] is what the platform layer draws. Full reloads rebuild the job
//! list wholesale through [`render_job_card`]; push updates go through
//! [`patch_job_card`], which only rewrites the progress nodes a card already
//! has.

use crate::{CrawlRecord, Job, JobId, JobStatus, Locale, StatsSnapshot};

pub const NO_JOBS_PLACEHOLDER: &str = "No crawl jobs yet";
pub const NO_RECORDS_PLACEHOLDER: &str = "No records for this job";
const ALL_LOCATIONS: &str = "All";
const MISSING_FIELD: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub stats: Option<StatsPanel>,
    pub jobs: JobListArea,
    pub modal: Option<RecordsModal>,
}

impl Page {
    pub fn card(&self, job_id: JobId) -> Option<&JobCard> {
        match &self.jobs {
            JobListArea::Cards(cards) => cards.iter().find(|card| card.job_id == job_id),
            _ => None,
        }
    }

    pub(crate) fn card_mut(&mut self, job_id: JobId) -> Option<&mut JobCard> {
        match &mut self.jobs {
            JobListArea::Cards(cards) => cards.iter_mut().find(|card| card.job_id == job_id),
            _ => None,
        }
    }
}

/// Content of the job list area.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobListArea {
    #[default]
    Loading,
    Placeholder(String),
    Failed(String),
    Cards(Vec<JobCard>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsPanel {
    pub total_jobs: String,
    pub running_jobs: String,
    pub completed_jobs: String,
    pub pending_jobs: String,
    pub failed_jobs: String,
    pub total_records: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCard {
    pub job_id: JobId,
    pub title: String,
    pub badge: StatusBadge,
    pub date_range: String,
    pub location: String,
    pub records: String,
    pub created_at: String,
    pub progress: Option<ProgressSection>,
    pub error: Option<String>,
    pub actions: Vec<CardAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub class: String,
    pub text: String,
}

/// Progress bar and the line beneath it; only running jobs have one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSection {
    pub fill_width: u8,
    pub fill_label: String,
    pub info: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Start,
    Cancel,
    Records,
    Delete,
}

impl CardAction {
    pub fn label(self) -> &'static str {
        match self {
            CardAction::Start => "Start",
            CardAction::Cancel => "Cancel",
            CardAction::Records => "Records",
            CardAction::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsModal {
    pub job_id: JobId,
    pub body: RecordsBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordsBody {
    Placeholder(String),
    Rows(Vec<RecordRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub request_number: String,
    pub applicant_name: String,
    pub license_title: String,
    pub organization: String,
    pub location: String,
    pub status: String,
    pub responded_at: String,
}

pub fn render_stats(stats: &StatsSnapshot, locale: Locale) -> StatsPanel {
    StatsPanel {
        total_jobs: locale.format_count(stats.total_jobs),
        running_jobs: locale.format_count(stats.running_jobs),
        completed_jobs: locale.format_count(stats.completed_jobs),
        pending_jobs: locale.format_count(stats.pending_jobs),
        failed_jobs: locale.format_count(stats.failed_jobs),
        total_records: locale.format_count(stats.total_records),
    }
}

/// Renders the whole list area for a freshly loaded job collection.
pub fn render_job_list<'a>(jobs: impl IntoIterator<Item = &'a Job>, locale: Locale) -> JobListArea {
    let cards: Vec<JobCard> = jobs
        .into_iter()
        .map(|job| render_job_card(job, locale))
        .collect();
    if cards.is_empty() {
        JobListArea::Placeholder(NO_JOBS_PLACEHOLDER.to_string())
    } else {
        JobListArea::Cards(cards)
    }
}

pub fn render_job_card(job: &Job, locale: Locale) -> JobCard {
    let progress = (job.status == JobStatus::Running).then(|| ProgressSection {
        fill_width: clamp_percentage(job.progress_percentage),
        fill_label: progress_label(job.progress_percentage),
        info: progress_info(job, locale),
    });
    let error = job
        .error_message
        .as_deref()
        .filter(|message| !message.trim().is_empty())
        .map(ToOwned::to_owned);

    let mut actions = Vec::with_capacity(3);
    match job.status {
        JobStatus::Pending => actions.push(CardAction::Start),
        JobStatus::Running => actions.push(CardAction::Cancel),
        _ => {}
    }
    actions.push(CardAction::Records);
    actions.push(CardAction::Delete);

    JobCard {
        job_id: job.id,
        title: job.name.clone(),
        badge: status_badge(&job.status),
        date_range: format!("{} to {}", job.start_date, job.end_date),
        location: format!(
            "{} - {}",
            location_label(job.province_name.as_deref(), job.province_id),
            location_label(job.township_name.as_deref(), job.township_id)
        ),
        records: records_label(job, locale),
        created_at: locale.format_timestamp(&job.created_at),
        progress,
        error,
        actions,
    }
}

/// Rewrites the progress nodes of an existing card from the merged job.
///
/// Badge and actions are left alone; they only change on a full reload.
pub fn patch_job_card(card: &mut JobCard, job: &Job, locale: Locale) {
    if let Some(progress) = card.progress.as_mut() {
        progress.fill_width = clamp_percentage(job.progress_percentage);
        progress.fill_label = progress_label(job.progress_percentage);
        progress.info = progress_info(job, locale);
    }
    card.records = records_label(job, locale);
}

pub fn render_records(job_id: JobId, records: &[CrawlRecord]) -> RecordsModal {
    let body = if records.is_empty() {
        RecordsBody::Placeholder(NO_RECORDS_PLACEHOLDER.to_string())
    } else {
        RecordsBody::Rows(records.iter().map(render_record_row).collect())
    };
    RecordsModal { job_id, body }
}

fn render_record_row(record: &CrawlRecord) -> RecordRow {
    RecordRow {
        request_number: or_missing(&record.request_number),
        applicant_name: or_missing(&record.applicant_name),
        license_title: or_missing(&record.license_title),
        organization: or_missing(&record.organization_title),
        location: format!(
            "{} / {}",
            or_missing(&record.province_title),
            or_missing(&record.township_title)
        ),
        status: or_missing(&record.status_title),
        responded_at: or_missing(&record.responded_at),
    }
}

pub fn status_badge(status: &JobStatus) -> StatusBadge {
    let text = match status {
        JobStatus::Pending => "⏳ Pending",
        JobStatus::Running => "🔄 Running",
        JobStatus::Completed => "✅ Completed",
        JobStatus::Failed => "❌ Failed",
        JobStatus::Cancelled => "🚫 Cancelled",
        JobStatus::Other(raw) => raw.as_str(),
    };
    StatusBadge {
        class: format!("status-{}", status.as_str()),
        text: text.to_string(),
    }
}

fn clamp_percentage(value: u32) -> u8 {
    value.min(100) as u8
}

fn progress_label(value: u32) -> String {
    format!("{value}%")
}

fn progress_info(job: &Job, locale: Locale) -> String {
    let total_pages = if job.total_pages == 0 {
        "?".to_string()
    } else {
        locale.format_plain(job.total_pages)
    };
    format!(
        "{} / {} records - page {} of {}",
        locale.format_count(job.fetched_records),
        locale.format_count(job.total_records),
        locale.format_plain(job.current_page),
        total_pages
    )
}

fn records_label(job: &Job, locale: Locale) -> String {
    format!(
        "{} / {}",
        locale.format_count(job.fetched_records),
        locale.format_count(job.total_records)
    )
}

fn location_label(name: Option<&str>, id: Option<i64>) -> String {
    match (name.filter(|n| !n.is_empty()), id) {
        (Some(name), _) => name.to_string(),
        (None, Some(id)) => id.to_string(),
        (None, None) => ALL_LOCATIONS.to_string(),
    }
}

fn or_missing(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING_FIELD)
        .to_string()
}
