use std::collections::BTreeMap;

use crate::page::{patch_job_card, render_job_list, render_records, render_stats, JobListArea};
use crate::view_model::{AppViewModel, PendingConfirmation};
use crate::{
    ChannelStatus, CrawlRecord, Job, JobAction, JobDelta, JobForm, JobId, Locale, Page,
    StatsSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Info,
    Error,
}

/// Blocking message for the user, shown once and then consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingAction {
    pub action: JobAction,
    pub job_id: JobId,
}

/// Everything the dashboard knows. Owned by the dispatcher and only changed
/// through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    locale: Locale,
    jobs: BTreeMap<JobId, Job>,
    page: Page,
    form: JobForm,
    pending: Option<PendingAction>,
    alerts: Vec<Alert>,
    channel: ChannelStatus,
    closed: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(locale: Locale) -> Self {
        Self {
            locale,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            page: self.page.clone(),
            channel: self.channel,
            form: self.form.clone(),
            confirmation: self.pending.map(|pending| PendingConfirmation {
                action: pending.action,
                job_id: pending.job_id,
            }),
            job_count: self.jobs.len(),
        }
    }

    /// Cached snapshot of a job, if the last reload contained it.
    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.get(&job_id)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drains alerts raised since the last call, oldest first.
    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn page(&self) -> &Page {
        &self.page
    }

    pub(crate) fn form(&self) -> &JobForm {
        &self.form
    }

    pub(crate) fn form_mut(&mut self) -> &mut JobForm {
        self.dirty = true;
        &mut self.form
    }

    pub(crate) fn alert(&mut self, severity: AlertSeverity, text: impl Into<String>) {
        self.alerts.push(Alert {
            severity,
            text: text.into(),
        });
        self.dirty = true;
    }

    pub(crate) fn apply_stats(&mut self, stats: &StatsSnapshot) {
        self.page.stats = Some(render_stats(stats, self.locale));
        self.dirty = true;
    }

    /// Replaces the cache and every card with a fresh server listing.
    ///
    /// Duplicate ids keep the last snapshot at the position of the first.
    pub(crate) fn apply_jobs(&mut self, jobs: Vec<Job>) {
        let mut order = Vec::with_capacity(jobs.len());
        let mut cache = BTreeMap::new();
        for job in jobs {
            let id = job.id;
            if cache.insert(id, job).is_none() {
                order.push(id);
            }
        }
        self.page.jobs = render_job_list(order.iter().filter_map(|id| cache.get(id)), self.locale);
        self.jobs = cache;
        self.dirty = true;
    }

    pub(crate) fn apply_jobs_failure(&mut self, message: &str) {
        self.page.jobs = JobListArea::Failed(format!("Failed to load jobs: {message}"));
        self.dirty = true;
    }

    /// Merges a push delta into the cached job and patches its card.
    ///
    /// Returns the merged snapshot, or `None` when the job is not cached.
    pub(crate) fn apply_job_delta(&mut self, delta: &JobDelta) -> Option<&Job> {
        let job = self.jobs.get_mut(&delta.id)?;
        job.merge(delta);
        if let Some(card) = self.page.card_mut(delta.id) {
            patch_job_card(card, job, self.locale);
        }
        self.dirty = true;
        Some(&*job)
    }

    pub(crate) fn show_records(&mut self, job_id: JobId, records: &[CrawlRecord]) {
        self.page.modal = Some(render_records(job_id, records));
        self.dirty = true;
    }

    pub(crate) fn close_modal(&mut self) -> bool {
        let was_open = self.page.modal.take().is_some();
        self.dirty |= was_open;
        was_open
    }

    pub(crate) fn set_pending(&mut self, pending: Option<PendingAction>) {
        self.pending = pending;
        self.dirty = true;
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingAction> {
        let pending = self.pending.take();
        self.dirty |= pending.is_some();
        pending
    }

    pub(crate) fn set_channel(&mut self, status: ChannelStatus) {
        if self.channel != status {
            self.channel = status;
            self.dirty = true;
        }
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
        self.channel = ChannelStatus::Closed;
        self.pending = None;
        self.dirty = true;
    }
}
