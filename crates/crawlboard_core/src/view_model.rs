use crate::{ChannelStatus, JobAction, JobForm, JobId, Page};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub page: Page,
    pub channel: ChannelStatus,
    pub form: JobForm,
    pub confirmation: Option<PendingConfirmation>,
    pub job_count: usize,
}

/// Destructive action waiting for a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub action: JobAction,
    pub job_id: JobId,
}

impl PendingConfirmation {
    pub fn prompt(&self) -> String {
        match self.action {
            JobAction::Delete => format!(
                "Delete crawl job #{} and all of its records? [y/n]",
                self.job_id
            ),
            action => format!("Really {} crawl job #{}? [y/n]", action.verb(), self.job_id),
        }
    }
}
