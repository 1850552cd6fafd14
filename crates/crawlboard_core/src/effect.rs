use std::time::Duration;

use crate::{JobId, NewJob};

/// Delay between a push reporting a terminal status and the full reload
/// that brings the card's badge and actions in line with the server.
pub const TERMINAL_RELOAD_DELAY: Duration = Duration::from_secs(1);

/// Page size requested when opening the records modal.
pub const RECORDS_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadStats,
    LoadJobs,
    ScheduleJobsReload { after: Duration },
    OpenChannel,
    CloseChannel,
    CreateJob(NewJob),
    RunAction { action: JobAction, job_id: JobId },
    LoadRecords { job_id: JobId, limit: u32 },
    Quit,
}

/// Commands issued against an existing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Start,
    Cancel,
    Delete,
}

impl JobAction {
    /// Destructive actions need an explicit yes before the request goes out.
    pub fn needs_confirmation(self) -> bool {
        matches!(self, JobAction::Cancel | JobAction::Delete)
    }

    pub fn verb(self) -> &'static str {
        match self {
            JobAction::Start => "start",
            JobAction::Cancel => "cancel",
            JobAction::Delete => "delete",
        }
    }
}
