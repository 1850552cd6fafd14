use crate::{ChannelStatus, CrawlRecord, FormField, Job, JobAction, JobId, PushMessage, StatsSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Dashboard opened: load everything and subscribe to live updates.
    Started,
    /// User asked for a manual refresh of stats and jobs.
    RefreshClicked,
    /// Statistics request finished.
    StatsLoaded(StatsSnapshot),
    StatsFailed(String),
    /// Full job list request finished.
    JobsLoaded(Vec<Job>),
    JobsFailed(String),
    /// Decoded frame from the live update channel.
    Push(PushMessage),
    /// Live channel connected, dropped or closed.
    ChannelStatusChanged(ChannelStatus),
    /// User edited a field of the create-job form.
    FormFieldChanged { field: FormField, value: String },
    /// User submitted the create-job form.
    CreateSubmitted,
    JobCreated,
    CreateFailed(String),
    /// User clicked an action button on a job card.
    ActionClicked { action: JobAction, job_id: JobId },
    /// User answered the pending confirmation prompt.
    ConfirmationAnswered(bool),
    ActionSucceeded { action: JobAction, job_id: JobId },
    ActionFailed {
        action: JobAction,
        job_id: JobId,
        message: String,
    },
    /// User opened the records modal for a job.
    RecordsClicked(JobId),
    RecordsLoaded {
        job_id: JobId,
        records: Vec<CrawlRecord>,
    },
    RecordsFailed { job_id: JobId, message: String },
    ModalClosed,
    /// Dashboard is going away; tear down the channel.
    CloseRequested,
}
