//! Crawlboard core: job cache, page model and the pure update function.
mod effect;
mod form;
mod locale;
mod model;
mod msg;
mod page;
mod push;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, JobAction, RECORDS_LIMIT, TERMINAL_RELOAD_DELAY};
pub use form::{FormError, FormField, JobForm};
pub use locale::{gregorian_to_jalali, Locale};
pub use model::{CrawlRecord, Job, JobDelta, JobId, JobStatus, NewJob, StatsSnapshot};
pub use msg::Msg;
pub use page::{
    patch_job_card, render_job_card, render_job_list, render_records, render_stats,
    status_badge, CardAction, JobCard, JobListArea, Page, ProgressSection, RecordRow,
    RecordsBody, RecordsModal, StatsPanel, StatusBadge, NO_JOBS_PLACEHOLDER,
    NO_RECORDS_PLACEHOLDER,
};
pub use push::{ChannelStatus, PushMessage};
pub use state::{Alert, AlertSeverity, AppState};
pub use update::update;
pub use view_model::{AppViewModel, PendingConfirmation};
