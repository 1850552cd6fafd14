use crate::{JobDelta, StatsSnapshot};

/// One decoded frame from the live update channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    /// Fresh aggregate counters.
    Stats(StatsSnapshot),
    /// Progress delta for a single job.
    JobUpdate(JobDelta),
    /// Server-side failure report; logged, never shown.
    Error(String),
    /// Well-formed envelope with a tag this dashboard does not handle.
    Unrecognized(String),
    /// Anything that is not a JSON envelope (heartbeats, pings).
    KeepAlive,
}

/// Connection state of the live update channel, for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelStatus {
    #[default]
    Connecting,
    Live,
    Reconnecting,
    Closed,
}
