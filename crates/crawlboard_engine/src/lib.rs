//! Crawlboard engine: HTTP calls against the crawl panel API and the live
//! update channel, run on a dedicated tokio runtime.
mod api;
mod engine;
mod push;
mod sse;
mod types;

pub use api::{ApiClient, ClientSettings, RECONNECT_BACKOFF};
pub use engine::{EngineCommand, EngineHandle};
pub use push::{
    decode_push_frame, run_channel, ChannelEventSink, EventSink, FrameStream, PushConnector,
    ReqwestConnector,
};
pub use sse::SseDecoder;
pub use types::{ApiError, ChannelError, ChannelEvent, EngineError, EngineEvent, GENERIC_FAILURE};
