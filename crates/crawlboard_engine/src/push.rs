//! Live update channel: SSE subscription, frame decoding and the supervised
//! reconnect loop.

use std::sync::Arc;
use std::time::Duration;

use board_logging::{board_debug, board_info, board_warn};
use bytes::Bytes;
use crawlboard_core::{JobDelta, PushMessage, StatsSnapshot};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{ChannelError, ChannelEvent, EngineEvent, SseDecoder};

pub type FrameStream = BoxStream<'static, Result<Bytes, ChannelError>>;

/// Receives everything the engine reports back to the dashboard.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Opens one connection to the event stream.
#[async_trait::async_trait]
pub trait PushConnector: Send + Sync {
    async fn connect(&self) -> Result<FrameStream, ChannelError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestConnector {
    http: reqwest::Client,
    url: Url,
}

impl ReqwestConnector {
    /// The stream client has no overall timeout: the response never ends on
    /// its own.
    pub fn new(url: Url, connect_timeout: Duration) -> Result<Self, ChannelError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|err| ChannelError::Connect(err.to_string()))?;
        Ok(Self { http, url })
    }
}

#[async_trait::async_trait]
impl PushConnector for ReqwestConnector {
    async fn connect(&self) -> Result<FrameStream, ChannelError> {
        let response = self
            .http
            .get(self.url.clone())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|err| ChannelError::Connect(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Status(status.as_u16()));
        }
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|err| ChannelError::Stream(err.to_string())))
            .boxed())
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    Stats {
        data: StatsSnapshot,
    },
    JobUpdate {
        data: JobDelta,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    #[serde(other)]
    Unrecognized,
}

/// Decodes one frame's data. Anything that is not a tagged JSON envelope is
/// treated as a keep-alive.
pub fn decode_push_frame(text: &str) -> PushMessage {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return PushMessage::KeepAlive;
    };
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    match serde_json::from_value::<Envelope>(value) {
        Ok(Envelope::Stats { data }) => PushMessage::Stats(data),
        Ok(Envelope::JobUpdate { data }) => PushMessage::JobUpdate(data),
        Ok(Envelope::Error { message }) => PushMessage::Error(message),
        Ok(Envelope::Unrecognized) => PushMessage::Unrecognized(tag),
        Err(err) => {
            board_debug!("Ignoring malformed live frame of type {:?}: {}", tag, err);
            PushMessage::KeepAlive
        }
    }
}

/// Keeps one subscription alive until `shutdown` fires.
///
/// Every failure drops the connection, waits `backoff` and dials again, with
/// no retry limit. The stream of a failed attempt is always dropped before
/// the next attempt starts.
pub async fn run_channel(
    connector: &dyn PushConnector,
    backoff: Duration,
    sink: &dyn EventSink,
    shutdown: CancellationToken,
) {
    loop {
        let connected = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            result = connector.connect() => result,
        };
        let reason = match connected {
            Ok(stream) => {
                board_info!("Live channel connected");
                sink.emit(EngineEvent::Channel(ChannelEvent::Opened));
                match pump_frames(stream, sink, &shutdown).await {
                    Ok(()) => break,
                    Err(err) => err,
                }
            }
            Err(err) => err,
        };

        board_warn!("Live channel lost: {}; reconnecting in {:?}", reason, backoff);
        sink.emit(EngineEvent::Channel(ChannelEvent::Disconnected {
            reason: reason.to_string(),
        }));
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(backoff) => {}
        }
    }
    board_info!("Live channel closed");
    sink.emit(EngineEvent::Channel(ChannelEvent::Closed));
}

/// Forwards decoded frames until the stream fails (`Err`) or shutdown
/// fires (`Ok`). Consumes the stream so the connection ends with it.
async fn pump_frames(
    mut stream: FrameStream,
    sink: &dyn EventSink,
    shutdown: &CancellationToken,
) -> Result<(), ChannelError> {
    let mut decoder = SseDecoder::new();
    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Ok(()),
            next = stream.next() => next,
        };
        match next {
            Some(Ok(chunk)) => {
                for frame in decoder.push(&chunk) {
                    sink.emit(EngineEvent::Channel(ChannelEvent::Message(
                        decode_push_frame(&frame),
                    )));
                }
            }
            Some(Err(err)) => return Err(err),
            None => return Err(ChannelError::Ended),
        }
    }
}

/// Handle to the single running supervisor task.
pub(crate) struct ChannelTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ChannelTask {
    /// Spawns a supervisor, first tearing down `previous` so two connections
    /// never coexist.
    pub(crate) fn spawn(
        runtime: &tokio::runtime::Handle,
        previous: Option<ChannelTask>,
        connector: Arc<dyn PushConnector>,
        backoff: Duration,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let token = CancellationToken::new();
        let shutdown = token.clone();
        let handle = runtime.spawn(async move {
            if let Some(previous) = previous {
                previous.shutdown().await;
            }
            run_channel(connector.as_ref(), backoff, sink.as_ref(), shutdown).await;
        });
        Self { token, handle }
    }

    pub(crate) async fn shutdown(self) {
        self.token.cancel();
        let _ = self.handle.await;
    }
}
