use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use bytes::Bytes;
use crawlboard_core::JobAction;
use crawlboard_engine::{
    ChannelError, ChannelEvent, ClientSettings, EngineCommand, EngineEvent, EngineHandle,
    FrameStream, PushConnector,
};
use futures_util::stream::{self, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn next_event(rx: mpsc::Receiver<EngineEvent>) -> (EngineEvent, mpsc::Receiver<EngineEvent>) {
    tokio::task::spawn_blocking(move || {
        let event = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("engine event");
        (event, rx)
    })
    .await
    .unwrap()
}

fn settings_for(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn load_jobs_reports_the_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Qom", "status": "pending"}
        ])))
        .mount(&server)
        .await;

    let (engine, rx) = EngineHandle::new(settings_for(&server)).expect("engine");
    engine.send(EngineCommand::LoadJobs);
    let (event, _rx) = next_event(rx).await;
    engine.shutdown();

    let EngineEvent::JobsLoaded(Ok(jobs)) = event else {
        panic!("unexpected event {event:?}");
    };
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name, "Qom");
}

#[tokio::test(flavor = "multi_thread")]
async fn scheduled_reload_fetches_the_list_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, rx) = EngineHandle::new(settings_for(&server)).expect("engine");
    engine.send(EngineCommand::ScheduleJobsReload {
        after: Duration::from_millis(100),
    });
    let (event, rx) = next_event(rx).await;
    assert_eq!(event, EngineEvent::JobsLoaded(Ok(Vec::new())));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(rx.try_recv().is_err());
    engine.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_action_carries_the_job_and_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/4/cancel/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "not running"})))
        .mount(&server)
        .await;

    let (engine, rx) = EngineHandle::new(settings_for(&server)).expect("engine");
    engine.send(EngineCommand::RunAction {
        action: JobAction::Cancel,
        job_id: 4,
    });
    let (event, _rx) = next_event(rx).await;
    engine.shutdown();

    let EngineEvent::ActionFinished {
        action,
        job_id,
        result: Err(err),
    } = event
    else {
        panic!("unexpected event {event:?}");
    };
    assert_eq!(action, JobAction::Cancel);
    assert_eq!(job_id, 4);
    assert_eq!(err.user_message(), "not running");
}

/// Connections stay open until dropped; counts how many are alive.
#[derive(Default)]
struct HoldingConnector {
    open: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

struct Held(Arc<AtomicUsize>);

impl Drop for Held {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl PushConnector for HoldingConnector {
    async fn connect(&self) -> Result<FrameStream, ChannelError> {
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let held = Held(self.open.clone());
        Ok(stream::pending::<Result<Bytes, ChannelError>>()
            .map(move |item| {
                let _held = &held;
                item
            })
            .boxed())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn reopening_the_channel_replaces_the_previous_connection() {
    let server = MockServer::start().await;
    let connector = Arc::new(HoldingConnector::default());
    let (engine, rx) = EngineHandle::with_connector(settings_for(&server), connector.clone())
        .expect("engine");

    engine.send(EngineCommand::OpenChannel);
    let (first, rx) = next_event(rx).await;
    engine.send(EngineCommand::OpenChannel);
    let (second, rx) = next_event(rx).await;
    let (third, rx) = next_event(rx).await;
    assert_eq!(first, EngineEvent::Channel(ChannelEvent::Opened));
    assert_eq!(second, EngineEvent::Channel(ChannelEvent::Closed));
    assert_eq!(third, EngineEvent::Channel(ChannelEvent::Opened));
    assert_eq!(connector.peak.load(Ordering::SeqCst), 1);

    engine.send(EngineCommand::CloseChannel);
    let (closed, _rx) = next_event(rx).await;
    assert_eq!(closed, EngineEvent::Channel(ChannelEvent::Closed));
    assert_eq!(connector.open.load(Ordering::SeqCst), 0);
    engine.shutdown();
}
