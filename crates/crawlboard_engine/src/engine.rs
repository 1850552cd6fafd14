use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use board_logging::{board_debug, board_info};
use crawlboard_core::{JobAction, JobId, NewJob};

use crate::push::{ChannelEventSink, ChannelTask, EventSink, PushConnector, ReqwestConnector};
use crate::{ApiClient, ClientSettings, EngineError, EngineEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    LoadStats,
    LoadJobs,
    ScheduleJobsReload { after: Duration },
    OpenChannel,
    CloseChannel,
    CreateJob(NewJob),
    RunAction { action: JobAction, job_id: JobId },
    LoadRecords { job_id: JobId, limit: u32 },
    Shutdown,
}

/// Owns the engine thread and its tokio runtime.
///
/// Requests run concurrently; at most one live channel exists at a time.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        settings: ClientSettings,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let client = ApiClient::new(&settings)?;
        let connector = ReqwestConnector::new(client.events_url()?, settings.connect_timeout)?;
        Self::with_connector(settings, Arc::new(connector))
    }

    /// Like [`EngineHandle::new`] but dials the live channel through
    /// `connector`.
    pub fn with_connector(
        settings: ClientSettings,
        connector: Arc<dyn PushConnector>,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let client = ApiClient::new(&settings)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
        let backoff = settings.reconnect_backoff;

        let worker = thread::spawn(move || {
            let mut channel: Option<ChannelTask> = None;
            while let Ok(command) = cmd_rx.recv() {
                board_debug!("Engine command {:?}", command);
                match command {
                    EngineCommand::OpenChannel => {
                        channel = Some(ChannelTask::spawn(
                            runtime.handle(),
                            channel.take(),
                            connector.clone(),
                            backoff,
                            sink.clone(),
                        ));
                    }
                    EngineCommand::CloseChannel => {
                        if let Some(task) = channel.take() {
                            runtime.block_on(task.shutdown());
                        }
                    }
                    EngineCommand::Shutdown => break,
                    request => {
                        let client = client.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            handle_request(&client, request, sink.as_ref()).await;
                        });
                    }
                }
            }
            if let Some(task) = channel.take() {
                runtime.block_on(task.shutdown());
            }
            runtime.shutdown_timeout(Duration::from_secs(1));
            board_info!("Engine stopped");
        });

        Ok((
            Self {
                cmd_tx,
                worker: Some(worker),
            },
            event_rx,
        ))
    }

    pub fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    /// Closes the live channel, abandons in-flight requests and joins the
    /// engine thread.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

async fn handle_request(client: &ApiClient, command: EngineCommand, sink: &dyn EventSink) {
    let event = match command {
        EngineCommand::LoadStats => EngineEvent::StatsLoaded(client.stats().await),
        EngineCommand::LoadJobs => EngineEvent::JobsLoaded(client.jobs().await),
        EngineCommand::ScheduleJobsReload { after } => {
            tokio::time::sleep(after).await;
            EngineEvent::JobsLoaded(client.jobs().await)
        }
        EngineCommand::CreateJob(job) => EngineEvent::JobCreated(client.create_job(&job).await),
        EngineCommand::RunAction { action, job_id } => EngineEvent::ActionFinished {
            action,
            job_id,
            result: client.run_action(action, job_id).await,
        },
        EngineCommand::LoadRecords { job_id, limit } => EngineEvent::RecordsLoaded {
            job_id,
            result: client.records(job_id, limit).await,
        },
        EngineCommand::OpenChannel | EngineCommand::CloseChannel | EngineCommand::Shutdown => {
            return;
        }
    };
    sink.emit(event);
}
