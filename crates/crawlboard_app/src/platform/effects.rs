use std::ops::ControlFlow;
use std::sync::mpsc;
use std::thread;

use board_logging::{board_info, board_warn};
use crawlboard_core::{ChannelStatus, Effect, Msg};
use crawlboard_engine::{
    ChannelEvent, ClientSettings, EngineCommand, EngineError, EngineEvent, EngineHandle,
};

/// Hands effects produced by `update` to the engine and feeds its events
/// back into the dispatcher as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings, msg_tx: mpsc::Sender<Msg>) -> Result<Self, EngineError> {
        board_info!("Connecting to crawl panel at {}", settings.base_url);
        let (engine, events) = EngineHandle::new(settings)?;
        spawn_event_pump(events, msg_tx);
        Ok(Self { engine })
    }

    /// Runs `effects` in order. Breaks once the dashboard should exit.
    pub fn run(&self, effects: Vec<Effect>) -> ControlFlow<()> {
        for effect in effects {
            match command_for(effect) {
                Some(command) => self.engine.send(command),
                None => return ControlFlow::Break(()),
            }
        }
        ControlFlow::Continue(())
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

fn spawn_event_pump(events: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        for event in events {
            if msg_tx.send(msg_for(event)).is_err() {
                break;
            }
        }
    });
}

/// `None` means the effect ends the session.
fn command_for(effect: Effect) -> Option<EngineCommand> {
    let command = match effect {
        Effect::LoadStats => EngineCommand::LoadStats,
        Effect::LoadJobs => EngineCommand::LoadJobs,
        Effect::ScheduleJobsReload { after } => EngineCommand::ScheduleJobsReload { after },
        Effect::OpenChannel => EngineCommand::OpenChannel,
        Effect::CloseChannel => EngineCommand::CloseChannel,
        Effect::CreateJob(job) => EngineCommand::CreateJob(job),
        Effect::RunAction { action, job_id } => EngineCommand::RunAction { action, job_id },
        Effect::LoadRecords { job_id, limit } => EngineCommand::LoadRecords { job_id, limit },
        Effect::Quit => return None,
    };
    Some(command)
}

fn msg_for(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StatsLoaded(Ok(stats)) => Msg::StatsLoaded(stats),
        EngineEvent::StatsLoaded(Err(err)) => Msg::StatsFailed(err.to_string()),
        EngineEvent::JobsLoaded(Ok(jobs)) => Msg::JobsLoaded(jobs),
        EngineEvent::JobsLoaded(Err(err)) => Msg::JobsFailed(err.to_string()),
        EngineEvent::JobCreated(Ok(())) => Msg::JobCreated,
        EngineEvent::JobCreated(Err(err)) => Msg::CreateFailed(err.user_message()),
        EngineEvent::ActionFinished {
            action,
            job_id,
            result,
        } => match result {
            Ok(()) => Msg::ActionSucceeded { action, job_id },
            Err(err) => {
                board_warn!("{} of job {} failed: {}", action.verb(), job_id, err);
                Msg::ActionFailed {
                    action,
                    job_id,
                    message: err.user_message(),
                }
            }
        },
        EngineEvent::RecordsLoaded { job_id, result } => match result {
            Ok(records) => Msg::RecordsLoaded { job_id, records },
            Err(err) => Msg::RecordsFailed {
                job_id,
                message: err.user_message(),
            },
        },
        EngineEvent::Channel(ChannelEvent::Opened) => Msg::ChannelStatusChanged(ChannelStatus::Live),
        EngineEvent::Channel(ChannelEvent::Message(message)) => Msg::Push(message),
        EngineEvent::Channel(ChannelEvent::Disconnected { .. }) => {
            Msg::ChannelStatusChanged(ChannelStatus::Reconnecting)
        }
        // A supervisor also stops when the channel is reopened. Only the
        // dashboard's own close marks the channel as off.
        EngineEvent::Channel(ChannelEvent::Closed) => {
            Msg::ChannelStatusChanged(ChannelStatus::Reconnecting)
        }
    }
}
