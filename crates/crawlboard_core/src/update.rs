use board_logging::{board_debug, board_error, board_warn};

use crate::state::{AlertSeverity, PendingAction};
use crate::{
    AppState, CardAction, Effect, JobAction, JobDelta, JobId, Msg, PushMessage,
    RECORDS_LIMIT, TERMINAL_RELOAD_DELAY,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.is_closed() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Started => {
            state.mark_dirty();
            vec![Effect::LoadStats, Effect::LoadJobs, Effect::OpenChannel]
        }
        Msg::RefreshClicked => vec![Effect::LoadJobs, Effect::LoadStats],
        Msg::StatsLoaded(stats) => {
            state.apply_stats(&stats);
            Vec::new()
        }
        Msg::StatsFailed(message) => {
            board_warn!("Failed to load statistics: {}", message);
            Vec::new()
        }
        Msg::JobsLoaded(jobs) => {
            state.apply_jobs(jobs);
            Vec::new()
        }
        Msg::JobsFailed(message) => {
            state.apply_jobs_failure(&message);
            Vec::new()
        }
        Msg::Push(message) => apply_push(&mut state, message),
        Msg::ChannelStatusChanged(status) => {
            state.set_channel(status);
            Vec::new()
        }
        Msg::FormFieldChanged { field, value } => {
            state.form_mut().set(field, value);
            Vec::new()
        }
        Msg::CreateSubmitted => match state.form().to_new_job() {
            Ok(new_job) => vec![Effect::CreateJob(new_job)],
            Err(err) => {
                state.alert(AlertSeverity::Error, format!("Error: {err}"));
                Vec::new()
            }
        },
        Msg::JobCreated => {
            state.form_mut().reset();
            state.alert(AlertSeverity::Info, "Crawl job created");
            vec![Effect::LoadJobs, Effect::LoadStats]
        }
        Msg::CreateFailed(message) => {
            state.alert(AlertSeverity::Error, format!("Error: {message}"));
            Vec::new()
        }
        Msg::ActionClicked { action, job_id } => request_action(&mut state, action, job_id),
        Msg::ConfirmationAnswered(accepted) => match state.take_pending() {
            Some(PendingAction { action, job_id }) if accepted => {
                if offers(&state, job_id, button_for(action)) {
                    vec![Effect::RunAction { action, job_id }]
                } else {
                    state.alert(
                        AlertSeverity::Error,
                        format!("Crawl job #{job_id} no longer offers the {} action", action.verb()),
                    );
                    Vec::new()
                }
            }
            _ => Vec::new(),
        },
        Msg::ActionSucceeded { action, job_id } => {
            let text = match action {
                JobAction::Start => format!("Crawl job #{job_id} started"),
                JobAction::Cancel => format!("Crawl job #{job_id} cancelled"),
                JobAction::Delete => format!("Crawl job #{job_id} deleted"),
            };
            state.alert(AlertSeverity::Info, text);
            match action {
                JobAction::Start | JobAction::Cancel => vec![Effect::LoadJobs],
                JobAction::Delete => vec![Effect::LoadJobs, Effect::LoadStats],
            }
        }
        Msg::ActionFailed {
            action,
            job_id,
            message,
        } => {
            state.alert(
                AlertSeverity::Error,
                format!("Could not {} crawl job #{job_id}: {message}", action.verb()),
            );
            Vec::new()
        }
        Msg::RecordsClicked(job_id) => {
            if offers(&state, job_id, CardAction::Records) {
                vec![Effect::LoadRecords {
                    job_id,
                    limit: RECORDS_LIMIT,
                }]
            } else {
                state.alert(AlertSeverity::Error, format!("No crawl job #{job_id} on the board"));
                Vec::new()
            }
        }
        Msg::RecordsLoaded { job_id, records } => {
            state.show_records(job_id, &records);
            Vec::new()
        }
        Msg::RecordsFailed { job_id, message } => {
            state.alert(
                AlertSeverity::Error,
                format!("Could not load records of crawl job #{job_id}: {message}"),
            );
            Vec::new()
        }
        Msg::ModalClosed => {
            state.close_modal();
            Vec::new()
        }
        Msg::CloseRequested => {
            state.close();
            vec![Effect::CloseChannel, Effect::Quit]
        }
    };

    (state, effects)
}

fn apply_push(state: &mut AppState, message: PushMessage) -> Vec<Effect> {
    match message {
        PushMessage::Stats(stats) => {
            state.apply_stats(&stats);
            Vec::new()
        }
        PushMessage::JobUpdate(delta) => apply_job_update(state, &delta),
        PushMessage::Error(message) => {
            board_error!("Live channel reported an error: {}", message);
            Vec::new()
        }
        PushMessage::Unrecognized(tag) => {
            board_debug!("Ignoring live message with type {:?}", tag);
            Vec::new()
        }
        PushMessage::KeepAlive => Vec::new(),
    }
}

fn apply_job_update(state: &mut AppState, delta: &JobDelta) -> Vec<Effect> {
    if state.apply_job_delta(delta).is_none() {
        board_debug!("Dropping live update for unknown job {}", delta.id);
        return Vec::new();
    }
    let reached_terminal = delta
        .status
        .as_ref()
        .is_some_and(|status| status.is_terminal());
    if reached_terminal {
        vec![Effect::ScheduleJobsReload {
            after: TERMINAL_RELOAD_DELAY,
        }]
    } else {
        Vec::new()
    }
}

fn request_action(state: &mut AppState, action: JobAction, job_id: JobId) -> Vec<Effect> {
    if !offers(state, job_id, button_for(action)) {
        state.alert(
            AlertSeverity::Error,
            format!("Crawl job #{job_id} offers no {} action right now", action.verb()),
        );
        return Vec::new();
    }
    if action.needs_confirmation() {
        state.set_pending(Some(PendingAction { action, job_id }));
        Vec::new()
    } else {
        vec![Effect::RunAction { action, job_id }]
    }
}

fn button_for(action: JobAction) -> CardAction {
    match action {
        JobAction::Start => CardAction::Start,
        JobAction::Cancel => CardAction::Cancel,
        JobAction::Delete => CardAction::Delete,
    }
}

/// Whether the card currently on the page shows the given button.
fn offers(state: &AppState, job_id: JobId, action: CardAction) -> bool {
    state
        .page()
        .card(job_id)
        .is_some_and(|card| card.actions.contains(&action))
}
