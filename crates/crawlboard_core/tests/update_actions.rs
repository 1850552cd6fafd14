use std::sync::Once;

use crawlboard_core::{
    update, AlertSeverity, AppState, ChannelStatus, CrawlRecord, Effect, FormField, Job,
    JobAction, JobStatus, Msg, NewJob, RecordsBody, RECORDS_LIMIT,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(board_logging::initialize_for_tests);
}

fn board() -> AppState {
    let jobs = vec![
        Job {
            id: 1,
            status: JobStatus::Pending,
            ..Job::default()
        },
        Job {
            id: 2,
            status: JobStatus::Running,
            ..Job::default()
        },
        Job {
            id: 3,
            status: JobStatus::Completed,
            ..Job::default()
        },
    ];
    let (state, _) = update(AppState::new(), Msg::JobsLoaded(jobs));
    state
}

fn fill_form(mut state: AppState, fields: &[(FormField, &str)]) -> AppState {
    for (field, value) in fields {
        let (next, effects) = update(
            state,
            Msg::FormFieldChanged {
                field: *field,
                value: value.to_string(),
            },
        );
        assert!(effects.is_empty());
        state = next;
    }
    state
}

fn click(state: AppState, action: JobAction, job_id: u64) -> (AppState, Vec<Effect>) {
    update(state, Msg::ActionClicked { action, job_id })
}

#[test]
fn submit_sends_form_payload() {
    init_logging();
    let state = fill_form(
        AppState::new(),
        &[
            (FormField::Name, "Tehran Q1"),
            (FormField::StartDate, "1403/01/01"),
            (FormField::EndDate, "1403/03/31"),
            (FormField::ProvinceId, " 8 "),
            (FormField::TownshipName, "Shemiranat"),
        ],
    );

    let (_, effects) = update(state, Msg::CreateSubmitted);

    assert_eq!(
        effects,
        vec![Effect::CreateJob(NewJob {
            name: "Tehran Q1".to_string(),
            start_date: "1403/01/01".to_string(),
            end_date: "1403/03/31".to_string(),
            province_id: Some(8),
            township_id: None,
            province_name: None,
            township_name: Some("Shemiranat".to_string()),
        })]
    );
}

#[test]
fn non_numeric_id_is_rejected_locally() {
    init_logging();
    let state = fill_form(AppState::new(), &[(FormField::TownshipId, "abc")]);

    let (mut state, effects) = update(state, Msg::CreateSubmitted);

    assert!(effects.is_empty());
    let alerts = state.take_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, AlertSeverity::Error);
    assert!(alerts[0].text.contains("township_id"));
}

#[test]
fn created_job_resets_form_and_reloads() {
    init_logging();
    let state = fill_form(AppState::new(), &[(FormField::Name, "Tabriz")]);

    let (mut state, effects) = update(state, Msg::JobCreated);

    assert_eq!(effects, vec![Effect::LoadJobs, Effect::LoadStats]);
    assert_eq!(state.view().form.get(FormField::Name), "");
    let alerts = state.take_alerts();
    assert_eq!(alerts[0].severity, AlertSeverity::Info);
}

#[test]
fn rejected_create_keeps_form_and_does_not_reload() {
    init_logging();
    let state = fill_form(
        AppState::new(),
        &[(FormField::Name, "Tabriz"), (FormField::StartDate, "bad")],
    );

    let (mut state, effects) = update(state, Msg::CreateFailed("invalid dates".to_string()));

    assert!(effects.is_empty());
    let alerts = state.take_alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].text.contains("invalid dates"));
    let view = state.view();
    assert_eq!(view.form.get(FormField::Name), "Tabriz");
    assert_eq!(view.form.get(FormField::StartDate), "bad");
}

#[test]
fn start_runs_without_confirmation() {
    init_logging();
    let (state, effects) = click(board(), JobAction::Start, 1);

    assert_eq!(
        effects,
        vec![Effect::RunAction {
            action: JobAction::Start,
            job_id: 1
        }]
    );
    assert!(state.view().confirmation.is_none());
}

#[test]
fn cancel_waits_for_confirmation() {
    init_logging();
    let (state, effects) = click(board(), JobAction::Cancel, 2);
    assert!(effects.is_empty());
    let pending = state.view().confirmation.expect("prompt shown");
    assert_eq!(pending.job_id, 2);
    assert!(pending.prompt().contains("#2"));

    let (state, effects) = update(state, Msg::ConfirmationAnswered(true));
    assert_eq!(
        effects,
        vec![Effect::RunAction {
            action: JobAction::Cancel,
            job_id: 2
        }]
    );
    assert!(state.view().confirmation.is_none());
}

#[test]
fn confirmed_cancel_is_dropped_when_reload_removed_the_button() {
    init_logging();
    let (state, _) = click(board(), JobAction::Cancel, 2);
    assert!(state.view().confirmation.is_some());

    // The job finished while the prompt was open.
    let reloaded = vec![Job {
        id: 2,
        status: JobStatus::Completed,
        ..Job::default()
    }];
    let (state, _) = update(state, Msg::JobsLoaded(reloaded));
    let (mut state, effects) = update(state, Msg::ConfirmationAnswered(true));

    assert!(effects.is_empty());
    let alerts = state.take_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, AlertSeverity::Error);
    assert!(alerts[0].text.contains("#2"));
    assert!(state.view().confirmation.is_none());
}

#[test]
fn confirmed_delete_is_dropped_when_the_card_is_gone() {
    init_logging();
    let (state, _) = click(board(), JobAction::Delete, 3);
    let (state, _) = update(state, Msg::JobsLoaded(Vec::new()));
    let (mut state, effects) = update(state, Msg::ConfirmationAnswered(true));

    assert!(effects.is_empty());
    assert_eq!(state.take_alerts().len(), 1);
}

#[test]
fn declined_delete_sends_nothing() {
    init_logging();
    let (state, _) = click(board(), JobAction::Delete, 3);
    let (state, effects) = update(state, Msg::ConfirmationAnswered(false));

    assert!(effects.is_empty());
    assert!(state.view().confirmation.is_none());

    // A stray answer with nothing pending is ignored.
    let (_, effects) = update(state, Msg::ConfirmationAnswered(true));
    assert!(effects.is_empty());
}

#[test]
fn actions_follow_card_buttons() {
    init_logging();
    // Start is only offered on pending jobs, cancel only on running ones.
    let (mut state, effects) = click(board(), JobAction::Start, 2);
    assert!(effects.is_empty());
    assert_eq!(state.take_alerts().len(), 1);

    let (mut state, effects) = click(state, JobAction::Cancel, 3);
    assert!(effects.is_empty());
    assert_eq!(state.take_alerts().len(), 1);

    let (mut state, effects) = click(state, JobAction::Delete, 42);
    assert!(effects.is_empty());
    assert_eq!(state.take_alerts().len(), 1);
    assert!(state.view().confirmation.is_none());
}

#[test]
fn action_success_reloads_per_action() {
    init_logging();
    let cases = [
        (JobAction::Start, vec![Effect::LoadJobs]),
        (JobAction::Cancel, vec![Effect::LoadJobs]),
        (JobAction::Delete, vec![Effect::LoadJobs, Effect::LoadStats]),
    ];
    for (action, expected) in cases {
        let (mut state, effects) = update(board(), Msg::ActionSucceeded { action, job_id: 2 });
        assert_eq!(effects, expected);
        assert_eq!(state.take_alerts()[0].severity, AlertSeverity::Info);
    }
}

#[test]
fn action_failure_alerts_with_server_message() {
    init_logging();
    let (mut state, effects) = update(
        board(),
        Msg::ActionFailed {
            action: JobAction::Start,
            job_id: 1,
            message: "Job is already running".to_string(),
        },
    );

    assert!(effects.is_empty());
    let alerts = state.take_alerts();
    assert_eq!(alerts[0].severity, AlertSeverity::Error);
    assert!(alerts[0].text.contains("Job is already running"));
}

#[test]
fn records_modal_opens_and_closes() {
    init_logging();
    let (state, effects) = update(board(), Msg::RecordsClicked(3));
    assert_eq!(
        effects,
        vec![Effect::LoadRecords {
            job_id: 3,
            limit: RECORDS_LIMIT
        }]
    );

    let (state, _) = update(
        state,
        Msg::RecordsLoaded {
            job_id: 3,
            records: vec![CrawlRecord {
                request_number: Some("REQ-1".to_string()),
                province_title: Some("Tehran".to_string()),
                ..CrawlRecord::default()
            }],
        },
    );
    let modal = state.view().page.modal.expect("modal open");
    match modal.body {
        RecordsBody::Rows(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].request_number, "REQ-1");
            assert_eq!(rows[0].applicant_name, "-");
            assert_eq!(rows[0].location, "Tehran / -");
        }
        other => panic!("expected rows, got {other:?}"),
    }

    let (state, _) = update(state, Msg::ModalClosed);
    assert!(state.view().page.modal.is_none());
}

#[test]
fn empty_records_show_placeholder() {
    init_logging();
    let (state, _) = update(
        board(),
        Msg::RecordsLoaded {
            job_id: 1,
            records: Vec::new(),
        },
    );
    let modal = state.view().page.modal.unwrap();
    assert!(matches!(modal.body, RecordsBody::Placeholder(_)));
}

#[test]
fn close_tears_down_channel_and_ignores_later_messages() {
    init_logging();
    let (state, effects) = update(board(), Msg::CloseRequested);
    assert_eq!(effects, vec![Effect::CloseChannel, Effect::Quit]);
    assert_eq!(state.view().channel, ChannelStatus::Closed);

    let (_, effects) = update(state, Msg::RefreshClicked);
    assert!(effects.is_empty());
}
