use std::sync::Once;

use crawlboard_core::{
    update, AppState, CardAction, Effect, Job, JobDelta, JobStatus, Locale, Msg, PushMessage,
    StatsSnapshot, TERMINAL_RELOAD_DELAY,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(board_logging::initialize_for_tests);
}

fn job(id: u64, status: JobStatus) -> Job {
    Job {
        id,
        name: format!("crawl {id}"),
        start_date: "1402/01/01".to_string(),
        end_date: "1402/12/29".to_string(),
        status,
        total_records: 500,
        fetched_records: 100,
        current_page: 2,
        total_pages: 10,
        progress_percentage: 20,
        created_at: "2024-01-05T10:20:30Z".to_string(),
        ..Job::default()
    }
}

fn loaded(jobs: Vec<Job>) -> AppState {
    let (mut state, _) = update(AppState::with_locale(Locale::English), Msg::JobsLoaded(jobs));
    assert!(state.consume_dirty());
    state
}

fn push_update(state: AppState, delta: JobDelta) -> (AppState, Vec<Effect>) {
    update(state, Msg::Push(PushMessage::JobUpdate(delta)))
}

#[test]
fn unknown_job_update_is_dropped() {
    init_logging();
    let state = loaded(vec![job(1, JobStatus::Running)]);
    let before = state.clone();

    let (mut next, effects) = push_update(
        state,
        JobDelta {
            id: 99,
            progress_percentage: Some(80),
            status: Some(JobStatus::Completed),
            ..JobDelta::default()
        },
    );

    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
    assert_eq!(next, before);
    assert!(next.view().page.card(99).is_none());
}

#[test]
fn known_job_update_merges_fields_and_patches_progress() {
    init_logging();
    let state = loaded(vec![job(1, JobStatus::Running), job(2, JobStatus::Pending)]);

    let (mut next, effects) = push_update(
        state,
        JobDelta {
            id: 1,
            progress_percentage: Some(45),
            fetched_records: Some(2250),
            total_records: Some(5000),
            current_page: Some(5),
            total_pages: Some(11),
            status: None,
        },
    );

    assert!(effects.is_empty());
    assert!(next.consume_dirty());

    let cached = next.job(1).expect("job stays cached");
    assert_eq!(cached.progress_percentage, 45);
    assert_eq!(cached.fetched_records, 2250);
    assert_eq!(cached.total_records, 5000);
    assert_eq!(cached.current_page, 5);
    assert_eq!(cached.total_pages, 11);
    assert_eq!(cached.name, "crawl 1");
    assert_eq!(cached.status, JobStatus::Running);

    let view = next.view();
    let card = view.page.card(1).expect("card");
    let progress = card.progress.as_ref().expect("running card has progress");
    assert_eq!(progress.fill_width, 45);
    assert_eq!(progress.fill_label, "45%");
    assert_eq!(progress.info, "2,250 / 5,000 records - page 5 of 11");
    assert_eq!(card.records, "2,250 / 5,000");

    // Untouched neighbour.
    assert_eq!(view.page.card(2).unwrap().records, "100 / 500");
}

#[test]
fn partial_delta_keeps_prior_fields() {
    init_logging();
    let state = loaded(vec![job(3, JobStatus::Running)]);

    let (next, _) = push_update(
        state,
        JobDelta {
            id: 3,
            fetched_records: Some(150),
            ..JobDelta::default()
        },
    );

    let cached = next.job(3).unwrap();
    assert_eq!(cached.fetched_records, 150);
    assert_eq!(cached.total_records, 500);
    assert_eq!(cached.progress_percentage, 20);
    let view = next.view();
    let card = view.page.card(3).unwrap();
    assert_eq!(
        card.progress.as_ref().unwrap().info,
        "150 / 500 records - page 2 of 10"
    );
}

#[test]
fn patch_leaves_badge_and_actions_alone() {
    init_logging();
    let state = loaded(vec![job(4, JobStatus::Running)]);
    let before = state.view().page.card(4).cloned().unwrap();

    let (next, _) = push_update(
        state,
        JobDelta {
            id: 4,
            progress_percentage: Some(100),
            status: Some(JobStatus::Completed),
            ..JobDelta::default()
        },
    );

    let view = next.view();
    let after = view.page.card(4).unwrap();
    assert_eq!(after.badge, before.badge);
    assert_eq!(after.actions, vec![CardAction::Cancel, CardAction::Records, CardAction::Delete]);
    assert_eq!(after.progress.as_ref().unwrap().fill_width, 100);
    assert_eq!(next.job(4).unwrap().status, JobStatus::Completed);
}

#[test]
fn patch_does_not_create_progress_for_non_running_card() {
    init_logging();
    let state = loaded(vec![job(5, JobStatus::Pending)]);

    let (next, _) = push_update(
        state,
        JobDelta {
            id: 5,
            progress_percentage: Some(30),
            fetched_records: Some(7),
            ..JobDelta::default()
        },
    );

    let view = next.view();
    let card = view.page.card(5).unwrap();
    assert!(card.progress.is_none());
    assert_eq!(card.records, "7 / 500");
}

#[test]
fn terminal_status_schedules_exactly_one_reload() {
    init_logging();
    for status in [JobStatus::Completed, JobStatus::Failed] {
        let state = loaded(vec![job(6, JobStatus::Running)]);
        let (_, effects) = push_update(
            state,
            JobDelta {
                id: 6,
                status: Some(status),
                ..JobDelta::default()
            },
        );
        assert_eq!(
            effects,
            vec![Effect::ScheduleJobsReload {
                after: TERMINAL_RELOAD_DELAY
            }]
        );
    }
}

#[test]
fn running_and_cancelled_updates_do_not_reload() {
    init_logging();
    for status in [JobStatus::Running, JobStatus::Cancelled] {
        let state = loaded(vec![job(7, JobStatus::Running)]);
        let (_, effects) = push_update(
            state,
            JobDelta {
                id: 7,
                status: Some(status),
                ..JobDelta::default()
            },
        );
        assert!(effects.is_empty());
    }
}

#[test]
fn stats_push_replaces_panel() {
    init_logging();
    let state = AppState::with_locale(Locale::English);
    let (state, _) = update(
        state,
        Msg::StatsLoaded(StatsSnapshot {
            total_jobs: 1,
            ..StatsSnapshot::default()
        }),
    );
    let (mut state, effects) = update(
        state,
        Msg::Push(PushMessage::Stats(StatsSnapshot {
            total_jobs: 3,
            running_jobs: 1,
            completed_jobs: 2,
            total_records: 12345,
            ..StatsSnapshot::default()
        })),
    );

    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    let stats = state.view().page.stats.unwrap();
    assert_eq!(stats.total_jobs, "3");
    assert_eq!(stats.running_jobs, "1");
    assert_eq!(stats.completed_jobs, "2");
    assert_eq!(stats.total_records, "12,345");
}

#[test]
fn error_and_unrecognized_messages_are_ignored() {
    init_logging();
    let mut state = loaded(vec![job(8, JobStatus::Running)]);
    let _ = state.consume_dirty();
    let before = state.clone();

    let (state, effects) = update(state, Msg::Push(PushMessage::Error("db down".into())));
    assert!(effects.is_empty());
    let (mut state, effects) = update(
        state,
        Msg::Push(PushMessage::Unrecognized("worker_status".into())),
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert!(state.take_alerts().is_empty());
    assert_eq!(state, before);
}

#[test]
fn reload_after_patch_overwrites_with_server_truth() {
    init_logging();
    let state = loaded(vec![job(9, JobStatus::Running)]);
    let (state, _) = push_update(
        state,
        JobDelta {
            id: 9,
            progress_percentage: Some(100),
            status: Some(JobStatus::Completed),
            ..JobDelta::default()
        },
    );

    let mut finished = job(9, JobStatus::Completed);
    finished.progress_percentage = 100;
    let (state, _) = update(state, Msg::JobsLoaded(vec![finished]));

    let view = state.view();
    let card = view.page.card(9).unwrap();
    assert_eq!(card.badge.class, "status-completed");
    assert!(card.progress.is_none());
    assert_eq!(card.actions, vec![CardAction::Records, CardAction::Delete]);
}
