//! Headless integration tests for Vigil.
//!
//! These tests exercise the game core without a window or renderer —
//! which is also how the shipped binary runs. They use Bevy's
//! `MinimalPlugins` with a fixed manual time step, drive the inbound
//! event boundary exactly like the presentation layer would, and verify
//! the committed state, the dialogue box, and the outbound notices.
//!
//! Run with: `cargo test --test headless`

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use vigil::actions::ActionsPlugin;
use vigil::day::{DayPlugin, PendingSleepConfirm};
use vigil::focus::FocusPlugin;
use vigil::narrative::NarrativePlugin;
use vigil::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the full game core headless: every shared resource and event
/// registered, all four domain plugins, and a deterministic 100 ms tick.
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));

    // ── Focus mode ───────────────────────────────────────────────────────
    app.init_state::<FocusMode>();

    // ── Shared resources (mirrors main.rs) ───────────────────────────────
    app.init_resource::<SessionState>()
        .init_resource::<DialogueState>()
        .init_resource::<NarrativeQueue>();

    // ── Shared events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<ActionIntent>()
        .add_event::<FocusRequest>()
        .add_event::<PickEvent>()
        .add_event::<SleepRequested>()
        .add_event::<SleepConfirm>()
        .add_event::<AcknowledgeDialogue>()
        .add_event::<StateChangedEvent>()
        .add_event::<DialogueEvent>()
        .add_event::<NoticeEvent>()
        .add_event::<ModeChangedEvent>()
        .add_event::<DayEndEvent>();

    // ── Domain plugins ───────────────────────────────────────────────────
    app.add_plugins((ActionsPlugin, DayPlugin, NarrativePlugin, FocusPlugin));

    app
}

fn session(app: &App) -> &SessionState {
    app.world().resource::<SessionState>()
}

fn set_session(app: &mut App, state: SessionState) {
    *app.world_mut().resource_mut::<SessionState>() = state;
}

/// Requests a focus mode and ticks until the transition applies.
fn enter_mode(app: &mut App, mode: FocusMode) {
    app.world_mut().send_event(FocusRequest { mode });
    app.update();
    app.update();
    assert_eq!(
        app.world().resource::<State<FocusMode>>().get(),
        &mode,
        "focus transition should have applied"
    );
}

fn send_intent(app: &mut App, action: ActionId) {
    app.world_mut().send_event(ActionIntent { action });
    app.update();
}

/// Fast-forwards the narrative session clock and ticks once so due
/// entries fire.
fn advance_narrative(app: &mut App, seconds: f64) {
    app.world_mut().resource_mut::<NarrativeQueue>().clock += seconds;
    app.update();
}

fn drain_notices(app: &mut App) -> Vec<String> {
    app.world_mut()
        .resource_mut::<Events<NoticeEvent>>()
        .drain()
        .map(|e| e.message)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: Action commits and the §-scenario receipts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_pay_care_scenario() {
    let mut app = build_test_app();
    enter_mode(&mut app, FocusMode::Computer);

    // {money: 2500, time: 480, day: 1} is the default opening state.
    send_intent(&mut app, ActionId::PayCare);

    let state = session(&app);
    assert_eq!(state.money, 1_500);
    assert!(state.care_paid);
    assert_eq!(state.time, 490);
}

#[test]
fn test_work_rejected_at_2330_state_unchanged() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            time: 1_430,
            ..Default::default()
        },
    );
    enter_mode(&mut app, FocusMode::Computer);

    let before = session(&app).clone();
    send_intent(&mut app, ActionId::PerformWork);

    assert_eq!(*session(&app), before, "rejection must leave state bit-for-bit equal");
}

#[test]
fn test_work_rejected_without_energy_state_unchanged() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            energy: 29,
            ..Default::default()
        },
    );
    enter_mode(&mut app, FocusMode::Computer);

    let before = session(&app).clone();
    send_intent(&mut app, ActionId::PerformWork);

    assert_eq!(*session(&app), before);
}

#[test]
fn test_work_commits_income_and_energy() {
    let mut app = build_test_app();
    enter_mode(&mut app, FocusMode::Computer);

    send_intent(&mut app, ActionId::PerformWork);

    let state = session(&app);
    assert!(state.work_completed);
    assert_eq!(state.energy, 70);
    assert_eq!(state.time, 600);
    let income = state.money - 2_500;
    assert!((200..=500).contains(&income), "income {income} outside [200, 500]");
}

#[test]
fn test_illegal_intent_rejected_structurally() {
    let mut app = build_test_app();
    // Unfocused room view: workstation actions must not pass.
    let before = session(&app).clone();
    send_intent(&mut app, ActionId::PerformWork);
    assert_eq!(*session(&app), before);

    // Phone mode: still no workstation job.
    enter_mode(&mut app, FocusMode::Phone);
    send_intent(&mut app, ActionId::PerformWork);
    assert_eq!(*session(&app), before);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: Day transitions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_forced_transition_at_day_end() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            day: 2,
            money: 1_000,
            time: 1_450,
            energy: 7,
            clocked_in: true,
            work_completed: true,
            care_paid: true,
            ..Default::default()
        },
    );

    app.update();

    let state = session(&app);
    assert_eq!(state.day, 3);
    assert_eq!(state.time, START_TIME);
    assert_eq!(state.energy, 100);
    assert_eq!(state.money, 500, "forced sleep always costs exactly 500");
    assert!(!state.clocked_in);
    assert!(!state.work_completed);
    assert!(!state.care_paid);
    assert!(state.first_login);
}

#[test]
fn test_day_one_voluntary_sleep_charges_rent() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            time: 1_100,
            work_completed: true,
            ..Default::default()
        },
    );

    app.world_mut().send_event(SleepRequested);
    app.update();

    let state = session(&app);
    assert_eq!(state.day, 2);
    assert_eq!(state.time, 480);
    assert_eq!(state.energy, 100);
    // Rent applies regardless of funds sufficiency — no floor.
    assert_eq!(state.money, 2_500 - 4_000);
}

#[test]
fn test_sleep_rejected_before_threshold() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            time: 1_079,
            work_completed: true,
            ..Default::default()
        },
    );

    let before = session(&app).clone();
    app.world_mut().send_event(SleepRequested);
    app.update();

    assert_eq!(*session(&app), before);
    let notices = drain_notices(&mut app);
    assert!(
        notices.iter().any(|n| n.contains("too early")),
        "expected the too-early rejection, got {notices:?}"
    );
}

#[test]
fn test_unfinished_work_confirmation_gate() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            time: 1_200,
            work_completed: false,
            ..Default::default()
        },
    );

    // First request opens the gate, no transition yet.
    app.world_mut().send_event(SleepRequested);
    app.update();
    assert_eq!(session(&app).day, 1);
    assert!(app.world().resource::<PendingSleepConfirm>().0);

    // Declining closes the gate and changes nothing.
    app.world_mut().send_event(SleepConfirm { accept: false });
    app.update();
    assert_eq!(session(&app).day, 1);
    assert!(!app.world().resource::<PendingSleepConfirm>().0);
    assert_eq!(session(&app).time, 1_200);

    // Ask again and accept this time.
    app.world_mut().send_event(SleepRequested);
    app.update();
    app.world_mut().send_event(SleepConfirm { accept: true });
    app.update();
    assert_eq!(session(&app).day, 2);
    assert_eq!(session(&app).time, START_TIME);
}

#[test]
fn test_grandma_decay_follows_care_payment() {
    // Unpaid: exactly 10 off.
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            day: 2,
            time: 1_440,
            ..Default::default()
        },
    );
    app.update();
    assert_eq!(session(&app).grandma_health, 80);

    // Paid: untouched.
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            day: 2,
            time: 1_440,
            care_paid: true,
            ..Default::default()
        },
    );
    app.update();
    assert_eq!(session(&app).grandma_health, 90);
}

#[test]
fn test_alarm_fires_once_and_does_not_block() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            time: 1_265,
            ..Default::default()
        },
    );

    app.update();
    assert!(session(&app).alarm_triggered);
    let notices = drain_notices(&mut app);
    assert!(notices.iter().any(|n| n.contains("alarm")), "got {notices:?}");

    // Later ticks stay quiet.
    app.update();
    app.update();
    let notices = drain_notices(&mut app);
    assert!(!notices.iter().any(|n| n.contains("alarm")));
    assert_eq!(session(&app).day, 1, "the alarm must not end the day");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: Narrative sequencing and cancellation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_intro_plays_in_order_and_only_once() {
    let mut app = build_test_app();
    app.update();

    let queue = app.world().resource::<NarrativeQueue>();
    assert_eq!(queue.entries.len(), 5, "intro enqueues four beats and a prompt");

    // First beat lands after one second.
    advance_narrative(&mut app, 1.05);
    let dialogue = app.world().resource::<DialogueState>();
    assert!(dialogue.visible);
    assert_eq!(dialogue.speaker, "Grandma");

    // Ticking again never re-enqueues the sequence.
    app.update();
    let queue = app.world().resource::<NarrativeQueue>();
    assert_eq!(queue.entries.len(), 4);
}

#[test]
fn test_day_two_clock_in_pressure_chain() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            day: 2,
            first_login: false,
            ..Default::default()
        },
    );
    enter_mode(&mut app, FocusMode::Computer);

    send_intent(&mut app, ActionId::ClockIn { on_time: true });
    let state = session(&app);
    assert_eq!(state.wechat_unread, 3);
    assert_eq!(state.pressure, 50, "the pressure beat is delayed, not immediate");

    advance_narrative(&mut app, 3.0);
    let state = session(&app);
    assert_eq!(state.pressure, 65);
    let dialogue = app.world().resource::<DialogueState>();
    assert_eq!(dialogue.speaker, "Boss (voice message)");
}

#[test]
fn test_stale_generation_cancelled_on_transition() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            day: 2,
            first_login: false,
            ..Default::default()
        },
    );
    enter_mode(&mut app, FocusMode::Computer);

    // Schedule the delayed boss chain, then let midnight arrive before
    // it fires.
    send_intent(&mut app, ActionId::ClockIn { on_time: true });
    app.world_mut().resource_mut::<SessionState>().time = 1_440;
    app.update();
    assert_eq!(session(&app).day, 3);

    let pressure_before = session(&app).pressure;
    advance_narrative(&mut app, 10.0);
    assert_eq!(
        session(&app).pressure,
        pressure_before,
        "a delayed effect from the ended day must never apply"
    );
    assert!(app.world().resource::<NarrativeQueue>().is_idle());
}

#[test]
fn test_side_quest_grant_applies_after_delay() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            day: 2,
            first_login: false,
            money: 0,
            ..Default::default()
        },
    );
    enter_mode(&mut app, FocusMode::Computer);

    send_intent(&mut app, ActionId::BorrowFromBoss);
    assert_eq!(session(&app).money, 0, "the advance arrives later");
    assert_eq!(session(&app).pressure, 55);

    advance_narrative(&mut app, 3.5);
    let state = session(&app);
    assert_eq!(state.money, 1_000);
    assert!(state.med_path_taken);

    // Once resolved, every branch is closed.
    let before = session(&app).clone();
    send_intent(&mut app, ActionId::GigWork);
    assert_eq!(*session(&app), before);
}

#[test]
fn test_call_sequence_auto_advances_past_acknowledgement() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            first_login: false,
            ..Default::default()
        },
    );
    enter_mode(&mut app, FocusMode::Phone);

    send_intent(&mut app, ActionId::CallGrandma);
    assert_eq!(session(&app).time, 500);

    advance_narrative(&mut app, 0.1);
    let dialogue = app.world().resource::<DialogueState>();
    assert_eq!(dialogue.speaker, "System");

    // Dismiss the box; the chain keeps its own timer regardless.
    app.world_mut().send_event(AcknowledgeDialogue);
    app.update();
    assert!(!app.world().resource::<DialogueState>().visible);

    advance_narrative(&mut app, 4.0);
    let dialogue = app.world().resource::<DialogueState>();
    assert!(dialogue.visible);
    assert_eq!(dialogue.speaker, "Grandma (phone)");
}

#[test]
fn test_first_login_message_on_entering_computer() {
    let mut app = build_test_app();
    app.update();
    assert!(session(&app).first_login);

    enter_mode(&mut app, FocusMode::Computer);
    assert!(!session(&app).first_login, "first login clears on entry");

    advance_narrative(&mut app, 0.5);
    let dialogue = app.world().resource::<DialogueState>();
    assert!(dialogue.visible);
    assert_eq!(dialogue.speaker, "Aunt Wang");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: Focus machine and the picking boundary
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_focus_request_toggles_back_to_none() {
    let mut app = build_test_app();
    enter_mode(&mut app, FocusMode::Phone);

    // Requesting the active mode returns to the room view.
    app.world_mut().send_event(FocusRequest {
        mode: FocusMode::Phone,
    });
    app.update();
    app.update();
    assert_eq!(
        app.world().resource::<State<FocusMode>>().get(),
        &FocusMode::None
    );
}

#[test]
fn test_pick_events_route_by_object_identity() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            first_login: false,
            ..Default::default()
        },
    );

    app.world_mut().send_event(PickEvent {
        target: PickTarget::Computer,
    });
    app.update();
    app.update();
    app.update();
    assert_eq!(
        app.world().resource::<State<FocusMode>>().get(),
        &FocusMode::Computer
    );

    // Back to the room, then pick the photo frame: a monologue, no mode
    // change.
    app.world_mut().send_event(FocusRequest {
        mode: FocusMode::None,
    });
    app.update();
    app.update();
    app.world_mut().send_event(PickEvent {
        target: PickTarget::Photo,
    });
    app.update();
    app.update();
    advance_narrative(&mut app, 0.1);

    assert_eq!(
        app.world().resource::<State<FocusMode>>().get(),
        &FocusMode::None
    );
    let dialogue = app.world().resource::<DialogueState>();
    assert!(dialogue.visible);
    assert_eq!(dialogue.speaker, "Monologue");
}

#[test]
fn test_camera_action_moves_focus_and_costs_energy() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            first_login: false,
            ..Default::default()
        },
    );
    enter_mode(&mut app, FocusMode::Computer);

    send_intent(&mut app, ActionId::CheckCamera);
    let state = session(&app);
    assert_eq!(state.energy, 95);
    assert_eq!(state.time, 490);

    // The focus payload fires at zero delay; let it flow through.
    advance_narrative(&mut app, 0.1);
    app.update();
    assert_eq!(
        app.world().resource::<State<FocusMode>>().get(),
        &FocusMode::Camera
    );
}

#[test]
fn test_day_transition_resets_focus() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            first_login: false,
            time: 1_100,
            work_completed: true,
            ..Default::default()
        },
    );
    enter_mode(&mut app, FocusMode::Phone);

    // Sleep is only reachable from the room view.
    app.world_mut().send_event(FocusRequest {
        mode: FocusMode::None,
    });
    app.update();
    app.update();
    app.world_mut().send_event(SleepRequested);
    app.update();
    app.update();

    assert_eq!(session(&app).day, 2);
    assert_eq!(
        app.world().resource::<State<FocusMode>>().get(),
        &FocusMode::None
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: Outbound boundary
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_snapshot_pushed_after_commit() {
    let mut app = build_test_app();
    enter_mode(&mut app, FocusMode::Computer);

    // Clear anything the setup produced, then commit one action.
    let _ = app
        .world_mut()
        .resource_mut::<Events<StateChangedEvent>>()
        .drain()
        .count();
    send_intent(&mut app, ActionId::ClockIn { on_time: true });

    let snapshots: Vec<SessionState> = app
        .world_mut()
        .resource_mut::<Events<StateChangedEvent>>()
        .drain()
        .map(|e| e.snapshot)
        .collect();
    assert!(!snapshots.is_empty());
    let last = snapshots.last().unwrap();
    assert_eq!(last.money, 3_000);
    assert!(last.clocked_in);
}

#[test]
fn test_insufficient_funds_notice_and_no_change() {
    let mut app = build_test_app();
    set_session(
        &mut app,
        SessionState {
            money: 400,
            first_login: false,
            ..Default::default()
        },
    );
    enter_mode(&mut app, FocusMode::Computer);
    let _ = drain_notices(&mut app);

    let before = session(&app).clone();
    send_intent(&mut app, ActionId::BuyMeds);

    assert_eq!(*session(&app), before);
    let notices = drain_notices(&mut app);
    assert!(
        notices.iter().any(|n| n.contains("Insufficient")),
        "got {notices:?}"
    );
}
