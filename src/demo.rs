//! Scripted stand-in for the presentation layer.
//!
//! The real game front-end is a 3D room with a computer, a phone and a
//! photo frame; it talks to this core purely through events. The demo
//! plugin plays that role headless: it feeds a canonical two-day session
//! through the inbound boundary on a timetable and mirrors the outbound
//! events to the log, then prints the final snapshot as JSON and exits.

use bevy::prelude::*;

use crate::shared::*;

#[derive(Debug, Clone)]
enum Step {
    Pick(PickTarget),
    Intent(ActionId),
    Focus(FocusMode),
    Sleep,
    Confirm(bool),
    /// The afternoon passes: advance the in-game clock through the same
    /// serialized queue every other delayed effect uses.
    PassTime(u32),
}

#[derive(Resource)]
struct DemoScript {
    steps: Vec<(f64, Step)>,
    cursor: usize,
}

impl Default for DemoScript {
    fn default() -> Self {
        use Step::*;
        Self {
            cursor: 0,
            steps: vec![
                // Day 1 — the intro call plays out first.
                (24.0, Pick(PickTarget::Computer)),
                (26.0, Intent(ActionId::ClockIn { on_time: true })),
                (28.0, Intent(ActionId::CheckWechat)),
                (30.0, Intent(ActionId::PayCare)),
                (32.0, Intent(ActionId::PerformWork)),
                (36.0, Intent(ActionId::CheckCamera)),
                (38.0, Focus(FocusMode::None)),
                (40.0, Pick(PickTarget::Phone)),
                (42.0, Intent(ActionId::CallGrandma)),
                (63.0, Focus(FocusMode::None)),
                (64.0, Pick(PickTarget::Photo)),
                // Too early — the engine turns this one down.
                (66.0, Sleep),
                (67.0, PassTime(420)),
                (69.0, Sleep),
                // Day 2 — rent has landed, the medicine crisis opens.
                (72.0, Pick(PickTarget::Computer)),
                (74.0, Intent(ActionId::ClockIn { on_time: true })),
                (78.0, Intent(ActionId::CheckWechat)),
                (80.0, Intent(ActionId::ViewAlbum)),
                (85.0, Intent(ActionId::GigWork)),
                (90.0, Intent(ActionId::BuyMeds)),
                (92.0, Focus(FocusMode::None)),
                (93.0, PassTime(800)),
                // Work never got done today; the gate asks first.
                (95.0, Sleep),
                (97.0, Confirm(true)),
            ],
        }
    }
}

pub struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DemoScript>()
            .add_systems(Startup, accelerate_clock)
            .add_systems(
                Update,
                (drive_script, mirror_dialogue, mirror_notices, mirror_modes, finish_when_done),
            );
    }
}

/// The demo has no player waiting on it; run the session clock fast.
fn accelerate_clock(mut time: ResMut<Time<Virtual>>) {
    time.set_relative_speed(8.0);
}

fn drive_script(
    time: Res<Time>,
    mut script: ResMut<DemoScript>,
    mut queue: ResMut<NarrativeQueue>,
    mut picks: EventWriter<PickEvent>,
    mut intents: EventWriter<ActionIntent>,
    mut focus_requests: EventWriter<FocusRequest>,
    mut sleep_requests: EventWriter<SleepRequested>,
    mut confirmations: EventWriter<SleepConfirm>,
) {
    let now = time.elapsed_secs_f64();
    while script.cursor < script.steps.len() && script.steps[script.cursor].0 <= now {
        let (_, step) = script.steps[script.cursor].clone();
        script.cursor += 1;
        info!("[Demo] {:?}", step);
        match step {
            Step::Pick(target) => {
                picks.send(PickEvent { target });
            }
            Step::Intent(action) => {
                intents.send(ActionIntent { action });
            }
            Step::Focus(mode) => {
                focus_requests.send(FocusRequest { mode });
            }
            Step::Sleep => {
                sleep_requests.send(SleepRequested);
            }
            Step::Confirm(accept) => {
                confirmations.send(SleepConfirm { accept });
            }
            Step::PassTime(minutes) => {
                queue.schedule_in(
                    0.0,
                    ScheduledPayload::Apply(StateDelta {
                        minutes,
                        ..Default::default()
                    }),
                );
            }
        }
    }
}

fn mirror_dialogue(mut events: EventReader<DialogueEvent>) {
    for event in events.read() {
        info!("[Room] {}: {}", event.speaker, event.text);
    }
}

fn mirror_notices(mut events: EventReader<NoticeEvent>) {
    for event in events.read() {
        info!("[Room] * {}", event.message);
    }
}

fn mirror_modes(mut events: EventReader<ModeChangedEvent>) {
    for event in events.read() {
        info!("[Room] camera moves to {:?}", event.mode);
    }
}

/// Once the script is spent and the queue has drained, print the final
/// snapshot across the boundary and exit.
fn finish_when_done(
    script: Res<DemoScript>,
    state: Res<SessionState>,
    queue: Res<NarrativeQueue>,
    mut exit: EventWriter<AppExit>,
) {
    if script.cursor < script.steps.len() || state.day < 3 || !queue.is_idle() {
        return;
    }
    match serde_json::to_string_pretty(&*state) {
        Ok(snapshot) => println!("{snapshot}"),
        Err(err) => warn!("[Demo] snapshot serialization failed: {err}"),
    }
    exit.send(AppExit::Success);
}
