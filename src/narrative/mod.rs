//! Dialogue/Event Sequencer — plays ordered, time-delayed narrative
//! beats and applies delayed state effects.
//!
//! Everything delayed goes through the one `NarrativeQueue`: beats,
//! grants, notices, focus returns. Entries fire in (time, insertion)
//! order on the session clock, so two chains can never corrupt each
//! other's ordering, and a day transition cancels the stale generation
//! wholesale.

pub mod script;

use bevy::prelude::*;

use crate::shared::*;

pub struct NarrativePlugin;

impl Plugin for NarrativePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (trigger_intro, advance_sequencer, acknowledge_dialogue).chain(),
        )
        .add_systems(OnEnter(FocusMode::Computer), first_login_on_computer);
    }
}

/// Enqueues the day-1 intro exactly once, and only at the session's
/// opening moment.
pub fn trigger_intro(
    state: Res<SessionState>,
    mut queue: ResMut<NarrativeQueue>,
    mut started: Local<bool>,
) {
    if *started {
        return;
    }
    if state.day == 1 && state.time == START_TIME && state.first_login {
        for (delay, payload) in script::build_intro_sequence() {
            queue.schedule_in(delay, payload);
        }
        *started = true;
        info!("[Narrative] Intro sequence scheduled");
    }
}

/// Advances the session clock and fires every due entry. Beats overwrite
/// the dialogue box outright; auto-advancing chains ignore whether the
/// player acknowledged the previous line.
pub fn advance_sequencer(
    time: Res<Time>,
    mut queue: ResMut<NarrativeQueue>,
    mut state: ResMut<SessionState>,
    mut dialogue: ResMut<DialogueState>,
    current_mode: Res<State<FocusMode>>,
    mut next_mode: ResMut<NextState<FocusMode>>,
    mut dialogue_out: EventWriter<DialogueEvent>,
    mut notices: EventWriter<NoticeEvent>,
    mut changed: EventWriter<StateChangedEvent>,
) {
    queue.clock += time.delta_secs_f64();

    for entry in queue.take_due() {
        match entry.payload {
            ScheduledPayload::Beat(beat) => {
                dialogue.speaker = beat.speaker.clone();
                dialogue.text = beat.text.clone();
                dialogue.visible = true;
                dialogue_out.send(DialogueEvent {
                    speaker: beat.speaker,
                    text: beat.text,
                });
            }
            ScheduledPayload::Apply(delta) => {
                state.apply(&delta);
                changed.send(StateChangedEvent {
                    snapshot: state.clone(),
                });
                info!(
                    "[Narrative] Delayed effect applied — {} yuan, pressure {}",
                    state.money, state.pressure
                );
            }
            ScheduledPayload::Notice(message) => {
                notices.send(NoticeEvent { message });
            }
            ScheduledPayload::Focus(mode) => {
                if *current_mode.get() != mode {
                    next_mode.set(mode);
                }
            }
        }
    }
}

/// The designated key dismisses the general dialogue box. Sequences in
/// flight keep their own timers and simply overwrite it again.
pub fn acknowledge_dialogue(
    mut acknowledgements: EventReader<AcknowledgeDialogue>,
    mut dialogue: ResMut<DialogueState>,
) {
    for _ in acknowledgements.read() {
        if dialogue.visible {
            dialogue.visible = false;
        }
    }
}

/// First workstation login of the day: clear the flag and surface the
/// caretaker's waiting message a moment later.
pub fn first_login_on_computer(
    mut state: ResMut<SessionState>,
    mut queue: ResMut<NarrativeQueue>,
    mut changed: EventWriter<StateChangedEvent>,
) {
    if !state.first_login {
        return;
    }
    let beat = script::first_login_beat(&state);
    state.apply(&StateDelta {
        first_login: Some(false),
        ..Default::default()
    });
    queue.schedule_in(0.5, ScheduledPayload::Beat(beat));
    changed.send(StateChangedEvent {
        snapshot: state.clone(),
    });
    info!("[Narrative] First login of day {} — caretaker message queued", state.day);
}
