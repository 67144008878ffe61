//! Time/Action Engine — validates player intents against the session
//! state and commits the results.
//!
//! Responsible for:
//! - Structural legality: an intent illegal in the current focus mode is
//!   rejected before validation (never relies on hidden buttons)
//! - Calling the pure `attempt` contract and applying the winning delta
//! - Scheduling every delayed follow-up on the narrative queue
//! - Pushing a `StateChangedEvent` snapshot after each commit

pub mod contract;

use bevy::prelude::*;

use crate::shared::*;
pub use contract::{attempt, roll_work_income, side_quest_open, ActionOutcome};

pub struct ActionsPlugin;

impl Plugin for ActionsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_action_intents);
    }
}

/// The single writer: reads intents, validates, commits, schedules.
/// Rejections leave the session state bit-for-bit unchanged.
pub fn handle_action_intents(
    mut intents: EventReader<ActionIntent>,
    mode: Res<State<FocusMode>>,
    mut state: ResMut<SessionState>,
    mut queue: ResMut<NarrativeQueue>,
    mut changed: EventWriter<StateChangedEvent>,
    mut notices: EventWriter<NoticeEvent>,
) {
    for intent in intents.read() {
        let action = intent.action;
        let current_mode = *mode.get();

        if !intent_allowed(current_mode, action) {
            // Programming-contract violation, not a narrative beat: a
            // well-behaved presentation layer can never send this.
            warn!(
                "[Actions] Illegal intent {:?} in mode {:?} — rejected structurally",
                action, current_mode
            );
            continue;
        }

        match contract::attempt(action, &state) {
            Ok(outcome) => {
                state.apply(&outcome.delta);
                if let Some(message) = outcome.notice {
                    notices.send(NoticeEvent { message });
                }
                for (delay, payload) in outcome.followups {
                    queue.schedule_in(delay, payload);
                }
                changed.send(StateChangedEvent {
                    snapshot: state.clone(),
                });
                info!(
                    "[Actions] {:?} committed — {} | {} yuan | energy {}",
                    action,
                    fmt_clock(state.time),
                    state.money,
                    state.energy
                );
            }
            Err(rejection) => {
                info!("[Actions] {:?} rejected: {:?}", action, rejection);
                surface_rejection(&rejection, &mut queue, &mut notices);
            }
        }
    }
}

/// Time rejections for the camera and the call come through the dialogue
/// box as the narrator; everything else is an alert-class notice.
fn surface_rejection(
    rejection: &Rejection,
    queue: &mut NarrativeQueue,
    notices: &mut EventWriter<NoticeEvent>,
) {
    let Some(message) = rejection.message() else {
        return;
    };
    match rejection {
        Rejection::TimeExceeded {
            action: ActionId::CheckCamera | ActionId::CallGrandma,
        } => {
            queue.schedule_in(0.0, ScheduledPayload::Beat(Beat::new("System", message)));
        }
        _ => {
            notices.send(NoticeEvent { message });
        }
    }
}
