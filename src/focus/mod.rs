//! Focus-mode state machine — which surface owns the player's attention.
//!
//! The 3D scene owns camera tweening and raycasting; this module only
//! receives transition requests and pick identities, arbitrates them,
//! and reports mode changes back out. Toggle semantics match the room
//! controls: requesting the mode that is already active returns to the
//! unfocused view.

use bevy::prelude::*;
use bevy::state::state::StateTransitionEvent;

use crate::shared::*;

pub struct FocusPlugin;

impl Plugin for FocusPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_pick_events, handle_focus_requests, relay_mode_changes).chain(),
        );
    }
}

/// Toggle-style requests from keys ([U]/[E]/Escape) or clicks.
pub fn handle_focus_requests(
    mut requests: EventReader<FocusRequest>,
    mode: Res<State<FocusMode>>,
    mut next_mode: ResMut<NextState<FocusMode>>,
) {
    for request in requests.read() {
        let current = *mode.get();
        let target = if request.mode == current {
            FocusMode::None
        } else {
            request.mode
        };
        if target != current {
            next_mode.set(target);
            info!("[Focus] {:?} -> {:?}", current, target);
        }
    }
}

/// Picks arrive by object identity from the external scene. The photo is
/// an action, not a focus target.
pub fn handle_pick_events(
    mut picks: EventReader<PickEvent>,
    mut focus_requests: EventWriter<FocusRequest>,
    mut intents: EventWriter<ActionIntent>,
) {
    for pick in picks.read() {
        match pick.target {
            PickTarget::Computer => {
                focus_requests.send(FocusRequest {
                    mode: FocusMode::Computer,
                });
            }
            PickTarget::Phone => {
                focus_requests.send(FocusRequest {
                    mode: FocusMode::Phone,
                });
            }
            PickTarget::Photo => {
                intents.send(ActionIntent {
                    action: ActionId::ViewPhoto,
                });
            }
        }
    }
}

/// Pushes every real mode change across the presentation boundary.
pub fn relay_mode_changes(
    mut transitions: EventReader<StateTransitionEvent<FocusMode>>,
    mut out: EventWriter<ModeChangedEvent>,
) {
    for transition in transitions.read() {
        if transition.exited == transition.entered {
            continue;
        }
        if let Some(mode) = transition.entered {
            out.send(ModeChangedEvent { mode });
        }
    }
}
