//! Day Transition Controller — the heartbeat of Vigil.
//!
//! Responsible for:
//! - Watching committed time every tick and forcing a transition once it
//!   reaches the day-end boundary (with the forced-sleep fine)
//! - The one-time 21:00 alarm (informs, never blocks)
//! - Voluntary sleep, including the unfinished-work confirmation gate
//! - Building the next day's state wholesale: carry-overs, rent on the
//!   first night, unpaid-care health decay, per-day flag resets
//! - Cancelling the stale narrative generation so a delayed effect from
//!   the old day can never land in the new one

use bevy::prelude::*;

use crate::shared::*;

/// Set while the unfinished-work yes/no gate is waiting for an answer.
#[derive(Resource, Debug, Clone, Default)]
pub struct PendingSleepConfirm(pub bool);

pub struct DayPlugin;

impl Plugin for DayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingSleepConfirm>().add_systems(
            Update,
            (
                handle_sleep_requests,
                handle_sleep_confirmations,
                watch_day_boundary,
            )
                .chain(),
        );
    }
}

/// Builds the replacement state for the next morning. The record is
/// swapped wholesale, never migrated field-by-field: resets are explicit
/// and everything else carries forward.
pub fn advance_day(state: &SessionState, forced: bool) -> SessionState {
    let mut money = state.money;
    if forced {
        money -= FORCED_SLEEP_FINE;
    }
    // Rent comes due on the first night, sufficient funds or not.
    if state.day == 1 {
        money -= RENT_COST;
    }

    let grandma_health = if state.care_paid {
        state.grandma_health
    } else {
        state.grandma_health.saturating_sub(UNPAID_CARE_DECAY)
    };

    SessionState {
        money,
        time: START_TIME,
        energy: 100,
        meds: state.meds,
        grandma_health,
        day: state.day + 1,
        clocked_in: false,
        work_completed: false,
        care_paid: false,
        first_login: true,
        alarm_triggered: false,
        rent_due_in: RENT_DUE_RESET,
        pressure: state.pressure,
        low_blood_pressure: true,
        wechat_unread: state.wechat_unread,
        friend_messaged: state.friend_messaged,
        med_path_taken: state.med_path_taken,
    }
}

/// Passive observer over committed state. Forces the transition at the
/// day-end boundary; fires the one-time late-evening alarm.
pub fn watch_day_boundary(
    mut state: ResMut<SessionState>,
    mut queue: ResMut<NarrativeQueue>,
    mut next_mode: ResMut<NextState<FocusMode>>,
    mut notices: EventWriter<NoticeEvent>,
    mut day_end: EventWriter<DayEndEvent>,
    mut changed: EventWriter<StateChangedEvent>,
) {
    if state.time >= DAY_END_TIME {
        run_transition(
            true,
            &mut state,
            &mut queue,
            &mut next_mode,
            &mut notices,
            &mut day_end,
            &mut changed,
        );
        return;
    }

    if state.time >= ALARM_TIME && !state.alarm_triggered {
        state.alarm_triggered = true;
        let mut message =
            "The alarm chimes: it's past 21:00 — time to wind down.".to_string();
        if state.work_completed {
            message.push_str(" Today's work is done. Good showing!");
        } else {
            message.push_str(" Careful: the work isn't finished, and staying up wears you down.");
        }
        notices.send(NoticeEvent { message });
        changed.send(StateChangedEvent {
            snapshot: state.clone(),
        });
        info!("[Day] 21:00 alarm fired on day {}", state.day);
    }
}

/// Voluntary sleep. Only reachable from the unfocused room view; too
/// early is rejected outright; unfinished work routes through the
/// confirmation gate.
pub fn handle_sleep_requests(
    mut requests: EventReader<SleepRequested>,
    mode: Res<State<FocusMode>>,
    mut pending: ResMut<PendingSleepConfirm>,
    mut state: ResMut<SessionState>,
    mut queue: ResMut<NarrativeQueue>,
    mut next_mode: ResMut<NextState<FocusMode>>,
    mut notices: EventWriter<NoticeEvent>,
    mut day_end: EventWriter<DayEndEvent>,
    mut changed: EventWriter<StateChangedEvent>,
) {
    for _ in requests.read() {
        if *mode.get() != FocusMode::None {
            warn!(
                "[Day] Sleep requested while focused on {:?} — rejected structurally",
                mode.get()
            );
            continue;
        }

        if state.time < SLEEP_THRESHOLD {
            if let Some(message) = Rejection::TooEarlyToSleep.message() {
                notices.send(NoticeEvent { message });
            }
            continue;
        }

        if !state.work_completed {
            // Gate on the yes/no confirmation; repeat requests while the
            // gate is open are ignored rather than treated as consent.
            if !pending.0 {
                pending.0 = true;
                notices.send(NoticeEvent {
                    message: "You haven't finished today's work! Sleeping now may hurt \
                              tomorrow's review. Rest anyway?"
                        .to_string(),
                });
            }
            continue;
        }

        run_transition(
            false,
            &mut state,
            &mut queue,
            &mut next_mode,
            &mut notices,
            &mut day_end,
            &mut changed,
        );
    }
}

/// Answer to the unfinished-work gate. Declining leaves everything
/// untouched.
pub fn handle_sleep_confirmations(
    mut confirmations: EventReader<SleepConfirm>,
    mut pending: ResMut<PendingSleepConfirm>,
    mut state: ResMut<SessionState>,
    mut queue: ResMut<NarrativeQueue>,
    mut next_mode: ResMut<NextState<FocusMode>>,
    mut notices: EventWriter<NoticeEvent>,
    mut day_end: EventWriter<DayEndEvent>,
    mut changed: EventWriter<StateChangedEvent>,
) {
    for confirm in confirmations.read() {
        if !pending.0 {
            warn!("[Day] SleepConfirm received with no pending confirmation");
            continue;
        }
        pending.0 = false;

        if !confirm.accept {
            info!("[Day] Sleep declined at the confirmation gate");
            continue;
        }

        run_transition(
            false,
            &mut state,
            &mut queue,
            &mut next_mode,
            &mut notices,
            &mut day_end,
            &mut changed,
        );
    }
}

fn run_transition(
    forced: bool,
    state: &mut SessionState,
    queue: &mut NarrativeQueue,
    next_mode: &mut NextState<FocusMode>,
    notices: &mut EventWriter<NoticeEvent>,
    day_end: &mut EventWriter<DayEndEvent>,
    changed: &mut EventWriter<StateChangedEvent>,
) {
    let ended_day = state.day;
    let rent_charged = state.day == 1;
    let health_before = state.grandma_health;

    *state = advance_day(state, forced);

    // Anything still pending from the ended day is void.
    queue.begin_generation();
    next_mode.set(FocusMode::None);

    if rent_charged {
        notices.send(NoticeEvent {
            message: format!(
                "Rent reminder! {} yuan for the new day (day {}) has been \
                 deducted automatically.",
                RENT_COST, state.day
            ),
        });
    }

    let summary = if forced {
        "Midnight. Exhaustion forces you to sleep — the unfinished night \
         costs you at work."
    } else {
        "A new day begins. Energy restored."
    };
    notices.send(NoticeEvent {
        message: summary.to_string(),
    });

    if health_before > 0 && state.grandma_health == 0 {
        notices.send(NoticeEvent {
            message: "The caretaker is calling, panicked — Grandma has collapsed. \
                      Everything else stops mattering."
                .to_string(),
        });
    }

    day_end.send(DayEndEvent { ended_day, forced });
    changed.send(StateChangedEvent {
        snapshot: state.clone(),
    });

    info!(
        "[Day] Day {} ended ({}) — day {} begins with {} yuan, grandma at {}",
        ended_day,
        if forced { "forced" } else { "voluntary" },
        state.day,
        state.money,
        state.grandma_health
    );
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_resets_per_day_fields() {
        let state = SessionState {
            time: 1_440,
            energy: 12,
            clocked_in: true,
            work_completed: true,
            care_paid: true,
            alarm_triggered: true,
            first_login: false,
            day: 3,
            ..Default::default()
        };
        let next = advance_day(&state, false);
        assert_eq!(next.day, 4);
        assert_eq!(next.time, START_TIME);
        assert_eq!(next.energy, 100);
        assert!(!next.clocked_in);
        assert!(!next.work_completed);
        assert!(!next.care_paid);
        assert!(!next.alarm_triggered);
        assert!(next.first_login);
        assert!(next.low_blood_pressure);
        assert_eq!(next.rent_due_in, RENT_DUE_RESET);
    }

    #[test]
    fn test_day_one_rent_applies_without_floor() {
        // Rent always lands, regardless of funds sufficiency.
        let state = SessionState::default();
        let next = advance_day(&state, false);
        assert_eq!(next.money, 2_500 - 4_000);
        assert_eq!(next.day, 2);
    }

    #[test]
    fn test_forced_fine_stacks_with_rent() {
        let state = SessionState::default();
        let next = advance_day(&state, true);
        assert_eq!(next.money, 2_500 - 500 - 4_000);
    }

    #[test]
    fn test_forced_fine_alone_after_day_one() {
        let state = SessionState {
            day: 2,
            money: 1_000,
            ..Default::default()
        };
        let next = advance_day(&state, true);
        assert_eq!(next.money, 500);
    }

    #[test]
    fn test_grandma_decays_only_when_care_unpaid() {
        let unpaid = SessionState::default();
        assert_eq!(advance_day(&unpaid, false).grandma_health, 80);

        let paid = SessionState {
            care_paid: true,
            ..Default::default()
        };
        assert_eq!(advance_day(&paid, false).grandma_health, 90);
    }

    #[test]
    fn test_grandma_health_floors_at_zero() {
        let state = SessionState {
            grandma_health: 5,
            ..Default::default()
        };
        assert_eq!(advance_day(&state, false).grandma_health, 0);
    }

    #[test]
    fn test_carry_over_fields_survive() {
        let state = SessionState {
            day: 2,
            meds: 2,
            pressure: 70,
            wechat_unread: 3,
            friend_messaged: true,
            med_path_taken: true,
            ..Default::default()
        };
        let next = advance_day(&state, false);
        assert_eq!(next.meds, 2);
        assert_eq!(next.pressure, 70);
        assert_eq!(next.wechat_unread, 3);
        assert!(next.friend_messaged);
        assert!(next.med_path_taken);
    }
}
