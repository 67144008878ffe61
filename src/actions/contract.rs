//! The action contract: `attempt(action, state)` decides whether an
//! action is permitted and what it produces. Pure — no ECS access, no
//! clock. The commit system in `mod.rs` applies the result.

use rand::Rng;

use crate::shared::*;

/// What a permitted action produces: a delta for the commit system, an
/// optional immediate receipt, and follow-ups for the narrative queue
/// (monologues at delay 0, delayed grants and phone calls later).
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub delta: StateDelta,
    pub notice: Option<String>,
    pub followups: Vec<(f32, ScheduledPayload)>,
}

impl ActionOutcome {
    fn new(delta: StateDelta) -> Self {
        Self {
            delta,
            notice: None,
            followups: Vec::new(),
        }
    }

    fn notice(mut self, text: impl Into<String>) -> Self {
        self.notice = Some(text.into());
        self
    }

    fn after(mut self, delay: f32, payload: ScheduledPayload) -> Self {
        self.followups.push((delay, payload));
        self
    }

    fn beat(self, delay: f32, speaker: &str, text: impl Into<String>) -> Self {
        self.after(delay, ScheduledPayload::Beat(Beat::new(speaker, text)))
    }
}

/// Uniform integer income for a completed job, inclusive on both ends.
pub fn roll_work_income() -> i64 {
    rand::thread_rng().gen_range(WORK_INCOME_MIN..=WORK_INCOME_MAX)
}

/// The emergency-funds branches are offered on day 2 only, and only
/// while no path has been taken and no medicine is in stock.
pub fn side_quest_open(state: &SessionState) -> bool {
    state.day >= 2 && !state.med_path_taken && state.meds < 1
}

/// Validates `action` against `state` and, if permitted, returns the
/// resulting outcome. Never mutates; rejection means bit-for-bit
/// unchanged state.
pub fn attempt(action: ActionId, state: &SessionState) -> Result<ActionOutcome, Rejection> {
    match action {
        ActionId::CheckCamera => check_camera(state),
        ActionId::CallGrandma => call_grandma(state),
        ActionId::ClockIn { on_time } => clock_in(state, on_time),
        ActionId::PayCare => pay_care(state),
        ActionId::BuyMeds => buy_meds(state),
        ActionId::PerformWork => perform_work(state),
        ActionId::BorrowFromBoss => borrow_from_boss(state),
        ActionId::BorrowFromPeer => borrow_from_peer(state),
        ActionId::GigWork => gig_work(state),
        ActionId::ViewPhoto => Ok(view_photo()),
        ActionId::ViewAlbum => view_album(state),
        ActionId::CheckWechat => Ok(check_wechat(state)),
    }
}

fn fits_in_day(state: &SessionState, cost: u32, action: ActionId) -> Result<(), Rejection> {
    if state.time + cost > DAY_END_TIME {
        Err(Rejection::TimeExceeded { action })
    } else {
        Ok(())
    }
}

fn check_camera(state: &SessionState) -> Result<ActionOutcome, Rejection> {
    fits_in_day(state, CHECK_CAM_TIME_COST, ActionId::CheckCamera)?;

    let feed = if state.grandma_unwell() {
        "On the feed: Grandma is talking quietly with the caretaker, a note of \
         complaint on her face. The caretaker lingers at the medicine station, \
         checking something... Wristband sync: heart rate 95 bpm (elevated), \
         blood pressure 90/60 (low)."
    } else {
        "On the feed: an old woman on the worn sofa, knitting. Your framed photo \
         sits on the table. Wristband sync: heart rate 75 bpm (steady)."
    };

    Ok(ActionOutcome::new(StateDelta {
        minutes: CHECK_CAM_TIME_COST,
        energy: -CAMERA_ENERGY_COST,
        ..Default::default()
    })
    .after(0.0, ScheduledPayload::Focus(FocusMode::Camera))
    // The link takes a moment to buffer before the scene resolves.
    .beat(1.5, "System", feed))
}

fn call_grandma(state: &SessionState) -> Result<ActionOutcome, Rejection> {
    fits_in_day(state, CALL_GRAN_TIME_COST, ActionId::CallGrandma)?;

    // Five beats on a fixed inter-beat delay; the phone UI comes back
    // two seconds after the last one.
    Ok(ActionOutcome::new(StateDelta {
        minutes: CALL_GRAN_TIME_COST,
        ..Default::default()
    })
    .after(0.0, ScheduledPayload::Focus(FocusMode::None))
    .beat(0.0, "System", format!("[{} minutes pass]", CALL_GRAN_TIME_COST))
    .beat(
        4.0,
        "Grandma (phone)",
        "Hello? It's my girl! What made you suddenly think of calling your \
         grandma? Are they making you work overtime again?",
    )
    .beat(
        8.0,
        "Me (inwardly)",
        "(Her voice sounds worn out, but she will never admit it.)",
    )
    .beat(
        12.0,
        "Grandma (phone)",
        "Don't you worry about me, I'm doing just fine! Finish your work and \
         rest early — don't sit up all night knitting sweaters like your grandma...",
    )
    .beat(
        16.0,
        "System",
        "(The call has ended. Press [Space] to return to the desk.)",
    )
    .after(18.0, ScheduledPayload::Focus(FocusMode::Phone)))
}

fn clock_in(state: &SessionState, on_time: bool) -> Result<ActionOutcome, Rejection> {
    if !on_time {
        return Ok(ActionOutcome::new(StateDelta {
            money: -CLOCK_IN_PENALTY,
            minutes: CLOCK_IN_TIME_COST,
            ..Default::default()
        })
        .notice(format!(
            "Clock-in failed — late! Fine: -{} yuan. Time passes: +{} minutes.",
            CLOCK_IN_PENALTY, CLOCK_IN_TIME_COST
        )));
    }

    let mut delta = StateDelta {
        money: CLOCK_IN_BONUS,
        minutes: CLOCK_IN_TIME_COST,
        clocked_in: Some(true),
        ..Default::default()
    };

    let mut outcome_followups: Vec<(f32, ScheduledPayload)> = Vec::new();
    if state.day == 2 {
        // Babysitter + friend + landlord all land at once.
        delta.wechat_unread = Some(3);
        outcome_followups.push((
            0.5,
            ScheduledPayload::Notice(format!(
                "Mail from the landlord: rent and utilities due in {} days. \
                 Total: {} yuan.",
                state.rent_due_in, RENT_COST
            )),
        ));
        outcome_followups.push((
            2.5,
            ScheduledPayload::Beat(Beat::new(
                "Boss (voice message)",
                "Your work on last night's task was far below my expectations. \
                 Do you even want this job anymore? Quality like that, you might \
                 as well quit!",
            )),
        ));
        outcome_followups.push((
            2.5,
            ScheduledPayload::Apply(StateDelta {
                pressure: 15,
                ..Default::default()
            }),
        ));
    }

    let mut outcome = ActionOutcome::new(delta).notice(format!(
        "Clock-in confirmed! Attendance bonus: +{} yuan. Time passes: +{} minutes.",
        CLOCK_IN_BONUS, CLOCK_IN_TIME_COST
    ));
    outcome.followups = outcome_followups;
    Ok(outcome)
}

fn pay_care(state: &SessionState) -> Result<ActionOutcome, Rejection> {
    if state.money < CARE_COST {
        return Err(Rejection::InsufficientFunds {
            action: ActionId::PayCare,
            cost: CARE_COST,
        });
    }

    let grandma = if state.day == 2 {
        "Let the caretaker go! I'm perfectly fine on my own, stop wasting \
         money. You're busy enough without fussing over me."
    } else {
        "Hello? Is that my girl? I heard you bought me medicine yesterday? \
         How can you throw money around like that!"
    };

    Ok(ActionOutcome::new(StateDelta {
        money: -CARE_COST,
        minutes: CARE_TIME_COST,
        care_paid: Some(true),
        ..Default::default()
    })
    .notice(format!(
        "Payment complete! Today's care fee is covered. Time passes: +{} minutes.",
        CARE_TIME_COST
    ))
    .beat(1.0, "Grandma (calling)", grandma))
}

fn buy_meds(state: &SessionState) -> Result<ActionOutcome, Rejection> {
    if state.money < MED_COST {
        return Err(Rejection::InsufficientFunds {
            action: ActionId::BuyMeds,
            cost: MED_COST,
        });
    }

    Ok(ActionOutcome::new(StateDelta {
        money: -MED_COST,
        meds: 1,
        minutes: SHOPPING_TIME_COST,
        ..Default::default()
    })
    .notice(format!(
        "Purchase complete! One dose of Grandma's maintenance medicine. \
         Time passes: +{} minutes.",
        SHOPPING_TIME_COST
    )))
}

fn perform_work(state: &SessionState) -> Result<ActionOutcome, Rejection> {
    fits_in_day(state, WORK_TIME_COST, ActionId::PerformWork)?;
    if state.energy < WORK_ENERGY_COST {
        return Err(Rejection::InsufficientEnergy {
            needed: WORK_ENERGY_COST,
        });
    }

    let income = roll_work_income();
    Ok(ActionOutcome::new(StateDelta {
        money: income,
        energy: -(WORK_ENERGY_COST as i16),
        minutes: WORK_TIME_COST,
        work_completed: Some(true),
        ..Default::default()
    })
    .notice(format!(
        "Job complete! Income this time: +{} yuan. Energy spent: -{}. \
         Time passes: +{} minutes.",
        income, WORK_ENERGY_COST, WORK_TIME_COST
    )))
}

fn borrow_from_boss(state: &SessionState) -> Result<ActionOutcome, Rejection> {
    if !side_quest_open(state) {
        return Err(Rejection::QuestUnavailable);
    }

    Ok(ActionOutcome::new(StateDelta {
        pressure: 5,
        minutes: 30,
        ..Default::default()
    })
    .beat(
        0.0,
        "Monologue",
        "(You call the supervisor... the line goes dead after a few curt words.)",
    )
    .after(
        3.0,
        ScheduledPayload::Notice(
            "Ding! Transfer received: 1,000 yuan from your supervisor. \
             Note attached: 'Docked from next month.'"
                .to_string(),
        ),
    )
    .after(
        3.0,
        ScheduledPayload::Apply(StateDelta {
            money: 1_000,
            med_path_taken: Some(true),
            ..Default::default()
        }),
    )
    .beat(3.0, "System", "Wage advance received. Don't forget the medicine!"))
}

fn borrow_from_peer(state: &SessionState) -> Result<ActionOutcome, Rejection> {
    if !side_quest_open(state) {
        return Err(Rejection::QuestUnavailable);
    }

    // The one branch that never pays out.
    Ok(ActionOutcome::new(StateDelta {
        pressure: 10,
        minutes: 30,
        ..Default::default()
    })
    .beat(
        0.0,
        "Monologue",
        "(You message a colleague... 'Sorry friend, money's tight for me too \
         right now. There's really nothing I can do...')",
    )
    .after(
        3.0,
        ScheduledPayload::Notice("Borrowing failed. You cannot afford the medicine.".to_string()),
    ))
}

fn gig_work(state: &SessionState) -> Result<ActionOutcome, Rejection> {
    if !side_quest_open(state) {
        return Err(Rejection::QuestUnavailable);
    }

    Ok(ActionOutcome::new(StateDelta {
        energy: -10,
        pressure: -5,
        minutes: 60,
        ..Default::default()
    })
    .beat(
        0.0,
        "Monologue",
        "(You take an hourly gig online, and decide to skip meals today to \
         save what you can.)",
    )
    .after(
        3.0,
        ScheduledPayload::Notice("Gig complete! Earned 900 yuan.".to_string()),
    )
    .after(
        3.0,
        ScheduledPayload::Apply(StateDelta {
            money: 900,
            med_path_taken: Some(true),
            ..Default::default()
        }),
    ))
}

fn view_photo() -> ActionOutcome {
    ActionOutcome::new(StateDelta::default()).beat(
        0.0,
        "Monologue",
        "(That was taken last Spring Festival, back home. She insisted on \
         cooking a whole table of dishes, laughing about how sturdy she still was.)",
    )
}

fn view_album(state: &SessionState) -> Result<ActionOutcome, Rejection> {
    if state.day < 2 {
        return Err(Rejection::QuestUnavailable);
    }

    Ok(ActionOutcome::new(StateDelta::default())
        .beat(
            0.0,
            "Photo: kindergarten graduation",
            "Grandma holding you in your little suit, beaming. She scrimped and \
             saved so you would have something presentable to wear.",
        )
        .beat(
            4.0,
            "Recording: the first meal you cooked",
            "Pride in her voice: 'Look at my grandchild, cooking for me already! \
             No trouble ahead for this one!'",
        ))
}

fn check_wechat(state: &SessionState) -> ActionOutcome {
    let babysitter = if state.day >= 2 {
        "Aunt Wang: Grandma said she felt faint while walking today (low blood \
         pressure). The blood-pressure medicine has completely run out — she \
         needs a refill soon. Today's care fee is 1,000 yuan."
    } else {
        "Aunt Wang: Hello! Grandma is in good spirits today. This week's care \
         fee is ready whenever you are."
    };

    ActionOutcome::new(StateDelta {
        wechat_unread: Some(0),
        friend_messaged: if state.day >= 2 { Some(true) } else { None },
        ..Default::default()
    })
    // Chat lives on the workstation; a phone tap jumps there.
    .after(0.0, ScheduledPayload::Focus(FocusMode::Computer))
    .beat(0.0, "Aunt Wang", babysitter)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
