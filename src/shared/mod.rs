//! Shared resources, events, states, and constants for Vigil.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// FOCUS MODE — top-level UI state machine
// ═══════════════════════════════════════════════════════════════════════

/// Where the player's attention is. Mutually exclusive; changed only
/// through explicit transition requests (never set directly by domains
/// other than the focus and day controllers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default, Serialize, Deserialize)]
pub enum FocusMode {
    #[default]
    None,
    Computer,
    Phone,
    Camera,
}

/// Objects the external 3D scene can report a pick on. The scene owns
/// raycasting and camera animation; the core only receives identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickTarget {
    Computer,
    Phone,
    Photo,
}

// ═══════════════════════════════════════════════════════════════════════
// SESSION STATE — the single source of truth
// ═══════════════════════════════════════════════════════════════════════

/// The player's resources and flags at a point in time. Exactly one
/// instance exists; it is replaced wholesale on day transition. All
/// mutation goes through [`SessionState::apply`] in the commit system —
/// no other component writes fields directly.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub money: i64,
    /// Minutes since local midnight. Advanced only forward within a day;
    /// the day controller forces a transition once it reaches DAY_END.
    pub time: u32,
    pub energy: u8, // 0-100
    pub meds: u32,
    pub grandma_health: u8, // 0-100; decays on unpaid-care transitions
    pub day: u32,

    // Per-day flags, reset at day transition.
    pub clocked_in: bool,
    pub work_completed: bool,
    pub care_paid: bool,
    pub first_login: bool,
    pub alarm_triggered: bool,

    pub rent_due_in: u32,
    pub pressure: u8, // 0-100
    pub low_blood_pressure: bool,

    // Quest / branch progress.
    pub wechat_unread: u32,
    pub friend_messaged: bool,
    pub med_path_taken: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            money: 2_500,
            time: START_TIME,
            energy: 100,
            meds: 0,
            grandma_health: 90,
            day: 1,
            clocked_in: false,
            work_completed: false,
            care_paid: false,
            first_login: true,
            alarm_triggered: false,
            rent_due_in: 3,
            pressure: 50,
            low_blood_pressure: false,
            wechat_unread: 0,
            friend_messaged: false,
            med_path_taken: false,
        }
    }
}

impl SessionState {
    /// Applies a validated delta. Clamped fields (energy, pressure) stay
    /// in [0, 100]; money has no floor — rent and fines apply regardless
    /// of funds.
    pub fn apply(&mut self, delta: &StateDelta) {
        self.money += delta.money;
        self.time += delta.minutes;
        self.energy = (self.energy as i16 + delta.energy).clamp(0, 100) as u8;
        self.meds = (self.meds as i64 + delta.meds as i64).max(0) as u32;
        self.pressure = (self.pressure as i16 + delta.pressure).clamp(0, 100) as u8;

        if let Some(v) = delta.clocked_in {
            self.clocked_in = v;
        }
        if let Some(v) = delta.work_completed {
            self.work_completed = v;
        }
        if let Some(v) = delta.care_paid {
            self.care_paid = v;
        }
        if let Some(v) = delta.first_login {
            self.first_login = v;
        }
        if let Some(v) = delta.wechat_unread {
            self.wechat_unread = v;
        }
        if let Some(v) = delta.friend_messaged {
            self.friend_messaged = v;
        }
        if let Some(v) = delta.med_path_taken {
            self.med_path_taken = v;
        }
    }

    /// Whether the remote feed should show the low-blood-pressure scene
    /// rather than the calm knitting scene.
    pub fn grandma_unwell(&self) -> bool {
        self.low_blood_pressure || self.grandma_health < 80
    }
}

/// Formats minutes-since-midnight as a wall clock (e.g. 480 → "08:00").
pub fn fmt_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}

// ═══════════════════════════════════════════════════════════════════════
// STATE DELTA — the unit of committed change
// ═══════════════════════════════════════════════════════════════════════

/// A field-wise change produced by the action engine and applied by the
/// commit system. Numeric fields are signed offsets; flags are set only
/// when `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDelta {
    pub money: i64,
    pub minutes: u32,
    pub energy: i16,
    pub meds: i32,
    pub pressure: i16,
    pub clocked_in: Option<bool>,
    pub work_completed: Option<bool>,
    pub care_paid: Option<bool>,
    pub first_login: Option<bool>,
    pub wechat_unread: Option<u32>,
    pub friend_messaged: Option<bool>,
    pub med_path_taken: Option<bool>,
}

// ═══════════════════════════════════════════════════════════════════════
// ACTIONS
// ═══════════════════════════════════════════════════════════════════════

/// Every discrete player-initiated operation the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionId {
    /// Open the remote camera feed (10 min, −5 energy).
    CheckCamera,
    /// Call Grandma (20 min, plays the five-beat call sequence).
    CallGrandma,
    /// Morning attendance check (30 min; bonus on time, fine when late).
    ClockIn { on_time: bool },
    /// Pay the caretaker's daily fee (10 min, −1000).
    PayCare,
    /// Buy one dose of Grandma's medicine (15 min, −800).
    BuyMeds,
    /// The day's main job (120 min, −30 energy, +200..=500).
    PerformWork,
    /// Emergency-funds path A: ask the supervisor for a wage advance.
    BorrowFromBoss,
    /// Emergency-funds path B: ask a colleague. Always fails narratively.
    BorrowFromPeer,
    /// Emergency-funds path C: take an hourly gig online.
    GigWork,
    /// Look at the framed photo on the desk.
    ViewPhoto,
    /// Browse the memory album (day 2 onward).
    ViewAlbum,
    /// Open chat: clears unread, marks the friend thread as read.
    CheckWechat,
}

/// Which intents are legal in which focus mode. Illegal intents are
/// rejected structurally by the action engine rather than relying on
/// the presentation layer hiding controls.
pub fn intent_allowed(mode: FocusMode, action: ActionId) -> bool {
    use ActionId::*;
    match mode {
        FocusMode::Computer => matches!(
            action,
            ClockIn { .. }
                | PerformWork
                | PayCare
                | BuyMeds
                | CheckCamera
                | CheckWechat
                | ViewAlbum
                | BorrowFromBoss
                | BorrowFromPeer
                | GigWork
        ),
        FocusMode::Phone => matches!(action, CallGrandma | CheckCamera | CheckWechat),
        FocusMode::None => matches!(action, ViewPhoto),
        // The feed overlay supports nothing but disconnecting.
        FocusMode::Camera => false,
    }
}

/// Expected business-rule rejections. Everything here is surfaced to the
/// player as text and leaves state untouched. `IllegalIntent` is the one
/// exception: a programming-contract violation, logged but never narrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// The action would push `time` past the day-end boundary.
    TimeExceeded { action: ActionId },
    InsufficientFunds { action: ActionId, cost: i64 },
    InsufficientEnergy { needed: u8 },
    /// Voluntary sleep requested before the evening threshold.
    TooEarlyToSleep,
    /// Side-quest branch requested outside its gate.
    QuestUnavailable,
    /// Intent not legal in the current focus mode.
    IllegalIntent { mode: FocusMode, action: ActionId },
}

impl Rejection {
    /// The narrative text shown to the player, or `None` for contract
    /// violations that must not surface in-fiction.
    pub fn message(&self) -> Option<String> {
        use ActionId::*;
        let text = match self {
            Rejection::TimeExceeded { action: CheckCamera } => {
                "It's late. You can't focus on the monitor feed right now.".to_string()
            }
            Rejection::TimeExceeded { action: CallGrandma } => {
                "It's too late in the evening — a call now might wake Grandma.".to_string()
            }
            Rejection::TimeExceeded { .. } => {
                "Not enough time left today to start the job. Get some rest.".to_string()
            }
            Rejection::InsufficientFunds { action: PayCare, cost } => {
                format!("Insufficient funds! Payment of {} yuan failed.", cost)
            }
            Rejection::InsufficientFunds { .. } => {
                "Insufficient balance! Keep working to earn your pay.".to_string()
            }
            Rejection::InsufficientEnergy { .. } => {
                "You're too drained for focused editing and publishing.".to_string()
            }
            Rejection::TooEarlyToSleep => {
                "It's still too early to sleep. Rest after 18:00.".to_string()
            }
            Rejection::QuestUnavailable => {
                "There's no emergency to deal with right now.".to_string()
            }
            Rejection::IllegalIntent { .. } => return None,
        };
        Some(text)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DIALOGUE
// ═══════════════════════════════════════════════════════════════════════

/// The one active utterance. New beats overwrite it outright — there is
/// no queue at this level; sequencing lives in the narrative schedule.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueState {
    pub speaker: String,
    pub text: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beat {
    pub speaker: String,
    pub text: String,
}

impl Beat {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// NARRATIVE SCHEDULE — the single ordered queue of delayed mutations
// ═══════════════════════════════════════════════════════════════════════

/// Payload of a scheduled entry. All delayed narrative beats AND all
/// delayed state effects flow through the same queue so two chains can
/// never interleave out of order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduledPayload {
    Beat(Beat),
    Apply(StateDelta),
    Notice(String),
    Focus(FocusMode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    /// Session-clock second at which the entry fires.
    pub fire_at: f64,
    /// Insertion order; ties on `fire_at` resolve FIFO.
    pub seq: u64,
    /// Day generation the entry belongs to. Entries from a stale
    /// generation are dropped at day transition instead of leaking into
    /// the new day.
    pub generation: u32,
    pub payload: ScheduledPayload,
}

/// The schedule itself. `clock` is advanced by the sequencer system from
/// `Res<Time>`; tests fast-forward it directly.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrativeQueue {
    pub entries: Vec<ScheduledEntry>,
    pub generation: u32,
    pub clock: f64,
    next_seq: u64,
}

impl NarrativeQueue {
    /// Schedules `payload` to fire `delay` seconds from now, tagged with
    /// the current generation.
    pub fn schedule_in(&mut self, delay: f32, payload: ScheduledPayload) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(ScheduledEntry {
            fire_at: self.clock + delay as f64,
            seq,
            generation: self.generation,
            payload,
        });
    }

    /// Drains every entry due at the current clock, in (fire_at, seq)
    /// order.
    pub fn take_due(&mut self) -> Vec<ScheduledEntry> {
        let clock = self.clock;
        let mut due: Vec<ScheduledEntry> = Vec::new();
        self.entries.retain(|e| {
            if e.fire_at <= clock {
                due.push(e.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| {
            a.fire_at
                .partial_cmp(&b.fire_at)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        due
    }

    /// Starts a new day generation and cancels everything scheduled under
    /// the old one. A delayed effect from a stale day must never apply
    /// after the transition.
    pub fn begin_generation(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        self.entries.retain(|e| e.generation >= generation);
    }

    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain and boundary communication
// ═══════════════════════════════════════════════════════════════════════

/// Inbound: the presentation layer asks the engine to attempt an action.
#[derive(Event, Debug, Clone)]
pub struct ActionIntent {
    pub action: ActionId,
}

/// Inbound: toggle-style focus request ([U]/[E]/Escape or a click).
/// Requesting the mode that is already active returns to `None`.
#[derive(Event, Debug, Clone)]
pub struct FocusRequest {
    pub mode: FocusMode,
}

/// Inbound: the 3D scene reports a pick by object identity.
#[derive(Event, Debug, Clone)]
pub struct PickEvent {
    pub target: PickTarget,
}

/// Inbound: the player asks to end the day voluntarily.
#[derive(Event, Debug, Clone)]
pub struct SleepRequested;

/// Inbound: answer to the unfinished-work confirmation gate.
#[derive(Event, Debug, Clone)]
pub struct SleepConfirm {
    pub accept: bool,
}

/// Inbound: the designated key dismisses the general dialogue box.
/// Auto-advancing sequences ignore acknowledgement and keep their timer.
#[derive(Event, Debug, Clone)]
pub struct AcknowledgeDialogue;

/// Outbound: full snapshot pushed after every commit.
#[derive(Event, Debug, Clone)]
pub struct StateChangedEvent {
    pub snapshot: SessionState,
}

/// Outbound: a beat was displayed.
#[derive(Event, Debug, Clone)]
pub struct DialogueEvent {
    pub speaker: String,
    pub text: String,
}

/// Outbound: alert-class message (rent mail, clock-in receipts, alarms).
#[derive(Event, Debug, Clone)]
pub struct NoticeEvent {
    pub message: String,
}

/// Outbound: the focus mode changed; the 3D scene animates the camera.
#[derive(Event, Debug, Clone)]
pub struct ModeChangedEvent {
    pub mode: FocusMode,
}

/// Outbound: a day ended (voluntarily or forced).
#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub ended_day: u32,
    pub forced: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

// Time (minutes since midnight).
pub const START_TIME: u32 = 8 * 60;
pub const DAY_END_TIME: u32 = 24 * 60;
pub const SLEEP_THRESHOLD: u32 = 18 * 60;
pub const ALARM_TIME: u32 = 21 * 60;

// Money (yuan).
pub const RENT_COST: i64 = 4_000;
pub const FORCED_SLEEP_FINE: i64 = 500;
pub const CLOCK_IN_BONUS: i64 = 500;
pub const CLOCK_IN_PENALTY: i64 = 200;
pub const CARE_COST: i64 = 1_000;
pub const MED_COST: i64 = 800;
pub const WORK_INCOME_MIN: i64 = 200;
pub const WORK_INCOME_MAX: i64 = 500;

// Action time costs (minutes).
pub const CHECK_CAM_TIME_COST: u32 = 10;
pub const CALL_GRAN_TIME_COST: u32 = 20;
pub const CLOCK_IN_TIME_COST: u32 = 30;
pub const SHOPPING_TIME_COST: u32 = 15;
pub const CARE_TIME_COST: u32 = 10;
pub const WORK_TIME_COST: u32 = 120;

// Other costs and resets.
pub const WORK_ENERGY_COST: u8 = 30;
pub const CAMERA_ENERGY_COST: i16 = 5;
pub const UNPAID_CARE_DECAY: u8 = 10;
pub const RENT_DUE_RESET: u32 = 30;
