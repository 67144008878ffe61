//! Fixed narrative content: the opening phone call and the first-login
//! chat message. Delays are absolute from sequence start.

use crate::shared::*;

/// Build the day-1 intro sequence. Grandma's call comes in moments after
/// the session opens; the interaction prompt follows once she hangs up.
pub fn build_intro_sequence() -> Vec<(f32, ScheduledPayload)> {
    vec![
        (
            1.0,
            ScheduledPayload::Beat(Beat::new(
                "Grandma",
                "(The phone rings.) Hello? Is that my girl? Are you doing all \
                 right over there?",
            )),
        ),
        (
            5.0,
            ScheduledPayload::Beat(Beat::new(
                "Grandma",
                "\"Winter's nearly here, so I'm knitting you a sweater — I'll \
                 mail it over in a few days. You're all grown up now, surely \
                 you can look after yourself? Don't fret about me, this old \
                 lady won't slow you down!\"",
            )),
        ),
        (
            11.0,
            ScheduledPayload::Beat(Beat::new(
                "Grandma",
                "\"You mind your work. I've got two good hands and two good \
                 feet, and you go hiring a caretaker for me — what a waste of \
                 money!\"",
            )),
        ),
        (
            17.0,
            ScheduledPayload::Beat(Beat::new(
                "Monologue",
                "(She hung up. The caretaker says Grandma isn't doing well \
                 lately, but she will never say so herself. Every yuan I earn \
                 has to go to her...)",
            )),
        ),
        (
            22.0,
            ScheduledPayload::Notice(
                "Press [U] for the computer or [E] for the phone to begin.".to_string(),
            ),
        ),
    ]
}

/// The chat message that greets the first workstation login of the day.
pub fn first_login_beat(state: &SessionState) -> Beat {
    if state.day >= 2 {
        Beat::new(
            "Aunt Wang",
            "Good morning. Grandma said she felt faint while walking today — \
             her blood-pressure medicine has run out completely. Please \
             arrange a refill soon.",
        )
    } else {
        Beat::new(
            "Aunt Wang",
            "Hello! Grandma is in good spirits today. This week's care fee is \
             ready whenever you are.",
        )
    }
}
