mod shared;
mod actions;
mod day;
mod narrative;
mod focus;
mod demo;

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(16))),
        )
        .add_plugins(StatesPlugin)
        .add_plugins(LogPlugin::default())
        // Focus mode
        .init_state::<FocusMode>()
        // Shared resources
        .init_resource::<SessionState>()
        .init_resource::<DialogueState>()
        .init_resource::<NarrativeQueue>()
        // Inbound events
        .add_event::<ActionIntent>()
        .add_event::<FocusRequest>()
        .add_event::<PickEvent>()
        .add_event::<SleepRequested>()
        .add_event::<SleepConfirm>()
        .add_event::<AcknowledgeDialogue>()
        // Outbound events
        .add_event::<StateChangedEvent>()
        .add_event::<DialogueEvent>()
        .add_event::<NoticeEvent>()
        .add_event::<ModeChangedEvent>()
        .add_event::<DayEndEvent>()
        // Domain plugins
        .add_plugins(actions::ActionsPlugin)
        .add_plugins(day::DayPlugin)
        .add_plugins(narrative::NarrativePlugin)
        .add_plugins(focus::FocusPlugin)
        // Scripted stand-in for the 3D room / HUD / modals
        .add_plugins(demo::DemoPlugin)
        .run();
}
