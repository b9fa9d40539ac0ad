use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, ReactionType};

use super::component_handlers::Control;

/// Button rows of the now-playing message. A Discord action row holds at most five buttons.
pub const CONTROL_LAYOUT: [&[Control]; 3] = [
    &[
        Control::LoopToggle,
        Control::LoopDisable,
        Control::Skip,
        Control::ShowQueue,
        Control::ClearQueue,
    ],
    &[
        Control::Stop,
        Control::Pause,
        Control::Resume,
        Control::VolumeUp,
        Control::VolumeDown,
    ],
    &[Control::AutoplayToggle],
];

/// Emoji shown on the button (and in the embed legend).
pub fn emoji(control: Control) -> &'static str {
    match control {
        Control::LoopToggle => "🔁",
        Control::LoopDisable => "➡️",
        Control::Skip => "⏭️",
        Control::ShowQueue => "📜",
        Control::ClearQueue => "🗑️",
        Control::Stop => "⏹️",
        Control::Pause => "⏸️",
        Control::Resume => "▶️",
        Control::VolumeUp => "🔊",
        Control::VolumeDown => "🔉",
        Control::AutoplayToggle => "🎲",
    }
}

pub fn label(control: Control) -> &'static str {
    match control {
        Control::LoopToggle => "Loop",
        Control::LoopDisable => "Disable loop",
        Control::Skip => "Skip",
        Control::ShowQueue => "Queue",
        Control::ClearQueue => "Clear queue",
        Control::Stop => "Stop",
        Control::Pause => "Pause",
        Control::Resume => "Resume",
        Control::VolumeUp => "Volume up",
        Control::VolumeDown => "Volume down",
        Control::AutoplayToggle => "Autoplay",
    }
}

fn style(control: Control) -> ButtonStyle {
    match control {
        Control::Stop | Control::ClearQueue => ButtonStyle::Danger,
        Control::Pause | Control::Resume | Control::Skip => ButtonStyle::Primary,
        Control::AutoplayToggle => ButtonStyle::Success,
        _ => ButtonStyle::Secondary,
    }
}

/// Creates the rows of music control buttons. Stale messages get them `disabled`.
pub fn music_controls(disabled: bool) -> Vec<CreateActionRow> {
    CONTROL_LAYOUT
        .iter()
        .map(|row| {
            let buttons = row
                .iter()
                .map(|&control| {
                    CreateButton::new(control.custom_id())
                        .emoji(ReactionType::Unicode(emoji(control).to_string()))
                        .style(style(control))
                        .disabled(disabled)
                })
                .collect();
            CreateActionRow::Buttons(buttons)
        })
        .collect()
}
