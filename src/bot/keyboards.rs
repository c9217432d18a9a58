use chrono::FixedOffset;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

use crate::bot::commands::Command;
use crate::bot::handlers::callback::CallbackAction;
use crate::database::models::*;
use crate::utils::datetime::format_datetime;

/// Buttons of the persistent reply keyboard shown after `/start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    Schedule,
    Ask,
    Networking,
    Subscribe,
}

impl MenuButton {
    pub const ALL: [MenuButton; 4] = [
        MenuButton::Schedule,
        MenuButton::Ask,
        MenuButton::Networking,
        MenuButton::Subscribe,
    ];

    pub fn text(self) -> &'static str {
        match self {
            MenuButton::Schedule => "📅 Schedule",
            MenuButton::Ask => "❓ Ask a question",
            MenuButton::Networking => "🤝 Networking",
            MenuButton::Subscribe => "🔔 Subscribe",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|button| button.text() == text)
    }

    /// The command a tap on this button stands for.
    pub fn command(self) -> Command {
        match self {
            MenuButton::Schedule => Command::Schedule,
            MenuButton::Ask => Command::Ask,
            MenuButton::Networking => Command::Networking,
            MenuButton::Subscribe => Command::Subscribe,
        }
    }
}

pub fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(MenuButton::Schedule.text()),
            KeyboardButton::new(MenuButton::Ask.text()),
        ],
        vec![
            KeyboardButton::new(MenuButton::Networking.text()),
            KeyboardButton::new(MenuButton::Subscribe.text()),
        ],
    ])
}

/// One row per flag: an on/off switch and a label that explains the flag.
pub fn settings_keyboard(subscription: &Subscription) -> InlineKeyboardMarkup {
    let rows = SubscriptionFlag::ALL.into_iter().map(|flag| {
        let state = if subscription.flag(flag) { "✅ ON" } else { "❌ OFF" };
        vec![
            InlineKeyboardButton::callback(
                state,
                CallbackAction::Toggle {
                    flag,
                    subscription_id: subscription.id,
                }
                .data(),
            ),
            InlineKeyboardButton::callback(flag.label(), CallbackAction::Info(flag).data()),
        ]
    });

    InlineKeyboardMarkup::new(rows)
}

pub fn event_choice_keyboard(events: &[Event], offset: FixedOffset) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = events
        .iter()
        .map(|event| {
            vec![InlineKeyboardButton::callback(
                format!("{} ({})", event.title, format_datetime(&event.date, offset)),
                CallbackAction::Subscribe(event.id).data(),
            )]
        })
        .collect();

    rows.push(vec![InlineKeyboardButton::callback(
        "❌ Cancel",
        CallbackAction::SubscribeCancel.data(),
    )]);

    InlineKeyboardMarkup::new(rows)
}

pub fn experience_keyboard() -> InlineKeyboardMarkup {
    let buttons: Vec<InlineKeyboardButton> = Experience::ALL
        .into_iter()
        .map(|level| InlineKeyboardButton::callback(level.label(), CallbackAction::Experience(level).data()))
        .collect();

    InlineKeyboardMarkup::new(buttons.chunks(2).map(<[InlineKeyboardButton]>::to_vec))
}
