pub mod donate;
pub mod profile;
pub mod questions;
pub mod schedule;
pub mod start;
pub mod subscriptions;

use teloxide::types::User;
use teloxide::utils::command::BotCommands;

use crate::database::models::Participant;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Conference bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Register and show the main menu")]
    Start,
    #[command(description = "Show the program of active events")]
    Schedule,
    #[command(description = "Ask the current speaker a question")]
    Ask,
    #[command(description = "Questions for your talk (speakers only)")]
    Questions,
    #[command(description = "Subscribe to event notifications")]
    Subscribe,
    #[command(description = "Turn off all notifications")]
    Unsubscribe,
    #[command(description = "Choose which notifications you get")]
    Settings,
    #[command(description = "Fill in your networking profile")]
    Profile,
    #[command(description = "Meet other participants")]
    Networking,
    #[command(description = "Support the conference, e.g. /donate 500")]
    Donate(String),
}

impl Command {
    /// Name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "/help",
            Command::Start => "/start",
            Command::Schedule => "/schedule",
            Command::Ask => "/ask",
            Command::Questions => "/questions",
            Command::Subscribe => "/subscribe",
            Command::Unsubscribe => "/unsubscribe",
            Command::Settings => "/settings",
            Command::Profile => "/profile",
            Command::Networking => "/networking",
            Command::Donate(_) => "/donate",
        }
    }
}

/// Finds or registers the participant behind a Telegram user.
pub async fn register_user(
    pool: &sqlx::SqlitePool,
    user: &User,
) -> Result<(Participant, bool), sqlx::Error> {
    Participant::get_or_create(pool, user.id.0 as i64, user.username.clone(), user.full_name()).await
}
