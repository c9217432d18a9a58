use anyhow::{anyhow, Result};
use chrono::{FixedOffset, Offset, Utc};
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/conference.db";

/// Runtime configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token. The admin API runs without one, the bot does not.
    pub telegram_bot_token: Option<String>,
    pub database_url: String,
    pub http_port: u16,
    /// Bearer token for `/admin`. Admin routes are not mounted when unset.
    pub admin_token: Option<String>,
    pub display_utc_offset_hours: i32,
    pub reminder_lead_minutes: i64,
    pub payment_provider_token: Option<String>,
    pub donation_currency: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let telegram_bot_token = non_empty_var("TELEGRAM_BOT_TOKEN")
            .or_else(|| non_empty_var("TG_TOKEN"));

        let database_url = non_empty_var("DATABASE_URL")
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let http_port = parse_var("HTTP_PORT", 3000u16)
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let display_utc_offset_hours = parse_var("DISPLAY_UTC_OFFSET_HOURS", 3i32)
            .map_err(|_| anyhow!("Invalid DISPLAY_UTC_OFFSET_HOURS"))?;
        if !(-12..=14).contains(&display_utc_offset_hours) {
            return Err(anyhow!("DISPLAY_UTC_OFFSET_HOURS must be between -12 and 14"));
        }

        let reminder_lead_minutes = parse_var("REMINDER_LEAD_MINUTES", 15i64)
            .map_err(|_| anyhow!("Invalid REMINDER_LEAD_MINUTES"))?;
        if !(1..=1440).contains(&reminder_lead_minutes) {
            return Err(anyhow!("REMINDER_LEAD_MINUTES must be between 1 and 1440"));
        }

        let donation_currency = non_empty_var("DONATION_CURRENCY")
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| "RUB".to_string());

        Ok(Config {
            telegram_bot_token,
            database_url,
            http_port,
            admin_token: non_empty_var("ADMIN_TOKEN"),
            display_utc_offset_hours,
            reminder_lead_minutes,
            payment_provider_token: non_empty_var("PAYMENT_PROVIDER_TOKEN"),
            donation_currency,
        })
    }

    /// Offset used when rendering times to attendees.
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.display_utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, T::Err> {
    match non_empty_var(key) {
        Some(raw) => raw.parse(),
        None => Ok(default),
    }
}
