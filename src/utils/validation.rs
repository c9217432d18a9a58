use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

pub const MAX_QUESTION_LENGTH: usize = 1000;
pub const MAX_PROFILE_FIELD_LENGTH: usize = 100;
pub const MIN_DONATION_AMOUNT: i64 = 1;
pub const MAX_DONATION_AMOUNT: i64 = 100_000;
pub const DEFAULT_DONATION_AMOUNT: i64 = 500;

/// Returns the trimmed question text.
pub fn validate_question_text(text: &str) -> Result<String> {
    let text = text.trim();

    if text.is_empty() {
        return Err(anyhow!("Question cannot be empty"));
    }

    if text.chars().count() > MAX_QUESTION_LENGTH {
        return Err(anyhow!(
            "Question cannot be longer than {} characters",
            MAX_QUESTION_LENGTH
        ));
    }

    Ok(text.to_string())
}

pub fn validate_title(field: &str, title: &str) -> Result<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(anyhow!("{} cannot be empty", field));
    }

    if title.chars().count() > 200 {
        return Err(anyhow!("{} cannot be longer than 200 characters", field));
    }

    if title.contains('\n') || title.contains('\r') {
        return Err(anyhow!("{} cannot contain line breaks", field));
    }

    Ok(())
}

/// Company and position answers from the `/profile` dialogue.
pub fn validate_profile_field(field: &str, value: &str) -> Result<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(anyhow!("{} cannot be empty", field));
    }

    if value.chars().count() > MAX_PROFILE_FIELD_LENGTH {
        return Err(anyhow!(
            "{} cannot be longer than {} characters",
            field,
            MAX_PROFILE_FIELD_LENGTH
        ));
    }

    Ok(value.to_string())
}

pub fn validate_speech_window(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Result<()> {
    if start >= end {
        return Err(anyhow!("Speech must end after it starts"));
    }
    Ok(())
}

/// Parses the optional `/donate` argument, falling back to the default amount.
pub fn parse_donation_amount(input: &str) -> Result<i64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(DEFAULT_DONATION_AMOUNT);
    }

    let amount: i64 = input
        .parse()
        .map_err(|_| anyhow!("Amount must be a whole number"))?;

    validate_donation_amount(amount)?;
    Ok(amount)
}

pub fn validate_donation_amount(amount: i64) -> Result<()> {
    if !(MIN_DONATION_AMOUNT..=MAX_DONATION_AMOUNT).contains(&amount) {
        return Err(anyhow!(
            "Amount must be between {} and {}",
            MIN_DONATION_AMOUNT,
            MAX_DONATION_AMOUNT
        ));
    }
    Ok(())
}

pub fn validate_currency(currency: &str) -> Result<()> {
    let currency = currency.trim();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(anyhow!("Currency must be a three-letter ISO 4217 code"));
    }
    Ok(())
}

pub fn validate_telegram_user_id(telegram_id: i64) -> Result<()> {
    if telegram_id <= 0 {
        return Err(anyhow!("Telegram user ID must be positive"));
    }
    Ok(())
}
