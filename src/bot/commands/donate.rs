use teloxide::prelude::*;
use teloxide::types::LabeledPrice;

use crate::bot::handlers::BotContext;
use crate::bot::HandlerResult;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_validation_error, Actor};
use crate::utils::validation::{parse_donation_amount, validate_donation_amount};

const PAYLOAD_PREFIX: &str = "donation";

pub async fn handle_donate(bot: &Bot, msg: &Message, amount: &str, ctx: &BotContext) -> HandlerResult {
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    let Some(provider_token) = ctx.payment_provider_token.as_deref() else {
        feedback.info("Donations are not available right now.").await?;
        return Ok(());
    };

    let amount = match parse_donation_amount(amount) {
        Ok(amount) => amount,
        Err(e) => {
            log_validation_error("/donate", "amount", &e.to_string(), &Actor::from_message(msg));
            feedback
                .validation_error(&e.to_string(), "Try /donate 500")
                .await?;
            return Ok(());
        }
    };

    let Some(user) = msg.from() else {
        return Ok(());
    };

    let Some(minor_units) = minor_units(amount) else {
        feedback
            .validation_error("That amount is too large.", "Try /donate 500")
            .await?;
        return Ok(());
    };

    bot.send_invoice(
        msg.chat.id,
        "Support the conference",
        format!("Donation of {} {}", amount, ctx.donation_currency),
        donation_payload(user.id.0 as i64, amount),
        provider_token,
        ctx.donation_currency.clone(),
        vec![LabeledPrice::new("Donation", minor_units)],
    )
    .await?;

    Ok(())
}

/// Telegram expects invoice prices in the currency's minor units as an `i32`.
pub fn minor_units(amount: i64) -> Option<i32> {
    amount.checked_mul(100).and_then(|units| i32::try_from(units).ok())
}

pub fn donation_payload(telegram_id: i64, amount: i64) -> String {
    format!("{PAYLOAD_PREFIX}:{telegram_id}:{amount}")
}

/// Returns `(telegram_id, amount)` for a well-formed donation payload.
pub fn parse_donation_payload(payload: &str) -> Option<(i64, i64)> {
    let mut parts = payload.split(':');
    if parts.next()? != PAYLOAD_PREFIX {
        return None;
    }

    let telegram_id = parts.next()?.parse().ok()?;
    let amount = parts.next()?.parse().ok()?;
    if parts.next().is_some() || validate_donation_amount(amount).is_err() {
        return None;
    }

    Some((telegram_id, amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::MAX_DONATION_AMOUNT;

    #[test]
    fn test_payload_format() {
        assert_eq!(donation_payload(42, 500), "donation:42:500");
        assert_eq!(parse_donation_payload("donation:42:500"), Some((42, 500)));
    }

    #[test]
    fn test_minor_units_fit_invoice_price() {
        assert_eq!(minor_units(500), Some(50_000));
        assert_eq!(minor_units(MAX_DONATION_AMOUNT), Some(10_000_000));
        assert_eq!(minor_units(i64::from(i32::MAX)), None);
        assert_eq!(minor_units(i64::MAX), None);
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        assert_eq!(parse_donation_payload("donation:42"), None);
        assert_eq!(parse_donation_payload("tip:42:500"), None);
        assert_eq!(parse_donation_payload("donation:abc:500"), None);
        assert_eq!(parse_donation_payload("donation:42:0"), None);
        assert_eq!(parse_donation_payload("donation:42:500:1"), None);
    }
}
