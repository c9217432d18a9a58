use teloxide::prelude::*;
use teloxide::types::Currency;

use crate::bot::commands::donate::parse_donation_payload;
use crate::bot::commands::register_user;
use crate::bot::handlers::BotContext;
use crate::bot::HandlerResult;
use crate::database::models::*;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_database_error, Actor};

pub async fn pre_checkout_handler(bot: Bot, q: PreCheckoutQuery) -> HandlerResult {
    if parse_donation_payload(&q.invoice_payload).is_some() {
        bot.answer_pre_checkout_query(q.id, true).await?;
    } else {
        tracing::warn!(
            "Rejected pre-checkout query with payload '{}' from user {}",
            q.invoice_payload,
            q.from.id.0
        );
        bot.answer_pre_checkout_query(q.id, false)
            .error_message("This donation is no longer valid. Please try /donate again.")
            .await?;
    }
    Ok(())
}

pub async fn successful_payment_handler(bot: Bot, msg: Message, ctx: BotContext) -> HandlerResult {
    let (Some(payment), Some(user)) = (msg.successful_payment(), msg.from()) else {
        return Ok(());
    };
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    let (participant, _) = register_user(&ctx.db.pool, user).await?;
    let input = DonationInput {
        participant_id: participant.id,
        // total_amount is in minor units
        amount: i64::from(payment.total_amount) / 100,
        currency: currency_code(&payment.currency),
        telegram_charge_id: Some(payment.telegram_payment_charge_id.clone()),
    };

    match Donation::create(&ctx.db.pool, &input).await {
        Ok(donation) => {
            tracing::info!(
                "Donation {} of {} {} from participant {}",
                donation.id,
                donation.amount,
                donation.currency,
                participant.id
            );
            let total = Donation::total_for_participant(&ctx.db.pool, participant.id).await?;
            feedback
                .success(&format!(
                    "Thank you for supporting the conference! 💚\nYour total contribution: {} {}",
                    total, donation.currency
                ))
                .await?;
        }
        Err(e) => {
            log_database_error(
                "insert",
                "donations",
                &e.to_string(),
                Some(&format!("actor {}", Actor::from_message(&msg).user_id)),
            );
            feedback
                .warning("Your payment went through, but we could not record it. The organizers will sort it out.")
                .await?;
        }
    }

    Ok(())
}

/// ISO 4217 code of a Telegram currency; the variants are named after the codes.
fn currency_code(currency: &Currency) -> String {
    format!("{currency:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code() {
        assert_eq!(currency_code(&Currency::RUB), "RUB");
        assert_eq!(currency_code(&Currency::USD), "USD");
    }
}
