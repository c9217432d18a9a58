pub mod callback;
pub mod message;
pub mod payment;

use chrono::FixedOffset;
use teloxide::{
    dispatching::{dialogue, dialogue::InMemStorage, UpdateFilterExt, UpdateHandler},
    prelude::*,
};

use crate::bot::commands::Command;
use crate::bot::state::ChatState;
use crate::bot::HandlerError;
use crate::config::Config;
use crate::database::connection::DatabaseManager;

/// Everything the handlers need besides the bot and the update.
#[derive(Clone)]
pub struct BotContext {
    pub db: DatabaseManager,
    pub offset: FixedOffset,
    pub payment_provider_token: Option<String>,
    pub donation_currency: String,
}

impl BotContext {
    pub fn new(db: DatabaseManager, config: &Config) -> Self {
        Self {
            db,
            offset: config.display_offset(),
            payment_provider_token: config.payment_provider_token.clone(),
            donation_currency: config.donation_currency.clone(),
        }
    }
}

pub struct BotHandler {
    pub context: BotContext,
}

impl BotHandler {
    pub fn new(context: BotContext) -> Self {
        Self { context }
    }

    /// Pre-checkout queries carry no chat, so they are routed before the
    /// dialogue layer. Successful payments are checked before commands.
    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        let message_handler = Update::filter_message()
            .branch(
                dptree::filter(|msg: Message| msg.successful_payment().is_some())
                    .endpoint(payment::successful_payment_handler),
            )
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(message::command_handler),
            )
            .branch(dptree::endpoint(message::text_handler));

        dptree::entry()
            .branch(Update::filter_pre_checkout_query().endpoint(payment::pre_checkout_handler))
            .branch(
                dialogue::enter::<Update, InMemStorage<ChatState>, ChatState, _>()
                    .branch(message_handler)
                    .branch(Update::filter_callback_query().endpoint(callback::callback_handler)),
            )
    }
}
