//! # Conference Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, starts
//! the reminder scheduler and the HTTP server, and runs the Telegram bot
//! when a token is configured.

use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use conference_bot::bot::handlers::{BotContext, BotHandler};
use conference_bot::bot::state::ChatState;
use conference_bot::config::Config;
use conference_bot::database::connection::DatabaseManager;
use conference_bot::services::notifications::{
    DisabledSender, MessageSender, NotificationService, TelegramSender,
};
use conference_bot::services::reminder::ReminderService;
use conference_bot::utils::logging::log_system_event;
use conference_bot::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conference_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Conference Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, UTC offset: {}h",
        config.database_url, config.http_port, config.display_utc_offset_hours
    );

    info!("Initializing database connection...");
    let db = DatabaseManager::new(&config.database_url).await?;
    db.run_migrations().await?;
    info!("Database initialized successfully");

    let bot = config.telegram_bot_token.as_deref().map(Bot::new);
    let sender: Arc<dyn MessageSender> = match &bot {
        Some(bot) => Arc::new(TelegramSender::new(bot.clone())),
        None => {
            tracing::warn!("TELEGRAM_BOT_TOKEN is not set - running without the Telegram bot");
            Arc::new(DisabledSender)
        }
    };
    let notifications = NotificationService::new(db.clone(), sender, config.display_offset());

    let mut reminder_service = ReminderService::new(notifications.clone(), config.reminder_lead_minutes)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create reminder service: {}", e))?;
    if let Err(e) = reminder_service.start().await {
        tracing::error!("Failed to start reminder service: {}", e);
    }

    let state = AppState::new(
        db.clone(),
        notifications,
        config.admin_token.clone(),
        bot.is_some(),
    );
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .with_context(|| format!("Failed to bind to port {}", config.http_port))?;
    info!("HTTP server listening on port {}", config.http_port);

    let http_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, web::router(state)).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    log_system_event("startup complete", None);

    match bot {
        Some(bot) => {
            let handler = BotHandler::new(BotContext::new(db, &config));
            let bot_task = tokio::spawn(async move {
                let storage: Arc<InMemStorage<ChatState>> = InMemStorage::new();
                Dispatcher::builder(bot, handler.schema())
                    .dependencies(dptree::deps![storage, handler.context.clone()])
                    .enable_ctrlc_handler()
                    .build()
                    .dispatch()
                    .await;
            });

            tokio::select! {
                result = bot_task => {
                    if let Err(e) = result {
                        tracing::error!("Bot task error: {}", e);
                    }
                }
                result = http_task => {
                    if let Err(e) = result {
                        tracing::error!("HTTP task error: {}", e);
                    }
                }
            }
        }
        None => {
            tokio::select! {
                result = http_task => {
                    if let Err(e) = result {
                        tracing::error!("HTTP task error: {}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl-C, shutting down");
                }
            }
        }
    }

    if let Err(e) = reminder_service.stop().await {
        tracing::warn!("Error stopping reminder service: {}", e);
    }

    log_system_event("shutdown", None);
    Ok(())
}
