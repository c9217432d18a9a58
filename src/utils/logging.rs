use teloxide::types::{Message, User};
use tracing::{error, info, warn};

/// Who triggered a bot interaction, for log lines.
#[derive(Debug, Clone)]
pub struct Actor {
    pub username: String,
    pub user_id: i64,
    pub chat_id: i64,
}

impl Actor {
    pub fn new(user: Option<&User>, chat_id: i64) -> Self {
        Self {
            username: user
                .and_then(|u| u.username.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            user_id: user.map(|u| u.id.0 as i64).unwrap_or(0),
            chat_id,
        }
    }

    pub fn from_message(msg: &Message) -> Self {
        Self::new(msg.from(), msg.chat.id.0)
    }
}

/// Logs command start with consistent format
pub fn log_command_start(command: &str, actor: &Actor, details: Option<&str>) {
    match details {
        Some(d) => info!(
            "CMD_START: {} by {}({}) in chat {} - {}",
            command, actor.username, actor.user_id, actor.chat_id, d
        ),
        None => info!(
            "CMD_START: {} by {}({}) in chat {}",
            command, actor.username, actor.user_id, actor.chat_id
        ),
    }
}

/// Logs command completion with consistent format
pub fn log_command_success(command: &str, actor: &Actor, details: Option<&str>) {
    match details {
        Some(d) => info!(
            "CMD_SUCCESS: {} by {}({}) in chat {} - {}",
            command, actor.username, actor.user_id, actor.chat_id, d
        ),
        None => info!(
            "CMD_SUCCESS: {} by {}({}) in chat {}",
            command, actor.username, actor.user_id, actor.chat_id
        ),
    }
}

pub fn log_command_error(command: &str, actor: &Actor, error: &str) {
    error!(
        "CMD_ERROR: {} by {}({}) in chat {} - {}",
        command, actor.username, actor.user_id, actor.chat_id, error
    );
}

pub fn log_validation_error(command: &str, field: &str, error: &str, actor: &Actor) {
    warn!(
        "VALIDATION_ERROR: {} - field '{}' invalid: {} - user {}({}) in chat {}",
        command, field, error, actor.username, actor.user_id, actor.chat_id
    );
}

pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs the outcome of a broadcast.
pub fn log_notification(kind: &str, notification_id: i64, sent: usize, failed: usize) {
    if failed > 0 {
        warn!(
            "NOTIFY: {} #{} delivered to {} chats, {} failed",
            kind, notification_id, sent, failed
        );
    } else {
        info!("NOTIFY: {} #{} delivered to {} chats", kind, notification_id, sent);
    }
}

pub fn log_delivery_failure(chat_id: i64, error: &str) {
    warn!("NOTIFY_FAIL: chat {} - {}", chat_id, error);
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
