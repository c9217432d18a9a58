//! HTTP surface: health checks and the bearer-protected admin API.

pub mod admin;
pub mod error;
pub mod extract;
pub mod health;

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

use crate::database::connection::DatabaseManager;
use crate::services::notifications::NotificationService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub notifications: NotificationService,
    /// Admin routes are only mounted when this is set.
    pub admin_token: Option<String>,
    pub bot_enabled: bool,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: DatabaseManager,
        notifications: NotificationService,
        admin_token: Option<String>,
        bot_enabled: bool,
    ) -> Self {
        Self {
            db,
            notifications,
            admin_token,
            bot_enabled,
            started_at: Utc::now(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new().merge(health::routes());

    if state.admin_token.is_some() {
        app = app.nest("/admin", admin::routes(state.clone()));
    } else {
        tracing::warn!("ADMIN_TOKEN is not set - admin API is disabled");
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
