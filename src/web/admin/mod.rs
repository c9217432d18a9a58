//! Organizer-facing CRUD and broadcast actions, mounted under `/admin`.
//!
//! Every route requires `Authorization: Bearer <ADMIN_TOKEN>`.

mod donations;
mod events;
mod notifications;
mod participants;
mod questions;
mod speakers;
mod speeches;
mod subscriptions;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    Router,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::web::error::AdminError;
use crate::web::AppState;

/// Selection of records for a bulk action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdsPayload {
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// Per-record outcome of a broadcast action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastOutcome {
    pub id: i64,
    pub title: String,
    pub sent: usize,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .merge(speakers::routes())
        .merge(speeches::routes())
        .merge(participants::routes())
        .merge(questions::routes())
        .merge(subscriptions::routes())
        .merge(donations::routes())
        .merge(notifications::routes())
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AdminError> {
    let expected = state.admin_token.as_deref().ok_or(AdminError::Unauthorized)?;

    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match provided {
        Some(provided) if token_matches(provided, expected) => Ok(next.run(request).await),
        _ => Err(AdminError::Unauthorized),
    }
}

/// Compares in time independent of where the first differing byte is.
fn token_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        assert!(token_matches("s3cret-token", "s3cret-token"));
        assert!(!token_matches("s3cret-tokeN", "s3cret-token"));
        assert!(!token_matches("s3cret", "s3cret-token"));
        assert!(!token_matches("", "s3cret-token"));
    }
}
