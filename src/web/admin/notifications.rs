use axum::{
    extract::State,
    routing::get,
    Router,
};

use crate::database::models::*;
use crate::web::error::{AdminError, AdminResult};
use crate::web::extract::{Json, Path, Query};
use crate::web::AppState;

/// Read-only: notifications are written by the broadcast actions.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id", get(get_notification))
}

async fn list_notifications(
    State(state): State<AppState>,
    Query(filter): Query<NotificationFilter>,
) -> AdminResult<Json<Vec<Notification>>> {
    Ok(Json(Notification::list(&state.db.pool, &filter).await?))
}

async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AdminResult<Json<Notification>> {
    Notification::find_by_id(&state.db.pool, id)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("notification"))
}
