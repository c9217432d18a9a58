use axum::{
    extract::State,
    routing::get,
    Router,
};

use crate::database::models::*;
use crate::web::error::{AdminError, AdminResult};
use crate::web::extract::{Json, Path, Query};
use crate::web::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", get(list_subscriptions))
        .route(
            "/subscriptions/:id",
            get(get_subscription).patch(update_flags),
        )
}

async fn list_subscriptions(
    State(state): State<AppState>,
    Query(filter): Query<SubscriptionFilter>,
) -> AdminResult<Json<Vec<SubscriptionListItem>>> {
    Ok(Json(Subscription::list(&state.db.pool, &filter).await?))
}

async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AdminResult<Json<Subscription>> {
    Subscription::find_by_id(&state.db.pool, id)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("subscription"))
}

async fn update_flags(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<SubscriptionFlagsPatch>,
) -> AdminResult<Json<Subscription>> {
    Subscription::update_flags(&state.db.pool, id, &patch)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("subscription"))
}
