use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use super::IdsPayload;
use crate::database::models::*;
use crate::web::error::{AdminError, AdminResult};
use crate::web::extract::{Json, Path, Query};
use crate::web::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ParticipantRow {
    #[serde(flatten)]
    pub participant: ParticipantListItem,
    pub display_name: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/participants", get(list_participants))
        .route(
            "/participants/actions/export-telegram-ids",
            post(export_telegram_ids),
        )
        .route(
            "/participants/:id",
            get(get_participant)
                .put(update_participant)
                .delete(delete_participant),
        )
}

async fn list_participants(
    State(state): State<AppState>,
    Query(filter): Query<ParticipantFilter>,
) -> AdminResult<Json<Vec<ParticipantRow>>> {
    let rows = Participant::list(&state.db.pool, &filter)
        .await?
        .into_iter()
        .map(|participant| ParticipantRow {
            display_name: participant.display_name(),
            participant,
        })
        .collect();
    Ok(Json(rows))
}

async fn get_participant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AdminResult<Json<Participant>> {
    Participant::find_by_id(&state.db.pool, id)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("participant"))
}

async fn update_participant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ParticipantInput>,
) -> AdminResult<Json<Participant>> {
    if let Some(experience) = input.experience.as_deref() {
        if Experience::parse(experience).is_none() {
            return Err(AdminError::BadRequest(format!(
                "unknown experience level '{experience}'"
            )));
        }
    }

    Participant::update(&state.db.pool, id, &input)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("participant"))
}

async fn delete_participant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AdminResult<StatusCode> {
    if Participant::delete(&state.db.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdminError::NotFound("participant"))
    }
}

/// Plain-text download, one Telegram id per line. An empty selection
/// exports everyone.
async fn export_telegram_ids(
    State(state): State<AppState>,
    Json(payload): Json<IdsPayload>,
) -> AdminResult<impl IntoResponse> {
    let ids = Participant::telegram_ids(&state.db.pool, &payload.ids).await?;
    let body = ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join("\n");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"telegram_ids.txt\"",
            ),
        ],
        body,
    ))
}
