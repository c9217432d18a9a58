use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};

use crate::database::models::*;
use crate::utils::validation::{validate_telegram_user_id, validate_title};
use crate::web::error::{AdminError, AdminResult};
use crate::web::extract::{Json, Path, Query};
use crate::web::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/speakers", get(list_speakers).post(create_speaker))
        .route(
            "/speakers/:id",
            get(get_speaker).put(update_speaker).delete(delete_speaker),
        )
}

fn validate(input: &SpeakerInput) -> AdminResult<()> {
    validate_title("Speaker name", &input.name)?;
    if let Some(telegram_id) = input.telegram_id {
        validate_telegram_user_id(telegram_id)?;
    }
    Ok(())
}

async fn list_speakers(
    State(state): State<AppState>,
    Query(filter): Query<SpeakerFilter>,
) -> AdminResult<Json<Vec<SpeakerListItem>>> {
    Ok(Json(Speaker::list(&state.db.pool, &filter).await?))
}

async fn create_speaker(
    State(state): State<AppState>,
    Json(input): Json<SpeakerInput>,
) -> AdminResult<(StatusCode, Json<Speaker>)> {
    validate(&input)?;
    let speaker = Speaker::create(&state.db.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(speaker)))
}

async fn get_speaker(State(state): State<AppState>, Path(id): Path<i64>) -> AdminResult<Json<Speaker>> {
    Speaker::find_by_id(&state.db.pool, id)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("speaker"))
}

async fn update_speaker(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<SpeakerInput>,
) -> AdminResult<Json<Speaker>> {
    validate(&input)?;
    Speaker::update(&state.db.pool, id, &input)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("speaker"))
}

async fn delete_speaker(State(state): State<AppState>, Path(id): Path<i64>) -> AdminResult<StatusCode> {
    if Speaker::delete(&state.db.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdminError::NotFound("speaker"))
    }
}
