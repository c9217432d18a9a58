use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};

use super::{BroadcastOutcome, IdsPayload};
use crate::database::models::*;
use crate::utils::validation::{validate_speech_window, validate_title};
use crate::web::error::{AdminError, AdminResult};
use crate::web::extract::{Json, Path, Query};
use crate::web::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/speeches", get(list_speeches).post(create_speech))
        .route("/speeches/actions/reminder", post(send_speech_reminders))
        .route(
            "/speeches/:id",
            get(get_speech).put(update_speech).delete(delete_speech),
        )
}

fn validate(input: &SpeechInput) -> AdminResult<()> {
    validate_title("Speech title", &input.title)?;
    validate_speech_window(&input.start_time, &input.end_time)?;
    Ok(())
}

async fn list_speeches(
    State(state): State<AppState>,
    Query(filter): Query<SpeechFilter>,
) -> AdminResult<Json<Vec<SpeechDetails>>> {
    Ok(Json(SpeechDetails::list(&state.db.pool, &filter).await?))
}

async fn create_speech(
    State(state): State<AppState>,
    Json(input): Json<SpeechInput>,
) -> AdminResult<(StatusCode, Json<Speech>)> {
    validate(&input)?;
    let speech = Speech::create(&state.db.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(speech)))
}

async fn get_speech(State(state): State<AppState>, Path(id): Path<i64>) -> AdminResult<Json<Speech>> {
    Speech::find_by_id(&state.db.pool, id)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("speech"))
}

async fn update_speech(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<SpeechInput>,
) -> AdminResult<Json<Speech>> {
    validate(&input)?;
    Speech::update(&state.db.pool, id, &input)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("speech"))
}

async fn delete_speech(State(state): State<AppState>, Path(id): Path<i64>) -> AdminResult<StatusCode> {
    if Speech::delete(&state.db.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdminError::NotFound("speech"))
    }
}

async fn send_speech_reminders(
    State(state): State<AppState>,
    Json(payload): Json<IdsPayload>,
) -> AdminResult<Json<Vec<BroadcastOutcome>>> {
    if payload.ids.is_empty() {
        return Err(AdminError::BadRequest("Please select at least one speech".to_string()));
    }

    let speeches = SpeechDetails::find_by_ids(&state.db.pool, &payload.ids).await?;
    let mut outcomes = Vec::with_capacity(speeches.len());
    for speech in speeches {
        let Some(event) = Event::find_by_id(&state.db.pool, speech.event_id).await? else {
            continue;
        };
        let sent = state
            .notifications
            .send_reminder_notification(&event, Some(&speech))
            .await?;
        outcomes.push(BroadcastOutcome {
            id: speech.id,
            title: speech.title,
            sent,
        });
    }

    Ok(Json(outcomes))
}
