use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use super::{BroadcastOutcome, IdsPayload};
use crate::database::models::*;
use crate::utils::validation::validate_title;
use crate::web::error::{AdminError, AdminResult};
use crate::web::extract::{Json, Path, Query};
use crate::web::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProgramChangePayload {
    #[serde(default)]
    pub change_description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgramChangeOutcome {
    pub event_id: i64,
    pub sent: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/actions/new-event", post(send_new_event_notifications))
        .route("/events/actions/reminder", post(send_event_reminder))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/:id/program-change", post(send_program_change))
}

async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> AdminResult<Json<Vec<EventListItem>>> {
    Ok(Json(Event::list(&state.db.pool, &filter).await?))
}

async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<EventInput>,
) -> AdminResult<(StatusCode, Json<Event>)> {
    validate_title("Event title", &input.title)?;
    let event = Event::create(&state.db.pool, &input).await?;
    tracing::info!("Admin created event {} ('{}')", event.id, event.title);
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_event(State(state): State<AppState>, Path(id): Path<i64>) -> AdminResult<Json<Event>> {
    Event::find_by_id(&state.db.pool, id)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("event"))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<EventInput>,
) -> AdminResult<Json<Event>> {
    validate_title("Event title", &input.title)?;
    Event::update(&state.db.pool, id, &input)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("event"))
}

async fn delete_event(State(state): State<AppState>, Path(id): Path<i64>) -> AdminResult<StatusCode> {
    if Event::delete(&state.db.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdminError::NotFound("event"))
    }
}

async fn send_program_change(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProgramChangePayload>,
) -> AdminResult<Json<ProgramChangeOutcome>> {
    let event = Event::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(AdminError::NotFound("event"))?;

    let description = payload.change_description.trim();
    if description.is_empty() {
        return Err(AdminError::BadRequest(
            "Please enter a description of the changes".to_string(),
        ));
    }

    let sent = state
        .notifications
        .send_program_change_notification(&event, description)
        .await?;

    Ok(Json(ProgramChangeOutcome { event_id: event.id, sent }))
}

async fn send_new_event_notifications(
    State(state): State<AppState>,
    Json(payload): Json<IdsPayload>,
) -> AdminResult<Json<Vec<BroadcastOutcome>>> {
    if payload.ids.is_empty() {
        return Err(AdminError::BadRequest("Please select at least one event".to_string()));
    }

    let events = Event::find_by_ids(&state.db.pool, &payload.ids).await?;
    let mut outcomes = Vec::with_capacity(events.len());
    for event in events {
        let sent = state.notifications.send_new_event_notification(&event).await?;
        outcomes.push(BroadcastOutcome {
            id: event.id,
            title: event.title,
            sent,
        });
    }

    Ok(Json(outcomes))
}

async fn send_event_reminder(
    State(state): State<AppState>,
    Json(payload): Json<IdsPayload>,
) -> AdminResult<Json<BroadcastOutcome>> {
    let [id] = payload.ids.as_slice() else {
        return Err(AdminError::BadRequest("Please select exactly one event".to_string()));
    };

    let event = Event::find_by_id(&state.db.pool, *id)
        .await?
        .ok_or(AdminError::NotFound("event"))?;
    let sent = state.notifications.send_reminder_notification(&event, None).await?;

    Ok(Json(BroadcastOutcome {
        id: event.id,
        title: event.title,
        sent,
    }))
}
