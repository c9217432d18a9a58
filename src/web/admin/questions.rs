use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::database::models::*;
use crate::web::error::{AdminError, AdminResult};
use crate::web::extract::{Json, Path, Query};
use crate::web::AppState;

const SHORT_TEXT_CHARS: usize = 50;

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionRow {
    #[serde(flatten)]
    pub question: QuestionWithAuthor,
    pub short_text: String,
    pub author_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AnsweredPatch {
    pub is_answered: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions))
        .route(
            "/questions/:id",
            get(get_question).patch(mark_answered).delete(delete_question),
        )
}

async fn list_questions(
    State(state): State<AppState>,
    Query(filter): Query<QuestionFilter>,
) -> AdminResult<Json<Vec<QuestionRow>>> {
    let rows = Question::list(&state.db.pool, &filter)
        .await?
        .into_iter()
        .map(|question| QuestionRow {
            short_text: short_text(&question.question_text, SHORT_TEXT_CHARS),
            author_name: display_name(
                &question.full_name,
                question.username.as_deref(),
                question.telegram_id,
            ),
            question,
        })
        .collect();
    Ok(Json(rows))
}

async fn get_question(State(state): State<AppState>, Path(id): Path<i64>) -> AdminResult<Json<Question>> {
    Question::find_by_id(&state.db.pool, id)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("question"))
}

async fn mark_answered(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<AnsweredPatch>,
) -> AdminResult<Json<Question>> {
    Question::set_answered(&state.db.pool, id, patch.is_answered)
        .await?
        .map(Json)
        .ok_or(AdminError::NotFound("question"))
}

async fn delete_question(State(state): State<AppState>, Path(id): Path<i64>) -> AdminResult<StatusCode> {
    if Question::delete(&state.db.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdminError::NotFound("question"))
    }
}
