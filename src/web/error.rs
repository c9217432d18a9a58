use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::logging::log_database_error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("missing or invalid admin token")]
    Unauthorized,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

/// JSON body of every admin error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<sqlx::Error> for AdminError {
    fn from(e: sqlx::Error) -> Self {
        // Constraint violations come from bad input (unknown foreign key,
        // duplicate unique value), not from the server.
        if let sqlx::Error::Database(db_error) = &e {
            let message = db_error.message();
            if message.contains("FOREIGN KEY") {
                return AdminError::BadRequest("referenced record does not exist".to_string());
            }
            if message.contains("UNIQUE") {
                return AdminError::BadRequest(format!("duplicate value: {message}"));
            }
        }
        AdminError::Database(e)
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(e: anyhow::Error) -> Self {
        AdminError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Unauthorized => StatusCode::UNAUTHORIZED,
            AdminError::Database(e) => {
                log_database_error("admin request", "-", &e.to_string(), None);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match &self {
            AdminError::Database(_) => "internal database error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

pub type AdminResult<T> = Result<T, AdminError>;
