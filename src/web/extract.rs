//! Admin extractors. Same shape as axum's, but a malformed body, path or
//! query string is answered with the JSON `{error}` body of [`AdminError`].

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::web::error::AdminError;

pub struct Json<T>(pub T);

pub struct Path<T>(pub T);

pub struct Query<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) = axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) = axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for AdminError {
    fn from(rejection: JsonRejection) -> Self {
        AdminError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AdminError {
    fn from(rejection: PathRejection) -> Self {
        AdminError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AdminError {
    fn from(rejection: QueryRejection) -> Self {
        AdminError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Titled {
        #[allow(dead_code)]
        title: String,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let result = Json::<Titled>::from_request(json_request("{}"), &()).await;
        match result {
            Err(AdminError::BadRequest(message)) => assert!(message.contains("title")),
            other => panic!("expected BadRequest, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_query_rejection_is_bad_request() {
        #[derive(Debug, Deserialize)]
        struct Filter {
            #[allow(dead_code)]
            is_active: Option<bool>,
        }

        let request = Request::builder()
            .uri("/events?is_active=maybe")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let result = Query::<Filter>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AdminError::BadRequest(_))));
    }
}
