use anyhow::Result;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{FixedOffset, Utc};
use conference_bot::database::{connection::DatabaseManager, models::*};
use conference_bot::services::notifications::{DisabledSender, NotificationService};
use conference_bot::web::{self, health::HealthResponse, AppState};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

async fn setup_state() -> Result<(AppState, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let db = DatabaseManager::new(&format!("sqlite:{}", db_path.display())).await?;
    db.run_migrations().await?;

    let notifications = NotificationService::new(
        db.clone(),
        Arc::new(DisabledSender),
        FixedOffset::east_opt(3 * 3600).unwrap(),
    );
    Ok((AppState::new(db, notifications, None, false), temp_dir))
}

async fn setup_test_server() -> Result<(TestServer, DatabaseManager, TempDir)> {
    let (state, temp_dir) = setup_state().await?;
    let db = state.db.clone();
    let server = TestServer::new(web::router(state)).unwrap();

    Ok((server, db, temp_dir))
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, db, _temp_dir) = setup_test_server().await?;

    Event::create(
        &db.pool,
        &EventInput {
            title: "RustConf".to_string(),
            description: String::new(),
            date: Utc::now(),
            is_active: true,
        },
    )
    .await?;

    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.database.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.active_events, 1);
    assert!(!health.bot_enabled);
    assert!(!health.admin_enabled);

    Ok(())
}

#[tokio::test]
async fn test_readiness_and_liveness() -> Result<()> {
    let (server, _db, _temp_dir) = setup_test_server().await?;

    let response = server.get("/health/ready").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<String>(), "ready");

    let response = server.get("/health/live").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<String>(), "alive");

    Ok(())
}

#[tokio::test]
async fn test_readiness_fails_when_database_closed() -> Result<()> {
    let (server, db, _temp_dir) = setup_test_server().await?;

    db.pool.close().await;

    server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let response = server.get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "degraded");
    assert_eq!(health.database.status, "unavailable");
    server.get("/health/live").await.assert_status(StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_router_without_admin_token_has_no_admin_routes() -> Result<()> {
    let (server, _db, _temp_dir) = setup_test_server().await?;

    server
        .get("/admin/events")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer anything"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server.get("/health/live").await.assert_status(StatusCode::OK);

    Ok(())
}
