use actix_web::{web, HttpResponse};
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use time::OffsetDateTime;

use crate::db::{require_db, DbClient, LifecycleState};
use crate::error::AppError;
use crate::state::app_state::AppState;

pub async fn root() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().body("db-supervisor backend is running"))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    env: &'static str,
    db: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_error: Option<String>,
    time: String,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let time = OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let (db, db_error) = match require_db(&app_state) {
        Ok(client) => check_client(client).await,
        Err(e) => ("error", Some(format!("DB unavailable: {e}"))),
    };

    let response = HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        env: app_state.env.as_str(),
        db,
        db_error,
        time,
    };

    Ok(HttpResponse::Ok().json(response))
}

async fn check_client(client: &DbClient) -> (&'static str, Option<String>) {
    let backend = match (client.lifecycle(), client.backend()) {
        (LifecycleState::Active, Some(backend)) => backend,
        _ => return ("error", Some("DB disconnected".to_string())),
    };

    // Goes through the interceptor like any other operation
    let probe = Statement::from_string(backend, "SELECT 1 AS health_check".to_string());
    match client.query_one(probe).await {
        Ok(_) => ("ok", None),
        Err(e) => ("error", Some(format!("DB query failed: {e}"))),
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health));
}
