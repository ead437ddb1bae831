//! Public read-only bout endpoints.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::app_state::AppState;

const DEFAULT_HISTORY_LIMIT: u64 = 20;
const MAX_HISTORY_LIMIT: u64 = 100;

/// Current bout snapshot, identical to what spectators receive over the
/// websocket.
async fn snapshot(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.controller.snapshot().await;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<u64>,
}

/// Most recent completed rounds, newest first.
async fn history(
    query: web::Query<HistoryQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    let rounds = app_state.controller.recent_rounds(limit).await?;
    Ok(HttpResponse::Ok().json(rounds))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::get().to(snapshot)));
    cfg.service(web::resource("/history").route(web::get().to(history)));
}
