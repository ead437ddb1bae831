//! Operator control surface.
//!
//! Every endpoint except `login` requires a live operator session (see
//! [`AdminSession`]). Mutating endpoints return the resulting snapshot so
//! the operator UI can render without waiting for the websocket echo.

use std::time::SystemTime;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::mint_session_token;
use crate::domain::snapshot::BoutSnapshot;
use crate::error::AppError;
use crate::extractors::admin_session::AdminSession;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub passcode: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub snapshot: BoutSnapshot,
}

/// Exchange the shared passcode for a session token.
async fn login(
    req: web::Json<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if req.passcode.is_empty() || req.passcode != app_state.security.admin_passcode {
        return Err(AppError::unauthorized_with("INVALID_PASSCODE"));
    }

    let (token, claims) = mint_session_token(SystemTime::now(), &app_state.security)?;
    app_state.sessions.open(&claims.jti);

    let snapshot = app_state.controller.snapshot().await;
    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        expires_at: claims.exp,
        snapshot,
    }))
}

async fn status(
    _session: AdminSession,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.controller.snapshot().await;
    Ok(HttpResponse::Ok().json(snapshot))
}

async fn pause(
    _session: AdminSession,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.controller.pause().await;
    Ok(HttpResponse::Ok().json(snapshot))
}

async fn resume(
    _session: AdminSession,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.controller.resume().await;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirm: String,
}

async fn reset(
    _session: AdminSession,
    req: web::Json<ResetRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.controller.reset(&req.confirm).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// Full round history as a downloadable JSON document.
async fn export(
    _session: AdminSession,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let document = app_state.controller.export().await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        document.suggested_filename()
    );
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_DISPOSITION, disposition))
        .json(document))
}

#[derive(Debug, Serialize)]
struct LogoutResponse {
    logged_out: bool,
}

/// Revoke the calling session; its token stops working immediately.
async fn logout(
    session: AdminSession,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let logged_out = app_state.sessions.revoke(&session.claims.jti);
    Ok(HttpResponse::Ok().json(LogoutResponse { logged_out }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/login").route(web::post().to(login)));
    cfg.service(web::resource("/status").route(web::get().to(status)));
    cfg.service(web::resource("/pause").route(web::post().to(pause)));
    cfg.service(web::resource("/resume").route(web::post().to(resume)));
    cfg.service(web::resource("/reset").route(web::post().to(reset)));
    cfg.service(web::resource("/export").route(web::get().to(export)));
    cfg.service(web::resource("/logout").route(web::post().to(logout)));
}
