//! HTTP tests for the operator control surface.

use std::sync::Arc;
use std::time::SystemTime;

use actix_web::{test, web, App};
use backend::auth::jwt::mint_session_token;
use backend::config::{BoutConfig, GatewayConfig};
use backend::domain::roster::Roster;
use backend::gateway::create_gateway;
use backend::infra::db::{connect_db, init_schema};
use backend::routes;
use backend::services::match_flow::MatchFlowService;
use backend::state::app_state::AppState;
use backend::state::security_config::SecurityConfig;
use backend::ws::hub::WsRegistry;

#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

const PASSCODE: &str = "open-sesame";

async fn app_state() -> AppState {
    let db = connect_db("sqlite::memory:").await.unwrap();
    init_schema(&db).await.unwrap();
    let registry = Arc::new(WsRegistry::new());
    let config = BoutConfig::for_tests(Roster::parse("p,a,b,c,d").unwrap(), 2);
    let gateway_config = GatewayConfig {
        base_url: String::new(),
        api_key: String::new(),
    };
    let gateway = create_gateway("scripted", &gateway_config).unwrap();
    let controller = MatchFlowService::new(gateway, Arc::clone(&registry), db.clone(), config);
    AppState::new(
        controller,
        registry,
        SecurityConfig::new(b"test-secret".to_vec(), PASSCODE),
        db,
    )
}

/// Mint a live session directly, skipping the login endpoint.
fn operator_token(state: &AppState) -> String {
    let (token, claims) = mint_session_token(SystemTime::now(), &state.security).unwrap();
    state.sessions.open(&claims.jti);
    token
}

#[actix_web::test]
async fn login_rejects_a_wrong_or_missing_passcode() {
    let state = app_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .set_json(serde_json::json!({ "passcode": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "INVALID_PASSCODE");

    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .set_json(serde_json::json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn login_issues_a_working_session_token() {
    let state = app_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .set_json(serde_json::json!({ "passcode": PASSCODE }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let token = body["token"].as_str().expect("token in login response");
    assert!(!token.is_empty());
    assert!(body["snapshot"]["generation"].is_number());

    let req = test::TestRequest::get()
        .uri("/api/admin/status")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn status_requires_a_live_session() {
    let state = app_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/admin/status").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/admin/status")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn pause_and_resume_toggle_the_bout() {
    let state = app_state().await;
    let token = operator_token(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/admin/pause")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["paused"], true);

    let req = test::TestRequest::post()
        .uri("/api/admin/resume")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["paused"], false);
}

#[actix_web::test]
async fn reset_validates_the_confirmation_token() {
    let state = app_state().await;
    let token = operator_token(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/admin/reset")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(serde_json::json!({ "confirm": "reset please" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "RESET_CONFIRMATION_MISMATCH");

    let req = test::TestRequest::post()
        .uri("/api/admin/reset")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(serde_json::json!({ "confirm": "RESET" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["paused"], true);
    assert!(body["cumulative_scores"].as_object().unwrap().is_empty());
}

#[actix_web::test]
async fn export_is_a_downloadable_json_document() {
    let state = app_state().await;
    let token = operator_token(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/admin/export")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .expect("content-disposition header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"punchbout-history-"));

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["round_count"], 0);
    assert!(body["rounds"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn logout_revokes_the_session_immediately() {
    let state = app_state().await;
    let token = operator_token(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/admin/logout")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["logged_out"], true);

    // The token is signed and unexpired but no longer honored.
    let req = test::TestRequest::get()
        .uri("/api/admin/status")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "SESSION_REVOKED");
}
