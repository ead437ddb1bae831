use actix_web::{web, App, HttpServer};
use backend::config::{BoutConfig, GatewayConfig};
use backend::gateway::create_gateway;
use backend::infra::db::{connect_db, init_schema};
use backend::middleware::cors::cors_middleware;
use backend::routes;
use backend::services::match_flow::MatchFlowService;
use backend::state::app_state::AppState;
use backend::state::security_config::SecurityConfig;
use backend::telemetry;
use backend::ws::hub::WsRegistry;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    println!("🚀 Starting Punchbout Backend on http://{}:{}", host, port);

    let config = match BoutConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid bout configuration: {e}");
            std::process::exit(1);
        }
    };

    let security_config = match SecurityConfig::from_env() {
        Ok(security) => security,
        Err(e) => {
            eprintln!("❌ Invalid security configuration: {e}");
            std::process::exit(1);
        }
    };

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://punchbout.db?mode=rwc".to_string());
    let db = match connect_db(&database_url).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("❌ Failed to connect to history database: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = init_schema(&db).await {
        eprintln!("❌ Failed to initialize history schema: {e}");
        std::process::exit(1);
    }

    println!("✅ Database connected");

    let gateway_kind = std::env::var("GATEWAY").unwrap_or_else(|_| "openai".to_string());
    let gateway_config = GatewayConfig {
        base_url: std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
        api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
    };
    let gateway = match create_gateway(&gateway_kind, &gateway_config) {
        Some(gateway) => gateway,
        None => {
            eprintln!("❌ Unknown GATEWAY kind: {gateway_kind}");
            std::process::exit(1);
        }
    };

    let registry = Arc::new(WsRegistry::new());
    let controller = MatchFlowService::new(gateway, Arc::clone(&registry), db.clone(), config);
    let app_state = AppState::new(
        Arc::clone(&controller),
        registry,
        security_config,
        db,
    );

    // Kick off round one; a no-op when BOUT_START_PAUSED is set.
    controller.start_next_round().await;

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
