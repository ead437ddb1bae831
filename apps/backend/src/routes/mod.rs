use actix_web::web;

pub mod admin;
pub mod bout;
pub mod health;
pub mod realtime;

/// Configure application routes for tests and non-HttpServer contexts.
///
/// `main.rs` wires these under the same scopes with CORS on top; tests
/// register the same paths directly so endpoint behavior can be exercised
/// without the outer middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Public bout routes: /api/bout/**
    cfg.service(web::scope("/api/bout").configure(bout::configure_routes));

    // Operator routes: /api/admin/**
    cfg.service(web::scope("/api/admin").configure(admin::configure_routes));

    // Realtime routes: /api/ws/**
    cfg.service(web::scope("/api/ws").configure(realtime::configure_routes));
}
