use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};

use crate::auth::jwt::{verify_session_token, Claims};
use crate::state::app_state::AppState;
use crate::AppError;

/// A verified operator session, extracted from the Authorization header.
///
/// Verification checks the JWT signature and expiry, then requires the
/// session id to still be live in the registry, so logged-out tokens fail
/// even before they expire.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub claims: Claims,
}

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(AppError::unauthorized)?;

    let auth_value = auth_header.to_str().map_err(|_| AppError::unauthorized())?;

    let parts: Vec<&str> = auth_value.split_whitespace().collect();
    if parts.len() != 2 || parts[0] != "Bearer" || parts[1].is_empty() {
        return Err(AppError::unauthorized());
    }
    Ok(parts[1].to_string())
}

impl FromRequest for AdminSession {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let token = bearer_token(&req)?;

            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::internal("AppState not configured".to_string()))?;

            let claims = verify_session_token(&token, &state.security)?;
            if !state.sessions.is_live(&claims.jti) {
                return Err(AppError::unauthorized_with("SESSION_REVOKED"));
            }
            Ok(AdminSession { claims })
        })
    }
}
