use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Session token lifetime. Long enough to cover an evening of bouts.
const SESSION_TTL_SECS: i64 = 12 * 60 * 60;

/// Subject recorded in every operator session token.
pub const OPERATOR_SUBJECT: &str = "operator";

/// Claims included in operator session tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    /// Session id; revoked on logout.
    pub jti: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Mint a HS256 session token with a fresh session id.
pub fn mint_session_token(
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<(String, Claims), AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time".to_string()))?
        .as_secs() as i64;

    let claims = Claims {
        sub: OPERATOR_SUBJECT.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat,
        exp: iat + SESSION_TTL_SECS,
    };

    let token = encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))?;
    Ok((token, claims))
}

/// Verify a session token and return its claims.
pub fn verify_session_token(token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    // Default Validation already checks exp; pin algorithm to configured algorithm.
    let validation = Validation::new(security.algorithm);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::unauthorized_with("TOKEN_EXPIRED")
        }
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::unauthorized_with("INVALID_SIGNATURE")
        }
        _ => AppError::unauthorized_with("INVALID_TOKEN"),
    })
}
