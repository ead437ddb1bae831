use jsonwebtoken::Algorithm;

use crate::error::AppError;

/// JWT signing settings plus the operator passcode.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Secret key for signing and verifying session tokens.
    pub jwt_secret: Vec<u8>,
    /// Algorithm to use (defaults to HS256).
    pub algorithm: Algorithm,
    /// Shared passcode an operator exchanges for a session token.
    pub admin_passcode: String,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>, admin_passcode: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            admin_passcode: admin_passcode.into(),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::config("JWT_SECRET must be set".to_string()))?;
        let passcode = std::env::var("ADMIN_PASSCODE")
            .map_err(|_| AppError::config("ADMIN_PASSCODE must be set".to_string()))?;
        if passcode.is_empty() {
            return Err(AppError::config("ADMIN_PASSCODE must not be empty".to_string()));
        }
        Ok(Self::new(secret.into_bytes(), passcode))
    }
}

#[cfg(test)]
impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec(), "letmein")
    }
}
