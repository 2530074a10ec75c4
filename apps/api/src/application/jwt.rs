use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::app_error::{AppError, AppResult};

/// Role required for the back-office API.
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl AdminClaims {
    pub fn is_super_admin(&self) -> bool {
        self.role == SUPER_ADMIN_ROLE
    }
}

pub fn issue_admin(subject: &str, role: &str, secret: &SecretString, ttl: Duration) -> AppResult<String> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = AdminClaims {
        sub: subject.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + ttl.whole_seconds(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

/// Decode and validate signature and expiry. Any failure is `Unauthorized`.
pub fn verify_admin(token: &str, secret: &SecretString) -> AppResult<AdminClaims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Admin token rejected");
        AppError::Unauthorized
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("admin-secret-for-tests".to_string())
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let token = issue_admin("ops@lawnies.com.au", SUPER_ADMIN_ROLE, &secret(), Duration::hours(1)).unwrap();

        let claims = verify_admin(&token, &secret()).unwrap();

        assert_eq!(claims.sub, "ops@lawnies.com.au");
        assert!(claims.is_super_admin());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn other_roles_are_not_super_admin() {
        let token = issue_admin("someone", "operator", &secret(), Duration::hours(1)).unwrap();
        let claims = verify_admin(&token, &secret()).unwrap();
        assert!(!claims.is_super_admin());
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = issue_admin("ops", SUPER_ADMIN_ROLE, &secret(), Duration::hours(1)).unwrap();
        let other = SecretString::from("different".to_string());
        assert!(matches!(verify_admin(&token, &other), Err(AppError::Unauthorized)));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let token = issue_admin("ops", SUPER_ADMIN_ROLE, &secret(), Duration::hours(-2)).unwrap();
        assert!(matches!(verify_admin(&token, &secret()), Err(AppError::Unauthorized)));
    }

    #[test]
    fn garbage_is_unauthorized() {
        assert!(matches!(verify_admin("not.a.jwt", &secret()), Err(AppError::Unauthorized)));
    }
}
