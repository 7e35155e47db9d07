use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    error::{AppError, Result},
    models::UserRole,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub kind: TokenKind,
    pub exp: usize,
}

fn generate(
    auth: &AuthConfig,
    user_id: i32,
    email: &str,
    role: UserRole,
    kind: TokenKind,
    ttl: chrono::Duration,
) -> Result<String> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::InternalError("Failed to calculate expiration".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        kind,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Token generation failed: {}", e)))
}

pub fn generate_access_token(
    auth: &AuthConfig,
    user_id: i32,
    email: &str,
    role: UserRole,
) -> Result<String> {
    let ttl = chrono::Duration::hours(auth.access_token_hours);
    generate(auth, user_id, email, role, TokenKind::Access, ttl)
}

pub fn generate_refresh_token(
    auth: &AuthConfig,
    user_id: i32,
    email: &str,
    role: UserRole,
) -> Result<String> {
    let ttl = chrono::Duration::days(auth.refresh_token_days);
    generate(auth, user_id, email, role, TokenKind::Refresh, ttl)
}

pub fn verify_token(auth: &AuthConfig, token: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Geçersiz token: {}", e)))
}

/// Verifies an access token, rejecting refresh tokens presented as bearer
/// credentials.
pub fn verify_access_token(auth: &AuthConfig, token: &str) -> Result<Claims> {
    let claims = verify_token(auth, token)?;
    if claims.kind != TokenKind::Access {
        return Err(AppError::Unauthorized(
            "Erişim tokenı gerekli".to_string(),
        ));
    }
    Ok(claims)
}

pub fn verify_refresh_token(auth: &AuthConfig, token: &str) -> Result<Claims> {
    let claims = verify_token(auth, token)?;
    if claims.kind != TokenKind::Refresh {
        return Err(AppError::Unauthorized(
            "Yenileme tokenı gerekli".to_string(),
        ));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config(access_hours: i64) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_token_hours: access_hours,
            refresh_token_days: 30,
        }
    }

    #[test]
    fn access_token_round_trip() {
        let auth = auth_config(12);
        let token = generate_access_token(&auth, 7, "a@b.com", UserRole::Customer).unwrap();
        let claims = verify_access_token(&auth, &token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, UserRole::Customer);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn refresh_token_rejected_as_access() {
        let auth = auth_config(12);
        let token = generate_refresh_token(&auth, 7, "a@b.com", UserRole::Admin).unwrap();
        assert!(verify_access_token(&auth, &token).is_err());
        assert!(verify_refresh_token(&auth, &token).is_ok());
    }

    #[test]
    fn token_lifetime_follows_config() {
        let auth = auth_config(1);
        let token = generate_access_token(&auth, 7, "a@b.com", UserRole::Customer).unwrap();
        let claims = verify_access_token(&auth, &token).unwrap();

        let remaining = claims.exp as i64 - chrono::Utc::now().timestamp();
        assert!((3500..=3700).contains(&remaining), "got {}", remaining);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let auth = auth_config(12);
        let token = generate_access_token(&auth, 7, "a@b.com", UserRole::Customer).unwrap();

        let other = AuthConfig {
            jwt_secret: "other-secret".to_string(),
            ..auth_config(12)
        };
        assert!(verify_token(&other, &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token(&auth_config(12), "not-a-jwt").is_err());
    }
}
