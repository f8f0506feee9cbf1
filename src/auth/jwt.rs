/// JWT signing and validation
///
/// Access and refresh tokens are both HS256 JWTs, signed with distinct
/// secrets. Validation checks signature, expiry, and issuer; the additional
/// stored-value equality check for refresh tokens lives with the caller.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Generate a short-lived access token for a user
pub fn generate_access_token(
    user_id: &Uuid,
    username: &str,
    email: &str,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = Claims::new(
        *user_id,
        username.to_string(),
        email.to_string(),
        config.access_token_expiry,
        config.issuer.clone(),
    );

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.access_secret.as_bytes()),
    )
    .map_err(|e| AppError::Issuance(format!("access token generation failed: {}", e)))
}

/// Generate a long-lived refresh token for a user
pub fn generate_refresh_token(user_id: &Uuid, config: &JwtSettings) -> Result<String, AppError> {
    let claims = RefreshClaims::new(*user_id, config.refresh_token_expiry, config.issuer.clone());

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.refresh_secret.as_bytes()),
    )
    .map_err(|e| AppError::Issuance(format!("refresh token generation failed: {}", e)))
}

/// Validate an access token and extract its claims
///
/// # Errors
/// Returns `Unauthorized` if the token is invalid, expired, or tampered with
pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.access_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("Access token validation error: {}", e);
        AppError::Auth(AuthError::TokenInvalid)
    })
}

/// Validate a refresh token's signature, expiry, and issuer
///
/// This is only the structural half of refresh validation; callers must also
/// compare the presented token against the value stored on the account.
pub fn validate_refresh_token(
    token: &str,
    config: &JwtSettings,
) -> Result<RefreshClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);

    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(config.refresh_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("Refresh token validation error: {}", e);
        AppError::Auth(AuthError::TokenInvalid)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            access_secret: "access-secret-key-at-least-32-chars-long".to_string(),
            refresh_secret: "refresh-secret-key-at-least-32-chars-lg".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = generate_access_token(&user_id, "alice", "a@x.com", &config)
            .expect("Failed to generate token");
        let claims = validate_access_token(&token, &config).expect("Failed to validate token");

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.iss, "test");
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = generate_refresh_token(&user_id, &config).expect("Failed to generate token");
        let claims = validate_refresh_token(&token, &config).expect("Failed to validate token");

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_invalid_token() {
        let config = get_test_config();
        let result = validate_access_token("invalid.token.here", &config);

        assert!(result.is_err());
    }

    #[test]
    fn test_tampered_token() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = generate_access_token(&user_id, "alice", "a@x.com", &config)
            .expect("Failed to generate token");

        // Tamper with token
        let tampered = format!("{}X", token);
        let result = validate_access_token(&tampered, &config);

        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let mut config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = generate_refresh_token(&user_id, &config).expect("Failed to generate token");

        config.issuer = "wrong-issuer".to_string();
        let result = validate_refresh_token(&token, &config);

        assert!(result.is_err());
    }

    #[test]
    fn test_secrets_are_not_interchangeable() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        // An access token must not validate as a refresh token and vice versa
        let access = generate_access_token(&user_id, "alice", "a@x.com", &config)
            .expect("Failed to generate token");
        assert!(validate_refresh_token(&access, &config).is_err());

        let refresh = generate_refresh_token(&user_id, &config).expect("Failed to generate token");
        assert!(validate_access_token(&refresh, &config).is_err());
    }
}
