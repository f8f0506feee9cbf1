/// Credential issuance
///
/// Produces the access/refresh token pair for an account and commits the new
/// refresh token to the account row. Persisting the new value overwrites the
/// previous one, which is the revocation mechanism: every issuance invalidates
/// any refresh token handed out before it, with or without an explicit logout.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::jwt::{generate_access_token, generate_refresh_token};
use crate::configuration::JwtSettings;
use crate::error::AppError;

/// A freshly issued access/refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue a new token pair for the given account
///
/// One persisted write: the account's `refresh_token` column is replaced.
/// Any failure (account missing, signing, persistence) is fatal for the
/// in-flight request; no partial pair is ever returned.
pub async fn issue_credentials(
    pool: &PgPool,
    config: &JwtSettings,
    user_id: Uuid,
) -> Result<TokenPair, AppError> {
    let account = sqlx::query_as::<_, (String, String)>(
        "SELECT username, email FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::Issuance(format!("failed to load account: {}", e)))?
    .ok_or_else(|| AppError::Issuance(format!("account {} not found", user_id)))?;

    let (username, email) = account;

    let access_token = generate_access_token(&user_id, &username, &email, config)?;
    let refresh_token = generate_refresh_token(&user_id, config)?;

    let result = sqlx::query(
        r#"
        UPDATE users
        SET refresh_token = $1, updated_at = $2
        WHERE id = $3
        "#,
    )
    .bind(&refresh_token)
    .bind(chrono::Utc::now())
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| AppError::Issuance(format!("failed to persist refresh token: {}", e)))?;

    if result.rows_affected() == 0 {
        return Err(AppError::Issuance(format!(
            "account {} disappeared during issuance",
            user_id
        )));
    }

    tracing::debug!(user_id = %user_id, "Issued new credential pair");

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}
