/// Session lifecycle handlers
///
/// Registration, login, logout, token refresh, password change, and the
/// current-user lookup. Login and refresh set the two HTTP-only credential
/// carriers (`accessToken`, `refreshToken`) alongside the response body;
/// logout sends removal cookies for both.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{
    hash_password, issue_credentials, validate_refresh_token, verify_password, Claims,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, DatabaseError, ErrorContext, ValidationError};
use crate::media_client::MediaClient;
use crate::routes::{
    auth_cookie, read_file_field, read_text_field, removal_cookie, select_user_where,
    ApiResponse, UploadedFile, UserRecord, UserResponse,
};
use crate::validators::{is_valid_email, is_valid_fullname, is_valid_password, is_valid_username};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
}

/// Everything pulled out of the registration multipart body
#[derive(Default)]
struct RegistrationForm {
    fullname: Option<String>,
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
    avatar: Option<UploadedFile>,
    cover_image: Option<UploadedFile>,
}

async fn parse_registration_form(payload: &mut Multipart) -> Result<RegistrationForm, AppError> {
    let mut form = RegistrationForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        match field.name() {
            "fullname" => form.fullname = Some(read_text_field(&mut field).await?),
            "email" => form.email = Some(read_text_field(&mut field).await?),
            "username" => form.username = Some(read_text_field(&mut field).await?),
            "password" => form.password = Some(read_text_field(&mut field).await?),
            // First file wins for each part name
            "avatar" if form.avatar.is_none() => {
                form.avatar = Some(read_file_field(&mut field).await?)
            }
            "coverImage" if form.cover_image.is_none() => {
                form.cover_image = Some(read_file_field(&mut field).await?)
            }
            _ => {
                while let Some(chunk) = field.next().await {
                    chunk?;
                }
            }
        }
    }

    Ok(form)
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Validation(ValidationError::MissingField(field.to_string())))
}

/// POST /api/v1/users/register
///
/// Multipart body: text fields `fullname`, `email`, `username`, `password`,
/// file parts `avatar` (required) and `coverImage` (optional).
///
/// # Errors
/// - 400: missing/empty field or missing avatar
/// - 409: username or email already taken
/// - 500: store write failure
pub async fn register(
    mut payload: Multipart,
    pool: web::Data<PgPool>,
    media_client: web::Data<MediaClient>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let form = parse_registration_form(&mut payload).await?;

    let fullname = is_valid_fullname(&required(form.fullname, "fullname")?)?;
    let email = is_valid_email(&required(form.email, "email")?)?;
    let username = is_valid_username(&required(form.username, "username")?)?;
    let password = is_valid_password(&required(form.password, "password")?)?;

    let avatar = form
        .avatar
        .ok_or_else(|| AppError::Validation(ValidationError::MissingField("avatar".to_string())))?;

    // Uniqueness check up front; the DB constraints remain the source of truth
    let existing = sqlx::query_as::<_, (Uuid,)>(
        "SELECT id FROM users WHERE username = $1 OR email = $2",
    )
    .bind(&username)
    .bind(&email)
    .fetch_optional(pool.get_ref())
    .await?;

    if existing.is_some() {
        return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
            "User with email or username already exists".to_string(),
        )));
    }

    let avatar_url = media_client
        .upload(&avatar.file_name, avatar.bytes)
        .await?
        .url;

    let cover_image_url = match form.cover_image {
        Some(file) => Some(media_client.upload(&file.file_name, file.bytes).await?.url),
        None => None,
    };

    let password_hash = hash_password(&password)?;
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    let user = sqlx::query_as::<_, UserRecord>(
        r#"
        INSERT INTO users (id, username, email, fullname, password_hash,
                           avatar_url, cover_image_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING id, username, email, fullname, password_hash,
                  avatar_url, cover_image_url, refresh_token, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&username)
    .bind(&email)
    .bind(&fullname)
    .bind(&password_hash)
    .bind(&avatar_url)
    .bind(&cover_image_url)
    .bind(now)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(ApiResponse::new(
        201,
        UserResponse::from(user),
        "User registered successfully",
    )))
}

/// POST /api/v1/users/login
///
/// Requires `username` or `email` plus `password`.
///
/// # Errors
/// - 400: neither identifier provided
/// - 404: no matching account
/// - 401: wrong password
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let identifier = form
        .username
        .as_deref()
        .map(|u| u.trim().to_lowercase())
        .filter(|u| !u.is_empty())
        .or_else(|| {
            form.email
                .as_deref()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
        })
        .ok_or_else(|| {
            AppError::Validation(ValidationError::MissingField(
                "username or email".to_string(),
            ))
        })?;

    let user = sqlx::query_as::<_, UserRecord>(&select_user_where(
        "username = $1 OR email = $1",
    ))
    .bind(&identifier)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("User does not exist".to_string())))?;

    let password_valid = verify_password(&form.password, &user.password_hash)?;
    if !password_valid {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let pair = issue_credentials(pool.get_ref(), jwt_config.get_ref(), user.id).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie("accessToken", pair.access_token.clone()))
        .cookie(auth_cookie("refreshToken", pair.refresh_token.clone()))
        .json(ApiResponse::new(
            200,
            LoginData {
                user: UserResponse::from(user),
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "User logged in successfully",
        )))
}

/// POST /api/v1/users/logout
///
/// Clears the stored refresh token and instructs the client to discard both
/// credential carriers. Requires authentication.
pub async fn logout(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    sqlx::query("UPDATE users SET refresh_token = NULL, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool.get_ref())
        .await?;

    tracing::info!(user_id = %user_id, "User logged out");

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie("accessToken"))
        .cookie(removal_cookie("refreshToken"))
        .json(ApiResponse::new(
            200,
            serde_json::json!({}),
            "User logged out successfully",
        )))
}

/// POST /api/v1/users/refresh-token
///
/// Reads the refresh token from the `refreshToken` cookie or the request
/// body, validates it structurally and against the stored value, then
/// rotates the full credential pair.
///
/// # Errors
/// - 401: token absent, invalid, expired, for an unknown account, or already
///   rotated out (reuse/replay)
pub async fn refresh_access_token(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let incoming = req
        .cookie("refreshToken")
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|b| b.into_inner().refresh_token))
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    let claims = validate_refresh_token(&incoming, jwt_config.get_ref())?;
    let user_id = claims.user_id()?;

    let stored = sqlx::query_as::<_, (Option<String>,)>(
        "SELECT refresh_token FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(AppError::Auth(AuthError::TokenInvalid))?;

    // A structurally valid token that no longer matches the stored value has
    // been rotated out (or cleared by logout) and must be rejected.
    match stored.0 {
        Some(current) if current == incoming => {}
        _ => {
            tracing::warn!(
                request_id = %context.request_id,
                user_id = %user_id,
                "Attempt to reuse a rotated-out refresh token"
            );
            return Err(AppError::Auth(AuthError::TokenRotatedOut));
        }
    }

    let pair = issue_credentials(pool.get_ref(), jwt_config.get_ref(), user_id).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "Token refreshed successfully"
    );

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie("accessToken", pair.access_token.clone()))
        .cookie(auth_cookie("refreshToken", pair.refresh_token.clone()))
        .json(ApiResponse::new(
            200,
            TokenPairData {
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "Access token refreshed successfully",
        )))
}

/// POST /api/v1/users/change-password
///
/// Verifies the old password and replaces the stored hash. Requires
/// authentication. Deliberately does not rotate the refresh token.
///
/// # Errors
/// - 400: wrong old password, or empty new password
pub async fn change_password(
    claims: web::ReqData<Claims>,
    form: web::Json<ChangePasswordRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let stored = sqlx::query_as::<_, (String,)>("SELECT password_hash FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound("User does not exist".to_string()))
        })?;

    let old_password_valid = verify_password(&form.old_password, &stored.0)?;
    if !old_password_valid {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "old password".to_string(),
        )));
    }

    let new_password = is_valid_password(&form.new_password)?;
    let new_hash = hash_password(&new_password)?;

    sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
        .bind(&new_hash)
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool.get_ref())
        .await?;

    tracing::info!(user_id = %user_id, "Password changed");

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        200,
        serde_json::json!({}),
        "Password changed successfully",
    )))
}

/// GET /api/v1/users/current-user
///
/// Returns the authenticated account. Requires authentication.
pub async fn current_user(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = sqlx::query_as::<_, UserRecord>(&select_user_where("id = $1"))
        .bind(user_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound("User does not exist".to_string()))
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        200,
        UserResponse::from(user),
        "Current user fetched successfully",
    )))
}
