/// Profile update handlers
///
/// Field-level replacement of account details plus the two image-upload
/// endpoints. Binary uploads go to the external media store; only the
/// returned URL is persisted.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::Claims;
use crate::error::{AppError, ValidationError};
use crate::media_client::MediaClient;
use crate::routes::{read_single_file, ApiResponse, UserRecord, UserResponse};
use crate::validators::{is_valid_email, is_valid_fullname};

#[derive(Deserialize)]
pub struct UpdateAccountRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
}

/// PATCH /api/v1/users/account
///
/// Replaces `fullname` and `email`; both fields are required.
///
/// # Errors
/// - 400: missing or invalid field
/// - 409: email already taken by another account
pub async fn update_account(
    claims: web::ReqData<Claims>,
    form: web::Json<UpdateAccountRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let fullname = form.fullname.as_deref().ok_or_else(|| {
        AppError::Validation(ValidationError::MissingField("fullname".to_string()))
    })?;
    let email = form
        .email
        .as_deref()
        .ok_or_else(|| AppError::Validation(ValidationError::MissingField("email".to_string())))?;

    let fullname = is_valid_fullname(fullname)?;
    let email = is_valid_email(email)?;

    let user = sqlx::query_as::<_, UserRecord>(
        r#"
        UPDATE users
        SET fullname = $1, email = $2, updated_at = $3
        WHERE id = $4
        RETURNING id, username, email, fullname, password_hash,
                  avatar_url, cover_image_url, refresh_token, created_at, updated_at
        "#,
    )
    .bind(&fullname)
    .bind(&email)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(user_id = %user_id, "Account details updated");

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        200,
        UserResponse::from(user),
        "Account details updated successfully",
    )))
}

async fn update_image_column(
    pool: &PgPool,
    media_client: &MediaClient,
    claims: &Claims,
    mut payload: Multipart,
    part_name: &str,
    column: &str,
) -> Result<UserRecord, AppError> {
    let user_id = claims.user_id()?;

    let file = read_single_file(&mut payload, part_name)
        .await?
        .ok_or_else(|| {
            AppError::Validation(ValidationError::MissingField(part_name.to_string()))
        })?;

    let uploaded = media_client.upload(&file.file_name, file.bytes).await?;

    // `column` is one of two compile-time constants, never caller input
    let query = format!(
        r#"
        UPDATE users
        SET {} = $1, updated_at = $2
        WHERE id = $3
        RETURNING id, username, email, fullname, password_hash,
                  avatar_url, cover_image_url, refresh_token, created_at, updated_at
        "#,
        column
    );

    let user = sqlx::query_as::<_, UserRecord>(&query)
        .bind(&uploaded.url)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    tracing::info!(user_id = %user_id, column = column, "Profile image updated");

    Ok(user)
}

/// PATCH /api/v1/users/avatar
///
/// Single-file upload replacing the avatar.
///
/// # Errors
/// - 400: file missing or media upload failure
pub async fn update_avatar(
    claims: web::ReqData<Claims>,
    payload: Multipart,
    pool: web::Data<PgPool>,
    media_client: web::Data<MediaClient>,
) -> Result<HttpResponse, AppError> {
    let user = update_image_column(
        pool.get_ref(),
        media_client.get_ref(),
        &claims,
        payload,
        "avatar",
        "avatar_url",
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        200,
        UserResponse::from(user),
        "Avatar updated successfully",
    )))
}

/// PATCH /api/v1/users/cover-image
///
/// Single-file upload replacing the cover image.
///
/// # Errors
/// - 400: file missing or media upload failure
pub async fn update_cover_image(
    claims: web::ReqData<Claims>,
    payload: Multipart,
    pool: web::Data<PgPool>,
    media_client: web::Data<MediaClient>,
) -> Result<HttpResponse, AppError> {
    let user = update_image_column(
        pool.get_ref(),
        media_client.get_ref(),
        &claims,
        payload,
        "coverImage",
        "cover_image_url",
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        200,
        UserResponse::from(user),
        "Cover image updated successfully",
    )))
}
