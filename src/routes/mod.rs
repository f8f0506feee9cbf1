mod health_check;
mod profile;
mod sessions;

pub use health_check::health_check;
pub use profile::{update_account, update_avatar, update_cover_image};
pub use sessions::{
    change_password, current_user, login, logout, refresh_access_token, register,
};

use actix_multipart::{Field, Multipart};
use actix_web::cookie::Cookie;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, ValidationError};

/// Uniform success envelope: `{statusCode, data, message}`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data,
            message: message.into(),
        }
    }
}

/// Full account row as stored
#[derive(Debug, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account as exposed over the API: password and refresh-token fields stripped
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub created_at: String,
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id.to_string(),
            username: record.username,
            email: record.email,
            fullname: record.fullname,
            avatar: record.avatar_url,
            cover_image: record.cover_image_url,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

const SELECT_USER_COLUMNS: &str = "SELECT id, username, email, fullname, password_hash, \
     avatar_url, cover_image_url, refresh_token, created_at, updated_at FROM users";

pub(crate) fn select_user_where(predicate: &str) -> String {
    format!("{} WHERE {}", SELECT_USER_COLUMNS, predicate)
}

/// Build an HTTP-only, secure credential-carrier cookie
pub(crate) fn auth_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build(name, value)
        .http_only(true)
        .secure(true)
        .path("/")
        .finish()
}

/// Build a removal cookie instructing the client to discard a carrier
pub(crate) fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = auth_cookie(name, String::new());
    cookie.make_removal();
    cookie
}

/// An uploaded file pulled out of a multipart body
pub(crate) struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub(crate) async fn read_text_field(field: &mut Field) -> Result<String, AppError> {
    let name = field.name().to_string();
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        data.extend_from_slice(&chunk?);
    }
    String::from_utf8(data)
        .map_err(|_| AppError::Validation(ValidationError::InvalidFormat(name)))
}

pub(crate) async fn read_file_field(field: &mut Field) -> Result<UploadedFile, AppError> {
    let file_name = field
        .content_disposition()
        .get_filename()
        .unwrap_or("upload")
        .to_string();
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        bytes.extend_from_slice(&chunk?);
    }
    Ok(UploadedFile { file_name, bytes })
}

/// Extract the first file part with the given name from a multipart body,
/// collecting any text parts encountered along the way.
pub(crate) async fn read_single_file(
    payload: &mut Multipart,
    part_name: &str,
) -> Result<Option<UploadedFile>, AppError> {
    let mut file = None;
    while let Some(item) = payload.next().await {
        let mut field = item?;
        if field.name() == part_name && file.is_none() {
            file = Some(read_file_field(&mut field).await?);
        } else {
            // Drain unknown parts so the body is fully consumed
            while let Some(chunk) = field.next().await {
                chunk?;
            }
        }
    }
    Ok(file)
}
