/// Client for the external media-upload service
///
/// Avatars and cover images are not stored locally; raw bytes are forwarded
/// to the media store and only the returned hosted URL is persisted on the
/// account.

use serde::Deserialize;

use crate::error::MediaError;

#[derive(Clone)]
pub struct MediaClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Upload result returned by the media store
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: Option<String>,
}

impl MediaClient {
    pub fn new(base_url: String, api_key: String, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url,
            api_key,
        }
    }

    /// Upload a single file and return its hosted URL
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedMedia, MediaError> {
        let url = format!("{}/upload", self.base_url);
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach media store: {}", e);
                MediaError::ServiceUnavailable(e.to_string())
            })?
            .error_for_status()
            .map_err(|e| {
                tracing::error!("Media store returned error: {}", e);
                MediaError::UploadFailed(e.to_string())
            })?;

        response.json::<UploadedMedia>().await.map_err(|e| {
            tracing::error!("Malformed media store response: {}", e);
            MediaError::UploadFailed(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploaded_media_deserialization() {
        let body = r#"{"url": "https://media.example/abc.png", "public_id": "abc"}"#;
        let media: UploadedMedia = serde_json::from_str(body).unwrap();
        assert_eq!(media.url, "https://media.example/abc.png");
        assert_eq!(media.public_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_uploaded_media_without_public_id() {
        let body = r#"{"url": "https://media.example/abc.png"}"#;
        let media: UploadedMedia = serde_json::from_str(body).unwrap();
        assert!(media.public_id.is_none());
    }
}
