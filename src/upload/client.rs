use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadResponse {
    pub image_url: Option<String>,
    pub raw_url: Option<String>,
    pub deletion_url: Option<String>,
}

impl UploadResponse {
    /// URL destined for the clipboard. Empty when the service response
    /// omitted the field, so callers can still finish the run.
    pub fn selected_url(&self, raw_file: bool) -> String {
        let field = if raw_file {
            &self.raw_url
        } else {
            &self.image_url
        };
        field.clone().unwrap_or_default()
    }

    pub fn image_url_display(&self) -> &str {
        self.image_url.as_deref().unwrap_or("N/A")
    }

    pub fn raw_url_display(&self) -> &str {
        self.raw_url.as_deref().unwrap_or("N/A")
    }

    pub fn deletion_url_display(&self) -> &str {
        self.deletion_url.as_deref().unwrap_or("N/A")
    }
}

pub struct UploadClient {
    http: reqwest::Client,
    base_url: String,
}

impl UploadClient {
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(|error| AppError::UploadTransport(error.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// POSTs the image as the `file` part of a multipart form, with the API
    /// key in the `key` header. Only a 200 counts as accepted.
    pub async fn upload(
        &self,
        api_key: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> AppResult<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(mime)
            .map_err(|error| {
                AppError::UploadTransport(format!("invalid mime type {mime}: {error}"))
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.base_url)
            .header("key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|error| AppError::UploadTransport(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| AppError::UploadTransport(error.to_string()))?;

        if status != reqwest::StatusCode::OK {
            return Err(AppError::UploadRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str::<UploadResponse>(&body)?)
    }
}
