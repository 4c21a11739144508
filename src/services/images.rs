// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image hosting on Cloudinary (unsigned uploads).
//!
//! Handles:
//! - Multipart upload with a per-chunk progress callback
//! - Delete tokens, retrying once without them when the upload preset
//!   rejects `return_delete_token`
//! - Delete by token
//! - Placeholder URLs when no cloud is configured

use crate::config::CloudinaryConfig;
use crate::error::AppError;
use crate::models::UploadedAsset;
use futures_util::stream;
use serde::Deserialize;
use std::sync::Arc;

/// Progress callback: `(bytes_sent, total_bytes)`.
pub type UploadProgress = Arc<dyn Fn(u64, u64) + Send + Sync>;

const CHUNK_SIZE: usize = 64 * 1024;

/// An image to upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Cloudinary image host client.
#[derive(Clone)]
pub struct ImageHost {
    http: reqwest::Client,
    base_url: String,
    config: Option<CloudinaryConfig>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    delete_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Placeholder used when no image host is configured.
pub fn placeholder_url(file_name: &str) -> String {
    format!(
        "https://placehold.co/600x600?text={}",
        urlencoding::encode(file_name)
    )
}

impl ImageHost {
    pub fn new(config: Option<CloudinaryConfig>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.cloudinary.com".to_string(),
            config,
        }
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Upload an image into `folder`.
    pub async fn upload(
        &self,
        image: ImageUpload,
        folder: &str,
        progress: Option<UploadProgress>,
    ) -> Result<UploadedAsset, AppError> {
        let total = image.bytes.len() as u64;
        let Some(config) = &self.config else {
            if let Some(progress) = &progress {
                progress(total, total);
            }
            return Ok(UploadedAsset {
                url: placeholder_url(&image.file_name),
                delete_token: None,
            });
        };

        let url = format!(
            "{}/v1_1/{}/image/upload",
            self.base_url, config.cloud_name
        );

        match self
            .send_upload(&url, config, &image, folder, true, progress.clone())
            .await
        {
            Err(UploadFailure::DeleteTokenRejected) => {
                tracing::warn!(
                    folder,
                    "Upload preset rejected return_delete_token, retrying without it"
                );
                self.send_upload(&url, config, &image, folder, false, progress)
                    .await
                    .map_err(UploadFailure::into_app_error)
            }
            other => other.map_err(UploadFailure::into_app_error),
        }
    }

    async fn send_upload(
        &self,
        url: &str,
        config: &CloudinaryConfig,
        image: &ImageUpload,
        folder: &str,
        with_delete_token: bool,
        progress: Option<UploadProgress>,
    ) -> Result<UploadedAsset, UploadFailure> {
        let total = image.bytes.len() as u64;
        let chunks: Vec<Vec<u8>> = image.bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
        let mut sent = 0u64;
        let body = stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(progress) = &progress {
                progress(sent, total);
            }
            Ok::<_, std::io::Error>(chunk)
        }));

        let mut part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(body),
            total,
        )
        .file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| UploadFailure::Other(format!("Invalid content type: {}", e)))?;
        }

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", config.upload_preset.clone())
            .text("folder", folder.to_string());
        if with_delete_token {
            form = form.text("return_delete_token", "1");
        }

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadFailure::Other(format!("Upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            if with_delete_token
                && status == reqwest::StatusCode::BAD_REQUEST
                && message.contains("return_delete_token")
            {
                return Err(UploadFailure::DeleteTokenRejected);
            }
            return Err(UploadFailure::Other(format!("HTTP {}: {}", status, message)));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadFailure::Other(format!("Unexpected upload response: {}", e)))?;
        let url = uploaded
            .secure_url
            .or(uploaded.url)
            .ok_or_else(|| UploadFailure::Other("Upload response has no URL".to_string()))?;

        tracing::info!(folder, has_delete_token = uploaded.delete_token.is_some(), "Image uploaded");
        Ok(UploadedAsset {
            url,
            delete_token: uploaded.delete_token,
        })
    }

    /// Delete a hosted image by its delete token.
    pub async fn delete(&self, token: &str) -> Result<(), AppError> {
        let Some(config) = &self.config else {
            tracing::debug!("No image host configured, nothing to delete");
            return Ok(());
        };

        let url = format!("{}/v1_1/{}/delete_by_token", self.base_url, config.cloud_name);
        let response = self
            .http
            .post(&url)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| AppError::ImageHost(format!("Delete request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ImageHost(format!("HTTP {}: {}", status, text)));
        }
        Ok(())
    }
}

enum UploadFailure {
    DeleteTokenRejected,
    Other(String),
}

impl UploadFailure {
    fn into_app_error(self) -> AppError {
        match self {
            UploadFailure::DeleteTokenRejected => {
                AppError::ImageHost("return_delete_token rejected".to_string())
            }
            UploadFailure::Other(msg) => AppError::ImageHost(msg),
        }
    }
}
