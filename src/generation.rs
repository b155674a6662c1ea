use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use thiserror::Error;
use tracing::{error, info};

use crate::models::{GeneratedPayload, ImageUpload};

/// Every variant displays as the exact text shown in the error region.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Please select an image file.")]
    MissingImage,
    #[error("Failed to fetch from the server. Check your backend.")]
    Status(StatusCode),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Payload(String),
}

/// The remote endpoint that enhances the image and writes the copy.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(
        &self,
        image: &ImageUpload,
        product_name: &str,
        keywords: &str,
    ) -> Result<GeneratedPayload, GenerationError>;
}

pub struct GenerationClient {
    client: Client,
    endpoint: String,
}

impl GenerationClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(image: &ImageUpload, product_name: &str, keywords: &str) -> Form {
        let part = Part::bytes(image.data.to_vec()).file_name(image.file_name.clone());
        let part = match image.content_type.as_deref() {
            Some(mime) => match part.mime_str(mime) {
                Ok(part) => part,
                Err(_) => Part::bytes(image.data.to_vec()).file_name(image.file_name.clone()),
            },
            None => part,
        };
        Form::new()
            .part("image", part)
            .text("product_name", product_name.to_string())
            .text("keywords", keywords.to_string())
    }
}

#[async_trait]
impl GenerationService for GenerationClient {
    async fn generate(
        &self,
        image: &ImageUpload,
        product_name: &str,
        keywords: &str,
    ) -> Result<GeneratedPayload, GenerationError> {
        info!(
            "🔗 Posting {} ({} bytes) to {}",
            image.file_name,
            image.data.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(Self::build_form(image, product_name, keywords))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            error!("❌ Generation service answered {}", status);
            return Err(GenerationError::Status(status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        GeneratedPayload::from_json(&body).map_err(|e| {
            error!("❌ Rejected generation payload: {}", e);
            GenerationError::Payload(e)
        })
    }
}
