use bytes::Bytes;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// A file chosen in the picker. Nothing about its type or size is checked before upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormInput {
    pub image: Option<ImageUpload>,
    pub product_name: String,
    pub keywords: String,
}

/// Form fields without the image bytes, for the JSON state view.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FormSummary {
    pub product_name: String,
    pub keywords: String,
    pub image_name: Option<String>,
}

impl From<&FormInput> for FormSummary {
    fn from(form: &FormInput) -> Self {
        Self {
            product_name: form.product_name.clone(),
            keywords: form.keywords.clone(),
            image_name: form.image.as_ref().map(|i| i.file_name.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedText {
    pub description: String,
    pub social_post: String,
    pub hashtags: Vec<String>,
}

impl GeneratedText {
    pub fn hashtag_line(&self) -> String {
        self.hashtags.join(" ")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedPayload {
    pub enhanced_image_url: String,
    pub generated_text: GeneratedText,
}

impl GeneratedPayload {
    /// Parses a response body and checks it against the expected schema.
    /// Every field is required; the image must be an absolute http(s) URL.
    pub fn from_json(body: &str) -> Result<Self, String> {
        let payload: GeneratedPayload = serde_json::from_str(body).map_err(|e| e.to_string())?;
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.enhanced_image_url)
            .map_err(|e| format!("enhanced_image_url is not a valid URL: {e}"))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(format!("enhanced_image_url has unsupported scheme '{other}'")),
        }
    }
}
