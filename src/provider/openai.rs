use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::{ImageGenerator, success_body};
use crate::error::SpriteError;

/// Request body for POST /v1/images/generations
/// Docs: https://platform.openai.com/docs/api-reference/images
#[derive(Serialize, Debug, PartialEq)]
struct ImagesGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,

    // For GPT image models.
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    output_format: Option<&'a str>,

    // For dall-e models.
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
}

impl<'a> ImagesGenerateRequest<'a> {
    /// GPT image models always return base64; dall-e needs asking.
    fn for_model(model: &'a str, prompt: &'a str) -> Self {
        let base = Self {
            model,
            prompt,
            n: 1,
            size: "1024x1024",
            quality: None,
            output_format: None,
            response_format: Some("b64_json"),
            style: None,
        };
        if model.starts_with("gpt-image") {
            Self {
                quality: Some("high"),
                output_format: Some("png"),
                response_format: None,
                ..base
            }
        } else if model == "dall-e-3" {
            Self {
                quality: Some("hd"),
                style: Some("natural"),
                ..base
            }
        } else {
            base
        }
    }
}

#[derive(Deserialize, Debug)]
struct ImagesGenerateResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize, Debug)]
struct ImageData {
    b64_json: Option<String>,
    url: Option<String>,
    revised_prompt: Option<String>,
}

/// OpenAI Images API.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

impl OpenAiClient {
    /// `api_base` must end in `/`, see [`super::parse_api_base`].
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        model: String,
        api_base: &Url,
    ) -> Result<Self, SpriteError> {
        let endpoint = api_base.join("images/generations")?;
        Ok(Self {
            client,
            api_key,
            model,
            endpoint,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, SpriteError> {
        debug!("Downloading generated image from {url}");
        let resp = self.client.get(url).send().await?;
        success_body(resp).await
    }
}

impl ImageGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, SpriteError> {
        let req_body = ImagesGenerateRequest::for_model(&self.model, prompt);

        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await?;
        let body = success_body(resp).await?;

        let parsed: ImagesGenerateResponse = serde_json::from_slice(&body)?;
        let first = parsed
            .data
            .into_iter()
            .next()
            .ok_or(SpriteError::MissingImage)?;

        if let Some(revised_prompt) = first.revised_prompt {
            info!("Revised prompt from OpenAI: {revised_prompt}");
        }

        if let Some(b64_json) = first.b64_json {
            Ok(general_purpose::STANDARD.decode(b64_json)?)
        } else if let Some(url) = first.url {
            self.download(&url).await
        } else {
            Err(SpriteError::MissingImage)
        }
    }
}
