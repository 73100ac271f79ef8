use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{ImageGenerator, success_body};
use crate::error::SpriteError;

/// Request body for POST models/{model}:predict
#[derive(Serialize, Debug)]
struct PredictRequest<'a> {
    instances: [PredictInstance<'a>; 1],
    parameters: PredictParameters<'a>,
}

#[derive(Serialize, Debug)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u8,
    aspect_ratio: &'a str,
    output_options: OutputOptions,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: &'static str,
}

#[derive(Deserialize, Debug)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

/// Google Imagen through the Generative Language `:predict` endpoint.
#[derive(Clone, Debug)]
pub struct ImagenClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: Url,
    aspect_ratio: String,
}

impl ImagenClient {
    /// `api_base` must end in `/`, see [`super::parse_api_base`].
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        model: String,
        api_base: &Url,
        aspect_ratio: String,
    ) -> Result<Self, SpriteError> {
        let endpoint = api_base.join(&format!("models/{model}:predict"))?;
        Ok(Self {
            client,
            api_key,
            model,
            endpoint,
            aspect_ratio,
        })
    }
}

impl ImageGenerator for ImagenClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, SpriteError> {
        let req_body = PredictRequest {
            instances: [PredictInstance { prompt }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: &self.aspect_ratio,
                output_options: OutputOptions {
                    mime_type: "image/png",
                },
            },
        };

        debug!("Requesting image from {}", self.model);
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&req_body)
            .send()
            .await?;
        let body = success_body(resp).await?;

        let parsed: PredictResponse = serde_json::from_slice(&body)?;
        let first = parsed
            .predictions
            .into_iter()
            .next()
            .ok_or(SpriteError::MissingImage)?;
        if let Some(mime_type) = &first.mime_type {
            debug!("Imagen returned {mime_type}");
        }
        let encoded = first.bytes_base64_encoded.ok_or(SpriteError::MissingImage)?;
        Ok(general_purpose::STANDARD.decode(encoded)?)
    }
}
