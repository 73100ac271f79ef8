//! Image generation providers.
//!
//! Everything provider specific (endpoints, request bodies, response shapes)
//! stays behind [`ImageGenerator`]; the dispatcher only ever sees a prompt go
//! in and bytes come out.

use std::future::Future;
use std::time::Duration;

use clap::ValueEnum;
use tracing::debug;
use url::Url;

use crate::constants::{
    IMAGEN_API_BASE, IMAGEN_API_KEY_ENV, IMAGEN_DEFAULT_MODEL, OPENAI_API_BASE,
    OPENAI_API_KEY_ENV, OPENAI_DEFAULT_MODEL,
};
use crate::error::SpriteError;

mod imagen;
mod openai;

pub use imagen::ImagenClient;
pub use openai::OpenAiClient;

/// Turns a prompt into image bytes.
pub trait ImageGenerator {
    /// Generate one image for `prompt`.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<Vec<u8>, SpriteError>> + Send;
}

/// Which backend to talk to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProviderKind {
    /// Google Imagen via the Generative Language API
    Imagen,
    /// OpenAI Images API
    Openai,
}

impl ProviderKind {
    /// Environment variable the credential is read from when `--api-key` is absent.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Imagen => IMAGEN_API_KEY_ENV,
            Self::Openai => OPENAI_API_KEY_ENV,
        }
    }

    /// Model used when none is configured.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Imagen => IMAGEN_DEFAULT_MODEL,
            Self::Openai => OPENAI_DEFAULT_MODEL,
        }
    }

    /// API base used when none is configured.
    pub fn default_api_base(self) -> &'static str {
        match self {
            Self::Imagen => IMAGEN_API_BASE,
            Self::Openai => OPENAI_API_BASE,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imagen => write!(f, "imagen"),
            Self::Openai => write!(f, "openai"),
        }
    }
}

/// Resolved provider settings.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Backend to use
    pub kind: ProviderKind,
    /// Credential for the backend
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Base URL; endpoint paths are joined onto it
    pub api_base: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Aspect ratio, for providers that accept one
    pub aspect_ratio: String,
}

/// A concrete, ready to use provider.
#[derive(Clone, Debug)]
pub enum Provider {
    /// Imagen backend
    Imagen(ImagenClient),
    /// OpenAI backend
    OpenAi(OpenAiClient),
}

impl Provider {
    /// Builds the client for `config`.
    pub fn from_config(config: ProviderConfig) -> Result<Self, SpriteError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        debug!(
            "Using provider {} with model {} at {}",
            config.kind, config.model, config.api_base
        );
        Ok(match config.kind {
            ProviderKind::Imagen => Self::Imagen(ImagenClient::new(
                client,
                config.api_key,
                config.model,
                &config.api_base,
                config.aspect_ratio,
            )?),
            ProviderKind::Openai => Self::OpenAi(OpenAiClient::new(
                client,
                config.api_key,
                config.model,
                &config.api_base,
            )?),
        })
    }
}

impl ImageGenerator for Provider {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, SpriteError> {
        match self {
            Self::Imagen(client) => client.generate(prompt).await,
            Self::OpenAi(client) => client.generate(prompt).await,
        }
    }
}

/// Parses a base URL, making sure it ends in `/` so `join` appends rather than replaces.
pub fn parse_api_base(raw: &str) -> Result<Url, SpriteError> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}

/// Reads the body, turning a non-success status into [`SpriteError::Api`].
pub(crate) async fn success_body(resp: reqwest::Response) -> Result<Vec<u8>, SpriteError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        return Err(SpriteError::Api {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_gets_trailing_slash() {
        let url = parse_api_base("http://127.0.0.1:9000/v1").expect("parse");
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/v1/");
        assert_eq!(
            url.join("images/generations").expect("join").as_str(),
            "http://127.0.0.1:9000/v1/images/generations"
        );
    }

    #[test]
    fn bad_api_base_is_fatal() {
        let err = parse_api_base("not a url").expect_err("should fail");
        assert!(err.is_fatal());
    }

    #[test]
    fn provider_defaults() {
        assert_eq!(ProviderKind::Imagen.api_key_env(), "GEMINI_API_KEY");
        assert_eq!(ProviderKind::Openai.api_key_env(), "OPENAI_API_KEY");
        assert!(
            ProviderKind::Imagen
                .default_model()
                .starts_with("imagen-")
        );
        assert!(parse_api_base(ProviderKind::Openai.default_api_base()).is_ok());
    }
}
