//! Error handling

use std::path::PathBuf;

use tracing::error;

/// Errors raised while configuring or running a sprite generation batch.
#[derive(Debug)]
pub enum SpriteError {
    /// No API key was supplied for the named provider
    MissingCredential(String),
    /// The catalog failed to parse or validate
    InvalidCatalog(String),
    /// A `--monster`/`--stage` selection named something not in the catalog
    UnknownSelection(String),
    /// The output directory could not be established
    OutputDir(PathBuf, std::io::Error),
    /// A provider URL could not be built
    InvalidUrl(url::ParseError),
    /// Transport level failure talking to the provider
    Http(reqwest::Error),
    /// The provider answered with a non-success status
    Api {
        /// HTTP status returned
        status: reqwest::StatusCode,
        /// Response body, lossily decoded
        body: String,
    },
    /// The response body was not the JSON we expected
    MalformedResponse(String),
    /// The response parsed but carried no image
    MissingImage,
    /// The image payload was not valid base64
    Decode(base64::DecodeError),
    /// Reading or writing a file failed
    Io(PathBuf, std::io::Error),
}

impl SpriteError {
    /// Configuration errors abort the whole run, everything else only fails one task.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential(_)
                | Self::InvalidCatalog(_)
                | Self::UnknownSelection(_)
                | Self::OutputDir(..)
                | Self::InvalidUrl(_)
        )
    }

    /// Logs the error against the file it was meant to produce.
    pub fn log_for(&self, filename: &str) {
        error!("Failed to generate {filename}: {self}");
    }
}

impl std::fmt::Display for SpriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential(provider) => {
                write!(f, "No API key configured for provider {provider}")
            }
            Self::InvalidCatalog(msg) => write!(f, "Invalid catalog: {msg}"),
            Self::UnknownSelection(msg) => write!(f, "Unknown selection: {msg}"),
            Self::OutputDir(path, err) => write!(
                f,
                "Failed to create output directory {}: {err}",
                path.display()
            ),
            Self::InvalidUrl(err) => write!(f, "Invalid provider URL: {err}"),
            Self::Http(err) => write!(f, "Request failed: {err}"),
            Self::Api { status, body } => write!(f, "API error {status}: {body}"),
            Self::MalformedResponse(msg) => write!(f, "Malformed response: {msg}"),
            Self::MissingImage => write!(f, "Response did not contain image data"),
            Self::Decode(err) => write!(f, "Failed to base64-decode image: {err}"),
            Self::Io(path, err) => write!(f, "I/O error on {}: {err}", path.display()),
        }
    }
}

impl std::error::Error for SpriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OutputDir(_, err) | Self::Io(_, err) => Some(err),
            Self::InvalidUrl(err) => Some(err),
            Self::Http(err) => Some(err),
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SpriteError {
    fn from(err: reqwest::Error) -> Self {
        SpriteError::Http(err)
    }
}

impl From<url::ParseError> for SpriteError {
    fn from(err: url::ParseError) -> Self {
        SpriteError::InvalidUrl(err)
    }
}

impl From<base64::DecodeError> for SpriteError {
    fn from(err: base64::DecodeError) -> Self {
        SpriteError::Decode(err)
    }
}

impl From<serde_json::Error> for SpriteError {
    fn from(err: serde_json::Error) -> Self {
        SpriteError::MalformedResponse(err.to_string())
    }
}
