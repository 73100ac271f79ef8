//! Config handling

use std::time::Duration;

use tracing::debug;
use tracing::log::LevelFilter;

use crate::cli::GenerateArgs;
use crate::error::SpriteError;
use crate::provider::{ProviderConfig, ProviderKind, parse_api_base};

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("reqwest", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Picks the credential: explicit value first, then the provider's env var
/// as returned by `lookup`.
pub fn resolve_api_key<F>(
    explicit: Option<&str>,
    kind: ProviderKind,
    lookup: F,
) -> Result<String, SpriteError>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .map(str::to_string)
        .or_else(|| lookup(kind.api_key_env()))
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| SpriteError::MissingCredential(kind.to_string()))
}

/// Shows only the ends of a secret, for logs.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{head}...{tail}")
}

/// Resolves everything the provider needs from the command line and process environment.
pub fn provider_config(args: &GenerateArgs) -> Result<ProviderConfig, SpriteError> {
    let api_key = resolve_api_key(args.api_key.as_deref(), args.provider, |name| {
        std::env::var(name).ok()
    })?;
    debug!(
        "Using API key {} (length {})",
        mask_secret(&api_key),
        api_key.len()
    );

    let api_base = parse_api_base(
        args.api_base
            .as_deref()
            .unwrap_or_else(|| args.provider.default_api_base()),
    )?;

    Ok(ProviderConfig {
        kind: args.provider,
        api_key,
        model: args
            .model
            .clone()
            .unwrap_or_else(|| args.provider.default_model().to_string()),
        api_base,
        timeout: Duration::from_secs(args.timeout_secs),
        aspect_ratio: args.aspect_ratio.clone(),
    })
}
