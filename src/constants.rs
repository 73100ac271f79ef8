//! Shared constants/defaults for things
//!

/// The default place we put generated sprites
pub const DEFAULT_OUT_DIR: &str = "./assets/images/monsters";

/// Default manifest file written by `spritegen manifest`
pub const DEFAULT_MANIFEST_PATH: &str = "./monster_prompts.tsv";

/// Seconds to wait between two generation calls.
pub const DEFAULT_COOLDOWN_SECS: u64 = 5;

/// Per-request timeout for provider calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Aspect ratio requested from providers that take one.
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Catalog shipped with the crate.
pub const BUNDLED_CATALOG: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/catalog.json"));

/// Google Generative Language API base
pub const IMAGEN_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/";
/// Default Imagen model
pub const IMAGEN_DEFAULT_MODEL: &str = "imagen-4.0-generate-preview-06-06";
/// Env var holding the Gemini/Imagen key
pub const IMAGEN_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// OpenAI API base
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";
/// Default OpenAI image model
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-image-1.5";
/// Env var holding the OpenAI key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Suffix used for in-progress writes before they are renamed into place.
pub const PARTIAL_SUFFIX: &str = "part";
