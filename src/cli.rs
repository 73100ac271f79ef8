//! CLI parser
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::catalog::Catalog;
use crate::constants::{
    DEFAULT_ASPECT_RATIO, DEFAULT_COOLDOWN_SECS, DEFAULT_MANIFEST_PATH, DEFAULT_OUT_DIR,
    DEFAULT_TIMEOUT_SECS,
};
use crate::error::SpriteError;
use crate::provider::ProviderKind;

#[derive(Parser, Debug)]
#[command(name = "spritegen")]
#[command(about = "Batch-generate pixel-art monster sprites via an image generation API")]
/// CLI Options
pub struct CliOptions {
    #[clap(long, global = true, help = "Enable debug logging", env = "SPRITEGEN_DEBUG")]
    /// Enable debug logging. Env: SPRITEGEN_DEBUG
    pub debug: bool,

    #[command(subcommand)]
    /// What to do
    pub command: Command,
}

#[derive(Subcommand, Debug)]
/// Operating modes
pub enum Command {
    /// Call the provider for every task and write the images
    Generate(GenerateArgs),
    /// Write every filename/prompt pair to a manifest instead of calling an API
    Manifest(ManifestArgs),
    /// Print the tasks and whether their files already exist
    List(ListArgs),
}

#[derive(Args, Debug, Clone)]
/// Which catalog to use and which part of it
pub struct SelectionArgs {
    #[clap(long, env = "SPRITEGEN_CATALOG")]
    /// JSON catalog file, defaults to the bundled catalog.
    /// Env: SPRITEGEN_CATALOG
    pub catalog: Option<PathBuf>,

    #[clap(long = "monster", value_delimiter = ',')]
    /// Only these monster ids (repeatable or comma separated)
    pub monsters: Vec<u32>,

    #[clap(long = "stage", value_delimiter = ',')]
    /// Only these stage suffixes (repeatable or comma separated)
    pub stages: Vec<String>,
}

impl SelectionArgs {
    /// Loads the catalog and applies the selection.
    pub fn load_catalog(&self) -> Result<Catalog, SpriteError> {
        let catalog = match &self.catalog {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::bundled()?,
        };
        catalog.select(&self.monsters, &self.stages)
    }
}

#[derive(Args, Debug, Clone)]
/// Options for `generate`
pub struct GenerateArgs {
    #[command(flatten)]
    /// Catalog selection
    pub selection: SelectionArgs,

    #[clap(long, default_value = DEFAULT_OUT_DIR, env = "SPRITEGEN_OUT_DIR")]
    /// Output directory, created if missing. Env: SPRITEGEN_OUT_DIR
    pub out_dir: PathBuf,

    #[clap(long, default_value_t = DEFAULT_COOLDOWN_SECS, env = "SPRITEGEN_COOLDOWN_SECS")]
    /// Seconds to wait between generation calls. Env: SPRITEGEN_COOLDOWN_SECS
    pub cooldown_secs: u64,

    #[clap(long, env = "SPRITEGEN_SKIP_EXISTING")]
    /// Leave existing output files alone instead of regenerating them.
    /// Env: SPRITEGEN_SKIP_EXISTING
    pub skip_existing: bool,

    #[clap(long, value_enum, default_value_t = ProviderKind::Imagen, env = "SPRITEGEN_PROVIDER")]
    /// Image generation backend. Env: SPRITEGEN_PROVIDER
    pub provider: ProviderKind,

    #[clap(long, env = "SPRITEGEN_MODEL")]
    /// Model identifier, defaults per provider. Env: SPRITEGEN_MODEL
    pub model: Option<String>,

    #[clap(long, env = "SPRITEGEN_API_KEY", hide_env_values = true)]
    /// API key; falls back to GEMINI_API_KEY or OPENAI_API_KEY depending on the provider
    pub api_key: Option<String>,

    #[clap(long, env = "SPRITEGEN_API_BASE")]
    /// Override the provider's API base URL. Env: SPRITEGEN_API_BASE
    pub api_base: Option<String>,

    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    #[clap(long, default_value = DEFAULT_ASPECT_RATIO)]
    /// Aspect ratio for providers that accept one
    pub aspect_ratio: String,
}

#[derive(Args, Debug, Clone)]
/// Options for `manifest`
pub struct ManifestArgs {
    #[command(flatten)]
    /// Catalog selection
    pub selection: SelectionArgs,

    #[clap(long, short, default_value = DEFAULT_MANIFEST_PATH)]
    /// Where to write the manifest
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
/// Options for `list`
pub struct ListArgs {
    #[command(flatten)]
    /// Catalog selection
    pub selection: SelectionArgs,

    #[clap(long, default_value = DEFAULT_OUT_DIR, env = "SPRITEGEN_OUT_DIR")]
    /// Output directory to check for existing files. Env: SPRITEGEN_OUT_DIR
    pub out_dir: PathBuf,
}
