use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use spritegen::cli::{CliOptions, Command, GenerateArgs, ListArgs, ManifestArgs};
use spritegen::config::{provider_config, setup_logging};
use spritegen::dispatch::{DispatchOptions, Dispatcher, TokioCooldown, prepare_out_dir};
use spritegen::manifest::write_manifest_file;
use spritegen::provider::Provider;
use tracing::{error, info, warn};

async fn generate(args: GenerateArgs) -> Result<()> {
    let catalog = args
        .selection
        .load_catalog()
        .context("Failed to load catalog")?;
    let config = provider_config(&args)?;
    prepare_out_dir(&args.out_dir).await?;

    let provider = Provider::from_config(config).context("Failed to set up provider")?;
    let tasks = catalog.tasks();
    info!(
        "Generating {} images into {}",
        tasks.len(),
        args.out_dir.display()
    );

    let dispatcher = Dispatcher::new(
        provider,
        TokioCooldown,
        DispatchOptions {
            out_dir: args.out_dir.clone(),
            cooldown: Duration::from_secs(args.cooldown_secs),
            skip_existing: args.skip_existing,
        },
    );
    let report = dispatcher.run(&tasks).await;

    info!(
        "Done with {} tasks: {} generated, {} skipped, {} failed",
        report.total(),
        report.generated.len(),
        report.skipped.len(),
        report.failed.len()
    );
    if !report.failed.is_empty() {
        warn!(
            "Missing after this run (re-run with --skip-existing to fill them in): {}",
            report.failed.join(", ")
        );
    }
    Ok(())
}

fn manifest(args: ManifestArgs) -> Result<()> {
    let catalog = args
        .selection
        .load_catalog()
        .context("Failed to load catalog")?;
    let tasks = catalog.tasks();
    write_manifest_file(&args.output, &tasks)?;
    info!(
        "Wrote {} ({} prompts)",
        args.output.display(),
        tasks.len()
    );
    Ok(())
}

fn list(args: ListArgs) -> Result<()> {
    let catalog = args
        .selection
        .load_catalog()
        .context("Failed to load catalog")?;
    for task in catalog.tasks() {
        let status = if args.out_dir.join(&task.filename).is_file() {
            "done"
        } else {
            "todo"
        };
        println!("{status}\t{}\t{}", task.filename, task.prompt);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliOptions::parse();

    let _ = setup_logging(cli.debug);

    let result = match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Manifest(args) => manifest(args),
        Command::List(args) => list(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
