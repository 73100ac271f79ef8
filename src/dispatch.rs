//! Sequential dispatch of generation tasks.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::catalog::GenerationTask;
use crate::constants::PARTIAL_SUFFIX;
use crate::error::SpriteError;
use crate::provider::ImageGenerator;

/// Waits between generation calls.
pub trait Cooldown {
    /// Wait for `duration`.
    fn wait(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real waiting on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioCooldown;

impl Cooldown for TokioCooldown {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Dispatch settings.
#[derive(Clone, Debug)]
pub struct DispatchOptions {
    /// Directory files are written into
    pub out_dir: PathBuf,
    /// Delay between consecutive generation calls
    pub cooldown: Duration,
    /// Treat an existing output file as done
    pub skip_existing: bool,
}

/// What happened during a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DispatchReport {
    /// Files written this run
    pub generated: Vec<String>,
    /// Files left alone because they already existed
    pub skipped: Vec<String>,
    /// Files that could not be produced
    pub failed: Vec<String>,
}

impl DispatchReport {
    /// Total number of tasks seen.
    pub fn total(&self) -> usize {
        self.generated.len() + self.skipped.len() + self.failed.len()
    }
}

/// Makes sure the output directory exists before any task runs.
pub async fn prepare_out_dir(out_dir: &Path) -> Result<(), SpriteError> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|err| SpriteError::OutputDir(out_dir.to_path_buf(), err))
}

/// True when a regular file already sits at `path`; a directory there is not
/// a finished image.
pub async fn image_exists(path: &Path) -> Result<bool, SpriteError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(SpriteError::Io(path.to_path_buf(), err)),
    }
}

/// Writes `bytes` to `path` through a sibling `.part` file, so `path` only
/// ever appears complete.
pub async fn write_image(path: &Path, bytes: &[u8]) -> Result<(), SpriteError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| SpriteError::Io(parent.to_path_buf(), err))?;
    }
    let partial = partial_path(path);
    if let Err(err) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(SpriteError::Io(partial, err));
    }
    if let Err(err) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(SpriteError::Io(path.to_path_buf(), err));
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}

/// Runs tasks one at a time against a generator.
#[derive(Debug)]
pub struct Dispatcher<G, C> {
    generator: G,
    cooldown: C,
    options: DispatchOptions,
}

impl<G: ImageGenerator, C: Cooldown> Dispatcher<G, C> {
    /// New dispatcher.
    pub fn new(generator: G, cooldown: C, options: DispatchOptions) -> Self {
        Self {
            generator,
            cooldown,
            options,
        }
    }

    /// The generator this dispatcher calls.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Run every task in order. Per-task failures are logged and recorded in
    /// the report; they never stop the batch.
    pub async fn run(&self, tasks: &[GenerationTask]) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut called_before = false;

        for (index, task) in tasks.iter().enumerate() {
            let output_path = self.options.out_dir.join(&task.filename);

            if self.options.skip_existing {
                match image_exists(&output_path).await {
                    Ok(true) => {
                        info!("Skipping {} (already exists)", task.filename);
                        report.skipped.push(task.filename.clone());
                        continue;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        err.log_for(&task.filename);
                        report.failed.push(task.filename.clone());
                        continue;
                    }
                }
            }

            if called_before {
                debug!("Waiting {:?} for cooldown", self.options.cooldown);
                self.cooldown.wait(self.options.cooldown).await;
            }
            called_before = true;

            info!(
                "Generating {} ({}/{})",
                task.filename,
                index + 1,
                tasks.len()
            );
            match self.generate_one(task, &output_path).await {
                Ok(()) => {
                    info!("Saved {}", output_path.display());
                    report.generated.push(task.filename.clone());
                }
                Err(err) => {
                    err.log_for(&task.filename);
                    report.failed.push(task.filename.clone());
                }
            }
        }

        report
    }

    async fn generate_one(
        &self,
        task: &GenerationTask,
        output_path: &Path,
    ) -> Result<(), SpriteError> {
        debug!("Prompt for {}: {}", task.filename, task.prompt);
        let bytes = self.generator.generate(&task.prompt).await?;
        write_image(output_path, &bytes).await
    }
}
