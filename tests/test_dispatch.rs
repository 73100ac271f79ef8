use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spritegen::catalog::{Catalog, GenerationTask, MonsterSpec, StageSpec};
use spritegen::config::setup_logging;
use spritegen::dispatch::{Cooldown, DispatchOptions, Dispatcher};
use spritegen::error::SpriteError;
use spritegen::provider::ImageGenerator;

/// Records prompts and fails on the ones it was told to.
#[derive(Default)]
struct FakeGenerator {
    calls: Mutex<Vec<String>>,
    fail_on: Vec<String>,
}

impl FakeGenerator {
    fn failing_on(prompts: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: prompts.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

impl ImageGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, SpriteError> {
        self.calls.lock().expect("lock").push(prompt.to_string());
        if self.fail_on.iter().any(|p| p == prompt) {
            Err(SpriteError::MissingImage)
        } else {
            Ok(prompt.as_bytes().to_vec())
        }
    }
}

#[derive(Clone, Default)]
struct RecordingCooldown {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingCooldown {
    fn waits(&self) -> Vec<Duration> {
        self.waits.lock().expect("lock").clone()
    }
}

impl Cooldown for RecordingCooldown {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().expect("lock").push(duration);
    }
}

fn catalog() -> Catalog {
    Catalog {
        base_style: "pixel art".to_string(),
        monsters: vec![
            MonsterSpec {
                id: 1,
                name: "Slime".to_string(),
                theme: "green slime".to_string(),
            },
            MonsterSpec {
                id: 2,
                name: "Ghost".to_string(),
                theme: "cute ghost".to_string(),
            },
        ],
        stages: vec![
            StageSpec {
                suffix: "baby".to_string(),
                prompt_extra: "baby version".to_string(),
            },
            StageSpec {
                suffix: "adult".to_string(),
                prompt_extra: "adult version".to_string(),
            },
        ],
    }
}

fn options(out_dir: &Path, skip_existing: bool) -> DispatchOptions {
    DispatchOptions {
        out_dir: out_dir.to_path_buf(),
        cooldown: Duration::from_secs(5),
        skip_existing,
    }
}

fn filenames(tasks: &[GenerationTask]) -> Vec<String> {
    tasks.iter().map(|t| t.filename.clone()).collect()
}

#[tokio::test]
async fn generates_every_task_in_order() {
    let _ = setup_logging(true);
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = catalog().tasks();
    let cooldown = RecordingCooldown::default();
    let dispatcher = Dispatcher::new(
        FakeGenerator::default(),
        cooldown.clone(),
        options(dir.path(), false),
    );

    let report = dispatcher.run(&tasks).await;

    assert_eq!(report.generated, filenames(&tasks));
    assert!(report.failed.is_empty());
    assert_eq!(
        dispatcher.generator().calls(),
        tasks.iter().map(|t| t.prompt.clone()).collect::<Vec<_>>()
    );
    for task in &tasks {
        let written = std::fs::read(dir.path().join(&task.filename)).expect("read output");
        assert_eq!(written, task.prompt.as_bytes());
    }
    // one cooldown between each pair of calls
    assert_eq!(cooldown.waits(), vec![Duration::from_secs(5); tasks.len() - 1]);
}

#[tokio::test]
async fn second_skip_existing_run_makes_no_calls() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = catalog().tasks();

    let first = Dispatcher::new(
        FakeGenerator::default(),
        RecordingCooldown::default(),
        options(dir.path(), true),
    );
    let report = first.run(&tasks).await;
    assert_eq!(report.generated.len(), tasks.len());

    let cooldown = RecordingCooldown::default();
    let second = Dispatcher::new(
        FakeGenerator::default(),
        cooldown.clone(),
        options(dir.path(), true),
    );
    let report = second.run(&tasks).await;

    assert!(second.generator().calls().is_empty());
    assert!(cooldown.waits().is_empty());
    assert_eq!(report.skipped, filenames(&tasks));
    assert!(report.generated.is_empty());
}

#[tokio::test]
async fn failure_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = catalog().tasks();
    let failing = tasks[1].clone();
    let cooldown = RecordingCooldown::default();
    let dispatcher = Dispatcher::new(
        FakeGenerator::failing_on(&[failing.prompt.as_str()]),
        cooldown.clone(),
        options(dir.path(), false),
    );

    let report = dispatcher.run(&tasks).await;

    assert_eq!(report.failed, vec![failing.filename.clone()]);
    assert_eq!(report.generated.len(), tasks.len() - 1);
    assert_eq!(dispatcher.generator().calls().len(), tasks.len());
    assert!(!dir.path().join(&failing.filename).exists());
    for task in tasks.iter().skip(2) {
        assert!(dir.path().join(&task.filename).exists());
    }
    // the failed call is still followed by a cooldown
    assert_eq!(cooldown.waits().len(), tasks.len() - 1);
}

#[tokio::test]
async fn rerun_fills_only_the_gaps() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = catalog().tasks();
    let failing = tasks[2].clone();

    let first = Dispatcher::new(
        FakeGenerator::failing_on(&[failing.prompt.as_str()]),
        RecordingCooldown::default(),
        options(dir.path(), true),
    );
    let report = first.run(&tasks).await;
    assert_eq!(report.failed, vec![failing.filename.clone()]);

    let second = Dispatcher::new(
        FakeGenerator::default(),
        RecordingCooldown::default(),
        options(dir.path(), true),
    );
    let report = second.run(&tasks).await;

    assert_eq!(second.generator().calls(), vec![failing.prompt.clone()]);
    assert_eq!(report.generated, vec![failing.filename.clone()]);
    assert_eq!(report.skipped.len(), tasks.len() - 1);
}

#[tokio::test]
async fn overwrite_mode_regenerates_existing_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = catalog().tasks();
    std::fs::write(dir.path().join(&tasks[0].filename), b"stale").expect("write");

    let dispatcher = Dispatcher::new(
        FakeGenerator::default(),
        RecordingCooldown::default(),
        options(dir.path(), false),
    );
    let report = dispatcher.run(&tasks).await;

    assert!(report.skipped.is_empty());
    assert_eq!(dispatcher.generator().calls().len(), tasks.len());
    let written = std::fs::read(dir.path().join(&tasks[0].filename)).expect("read");
    assert_eq!(written, tasks[0].prompt.as_bytes());
}

#[tokio::test]
async fn write_failure_is_a_task_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = catalog().tasks();
    // a directory where the image should go makes the final rename fail
    std::fs::create_dir(dir.path().join(&tasks[0].filename)).expect("mkdir");

    let dispatcher = Dispatcher::new(
        FakeGenerator::default(),
        RecordingCooldown::default(),
        options(dir.path(), false),
    );
    let report = dispatcher.run(&tasks).await;

    assert_eq!(report.failed, vec![tasks[0].filename.clone()]);
    assert_eq!(report.generated.len(), tasks.len() - 1);
    assert!(
        !dir
            .path()
            .join(format!("{}.part", tasks[0].filename))
            .exists()
    );
}

#[tokio::test]
async fn empty_task_list_is_a_no_op() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cooldown = RecordingCooldown::default();
    let dispatcher = Dispatcher::new(
        FakeGenerator::default(),
        cooldown.clone(),
        options(dir.path(), false),
    );
    let report = dispatcher.run(&[]).await;
    assert_eq!(report.total(), 0);
    assert!(cooldown.waits().is_empty());
}

#[tokio::test]
async fn directory_at_target_is_not_a_finished_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = catalog().tasks();
    std::fs::create_dir(dir.path().join(&tasks[0].filename)).expect("mkdir");

    let dispatcher = Dispatcher::new(
        FakeGenerator::default(),
        RecordingCooldown::default(),
        options(dir.path(), true),
    );
    let report = dispatcher.run(&tasks).await;

    assert!(report.skipped.is_empty());
    assert_eq!(dispatcher.generator().calls().len(), tasks.len());
    // the directory still blocks the write, so the task is reported missing
    assert_eq!(report.failed, vec![tasks[0].filename.clone()]);
    assert_eq!(report.generated.len(), tasks.len() - 1);
}

#[test]
fn escaping_stage_suffix_never_reaches_the_dispatcher() {
    let mut catalog = catalog();
    catalog.stages[0].suffix = "q/../../shared".to_string();
    assert!(matches!(
        catalog.validate(),
        Err(SpriteError::InvalidCatalog(_))
    ));
}
