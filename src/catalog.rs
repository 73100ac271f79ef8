//! Monster/stage catalogs and the tasks derived from them.

use std::collections::HashSet;
use std::path::{Component, Path};

use serde::Deserialize;

use crate::constants::BUNDLED_CATALOG;
use crate::error::SpriteError;

/// A monster to draw.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct MonsterSpec {
    /// Positive, unique id; drives the output filename.
    pub id: u32,
    /// Human readable label, only used in logs.
    pub name: String,
    /// Free-text description placed at the front of the prompt.
    pub theme: String,
}

/// A lifecycle stage applied to every monster.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct StageSpec {
    /// Unique filename suffix, e.g. `baby`.
    pub suffix: String,
    /// Visual modifier appended after the theme.
    pub prompt_extra: String,
}

/// Everything needed to derive the task list.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Catalog {
    /// Style text appended to every prompt.
    pub base_style: String,
    /// Monsters, in output order.
    pub monsters: Vec<MonsterSpec>,
    /// Stages, in output order.
    pub stages: Vec<StageSpec>,
}

/// One image to produce.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenerationTask {
    /// Id of the monster this task renders.
    pub monster_id: u32,
    /// Stage suffix this task renders.
    pub stage: String,
    /// Output filename, relative to the output directory.
    pub filename: String,
    /// Full prompt sent to the provider.
    pub prompt: String,
}

/// Builds `monster_{id:03}_{suffix}.png`.
pub fn task_filename(monster_id: u32, suffix: &str) -> String {
    format!("monster_{monster_id:03}_{suffix}.png")
}

/// Builds `{theme}, {extra}, {base_style}`; pieces are used verbatim.
pub fn task_prompt(theme: &str, prompt_extra: &str, base_style: &str) -> String {
    format!("{theme}, {prompt_extra}, {base_style}")
}

/// A suffix must stay inside the output directory and inside its own filename.
fn is_plain_suffix(suffix: &str) -> bool {
    if suffix.contains(['/', '\\']) || suffix.contains("..") {
        return false;
    }
    let mut components = Path::new(suffix).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Cartesian product of the two catalogs, monster-major and stage-minor.
pub fn derive_tasks(
    monsters: &[MonsterSpec],
    stages: &[StageSpec],
    base_style: &str,
) -> Vec<GenerationTask> {
    monsters
        .iter()
        .flat_map(|monster| {
            stages.iter().map(move |stage| GenerationTask {
                monster_id: monster.id,
                stage: stage.suffix.clone(),
                filename: task_filename(monster.id, &stage.suffix),
                prompt: task_prompt(&monster.theme, &stage.prompt_extra, base_style),
            })
        })
        .collect()
}

impl Catalog {
    /// The catalog shipped in `data/catalog.json`.
    pub fn bundled() -> Result<Self, SpriteError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json(raw: &str) -> Result<Self, SpriteError> {
        let catalog: Catalog = serde_json::from_str(raw)
            .map_err(|err| SpriteError::InvalidCatalog(err.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file from disk.
    pub fn from_path(path: &Path) -> Result<Self, SpriteError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SpriteError::InvalidCatalog(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Checks the uniqueness rules that keep output filenames from colliding.
    pub fn validate(&self) -> Result<(), SpriteError> {
        if self.monsters.is_empty() {
            return Err(SpriteError::InvalidCatalog("no monsters defined".to_string()));
        }
        if self.stages.is_empty() {
            return Err(SpriteError::InvalidCatalog("no stages defined".to_string()));
        }

        let mut ids = HashSet::new();
        for monster in &self.monsters {
            if monster.id == 0 {
                return Err(SpriteError::InvalidCatalog(format!(
                    "monster {:?} has id 0, ids must be positive",
                    monster.name
                )));
            }
            if !ids.insert(monster.id) {
                return Err(SpriteError::InvalidCatalog(format!(
                    "duplicate monster id {}",
                    monster.id
                )));
            }
        }

        let mut suffixes = HashSet::new();
        for stage in &self.stages {
            if stage.suffix.is_empty() {
                return Err(SpriteError::InvalidCatalog("empty stage suffix".to_string()));
            }
            if !is_plain_suffix(&stage.suffix) {
                return Err(SpriteError::InvalidCatalog(format!(
                    "stage suffix {:?} must be a plain filename part",
                    stage.suffix
                )));
            }
            if !suffixes.insert(stage.suffix.as_str()) {
                return Err(SpriteError::InvalidCatalog(format!(
                    "duplicate stage suffix {:?}",
                    stage.suffix
                )));
            }
        }
        Ok(())
    }

    /// Restrict the catalog to the given monster ids and stage suffixes.
    ///
    /// Empty selections keep everything. Catalog order is kept regardless of
    /// the order the selection was given in.
    pub fn select(&self, monster_ids: &[u32], stages: &[String]) -> Result<Self, SpriteError> {
        if let Some(missing) = monster_ids
            .iter()
            .find(|id| !self.monsters.iter().any(|monster| monster.id == **id))
        {
            return Err(SpriteError::UnknownSelection(format!(
                "no monster with id {missing}"
            )));
        }
        if let Some(missing) = stages
            .iter()
            .find(|suffix| !self.stages.iter().any(|stage| &stage.suffix == *suffix))
        {
            return Err(SpriteError::UnknownSelection(format!(
                "no stage with suffix {missing:?}"
            )));
        }

        let monsters = self
            .monsters
            .iter()
            .filter(|monster| monster_ids.is_empty() || monster_ids.contains(&monster.id))
            .cloned()
            .collect();
        let stages = self
            .stages
            .iter()
            .filter(|stage| stages.is_empty() || stages.contains(&stage.suffix))
            .cloned()
            .collect();

        Ok(Self {
            base_style: self.base_style.clone(),
            monsters,
            stages,
        })
    }

    /// All tasks for this catalog.
    pub fn tasks(&self) -> Vec<GenerationTask> {
        derive_tasks(&self.monsters, &self.stages, &self.base_style)
    }
}
