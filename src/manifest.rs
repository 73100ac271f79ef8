//! Prompt manifests, for feeding a UI based generator by hand.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::catalog::GenerationTask;
use crate::error::SpriteError;

/// Writes one `filename<TAB>prompt` line per task.
pub fn write_manifest<W: Write>(mut out: W, tasks: &[GenerationTask]) -> std::io::Result<()> {
    for task in tasks {
        writeln!(out, "{}\t{}", task.filename, task.prompt)?;
    }
    out.flush()
}

/// Writes the manifest to `path`, creating parent directories.
pub fn write_manifest_file(path: &Path, tasks: &[GenerationTask]) -> Result<(), SpriteError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|err| SpriteError::Io(parent.to_path_buf(), err))?;
    }
    let file = File::create(path).map_err(|err| SpriteError::Io(path.to_path_buf(), err))?;
    write_manifest(BufWriter::new(file), tasks)
        .map_err(|err| SpriteError::Io(path.to_path_buf(), err))
}
