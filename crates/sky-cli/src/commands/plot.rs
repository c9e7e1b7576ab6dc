use std::path::{Path, PathBuf};

use anyhow::Result;

use sky::plotlib::{regenerate, SaveFormat};

/// Rebuild a figure from its `data_<name>.json`, optionally in another format.
pub fn run_regenerate(data_path: &Path, format: Option<SaveFormat>) -> Result<PathBuf> {
    anyhow::ensure!(
        data_path.is_file(),
        "Plot data file does not exist: {}",
        data_path.display()
    );
    let saved = regenerate(data_path, format)?;
    log::info!("Regenerated {} from {}", saved.display(), data_path.display());
    Ok(saved)
}
