use std::path::{Path, PathBuf};

use anyhow::Result;

use sky::filemanager::{all_subdirs_of, remove_folders, FolderStamp, ResultFolderConfig, ARCHIVE_DIR};

/// Apply the retention limits of `config` to an existing results tree
/// without creating a new run. Returns every removed folder.
pub fn prune_results(config: &ResultFolderConfig) -> Result<Vec<PathBuf>> {
    anyhow::ensure!(
        config.root.is_dir(),
        "Results directory does not exist: {}",
        config.root.display()
    );

    let mut removed = Vec::new();
    if let Some(max_daily) = config.max_daily_folders {
        removed.extend(remove_folders(&config.root, max_daily, FolderStamp::Date)?);
    }
    if let Some(max_res) = config.max_res_folders {
        for day in all_subdirs_of(&config.root)? {
            if day == ARCHIVE_DIR || FolderStamp::Date.parse(&day).is_none() {
                continue;
            }
            removed.extend(remove_folders(config.root.join(&day), max_res, FolderStamp::Time)?);
        }
    }

    Ok(removed)
}

/// Run folders left under all daily folders.
pub fn count_runs(root: &Path) -> Result<usize> {
    let mut total = 0;
    for day in all_subdirs_of(root)? {
        if day == ARCHIVE_DIR || FolderStamp::Date.parse(&day).is_none() {
            continue;
        }
        total += all_subdirs_of(root.join(&day))?.len();
    }
    Ok(total)
}
