//! Dated result folders with a keep-the-newest retention policy.
//!
//! Layout: `<root>/<YYYY-MM-DD>/<HH_MM_SS>_<tag>/`, or
//! `<root>/Archive/<YYYY-MM-DD>/...` for runs that must never be pruned.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Name of the archive folder under the results root; never pruned.
pub const ARCHIVE_DIR: &str = "Archive";

/// Timestamp prefix carried by a folder name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStamp {
    /// `YYYY-MM-DD`, used for daily folders.
    Date,
    /// `HH_MM_SS`, used for run folders inside a day.
    Time,
}

impl FolderStamp {
    pub fn format(&self) -> &'static str {
        match self {
            FolderStamp::Date => "%Y-%m-%d",
            FolderStamp::Time => "%H_%M_%S",
        }
    }

    /// Length of the timestamp prefix in characters.
    pub fn width(&self) -> usize {
        match self {
            FolderStamp::Date => 10,
            FolderStamp::Time => 8,
        }
    }

    /// Parse the timestamp prefix of a folder name into a sortable key.
    pub fn parse(&self, name: &str) -> Option<NaiveDateTime> {
        let prefix = name.get(..self.width())?;
        match self {
            FolderStamp::Date => NaiveDate::parse_from_str(prefix, self.format())
                .ok()?
                .and_hms_opt(0, 0, 0),
            FolderStamp::Time => {
                let time = NaiveTime::parse_from_str(prefix, self.format()).ok()?;
                Some(NaiveDate::from_ymd_opt(1970, 1, 1)?.and_time(time))
            }
        }
    }

    /// Render a timestamp as folder-name prefix.
    pub fn render(&self, at: &NaiveDateTime) -> String {
        at.format(self.format()).to_string()
    }
}

/// Sub-directory names of `path`.
pub fn all_subdirs_of<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)
        .with_context(|| format!("Failed to list directory: {}", path.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Delete the oldest stamped sub-directories of `path` until `max_keep` remain.
///
/// Folders whose names do not start with a parseable stamp are logged and
/// left alone; the archive folder is skipped without a message. Returns the
/// removed paths, oldest first.
pub fn remove_folders<P: AsRef<Path>>(path: P, max_keep: usize, stamp: FolderStamp) -> Result<Vec<PathBuf>> {
    prune_stamped(path.as_ref(), max_keep, stamp, None)
}

/// Like [`remove_folders`], but `protected` is never removed and counts
/// towards `max_keep` when present.
fn prune_stamped(
    path: &Path,
    max_keep: usize,
    stamp: FolderStamp,
    protected: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let mut stamped: Vec<(NaiveDateTime, String)> = Vec::new();
    let mut max_keep = max_keep;

    for name in all_subdirs_of(path)? {
        if Some(name.as_str()) == protected {
            max_keep = max_keep.saturating_sub(1);
            continue;
        }
        match stamp.parse(&name) {
            Some(key) => stamped.push((key, name)),
            None if name == ARCHIVE_DIR => {}
            None => log::warn!("Could not interpret folder name: \"{}\". Skipped folder", name),
        }
    }

    let mut removed = Vec::new();
    if stamped.len() <= max_keep {
        return Ok(removed);
    }

    stamped.sort();
    let n_remove = stamped.len() - max_keep;
    for (_, name) in stamped.into_iter().take(n_remove) {
        let target = path.join(&name);
        fs::remove_dir_all(&target)
            .with_context(|| format!("Failed to remove folder: {}", target.display()))?;
        log::info!("Removed old result folder {}", target.display());
        removed.push(target);
    }
    Ok(removed)
}

/// Where result folders go and how many are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultFolderConfig {
    pub root: PathBuf,
    /// Daily folders kept under `root`; `None` keeps all.
    pub max_daily_folders: Option<usize>,
    /// Run folders kept per day; `None` keeps all.
    pub max_res_folders: Option<usize>,
    /// Store under `root/Archive` and skip pruning.
    pub archive: bool,
}

impl Default for ResultFolderConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("results"),
            max_daily_folders: None,
            max_res_folders: None,
            archive: false,
        }
    }
}

impl ResultFolderConfig {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Create a run folder stamped with the current local time.
    pub fn create_result_folder(&self, tag: &str) -> Result<PathBuf> {
        self.create_result_folder_at(tag, Local::now().naive_local())
    }

    /// Create `<root>/<date>/<time>_<tag>` for the given timestamp, pruning
    /// old daily and run folders according to the retention limits. The new
    /// run and its day folder always survive, even with a limit of zero.
    pub fn create_result_folder_at(&self, tag: &str, now: NaiveDateTime) -> Result<PathBuf> {
        let tag = tag.replace(' ', "_");

        let day_root = if self.archive {
            self.root.join(ARCHIVE_DIR)
        } else {
            self.root.clone()
        };
        let day_name = FolderStamp::Date.render(&now);
        let day_folder = day_root.join(&day_name);

        if !day_folder.exists() {
            fs::create_dir_all(&day_folder)
                .with_context(|| format!("Failed to create folder: {}", day_folder.display()))?;
            log::info!("Created result directory {}", day_folder.display());
        }

        if !self.archive {
            if let Some(max_daily) = self.max_daily_folders {
                prune_stamped(&self.root, max_daily, FolderStamp::Date, Some(&day_name))?;
            }
        }

        let run_name = format!("{}_{}", FolderStamp::Time.render(&now), tag);
        let target = day_folder.join(&run_name);
        fs::create_dir(&target)
            .with_context(|| format!("Failed to create result folder: {}", target.display()))?;

        if !self.archive {
            if let Some(max_res) = self.max_res_folders {
                prune_stamped(&day_folder, max_res, FolderStamp::Time, Some(&run_name))?;
            }
        }

        Ok(target)
    }

    /// Create a run folder and copy the executed script into it as
    /// `executed_file_<tag>.<ext>`.
    pub fn save_script<P: AsRef<Path>>(&self, script: P, tag: &str) -> Result<PathBuf> {
        self.save_script_at(script, tag, Local::now().naive_local())
    }

    pub fn save_script_at<P: AsRef<Path>>(&self, script: P, tag: &str, now: NaiveDateTime) -> Result<PathBuf> {
        let script = script.as_ref();
        anyhow::ensure!(script.is_file(), "Script does not exist: {}", script.display());

        let target_folder = self.create_result_folder_at(tag, now)?;
        let mut file_name = format!("executed_file_{}", tag.replace(' ', "_"));
        if let Some(ext) = script.extension().and_then(|e| e.to_str()) {
            file_name.push('.');
            file_name.push_str(ext);
        }

        let target_file = target_folder.join(file_name);
        fs::copy(script, &target_file).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                script.display(),
                target_file.display()
            )
        })?;
        Ok(target_folder)
    }
}
