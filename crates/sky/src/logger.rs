//! Run log for experiment scripts.
//!
//! Routes the `log` facade into `<save_dir>/<logfile>.log` (optionally
//! mirrored to stderr) with `<timestamp> - <LEVEL> - <message>` lines.
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Environment variable overriding the run log filter.
pub const LOG_ENV: &str = "SKY_LOG";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Writes every buffer to the log file and, when enabled, to stderr.
struct RunLogWriter {
    file: File,
    echo: bool,
}

impl Write for RunLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        if self.echo {
            io::stderr().write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.echo {
            io::stderr().flush()?;
        }
        Ok(())
    }
}

/// Commit hash of the working directory, or `"unavailable"` outside a git checkout.
pub fn git_revision() -> String {
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|rev| rev.trim().to_string())
        .filter(|rev| !rev.is_empty())
        .unwrap_or_else(|| "unavailable".to_string())
}

/// Install the global logger writing to `<save_dir>/<logfile>.log`.
///
/// Fails if a global logger is already installed. Returns the log file path.
pub fn init_logger<P: AsRef<Path>>(save_dir: P, logfile: &str, echo: bool) -> Result<PathBuf> {
    let save_dir = save_dir.as_ref();
    fs::create_dir_all(save_dir)
        .with_context(|| format!("Failed to create log directory: {}", save_dir.display()))?;

    let path = save_dir.join(format!("{}.log", logfile));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    Builder::default()
        .filter_level(LevelFilter::Info)
        .parse_env(Env::default().filter_or(LOG_ENV, "info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format(TIMESTAMP_FORMAT),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(RunLogWriter { file, echo })))
        .try_init()
        .context("A global logger is already installed")?;

    log::info!("-------------------------------");
    log::info!("-------- Start logging --------");
    log::info!("-------------------------------");
    log::info!("Log file: {}", path.display());
    log::info!("Current git hash: {}", git_revision());
    Ok(path)
}
