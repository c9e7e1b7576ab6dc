use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use itertools_num::linspace;
use serde::{Deserialize, Serialize};

use sky::config::{copy_to_result_folder, format_values, load_config_file};
use sky::filemanager::ResultFolderConfig;
use sky::models::{AnalyticModel1d, AnalyticModel2d, DemoConfig, DEMO_X_MAX};
use sky::plotlib::{PlotOptions, Plotter, SaveFormat};

/// Daily and per-day run folders kept by the demo runs.
pub const DEMO_MAX_FOLDERS: usize = 7;

fn demo_results() -> ResultFolderConfig {
    ResultFolderConfig {
        max_daily_folders: Some(DEMO_MAX_FOLDERS),
        max_res_folders: Some(DEMO_MAX_FOLDERS),
        ..ResultFolderConfig::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Sine1dConfig {
    #[serde(flatten)]
    pub model: DemoConfig,
    pub tag: String,
    pub results: ResultFolderConfig,
    pub save_format: SaveFormat,
    pub ink_path: PathBuf,
}

impl Default for Sine1dConfig {
    fn default() -> Self {
        Sine1dConfig {
            model: DemoConfig::default(),
            tag: String::from("1d_sin_wave"),
            results: demo_results(),
            save_format: SaveFormat::default(),
            ink_path: PathBuf::from("inkscape"),
        }
    }
}

impl Sine1dConfig {
    /// Resolve the run config: command line > config file > defaults.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config: Sine1dConfig = match config_path {
            Some(path) => load_config_file(path)?,
            None => Sine1dConfig::default(),
        };

        if let Some(amp) = matches.get_one::<f64>("amp") {
            config.model.amp = *amp;
        }
        if let Some(amp2) = matches.get_one::<f64>("amp2") {
            config.model.amp2 = *amp2;
        }
        if let Some(nx) = matches.get_one::<usize>("nx") {
            config.model.nx = *nx;
        }
        if let Some(freq) = matches.get_one::<f64>("freq") {
            config.model.freq = *freq;
        }
        apply_common_overrides(
            matches,
            &mut config.tag,
            &mut config.results,
            &mut config.save_format,
            &mut config.ink_path,
        )?;

        anyhow::ensure!(config.model.nx > 0, "nx must be at least 1");
        anyhow::ensure!(
            config.model.freq.is_finite(),
            "freq must be finite, got {}",
            config.model.freq
        );
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Sine2dConfig {
    pub nx: usize,
    pub ny: usize,
    pub tag: String,
    pub results: ResultFolderConfig,
    pub save_format: SaveFormat,
    pub ink_path: PathBuf,
}

impl Default for Sine2dConfig {
    fn default() -> Self {
        Sine2dConfig {
            nx: 10,
            ny: 20,
            tag: String::from("2d_sin_wave"),
            results: demo_results(),
            save_format: SaveFormat::default(),
            ink_path: PathBuf::from("inkscape"),
        }
    }
}

impl Sine2dConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config: Sine2dConfig = match config_path {
            Some(path) => load_config_file(path)?,
            None => Sine2dConfig::default(),
        };

        if let Some(nx) = matches.get_one::<usize>("nx") {
            config.nx = *nx;
        }
        if let Some(ny) = matches.get_one::<usize>("ny") {
            config.ny = *ny;
        }
        apply_common_overrides(
            matches,
            &mut config.tag,
            &mut config.results,
            &mut config.save_format,
            &mut config.ink_path,
        )?;

        anyhow::ensure!(
            config.nx > 0 && config.ny > 0,
            "nx and ny must be at least 1, got {}x{}",
            config.nx,
            config.ny
        );
        Ok(config)
    }

    pub fn x(&self) -> Vec<f64> {
        linspace(0.0, DEMO_X_MAX, self.nx).collect()
    }

    pub fn y(&self) -> Vec<f64> {
        linspace(0.0, DEMO_X_MAX, self.ny).collect()
    }
}

fn apply_common_overrides(
    matches: &ArgMatches,
    tag: &mut String,
    results: &mut ResultFolderConfig,
    save_format: &mut SaveFormat,
    ink_path: &mut PathBuf,
) -> Result<()> {
    if let Some(value) = matches.get_one::<String>("tag") {
        *tag = value.clone();
    }
    if let Some(dir) = matches.get_one::<PathBuf>("results_dir") {
        results.root = dir.clone();
    }
    if let Ok(Some(max_daily)) = matches.try_get_one::<usize>("max_daily") {
        results.max_daily_folders = Some(*max_daily);
    }
    if let Ok(Some(max_res)) = matches.try_get_one::<usize>("max_results") {
        results.max_res_folders = Some(*max_res);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        *save_format = SaveFormat::from_str(format)?;
    }
    if let Some(path) = matches.get_one::<PathBuf>("inkscape") {
        *ink_path = path.clone();
    }
    Ok(())
}

/// Create the run folder, copying `script` into it when given.
pub fn prepare_result_folder(
    results: &ResultFolderConfig,
    tag: &str,
    script: Option<&Path>,
) -> Result<PathBuf> {
    match script {
        Some(script) => results.save_script(script, tag),
        None => results.create_result_folder(tag),
    }
}

fn log_config<T: Serialize>(config: &T, config_path: Option<&Path>, result_folder: &Path) -> Result<()> {
    match config_path {
        Some(path) => {
            log::info!("Config file: {}", path.display());
            let copied = copy_to_result_folder(path, result_folder)?;
            log::debug!("Config copied to {}", copied.display());
        }
        None => log::info!("No config file given; using defaults and command line values."),
    }
    log::info!("Config values:\n{}", format_values(config)?);
    Ok(())
}

/// Run the 1-D sine demo into `result_folder`. Returns the saved figure.
pub fn run_sine_1d(
    config: &Sine1dConfig,
    result_folder: &Path,
    config_path: Option<&Path>,
) -> Result<PathBuf> {
    log_config(config, config_path, result_folder)?;

    let x = config.model.samples();
    let model = AnalyticModel1d::new(&config.model);
    let line = model.plot(&x);
    log::info!(
        "Maximum of the first model: {:.4}",
        line.curves[0].y.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    );

    let plotter = Plotter {
        save_format: config.save_format,
        ink_path: config.ink_path.clone(),
        ..Plotter::new(result_folder)
    };
    let options = PlotOptions {
        fig_title: Some(String::from("Demo")),
        ..PlotOptions::named(&format!("{}_plot", config.tag))
    };
    let saved = plotter
        .plot(&[vec![line.into()]], &options)?
        .context("Plotter did not write the figure")?;
    log::info!("Saved figure: {}", saved.display());
    Ok(saved)
}

/// Run the 2-D `sin(x) cos(y)` contour demo into `result_folder`.
pub fn run_sine_2d(
    config: &Sine2dConfig,
    result_folder: &Path,
    config_path: Option<&Path>,
) -> Result<PathBuf> {
    log_config(config, config_path, result_folder)?;

    let contour = AnalyticModel2d::new().plot(&config.x(), &config.y())?;
    let plotter = Plotter {
        save_format: config.save_format,
        ink_path: config.ink_path.clone(),
        ..Plotter::new(result_folder)
    };
    let saved = plotter
        .plot(&[vec![contour.into()]], &PlotOptions::named(&config.tag))?
        .context("Plotter did not write the figure")?;
    log::info!("Saved figure: {}", saved.display());
    Ok(saved)
}
