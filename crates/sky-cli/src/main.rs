use anyhow::Result;
use clap::ArgMatches;
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

use sky::filemanager::ResultFolderConfig;
use sky::logger::{init_logger, LOG_ENV};
use sky::plotlib::SaveFormat;
use sky_cli::cli::build_cli;
use sky_cli::commands::demo::{
    prepare_result_folder, run_sine_1d, run_sine_2d, Sine1dConfig, Sine2dConfig,
};
use sky_cli::commands::latex::handle_export;
use sky_cli::commands::plot::run_regenerate;
use sky_cli::commands::results::{count_runs, prune_results};

fn init_console_logger() {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or(LOG_ENV, "error,sky=info,sky_cli=info"))
        .init();
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("demo", sub_m)) => handle_demo(sub_m),
        Some(("plot", sub_m)) => {
            init_console_logger();
            handle_plot(sub_m)
        }
        Some(("latex", sub_m)) => {
            init_console_logger();
            handle_latex(sub_m)
        }
        Some(("results", sub_m)) => {
            init_console_logger();
            handle_results(sub_m)
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

/// Demo runs log into their result folder, so the run logger is installed
/// once the folder exists.
fn handle_demo(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("sine-1d", demo_matches)) => {
            let config_path: Option<&PathBuf> = demo_matches.get_one("config");
            let script: Option<&PathBuf> = demo_matches.get_one("script");
            let config = Sine1dConfig::from_arguments(config_path, demo_matches)?;

            let result_folder =
                prepare_result_folder(&config.results, &config.tag, script.map(|s| s.as_path()))?;
            init_logger(&result_folder, "logfile", true)?;
            log::info!("[Sky::Demo] Result folder: {}", result_folder.display());

            match run_sine_1d(&config, &result_folder, config_path.map(|p| p.as_path())) {
                Ok(_) => Ok(()),
                Err(e) => {
                    log::error!("Demo run failed: {:#}", e);
                    std::process::exit(1)
                }
            }
        }
        Some(("sine-2d", demo_matches)) => {
            let config_path: Option<&PathBuf> = demo_matches.get_one("config");
            let config = Sine2dConfig::from_arguments(config_path, demo_matches)?;

            let result_folder = prepare_result_folder(&config.results, &config.tag, None)?;
            init_logger(&result_folder, "logfile", true)?;
            log::info!("[Sky::Demo] Result folder: {}", result_folder.display());

            match run_sine_2d(&config, &result_folder, config_path.map(|p| p.as_path())) {
                Ok(_) => Ok(()),
                Err(e) => {
                    log::error!("Demo run failed: {:#}", e);
                    std::process::exit(1)
                }
            }
        }
        _ => unreachable!(),
    }
}

fn handle_plot(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("regen", regen_matches)) => {
            let data_path: &PathBuf = regen_matches
                .get_one("data")
                .ok_or_else(|| anyhow::anyhow!("Missing plot data path"))?;
            let format = regen_matches
                .get_one::<String>("format")
                .map(|f| SaveFormat::from_str(f))
                .transpose()?;
            let saved = run_regenerate(data_path, format)?;
            println!("{}", saved.display());
            Ok(())
        }
        _ => unreachable!(),
    }
}

fn handle_latex(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("export", export_matches)) => {
            let tex = handle_export(export_matches)?;
            println!("{}", tex.display());
            Ok(())
        }
        _ => unreachable!(),
    }
}

fn handle_results(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("prune", prune_matches)) => {
            let mut config = ResultFolderConfig::default();
            if let Some(dir) = prune_matches.get_one::<PathBuf>("results_dir") {
                config.root = dir.clone();
            }
            config.max_daily_folders = prune_matches.get_one::<usize>("max_daily").copied();
            config.max_res_folders = prune_matches.get_one::<usize>("max_results").copied();
            if config.max_daily_folders.is_none() && config.max_res_folders.is_none() {
                anyhow::bail!("Nothing to prune: pass --max-daily and/or --max-results");
            }

            let removed = prune_results(&config)?;
            eprintln!(
                "[Sky::Results] Removed {} folders, {} runs left in {}",
                removed.len(),
                count_runs(&config.root)?,
                config.root.display()
            );
            Ok(())
        }
        _ => unreachable!(),
    }
}
