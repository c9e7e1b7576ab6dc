//! Integration tests for demo config resolution and the command helpers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::ArgMatches;

use sky::filemanager::ResultFolderConfig;
use sky::latex::{LabelRules, VectorConverter};
use sky::plotlib::{PlotData, SaveFormat};
use sky_cli::cli::build_cli;
use sky_cli::commands::demo::{run_sine_1d, Sine1dConfig, Sine2dConfig, DEMO_MAX_FOLDERS};
use sky_cli::commands::latex::{export_options, run_export};
use sky_cli::commands::plot::run_regenerate;
use sky_cli::commands::results::{count_runs, prune_results};

fn sub_matches(args: &[&str]) -> ArgMatches {
    let matches = build_cli().try_get_matches_from(args).unwrap();
    let (_, group) = matches.subcommand().unwrap();
    let (_, leaf) = group.subcommand().unwrap();
    leaf.clone()
}

// ---------------------------------------------------------------------------
// Demo config: command line > config file > defaults
// ---------------------------------------------------------------------------

#[test]
fn sine_1d_defaults_without_config() {
    let matches = sub_matches(&["sky", "demo", "sine-1d"]);
    let config = Sine1dConfig::from_arguments(None, &matches).unwrap();
    assert_eq!(config.model.amp, 1.0);
    assert_eq!(config.model.amp2, 0.5);
    assert_eq!(config.model.nx, 100);
    assert_eq!(config.results.max_res_folders, Some(DEMO_MAX_FOLDERS));
    assert_eq!(config.results.root, PathBuf::from("results"));
}

#[test]
fn command_line_beats_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim_para.yaml");
    fs::write(&path, "amp: 2.0\nfreq: 3.0\ntag: from_file\n").unwrap();

    let matches = sub_matches(&["sky", "demo", "sine-1d", "--amp", "4.5", "--max-daily", "2"]);
    let config = Sine1dConfig::from_arguments(Some(&path), &matches).unwrap();
    assert_eq!(config.model.amp, 4.5);
    assert_eq!(config.model.freq, 3.0);
    assert_eq!(config.model.nx, 100);
    assert_eq!(config.tag, "from_file");
    assert_eq!(config.results.max_daily_folders, Some(2));
    assert_eq!(config.results.max_res_folders, Some(DEMO_MAX_FOLDERS));
}

#[test]
fn json_config_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim_para.json");
    fs::write(&path, r#"{"nx": 7, "save_format": "json", "results": {"root": "out"}}"#).unwrap();

    let matches = sub_matches(&["sky", "demo", "sine-1d"]);
    let config = Sine1dConfig::from_arguments(Some(&path), &matches).unwrap();
    assert_eq!(config.model.nx, 7);
    assert_eq!(config.save_format, SaveFormat::Json);
    assert_eq!(config.results.root, PathBuf::from("out"));
    assert_eq!(config.results.max_daily_folders, None);
}

#[test]
fn unsupported_config_extension_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim_para.toml");
    fs::write(&path, "amp = 1.0\n").unwrap();
    let matches = sub_matches(&["sky", "demo", "sine-1d"]);
    assert!(Sine1dConfig::from_arguments(Some(&path), &matches).is_err());
}

#[test]
fn zero_samples_rejected() {
    let matches = sub_matches(&["sky", "demo", "sine-1d", "--nx", "0"]);
    assert!(Sine1dConfig::from_arguments(None, &matches).is_err());

    let matches = sub_matches(&["sky", "demo", "sine-2d", "--ny", "0"]);
    assert!(Sine2dConfig::from_arguments(None, &matches).is_err());
}

#[test]
fn sine_2d_overrides() {
    let matches = sub_matches(&["sky", "demo", "sine-2d", "--nx", "3", "--format", "json", "-t", "field"]);
    let config = Sine2dConfig::from_arguments(None, &matches).unwrap();
    assert_eq!(config.x().len(), 3);
    assert_eq!(config.ny, 20);
    assert_eq!(config.tag, "field");
    assert_eq!(config.save_format, SaveFormat::Json);
}

// ---------------------------------------------------------------------------
// Demo run and regeneration
// ---------------------------------------------------------------------------

#[test]
fn sine_1d_run_saves_figure_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("sim_para.yaml");
    fs::write(&config_path, "nx: 10\n").unwrap();
    let run = dir.path().join("run");
    fs::create_dir(&run).unwrap();

    let config = Sine1dConfig {
        save_format: SaveFormat::Json,
        ..Sine1dConfig::default()
    };
    let saved = run_sine_1d(&config, &run, Some(&config_path)).unwrap();
    assert!(saved.is_file());
    assert!(saved.to_string_lossy().ends_with("_1d_sin_wave_plot.json"));
    assert!(run.join("sim_para.yaml").is_file());

    let data_path = run.join(format!("data_{}", saved.file_name().unwrap().to_string_lossy()));
    let data = PlotData::load(&data_path).unwrap();
    assert_eq!(data.subplots.len(), 1);
    assert_eq!(data.options.fig_title.as_deref(), Some("Demo"));

    let regenerated = run_regenerate(&data_path, Some(SaveFormat::Html)).unwrap();
    assert_eq!(regenerated.extension().unwrap(), "html");
}

// ---------------------------------------------------------------------------
// LaTeX export
// ---------------------------------------------------------------------------

struct EchoOverlay;

impl VectorConverter for EchoOverlay {
    fn convert(&self, pdf: &Path) -> Result<()> {
        let name = pdf.file_stem().unwrap().to_string_lossy().into_owned();
        fs::write(
            pdf.with_extension("pdf_tex"),
            format!(
                "    \\put(0,0){{\\includegraphics[width=\\unitlength,page=1]{{{}.pdf}}}}%\n",
                name
            ),
        )?;
        Ok(())
    }
}

#[test]
fn export_with_new_name_copies_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("raw figure.pdf");
    fs::write(&pdf, b"%PDF-1.5").unwrap();
    let pdf_arg = pdf.to_string_lossy().into_owned();

    let matches = sub_matches(&[
        "sky", "latex", "export", &pdf_arg, "--name", "fig one", "--pics-dir", "./img/", "--hints",
    ]);
    let options = export_options(&pdf, &matches).unwrap();
    assert_eq!(options.graphic_name, "fig_one");
    assert_eq!(options.pdf_tex_dir, "./img/");
    assert!(options.use_replacing_rules);
    assert!(!options.use_si_pack);
    assert!(options.insert_hints);

    let tex = run_export(&pdf, &options, &EchoOverlay, &LabelRules::default()).unwrap();
    assert_eq!(tex, dir.path().join("fig_one.tex"));
    assert!(dir.path().join("fig_one.pdf").is_file());
    assert!(pdf.is_file());
    assert!(fs::read_to_string(tex).unwrap().contains("./img/fig_one.pdf"));
}

#[test]
fn export_flags_map_to_options() {
    let matches = sub_matches(&["sky", "latex", "export", "plot.pdf", "--si", "--no-rules", "--stay-tex"]);
    let options = export_options(Path::new("plot.pdf"), &matches).unwrap();
    assert_eq!(options.graphic_name, "plot");
    assert_eq!(options.output_dir, PathBuf::from("."));
    assert!(options.use_si_pack);
    assert!(!options.use_replacing_rules);
    assert!(options.stay_tex);
    assert!(!options.insert_hints);
}

// ---------------------------------------------------------------------------
// Result pruning
// ---------------------------------------------------------------------------

#[test]
fn prune_limits_runs_per_day() {
    let dir = tempfile::tempdir().unwrap();
    for run in ["08_00_00_a", "09_00_00_b", "10_00_00_c"] {
        fs::create_dir_all(dir.path().join("2024-02-01").join(run)).unwrap();
    }
    fs::create_dir_all(dir.path().join("Archive").join("2020-01-01").join("08_00_00_old")).unwrap();

    let config = ResultFolderConfig {
        max_res_folders: Some(1),
        ..ResultFolderConfig::new(dir.path())
    };
    let removed = prune_results(&config).unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(count_runs(dir.path()).unwrap(), 1);
    assert!(dir.path().join("2024-02-01").join("10_00_00_c").is_dir());
    assert!(dir.path().join("Archive").join("2020-01-01").is_dir());
}

#[test]
fn prune_missing_root_errors() {
    let config = ResultFolderConfig {
        max_daily_folders: Some(1),
        ..ResultFolderConfig::new("/nonexistent/results")
    };
    assert!(prune_results(&config).is_err());
}
