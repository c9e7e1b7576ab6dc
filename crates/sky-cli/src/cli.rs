use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, ValueHint};

const SAVE_FORMATS: [&str; 6] = ["html", "json", "png", "svg", "pdf", "latex"];

fn tag_arg(default_tag: &str) -> Arg {
    Arg::new("tag")
        .short('t')
        .long("tag")
        .value_parser(clap::builder::NonEmptyStringValueParser::new())
        .help(format!(
            "Tag appended to the result folder name. Defaults to '{}'.",
            default_tag
        ))
}

fn results_dir_arg() -> Arg {
    Arg::new("results_dir")
        .short('r')
        .long("results-dir")
        .help("Root directory of the dated result folders. Defaults to ./results")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::DirPath)
}

fn max_daily_arg() -> Arg {
    Arg::new("max_daily")
        .long("max-daily")
        .help("Number of daily folders to keep.")
        .value_parser(clap::value_parser!(usize))
}

fn max_results_arg() -> Arg {
    Arg::new("max_results")
        .long("max-results")
        .help("Number of run folders to keep per day.")
        .value_parser(clap::value_parser!(usize))
}

fn format_arg() -> Arg {
    Arg::new("format")
        .short('f')
        .long("format")
        .help("File format of the saved figure.")
        .value_parser(SAVE_FORMATS)
}

fn inkscape_arg() -> Arg {
    Arg::new("inkscape")
        .long("inkscape")
        .help("Inkscape executable or install directory used for LaTeX export.")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::AnyPath)
}

fn config_arg() -> Arg {
    Arg::new("config")
        .help("Path to a YAML or JSON configuration file")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

/// Command line definition of the `sky` binary.
pub fn build_cli() -> Command {
    Command::new("sky")
        .version(clap::crate_version!())
        .about("Sky - plotting and experiment bookkeeping for simulation runs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("demo")
                .about("Run the analytic demo models into a dated result folder")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("sine-1d")
                        .about("Two sine waves of different amplitude as a line plot")
                        .arg(config_arg())
                        .arg(
                            Arg::new("amp")
                                .long("amp")
                                .help("Amplitude of the first model. Overrides the config file.")
                                .value_parser(clap::value_parser!(f64)),
                        )
                        .arg(
                            Arg::new("amp2")
                                .long("amp2")
                                .help("Amplitude of the second model. Overrides the config file.")
                                .value_parser(clap::value_parser!(f64)),
                        )
                        .arg(
                            Arg::new("nx")
                                .long("nx")
                                .help("Number of sample points. Overrides the config file.")
                                .value_parser(clap::value_parser!(usize)),
                        )
                        .arg(
                            Arg::new("freq")
                                .long("freq")
                                .help("Frequency of both waves. Overrides the config file.")
                                .value_parser(clap::value_parser!(f64)),
                        )
                        .arg(tag_arg("1d_sin_wave"))
                        .arg(results_dir_arg())
                        .arg(max_daily_arg())
                        .arg(max_results_arg())
                        .arg(
                            Arg::new("script")
                                .long("script")
                                .help("Script or input file copied into the result folder.")
                                .value_parser(clap::value_parser!(PathBuf))
                                .value_hint(ValueHint::FilePath),
                        )
                        .arg(format_arg())
                        .arg(inkscape_arg()),
                )
                .subcommand(
                    Command::new("sine-2d")
                        .about("Contour plot of sin(x) cos(y)")
                        .arg(config_arg())
                        .arg(
                            Arg::new("nx")
                                .long("nx")
                                .help("Number of samples along x.")
                                .value_parser(clap::value_parser!(usize)),
                        )
                        .arg(
                            Arg::new("ny")
                                .long("ny")
                                .help("Number of samples along y.")
                                .value_parser(clap::value_parser!(usize)),
                        )
                        .arg(tag_arg("2d_sin_wave"))
                        .arg(results_dir_arg())
                        .arg(format_arg())
                        .arg(inkscape_arg()),
                ),
        )
        .subcommand(
            Command::new("plot")
                .about("Work with saved plot data")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("regen")
                        .about("Regenerate a figure from its data_<name>.json file")
                        .arg(
                            Arg::new("data")
                                .help("Path to the saved plot data")
                                .required(true)
                                .value_parser(clap::value_parser!(PathBuf))
                                .value_hint(ValueHint::FilePath),
                        )
                        .arg(format_arg()),
                ),
        )
        .subcommand(
            Command::new("latex")
                .about("LaTeX export of figures")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("export")
                        .about("Split a PDF into graphic and LaTeX labels with Inkscape")
                        .arg(
                            Arg::new("pdf")
                                .help("PDF figure to convert")
                                .required(true)
                                .value_parser(clap::value_parser!(PathBuf))
                                .value_hint(ValueHint::FilePath),
                        )
                        .arg(
                            Arg::new("name")
                                .short('n')
                                .long("name")
                                .help("Graphic name of the output. Defaults to the PDF file name.")
                                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                        )
                        .arg(inkscape_arg())
                        .arg(
                            Arg::new("pics_dir")
                                .long("pics-dir")
                                .help("Picture directory as seen from the LaTeX document. Defaults to ./pics/")
                                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                        )
                        .arg(
                            Arg::new("rules")
                                .long("rules")
                                .help("YAML file with translation and SI label rules.")
                                .value_parser(clap::value_parser!(PathBuf))
                                .value_hint(ValueHint::FilePath),
                        )
                        .arg(
                            Arg::new("si")
                                .long("si")
                                .help("Write units with the siunitx package.")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(
                            Arg::new("no_rules")
                                .long("no-rules")
                                .help("Keep labels as Inkscape wrote them.")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(
                            Arg::new("hints")
                                .long("hints")
                                .help("Keep Inkscape's usage hints at the top of the .tex file.")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(
                            Arg::new("stay_tex")
                                .long("stay-tex")
                                .help("Do not overwrite an existing .tex file.")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .subcommand(
            Command::new("results")
                .about("Manage dated result folders")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("prune")
                        .about("Delete the oldest daily and run folders beyond the limits")
                        .arg(results_dir_arg())
                        .arg(max_daily_arg())
                        .arg(max_results_arg()),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}
