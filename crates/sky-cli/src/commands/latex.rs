use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;

use sky::latex::{latex_graphic_export, InkscapeConverter, LabelRules, LatexExportOptions, VectorConverter};

/// Build export options for an existing PDF from the `latex export` arguments.
///
/// The graphic is named after the PDF unless `--name` is given, in which case
/// the PDF is copied to `<name>.pdf` in the same directory first.
pub fn export_options(pdf: &Path, matches: &ArgMatches) -> Result<LatexExportOptions> {
    let stem = pdf
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("PDF path has no file name: {}", pdf.display()))?;
    let output_dir = match pdf.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = matches
        .get_one::<String>("name")
        .map(|n| n.replace(' ', "_"))
        .unwrap_or_else(|| stem.to_string());

    let mut options = LatexExportOptions::new(&name, &output_dir);
    if let Some(dir) = matches.get_one::<String>("pics_dir") {
        options.pdf_tex_dir = dir.clone();
    }
    options.use_replacing_rules = !matches.get_flag("no_rules");
    options.use_si_pack = matches.get_flag("si");
    options.insert_hints = matches.get_flag("hints");
    options.stay_tex = matches.get_flag("stay_tex");
    Ok(options)
}

/// Label rules from `--rules`, or the built-in table.
pub fn load_rules(matches: &ArgMatches) -> Result<LabelRules> {
    match matches.get_one::<PathBuf>("rules") {
        Some(path) => {
            log::info!("Using label rules from {}", path.display());
            LabelRules::load(path)
        }
        None => Ok(LabelRules::default()),
    }
}

/// Convert `pdf` into `<name>.tex` with rewritten labels.
pub fn run_export(
    pdf: &Path,
    options: &LatexExportOptions,
    converter: &dyn VectorConverter,
    rules: &LabelRules,
) -> Result<PathBuf> {
    anyhow::ensure!(pdf.is_file(), "PDF does not exist: {}", pdf.display());

    let renamed = pdf.file_stem().and_then(|s| s.to_str()) != Some(options.graphic_name.as_str());
    if renamed {
        let target = options.pdf_path();
        fs::copy(pdf, &target).with_context(|| {
            format!("Failed to copy {} to {}", pdf.display(), target.display())
        })?;
    }

    let tex = latex_graphic_export(options, converter, rules)?;
    log::info!("Wrote {}", tex.display());
    Ok(tex)
}

/// `sky latex export` with the Inkscape converter.
pub fn handle_export(matches: &ArgMatches) -> Result<PathBuf> {
    let pdf = matches
        .get_one::<PathBuf>("pdf")
        .context("Missing PDF argument")?;
    let options = export_options(pdf, matches)?;
    let rules = load_rules(matches)?;
    let inkscape = matches
        .get_one::<PathBuf>("inkscape")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("inkscape"));
    let converter = InkscapeConverter::new(inkscape);
    run_export(pdf, &options, &converter, &rules)
}
