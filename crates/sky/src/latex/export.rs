use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use regex::Regex;

use crate::latex::LabelRules;

/// Number of header lines Inkscape writes before the picture environment.
const PDF_TEX_HINT_LINES: usize = 26;

/// Converts a PDF into a text-free PDF plus a `<name>.pdf_tex` overlay next to it.
pub trait VectorConverter {
    fn convert(&self, pdf: &Path) -> Result<()>;

    /// Human readable name used in log messages
    fn name(&self) -> &str {
        "converter"
    }
}

/// Runs the Inkscape command line, trying the pre-1.0 syntax first.
#[derive(Debug, Clone)]
pub struct InkscapeConverter {
    binary: PathBuf,
}

impl InkscapeConverter {
    /// `path` is either the Inkscape executable or its install directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let binary = if path.is_dir() {
            path.join("inkscape")
        } else {
            path.to_path_buf()
        };
        Self { binary }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn run(&self, pdf: &Path, export_flag: &str) -> Result<()> {
        let status = Command::new(&self.binary)
            .arg(pdf)
            .arg(format!("{}={}", export_flag, pdf.display()))
            .arg("--export-latex")
            .status()
            .with_context(|| format!("Failed to run {}", self.binary.display()))?;
        if !status.success() {
            log::debug!(
                "{} {} exited with {}",
                self.binary.display(),
                export_flag,
                status
            );
        }
        Ok(())
    }
}

impl Default for InkscapeConverter {
    fn default() -> Self {
        Self::new("inkscape")
    }
}

impl VectorConverter for InkscapeConverter {
    fn convert(&self, pdf: &Path) -> Result<()> {
        let pdf_tex = pdf.with_extension("pdf_tex");

        // Inkscape < 1.0
        self.run(pdf, "--export-pdf")?;

        // Inkscape >= 1.0
        if !pdf_tex.exists() {
            self.run(pdf, "--export-filename")?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "inkscape"
    }
}

/// Settings for one LaTeX graphic export.
#[derive(Debug, Clone)]
pub struct LatexExportOptions {
    /// File stem of the graphic (`<graphic_name>.pdf`).
    pub graphic_name: String,
    /// Directory holding the PDF; the `.tex` is written here too.
    pub output_dir: PathBuf,
    /// Picture directory as seen from the LaTeX document.
    pub pdf_tex_dir: String,
    /// Keep an existing `.tex` instead of writing a new one.
    pub stay_tex: bool,
    /// Keep Inkscape's usage hints at the top of the file.
    pub insert_hints: bool,
    pub use_replacing_rules: bool,
    pub use_si_pack: bool,
}

impl LatexExportOptions {
    pub fn new<P: AsRef<Path>>(graphic_name: &str, output_dir: P) -> Self {
        Self {
            graphic_name: graphic_name.to_string(),
            output_dir: output_dir.as_ref().to_path_buf(),
            pdf_tex_dir: "./pics/".to_string(),
            stay_tex: false,
            insert_hints: false,
            use_replacing_rules: false,
            use_si_pack: false,
        }
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.pdf", self.graphic_name))
    }

    pub fn pdf_tex_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.pdf_tex", self.graphic_name))
    }

    pub fn tex_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.tex", self.graphic_name))
    }
}

/// Digits with at most one decimal point.
fn is_numeric_label(label: &str) -> bool {
    let stripped = label.replacen('.', "", 1);
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}

/// Rewrite the contents of an Inkscape `.pdf_tex` overlay.
///
/// Every `\put` line keeps its slot, but the slots are refilled in the order:
/// the PDF include line, numeric tick labels (shortest first), then text
/// labels (shortest first). Text labels are translated when
/// `use_replacing_rules` is set.
pub fn rewrite_pdf_tex(contents: &str, options: &LatexExportOptions, rules: &LabelRules) -> Result<String> {
    let put_re = Regex::new("put")?;
    let pdf_re = Regex::new(&regex::escape(&format!("{}.pdf", options.graphic_name)))?;

    let mut lines: Vec<String> = contents.split_inclusive('\n').map(str::to_string).collect();
    if !options.insert_hints {
        lines = lines.into_iter().skip(PDF_TEX_HINT_LINES).collect();
    }

    let mut pdf_including = Vec::new();
    let mut num_including = Vec::new();
    let mut tex_including = Vec::new();
    let mut idx_including = Vec::new();

    for (idx, line) in lines.iter_mut().enumerate() {
        if !put_re.is_match(line) {
            continue;
        }

        if let Some(m) = pdf_re.find(line) {
            let value = format!(
                "{}{}{}.pdf{}",
                &line[..m.start()],
                options.pdf_tex_dir,
                options.graphic_name,
                &line[m.end()..]
            );
            *line = value.clone();
            pdf_including.push(value);
            idx_including.push(idx);
            continue;
        }

        let (Some(open), Some(stop)) = (line.find("{l}"), line.find(r"\end")) else {
            log::debug!("Left pdf_tex line {} untouched: no label text", idx);
            continue;
        };
        let start = open + 3;
        if stop < start {
            continue;
        }

        if is_numeric_label(&line[start..stop]) {
            num_including.push(line.clone());
        } else if options.use_replacing_rules {
            tex_including.push(rules.apply(line, start, stop, options.use_si_pack));
        } else {
            tex_including.push(line.clone());
        }
        idx_including.push(idx);
    }

    num_including.sort_by_key(|l| l.len());
    tex_including.sort_by_key(|l| l.len());

    let reordered = pdf_including
        .into_iter()
        .chain(num_including)
        .chain(tex_including);
    for (idx, line) in idx_including.into_iter().zip(reordered) {
        lines[idx] = line;
    }

    Ok(lines.concat())
}

/// Convert `<output_dir>/<graphic_name>.pdf` and write the rewritten overlay
/// to `<graphic_name>.tex`. Returns the path of the `.tex` file.
pub fn latex_graphic_export(
    options: &LatexExportOptions,
    converter: &dyn VectorConverter,
    rules: &LabelRules,
) -> Result<PathBuf> {
    let pdf = options.pdf_path();
    let pdf_tex = options.pdf_tex_path();
    anyhow::ensure!(pdf.exists(), "PDF to convert does not exist: {}", pdf.display());

    if pdf_tex.exists() {
        fs::remove_file(&pdf_tex)
            .with_context(|| format!("Failed to remove stale {}", pdf_tex.display()))?;
    }

    log::info!("Converting {} with {}", pdf.display(), converter.name());
    converter.convert(&pdf)?;

    let contents = fs::read_to_string(&pdf_tex).with_context(|| {
        format!(
            "{} did not produce {}",
            converter.name(),
            pdf_tex.display()
        )
    })?;

    let tex = options.tex_path();
    if !options.stay_tex {
        let rewritten = rewrite_pdf_tex(&contents, options, rules)?;
        fs::write(&tex, rewritten)
            .with_context(|| format!("Failed to write {}", tex.display()))?;
    }

    fs::remove_file(&pdf_tex)
        .with_context(|| format!("Failed to remove {}", pdf_tex.display()))?;
    Ok(tex)
}
