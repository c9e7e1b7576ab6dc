//! Integration tests for label substitution and LaTeX overlay export.

use std::fs;
use std::path::Path;

use anyhow::Result;
use sky::latex::{latex_graphic_export, rewrite_pdf_tex, LabelRules, LatexExportOptions, Rule, VectorConverter};

fn label_line(text: &str) -> String {
    format!(
        "    \\put(0.5,0.1){{\\makebox(0,0)[lt]{{\\lineheight{{1.25}}\\smash{{\\begin{{tabular}}[t]{{l}}{}\\end{{tabular}}}}}}}}%\n",
        text
    )
}

/// Writes a fixed overlay next to the PDF, like Inkscape would.
struct StaticOverlay(String);

impl VectorConverter for StaticOverlay {
    fn convert(&self, pdf: &Path) -> Result<()> {
        fs::write(pdf.with_extension("pdf_tex"), &self.0)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "static overlay"
    }
}

// ---------------------------------------------------------------------------
// LabelRules::apply
// ---------------------------------------------------------------------------

#[test]
fn apply_replaces_exact_label_only() {
    let rules = LabelRules::default();
    let line = "{l}f in kHz\\end";
    assert_eq!(rules.apply(line, 3, 11, false), "{l}$f$ in kHz\\end");
    assert_eq!(rules.apply(line, 3, 11, true), "{l}$f$ in \\Si{}{\\kilo\\hertz}\\end");

    let partial = "{l}f in kHz (measured)\\end";
    assert_eq!(rules.apply(partial, 3, partial.len() - 4, true), partial);
}

#[test]
fn apply_tolerates_bad_ranges() {
    let rules = LabelRules::default();
    assert_eq!(rules.apply("T in °C", 0, 6, false), "T in °C");
    assert_eq!(rules.apply("short", 2, 40, false), "short");
}

#[test]
fn percent_labels_use_si_percent() {
    let rules = LabelRules::default();
    assert_eq!(
        rules.translate(r"Afr in \%", true).as_deref(),
        Some(r"$\Delta f_\mathrm{r}$ in \Si{}{\percent}")
    );
}

#[test]
fn custom_rules_load_from_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.yaml");
    fs::write(
        &path,
        "translation:\n  - from: 'v in m/s'\n    to: '$v$ in m/s'\nsi:\n  - from: ' m/s'\n    to: ' \\Si{}{\\meter\\per\\second}'\n",
    )
    .unwrap();

    let rules = LabelRules::load(&path).unwrap();
    assert_eq!(rules.translation, vec![Rule::new("v in m/s", "$v$ in m/s")]);
    assert_eq!(
        rules.translate("v in m/s", true).as_deref(),
        Some(r"$v$ in \Si{}{\meter\per\second}")
    );
    assert_eq!(rules.translate("f in Hz", false), None);
}

// ---------------------------------------------------------------------------
// Overlay rewriting
// ---------------------------------------------------------------------------

#[test]
fn untranslated_when_rules_disabled() {
    let mut options = LatexExportOptions::new("fig", ".");
    options.insert_hints = true;
    let contents = label_line("f in Hz");
    let out = rewrite_pdf_tex(&contents, &options, &LabelRules::default()).unwrap();
    assert_eq!(out, contents);
}

#[test]
fn lines_without_label_markers_stay_in_place() {
    let mut options = LatexExportOptions::new("fig", ".");
    options.insert_hints = true;
    options.use_replacing_rules = true;
    let contents = format!(
        "{}    \\put(0,0){{\\makebox(0,0)[lt]{{raw}}}}%\n{}",
        label_line("n2"),
        label_line("7")
    );
    let out = rewrite_pdf_tex(&contents, &options, &LabelRules::default()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].contains("{l}7\\end"));
    assert!(lines[1].contains("{raw}"));
    assert!(lines[2].contains("{l}$\\eta_2$\\end"));
}

// ---------------------------------------------------------------------------
// latex_graphic_export
// ---------------------------------------------------------------------------

#[test]
fn stay_tex_keeps_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = LatexExportOptions::new("fig", dir.path());
    options.stay_tex = true;
    fs::write(options.pdf_path(), b"%PDF-1.5").unwrap();
    fs::write(options.tex_path(), "hand edited").unwrap();
    fs::write(options.pdf_tex_path(), "stale").unwrap();

    let converter = StaticOverlay(label_line("n"));
    let tex = latex_graphic_export(&options, &converter, &LabelRules::default()).unwrap();

    assert_eq!(fs::read_to_string(tex).unwrap(), "hand edited");
    assert!(!options.pdf_tex_path().exists());
}

#[test]
fn converter_without_output_is_an_error() {
    struct NoOutput;
    impl VectorConverter for NoOutput {
        fn convert(&self, _pdf: &Path) -> Result<()> {
            Ok(())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let options = LatexExportOptions::new("fig", dir.path());
    fs::write(options.pdf_path(), b"%PDF-1.5").unwrap();
    let err = latex_graphic_export(&options, &NoOutput, &LabelRules::default()).unwrap_err();
    assert!(err.to_string().contains("did not produce"));
}
