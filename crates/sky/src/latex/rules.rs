use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One substitution: `from` is matched verbatim, `to` is written instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub from: String,
    pub to: String,
}

impl Rule {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Label substitution table for exported figure text.
///
/// `translation` maps plain axis labels to LaTeX; `si` rewrites unit suffixes
/// in a chosen translation to the `\Si{}{...}` macro. Order matters: the first
/// matching rule wins in both tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRules {
    pub translation: Vec<Rule>,
    pub si: Vec<Rule>,
}

impl Default for LabelRules {
    fn default() -> Self {
        let translation = [
            (r"La in dB", r"$L_\mathrm{a}$ in dB"),
            (r"Lv in dB", r"$L_\mathrm{v}$ in dB"),
            (r"f in kHz", r"$f$ in kHz"),
            (r"f in Hz", r"$f$ in Hz"),
            (r"Afr in %", r"$\Delta f_\mathrm{r}$ in \%"),
            (r"Afr in \%", r"$\Delta f_\mathrm{r}$ in \%"),
            (r"n", r"$\eta$"),
            (r"nf", r"$\eta_\mathrm{f}$"),
            (r"n2", r"$\eta_2$"),
            (r"fr", r"$f_r$"),
            (r"tandf", r"$\tan \delta_{\text{f}}$"),
            (r"tand2", r"$\tan \delta_{\text{2}}$"),
            (r"tand", r"$\tan \delta_{\text{}}$"),
            (r"fr", r"$f_\mathrm{r}$"),
            (r"E'f", r"$E'_\mathrm{f}$"),
            (r"E'f (DIN)", r"$E_\mathrm{f}$ (DIN)"),
            (r"E'f (TBT)", r"$E_\mathrm{f}$ (\acrshort{TBT})"),
            (r"E'f in GPa", r"$E'_\mathrm{f}$ in GPa"),
            (r"E'2 in GPa", r"$E'_\mathrm{2}$ in GPa"),
            (r"E2 in GPa", r"E$_2$ in GPa"),
            (r"Ef", r"$E_\mathrm{f}$"),
            (r"|F|", r"$|\Gamma|$"),
            (r"AEf in \%", r"$\Delta E'_\mathrm{f}$ in \%"),
            (r"ALa in dB", r"$\Delta L_\mathrm{a}$ in dB"),
            (r"Atandf in \%", r"$\Delta \tan \delta_{\text{f}}$ in \%"),
            (r"nbwl", r"$n_\mathrm{bwl}$"),
            (r"fLater", r"$\int\text{L}_\text{a, Band}$"),
            (r"fLa", r"$\int\text{L}_\text{a}$"),
            (r"ftand", r"$\int\tan{\delta}$"),
            (r"hmi in mm", r"$h_\mathrm{min}$"),
            (r"Exponent m", r"Exponent $m_\mathrm{ASL}$"),
            (r"E2 und tand2 nach Abb3.21", r"$E_2$ und $\tan \delta_{2}$ nach Abb.~312"),
            (r"Ef nach Gl 34", r"E$_\mathrm{f}$ nach Gl.~\ref{eq:Timo_End_mass}"),
            (r"Modenordnung i", r"Modenordnung $i$"),
            (r"Dickenverhältnis l/h", r"Dickenverhältnis ${}^l/_h$"),
            (r"ki", r"$k_i$"),
            (r"T in °C", r"T in ${}^\circ C$"),
            (r"Ef nach Gl 31", r"E$_\mathrm{f}$ nach Gl.~\ref{eq:DIN_Formel}"),
        ];
        let si = [
            (r" dB", r" \Si{}{\decibel}"),
            (r" m", r" \Si{}{\meter}"),
            (r" mm", r" \Si{}{\milli\meter}"),
            (r" Hz", r" \Si{}{\hertz}"),
            (r" kHz", r" \Si{}{\kilo\hertz}"),
            (r" \%", r" \Si{}{\percent}"),
        ];

        Self {
            translation: translation.iter().map(|(f, t)| Rule::new(f, t)).collect(),
            si: si.iter().map(|(f, t)| Rule::new(f, t)).collect(),
        }
    }
}

impl LabelRules {
    /// An empty table: nothing is ever substituted.
    pub fn empty() -> Self {
        Self {
            translation: Vec::new(),
            si: Vec::new(),
        }
    }

    /// Load a table from YAML or JSON (chosen by extension).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::config::load_config_file(path.as_ref())
            .with_context(|| format!("Failed to load label rules: {}", path.as_ref().display()))
    }

    /// LaTeX replacement for a label, if a translation key matches verbatim.
    pub fn translate(&self, label: &str, use_si: bool) -> Option<String> {
        let replacement = &self.translation.iter().find(|rule| rule.from == label)?.to;
        if use_si {
            if let Some(si_rule) = self.si.iter().find(|rule| replacement.contains(&rule.from)) {
                return Some(replacement.replace(&si_rule.from, &si_rule.to));
            }
        }
        Some(replacement.clone())
    }

    /// Substitute `line[start..stop]` when it matches a translation key.
    ///
    /// The line is returned unchanged when nothing matches or the byte range
    /// does not fall on character boundaries.
    pub fn apply(&self, line: &str, start: usize, stop: usize, use_si: bool) -> String {
        let Some(label) = line.get(start..stop) else {
            return line.to_string();
        };
        match self.translate(label, use_si) {
            Some(replacement) => format!("{}{}{}", &line[..start], replacement, &line[stop..]),
            None => line.to_string(),
        }
    }
}
