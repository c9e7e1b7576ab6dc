use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Local;
use plotly::common::Font;
use plotly::layout::{Axis, Layout};
use plotly::Plot;
use serde::{Deserialize, Serialize};

use crate::error::PlotError;
use crate::latex::{latex_graphic_export, InkscapeConverter, LabelRules, LatexExportOptions};
use crate::plotlib::axes::{Axes, RenderedAxes};
use crate::plotlib::layout::{calc_fig_size, FigSize, SubplotLayout, DEFAULT_WIDTH_PT};
use crate::plotlib::style::Style;
use crate::plotlib::{PlotItem, MAX_SUBPLOTS};

/// Plot items drawn on the same axes.
pub type Subplot = Vec<PlotItem>;

/// Directory under a plot's save path that regenerated figures go to.
pub const REGENERATED_DIR: &str = "regenerated_plots";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    Html,
    Json,
    Png,
    Svg,
    Pdf,
    /// PDF plus a LaTeX overlay with translated labels.
    Latex,
}

impl Default for SaveFormat {
    fn default() -> Self {
        if cfg!(feature = "kaleido") {
            SaveFormat::Pdf
        } else {
            SaveFormat::Html
        }
    }
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Html => "html",
            SaveFormat::Json => "json",
            SaveFormat::Png => "png",
            SaveFormat::Svg => "svg",
            SaveFormat::Pdf | SaveFormat::Latex => "pdf",
        }
    }
}

impl fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaveFormat::Latex => "latex",
            other => other.extension(),
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SaveFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(SaveFormat::Html),
            "json" => Ok(SaveFormat::Json),
            "png" => Ok(SaveFormat::Png),
            "svg" => Ok(SaveFormat::Svg),
            "pdf" => Ok(SaveFormat::Pdf),
            "latex" => Ok(SaveFormat::Latex),
            _ => anyhow::bail!("Unknown save format: {}. Use html, json, png, svg, pdf or latex", s),
        }
    }
}

/// Per-figure settings of [`Plotter::plot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// File name stem; spaces become underscores. `Plot` when absent.
    pub filename: Option<String>,
    /// `[width, height]` in centimetres.
    pub fig_size_cm: Option<[f64; 2]>,
    pub fig_title: Option<String>,
    pub layout: SubplotLayout,
    /// Fill the subplot grid column-by-column.
    pub col_sort: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            filename: None,
            fig_size_cm: None,
            fig_title: None,
            layout: SubplotLayout::Auto,
            col_sort: true,
        }
    }
}

impl PlotOptions {
    pub fn named(filename: &str) -> Self {
        Self {
            filename: Some(filename.to_string()),
            ..Self::default()
        }
    }
}

/// Everything needed to draw a figure again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    pub subplots: Vec<Subplot>,
    pub save_path: PathBuf,
    pub style: Style,
    pub save_format: SaveFormat,
    #[serde(flatten)]
    pub options: PlotOptions,
}

impl PlotData {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plot data: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse plot data: {}", path.display()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write plot data: {}", path.display()))
    }
}

/// Re-plot saved plot data into `<save_path>/regenerated_plots`.
///
/// Returns the path of the new figure.
pub fn regenerate<P: AsRef<Path>>(data_path: P, format: Option<SaveFormat>) -> Result<PathBuf> {
    let data = PlotData::load(data_path)?;
    let folder = data.save_path.join(REGENERATED_DIR);
    fs::create_dir_all(&folder)
        .with_context(|| format!("Failed to create folder: {}", folder.display()))?;

    let plotter = Plotter {
        save_path: Some(folder),
        style: data.style,
        save_format: format.unwrap_or(data.save_format),
        save_plot_data: false,
        ..Plotter::default()
    };
    plotter
        .plot(&data.subplots, &data.options)?
        .context("Regenerated plot was not saved")
}

/// Lay out subplots and render every plot item into a plotly figure.
pub fn build_figure(subplots: &[Subplot], options: &PlotOptions, style: &Style) -> Result<Plot, PlotError> {
    compose_figure(subplots, options, style).map(|(plot, _)| plot)
}

/// Figure together with the pixel size its layout was built with.
fn compose_figure(
    subplots: &[Subplot],
    options: &PlotOptions,
    style: &Style,
) -> Result<(Plot, (usize, usize)), PlotError> {
    let n_subplots = subplots.len();
    if n_subplots > MAX_SUBPLOTS {
        return Err(PlotError::TooManySubplots(n_subplots));
    }

    let grid = options.layout.arrange(n_subplots, options.col_sort)?;

    let mut rendered = Vec::with_capacity(n_subplots);
    for (i, (subplot, cell)) in subplots.iter().zip(&grid.cells).enumerate() {
        let mut axes = Axes::new(i + 1, *cell, (grid.rows, grid.cols), style);
        for item in subplot {
            item.render(&mut axes)?;
        }
        rendered.push(axes.finish());
    }

    let size = match options.fig_size_cm {
        Some([w, h]) => FigSize::from_cm(w, h),
        None => calc_fig_size(grid.rows, grid.cols, DEFAULT_WIDTH_PT),
    };
    let (width, height) = size.pixels();

    let mut layout = Layout::new()
        .font(Font::new().family(style.font_family.as_str()).size(style.font_size))
        .width(width)
        .height(height);
    if let Some(title) = &options.fig_title {
        layout = layout.title(title.as_str());
    }

    let has_legend = rendered.iter().any(|r| r.has_legend);
    layout = layout.show_legend(has_legend);
    if let Some(last) = rendered.iter().rev().find(|r| r.has_legend) {
        layout = layout.legend(last.axes_style.legend_position.to_legend());
    }

    let mut plot = Plot::new();
    for axes in rendered {
        let RenderedAxes {
            index,
            traces,
            shapes,
            x_axis,
            y_axis,
            title,
            ..
        } = axes;
        layout = set_axes(layout, index, x_axis, y_axis);
        for shape in shapes {
            layout.add_shape(shape);
        }
        if let Some(title) = title {
            layout.add_annotation(title);
        }
        for trace in traces {
            plot.add_trace(trace);
        }
    }
    plot.set_layout(layout);
    Ok((plot, (width, height)))
}

/// Install the axis pair of subplot `index` (1-based).
fn set_axes(layout: Layout, index: usize, x: Axis, y: Axis) -> Layout {
    match index {
        1 => layout.x_axis(x).y_axis(y),
        2 => layout.x_axis2(x).y_axis2(y),
        3 => layout.x_axis3(x).y_axis3(y),
        4 => layout.x_axis4(x).y_axis4(y),
        5 => layout.x_axis5(x).y_axis5(y),
        6 => layout.x_axis6(x).y_axis6(y),
        7 => layout.x_axis7(x).y_axis7(y),
        8 => layout.x_axis8(x).y_axis8(y),
        _ => layout,
    }
}

#[cfg(feature = "kaleido")]
fn write_static(plot: &Plot, path: &Path, format: SaveFormat, (width, height): (usize, usize)) -> Result<()> {
    use plotly::ImageFormat;

    let (image_format, scale) = match format {
        SaveFormat::Png => (ImageFormat::PNG, 600.0 / 96.0),
        SaveFormat::Svg => (ImageFormat::SVG, 1.0),
        _ => (ImageFormat::PDF, 1.0),
    };
    plot.write_image(path, image_format, width, height, scale);
    anyhow::ensure!(path.exists(), "Static export did not write {}", path.display());
    Ok(())
}

#[cfg(not(feature = "kaleido"))]
fn write_static(_plot: &Plot, _path: &Path, format: SaveFormat, _size: (usize, usize)) -> Result<()> {
    Err(PlotError::StaticExportUnavailable {
        format: format.to_string(),
    }
    .into())
}

/// Composes plot objects into figures and saves them.
#[derive(Debug, Clone)]
pub struct Plotter {
    /// Output directory; figures are shown in the browser when absent.
    pub save_path: Option<PathBuf>,
    pub style: Style,
    pub save_format: SaveFormat,
    /// Inkscape binary or install directory for LaTeX export.
    pub ink_path: PathBuf,
    pub label_rules: LabelRules,
    /// Write `data_<name>.json` next to every saved figure.
    pub save_plot_data: bool,
    /// Program the saved file is opened with, e.g. `code` or `xdg-open`.
    pub open_command: Option<String>,
}

impl Default for Plotter {
    fn default() -> Self {
        Self {
            save_path: None,
            style: Style::default(),
            save_format: SaveFormat::default(),
            ink_path: PathBuf::from("inkscape"),
            label_rules: LabelRules::default(),
            save_plot_data: true,
            open_command: None,
        }
    }
}

impl Plotter {
    pub fn new<P: AsRef<Path>>(save_path: P) -> Self {
        Self {
            save_path: Some(save_path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Draw `subplots` into one figure. Returns the saved file, or `None`
    /// when the figure was shown instead.
    pub fn plot(&self, subplots: &[Subplot], options: &PlotOptions) -> Result<Option<PathBuf>> {
        let options = PlotOptions {
            filename: options.filename.as_ref().map(|f| f.replace(' ', "_")),
            ..options.clone()
        };
        let (plot, size) = compose_figure(subplots, &options, &self.style)?;

        let Some(save_path) = &self.save_path else {
            plot.show();
            return Ok(None);
        };

        let (saved, unique_name) = self.save_plot(&plot, save_path, options.filename.as_deref(), size)?;

        if self.save_plot_data {
            let data = PlotData {
                subplots: subplots.to_vec(),
                save_path: save_path.clone(),
                style: self.style.clone(),
                save_format: self.save_format,
                options,
            };
            let data_path = save_path.join(format!("data_{}.json", unique_name));
            data.save(&data_path)?;
            log::debug!("Plot data written to {}", data_path.display());
        }

        Ok(Some(saved))
    }

    /// Save as `<HH_MM_SS>_<filename>.<ext>`; returns the file and its stem.
    fn save_plot(
        &self,
        plot: &Plot,
        path: &Path,
        filename: Option<&str>,
        size: (usize, usize),
    ) -> Result<(PathBuf, String)> {
        let time_string = Local::now().format("%H_%M_%S").to_string();
        let unique_name = format!("{}_{}", time_string, filename.unwrap_or("Plot"));
        let target = path.join(format!("{}.{}", unique_name, self.save_format.extension()));

        let saved = match self.save_format {
            SaveFormat::Html => {
                plot.write_html(&target);
                target
            }
            SaveFormat::Json => {
                fs::write(&target, plot.to_json())
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                target
            }
            SaveFormat::Png | SaveFormat::Svg | SaveFormat::Pdf => {
                write_static(plot, &target, self.save_format, size)?;
                target
            }
            SaveFormat::Latex => {
                write_static(plot, &target, SaveFormat::Pdf, size)?;
                let control = path.join(format!("{}Control.pdf", unique_name));
                fs::copy(&target, &control)
                    .with_context(|| format!("Failed to copy {}", target.display()))?;

                let export = LatexExportOptions {
                    use_replacing_rules: true,
                    use_si_pack: true,
                    ..LatexExportOptions::new(&unique_name, path)
                };
                let converter = InkscapeConverter::new(&self.ink_path);
                latex_graphic_export(&export, &converter, &self.label_rules)?;
                control
            }
        };
        log::info!("Saved plot {}", saved.display());

        if let Some(command) = &self.open_command {
            if let Err(e) = Command::new(command).arg(&saved).spawn() {
                log::warn!("Could not open {} with {}: {}", saved.display(), command, e);
            }
        }

        Ok((saved, unique_name))
    }
}
