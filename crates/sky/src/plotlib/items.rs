use ndarray::ArrayD;
use plotly::common::{ColorBar, ColorScale, ColorScalePalette, DashType, Line, Marker, Mode};
use plotly::histogram::HistNorm;
use plotly::layout::{Shape, ShapeLine, ShapeType};
use plotly::{Bar, Contour, HeatMap, Histogram, Scatter};
use serde::{Deserialize, Serialize};

use crate::error::PlotError;
use crate::grid::Grid;
use crate::plotlib::axes::{Axes, Ticks};
use crate::plotlib::style::AxesStyle;

/// matplotlib's default marker area in pt², i.e. a 6 pt marker.
const DEFAULT_MARKER_AREA: f64 = 36.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    #[serde(rename = "-")]
    Solid,
    #[serde(rename = "--")]
    Dashed,
    #[serde(rename = ":")]
    Dotted,
    #[serde(rename = "-.")]
    DashDot,
}

impl LineStyle {
    fn dash(self) -> DashType {
        match self {
            LineStyle::Solid => DashType::Solid,
            LineStyle::Dashed => DashType::Dash,
            LineStyle::Dotted => DashType::Dot,
            LineStyle::DashDot => DashType::DashDot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMap {
    #[default]
    Viridis,
    Cividis,
    Greys,
    Hot,
    Jet,
    Blues,
    RdBu,
}

impl ColorMap {
    fn scale(self) -> ColorScale {
        let palette = match self {
            ColorMap::Viridis => ColorScalePalette::Viridis,
            ColorMap::Cividis => ColorScalePalette::Cividis,
            ColorMap::Greys => ColorScalePalette::Greys,
            ColorMap::Hot => ColorScalePalette::Hot,
            ColorMap::Jet => ColorScalePalette::Jet,
            ColorMap::Blues => ColorScalePalette::Blues,
            ColorMap::RdBu => ColorScalePalette::RdBu,
        };
        ColorScale::Palette(palette)
    }
}

/// Marker diameter in px for a matplotlib-style marker area.
fn marker_size(area: f64) -> usize {
    area.max(0.0).sqrt().round() as usize
}

fn planar(grid: &Grid, what: &'static str) -> Result<(), PlotError> {
    if grid.n_dim() == 2 {
        Ok(())
    } else {
        Err(PlotError::NeedsPlanarGrid(what))
    }
}

/// One y column of a [`LinePlot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub y: Vec<f64>,
    pub legend: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePlot {
    pub x: Vec<f64>,
    pub curves: Vec<Curve>,
    /// Falls back to the figure style's line width.
    pub line_width: Option<f64>,
    pub line_style: LineStyle,
    /// Fixed colour from the cycle for every curve.
    pub color_no: Option<usize>,
    pub axes: AxesStyle,
}

impl LinePlot {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            curves: vec![Curve { y, legend: None }],
            line_width: None,
            line_style: LineStyle::Solid,
            color_no: None,
            axes: AxesStyle::default(),
        }
    }

    pub fn with_legend(mut self, legend: &str) -> Self {
        if let Some(first) = self.curves.first_mut() {
            first.legend = Some(legend.to_string());
        }
        self
    }

    pub fn add_line(&mut self, y: Vec<f64>, legend: &str) {
        let legend = (!legend.is_empty()).then(|| legend.to_string());
        self.curves.push(Curve { y, legend });
    }

    fn render(&self, axes: &mut Axes) -> Result<(), PlotError> {
        let width = self.line_width.unwrap_or(axes.style().line_width);
        for curve in &self.curves {
            let color = axes.color(self.color_no);
            let mut trace = Scatter::new(self.x.clone(), curve.y.clone())
                .mode(Mode::Lines)
                .line(
                    Line::new()
                        .width(width)
                        .dash(self.line_style.dash())
                        .color(color),
                )
                .x_axis(axes.x_ref())
                .y_axis(axes.y_ref());
            match &curve.legend {
                Some(legend) => {
                    trace = trace.name(legend);
                    axes.mark_legend();
                }
                None => trace = trace.show_legend(false),
            }
            axes.include(&self.x, &curve.y);
            axes.add_trace(trace);
        }
        axes.apply_style(&self.axes);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistPlot {
    pub values: Vec<f64>,
    pub bins: Option<usize>,
    pub density: bool,
    pub legend: Option<String>,
    pub color_no: Option<usize>,
    pub axes: AxesStyle,
}

impl HistPlot {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            bins: None,
            density: true,
            legend: None,
            color_no: None,
            axes: AxesStyle::default(),
        }
    }

    fn render(&self, axes: &mut Axes) -> Result<(), PlotError> {
        let color = axes.color(self.color_no);
        let mut trace = Histogram::new(self.values.clone())
            .marker(Marker::new().color(color))
            .x_axis(axes.x_ref())
            .y_axis(axes.y_ref());
        if let Some(bins) = self.bins {
            trace = trace.n_bins_x(bins);
        }
        if self.density {
            trace = trace.hist_norm(HistNorm::ProbabilityDensity);
        }
        match &self.legend {
            Some(legend) => {
                trace = trace.name(legend);
                axes.mark_legend();
            }
            None => trace = trace.show_legend(false),
        }
        axes.include(&self.values, std::iter::empty());
        axes.add_trace(trace);
        axes.apply_style(&self.axes);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourPlot {
    pub grid: Grid,
    /// One value per grid node, in node order.
    pub values: Vec<f64>,
    pub levels: usize,
    pub color_map: ColorMap,
    pub cbar: bool,
    pub cbar_label: String,
    pub cbar_ticks: Option<Vec<f64>>,
    pub axes: AxesStyle,
}

impl ContourPlot {
    /// Contour of flat node values on a 2-D grid; axis labels follow the grid.
    pub fn new(grid: Grid, values: Vec<f64>) -> Result<Self, PlotError> {
        planar(&grid, "ContourPlot")?;
        grid.reshape_data(&values)?;
        let axes = AxesStyle::with_labels(&grid.labels()[0], &grid.labels()[1]);
        Ok(Self {
            grid,
            values,
            levels: 50,
            color_map: ColorMap::Viridis,
            cbar: false,
            cbar_label: String::new(),
            cbar_ticks: None,
            axes,
        })
    }

    /// Contour of values already shaped `(ny, nx)`.
    pub fn from_shaped(grid: Grid, values: &ArrayD<f64>) -> Result<Self, PlotError> {
        let flat = grid.flatten_data(values)?;
        Self::new(grid, flat)
    }

    fn render(&self, axes: &mut Axes) -> Result<(), PlotError> {
        planar(&self.grid, "ContourPlot")?;
        let shaped = self.grid.reshape_data(&self.values)?;
        let z: Vec<Vec<f64>> = shaped
            .outer_iter()
            .map(|row| row.iter().copied().collect())
            .collect();
        let x = self.grid.dimension_samples()[0].to_vec();
        let y = self.grid.dimension_samples()[1].to_vec();

        let mut trace = Contour::new(x.clone(), y.clone(), z)
            .n_contours(self.levels)
            .color_scale(self.color_map.scale())
            .show_scale(self.cbar)
            .x_axis(&axes.x_ref())
            .y_axis(&axes.y_ref());
        if self.cbar {
            let mut color_bar = ColorBar::new().title(self.cbar_label.as_str());
            if let Some(ticks) = &self.cbar_ticks {
                color_bar = color_bar.tick_vals(ticks.clone());
            }
            trace = trace.color_bar(color_bar);
        }

        axes.include(&x, &y);
        axes.add_trace(trace);
        axes.apply_style(&self.axes);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPlot {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Marker areas in pt²; matplotlib's default when absent.
    pub sizes: Option<Vec<f64>>,
    pub fill_color: String,
    pub alpha: f64,
    pub legend: Option<String>,
    pub axes: AxesStyle,
}

impl ScatterPlot {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            sizes: None,
            fill_color: "#1f77b4".to_string(),
            alpha: 0.5,
            legend: None,
            axes: AxesStyle::with_labels("x", "y"),
        }
    }

    fn render(&self, axes: &mut Axes) -> Result<(), PlotError> {
        let marker = scatter_marker(self.sizes.as_deref(), &self.fill_color, self.alpha);
        let mut trace = Scatter::new(self.x.clone(), self.y.clone())
            .mode(Mode::Markers)
            .marker(marker)
            .x_axis(axes.x_ref())
            .y_axis(axes.y_ref());
        match &self.legend {
            Some(legend) => {
                trace = trace.name(legend);
                axes.mark_legend();
            }
            None => trace = trace.show_legend(false),
        }
        axes.include(&self.x, &self.y);
        axes.add_trace(trace);
        axes.apply_style(&self.axes);
        Ok(())
    }
}

fn scatter_marker(sizes: Option<&[f64]>, color: &str, alpha: f64) -> Marker {
    let marker = Marker::new().color(color.to_string()).opacity(alpha);
    match sizes {
        Some(sizes) => marker.size_array(sizes.iter().map(|s| marker_size(*s)).collect()),
        None => marker.size(marker_size(DEFAULT_MARKER_AREA)),
    }
}

/// Grid nodes drawn as markers whose area is the node value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterGridPlot {
    pub grid: Grid,
    pub values: Vec<f64>,
    pub fill_color: String,
    pub alpha: f64,
    pub axes: AxesStyle,
}

impl ScatterGridPlot {
    pub fn new(grid: Grid, values: Vec<f64>) -> Result<Self, PlotError> {
        planar(&grid, "ScatterGridPlot")?;
        grid.reshape_data(&values)?;
        let axes = AxesStyle::with_labels(&grid.labels()[0], &grid.labels()[1]);
        Ok(Self {
            grid,
            values,
            fill_color: "#1f77b4".to_string(),
            alpha: 0.5,
            axes,
        })
    }

    fn render(&self, axes: &mut Axes) -> Result<(), PlotError> {
        planar(&self.grid, "ScatterGridPlot")?;
        let nodes = self.grid.nodes();
        let x = nodes.column(0).to_vec();
        let y = nodes.column(1).to_vec();
        let trace = Scatter::new(x.clone(), y.clone())
            .mode(Mode::Markers)
            .marker(scatter_marker(Some(&self.values), &self.fill_color, self.alpha))
            .show_legend(false)
            .x_axis(axes.x_ref())
            .y_axis(axes.y_ref());
        axes.include(&x, &y);
        axes.add_trace(trace);
        axes.apply_style(&self.axes);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPlot {
    pub heights: Vec<f64>,
    /// Bar positions; `0..n` when absent.
    pub x: Option<Vec<f64>>,
    pub tick_labels: Option<Vec<String>>,
    /// Tick label rotation in degrees, counter-clockwise.
    pub tick_rotation: f64,
    pub legend: Option<String>,
    pub color_no: Option<usize>,
    pub axes: AxesStyle,
}

impl BarPlot {
    pub fn new(heights: Vec<f64>) -> Self {
        Self {
            heights,
            x: None,
            tick_labels: None,
            tick_rotation: 0.0,
            legend: None,
            color_no: None,
            axes: AxesStyle::default(),
        }
    }

    fn positions(&self) -> Vec<f64> {
        match &self.x {
            Some(x) => x.clone(),
            None => (0..self.heights.len()).map(|i| i as f64).collect(),
        }
    }

    fn render(&self, axes: &mut Axes) -> Result<(), PlotError> {
        let x = self.positions();
        let color = axes.color(self.color_no);
        let mut trace = Bar::new(x.clone(), self.heights.clone())
            .marker(Marker::new().color(color))
            .x_axis(axes.x_ref())
            .y_axis(axes.y_ref());
        match &self.legend {
            Some(legend) => {
                trace = trace.name(legend);
                axes.mark_legend();
            }
            None => trace = trace.show_legend(false),
        }
        if let Some(labels) = &self.tick_labels {
            axes.set_x_ticks(Ticks {
                values: x.iter().take(labels.len()).cloned().collect(),
                labels: labels.clone(),
                angle: -self.tick_rotation,
            });
        }
        axes.include(&x, &self.heights);
        axes.add_trace(trace);
        axes.apply_style(&self.axes);
        Ok(())
    }
}

/// Scalar image; row 0 is drawn at the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePlot {
    pub image: Vec<Vec<f64>>,
    pub color_map: ColorMap,
    pub axes: AxesStyle,
}

impl ImagePlot {
    pub fn new(image: Vec<Vec<f64>>) -> Self {
        Self {
            image,
            color_map: ColorMap::Viridis,
            axes: AxesStyle::with_labels("x", "y"),
        }
    }

    fn render(&self, axes: &mut Axes) -> Result<(), PlotError> {
        let rows: Vec<Vec<f64>> = self.image.iter().rev().cloned().collect();
        let trace = HeatMap::new_z(rows)
            .color_scale(self.color_map.scale())
            .show_scale(false)
            .x_axis(axes.x_ref())
            .y_axis(axes.y_ref());
        let n_cols = self.image.iter().map(Vec::len).max().unwrap_or(0);
        let x = [-0.5, n_cols as f64 - 0.5];
        let y = [-0.5, self.image.len() as f64 - 0.5];
        axes.include(&x, &y);
        axes.add_trace(trace);
        axes.apply_style(&self.axes);
        Ok(())
    }
}

/// Arrows from `(x, y)` along `(dx, dy)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorFieldPlot {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub dx: Vec<f64>,
    pub dy: Vec<f64>,
    /// Falls back to the figure style's line width.
    pub line_width: Option<f64>,
    pub line_style: LineStyle,
    pub color_no: Option<usize>,
    pub axes: AxesStyle,
}

/// Arrow head length relative to the arrow.
const ARROW_HEAD: f64 = 0.25;
/// Half opening angle of the arrow head in radians.
const ARROW_ANGLE: f64 = 0.4;

impl VectorFieldPlot {
    pub fn new(x: Vec<f64>, y: Vec<f64>, dx: Vec<f64>, dy: Vec<f64>) -> Self {
        Self {
            x,
            y,
            dx,
            dy,
            line_width: None,
            line_style: LineStyle::Solid,
            color_no: None,
            axes: AxesStyle::default(),
        }
    }

    /// Polyline of all arrows, separated by gaps.
    fn segments(&self) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let arrows = self.x.iter().zip(&self.y).zip(self.dx.iter().zip(&self.dy));
        for ((&x0, &y0), (&dx, &dy)) in arrows {
            let (x1, y1) = (x0 + dx, y0 + dy);
            xs.extend([Some(x0), Some(x1), None]);
            ys.extend([Some(y0), Some(y1), None]);

            let angle = dy.atan2(dx);
            let head = ARROW_HEAD * dx.hypot(dy);
            for side in [-1.0, 1.0] {
                let a = angle + std::f64::consts::PI + side * ARROW_ANGLE;
                xs.extend([Some(x1), Some(x1 + head * a.cos()), None]);
                ys.extend([Some(y1), Some(y1 + head * a.sin()), None]);
            }
        }
        (xs, ys)
    }

    fn render(&self, axes: &mut Axes) -> Result<(), PlotError> {
        let (xs, ys) = self.segments();
        let color = axes.color(self.color_no);
        let width = self.line_width.unwrap_or(axes.style().line_width);
        let trace = Scatter::new(xs.clone(), ys.clone())
            .mode(Mode::Lines)
            .line(
                Line::new()
                    .width(width)
                    .dash(self.line_style.dash())
                    .color(color),
            )
            .show_legend(false)
            .x_axis(axes.x_ref())
            .y_axis(axes.y_ref());
        let x: Vec<f64> = xs.into_iter().flatten().collect();
        let y: Vec<f64> = ys.into_iter().flatten().collect();
        axes.include(&x, &y);
        axes.add_trace(trace);
        axes.apply_style(&self.axes);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectanglePlot {
    /// Lower-left corner.
    pub xy: [f64; 2],
    pub width: f64,
    pub height: f64,
    pub face_color: String,
    pub edge_color: String,
    pub line_width: f64,
    pub axes: AxesStyle,
}

impl RectanglePlot {
    pub fn new(xy: [f64; 2], width: f64, height: f64) -> Self {
        Self {
            xy,
            width,
            height,
            face_color: "none".to_string(),
            edge_color: "black".to_string(),
            line_width: 1.0,
            axes: AxesStyle::with_labels("x", "y"),
        }
    }

    fn render(&self, axes: &mut Axes) -> Result<(), PlotError> {
        let [x0, y0] = self.xy;
        let (x1, y1) = (x0 + self.width, y0 + self.height);
        let fill = if self.face_color == "none" {
            "rgba(0,0,0,0)".to_string()
        } else {
            self.face_color.clone()
        };
        let shape = Shape::new()
            .shape_type(ShapeType::Rect)
            .x_ref(axes.x_ref())
            .y_ref(axes.y_ref())
            .x0(x0)
            .y0(y0)
            .x1(x1)
            .y1(y1)
            .line(
                ShapeLine::new()
                    .color(self.edge_color.clone())
                    .width(self.line_width),
            )
            .fill_color(fill);
        axes.include(&[x0, x1], &[y0, y1]);
        axes.add_shape(shape);
        axes.apply_style(&self.axes);
        Ok(())
    }
}

/// Any drawable plot object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotItem {
    Line(LinePlot),
    Hist(HistPlot),
    Contour(ContourPlot),
    Scatter(ScatterPlot),
    ScatterGrid(ScatterGridPlot),
    Bar(BarPlot),
    Image(ImagePlot),
    VectorField(VectorFieldPlot),
    Rectangle(RectanglePlot),
}

impl PlotItem {
    /// Draw onto one subplot.
    pub fn render(&self, axes: &mut Axes) -> Result<(), PlotError> {
        match self {
            PlotItem::Line(p) => p.render(axes),
            PlotItem::Hist(p) => p.render(axes),
            PlotItem::Contour(p) => p.render(axes),
            PlotItem::Scatter(p) => p.render(axes),
            PlotItem::ScatterGrid(p) => p.render(axes),
            PlotItem::Bar(p) => p.render(axes),
            PlotItem::Image(p) => p.render(axes),
            PlotItem::VectorField(p) => p.render(axes),
            PlotItem::Rectangle(p) => p.render(axes),
        }
    }

    pub fn axes_style(&self) -> &AxesStyle {
        match self {
            PlotItem::Line(p) => &p.axes,
            PlotItem::Hist(p) => &p.axes,
            PlotItem::Contour(p) => &p.axes,
            PlotItem::Scatter(p) => &p.axes,
            PlotItem::ScatterGrid(p) => &p.axes,
            PlotItem::Bar(p) => &p.axes,
            PlotItem::Image(p) => &p.axes,
            PlotItem::VectorField(p) => &p.axes,
            PlotItem::Rectangle(p) => &p.axes,
        }
    }

    pub fn axes_style_mut(&mut self) -> &mut AxesStyle {
        match self {
            PlotItem::Line(p) => &mut p.axes,
            PlotItem::Hist(p) => &mut p.axes,
            PlotItem::Contour(p) => &mut p.axes,
            PlotItem::Scatter(p) => &mut p.axes,
            PlotItem::ScatterGrid(p) => &mut p.axes,
            PlotItem::Bar(p) => &mut p.axes,
            PlotItem::Image(p) => &mut p.axes,
            PlotItem::VectorField(p) => &mut p.axes,
            PlotItem::Rectangle(p) => &mut p.axes,
        }
    }
}

macro_rules! impl_from_plot {
    ($($plot:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$plot> for PlotItem {
                fn from(plot: $plot) -> Self {
                    PlotItem::$variant(plot)
                }
            }
        )*
    };
}

impl_from_plot!(
    LinePlot => Line,
    HistPlot => Hist,
    ContourPlot => Contour,
    ScatterPlot => Scatter,
    ScatterGridPlot => ScatterGrid,
    BarPlot => Bar,
    ImagePlot => Image,
    VectorFieldPlot => VectorField,
    RectanglePlot => Rectangle,
);
