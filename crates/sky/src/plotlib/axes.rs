use plotly::common::{Anchor, Font};
use plotly::layout::{Annotation, Axis, AxisType, Shape};
use plotly::Trace;

use crate::plotlib::layout::Cell;
use crate::plotlib::style::{AxesStyle, Scale, Style};

/// Horizontal gap between subplot columns, in figure fractions.
const H_SPACING: f64 = 0.08;
/// Vertical gap between subplot rows, in figure fractions.
const V_SPACING: f64 = 0.12;

/// Running min/max of the data drawn on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    fn of<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Extent>, &v| match acc {
                None => Some(Extent { min: v, max: v }),
                Some(e) => Some(Extent {
                    min: e.min.min(v),
                    max: e.max.max(v),
                }),
            })
    }

    fn merge(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(Extent {
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Custom tick placement, used for categorical bar labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticks {
    pub values: Vec<f64>,
    pub labels: Vec<String>,
    pub angle: f64,
}

/// One subplot being drawn: collects traces and shapes and the axis settings
/// the plot items apply to it.
pub struct Axes<'s> {
    index: usize,
    cell: Cell,
    grid: (usize, usize),
    style: &'s Style,
    traces: Vec<Box<dyn Trace>>,
    shapes: Vec<Shape>,
    axes_style: AxesStyle,
    x_extent: Option<Extent>,
    y_extent: Option<Extent>,
    x_ticks: Option<Ticks>,
    next_color: usize,
    has_legend: bool,
}

/// Finished subplot, ready to be merged into the figure layout.
pub struct RenderedAxes {
    pub index: usize,
    pub traces: Vec<Box<dyn Trace>>,
    pub shapes: Vec<Shape>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub title: Option<Annotation>,
    pub axes_style: AxesStyle,
    pub has_legend: bool,
}

impl<'s> Axes<'s> {
    /// Subplot number `index` (1-based, as plotly names its axes) placed in
    /// `cell` of a `rows x cols` grid.
    pub fn new(index: usize, cell: Cell, grid: (usize, usize), style: &'s Style) -> Self {
        Self {
            index,
            cell,
            grid,
            style,
            traces: Vec::new(),
            shapes: Vec::new(),
            axes_style: AxesStyle::default(),
            x_extent: None,
            y_extent: None,
            x_ticks: None,
            next_color: 0,
            has_legend: false,
        }
    }

    /// Axis reference used by traces: `x`, `x2`, `x3`, ...
    pub fn x_ref(&self) -> String {
        axis_ref("x", self.index)
    }

    pub fn y_ref(&self) -> String {
        axis_ref("y", self.index)
    }

    pub fn style(&self) -> &Style {
        self.style
    }

    /// Colour for the next artist: the given cycle index or the next unused one.
    pub fn color(&mut self, color_no: Option<usize>) -> String {
        match color_no {
            Some(i) => self.style.color(i).to_string(),
            None => {
                let color = self.style.color(self.next_color).to_string();
                self.next_color += 1;
                color
            }
        }
    }

    pub fn add_trace(&mut self, trace: Box<dyn Trace>) {
        self.traces.push(trace);
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn mark_legend(&mut self) {
        self.has_legend = true;
    }

    /// Widen the data extent used to complete partial axis limits.
    pub fn include<'a, X, Y>(&mut self, x: X, y: Y)
    where
        X: IntoIterator<Item = &'a f64>,
        Y: IntoIterator<Item = &'a f64>,
    {
        self.x_extent = Extent::merge(self.x_extent, Extent::of(x));
        self.y_extent = Extent::merge(self.y_extent, Extent::of(y));
    }

    pub fn set_x_ticks(&mut self, ticks: Ticks) {
        self.x_ticks = Some(ticks);
    }

    /// Replace the axis decoration; the last plot item of a subplot wins.
    pub fn apply_style(&mut self, axes_style: &AxesStyle) {
        self.axes_style = axes_style.clone();
    }

    pub fn x_extent(&self) -> Option<Extent> {
        self.x_extent
    }

    pub fn y_extent(&self) -> Option<Extent> {
        self.y_extent
    }

    /// Domain of this subplot in figure fractions, `([x0, x1], [y0, y1])`.
    pub fn domain(&self) -> ([f64; 2], [f64; 2]) {
        cell_domain(&self.cell, self.grid)
    }

    pub fn finish(self) -> RenderedAxes {
        let (x_domain, y_domain) = self.domain();
        let s = &self.axes_style;

        let mut x_axis = Axis::new()
            .domain(&x_domain)
            .anchor(&self.y_ref())
            .show_grid(s.plot_grid)
            .show_tick_labels(s.draw_x_ticks);
        if s.draw_x_label && !s.x_label.is_empty() {
            x_axis = x_axis.title(s.x_label.as_str());
        }
        if s.x_scale == Scale::Log {
            x_axis = x_axis.type_(AxisType::Log);
        }
        if let Some(range) = axis_range(s.x_lim, self.x_extent, s.x_scale) {
            x_axis = x_axis.range(range);
        }
        if let Some(ticks) = &self.x_ticks {
            x_axis = x_axis
                .tick_values(ticks.values.clone())
                .tick_text(ticks.labels.clone())
                .tick_angle(ticks.angle);
        }

        let mut y_axis = Axis::new()
            .domain(&y_domain)
            .anchor(&self.x_ref())
            .show_grid(s.plot_grid)
            .show_tick_labels(s.draw_y_ticks);
        if s.draw_y_label && !s.y_label.is_empty() {
            y_axis = y_axis.title(s.y_label.as_str());
        }
        if s.y_scale == Scale::Log {
            y_axis = y_axis.type_(AxisType::Log);
        }
        if let Some(range) = axis_range(s.y_lim, self.y_extent, s.y_scale) {
            y_axis = y_axis.range(range);
        }
        if s.axis_equal {
            y_axis = y_axis.scale_anchor(&self.x_ref());
        }

        let title = (!s.title.is_empty()).then(|| {
            Annotation::new()
                .text(s.title.as_str())
                .x_ref("paper")
                .y_ref("paper")
                .x((x_domain[0] + x_domain[1]) / 2.0)
                .y(y_domain[1])
                .x_anchor(Anchor::Center)
                .y_anchor(Anchor::Bottom)
                .show_arrow(false)
                .font(Font::new().size(self.style.font_size))
        });

        RenderedAxes {
            index: self.index,
            traces: self.traces,
            shapes: self.shapes,
            x_axis,
            y_axis,
            title,
            axes_style: self.axes_style,
            has_legend: self.has_legend,
        }
    }
}

fn axis_ref(prefix: &str, index: usize) -> String {
    if index <= 1 {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, index)
    }
}

/// Figure-fraction domain of a cell; row 0 is the top row.
pub fn cell_domain(cell: &Cell, (rows, cols): (usize, usize)) -> ([f64; 2], [f64; 2]) {
    let span = |start: usize, len: usize, count: usize, spacing: f64| {
        let count = count.max(1) as f64;
        let spacing = if count > 1.0 { spacing } else { 0.0 };
        let width = (1.0 - spacing * (count - 1.0)) / count;
        let lo = start as f64 * (width + spacing);
        let hi = lo + width * len as f64 + spacing * (len as f64 - 1.0);
        (lo, hi.min(1.0))
    };

    let (x0, x1) = span(cell.col, cell.col_span, cols, H_SPACING);
    let (top0, top1) = span(cell.row, 1, rows, V_SPACING);
    ([x0, x1], [1.0 - top1, 1.0 - top0])
}

/// Full axis range from optional limits, missing bounds taken from the data.
/// Log axes take their range in decades.
fn axis_range(lim: [Option<f64>; 2], extent: Option<Extent>, scale: Scale) -> Option<Vec<f64>> {
    if lim[0].is_none() && lim[1].is_none() {
        return None;
    }
    let lower = lim[0].or(extent.map(|e| e.min))?;
    let upper = lim[1].or(extent.map(|e| e.max))?;
    match scale {
        Scale::Linear => Some(vec![lower, upper]),
        Scale::Log if lower > 0.0 && upper > 0.0 => Some(vec![lower.log10(), upper.log10()]),
        Scale::Log => None,
    }
}
