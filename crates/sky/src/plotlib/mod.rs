//! Declarative plot objects rendered through plotly.
//!
//! Every plot variant carries its data, its drawing defaults and an
//! [`AxesStyle`]. A [`Plotter`] arranges lists of plot items as subplots,
//! saves the figure under a time-stamped name and optionally writes a JSON
//! [`PlotData`] file from which the figure can be drawn again.
pub mod axes;
pub mod factory;
pub mod items;
pub mod layout;
pub mod plotter;
pub mod style;

pub use axes::Axes;
pub use factory::{create_plots, create_scalar_para_plots, parameter_label};
pub use items::{
    BarPlot, ColorMap, ContourPlot, Curve, HistPlot, ImagePlot, LinePlot, LineStyle, PlotItem,
    RectanglePlot, ScatterGridPlot, ScatterPlot, VectorFieldPlot,
};
pub use layout::{
    calc_fig_size, create_figure, get_multcolumn_subplot, Cell, FigSize, FigureGrid,
    SubplotLayout,
};
pub use plotter::{build_figure, regenerate, PlotData, PlotOptions, Plotter, SaveFormat, Subplot};
pub use style::{AxesStyle, LegendPosition, Scale, Style};

/// Axis pairs available in a plotly layout (`xaxis` .. `xaxis8`).
pub const MAX_SUBPLOTS: usize = 8;
