use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use plotly::common::Anchor;
use plotly::layout::Legend;
use serde::{Deserialize, Serialize};

use crate::config::load_config_file;

/// matplotlib's default `tab10` colour cycle.
pub const TAB10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

impl FromStr for Scale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Scale::Linear),
            "log" => Ok(Scale::Log),
            _ => anyhow::bail!("Unknown axis scale: {}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegendPosition {
    #[default]
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "upper right")]
    UpperRight,
    #[serde(rename = "upper left")]
    UpperLeft,
    #[serde(rename = "lower left")]
    LowerLeft,
    #[serde(rename = "lower right")]
    LowerRight,
}

impl FromStr for LegendPosition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "best" => Ok(LegendPosition::Best),
            "upper right" => Ok(LegendPosition::UpperRight),
            "upper left" => Ok(LegendPosition::UpperLeft),
            "lower left" => Ok(LegendPosition::LowerLeft),
            "lower right" => Ok(LegendPosition::LowerRight),
            _ => anyhow::bail!("Unknown legend position: {}", s),
        }
    }
}

impl LegendPosition {
    /// Legend anchored inside the plot area; `Best` leaves placement to plotly.
    pub fn to_legend(self) -> Legend {
        let (x, y, x_anchor, y_anchor) = match self {
            LegendPosition::Best => return Legend::new(),
            LegendPosition::UpperRight => (0.99, 0.99, Anchor::Right, Anchor::Top),
            LegendPosition::UpperLeft => (0.01, 0.99, Anchor::Left, Anchor::Top),
            LegendPosition::LowerLeft => (0.01, 0.01, Anchor::Left, Anchor::Bottom),
            LegendPosition::LowerRight => (0.99, 0.01, Anchor::Right, Anchor::Bottom),
        };
        Legend::new().x(x).y(y).x_anchor(x_anchor).y_anchor(y_anchor)
    }
}

/// Axis decoration shared by every plot variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesStyle {
    pub x_label: String,
    pub x_scale: Scale,
    /// Lower and upper x limit; a missing bound follows the data.
    pub x_lim: [Option<f64>; 2],
    pub draw_x_ticks: bool,
    pub draw_x_label: bool,

    pub y_label: String,
    pub y_scale: Scale,
    pub y_lim: [Option<f64>; 2],
    pub draw_y_ticks: bool,
    pub draw_y_label: bool,

    pub axis_equal: bool,
    pub plot_grid: bool,
    pub title: String,
    pub legend_position: LegendPosition,
}

impl Default for AxesStyle {
    fn default() -> Self {
        Self::with_labels("x", "f(x)")
    }
}

impl AxesStyle {
    pub fn with_labels(x_label: &str, y_label: &str) -> Self {
        Self {
            x_label: x_label.to_string(),
            x_scale: Scale::Linear,
            x_lim: [None, None],
            draw_x_ticks: true,
            draw_x_label: true,
            y_label: y_label.to_string(),
            y_scale: Scale::Linear,
            y_lim: [None, None],
            draw_y_ticks: true,
            draw_y_label: true,
            axis_equal: false,
            plot_grid: true,
            title: String::new(),
            legend_position: LegendPosition::Best,
        }
    }
}

/// Figure-wide look: font, default line width and colour cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub font_family: String,
    pub font_size: usize,
    pub line_width: f64,
    pub colors: Vec<String>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: "serif".to_string(),
            font_size: 12,
            line_width: 2.0,
            colors: TAB10.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Style {
    /// Load a style from YAML or JSON; missing keys keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_config_file(path.as_ref())
    }

    /// Colour `index` of the cycle, wrapping around.
    pub fn color(&self, index: usize) -> &str {
        if self.colors.is_empty() {
            return TAB10[index % TAB10.len()];
        }
        &self.colors[index % self.colors.len()]
    }
}
