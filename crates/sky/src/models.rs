//! Analytic sine models used by the demo runs.
use itertools_num::linspace;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, PlotError};
use crate::grid::{Grid, GridData};
use crate::plotlib::{ContourPlot, LinePlot};

/// Upper end of the 1-D demo domain `[0, DEMO_X_MAX]`.
pub const DEMO_X_MAX: f64 = 10.0;

/// Parameters of the 1-D demo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Amplitude of the primary model.
    pub amp: f64,
    /// Amplitude of the second model.
    pub amp2: f64,
    /// Number of sample points.
    pub nx: usize,
    pub freq: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            amp: 1.0,
            amp2: 0.5,
            nx: 100,
            freq: 10.0,
        }
    }
}

impl DemoConfig {
    /// `nx` equidistant points on `[0, DEMO_X_MAX]`.
    pub fn samples(&self) -> Vec<f64> {
        linspace(0.0, DEMO_X_MAX, self.nx).collect()
    }
}

/// `amp * sin(2 pi freq x)`, plotted next to a second model with amplitude `amp2`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticModel1d {
    pub amp: f64,
    pub amp2: f64,
    pub freq: f64,
    pub x_label: String,
    pub y_label: String,
}

impl AnalyticModel1d {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            amp: config.amp,
            amp2: config.amp2,
            freq: config.freq,
            x_label: "x".to_string(),
            y_label: "pressure".to_string(),
        }
    }

    fn wave(&self, amp: f64, x: &[f64]) -> Vec<f64> {
        x.iter()
            .map(|xi| amp * (2.0 * std::f64::consts::PI * self.freq * xi).sin())
            .collect()
    }

    pub fn calculate(&self, x: &[f64]) -> Vec<f64> {
        log::info!("Mod 1 started calculation");
        let y = self.wave(self.amp, x);
        log::info!("Mod 1 finished calculation");
        y
    }

    /// Both models as one line plot in the first cycle colour.
    pub fn plot(&self, x: &[f64]) -> LinePlot {
        let y = self.calculate(x);
        let y2 = self.wave(self.amp2, x);

        let mut plot = LinePlot::new(x.to_vec(), y);
        plot.axes.x_label = self.x_label.clone();
        plot.axes.y_label = self.y_label.clone();
        plot.color_no = Some(0);
        plot.add_line(y2, "Second Model");
        plot
    }
}

/// `sin(x) * cos(y)` on the grid spanned by `x` and `y`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticModel2d;

impl AnalyticModel2d {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(&self, x: &[f64], y: &[f64]) -> Result<GridData, GridError> {
        log::info!("Mod 2 started calculation");
        let grid = Grid::from_vecs(vec![x.to_vec(), y.to_vec()])?;
        let values = grid
            .nodes()
            .rows()
            .into_iter()
            .map(|node| node[0].sin() * node[1].cos())
            .collect();
        let data = GridData::from_vec(grid, values, "f(x, y)")?;
        log::info!("Mod 2 finished calculation");
        Ok(data)
    }

    pub fn plot(&self, x: &[f64], y: &[f64]) -> Result<ContourPlot, PlotError> {
        let data = self.calculate(x, y)?;
        let values = data.values().column(0).to_vec();
        ContourPlot::new(data.domain, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_config_defaults() {
        let config = DemoConfig::default();
        assert_eq!(config.amp2, 0.5);
        assert_eq!(config.samples().len(), 100);
        let last = config.samples().last().copied().unwrap();
        assert!((last - DEMO_X_MAX).abs() < 1e-12);
    }

    #[test]
    fn sine_1d_values() {
        let model = AnalyticModel1d::new(&DemoConfig {
            amp: 2.0,
            freq: 1.0,
            ..DemoConfig::default()
        });
        let y = model.calculate(&[0.0, 0.25]);
        assert!(y[0].abs() < 1e-12);
        assert!((y[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sine_1d_plot_has_second_model() {
        let model = AnalyticModel1d::new(&DemoConfig::default());
        let plot = model.plot(&[0.0, 0.025]);
        assert_eq!(plot.curves.len(), 2);
        assert_eq!(plot.curves[1].legend.as_deref(), Some("Second Model"));
        assert!((plot.curves[1].y[1] - 0.5).abs() < 1e-12);
        assert_eq!(plot.color_no, Some(0));
        assert_eq!(plot.axes.y_label, "pressure");
    }

    #[test]
    fn sine_2d_follows_node_order() {
        let x = [0.0, std::f64::consts::FRAC_PI_2];
        let y = [0.0, std::f64::consts::PI];
        let data = AnalyticModel2d::new().calculate(&x, &y).unwrap();
        let values = data.values().column(0).to_vec();
        // x varies fastest
        assert!(values[0].abs() < 1e-12);
        assert!((values[1] - 1.0).abs() < 1e-12);
        assert!((values[3] + 1.0).abs() < 1e-12);

        let plot = AnalyticModel2d::new().plot(&x, &y).unwrap();
        assert_eq!(plot.values.len(), 4);
    }
}
