use ndarray::Array2;

use crate::error::GridError;

/// Interpolant over values sampled on a 1-D or 2-D grid.
///
/// Sample axes are stored in ascending order; evaluation outside the sampled
/// range is an error rather than an extrapolation.
#[derive(Debug, Clone)]
pub enum Interpolator {
    /// Piecewise-linear interpolation along one axis.
    Linear { x: Vec<f64>, y: Vec<f64> },
    /// Bilinear interpolation, `z` shaped `(ny, nx)`.
    Bilinear {
        x: Vec<f64>,
        y: Vec<f64>,
        z: Array2<f64>,
    },
}

impl Interpolator {
    pub fn linear(x: Vec<f64>, y: Vec<f64>) -> Self {
        let mut pairs: Vec<(f64, f64)> = x.into_iter().zip(y).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (x, y) = pairs.into_iter().unzip();
        Interpolator::Linear { x, y }
    }

    pub fn bilinear(mut x: Vec<f64>, mut y: Vec<f64>, mut z: Array2<f64>) -> Self {
        if x.len() > 1 && x[0] > x[x.len() - 1] {
            x.reverse();
            z.invert_axis(ndarray::Axis(1));
        }
        if y.len() > 1 && y[0] > y[y.len() - 1] {
            y.reverse();
            z.invert_axis(ndarray::Axis(0));
        }
        Interpolator::Bilinear { x, y, z }
    }

    pub fn n_dim(&self) -> usize {
        match self {
            Interpolator::Linear { .. } => 1,
            Interpolator::Bilinear { .. } => 2,
        }
    }

    /// Evaluate at one point given as one coordinate per dimension.
    pub fn eval(&self, point: &[f64]) -> Result<f64, GridError> {
        if point.len() != self.n_dim() {
            return Err(GridError::DimensionOutOfRange {
                dim: point.len(),
                n_dim: self.n_dim(),
            });
        }
        let outside = || GridError::OutOfBounds(point.to_vec());

        match self {
            Interpolator::Linear { x, y } => {
                let (i, t) = bracket(x, point[0]).ok_or_else(outside)?;
                let j = (i + 1).min(x.len() - 1);
                Ok(y[i] + t * (y[j] - y[i]))
            }
            Interpolator::Bilinear { x, y, z } => {
                let (i, tx) = bracket(x, point[0]).ok_or_else(outside)?;
                let (j, ty) = bracket(y, point[1]).ok_or_else(outside)?;
                let i1 = (i + 1).min(x.len() - 1);
                let j1 = (j + 1).min(y.len() - 1);

                let bottom = z[(j, i)] + tx * (z[(j, i1)] - z[(j, i)]);
                let top = z[(j1, i)] + tx * (z[(j1, i1)] - z[(j1, i)]);
                Ok(bottom + ty * (top - bottom))
            }
        }
    }

    /// Evaluate at many points.
    pub fn eval_many(&self, points: &[Vec<f64>]) -> Result<Vec<f64>, GridError> {
        points.iter().map(|p| self.eval(p)).collect()
    }
}

/// Lower sample index and fractional position of `v` inside an ascending axis.
fn bracket(axis: &[f64], v: f64) -> Option<(usize, f64)> {
    let (first, last) = (*axis.first()?, *axis.last()?);
    if !(first..=last).contains(&v) {
        return None;
    }
    if axis.len() == 1 {
        return Some((0, 0.0));
    }

    let upper = axis.partition_point(|&s| s <= v).min(axis.len() - 1);
    let i = upper.saturating_sub(1);
    let span = axis[i + 1] - axis[i];
    let t = if span == 0.0 { 0.0 } else { (v - axis[i]) / span };
    Some((i, t))
}
