use itertools_num::linspace;
use ndarray::{Array1, Array2, ArrayD, Dimension, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::grid::format_sig2;
use crate::grid::interpolate::Interpolator;

/// Distance written for node pairs that are not inside each other's square.
pub const FAR_DISTANCE: f64 = 10000.0;

/// Threshold below which a coordinate counts as zero when deriving spacings.
const ZERO_COORD_EPS: f64 = 1e-15;

/// An n-dimensional rectilinear grid built from per-dimension samples.
///
/// Serialized as its samples and labels only; everything else is derived
/// again on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridSpec", into = "GridSpec")]
pub struct Grid {
    dimension_samples: Vec<Array1<f64>>,
    labels: Vec<String>,
    n_nodes_per_dim: Vec<usize>,
    min_per_dim: Vec<f64>,
    max_per_dim: Vec<f64>,
    l_per_dim: Vec<f64>,
    dx_per_dim: Vec<Option<f64>>,
    nodes: Array2<f64>,
}

/// On-disk form of a [`Grid`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSpec {
    pub samples: Vec<Vec<f64>>,
    pub labels: Vec<String>,
}

impl TryFrom<GridSpec> for Grid {
    type Error = GridError;

    fn try_from(spec: GridSpec) -> Result<Self, Self::Error> {
        let samples = spec.samples.into_iter().map(Array1::from_vec).collect();
        Grid::with_labels(samples, spec.labels)
    }
}

impl From<Grid> for GridSpec {
    fn from(grid: Grid) -> Self {
        GridSpec {
            samples: grid.dimension_samples.iter().map(|s| s.to_vec()).collect(),
            labels: grid.labels,
        }
    }
}

/// Default axis label for dimension `dim`: `x`, `y`, `z`, then `x3`, `x4`, ...
fn default_label(dim: usize) -> String {
    match dim {
        0 => "x".to_string(),
        1 => "y".to_string(),
        2 => "z".to_string(),
        d => format!("x{}", d),
    }
}

impl Grid {
    /// Build a grid with the default labels.
    pub fn new(dimension_samples: Vec<Array1<f64>>) -> Result<Self, GridError> {
        Self::with_labels(dimension_samples, Vec::new())
    }

    /// Build a grid; missing labels are filled with the defaults.
    pub fn with_labels(
        dimension_samples: Vec<Array1<f64>>,
        labels: Vec<String>,
    ) -> Result<Self, GridError> {
        if dimension_samples.is_empty() {
            return Err(GridError::NoDimensions);
        }

        let n_dim = dimension_samples.len();
        let mut n_nodes_per_dim = Vec::with_capacity(n_dim);
        let mut min_per_dim = Vec::with_capacity(n_dim);
        let mut max_per_dim = Vec::with_capacity(n_dim);
        let mut l_per_dim = Vec::with_capacity(n_dim);
        let mut dx_per_dim = Vec::with_capacity(n_dim);

        for (dim, sample) in dimension_samples.iter().enumerate() {
            if sample.is_empty() {
                return Err(GridError::EmptyDimension(dim));
            }
            if sample.iter().any(|v| !v.is_finite()) {
                return Err(GridError::NonFinite { dim });
            }
            let min = sample.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = sample.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

            n_nodes_per_dim.push(sample.len());
            min_per_dim.push(min);
            max_per_dim.push(max);
            l_per_dim.push(max - min);
            dx_per_dim.push(if sample.len() > 1 {
                Some(sample[1] - sample[0])
            } else {
                None
            });
        }

        let mut labels = labels;
        labels.truncate(n_dim);
        for dim in labels.len()..n_dim {
            labels.push(default_label(dim));
        }

        let mut grid = Grid {
            dimension_samples,
            labels,
            n_nodes_per_dim,
            min_per_dim,
            max_per_dim,
            l_per_dim,
            dx_per_dim,
            nodes: Array2::zeros((0, n_dim)),
        };
        grid.nodes = grid.full_factorial_grid();
        Ok(grid)
    }

    /// Convenience constructor from plain vectors.
    pub fn from_vecs(samples: Vec<Vec<f64>>) -> Result<Self, GridError> {
        Self::new(samples.into_iter().map(Array1::from_vec).collect())
    }

    /// Build an equidistant 2-D grid covering scattered coordinates.
    ///
    /// The spacing per axis is the smallest coordinate above zero, so the
    /// coordinates are expected to start at (or near) the origin.
    pub fn from_2d_coords(x: &[f64], y: &[f64]) -> Result<Self, GridError> {
        let x_samples = equidistant_axis(x, 0)?;
        let y_samples = equidistant_axis(y, 1)?;
        Self::new(vec![x_samples, y_samples])
    }

    /// Node coordinates in meshgrid order, shape `size x n_dim`.
    fn full_factorial_grid(&self) -> Array2<f64> {
        let size = self.n_nodes_per_dim.iter().product();
        let n_dim = self.n_dim();
        let mut nodes = Array2::zeros((size, n_dim));

        for node in 0..size {
            let index = self.multi_index(node);
            for (dim, &i) in index.iter().enumerate() {
                nodes[(node, dim)] = self.dimension_samples[dim][i];
            }
        }
        nodes
    }

    /// Shape of the node tensor: `[n1, n0, n2, n3, ...]` (`[n0]` in 1-D).
    pub fn node_shape(&self) -> Vec<usize> {
        let mut shape = self.n_nodes_per_dim.clone();
        if shape.len() >= 2 {
            shape.swap(0, 1);
        }
        shape
    }

    /// Per-dimension sample indices of a node id.
    pub fn multi_index(&self, node: usize) -> Vec<usize> {
        let shape = self.node_shape();
        let mut index = vec![0; shape.len()];
        let mut rest = node;
        for axis in (0..shape.len()).rev() {
            index[axis] = rest % shape[axis];
            rest /= shape[axis];
        }
        if index.len() >= 2 {
            index.swap(0, 1);
        }
        index
    }

    /// Node id of a per-dimension sample index (inverse of [`Grid::multi_index`]).
    pub fn node_id(&self, index: &[usize]) -> usize {
        let mut tensor_index = index.to_vec();
        if tensor_index.len() >= 2 {
            tensor_index.swap(0, 1);
        }
        self.node_shape()
            .iter()
            .zip(tensor_index.iter())
            .fold(0, |acc, (&n, &i)| acc * n + i)
    }

    pub fn n_dim(&self) -> usize {
        self.dimension_samples.len()
    }

    /// Total number of nodes.
    pub fn size(&self) -> usize {
        self.nodes.nrows()
    }

    pub fn nodes(&self) -> &Array2<f64> {
        &self.nodes
    }

    pub fn dimension_samples(&self) -> &[Array1<f64>] {
        &self.dimension_samples
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        for (dim, label) in labels.into_iter().take(self.n_dim()).enumerate() {
            self.labels[dim] = label;
        }
    }

    pub fn n_nodes_per_dim(&self) -> &[usize] {
        &self.n_nodes_per_dim
    }

    pub fn min_per_dim(&self) -> &[f64] {
        &self.min_per_dim
    }

    pub fn max_per_dim(&self) -> &[f64] {
        &self.max_per_dim
    }

    /// Extent (max - min) per dimension.
    pub fn l_per_dim(&self) -> &[f64] {
        &self.l_per_dim
    }

    /// Spacing per dimension; `None` for dimensions with a single sample.
    pub fn dx_per_dim(&self) -> &[Option<f64>] {
        &self.dx_per_dim
    }

    /// Per-dimension coordinate tensors, each shaped like [`Grid::node_shape`].
    pub fn meshgrid(&self) -> Vec<ArrayD<f64>> {
        let shape = self.node_shape();
        (0..self.n_dim())
            .map(|dim| {
                ArrayD::from_shape_fn(IxDyn(&shape), |index| {
                    let mut sample = index.slice().to_vec();
                    if sample.len() >= 2 {
                        sample.swap(0, 1);
                    }
                    self.dimension_samples[dim][sample[dim]]
                })
            })
            .collect()
    }

    fn check_len(&self, found: usize) -> Result<(), GridError> {
        if found != self.size() {
            return Err(GridError::LengthMismatch {
                expected: self.size(),
                found,
            });
        }
        Ok(())
    }

    /// Reshape flat node values into tensor form: unchanged in 1-D, `(ny, nx)`
    /// in 2-D.
    pub fn reshape_data(&self, values: &[f64]) -> Result<ArrayD<f64>, GridError> {
        self.check_len(values.len())?;
        match self.n_dim() {
            1 | 2 => Ok(ArrayD::from_shape_vec(
                IxDyn(&self.node_shape()),
                values.to_vec(),
            )?),
            n => Err(GridError::UnsupportedDimension(n)),
        }
    }

    /// Flatten tensor-form values back into node order.
    pub fn flatten_data(&self, values: &ArrayD<f64>) -> Result<Vec<f64>, GridError> {
        if values.shape() != self.node_shape().as_slice() {
            return Err(GridError::LengthMismatch {
                expected: self.size(),
                found: values.len(),
            });
        }
        Ok(values.iter().cloned().collect())
    }

    /// Interpolant for one value per node: linear in 1-D, bilinear in 2-D.
    pub fn create_interpolator(&self, values: &[f64]) -> Result<Interpolator, GridError> {
        self.check_len(values.len())?;
        match self.n_dim() {
            1 => Ok(Interpolator::linear(
                self.dimension_samples[0].to_vec(),
                values.to_vec(),
            )),
            2 => {
                let shaped = self.reshape_data(values)?;
                let (ny, nx) = (self.n_nodes_per_dim[1], self.n_nodes_per_dim[0]);
                let z = shaped.into_shape((ny, nx))?;
                Ok(Interpolator::bilinear(
                    self.dimension_samples[0].to_vec(),
                    self.dimension_samples[1].to_vec(),
                    z,
                ))
            }
            n => Err(GridError::UnsupportedDimension(n)),
        }
    }

    /// Legend entries `"<label> = <value>"` for every sample of one dimension.
    pub fn create_legend(&self, dim: usize) -> Result<Vec<String>, GridError> {
        let samples = self
            .dimension_samples
            .get(dim)
            .ok_or(GridError::DimensionOutOfRange {
                dim,
                n_dim: self.n_dim(),
            })?;
        Ok(samples
            .iter()
            .map(|v| format!("{} = {}", self.labels[dim], format_sig2(*v)))
            .collect())
    }

    /// Node ids inside the square of edge `l` centred on `node`, clipped to
    /// the grid, in node order.
    pub fn nodes_in_square(&self, node: usize, l: f64) -> Result<Vec<usize>, GridError> {
        if self.n_dim() != 2 {
            return Err(GridError::UnsupportedDimension(self.n_dim()));
        }
        if node >= self.size() {
            return Err(GridError::NodeOutOfRange {
                node,
                size: self.size(),
            });
        }

        let half_width = |dim: usize| -> usize {
            match self.dx_per_dim[dim] {
                Some(dx) if dx != 0.0 => ((l / dx.abs()) / 2.0).floor().max(0.0) as usize,
                _ => 0,
            }
        };
        let (hx, hy) = (half_width(0), half_width(1));
        let (nx, ny) = (self.n_nodes_per_dim[0], self.n_nodes_per_dim[1]);
        let index = self.multi_index(node);
        let (ix, iy) = (index[0], index[1]);

        let mut ids = Vec::new();
        for j in iy.saturating_sub(hy)..=iy.saturating_add(hy).min(ny - 1) {
            for i in ix.saturating_sub(hx)..=ix.saturating_add(hx).min(nx - 1) {
                ids.push(self.node_id(&[i, j]));
            }
        }
        Ok(ids)
    }

    /// Distance matrix `size x node_ids.len()`; nodes outside the square of
    /// edge `l_max` around a reference node keep [`FAR_DISTANCE`].
    pub fn euclid_distance(&self, node_ids: &[usize], l_max: f64) -> Result<Array2<f64>, GridError> {
        let mut distance = Array2::from_elem((self.size(), node_ids.len()), FAR_DISTANCE);

        for (col, &node) in node_ids.iter().enumerate() {
            let neighbours = self.nodes_in_square(node, l_max)?;
            let (x0, y0) = (self.nodes[(node, 0)], self.nodes[(node, 1)]);

            for other in neighbours {
                let dx = self.nodes[(other, 0)] - x0;
                let dy = self.nodes[(other, 1)] - y0;
                distance[(other, col)] = (dx * dx + dy * dy).sqrt();
            }
        }
        Ok(distance)
    }
}

fn equidistant_axis(coords: &[f64], dim: usize) -> Result<Array1<f64>, GridError> {
    if coords.is_empty() {
        return Err(GridError::EmptyDimension(dim));
    }
    let min = coords.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = coords.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let delta = coords
        .iter()
        .cloned()
        .filter(|&c| c > ZERO_COORD_EPS)
        .fold(f64::INFINITY, f64::min);
    if !delta.is_finite() {
        return Err(GridError::NoSpacing(dim));
    }

    let n_elem = (max / delta) as usize;
    Ok(linspace(min, max, n_elem + 1).collect())
}
