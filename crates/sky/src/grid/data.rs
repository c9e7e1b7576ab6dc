use std::path::Path;

use anyhow::{Context, Result};
use ndarray::{Array1, Array2, Array3, ArrayD, ArrayView1, Axis};

use crate::error::GridError;
use crate::grid::Grid;

/// Values sampled on a [`Grid`], one column per sample.
#[derive(Debug, Clone)]
pub struct GridData {
    pub domain: Grid,
    values: Array2<f64>,
    pub label: String,
}

impl GridData {
    /// Wrap a `size x n_samples` value matrix.
    pub fn new(domain: Grid, values: Array2<f64>, label: &str) -> Result<Self, GridError> {
        if values.nrows() != domain.size() {
            return Err(GridError::LengthMismatch {
                expected: domain.size(),
                found: values.nrows(),
            });
        }
        Ok(Self {
            domain,
            values,
            label: label.to_string(),
        })
    }

    /// Wrap a single sample given in node order.
    pub fn from_vec(domain: Grid, values: Vec<f64>, label: &str) -> Result<Self, GridError> {
        let column = Array1::from_vec(values).insert_axis(Axis(1));
        Self::new(domain, column, label)
    }

    /// Values in flattened form, `size x n_samples`.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    pub fn sample(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.n_samples()).then(|| self.values.column(index))
    }

    /// Data shaped `n_samples x d_1` (1-D) or `n_samples x ny x nx` (2-D).
    pub fn get_shaped_data(&self) -> Result<ArrayD<f64>, GridError> {
        match self.domain.n_dim() {
            1 => Ok(self.values.t().to_owned().into_dyn()),
            2 => {
                let (nx, ny) = (
                    self.domain.n_nodes_per_dim()[0],
                    self.domain.n_nodes_per_dim()[1],
                );
                let mut shaped = Array3::zeros((self.n_samples(), ny, nx));
                for (idx, column) in self.values.columns().into_iter().enumerate() {
                    let sample = self.domain.reshape_data(&column.to_vec())?;
                    shaped
                        .index_axis_mut(Axis(0), idx)
                        .assign(&sample.into_dimensionality::<ndarray::Ix2>()?);
                }
                Ok(shaped.into_dyn())
            }
            n => Err(GridError::UnsupportedDimension(n)),
        }
    }

    /// Write node coordinates followed by one column per sample.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create CSV file: {}", path.as_ref().display()))?;

        let mut header: Vec<String> = self.domain.labels().to_vec();
        if self.n_samples() == 1 {
            header.push(self.label.clone());
        } else {
            header.extend((0..self.n_samples()).map(|i| format!("{}_{}", self.label, i)));
        }
        writer.write_record(&header)?;

        for (node, values) in self
            .domain
            .nodes()
            .rows()
            .into_iter()
            .zip(self.values.rows())
        {
            let record: Vec<String> = node
                .iter()
                .chain(values.iter())
                .map(|v| v.to_string())
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush()?;
        log::debug!("Wrote grid data '{}' to {}", self.label, path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn single_sample_becomes_column() {
        let grid = Grid::from_vecs(vec![vec![0.0, 1.0, 2.0]]).unwrap();
        let data = GridData::from_vec(grid, vec![1.0, 2.0, 3.0], "p").unwrap();
        assert_eq!(data.n_samples(), 1);
        assert_eq!(data.values().shape(), &[3, 1]);
        assert_eq!(data.sample(0).unwrap().to_vec(), vec![1.0, 2.0, 3.0]);
        assert!(data.sample(1).is_none());
    }

    #[test]
    fn row_count_must_match_nodes() {
        let grid = Grid::from_vecs(vec![vec![0.0, 1.0]]).unwrap();
        let err = GridData::new(grid, array![[1.0], [2.0], [3.0]], "f(x)").unwrap_err();
        assert!(matches!(err, GridError::LengthMismatch { expected: 2, found: 3 }));
    }

    #[test]
    fn shaped_1d_is_samples_by_nodes() {
        let grid = Grid::from_vecs(vec![vec![0.0, 1.0, 2.0]]).unwrap();
        let data = GridData::new(grid, array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]], "f").unwrap();
        let shaped = data.get_shaped_data().unwrap();
        assert_eq!(shaped.shape(), &[2, 3]);
        assert_eq!(shaped[[1, 2]], 30.0);
    }

    #[test]
    fn csv_has_coordinates_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let grid = Grid::from_vecs(vec![vec![0.0, 1.0], vec![5.0]]).unwrap();
        let data = GridData::from_vec(grid, vec![0.5, 1.5], "p").unwrap();
        data.write_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["x,y,p", "0,5,0.5", "1,5,1.5"]);
    }
}
