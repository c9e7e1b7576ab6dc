//! Integration tests for the structured grid and grid data.

use ndarray::{Array2, ArrayD, IxDyn};
use sky::error::GridError;
use sky::grid::{Grid, GridData};

fn planar() -> Grid {
    Grid::from_vecs(vec![vec![0.0, 1.0, 2.0], vec![10.0, 20.0]]).unwrap()
}

// ---------------------------------------------------------------------------
// Derived properties
// ---------------------------------------------------------------------------

#[test]
fn size_is_product_of_node_counts() {
    let grid = Grid::from_vecs(vec![vec![0.0, 1.0, 2.0], vec![10.0, 20.0], vec![5.0, 6.0]]).unwrap();
    assert_eq!(grid.size(), 12);
    assert_eq!(grid.nodes().shape(), &[12, 3]);
    assert_eq!(grid.n_nodes_per_dim(), &[3, 2, 2]);
    assert_eq!(grid.labels(), &["x", "y", "z"]);
}

#[test]
fn planar_nodes_vary_x_fastest() {
    let grid = planar();
    let nodes = grid.nodes();
    for k in 0..grid.size() {
        assert_eq!(nodes[[k, 0]], grid.dimension_samples()[0][k % 3]);
        assert_eq!(nodes[[k, 1]], grid.dimension_samples()[1][k / 3]);
    }
}

#[test]
fn lengths_and_spacings() {
    let grid = Grid::from_vecs(vec![vec![1.0, 1.5, 2.0], vec![3.0]]).unwrap();
    assert_eq!(grid.l_per_dim(), &[1.0, 0.0]);
    assert_eq!(grid.dx_per_dim(), &[Some(0.5), None]);
}

#[test]
fn empty_or_missing_dimensions_rejected() {
    assert!(matches!(Grid::from_vecs(vec![]), Err(GridError::NoDimensions)));
    assert!(matches!(
        Grid::from_vecs(vec![vec![0.0], vec![]]),
        Err(GridError::EmptyDimension(1))
    ));
}

// ---------------------------------------------------------------------------
// Reshaping
// ---------------------------------------------------------------------------

#[test]
fn reshape_then_flatten_returns_input() {
    let grid = planar();
    let values: Vec<f64> = (0..6).map(f64::from).collect();
    let shaped = grid.reshape_data(&values).unwrap();
    assert_eq!(shaped.shape(), &[2, 3]);
    assert_eq!(shaped[IxDyn(&[1, 0])], 3.0);
    assert_eq!(grid.flatten_data(&shaped).unwrap(), values);
}

#[test]
fn reshape_rejects_three_dimensions() {
    let grid = Grid::from_vecs(vec![vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]]).unwrap();
    assert!(matches!(
        grid.reshape_data(&[0.0; 8]),
        Err(GridError::UnsupportedDimension(3))
    ));
}

#[test]
fn shaped_data_stacks_samples() {
    let grid = planar();
    let values = Array2::from_shape_fn((6, 2), |(node, sample)| (node + 10 * sample) as f64);
    let data = GridData::new(grid.clone(), values, "p").unwrap();
    let shaped: ArrayD<f64> = data.get_shaped_data().unwrap();
    assert_eq!(shaped.shape(), &[2, 2, 3]);
    assert_eq!(shaped[IxDyn(&[1, 1, 2])], 15.0);
    assert_eq!(shaped[IxDyn(&[0, 0, 1])], 1.0);
}

#[test]
fn data_rows_must_match_grid() {
    let err = GridData::from_vec(planar(), vec![0.0; 5], "p").unwrap_err();
    assert!(matches!(err, GridError::LengthMismatch { expected: 6, found: 5 }));
}

// ---------------------------------------------------------------------------
// Interpolation and neighbourhoods
// ---------------------------------------------------------------------------

#[test]
fn bilinear_interpolation_reproduces_plane() {
    let grid = planar();
    let values: Vec<f64> = grid
        .nodes()
        .rows()
        .into_iter()
        .map(|n| 2.0 * n[0] + 0.5 * n[1])
        .collect();
    let interp = grid.create_interpolator(&values).unwrap();
    let v = interp.eval(&[1.5, 12.0]).unwrap();
    assert!((v - (3.0 + 6.0)).abs() < 1e-12);
    assert!(interp.eval(&[2.5, 12.0]).is_err());
}

#[test]
fn legend_uses_two_significant_digits() {
    let grid = Grid::from_vecs(vec![vec![0.126, 1.0, 12.0]]).unwrap();
    assert_eq!(
        grid.create_legend(0).unwrap(),
        vec!["x = 0.13", "x = 1.0", "x = 1.2e+01"]
    );
}

#[test]
fn square_neighbourhood_is_clipped() {
    let grid = Grid::from_vecs(vec![vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 2.0]]).unwrap();
    let corner = grid.nodes_in_square(0, 2.0).unwrap();
    assert_eq!(corner, vec![0, 1, 4, 5]);

    let distances = grid.euclid_distance(&[0], 2.0).unwrap();
    assert_eq!(distances.shape(), &[12, 1]);
    assert!((distances[[5, 0]] - 2f64.sqrt()).abs() < 1e-12);
    assert_eq!(distances[[11, 0]], sky::grid::structured::FAR_DISTANCE);
}

#[test]
fn huge_square_covers_whole_grid() {
    let grid = Grid::from_vecs(vec![vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]]).unwrap();
    assert_eq!(grid.nodes_in_square(4, 1e30).unwrap(), (0..9).collect::<Vec<_>>());
    assert_eq!(grid.nodes_in_square(8, f64::INFINITY).unwrap().len(), 9);

    let distances = grid.euclid_distance(&[0], 1e30).unwrap();
    assert!(distances.iter().all(|&d| d < sky::grid::structured::FAR_DISTANCE));
}

// ---------------------------------------------------------------------------
// Serialization and CSV
// ---------------------------------------------------------------------------

#[test]
fn grid_round_trips_through_json() {
    let mut grid = planar();
    grid.set_labels(vec!["t".to_string(), "T".to_string()]);
    let json = serde_json::to_string(&grid).unwrap();
    let back: Grid = serde_json::from_str(&json).unwrap();
    assert_eq!(back, grid);
}

#[test]
fn csv_has_coordinates_then_samples() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    let data = GridData::from_vec(planar(), (0..6).map(f64::from).collect(), "p").unwrap();
    data.write_csv(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("x,y,p"));
    assert_eq!(lines.next(), Some("0,10,0"));
    assert_eq!(content.lines().count(), 7);
}
