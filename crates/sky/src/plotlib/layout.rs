use serde::{Deserialize, Serialize};

use crate::error::PlotError;
use crate::plotlib::MAX_SUBPLOTS;

/// Points per inch, as used by LaTeX.
const PT_PER_INCH: f64 = 72.27;
const CM_PER_INCH: f64 = 2.54;
/// Screen resolution used to turn inches into plotly pixels.
const PIXELS_PER_INCH: f64 = 96.0;
/// Default text width of a LaTeX document in points.
pub const DEFAULT_WIDTH_PT: f64 = 450.0;

/// Position of one subplot in the figure grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub col_span: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col, col_span: 1 }
    }
}

/// How subplots are arranged in the figure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubplotLayout {
    /// Grid picked from the subplot count.
    #[default]
    Auto,
    /// Explicit grid; `rows * cols` must equal the subplot count.
    Grid { rows: usize, cols: usize },
    /// `regular` subplots on a grid followed by `wide_rows` full-width rows.
    MultiColumn {
        regular: usize,
        wide_rows: usize,
        grid: Option<(usize, usize)>,
    },
}

/// Subplot placement of a figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureGrid {
    pub rows: usize,
    pub cols: usize,
    /// One cell per subplot, in subplot order.
    pub cells: Vec<Cell>,
}

/// Figure size in inches, `(width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigSize {
    pub width: f64,
    pub height: f64,
}

impl FigSize {
    pub fn from_cm(width_cm: f64, height_cm: f64) -> Self {
        Self {
            width: width_cm / CM_PER_INCH,
            height: height_cm / CM_PER_INCH,
        }
    }

    pub fn pixels(&self) -> (usize, usize) {
        (
            (self.width * PIXELS_PER_INCH).round() as usize,
            (self.height * PIXELS_PER_INCH).round() as usize,
        )
    }
}

/// Figure size for a `rows x cols` grid: each subplot is `width_pt` wide and
/// golden-ratio high.
pub fn calc_fig_size(rows: usize, cols: usize, width_pt: f64) -> FigSize {
    let golden_ratio = (5f64.sqrt() - 1.0) / 2.0;
    let width = width_pt / PT_PER_INCH;
    let height = width * golden_ratio;
    FigSize {
        width: width * cols as f64,
        height: height * rows as f64,
    }
}

fn auto_grid(n_subplots: usize) -> (usize, usize) {
    match n_subplots {
        0 | 1 => (1, 1),
        2 => (1, 2),
        3 => (1, 3),
        5 | 6 => (2, 3),
        n => {
            let side = (n as f64).sqrt().ceil() as usize;
            (side, side)
        }
    }
}

/// Cells of a `rows x cols` grid, filled column-by-column when `col_sort` is
/// set and row-by-row otherwise.
fn grid_cells(rows: usize, cols: usize, col_sort: bool) -> Vec<Cell> {
    if col_sort {
        (0..cols)
            .flat_map(|c| (0..rows).map(move |r| Cell::new(r, c)))
            .collect()
    } else {
        (0..rows)
            .flat_map(|r| (0..cols).map(move |c| Cell::new(r, c)))
            .collect()
    }
}

/// Arrange `n_subplots` on a plain grid.
pub fn create_figure(n_subplots: usize, grid: Option<(usize, usize)>, col_sort: bool) -> Result<FigureGrid, PlotError> {
    if n_subplots > MAX_SUBPLOTS {
        return Err(PlotError::TooManySubplots(n_subplots));
    }
    let (rows, cols) = match grid {
        Some((rows, cols)) => {
            if rows * cols != n_subplots {
                return Err(PlotError::GridMismatch {
                    subplots: n_subplots,
                    rows,
                    cols,
                });
            }
            (rows, cols)
        }
        None => auto_grid(n_subplots),
    };

    let mut cells = grid_cells(rows, cols, col_sort);
    cells.truncate(n_subplots);
    Ok(FigureGrid { rows, cols, cells })
}

/// Regular subplots on a grid (row-by-row), followed by `wide_rows` rows that
/// each span all columns.
pub fn get_multcolumn_subplot(
    regular: usize,
    wide_rows: usize,
    grid: Option<(usize, usize)>,
) -> Result<FigureGrid, PlotError> {
    if regular + wide_rows > MAX_SUBPLOTS {
        return Err(PlotError::TooManySubplots(regular + wide_rows));
    }
    let (rows, cols) = match grid {
        Some(grid) => grid,
        None => match regular {
            0..=2 => (1, 2),
            3..=4 => (2, 2),
            5..=6 => (2, 3),
            _ => (3, 3),
        },
    };
    if regular > rows * cols {
        return Err(PlotError::GridMismatch {
            subplots: regular,
            rows,
            cols,
        });
    }

    let mut cells = grid_cells(rows, cols, false);
    cells.truncate(regular);
    cells.extend((0..wide_rows).map(|i| Cell {
        row: rows + i,
        col: 0,
        col_span: cols,
    }));

    Ok(FigureGrid {
        rows: rows + wide_rows,
        cols,
        cells,
    })
}

impl SubplotLayout {
    pub fn arrange(&self, n_subplots: usize, col_sort: bool) -> Result<FigureGrid, PlotError> {
        match self {
            SubplotLayout::Auto => create_figure(n_subplots, None, col_sort),
            SubplotLayout::Grid { rows, cols } => create_figure(n_subplots, Some((*rows, *cols)), col_sort),
            SubplotLayout::MultiColumn {
                regular,
                wide_rows,
                grid,
            } => {
                if regular + wide_rows != n_subplots {
                    return Err(PlotError::GridMismatch {
                        subplots: n_subplots,
                        rows: grid.map(|g| g.0).unwrap_or(0) + wide_rows,
                        cols: grid.map(|g| g.1).unwrap_or(0),
                    });
                }
                get_multcolumn_subplot(*regular, *wide_rows, *grid)
            }
        }
    }
}
