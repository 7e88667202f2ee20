use crate::error::LabelError;

/// Page and grid parameters, all lengths in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    pub cols: usize,
    pub rows: usize,
}

impl Default for GridSpec {
    /// A4 sheet of 4 x 10 labels.
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin_x: 18.0,
            margin_y: 18.0,
            gap_x: 3.0,
            gap_y: 3.0,
            cols: 4,
            rows: 10,
        }
    }
}

/// One label's box. `y` is measured downward from the top of the page and
/// row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub cell_width: f64,
    pub cell_height: f64,
    /// Row-major: all columns of row 0, then row 1, ...
    pub cells: Vec<GridCell>,
}

/// Upper bound on cells per page.
pub const MAX_CELLS: usize = 10_000;

/// Compute the cells of a regular grid.
pub fn layout(spec: &GridSpec) -> Result<Grid, LabelError> {
    let cell_width = track_size(spec.page_width, spec.margin_x, spec.gap_x, spec.cols);
    let cell_height = track_size(spec.page_height, spec.margin_y, spec.gap_y, spec.rows);

    if !(cell_width > 0.0 && cell_height > 0.0) {
        return Err(LabelError::InvalidLayout { cell_width, cell_height });
    }

    let count = spec
        .rows
        .checked_mul(spec.cols)
        .filter(|&n| n <= MAX_CELLS)
        .ok_or(LabelError::GridTooLarge { rows: spec.rows, cols: spec.cols, max: MAX_CELLS })?;

    let mut cells = Vec::with_capacity(count);
    for row in 0..spec.rows {
        for col in 0..spec.cols {
            cells.push(GridCell {
                row,
                col,
                x: spec.margin_x + col as f64 * (cell_width + spec.gap_x),
                y: spec.margin_y + row as f64 * (cell_height + spec.gap_y),
                width: cell_width,
                height: cell_height,
            });
        }
    }

    Ok(Grid { cell_width, cell_height, cells })
}

fn track_size(extent: f64, margin: f64, gap: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (extent - 2.0 * margin - (count as f64 - 1.0) * gap) / count as f64
}
