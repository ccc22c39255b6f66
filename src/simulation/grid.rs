//! # Uniform grid
//!
//! The arena is cut into square cells of side `cell_size`, addressed by
//! `(column, row) = floor(coordinate / cell_size)`. Every tick the occupant
//! lists are emptied and each body is appended to **every** cell its bounding
//! box overlaps, so a large or fast body can sit in several cells at once.
//!
//! Cells outside the arena do not exist: a body that leaves the visible area
//! is simply missing from that tick's bookkeeping (it is not destroyed).
//!
//! Two overlapping bodies that share no cell are never compared. With the
//! default cell size of 60 and radii up to 25 this cannot happen, but a cell
//! smaller than a body's diameter plus its per-tick displacement can tunnel.

use tracing::debug;

use crate::configuration::config::{grid_cell_count, MAX_GRID_CELLS};
use crate::error::SimError;
use crate::simulation::aabb::Aabb;
use crate::simulation::broad_phase::{BroadPhase, Region};
use crate::simulation::states::{Body, NVec2};

#[derive(Debug, Clone)]
pub struct Cell {
    pub top_left: NVec2,
    pub objects: Vec<usize>, // body indices, valid for the current tick only
}

/// Inclusive, already clipped range of cells a body occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub col_min: usize,
    pub col_max: usize,
    pub row_min: usize,
    pub row_max: usize,
}

impl CellSpan {
    pub fn contains(&self, col: usize, row: usize) -> bool {
        (self.col_min..=self.col_max).contains(&col) && (self.row_min..=self.row_max).contains(&row)
    }
}

#[derive(Debug, Clone)]
pub struct UniformGrid {
    cell_size: f64,
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,              // row-major, index = row * cols + col
    spans: Vec<Option<CellSpan>>,  // per body, None when fully off-grid
}

impl UniformGrid {
    /// Grid covering `[0, width] x [0, height]`, partial cells rounded up
    pub fn new(width: f64, height: f64, cell_size: f64) -> Result<Self, SimError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SimError::config(format!("grid cell size must be positive, got {cell_size}")));
        }
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(SimError::config(format!("grid needs a positive area, got {width}x{height}")));
        }

        let Some(n_cells) = grid_cell_count(width, height, cell_size).filter(|&n| n <= MAX_GRID_CELLS) else {
            return Err(SimError::config(format!(
                "grid cell size {cell_size} needs more than {MAX_GRID_CELLS} cells for {width}x{height}"
            )));
        };
        let cols = (width / cell_size).ceil() as usize;
        let rows = (height / cell_size).ceil() as usize;

        let mut cells = Vec::with_capacity(n_cells);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell {
                    top_left: NVec2::new(col as f64 * cell_size, row as f64 * cell_size),
                    objects: Vec::new(),
                });
            }
        }

        debug!(cols, rows, cell_size, "built uniform grid");

        Ok(Self {
            cell_size,
            cols,
            rows,
            cells,
            spans: Vec::new(),
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        if col < self.cols && row < self.rows {
            Some(&self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Unclipped `(column, row)` of a point; may be negative or past the edge
    #[inline]
    pub fn cell_coords(&self, p: &NVec2) -> (i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    /// Cells covered by `aabb`, clipped to the grid
    pub fn span_of(&self, aabb: &Aabb) -> Option<CellSpan> {
        let (c0, r0) = self.cell_coords(&aabb.min);
        let (c1, r1) = self.cell_coords(&aabb.max);
        let last_col = self.cols as i64 - 1;
        let last_row = self.rows as i64 - 1;

        if c1 < 0 || r1 < 0 || c0 > last_col || r0 > last_row {
            return None;
        }

        Some(CellSpan {
            col_min: c0.max(0) as usize,
            col_max: c1.min(last_col) as usize,
            row_min: r0.max(0) as usize,
            row_max: r1.min(last_row) as usize,
        })
    }

    /// Cells the body was filed under on the last rebuild
    pub fn span_of_body(&self, body: usize) -> Option<CellSpan> {
        self.spans.get(body).copied().flatten()
    }

    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.objects.clear();
        }
        self.spans.clear();
    }

    /// Visit every unordered pair sharing a cell, cell by cell.
    ///
    /// Cells with fewer than two occupants are skipped outright. A pair
    /// sharing several cells is visited once per shared cell.
    pub fn for_each_cell_pair(&self, mut f: impl FnMut(usize, usize)) {
        for cell in &self.cells {
            if cell.objects.len() < 2 {
                continue;
            }
            for (k, &i) in cell.objects.iter().enumerate() {
                for &j in &cell.objects[k + 1..] {
                    f(i, j);
                }
            }
        }
    }
}

impl BroadPhase for UniformGrid {
    fn rebuild(&mut self, bodies: &[Body]) {
        self.clear();
        self.spans.reserve(bodies.len());

        for (i, b) in bodies.iter().enumerate() {
            let span = self.span_of(&b.aabb());
            if let Some(s) = span {
                for row in s.row_min..=s.row_max {
                    for col in s.col_min..=s.col_max {
                        self.cells[row * self.cols + col].objects.push(i);
                    }
                }
            }
            self.spans.push(span);
        }
    }

    /// Union of the occupants of every cell the body is in
    fn candidates_for(&self, body: usize, _bodies: &[Body], out: &mut Vec<usize>) {
        out.clear();
        let Some(s) = self.span_of_body(body) else {
            return;
        };

        for row in s.row_min..=s.row_max {
            for col in s.col_min..=s.col_max {
                out.extend_from_slice(&self.cells[row * self.cols + col].objects);
            }
        }
        if s.col_min != s.col_max || s.row_min != s.row_max {
            out.sort_unstable();
            out.dedup();
        }
    }

    fn regions(&self) -> Vec<Region> {
        let side = NVec2::new(self.cell_size, self.cell_size);
        self.cells
            .iter()
            .filter(|c| !c.objects.is_empty())
            .map(|c| Region {
                bounds: Aabb::new(c.top_left, c.top_left + side),
                occupants: c.objects.len(),
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "uniform grid"
    }
}
