//! Ragged row-banded storage for the cost and cumulative DP matrices.
//!
//! Each row keeps only the half-open column interval `[start, start + width)`.
//! Matrices built from the same [`BandLayout`] share it through an `Arc`, so
//! the cost matrix and the cumulative matrix are guaranteed to index the same
//! cells.

use std::sync::Arc;

use crate::anchors::AnchorPairSet;
use crate::error::{WarpError, WarpResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandLayout {
    rows: usize,
    cols: usize,
    starts: Vec<usize>,
    widths: Vec<usize>,
    // offsets[r] is the index of (r, starts[r]) in row-major ragged storage
    offsets: Vec<usize>,
}

impl BandLayout {
    /// Explicit per-row `(start, width)` bounds.
    pub fn from_bounds(cols: usize, bounds: Vec<(usize, usize)>) -> WarpResult<Self> {
        for (row, &(start, width)) in bounds.iter().enumerate() {
            if start + width > cols {
                return Err(WarpError::LayoutMismatch {
                    msg: format!(
                        "row {row} band [{start}, {}) exceeds {cols} columns",
                        start + width
                    ),
                });
            }
        }
        let (starts, widths) = bounds.into_iter().unzip();
        Ok(Self::from_parts(cols, starts, widths))
    }

    pub fn full(rows: usize, cols: usize) -> Self {
        Self::from_parts(cols, vec![0; rows], vec![cols; rows])
    }

    /// Plain `|row - col| <= radius` band without slope correction. On
    /// non-square matrices it may exclude the terminal corner.
    pub fn diagonal(rows: usize, cols: usize, radius: usize) -> Self {
        let mut starts = Vec::with_capacity(rows);
        let mut widths = Vec::with_capacity(rows);
        for row in 0..rows {
            let lo = row.saturating_sub(radius).min(cols);
            let hi = (row + radius + 1).min(cols);
            starts.push(lo);
            widths.push(hi.saturating_sub(lo));
        }
        Self::from_parts(cols, starts, widths)
    }

    /// Band around the piecewise-linear anchor path.
    ///
    /// For row `i` the path occupies columns `floor(c*(i))` up to one before
    /// `floor(c*(i + 1))`, so consecutive rows stay connected whatever the
    /// slope. That span is widened on both sides by the half-width:
    /// `band + neighborhood` everywhere when `global_band` is set, otherwise
    /// `neighborhood` at the anchors growing linearly to
    /// `band + neighborhood` halfway between two anchors. Row starts are
    /// made non-decreasing since cells left of the previous row's start
    /// cannot be reached by a monotone path.
    pub fn from_anchors(
        anchors: &AnchorPairSet,
        neighborhood: usize,
        band: usize,
        global_band: bool,
    ) -> Self {
        let rows = anchors.rows();
        let cols = anchors.cols();
        let mut starts = Vec::with_capacity(rows);
        let mut widths = Vec::with_capacity(rows);
        let mut prev_start = 0usize;
        let mut next_ideal = anchors.ideal_column(0);

        for row in 0..rows {
            let ideal = next_ideal;
            let center_lo = if row == 0 { 0 } else { ideal.floor() as usize };
            let center_hi = if row + 1 < rows {
                next_ideal = anchors.ideal_column(row + 1);
                center_lo.max((next_ideal.floor() as usize).saturating_sub(1))
            } else {
                cols - 1
            };

            let half = if global_band {
                band + neighborhood
            } else {
                neighborhood + tapered(anchors, row, band)
            };

            let lo = center_lo.saturating_sub(half).max(prev_start);
            let hi = (center_hi + half + 1).min(cols);
            starts.push(lo);
            widths.push(hi - lo);
            prev_start = lo;
        }
        Self::from_parts(cols, starts, widths)
    }

    fn from_parts(cols: usize, starts: Vec<usize>, widths: Vec<usize>) -> Self {
        let rows = starts.len();
        let mut offsets = Vec::with_capacity(rows + 1);
        let mut acc = 0usize;
        offsets.push(0);
        for &w in &widths {
            acc += w;
            offsets.push(acc);
        }
        Self {
            rows,
            cols,
            starts,
            widths,
            offsets,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored cells over all rows.
    pub fn cells(&self) -> usize {
        self.offsets[self.rows]
    }

    /// `(start, width)` of a row's band.
    #[inline]
    pub fn bounds(&self, row: usize) -> (usize, usize) {
        (self.starts[row], self.widths[row])
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col >= self.starts[row] && col < self.starts[row] + self.widths[row]
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        if self.contains(row, col) {
            Some(self.offsets[row] + col - self.starts[row])
        } else {
            None
        }
    }

    /// Rejects layouts that cannot carry a path from `(0, 0)` to the
    /// terminal corner.
    pub fn check_reachable(&self) -> WarpResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(WarpError::InvalidConfig {
                msg: format!("empty {}x{} layout", self.rows, self.cols),
            });
        }
        for (row, col) in [(0, 0), (self.rows - 1, self.cols - 1)] {
            if !self.contains(row, col) {
                return Err(WarpError::BandExcludesCorner { row, col });
            }
        }
        if let Some(row) = self.widths.iter().position(|&w| w == 0) {
            return Err(WarpError::EmptyBandRow { row });
        }
        Ok(())
    }
}

fn tapered(anchors: &AnchorPairSet, row: usize, band: usize) -> usize {
    match anchors.segment(row) {
        (a, Some(b)) => {
            let t = (row - a.row) as f64 / (b.row - a.row) as f64;
            (band as f64 * 2.0 * t.min(1.0 - t)).round() as usize
        }
        (_, None) => 0,
    }
}

/// A row-banded matrix of `f64`.
#[derive(Clone, Debug)]
pub struct BandedMatrix {
    layout: Arc<BandLayout>,
    values: Vec<f64>,
}

impl BandedMatrix {
    pub fn create(
        anchors: &AnchorPairSet,
        neighborhood: usize,
        band: usize,
        fill: f64,
        global_band: bool,
    ) -> Self {
        let layout = BandLayout::from_anchors(anchors, neighborhood, band, global_band);
        Self::with_layout(Arc::new(layout), fill)
    }

    pub fn with_layout(layout: Arc<BandLayout>, fill: f64) -> Self {
        let values = vec![fill; layout.cells()];
        Self { layout, values }
    }

    /// New zero-filled matrix with the same band layout.
    pub fn shared_layout(&self) -> Self {
        Self::with_layout(Arc::clone(&self.layout), 0.0)
    }

    pub fn layout(&self) -> &Arc<BandLayout> {
        &self.layout
    }

    pub fn same_layout(&self, other: &BandedMatrix) -> bool {
        Arc::ptr_eq(&self.layout, &other.layout) || self.layout == other.layout
    }

    pub fn rows(&self) -> usize {
        self.layout.rows
    }

    pub fn columns(&self) -> usize {
        self.layout.cols
    }

    pub fn column_bounds(&self, row: usize) -> (usize, usize) {
        self.layout.bounds(row)
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.layout.contains(row, col)
    }

    #[inline]
    pub fn try_get(&self, row: usize, col: usize) -> Option<f64> {
        self.layout.index(row, col).map(|idx| self.values[idx])
    }

    /// # Panics
    /// If `(row, col)` lies outside the row's band.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[self.checked_index(row, col)]
    }

    /// # Panics
    /// If `(row, col)` lies outside the row's band.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let idx = self.checked_index(row, col);
        self.values[idx] = value;
    }

    /// Stored values of one row, starting at its band start.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[self.layout.offsets[row]..self.layout.offsets[row + 1]]
    }

    /// Splits storage into one disjoint mutable view per row.
    pub fn rows_mut(&mut self) -> Vec<BandRowMut<'_>> {
        let layout = &self.layout;
        let mut rest: &mut [f64] = &mut self.values;
        let mut out = Vec::with_capacity(layout.rows);
        for row in 0..layout.rows {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(layout.widths[row]);
            rest = tail;
            out.push(BandRowMut {
                row,
                start: layout.starts[row],
                values: head,
            });
        }
        out
    }

    #[inline]
    fn checked_index(&self, row: usize, col: usize) -> usize {
        match self.layout.index(row, col) {
            Some(idx) => idx,
            None => {
                let (start, width) = if row < self.layout.rows {
                    self.layout.bounds(row)
                } else {
                    (0, 0)
                };
                panic!(
                    "cell ({row}, {col}) outside band [{start}, {}) of a {}x{} matrix",
                    start + width,
                    self.layout.rows,
                    self.layout.cols
                )
            }
        }
    }
}

/// Mutable view on a contiguous column run of one matrix row.
#[derive(Debug)]
pub struct BandRowMut<'a> {
    pub row: usize,
    pub start: usize,
    pub values: &'a mut [f64],
}

impl<'a> BandRowMut<'a> {
    pub fn end(&self) -> usize {
        self.start + self.values.len()
    }

    /// Splits at absolute column `col`, clamped to the view.
    pub fn split_at(self, col: usize) -> (BandRowMut<'a>, BandRowMut<'a>) {
        let mid = col.clamp(self.start, self.end()) - self.start;
        let (left, right) = self.values.split_at_mut(mid);
        (
            BandRowMut {
                row: self.row,
                start: self.start,
                values: left,
            },
            BandRowMut {
                row: self.row,
                start: self.start + mid,
                values: right,
            },
        )
    }
}
