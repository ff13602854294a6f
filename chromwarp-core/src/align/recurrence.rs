use std::sync::Arc;

use crate::cost::{PairCostFunction, Weights};
use crate::error::{WarpError, WarpResult};
use crate::matrix::{BandLayout, BandedMatrix};

/// Move that produced a cell's cumulative score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Predecessor {
    /// From `(row - 1, col - 1)`, or the origin cell itself.
    Diagonal,
    /// From `(row - 1, col)`.
    Up,
    /// From `(row, col - 1)`.
    Left,
}

/// One predecessor slot per banded cell; `None` until the cell is visited.
#[derive(Clone, Debug)]
pub struct PredecessorGrid {
    layout: Arc<BandLayout>,
    cells: Vec<Option<Predecessor>>,
}

impl PredecessorGrid {
    pub fn new(layout: Arc<BandLayout>) -> Self {
        let cells = vec![None; layout.cells()];
        Self { layout, cells }
    }

    pub fn layout(&self) -> &Arc<BandLayout> {
        &self.layout
    }

    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Predecessor> {
        self.layout.index(row, col).and_then(|idx| self.cells[idx])
    }

    /// # Panics
    /// If `(row, col)` lies outside the band.
    pub fn set(&mut self, row: usize, col: usize, pred: Predecessor) {
        match self.layout.index(row, col) {
            Some(idx) => self.cells[idx] = Some(pred),
            None => panic!("predecessor cell ({row}, {col}) outside band"),
        }
    }

    pub fn visited(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Weighted three-way DTW step.
///
/// `diag = w_diag * raw + cum[i-1][j-1]`, `up = w_comp * raw + cum[i-1][j]`
/// and `left = w_exp * raw + cum[i][j-1]`. The gap penalty is added to the
/// two off-diagonal candidates in both modes. Ties resolve diag > up > left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Recurrence {
    weights: Weights,
    minimizing: bool,
    gap_penalty: f64,
}

impl Recurrence {
    pub fn new(weights: Weights, minimizing: bool, gap_penalty: f64) -> Self {
        Self {
            weights,
            minimizing,
            gap_penalty,
        }
    }

    pub fn for_cost<C: PairCostFunction + ?Sized>(cost: &C, gap_penalty: f64) -> Self {
        Self::new(cost.weights(), cost.minimizing(), gap_penalty)
    }

    pub fn minimizing(&self) -> bool {
        self.minimizing
    }

    /// Value no candidate can lose to.
    pub fn worst(&self) -> f64 {
        if self.minimizing {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Scores `(row, col)` from the already finalized neighbors in `cum` and
    /// records the winning move.
    pub fn eval(
        &self,
        row: usize,
        col: usize,
        cum: &BandedMatrix,
        raw: f64,
        predecessors: &mut PredecessorGrid,
    ) -> WarpResult<f64> {
        let diag = if row > 0 && col > 0 {
            cum.try_get(row - 1, col - 1)
        } else {
            None
        };
        let up = if row > 0 { cum.try_get(row - 1, col) } else { None };
        let left = if col > 0 { cum.try_get(row, col - 1) } else { None };
        let (value, pred) = self.step(row, col, raw, diag, up, left)?;
        predecessors.set(row, col, pred);
        Ok(value)
    }

    pub(crate) fn step(
        &self,
        row: usize,
        col: usize,
        raw: f64,
        diag: Option<f64>,
        up: Option<f64>,
        left: Option<f64>,
    ) -> WarpResult<(f64, Predecessor)> {
        if row == 0 && col == 0 {
            return Ok((self.weights.diagonal * raw, Predecessor::Diagonal));
        }
        let worst = self.worst();
        let gap = self.gap_penalty;

        if row == 0 {
            let l = left.map_or(worst, |c| self.weights.expansion * raw + c + gap);
            return Ok((l, Predecessor::Left));
        }
        if col == 0 {
            let u = up.map_or(worst, |c| self.weights.compression * raw + c + gap);
            return Ok((u, Predecessor::Up));
        }

        let d = diag.map_or(worst, |c| self.weights.diagonal * raw + c);
        let u = up.map_or(worst, |c| self.weights.compression * raw + c + gap);
        let l = left.map_or(worst, |c| self.weights.expansion * raw + c + gap);
        if d == u && u == l && !d.is_finite() {
            return Err(WarpError::DegenerateRecurrence { row, col });
        }

        // strict comparisons keep the earlier candidate on ties
        let mut best = d;
        let mut pred = Predecessor::Diagonal;
        if self.better(u, best) {
            best = u;
            pred = Predecessor::Up;
        }
        if self.better(l, best) {
            best = l;
            pred = Predecessor::Left;
        }
        Ok((best, pred))
    }

    #[inline]
    fn better(&self, a: f64, b: f64) -> bool {
        if self.minimizing {
            a < b
        } else {
            a > b
        }
    }
}

/// Score-only variant of the banded recurrence keeping just the previous and
/// current row. Produces the same final score as the full pass.
pub fn score_streaming<F>(
    rec: &Recurrence,
    layout: &BandLayout,
    mut raw_cost: F,
) -> WarpResult<f64>
where
    F: FnMut(usize, usize) -> WarpResult<f64>,
{
    let max_width = (0..layout.rows())
        .map(|r| layout.bounds(r).1)
        .max()
        .unwrap_or(0);
    let mut prev = vec![rec.worst(); max_width];
    let mut cur = vec![rec.worst(); max_width];
    let (mut prev_start, mut prev_width) = (0usize, 0usize);

    for row in 0..layout.rows() {
        let (start, width) = layout.bounds(row);
        let in_prev = |col: usize| col >= prev_start && col < prev_start + prev_width;
        for col in start..start + width {
            let raw = raw_cost(row, col)?;
            let diag = if row > 0 && col > 0 && in_prev(col - 1) {
                Some(prev[col - 1 - prev_start])
            } else {
                None
            };
            let up = if row > 0 && in_prev(col) {
                Some(prev[col - prev_start])
            } else {
                None
            };
            let left = if col > start {
                Some(cur[col - 1 - start])
            } else {
                None
            };
            let (value, _) = rec.step(row, col, raw, diag, up, left)?;
            cur[col - start] = value;
        }
        std::mem::swap(&mut prev, &mut cur);
        prev_start = start;
        prev_width = width;
    }

    let last_col = layout.cols().saturating_sub(1);
    if prev_width == 0 || last_col < prev_start || last_col >= prev_start + prev_width {
        return Err(WarpError::BandExcludesCorner {
            row: layout.rows().saturating_sub(1),
            col: last_col,
        });
    }
    Ok(prev[last_col - prev_start])
}
