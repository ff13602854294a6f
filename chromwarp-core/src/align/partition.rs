//! Cost precomputation over disjoint rectangles of the banded cost matrix.

use log::debug;

use super::{AlignStage, CancelToken};
use crate::cost::PairCostFunction;
use crate::error::{CostError, WarpError, WarpResult};
use crate::matrix::{BandLayout, BandRowMut, BandedMatrix};
use crate::series::FeatureSeries;

/// Half-open rectangle `[row_start, row_end) x [col_start, col_end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Region {
    pub fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    pub fn full(rows: usize, cols: usize) -> Self {
        Self::new(0, rows, 0, cols)
    }
}

/// Everything a unit of work needs to evaluate cells.
pub struct CostContext<'a> {
    pub cost: &'a dyn PairCostFunction,
    pub rows: &'a FeatureSeries,
    pub cols: &'a FeatureSeries,
}

impl<'a> CostContext<'a> {
    pub fn new(
        cost: &'a dyn PairCostFunction,
        rows: &'a FeatureSeries,
        cols: &'a FeatureSeries,
    ) -> Self {
        Self { cost, rows, cols }
    }

    #[inline]
    pub fn eval(&self, row: usize, col: usize) -> WarpResult<f64> {
        let value = self
            .cost
            .cost(
                row,
                col,
                self.rows.time(row),
                self.cols.time(col),
                self.rows.feature(row),
                self.cols.feature(col),
            )
            .map_err(|source| WarpError::CostFunction { row, col, source })?;
        if value.is_nan() {
            return Err(WarpError::CostFunction {
                row,
                col,
                source: CostError::new("cost function returned NaN"),
            });
        }
        Ok(value)
    }

    fn fill(&self, segment: &mut BandRowMut<'_>) -> WarpResult<usize> {
        let row = segment.row;
        let start = segment.start;
        for (offset, slot) in segment.values.iter_mut().enumerate() {
            *slot = self.eval(row, start + offset)?;
        }
        Ok(segment.values.len())
    }
}

/// Fills every banded cell of `raw` inside `region`, returning the number
/// of cells written.
pub fn compute_region(
    region: &Region,
    raw: &mut BandedMatrix,
    ctx: &CostContext<'_>,
) -> WarpResult<usize> {
    let row_end = region.row_end.min(raw.rows());
    let mut filled = 0usize;
    for row in region.row_start..row_end {
        let (start, width) = raw.column_bounds(row);
        let lo = region.col_start.max(start);
        let hi = region.col_end.min(start + width);
        for col in lo..hi.max(lo) {
            raw.set(row, col, ctx.eval(row, col)?);
            filled += 1;
        }
    }
    Ok(filled)
}

/// Row stripes holding roughly equal numbers of banded cells, each cut into
/// `column_tiles` equally wide column ranges.
pub fn plan_regions(layout: &BandLayout, stripes: usize, column_tiles: usize) -> Vec<Region> {
    let rows = layout.rows();
    let cols = layout.cols();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    let stripes = stripes.clamp(1, rows);
    let tiles = column_tiles.clamp(1, cols);
    let per_stripe = layout.cells().div_ceil(stripes).max(1);

    let mut bounds = Vec::with_capacity(stripes + 1);
    bounds.push(0usize);
    let mut acc = 0usize;
    for row in 0..rows {
        acc += layout.bounds(row).1;
        if acc >= per_stripe && row + 1 < rows {
            bounds.push(row + 1);
            acc = 0;
        }
    }
    bounds.push(rows);

    let tile_width = cols.div_ceil(tiles);
    let mut regions = Vec::with_capacity((bounds.len() - 1) * tiles);
    for w in bounds.windows(2) {
        for t in 0..tiles {
            let col_start = t * tile_width;
            if col_start >= cols {
                break;
            }
            regions.push(Region::new(w[0], w[1], col_start, (col_start + tile_width).min(cols)));
        }
    }
    regions
}

struct Partition<'a> {
    segments: Vec<BandRowMut<'a>>,
}

/// Hands each region the banded pieces of `raw` it covers. Regions sharing
/// a cell are rejected.
fn split_partitions<'a>(
    raw: &'a mut BandedMatrix,
    regions: &[Region],
) -> WarpResult<Vec<Partition<'a>>> {
    let mut partitions: Vec<Partition<'a>> = regions
        .iter()
        .map(|_| Partition {
            segments: Vec::new(),
        })
        .collect();

    for view in raw.rows_mut() {
        let row = view.row;
        let mut covering: Vec<usize> = (0..regions.len())
            .filter(|&k| row >= regions[k].row_start && row < regions[k].row_end)
            .collect();
        covering.sort_by_key(|&k| regions[k].col_start);

        let mut rest = view;
        let mut last_end = 0usize;
        for k in covering {
            let region = &regions[k];
            if region.col_start < last_end {
                return Err(WarpError::InvalidConfig {
                    msg: format!("partitions overlap on row {row} at column {}", region.col_start),
                });
            }
            last_end = region.col_end;
            let (_, tail) = rest.split_at(region.col_start);
            let (piece, tail) = tail.split_at(region.col_end);
            rest = tail;
            if !piece.values.is_empty() {
                partitions[k].segments.push(piece);
            }
        }
    }
    Ok(partitions)
}

/// Fills `raw` by running one unit of work per region, in parallel when the
/// `parallel` feature is enabled. Each unit checks `cancel` once per row
/// segment. On error the partially written matrix must be discarded.
pub fn precompute(
    raw: &mut BandedMatrix,
    ctx: &CostContext<'_>,
    regions: &[Region],
    cancel: &CancelToken,
) -> WarpResult<usize> {
    let mut partitions = split_partitions(raw, regions)?;
    debug!("precomputing costs in {} partitions", partitions.len());

    let counts: WarpResult<Vec<usize>> = par_try_map_mut!(&mut partitions, |p: &mut Partition<'_>| {
        let mut filled = 0usize;
        for segment in p.segments.iter_mut() {
            if cancel.is_cancelled() {
                return Err(WarpError::Cancelled {
                    stage: AlignStage::MatricesAllocated,
                });
            }
            filled += ctx.fill(segment)?;
        }
        Ok(filled)
    });
    Ok(counts?.into_iter().sum())
}
