use std::sync::Arc;

use log::{debug, info};

use super::partition::{plan_regions, precompute, CostContext};
use super::recurrence::{score_streaming, PredecessorGrid, Recurrence};
use super::traceback::{traceback, WarpPath};
use super::{AlignStage, CancelToken};
use crate::anchors::{AnchorPair, AnchorPairSet};
use crate::config::AlignConfig;
use crate::cost::PairCostFunction;
use crate::error::{WarpError, WarpResult};
use crate::matrix::{BandLayout, BandedMatrix};
use crate::series::FeatureSeries;

/// Everything one alignment call produces. The two matrices share the
/// layout of the predecessor grid.
#[derive(Clone, Debug)]
pub struct Alignment {
    pub score: f64,
    pub predecessors: PredecessorGrid,
    pub cumulative: BandedMatrix,
    pub costs: BandedMatrix,
}

impl Alignment {
    pub fn layout(&self) -> &Arc<BandLayout> {
        self.cumulative.layout()
    }

    /// Optimal path ending in the bottom-right corner.
    pub fn path(&self) -> WarpResult<WarpPath> {
        let rows = self.cumulative.rows();
        let cols = self.cumulative.columns();
        traceback(&self.predecessors, (rows - 1, cols - 1))
    }
}

/// Pairwise banded warping engine for one cost function and configuration.
///
/// Cost precomputation fans out over rayon (a dedicated pool when
/// `threads` is configured); the recurrence itself always runs on the
/// calling thread.
pub struct Aligner<C> {
    config: AlignConfig,
    cost: C,
    cancel: CancelToken,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl<C: PairCostFunction> Aligner<C> {
    pub fn new(config: AlignConfig, cost: C) -> WarpResult<Self> {
        config.validate()?;
        cost.weights().validate()?;

        #[cfg(feature = "parallel")]
        let pool = match config.threads {
            Some(n) => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
            None => None,
        };

        Ok(Self {
            config,
            cost,
            cancel: CancelToken::new(),
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    pub fn cost(&self) -> &C {
        &self.cost
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Aligns `rows` (first series) against `cols` (second series) inside
    /// the band derived from `anchors`.
    pub fn align(
        &self,
        rows: &FeatureSeries,
        cols: &FeatureSeries,
        anchors: &[AnchorPair],
    ) -> WarpResult<Alignment> {
        self.check_cancel(AlignStage::Idle)?;
        check_series(rows, cols)?;
        let set = AnchorPairSet::build(
            anchors,
            rows.len(),
            cols.len(),
            self.config.min_scans_between_anchors,
        )?;
        debug!("{:?}: {} anchor points", AlignStage::AnchorsBuilt, set.len());
        self.align_with_anchors(rows, cols, &set)
    }

    pub fn align_with_anchors(
        &self,
        rows: &FeatureSeries,
        cols: &FeatureSeries,
        anchors: &AnchorPairSet,
    ) -> WarpResult<Alignment> {
        check_series(rows, cols)?;
        if anchors.rows() != rows.len() || anchors.cols() != cols.len() {
            return Err(WarpError::LayoutMismatch {
                msg: format!(
                    "anchor set spans {}x{} but series are {}x{}",
                    anchors.rows(),
                    anchors.cols(),
                    rows.len(),
                    cols.len()
                ),
            });
        }
        self.align_with_layout(rows, cols, Arc::new(self.layout_for(anchors)))
    }

    /// Aligns inside an explicit band. The layout must be `rows.len()` by
    /// `cols.len()` and is checked for reachability before any cost is
    /// evaluated.
    pub fn align_with_layout(
        &self,
        rows: &FeatureSeries,
        cols: &FeatureSeries,
        layout: Arc<BandLayout>,
    ) -> WarpResult<Alignment> {
        check_series(rows, cols)?;
        check_layout(&layout, rows, cols)?;
        layout.check_reachable()?;

        let rec = Recurrence::for_cost(&self.cost, self.config.global_gap_penalty);
        let mut cumulative = BandedMatrix::with_layout(Arc::clone(&layout), rec.worst());
        let mut costs = cumulative.shared_layout();
        let mut predecessors = PredecessorGrid::new(Arc::clone(&layout));
        debug!(
            "{:?}: {}x{} with {} banded cells",
            AlignStage::MatricesAllocated,
            layout.rows(),
            layout.cols(),
            layout.cells()
        );
        self.check_cancel(AlignStage::MatricesAllocated)?;

        let ctx = CostContext::new(&self.cost, rows, cols);
        let precomputed = self.config.precompute_costs;
        if precomputed {
            let stripes = self.workers() * self.config.partitions_per_thread;
            let regions = plan_regions(&layout, stripes, self.config.column_tiles);
            let cancel = &self.cancel;
            let filled = self.install(|| precompute(&mut costs, &ctx, &regions, cancel))?;
            debug!("{:?}: {} cells precomputed", AlignStage::CostsReady, filled);
        }
        self.check_cancel(AlignStage::CostsReady)?;

        for row in 0..layout.rows() {
            let (start, width) = layout.bounds(row);
            for col in start..start + width {
                let raw = if precomputed {
                    costs.get(row, col)
                } else {
                    let value = ctx.eval(row, col)?;
                    costs.set(row, col, value);
                    value
                };
                let value = rec.eval(row, col, &cumulative, raw, &mut predecessors)?;
                cumulative.set(row, col, value);
            }
        }
        debug!(
            "{:?}: {} cells visited",
            AlignStage::RecurrenceComplete,
            predecessors.visited()
        );

        let score = cumulative.get(layout.rows() - 1, layout.cols() - 1);
        info!(
            "{:?}: aligned {}x{} series, score {}",
            AlignStage::Scored,
            layout.rows(),
            layout.cols(),
            score
        );
        Ok(Alignment {
            score,
            predecessors,
            cumulative,
            costs,
        })
    }

    /// Final score only, using two rows of working memory and lazily
    /// computed costs.
    pub fn score(
        &self,
        rows: &FeatureSeries,
        cols: &FeatureSeries,
        anchors: &[AnchorPair],
    ) -> WarpResult<f64> {
        self.check_cancel(AlignStage::Idle)?;
        check_series(rows, cols)?;
        let set = AnchorPairSet::build(
            anchors,
            rows.len(),
            cols.len(),
            self.config.min_scans_between_anchors,
        )?;
        let layout = self.layout_for(&set);
        layout.check_reachable()?;
        self.check_cancel(AlignStage::AnchorsBuilt)?;

        let rec = Recurrence::for_cost(&self.cost, self.config.global_gap_penalty);
        let ctx = CostContext::new(&self.cost, rows, cols);
        score_streaming(&rec, &layout, |row, col| ctx.eval(row, col))
    }

    fn layout_for(&self, anchors: &AnchorPairSet) -> BandLayout {
        BandLayout::from_anchors(
            anchors,
            self.config.anchor_neighborhood,
            self.config.band,
            self.config.global_band,
        )
    }

    fn check_cancel(&self, stage: AlignStage) -> WarpResult<()> {
        if self.cancel.is_cancelled() {
            debug!("alignment cancelled at {:?}", stage);
            return Err(WarpError::Cancelled { stage });
        }
        Ok(())
    }

    fn workers(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            match &self.pool {
                Some(pool) => pool.current_num_threads(),
                None => rayon::current_num_threads(),
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        #[cfg(feature = "parallel")]
        {
            if let Some(pool) = &self.pool {
                return pool.install(f);
            }
        }
        f()
    }
}

fn check_series(rows: &FeatureSeries, cols: &FeatureSeries) -> WarpResult<()> {
    if rows.is_empty() {
        return Err(WarpError::EmptySeries { which: "first" });
    }
    if cols.is_empty() {
        return Err(WarpError::EmptySeries { which: "second" });
    }
    if rows.dim() != cols.dim() {
        return Err(WarpError::DimensionMismatch {
            left: rows.dim(),
            right: cols.dim(),
        });
    }
    Ok(())
}

fn check_layout(layout: &BandLayout, rows: &FeatureSeries, cols: &FeatureSeries) -> WarpResult<()> {
    if layout.rows() != rows.len() || layout.cols() != cols.len() {
        return Err(WarpError::LayoutMismatch {
            msg: format!(
                "layout is {}x{} but series are {}x{}",
                layout.rows(),
                layout.cols(),
                rows.len(),
                cols.len()
            ),
        });
    }
    Ok(())
}
