use crate::error::{WarpError, WarpResult};

/// Run-scoped settings for one pairwise alignment.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignConfig {
    /// Minimum row and column distance between consecutive anchors.
    pub min_scans_between_anchors: usize,
    /// Half-width of the band around the interpolated anchor path.
    pub band: usize,
    /// Extra slack added to the band around every anchor segment.
    pub anchor_neighborhood: usize,
    /// Penalty added to the compression and expansion candidates.
    pub global_gap_penalty: f64,
    /// Uniform band half-width when true, anchor-tapered when false.
    pub global_band: bool,
    /// Fill the cost matrix in parallel before the recurrence pass.
    pub precompute_costs: bool,
    /// Size of a dedicated worker pool; `None` uses rayon's global pool.
    pub threads: Option<usize>,
    pub partitions_per_thread: usize,
    pub column_tiles: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            min_scans_between_anchors: 1,
            band: 25,
            anchor_neighborhood: 10,
            global_gap_penalty: 0.0,
            global_band: true,
            precompute_costs: true,
            threads: None,
            partitions_per_thread: 4,
            column_tiles: 1,
        }
    }
}

impl AlignConfig {
    pub fn with_min_spacing(mut self, min_scans_between_anchors: usize) -> Self {
        self.min_scans_between_anchors = min_scans_between_anchors;
        self
    }

    pub fn with_band(mut self, band: usize) -> Self {
        self.band = band;
        self
    }

    pub fn with_neighborhood(mut self, anchor_neighborhood: usize) -> Self {
        self.anchor_neighborhood = anchor_neighborhood;
        self
    }

    pub fn with_gap_penalty(mut self, global_gap_penalty: f64) -> Self {
        self.global_gap_penalty = global_gap_penalty;
        self
    }

    pub fn with_global_band(mut self, global_band: bool) -> Self {
        self.global_band = global_band;
        self
    }

    pub fn with_precompute(mut self, precompute_costs: bool) -> Self {
        self.precompute_costs = precompute_costs;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_partitioning(mut self, partitions_per_thread: usize, column_tiles: usize) -> Self {
        self.partitions_per_thread = partitions_per_thread;
        self.column_tiles = column_tiles;
        self
    }

    pub fn validate(&self) -> WarpResult<()> {
        if !self.global_gap_penalty.is_finite() || self.global_gap_penalty < 0.0 {
            return Err(WarpError::InvalidConfig {
                msg: format!(
                    "global_gap_penalty must be finite and >= 0, got {}",
                    self.global_gap_penalty
                ),
            });
        }
        if self.threads == Some(0) {
            return Err(WarpError::InvalidConfig {
                msg: "threads must be > 0".into(),
            });
        }
        if self.partitions_per_thread == 0 || self.column_tiles == 0 {
            return Err(WarpError::InvalidConfig {
                msg: "partitions_per_thread and column_tiles must be > 0".into(),
            });
        }
        Ok(())
    }
}
