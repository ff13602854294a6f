//! Pairwise scan comparison functions driving the warping recurrence.

mod kernels;

use crate::error::{CostError, WarpError, WarpResult};

/// Multipliers applied to the raw pair cost for each recurrence move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weights {
    /// Vertical move (`up`): several rows of the first series on one column.
    pub compression: f64,
    /// Horizontal move (`left`): several columns on one row.
    pub expansion: f64,
    pub diagonal: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            compression: 1.0,
            expansion: 1.0,
            diagonal: 1.0,
        }
    }
}

impl Weights {
    pub fn new(compression: f64, expansion: f64, diagonal: f64) -> Self {
        Self {
            compression,
            expansion,
            diagonal,
        }
    }

    pub fn validate(&self) -> WarpResult<()> {
        for (name, w) in [
            ("compression", self.compression),
            ("expansion", self.expansion),
            ("diagonal", self.diagonal),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(WarpError::InvalidConfig {
                    msg: format!("{name} weight must be finite and >= 0, got {w}"),
                });
            }
        }
        Ok(())
    }
}

/// Cost or similarity of scan `i` of the first series against scan `j` of
/// the second. Implementations must be pure: the engine calls them
/// concurrently on disjoint cells.
pub trait PairCostFunction: Send + Sync {
    fn cost(
        &self,
        i: usize,
        j: usize,
        time_i: f64,
        time_j: f64,
        feature_i: &[f64],
        feature_j: &[f64],
    ) -> Result<f64, CostError>;

    /// True for distances (smaller is better), false for similarities.
    fn minimizing(&self) -> bool;

    fn weights(&self) -> Weights {
        Weights::default()
    }
}

/// Adapts a closure into a [`PairCostFunction`].
pub struct FnCost<F> {
    f: F,
    minimizing: bool,
    weights: Weights,
}

impl<F> FnCost<F>
where
    F: Fn(usize, usize, f64, f64, &[f64], &[f64]) -> Result<f64, CostError> + Send + Sync,
{
    pub fn minimizing(f: F) -> Self {
        Self {
            f,
            minimizing: true,
            weights: Weights::default(),
        }
    }

    pub fn maximizing(f: F) -> Self {
        Self {
            f,
            minimizing: false,
            weights: Weights::default(),
        }
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }
}

impl<F> PairCostFunction for FnCost<F>
where
    F: Fn(usize, usize, f64, f64, &[f64], &[f64]) -> Result<f64, CostError> + Send + Sync,
{
    fn cost(
        &self,
        i: usize,
        j: usize,
        time_i: f64,
        time_j: f64,
        feature_i: &[f64],
        feature_j: &[f64],
    ) -> Result<f64, CostError> {
        (self.f)(i, j, time_i, time_j, feature_i, feature_j)
    }

    fn minimizing(&self) -> bool {
        self.minimizing
    }

    fn weights(&self) -> Weights {
        self.weights
    }
}

/// Minkowski distance of order `p`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LpDistance {
    p: f64,
    weights: Weights,
}

impl LpDistance {
    pub fn new(p: f64) -> WarpResult<Self> {
        if !p.is_finite() || p < 1.0 {
            return Err(WarpError::InvalidConfig {
                msg: format!("Lp order must be finite and >= 1, got {p}"),
            });
        }
        Ok(Self {
            p,
            weights: Weights::default(),
        })
    }

    pub fn euclidean() -> Self {
        Self {
            p: 2.0,
            weights: Weights::default(),
        }
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }
}

impl PairCostFunction for LpDistance {
    fn cost(
        &self,
        _i: usize,
        _j: usize,
        _time_i: f64,
        _time_j: f64,
        feature_i: &[f64],
        feature_j: &[f64],
    ) -> Result<f64, CostError> {
        let d = if self.p == 2.0 {
            kernels::squared_distance(feature_i, feature_j).sqrt()
        } else if self.p == 1.0 {
            feature_i
                .iter()
                .zip(feature_j)
                .map(|(a, b)| (a - b).abs())
                .sum()
        } else {
            feature_i
                .iter()
                .zip(feature_j)
                .map(|(a, b)| (a - b).abs().powf(self.p))
                .sum::<f64>()
                .powf(1.0 / self.p)
        };
        Ok(d)
    }

    fn minimizing(&self) -> bool {
        true
    }

    fn weights(&self) -> Weights {
        self.weights
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DotProduct {
    pub weights: Weights,
}

impl PairCostFunction for DotProduct {
    fn cost(
        &self,
        _i: usize,
        _j: usize,
        _time_i: f64,
        _time_j: f64,
        feature_i: &[f64],
        feature_j: &[f64],
    ) -> Result<f64, CostError> {
        Ok(kernels::dot(feature_i, feature_j))
    }

    fn minimizing(&self) -> bool {
        false
    }

    fn weights(&self) -> Weights {
        self.weights
    }
}

/// Cosine similarity; a zero vector on either side scores 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cosine {
    pub weights: Weights,
}

impl PairCostFunction for Cosine {
    fn cost(
        &self,
        _i: usize,
        _j: usize,
        _time_i: f64,
        _time_j: f64,
        feature_i: &[f64],
        feature_j: &[f64],
    ) -> Result<f64, CostError> {
        let norm = (kernels::dot(feature_i, feature_i) * kernels::dot(feature_j, feature_j)).sqrt();
        if norm == 0.0 {
            return Ok(0.0);
        }
        Ok(kernels::dot(feature_i, feature_j) / norm)
    }

    fn minimizing(&self) -> bool {
        false
    }

    fn weights(&self) -> Weights {
        self.weights
    }
}

/// Pearson product-moment correlation; constant vectors score 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PearsonCorrelation {
    pub weights: Weights,
}

impl PairCostFunction for PearsonCorrelation {
    fn cost(
        &self,
        _i: usize,
        _j: usize,
        _time_i: f64,
        _time_j: f64,
        feature_i: &[f64],
        feature_j: &[f64],
    ) -> Result<f64, CostError> {
        let mi = kernels::mean(feature_i);
        let mj = kernels::mean(feature_j);
        let mut cov = 0.0f64;
        let mut vi = 0.0f64;
        let mut vj = 0.0f64;
        for (a, b) in feature_i.iter().zip(feature_j) {
            let da = a - mi;
            let db = b - mj;
            cov += da * db;
            vi += da * da;
            vj += db * db;
        }
        let denom = (vi * vj).sqrt();
        if denom == 0.0 {
            return Ok(0.0);
        }
        Ok(cov / denom)
    }

    fn minimizing(&self) -> bool {
        false
    }

    fn weights(&self) -> Weights {
        self.weights
    }
}

/// Penalizes retention time differences: distances grow by
/// `lambda * |dt|`, similarities are damped by `exp(-dt^2 / (2 lambda^2))`.
#[derive(Clone, Debug)]
pub struct TimePenalized<C> {
    inner: C,
    lambda: f64,
}

impl<C: PairCostFunction> TimePenalized<C> {
    pub fn new(inner: C, lambda: f64) -> WarpResult<Self> {
        let ok = lambda.is_finite() && (lambda > 0.0 || (inner.minimizing() && lambda == 0.0));
        if !ok {
            return Err(WarpError::InvalidConfig {
                msg: format!("time penalty lambda must be finite and positive, got {lambda}"),
            });
        }
        Ok(Self { inner, lambda })
    }
}

impl<C: PairCostFunction> PairCostFunction for TimePenalized<C> {
    fn cost(
        &self,
        i: usize,
        j: usize,
        time_i: f64,
        time_j: f64,
        feature_i: &[f64],
        feature_j: &[f64],
    ) -> Result<f64, CostError> {
        let base = self.inner.cost(i, j, time_i, time_j, feature_i, feature_j)?;
        let dt = time_i - time_j;
        if self.inner.minimizing() {
            Ok(base + self.lambda * dt.abs())
        } else {
            Ok(base * (-(dt * dt) / (2.0 * self.lambda * self.lambda)).exp())
        }
    }

    fn minimizing(&self) -> bool {
        self.inner.minimizing()
    }

    fn weights(&self) -> Weights {
        self.inner.weights()
    }
}

/// Returns `outside` without consulting the inner function when the
/// retention times differ by more than `max_delta`.
#[derive(Clone, Debug)]
pub struct TimeGated<C> {
    inner: C,
    max_delta: f64,
    outside: f64,
}

impl<C: PairCostFunction> TimeGated<C> {
    pub fn new(inner: C, max_delta: f64, outside: f64) -> WarpResult<Self> {
        if !max_delta.is_finite() || max_delta < 0.0 {
            return Err(WarpError::InvalidConfig {
                msg: format!("time gate max_delta must be finite and >= 0, got {max_delta}"),
            });
        }
        if outside.is_nan() {
            return Err(WarpError::InvalidConfig {
                msg: "time gate outside value must not be NaN".into(),
            });
        }
        Ok(Self {
            inner,
            max_delta,
            outside,
        })
    }
}

impl<C: PairCostFunction> PairCostFunction for TimeGated<C> {
    fn cost(
        &self,
        i: usize,
        j: usize,
        time_i: f64,
        time_j: f64,
        feature_i: &[f64],
        feature_j: &[f64],
    ) -> Result<f64, CostError> {
        if (time_i - time_j).abs() > self.max_delta {
            return Ok(self.outside);
        }
        self.inner.cost(i, j, time_i, time_j, feature_i, feature_j)
    }

    fn minimizing(&self) -> bool {
        self.inner.minimizing()
    }

    fn weights(&self) -> Weights {
        self.inner.weights()
    }
}

#[cfg(test)]
mod tests;
