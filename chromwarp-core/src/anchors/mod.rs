//! Anchors are named scan indices that must correspond between two series.
//! Row indices refer to the first series, column indices to the second.

use std::collections::{HashMap, HashSet};

use log::{debug, trace, warn};

use crate::error::{WarpError, WarpResult};

pub const START: &str = "START";
pub const END: &str = "END";

/// A named marker on one series. Scans are kept signed so that malformed
/// input can be reported instead of wrapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub name: Box<str>,
    pub scan: i64,
}

impl Anchor {
    pub fn new(name: impl Into<Box<str>>, scan: i64) -> Self {
        Self {
            name: name.into(),
            scan,
        }
    }
}

/// Raw correspondence `row <-> col` between two anchors sharing a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorPair {
    pub name: Box<str>,
    pub row: i64,
    pub col: i64,
}

impl AnchorPair {
    pub fn new(name: impl Into<Box<str>>, row: i64, col: i64) -> Self {
        Self {
            name: name.into(),
            row,
            col,
        }
    }
}

/// Validated correspondence inside the alignment matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorPoint {
    pub name: Box<str>,
    pub row: usize,
    pub col: usize,
}

impl AnchorPoint {
    fn new(name: &str, row: usize, col: usize) -> Self {
        Self {
            name: name.into(),
            row,
            col,
        }
    }
}

/// Matches anchors of two series by label, in the order of `left`.
/// Labels missing from either side are discarded; duplicate labels keep
/// their first occurrence.
pub fn pair_by_name(left: &[Anchor], right: &[Anchor]) -> Vec<AnchorPair> {
    let mut by_name: HashMap<&str, i64> = HashMap::with_capacity(right.len());
    for anchor in right {
        by_name.entry(anchor.name.as_ref()).or_insert(anchor.scan);
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(left.len());
    let mut pairs = Vec::with_capacity(left.len().min(right.len()));
    for anchor in left {
        if !seen.insert(anchor.name.as_ref()) {
            trace!("duplicate anchor label '{}' ignored", anchor.name);
            continue;
        }
        match by_name.get(anchor.name.as_ref()) {
            Some(&col) => pairs.push(AnchorPair::new(anchor.name.clone(), anchor.scan, col)),
            None => warn!("anchor '{}' has no partner and is discarded", anchor.name),
        }
    }
    for anchor in right {
        if !seen.contains(anchor.name.as_ref()) {
            warn!("anchor '{}' has no partner and is discarded", anchor.name);
        }
    }
    pairs
}

/// Monotone anchor path from `(0, 0)` to `(rows - 1, cols - 1)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorPairSet {
    points: Vec<AnchorPoint>,
    rows: usize,
    cols: usize,
}

impl AnchorPairSet {
    /// The trivial set `{START, END}`.
    pub fn endpoints(rows: usize, cols: usize) -> WarpResult<Self> {
        Self::build(&[], rows, cols, 0)
    }

    pub fn build(
        raw: &[AnchorPair],
        rows: usize,
        cols: usize,
        min_spacing: usize,
    ) -> WarpResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(WarpError::InvalidConfig {
                msg: format!("anchor set needs a non-empty matrix, got {rows}x{cols}"),
            });
        }
        for pair in raw {
            if pair.row < 0 || pair.col < 0 {
                return Err(WarpError::NegativeScanIndex {
                    name: pair.name.to_string(),
                    index: pair.row.min(pair.col),
                });
            }
        }

        let end = (rows - 1, cols - 1);
        if raw.is_empty() {
            return Ok(Self {
                points: vec![AnchorPoint::new(START, 0, 0), AnchorPoint::new(END, end.0, end.1)],
                rows,
                cols,
            });
        }

        let mut points = vec![AnchorPoint::new(START, 0, 0)];
        let first = &raw[0];
        let rest = if first.row == 0 && first.col == 0 {
            &raw[1..]
        } else if first.row <= 1 || first.col <= 1 {
            trace!(
                "anchor '{}' at ({}, {}) is too close to the origin",
                first.name,
                first.row,
                first.col
            );
            &raw[1..]
        } else {
            raw
        };

        let spacing = min_spacing as i64;
        let mut dropped = 0usize;
        for pair in rest {
            let prev = &points[points.len() - 1];
            if pair.row - prev.row as i64 >= spacing && pair.col - prev.col as i64 >= spacing {
                points.push(AnchorPoint {
                    name: pair.name.clone(),
                    row: pair.row as usize,
                    col: pair.col as usize,
                });
            } else {
                trace!(
                    "anchor '{}' at ({}, {}) violates spacing {} after '{}'",
                    pair.name,
                    pair.row,
                    pair.col,
                    min_spacing,
                    prev.name
                );
                dropped += 1;
            }
        }

        close_path(&mut points, end, min_spacing)?;
        debug!(
            "anchor set for {}x{}: {} points kept, {} dropped",
            rows,
            cols,
            points.len(),
            dropped
        );
        Ok(Self { points, rows, cols })
    }

    pub fn points(&self) -> &[AnchorPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnchorPoint> {
        self.points.iter()
    }

    /// The anchors bracketing `row`: the last point at or above it and the
    /// next point strictly below it, if any.
    pub fn segment(&self, row: usize) -> (&AnchorPoint, Option<&AnchorPoint>) {
        let idx = self.points.partition_point(|p| p.row <= row);
        // START sits on row 0, so idx >= 1
        let a = &self.points[idx - 1];
        (a, self.points.get(idx))
    }

    /// Column of the piecewise-linear anchor path at `row`.
    pub fn ideal_column(&self, row: usize) -> f64 {
        match self.segment(row) {
            (a, Some(b)) => {
                let t = (row - a.row) as f64 / (b.row - a.row) as f64;
                a.col as f64 + t * (b.col as f64 - a.col as f64)
            }
            (a, None) => a.col as f64,
        }
    }
}

fn close_path(
    points: &mut Vec<AnchorPoint>,
    end: (usize, usize),
    min_spacing: usize,
) -> WarpResult<()> {
    let last = &points[points.len() - 1];
    if points.len() == 1 {
        // only START survived; it is never replaced
        points.push(AnchorPoint::new(END, end.0, end.1));
        return Ok(());
    }
    if (last.row, last.col) == end {
        if let Some(p) = points.last_mut() {
            p.name = END.into();
        }
        return Ok(());
    }
    if last.row <= end.0 && last.col <= end.1 {
        if end.0 - last.row < min_spacing || end.1 - last.col < min_spacing {
            trace!("anchor '{}' is too close to the end and is replaced", last.name);
            points.pop();
        }
        points.push(AnchorPoint::new(END, end.0, end.1));
        return Ok(());
    }
    Err(WarpError::ConstraintViolation {
        msg: format!(
            "anchor '{}' at ({}, {}) lies beyond the matrix end ({}, {})",
            last.name, last.row, last.col, end.0, end.1
        ),
    })
}
