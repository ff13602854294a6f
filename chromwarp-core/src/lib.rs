#[macro_use]
mod par;

pub mod align;
pub mod anchors;
pub mod config;
pub mod cost;
pub mod error;
pub mod io;
pub mod matrix;
pub mod series;

pub use align::{traceback, Aligner, Alignment, CancelToken, Predecessor, PredecessorGrid, WarpPath};
pub use anchors::{pair_by_name, Anchor, AnchorPair, AnchorPairSet, AnchorPoint};
pub use config::AlignConfig;
pub use cost::{PairCostFunction, Weights};
pub use error::{CostError, ErrorKind, WarpError, WarpResult};
pub use io::read_anchor_csv;
pub use matrix::{BandLayout, BandedMatrix};
pub use series::{FeatureSeries, MassRange};
