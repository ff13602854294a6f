pub mod anchors;

pub use anchors::read_anchor_csv;
