//! Hierarchical binning and overlap queries for genomic interval files.
//!
//! This crate holds the spatial index behind
//! [bedbins](https://github.com/databio/bedbins): every feature read from a
//! BED/GFF/VCF file is assigned to exactly one bin of a fixed 7-level,
//! 512 Mbp binning hierarchy, and overlap queries walk only the bins that
//! could possibly hold an overlapping feature at each resolution.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bedbins_core::models::Feature;
//! use bedbins_overlap::FeatureIndex;
//!
//! // index a database file once
//! let index = FeatureIndex::from_path("annotations.bed").unwrap();
//!
//! // query it as often as needed
//! let query = Feature::new("chr1", 100, 200);
//! for hit in index.all_hits(&query, false, 0.0) {
//!     println!("{} overlaps {}..{}", hit.feature, hit.overlap_start, hit.overlap_end);
//! }
//! ```
//!
//! A built [`FeatureIndex`] is read-only and safe to share across threads;
//! overlap extents come back in per-query [`OverlapHit`] values instead of
//! being written into the stored records.

/// The fixed binning scheme.
///
/// See [`bin_for`](bins::bin_for) and [`BinWalk`](bins::BinWalk) for details.
pub mod bins;

/// The chromosome/bin index and its query modes.
///
/// See [`FeatureIndex`] for the main type.
pub mod index;

// re-exports
pub use self::bins::{BIN_FIRST_SHIFT, BIN_NEXT_SHIFT, BIN_OFFSETS, NUM_BINS, SENTINEL_BIN};
pub use self::index::{FeatureIndex, OverlapHit};

/// Constants used throughout the crate.
pub mod consts {
    /// The command name for overlap operations.
    pub const OVERLAP_CMD: &str = "overlap";
}
