//! Core infrastructure for bedbins: parsing and streaming of genomic interval files.
//!
//! This crate provides the record model, line parser, and streaming reader shared by
//! the rest of the [bedbins](https://github.com/databio/bedbins) workspace. It turns
//! lines of BED, GFF, or VCF text into normalized [`Feature`](models::Feature) records
//! with 0-based half-open coordinates, auto-detecting the format from the first data
//! line and enforcing it for the remainder of the stream.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bedbins_core::reader::FeatureReader;
//!
//! let mut reader = FeatureReader::open("peaks.bed").unwrap();
//! while let Some(feature) = reader.next_feature().unwrap() {
//!     if feature.status.is_valid() {
//!         println!("{}:{}-{}", feature.chrom, feature.start, feature.end);
//!     }
//! }
//! ```
pub mod errors;
pub mod models;
pub mod parser;
pub mod reader;

// re-exports for cleaner imports
pub use self::errors::{MalformedKind, ReaderError};
pub use self::models::{Feature, FileType, LineStatus};
pub use self::reader::FeatureReader;
