//! The chromosome/bin feature index and its overlap query modes.

use std::collections::HashMap;
use std::path::Path;

use log::warn;

use bedbins_core::errors::ReaderError;
use bedbins_core::models::{Feature, LineStatus};
use bedbins_core::reader::FeatureReader;

use crate::bins::{BinWalk, bin_for};

/// One overlap query result: the stored feature plus the intersection extent
/// with the query.
///
/// Extents live here, not on the stored record, so a built index can serve
/// concurrent queries without anyone writing into shared features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapHit {
    pub feature: Feature,
    /// Start of the intersection with the query (max of the two starts).
    pub overlap_start: u32,
    /// End of the intersection with the query (min of the two ends).
    pub overlap_end: u32,
}

///
/// An immutable spatial index over the features of one interval file.
///
/// Features are keyed by chromosome and genome bin, in read order within a
/// bin. Build it once from a reader (or path) and query it as often as
/// needed; the three query modes share one bin-walking traversal and differ
/// only in what they accumulate.
///
#[derive(Debug, Default)]
pub struct FeatureIndex {
    map: HashMap<String, HashMap<u32, Vec<Feature>>>,
    n_features: usize,
    n_malformed: usize,
}

impl FeatureIndex {
    ///
    /// Open `path` and index every valid feature in it.
    ///
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReaderError> {
        Self::from_reader(FeatureReader::open(path)?)
    }

    ///
    /// Consume a reader and index every valid feature it yields.
    ///
    /// Malformed lines are counted and logged with their data-line numbers;
    /// header and blank lines are skipped. The reader is fully drained and
    /// closed, so the index cannot be built twice from the same load.
    ///
    pub fn from_reader(mut reader: FeatureReader) -> Result<Self, ReaderError> {
        let mut index = FeatureIndex::default();
        while let Some(feature) = reader.next_feature()? {
            match feature.status {
                LineStatus::Valid => index.insert(feature),
                LineStatus::Malformed(ref kind) => {
                    index.n_malformed += 1;
                    warn!("skipping malformed line {}: {}", reader.line_number(), kind);
                }
                LineStatus::Header | LineStatus::Blank => {}
            }
        }
        reader.close();
        Ok(index)
    }

    ///
    /// Index caller-synthesized features directly, bypassing file parsing.
    ///
    /// Only records whose status is valid are stored.
    ///
    pub fn from_features<I: IntoIterator<Item = Feature>>(features: I) -> Self {
        let mut index = FeatureIndex::default();
        for feature in features {
            if feature.status.is_valid() {
                index.insert(feature);
            }
        }
        index
    }

    fn insert(&mut self, feature: Feature) {
        let bin = bin_for(feature.start, feature.end);
        self.map
            .entry(feature.chrom.clone())
            .or_default()
            .entry(bin)
            .or_default()
            .push(feature);
        self.n_features += 1;
    }

    /// Number of indexed features.
    pub fn len(&self) -> usize {
        self.n_features
    }

    pub fn is_empty(&self) -> bool {
        self.n_features == 0
    }

    /// Number of malformed lines skipped while loading.
    pub fn malformed_count(&self) -> usize {
        self.n_malformed
    }

    ///
    /// Every feature overlapping `query`, each annotated with the
    /// intersection extent.
    ///
    /// With `same_strand`, only records whose strand string equals the
    /// query's qualify (two `"."` records count as same-strand). A record
    /// qualifies when its overlap with the query, as a fraction of the
    /// query's own length, reaches `min_overlap_fraction`; see
    /// [`Feature::overlaps_by_fraction`] for the zero-length and bookended
    /// edge cases.
    ///
    pub fn all_hits(
        &self,
        query: &Feature,
        same_strand: bool,
        min_overlap_fraction: f64,
    ) -> Vec<OverlapHit> {
        self.candidates(query)
            .filter_map(|candidate| {
                evaluate(query, candidate, same_strand, min_overlap_fraction).map(
                    |(overlap_start, overlap_end)| OverlapHit {
                        feature: candidate.clone(),
                        overlap_start,
                        overlap_end,
                    },
                )
            })
            .collect()
    }

    ///
    /// Whether at least one record overlaps `query`. Stops at the first hit.
    ///
    pub fn any_hit(&self, query: &Feature, same_strand: bool, min_overlap_fraction: f64) -> bool {
        self.candidates(query)
            .any(|candidate| evaluate(query, candidate, same_strand, min_overlap_fraction).is_some())
    }

    ///
    /// How many records overlap `query`. Visits every candidate.
    ///
    pub fn count_hits(
        &self,
        query: &Feature,
        same_strand: bool,
        min_overlap_fraction: f64,
    ) -> usize {
        self.candidates(query)
            .filter(|candidate| {
                evaluate(query, candidate, same_strand, min_overlap_fraction).is_some()
            })
            .count()
    }

    /// All stored features in the bins the query's span touches, walked
    /// finest level to coarsest, in insertion order within each bin.
    fn candidates<'a>(&'a self, query: &Feature) -> impl Iterator<Item = &'a Feature> + 'a {
        let (start, end) = (query.start, query.end);
        self.map.get(&query.chrom).into_iter().flat_map(move |bins| {
            BinWalk::new(start, end).flat_map(move |bin| {
                bins.get(&bin)
                    .map(|bucket| bucket.as_slice())
                    .unwrap_or_default()
                    .iter()
            })
        })
    }
}

fn evaluate(
    query: &Feature,
    candidate: &Feature,
    same_strand: bool,
    min_overlap_fraction: f64,
) -> Option<(u32, u32)> {
    if same_strand && !query.same_strand(candidate) {
        return None;
    }
    if !query.overlaps_by_fraction(candidate, min_overlap_fraction) {
        return None;
    }
    Some((
        query.start.max(candidate.start),
        query.end.min(candidate.end),
    ))
}
