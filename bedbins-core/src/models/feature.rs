use std::fmt::{self, Display};

use crate::errors::MalformedKind;
use crate::parser;

/// The file format established for a stream of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    /// No data line has been seen yet.
    #[default]
    Unknown,
    Bed,
    Gff,
    Vcf,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Unknown => "unknown",
            FileType::Bed => "bed",
            FileType::Gff => "gff",
            FileType::Vcf => "vcf",
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of parsing one line.
///
/// End of stream is not a status: the reader signals it by returning `None`,
/// so "no more data" can never be confused with a bad line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineStatus {
    /// The line held no tokens at all.
    Blank,
    /// A `track`, `browser`, or `#` line. Never indexed, never queried.
    Header,
    /// A well-formed data line; the record's coordinate fields are usable.
    Valid,
    /// The line failed structural or coordinate validation.
    Malformed(MalformedKind),
}

impl LineStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, LineStatus::Valid)
    }
}

///
/// Feature struct, the normalized representation of one BED/GFF/VCF record.
///
/// Coordinates are always 0-based half-open regardless of the source format;
/// `name`, `score`, and `strand` default to `"."` when the source has no such
/// column. The verbatim tokens of the line are kept in `raw_fields` so a
/// caller can re-serialize the original content.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
    pub name: String,
    pub score: String,
    pub strand: String,

    /// Columns beyond the canonical six (BED), or the format-specific
    /// remainder (VCF: tokens 2.., GFF: source/frame/group).
    pub other_fields: Vec<String>,
    /// The whitespace-split tokens of the source line, verbatim.
    pub raw_fields: Vec<String>,

    /// Number of columns established for this record's stream.
    pub field_count: u16,
    pub file_type: FileType,
    pub status: LineStatus,
}

impl Feature {
    ///
    /// Build a feature from bare coordinates (a BED3-equivalent record).
    ///
    pub fn new<S: Into<String>>(chrom: S, start: u32, end: u32) -> Self {
        Feature {
            chrom: chrom.into(),
            start,
            end,
            name: ".".to_string(),
            score: ".".to_string(),
            strand: ".".to_string(),
            other_fields: Vec::new(),
            raw_fields: Vec::new(),
            field_count: 3,
            file_type: FileType::Unknown,
            status: LineStatus::Valid,
        }
    }

    ///
    /// Build a feature from coordinates plus a strand annotation.
    ///
    pub fn with_strand<S: Into<String>>(chrom: S, start: u32, end: u32, strand: S) -> Self {
        let mut feature = Feature::new(chrom, start, end);
        feature.strand = strand.into();
        feature.field_count = 6;
        feature
    }

    ///
    /// Build a full BED6 feature.
    ///
    pub fn bed6<S: Into<String>>(chrom: S, start: u32, end: u32, name: S, score: S, strand: S) -> Self {
        let mut feature = Feature::new(chrom, start, end);
        feature.name = name.into();
        feature.score = score.into();
        feature.strand = strand.into();
        feature.field_count = 6;
        feature
    }

    /// Length of the feature in base pairs.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// True for zero-length point features (`start == end`).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Signed overlap with another feature: `min(ends) - max(starts)`.
    ///
    /// Negative when the features are disjoint; the magnitude is then the
    /// gap between them. Zero for bookended features.
    pub fn overlap_with(&self, other: &Feature) -> i64 {
        i64::from(self.end.min(other.end)) - i64::from(self.start.max(other.start))
    }

    /// Overlap-fraction test with `self` as the query.
    ///
    /// The fraction is `overlap / len(self)`. A zero-length query is handled
    /// before any division: it hits exactly when the overlap is zero, i.e.
    /// when `other` touches its coordinate, at any threshold. With the
    /// conventional threshold of 0.0, bookended features (overlap exactly
    /// zero) count as hits.
    pub fn overlaps_by_fraction(&self, other: &Feature, min_overlap_fraction: f64) -> bool {
        let overlap = self.overlap_with(other);
        let size = i64::from(self.len());
        if size == 0 {
            return overlap == 0;
        }
        overlap as f64 / size as f64 >= min_overlap_fraction
    }

    /// Exact strand equality; two `"."` annotations count as the same strand.
    pub fn same_strand(&self, other: &Feature) -> bool {
        self.strand == other.strand
    }

    ///
    /// Look up a raw column by its canonical per-format name (e.g. `"start"`
    /// for BED, `"pos"` for VCF, `"attributes"` for GFF).
    ///
    pub fn field(&self, name: &str) -> Option<&str> {
        parser::field_column(self.file_type, name)
            .and_then(|idx| self.raw_fields.get(idx))
            .map(String::as_str)
    }

    ///
    /// Re-serialize the record in its normalized on-disk form.
    ///
    /// BED emits the canonical columns for its established width; GFF and VCF
    /// restore their 1-based start before emitting. This is the counterpart
    /// of the verbatim [`Display`] form, which joins `raw_fields`.
    ///
    pub fn report(&self) -> String {
        match self.file_type {
            FileType::Bed | FileType::Unknown => {
                let mut out = format!("{}\t{}\t{}", self.chrom, self.start, self.end);
                if self.field_count >= 4 {
                    out.push('\t');
                    out.push_str(&self.name);
                }
                if self.field_count >= 5 {
                    out.push('\t');
                    out.push_str(&self.score);
                }
                if self.field_count >= 6 {
                    out.push('\t');
                    out.push_str(&self.strand);
                }
                for other in &self.other_fields {
                    out.push('\t');
                    out.push_str(other);
                }
                out
            }
            FileType::Vcf => {
                let mut out = format!("{}\t{}", self.chrom, self.start + 1);
                for other in &self.other_fields {
                    out.push('\t');
                    out.push_str(other);
                }
                out
            }
            FileType::Gff => {
                let missing = ".".to_string();
                let source = self.other_fields.first().unwrap_or(&missing);
                let frame = self.other_fields.get(1).unwrap_or(&missing);
                let group = self.other_fields.get(2).unwrap_or(&missing);
                format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    self.chrom,
                    source,
                    self.name,
                    self.start + 1,
                    self.end,
                    self.score,
                    self.strand,
                    frame,
                    group,
                )
            }
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raw_fields.is_empty() {
            // synthesized records have no source line to round-trip
            write!(f, "{}", self.report())
        } else {
            write!(f, "{}", self.raw_fields.join("\t"))
        }
    }
}
