//! Line parsing and format auto-detection.
//!
//! The first non-header, non-blank line of a stream decides whether the file
//! is BED, VCF, or GFF; every later line is parsed against that format and
//! must carry the same number of columns. SAM-like input is refused with an
//! explicit error instead of being misread as one of the supported formats.

use thiserror::Error;

use crate::errors::MalformedKind;
use crate::models::{Feature, FileType, LineStatus};

/// Raised when the stream is in a format this engine refuses to guess at.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("input looks like SAM; convert to BED, GFF, or VCF first")]
    UnsupportedFormat,
}

/// Split a line into tokens: on tabs when any are present, otherwise on runs
/// of whitespace. Joining the tokens with tabs reproduces the line with its
/// whitespace normalized.
pub fn tokenize(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.contains('\t') {
        line.split('\t').map(str::to_string).collect()
    } else {
        line.split_whitespace().map(str::to_string).collect()
    }
}

/// Per-format mapping from canonical field names to raw column indices.
///
/// Owned by the parser component and keyed by the format tag; there is no
/// global mutable lookup state.
pub fn field_column(file_type: FileType, name: &str) -> Option<usize> {
    let idx = match file_type {
        FileType::Bed | FileType::Unknown => match name {
            "chrom" => 0,
            "start" => 1,
            "end" => 2,
            "name" => 3,
            "score" => 4,
            "strand" => 5,
            _ => return None,
        },
        FileType::Gff => match name {
            "chrom" | "seqname" => 0,
            "source" => 1,
            "feature" => 2,
            "start" => 3,
            "end" => 4,
            "score" => 5,
            "strand" => 6,
            "frame" => 7,
            "attributes" => 8,
            _ => return None,
        },
        FileType::Vcf => match name {
            "chrom" => 0,
            "pos" => 1,
            "id" => 2,
            "ref" => 3,
            "alt" => 4,
            "qual" => 5,
            "filter" => 6,
            "info" => 7,
            _ => return None,
        },
    };
    Some(idx)
}

///
/// Stateful per-stream line parser.
///
/// Format and expected column count are fixed by the first data line and
/// enforced for the remainder of the stream; a later line with a different
/// column count is malformed rather than silently reinterpreted.
///
#[derive(Debug, Default)]
pub struct LineParser {
    file_type: FileType,
    field_count: u16,
}

impl LineParser {
    pub fn new() -> Self {
        LineParser::default()
    }

    /// The format established for this stream, `Unknown` before the first
    /// data line.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// The column count established for this stream, 0 before the first
    /// data line.
    pub fn field_count(&self) -> u16 {
        self.field_count
    }

    ///
    /// Parse one tokenized line into a [`Feature`].
    ///
    /// Blank, header, and malformed lines come back as records with the
    /// matching [`LineStatus`]; only an unsupported stream format (SAM-like
    /// input) is an error, since no later line can recover from it.
    ///
    pub fn parse_line(&mut self, fields: Vec<String>) -> Result<Feature, ParserError> {
        if fields.is_empty() {
            return Ok(self.record(fields, LineStatus::Blank));
        }
        if is_header_token(&fields[0]) {
            return Ok(self.record(fields, LineStatus::Header));
        }
        if self.file_type == FileType::Unknown {
            self.detect_and_parse(fields)
        } else {
            Ok(self.parse_known(fields))
        }
    }

    /// First data line: decide the format, then parse under it.
    fn detect_and_parse(&mut self, fields: Vec<String>) -> Result<Feature, ParserError> {
        if fields[0].starts_with('@') {
            // SAM header line
            return Err(ParserError::UnsupportedFormat);
        }
        if fields.len() == 1 {
            return Ok(self.malformed(fields, MalformedKind::SingleToken));
        }
        if fields.len() < 3 {
            return Ok(self.malformed(fields, MalformedKind::UnknownFormat));
        }

        // BED when columns 2 and 3 are plain integers
        if is_integer(&fields[1]) && is_integer(&fields[2]) {
            self.establish(FileType::Bed, fields.len());
            return Ok(self.parse_bed(fields));
        }
        // SAM alignment rows would otherwise satisfy the VCF test below
        if looks_like_sam(&fields) {
            return Err(ParserError::UnsupportedFormat);
        }
        // VCF when the position column is an integer and >= 8 columns exist
        if is_integer(&fields[1]) && fields.len() >= 8 {
            self.establish(FileType::Vcf, fields.len());
            return Ok(self.parse_vcf(fields));
        }
        // GFF when columns 4 and 5 are integers in a >= 9 column line
        if fields.len() >= 9 && is_integer(&fields[3]) && is_integer(&fields[4]) {
            self.establish(FileType::Gff, fields.len());
            return Ok(self.parse_gff(fields));
        }

        Ok(self.malformed(fields, MalformedKind::UnknownFormat))
    }

    /// Later data lines: the format is fixed, only the column count can vary.
    fn parse_known(&mut self, fields: Vec<String>) -> Feature {
        if fields.len() == 1 {
            return self.malformed(fields, MalformedKind::SingleToken);
        }
        if fields.len() != usize::from(self.field_count) {
            let found = fields.len() as u16;
            return self.malformed(
                fields,
                MalformedKind::FieldCountMismatch {
                    expected: self.field_count,
                    found,
                },
            );
        }
        match self.file_type {
            FileType::Bed => self.parse_bed(fields),
            FileType::Vcf => self.parse_vcf(fields),
            FileType::Gff => self.parse_gff(fields),
            FileType::Unknown => unreachable!("parse_known called before detection"),
        }
    }

    fn parse_bed(&self, fields: Vec<String>) -> Feature {
        let (Some(start), Some(end)) = (parse_coord(&fields[1]), parse_coord(&fields[2])) else {
            return self.malformed(fields, MalformedKind::BadCoordinate);
        };
        if start > end {
            return self.malformed(fields, MalformedKind::ReversedCoordinates);
        }

        let mut feature = self.record(Vec::new(), LineStatus::Valid);
        feature.chrom = fields[0].clone();
        feature.start = start;
        feature.end = end;
        if fields.len() >= 4 {
            feature.name = fields[3].clone();
        }
        if fields.len() >= 5 {
            feature.score = fields[4].clone();
        }
        if fields.len() >= 6 {
            feature.strand = fields[5].clone();
        }
        if fields.len() > 6 {
            feature.other_fields = fields[6..].to_vec();
        }
        feature.raw_fields = fields;
        feature
    }

    fn parse_vcf(&self, fields: Vec<String>) -> Feature {
        // VCF is 1-based; the record spans the reference allele
        let Some(start) = parse_coord(&fields[1]).and_then(|pos| pos.checked_sub(1)) else {
            return self.malformed(fields, MalformedKind::BadCoordinate);
        };
        let end = start + fields[3].len() as u32;

        let mut name = format!("{}/{}", fields[3], fields[4]);
        if fields[2] != "." {
            name.push('_');
            name.push_str(&fields[2]);
        }

        let mut feature = self.record(Vec::new(), LineStatus::Valid);
        feature.chrom = fields[0].clone();
        feature.start = start;
        feature.end = end;
        feature.name = name;
        feature.strand = "+".to_string();
        feature.other_fields = fields[2..].to_vec();
        feature.raw_fields = fields;
        feature
    }

    fn parse_gff(&self, fields: Vec<String>) -> Feature {
        // GFF is 1-based inclusive; only the start moves when normalizing
        let (Some(start), Some(end)) = (
            parse_coord(&fields[3]).and_then(|pos| pos.checked_sub(1)),
            parse_coord(&fields[4]),
        ) else {
            return self.malformed(fields, MalformedKind::BadCoordinate);
        };
        if start > end {
            return self.malformed(fields, MalformedKind::ReversedCoordinates);
        }

        let mut feature = self.record(Vec::new(), LineStatus::Valid);
        feature.chrom = fields[0].clone();
        feature.start = start;
        feature.end = end;
        feature.name = fields[2].clone();
        feature.score = fields[5].clone();
        feature.strand = fields[6].clone();
        feature.other_fields = vec![fields[1].clone(), fields[7].clone(), fields[8].clone()];
        feature.raw_fields = fields;
        feature
    }

    fn establish(&mut self, file_type: FileType, field_count: usize) {
        self.file_type = file_type;
        self.field_count = field_count as u16;
    }

    fn record(&self, fields: Vec<String>, status: LineStatus) -> Feature {
        Feature {
            chrom: String::new(),
            start: 0,
            end: 0,
            name: ".".to_string(),
            score: ".".to_string(),
            strand: ".".to_string(),
            other_fields: Vec::new(),
            raw_fields: fields,
            field_count: self.field_count,
            file_type: self.file_type,
            status,
        }
    }

    fn malformed(&self, fields: Vec<String>, kind: MalformedKind) -> Feature {
        self.record(fields, LineStatus::Malformed(kind))
    }
}

fn is_header_token(token: &str) -> bool {
    token.starts_with("track") || token.starts_with("browser") || token.starts_with('#')
}

/// All ASCII digits, no sign. Mirrors the reference engine's integer test, so
/// `-5` or `+5` in a coordinate column is not an integer here.
fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_coord(s: &str) -> Option<u32> {
    if is_integer(s) { s.parse().ok() } else { None }
}

fn looks_like_sam(fields: &[String]) -> bool {
    fields.len() >= 11
        && is_integer(&fields[1])
        && is_integer(&fields[3])
        && is_integer(&fields[4])
        && is_cigar(&fields[5])
}

fn is_cigar(s: &str) -> bool {
    if s == "*" {
        return true;
    }
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_digit() || "MIDNSHP=X".contains(c))
        && s.chars().any(|c| !c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn fields_of(line: &str) -> Vec<String> {
        tokenize(line)
    }

    fn parse(parser: &mut LineParser, line: &str) -> Feature {
        parser.parse_line(fields_of(line)).unwrap()
    }

    #[rstest]
    fn test_tokenize_normalizes_whitespace() {
        assert_eq!(tokenize("chr1  100   200"), vec!["chr1", "100", "200"]);
        assert_eq!(tokenize("chr1\t100\t200\n"), vec!["chr1", "100", "200"]);
        assert_eq!(tokenize(""), Vec::<String>::new());
        assert_eq!(tokenize("   \n"), Vec::<String>::new());
    }

    #[rstest]
    fn test_tokenize_keeps_spaces_inside_tab_columns() {
        let fields = tokenize("chr1\tcurated\tgene\t11\t200\t.\t+\t.\tgene_id \"abc\"");
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[8], "gene_id \"abc\"");
    }

    #[rstest]
    #[case("chr1\t100\t200", 3)]
    #[case("chr1\t100\t200\tfeat1", 4)]
    #[case("chr1\t100\t200\tfeat1\t0", 5)]
    #[case("chr1\t100\t200\tfeat1\t0\t+", 6)]
    fn test_detects_bed_widths(#[case] line: &str, #[case] expected_fields: u16) {
        let mut parser = LineParser::new();
        let feature = parse(&mut parser, line);

        assert_eq!(parser.file_type(), FileType::Bed);
        assert_eq!(parser.field_count(), expected_fields);
        assert_eq!(feature.status, LineStatus::Valid);
        assert_eq!(feature.chrom, "chr1");
        assert_eq!(feature.start, 100);
        assert_eq!(feature.end, 200);
    }

    #[rstest]
    fn test_bed_defaults_and_extras() {
        let mut parser = LineParser::new();
        let bed3 = parse(&mut parser, "chr1\t100\t200");
        assert_eq!(bed3.name, ".");
        assert_eq!(bed3.score, ".");
        assert_eq!(bed3.strand, ".");

        let mut parser = LineParser::new();
        let wide = parse(&mut parser, "chr1\t32481\t32787\tpeak_1\t92\t.\t7.69\t13.22\t9.25\t155");
        assert_eq!(wide.name, "peak_1");
        assert_eq!(wide.score, "92");
        assert_eq!(wide.strand, ".");
        assert_eq!(wide.other_fields, vec!["7.69", "13.22", "9.25", "155"]);
        assert_eq!(wide.raw_fields.len(), 10);
    }

    #[rstest]
    fn test_detects_vcf() {
        let mut parser = LineParser::new();
        let line = "chr1\t14397\trs756427959\tCTGT\tC\t31\tPASS\tDP=100";
        let feature = parse(&mut parser, line);

        assert_eq!(parser.file_type(), FileType::Vcf);
        assert_eq!(feature.status, LineStatus::Valid);
        assert_eq!(feature.start, 14396);
        assert_eq!(feature.end, 14396 + 4);
        assert_eq!(feature.strand, "+");
        assert_eq!(feature.name, "CTGT/C_rs756427959");
        assert_eq!(feature.other_fields[0], "rs756427959");
    }

    #[rstest]
    fn test_vcf_name_without_id() {
        let mut parser = LineParser::new();
        let feature = parse(&mut parser, "chr1\t100\t.\tA\tG\t.\t.\t.");
        assert_eq!(feature.name, "A/G");
        assert_eq!(feature.start, 99);
        assert_eq!(feature.end, 100);
    }

    #[rstest]
    fn test_detects_gff() {
        let mut parser = LineParser::new();
        let line = "chr22\tcurated\tCDS\t1000\t2000\t100\t+\t0\tgene_id=grail1";
        let feature = parse(&mut parser, line);

        assert_eq!(parser.file_type(), FileType::Gff);
        assert_eq!(feature.status, LineStatus::Valid);
        assert_eq!(feature.start, 999);
        assert_eq!(feature.end, 2000);
        assert_eq!(feature.name, "CDS");
        assert_eq!(feature.score, "100");
        assert_eq!(feature.strand, "+");
        assert_eq!(feature.other_fields, vec!["curated", "0", "gene_id=grail1"]);
    }

    #[rstest]
    fn test_gff_raw_start_is_one_based() {
        let mut parser = LineParser::new();
        let feature = parse(&mut parser, "chr22\tsrc\texon\t1000\t2000\t.\t-\t.\tid=1");
        assert_eq!(feature.raw_fields[3], (feature.start + 1).to_string());
    }

    #[rstest]
    #[case("track name=\"pairedReads\"")]
    #[case("browser position chr7:127471196-127495720")]
    #[case("# a comment")]
    #[case("#gff-version 2")]
    fn test_header_lines(#[case] line: &str) {
        let mut parser = LineParser::new();
        let feature = parse(&mut parser, line);
        assert_eq!(feature.status, LineStatus::Header);
        assert_eq!(parser.file_type(), FileType::Unknown);
    }

    #[rstest]
    fn test_blank_line() {
        let mut parser = LineParser::new();
        let feature = parse(&mut parser, "   ");
        assert_eq!(feature.status, LineStatus::Blank);
    }

    #[rstest]
    fn test_two_tokens_is_malformed() {
        let mut parser = LineParser::new();
        let feature = parse(&mut parser, "chr1\t100");
        assert_eq!(
            feature.status,
            LineStatus::Malformed(MalformedKind::UnknownFormat)
        );
    }

    #[rstest]
    fn test_single_token_is_distinguishable() {
        let mut parser = LineParser::new();
        let feature = parse(&mut parser, "chr1:100-200");
        assert_eq!(
            feature.status,
            LineStatus::Malformed(MalformedKind::SingleToken)
        );
    }

    #[rstest]
    fn test_field_count_enforced_after_detection() {
        let mut parser = LineParser::new();
        parse(&mut parser, "chr1\t100\t200\tfeat1\t0\t+");
        let feature = parse(&mut parser, "chr1\t300\t400");
        assert_eq!(
            feature.status,
            LineStatus::Malformed(MalformedKind::FieldCountMismatch {
                expected: 6,
                found: 3
            })
        );
        // the established format does not change
        assert_eq!(parser.file_type(), FileType::Bed);
        assert_eq!(parser.field_count(), 6);
    }

    #[rstest]
    fn test_reversed_coordinates_are_malformed() {
        let mut parser = LineParser::new();
        parse(&mut parser, "chr1\t100\t200");
        let feature = parse(&mut parser, "chr1\t500\t400");
        assert_eq!(
            feature.status,
            LineStatus::Malformed(MalformedKind::ReversedCoordinates)
        );
    }

    #[rstest]
    fn test_zero_length_bed_record_is_valid() {
        let mut parser = LineParser::new();
        let feature = parse(&mut parser, "chr1\t100\t100");
        assert_eq!(feature.status, LineStatus::Valid);
        assert_eq!(feature.len(), 0);
    }

    #[rstest]
    fn test_bad_coordinate_on_later_line() {
        let mut parser = LineParser::new();
        parse(&mut parser, "chr1\t100\t200");
        let feature = parse(&mut parser, "chr1\t1e5\t200");
        assert_eq!(
            feature.status,
            LineStatus::Malformed(MalformedKind::BadCoordinate)
        );
    }

    #[rstest]
    fn test_sam_header_is_unsupported() {
        let mut parser = LineParser::new();
        let result = parser.parse_line(fields_of("@SQ\tSN:chr1\tLN:248956422"));
        assert_eq!(result, Err(ParserError::UnsupportedFormat));
    }

    #[rstest]
    fn test_sam_alignment_is_unsupported() {
        let mut parser = LineParser::new();
        let line = "read1\t0\tchr1\t100\t60\t50M\t*\t0\t0\tACGT\tFFFF";
        let result = parser.parse_line(fields_of(line));
        assert_eq!(result, Err(ParserError::UnsupportedFormat));
    }

    #[rstest]
    fn test_vcf_with_many_columns_is_not_sam() {
        let mut parser = LineParser::new();
        let line = "chr1\t100\t.\tA\tG\t30\tPASS\tDP=10\tGT\t0/1\t1/1";
        let feature = parse(&mut parser, line);
        assert_eq!(parser.file_type(), FileType::Vcf);
        assert_eq!(feature.status, LineStatus::Valid);
    }

    #[rstest]
    fn test_field_column_lookups() {
        assert_eq!(field_column(FileType::Bed, "chrom"), Some(0));
        assert_eq!(field_column(FileType::Bed, "strand"), Some(5));
        assert_eq!(field_column(FileType::Gff, "attributes"), Some(8));
        assert_eq!(field_column(FileType::Vcf, "pos"), Some(1));
        assert_eq!(field_column(FileType::Vcf, "strand"), None);
        assert_eq!(field_column(FileType::Bed, "nope"), None);
    }

    #[rstest]
    fn test_field_lookup_on_parsed_records() {
        let mut parser = LineParser::new();
        let bed = parse(&mut parser, "chr1\t100\t200\tfeat1\t0\t+");
        assert_eq!(bed.field("start"), Some("100"));
        assert_eq!(bed.field("strand"), Some("+"));

        let mut parser = LineParser::new();
        let gff = parse(&mut parser, "chr22\tcurated\tCDS\t1000\t2000\t100\t+\t0\tid=1");
        assert_eq!(gff.field("source"), Some("curated"));
        assert_eq!(gff.field("attributes"), Some("id=1"));
        assert_eq!(gff.field("pos"), None);
    }

    #[rstest]
    fn test_report_reconstructs_gff_and_vcf() {
        let mut parser = LineParser::new();
        let line = "chr22\tcurated\tCDS\t1000\t2000\t100\t+\t0\tid=1";
        let gff = parse(&mut parser, line);
        assert_eq!(gff.report(), line);

        let mut parser = LineParser::new();
        let line = "chr1\t14397\trs1\tCTGT\tC\t31\tPASS\tDP=10";
        let vcf = parse(&mut parser, line);
        assert_eq!(vcf.report(), line);
    }

    #[rstest]
    fn test_round_trip_raw_fields() {
        let mut parser = LineParser::new();
        let line = "chr1\t100\t200\tfeat1\t0\t+";
        let feature = parse(&mut parser, line);
        assert_eq!(feature.to_string(), line);

        let spaced = parse(&mut parser, "chr1 300 400 feat2 0 -");
        assert_eq!(spaced.to_string(), "chr1\t300\t400\tfeat2\t0\t-");
    }
}
