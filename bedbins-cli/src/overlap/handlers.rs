use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result, bail};
use clap::ArgMatches;

use bedbins_core::models::LineStatus;
use bedbins_core::reader::FeatureReader;
use bedbins_overlap::FeatureIndex;

enum ReportMode {
    All,
    Any,
    Count,
}

pub fn run_overlap(matches: &ArgMatches) -> Result<()> {
    let query_file = matches
        .get_one::<String>("query")
        .expect("A path to a query file is required.");

    let database_file = matches
        .get_one::<String>("database")
        .expect("A path to a database file is required.");

    let default_mode = "all".to_string();
    let mode = match matches.get_one::<String>("mode").unwrap_or(&default_mode).as_str() {
        "all" => ReportMode::All,
        "any" => ReportMode::Any,
        "count" => ReportMode::Count,
        other => bail!("Invalid mode: {}. Valid options are 'all', 'any', or 'count'", other),
    };

    let min_overlap_fraction = match matches.get_one::<String>("fraction") {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("Invalid overlap fraction: {}", raw))?,
        None => 0.0,
    };

    let same_strand = matches.get_flag("same-strand");

    // index the database once, then stream the queries against it
    let index = FeatureIndex::from_path(database_file)
        .with_context(|| format!("Failed to index database file: {}", database_file))?;

    let mut reader = FeatureReader::open(query_file)
        .with_context(|| format!("Failed to open query file: {}", query_file))?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    while let Some(feature) = reader.next_feature()? {
        match feature.status {
            LineStatus::Valid => match mode {
                ReportMode::All => {
                    for hit in index.all_hits(&feature, same_strand, min_overlap_fraction) {
                        writeln!(writer, "{}", hit.feature)?;
                    }
                }
                ReportMode::Any => {
                    let found = index.any_hit(&feature, same_strand, min_overlap_fraction);
                    writeln!(writer, "{}\t{}", feature, u8::from(found))?;
                }
                ReportMode::Count => {
                    let count = index.count_hits(&feature, same_strand, min_overlap_fraction);
                    writeln!(writer, "{}\t{}", feature, count)?;
                }
            },
            LineStatus::Malformed(ref kind) => {
                eprintln!("line {}: {}", reader.line_number(), kind);
            }
            LineStatus::Header | LineStatus::Blank => {}
        }
    }

    writer.flush()?;

    Ok(())
}
