use clap::{Command, arg};

pub use bedbins_overlap::consts::OVERLAP_CMD;

pub fn create_overlap_cli() -> Command {
    Command::new(OVERLAP_CMD)
        .about("Report features in a database file that overlap query features")
        .arg_required_else_help(true)
        .arg(arg!(-a <query> "BED/GFF/VCF file with query features, or - for stdin").required(true))
        .arg(arg!(-b <database> "BED/GFF/VCF file to index and search").required(true))
        .arg(arg!(-m --mode [mode] "What to report per query: all, any, or count"))
        .arg(arg!(-f --fraction [fraction] "Minimum overlap required as a fraction of the query length"))
        .arg(arg!(-s --"same-strand" "Only count hits on the same strand as the query"))
}
