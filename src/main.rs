use clap::Parser;
use peak_alloc::PeakAlloc;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};
use traitmatrix::{BuildOptions, ColumnSpec, PresenceMatrix, RowOrder};

#[global_allocator]
static PEAK_ALLOC: PeakAlloc = PeakAlloc;

/// Process a genome and trait annotation table into a presence/absence matrix.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(
        short = 'v',
        long = "values",
        value_name = "PATH",
        help = "Text file listing the trait values to check, one per line"
    )]
    values: PathBuf,

    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Tab-separated table with genome and trait information"
    )]
    input: PathBuf,

    #[arg(short = 'o', long = "output", value_name = "PATH", help = "Output CSV file")]
    output: PathBuf,

    #[arg(
        long = "entity-column",
        value_name = "INDEX",
        default_value_t = 1,
        help = "0-based index of the field holding the genome identifier"
    )]
    entity_column: usize,

    #[arg(
        long = "trait-column",
        value_name = "INDEX",
        default_value_t = 8,
        help = "0-based index of the field holding the trait value"
    )]
    trait_column: usize,

    #[arg(
        long = "row-order",
        value_name = "ORDER",
        default_value_t = RowOrder::FirstSeen,
        help = "Order of the matrix rows: first-seen or lexical"
    )]
    row_order: RowOrder,

    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose", help = "Only log warnings and errors")]
    quiet: bool,

    #[arg(long = "verbose", help = "Log debug messages")]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.quiet {
        LevelFilter::WARN
    } else if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    let options = BuildOptions::new(
        ColumnSpec::new(args.entity_column, args.trait_column)?,
        args.row_order,
    );
    debug!("build options: {:?}", options);

    let start = Instant::now();
    let pm = PresenceMatrix::from_paths(&args.values, &args.input, &options)?;
    debug!("built the matrix in {:?}", start.elapsed());

    pm.write_csv(&args.output)?;
    println!("Output saved to {}", args.output.display());

    debug!("Peak Memory usage was {} MB", PEAK_ALLOC.peak_usage_as_mb());
    Ok(())
}
