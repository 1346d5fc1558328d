//! ewkb2geojson CLI - hex EWKB to GeoJSON converter
//!
//! Reads one hex EWKB record per line and writes a JSON array holding a
//! GeoJSON geometry (or `null`) per record.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde_json::Value;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ewkb_geojson::converter::{DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
use ewkb_geojson::{convert_batch, CodecConfig, EwkbCodec};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Verbosity {
    /// Only log failures and warnings.
    #[default]
    Quiet,
    /// Log batch progress and tallies.
    Normal,
    /// Log every record.
    Verbose,
}

impl Verbosity {
    /// Returns the tracing filter string for this verbosity level.
    fn as_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "ewkb_geojson=warn,ewkb2geojson=warn",
            Verbosity::Normal => "ewkb_geojson=info,ewkb2geojson=info",
            Verbosity::Verbose => "ewkb_geojson=trace,ewkb2geojson=trace",
        }
    }
}

/// Hex EWKB to GeoJSON converter
#[derive(Parser, Debug)]
#[command(name = "ewkb2geojson")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file with one hex EWKB record per line (stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output JSON file path (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep Z values as a third position component
    #[arg(long)]
    include_z: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Maximum nesting depth of collection geometries (at most 256)
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Exit with failure if any record fails to convert
    #[arg(long)]
    strict: bool,

    /// Verbosity level
    #[arg(short, long, value_enum, default_value_t = Verbosity::default())]
    verbosity: Verbosity,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing with the appropriate filter level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.verbosity.as_filter())),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    match run(&args) {
        Ok(all_converted) => {
            if args.strict && !all_converted {
                error!("Some records failed to convert");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Conversion failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main conversion logic. Returns whether every record converted.
fn run(args: &Args) -> Result<bool, Box<dyn std::error::Error>> {
    let text = match &args.input {
        Some(path) => {
            info!("Reading input file: {}", path.display());
            fs::read_to_string(path)?
        }
        None => {
            info!("Reading records from stdin");
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    // Blank lines are records without geometry
    let records: Vec<Option<&str>> = text
        .lines()
        .map(|line| Some(line.trim()).filter(|line| !line.is_empty()))
        .collect();
    info!("Read {} records", records.len());

    if args.max_depth > MAX_DEPTH_LIMIT {
        warn!(
            "--max-depth {} exceeds the limit, using {}",
            args.max_depth, MAX_DEPTH_LIMIT
        );
    }
    let config = CodecConfig::new()
        .with_include_z(args.include_z)
        .with_max_depth(args.max_depth)
        .with_pretty_print(args.pretty);
    let codec = EwkbCodec::with_config(config);
    let report = convert_batch(&codec, &records);

    let output = Value::Array(
        report
            .geometries()
            .into_iter()
            .map(|geometry| geometry.cloned().unwrap_or(Value::Null))
            .collect(),
    );
    let mut json = if codec.config().pretty_print {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    json.push('\n');

    match &args.output {
        Some(path) => {
            info!("Writing output file: {}", path.display());
            fs::write(path, json)?;
        }
        None => print!("{}", json),
    }

    Ok(!report.has_failures())
}
