//! gpslog2gpx - convert a GPS tracker log into a GPX track
//!
//! Usage:
//!   gpslog2gpx <input> [--map] [--output <dir>] [--template <file>] [--escape]
//!
//! `<input>` may be given without its `.TXT` extension, as the tracker
//! names its files `LOGnn.TXT`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use gpslog2gpx::{ConvertOptions, GpsLogError, SystemClock, run};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gpslog2gpx")]
#[command(about = "Convert GPS tracker logs to GPX", long_about = None)]
struct Cli {
    /// Input log file, with or without the .TXT extension
    input: PathBuf,

    /// Also render the track as an HTML map page
    #[arg(short, long)]
    map: bool,

    /// Directory for the generated files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// GPX template with {time}, {name} and {trackpoints} slots
    #[arg(long)]
    template: Option<PathBuf>,

    /// XML-escape text fields in track points
    #[arg(long)]
    escape: bool,

    /// JSON options file; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> anyhow::Result<()> {
    let Some(input) = resolve_input(&cli.input) else {
        println!();
        println!("{} does not exist", cli.input.display());
        anyhow::bail!("input file not found");
    };

    let opts = build_options(cli)?;

    println!();
    println!("Generate map: {}", opts.generate_map);
    println!();
    println!("Using Input File: {}", input.display());

    let output = match run(&input, &opts, &SystemClock) {
        Ok(output) => output,
        Err(e) if e.is_incompatible_input() => {
            debug!(error = %e, "rejected input log");
            println!();
            println!("File is not compatible, check input file.");
            return Err(e).context("incompatible input file");
        }
        Err(e) => return Err(e.into()),
    };

    println!("Success: Generated GPX file as {}", output.gpx_path.display());
    println!("Total Trip Distance: {:.2} kilometers", output.conversion.distance_km);

    match output.map {
        Some(Ok(map_path)) => {
            println!();
            println!("Map Generated at {}", map_path.display());
        }
        Some(Err(e)) => {
            println!();
            println!("Map could not be generated: {e}");
            return Err(e).context("map generation failed");
        }
        None => {}
    }

    Ok(())
}

/// The path itself if it exists, else the same path with `.TXT` appended.
fn resolve_input(input: &Path) -> Option<PathBuf> {
    if input.is_file() {
        return Some(input.to_path_buf());
    }
    let mut with_ext = input.as_os_str().to_owned();
    with_ext.push(".TXT");
    let with_ext = PathBuf::from(with_ext);
    with_ext.is_file().then_some(with_ext)
}

fn build_options(cli: &Cli) -> Result<ConvertOptions, GpsLogError> {
    let mut opts = match &cli.config {
        Some(path) => ConvertOptions::from_json_file(path)?,
        None => ConvertOptions::default(),
    };
    if cli.map {
        opts.generate_map = true;
    }
    if cli.escape {
        opts.escape_text = true;
    }
    if let Some(dir) = &cli.output {
        opts.output_dir = Some(dir.clone());
    }
    if let Some(template) = &cli.template {
        opts.template_path = Some(template.clone());
    }
    Ok(opts)
}
