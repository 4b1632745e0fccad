use std::fs;
use std::path::PathBuf;
use std::process;

use bww::{import_with_config, to_json, ImportConfig, ImportError};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Convert a BWW bagpipe tune into the saved score format (JSON).
#[derive(Parser, Debug)]
#[command(name = "bww", version, about)]
struct Args {
    /// BWW file to import
    input: PathBuf,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML import configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only write the score, without warnings and text boxes
    #[arg(long)]
    score_only: bool,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Import failed: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), ImportError> {
    let config = match &args.config {
        Some(path) => ImportConfig::from_path(path)?,
        None => ImportConfig::default(),
    };

    let source = fs::read_to_string(&args.input)?;
    let parsed = import_with_config(&source, &config)?;

    let pretty = !args.compact;
    let json = if args.score_only {
        to_json(&parsed.score, pretty)?
    } else {
        to_json(&parsed, pretty)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &json)?;
            eprintln!("Wrote score to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
