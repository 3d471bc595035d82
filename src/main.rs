mod binary_utils;
mod catalog;
mod extractor;
mod formats;
mod graphics;

use std::{path::PathBuf, process};

use clap::Parser;

use extractor::AssetExtractor;

/// Convert SAF4 game assets (IM7/HI7/ARS/PTS) into PNGs, GIFs and a JSON
/// catalog.
#[derive(Parser)]
struct Args {
    /// Game data directory to walk recursively
    input_dir: PathBuf,

    /// Where converted assets and the catalog are written
    #[arg(default_value = "output")]
    output_dir: PathBuf,
}

fn main() {
    let args = Args::parse();

    if !args.input_dir.is_dir() {
        eprintln!("{} is not a directory", args.input_dir.display());
        process::exit(2);
    }

    if let Err(e) = std::fs::create_dir_all(&args.output_dir) {
        eprintln!("Failed to create output directory: {}", e);
        process::exit(1);
    }

    println!("Input: {}", args.input_dir.display());
    println!("Output: {}", args.output_dir.display());

    match AssetExtractor::new(args.input_dir, args.output_dir).run() {
        Ok(summary) => {
            println!(
                "Processing complete! {} converted, {} failed, {} skipped",
                summary.converted, summary.failed, summary.skipped
            );
            if summary.failed > 0 {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Extraction failed: {}", e);
            process::exit(1);
        }
    }
}
