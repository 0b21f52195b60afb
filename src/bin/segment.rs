use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use image_segmentation::{PaletteKind, SegmentConfig, WriteMode, random_seed, segment_file};
use log::debug;

/// Segment an image by colour with k-means and print a cloud-coverage classification.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// The file path of the input image
    #[arg(short, long)]
    input: PathBuf,

    /// The file path of the metadata csv file (currently unused)
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Write mode: 0 no image, 1 new file, 2 overwrite input, 3 overwrite and back up input
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    write: u8,

    /// The k-means k value (at least 2; fixed palettes hold 11 colors)
    #[arg(short = 'k', long = "kvalue")]
    k: usize,

    /// Palette: Random, RdYlBu, PiYG, Paired, Set3 or BW. Picked at random when omitted.
    #[arg(short, long)]
    palette: Option<String>,

    /// Seed for centroid initialisation and random palettes
    #[arg(long)]
    seed: Option<u64>,

    /// Cluster raw 0-255 channel values instead of normalised ones
    #[arg(long)]
    no_normalize: bool,

    /// Upper bound on k-means iterations
    #[arg(long, default_value_t = image_segmentation::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(metadata) = &args.metadata {
        debug!("ignoring metadata file {}", metadata.display());
    }

    let mode = WriteMode::from_code(args.write).ok_or_else(|| anyhow!("invalid write mode {}", args.write))?;
    let seed = match args.seed {
        Some(seed) => seed,
        None => random_seed()?,
    };

    let mut config = SegmentConfig::new(args.k, args.palette.as_deref().map(PaletteKind::from_name), seed);
    config.normalize = !args.no_normalize;
    config.max_iterations = args.max_iterations;

    let segmentation = segment_file(&args.input, mode, &config)
        .with_context(|| format!("segmentation of {} failed", args.input.display()))?;

    println!("{}", segmentation.classification.to_json()?);
    Ok(())
}
