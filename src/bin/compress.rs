//! Image Compression Runner.
//!
//! This executable decodes an image, removes a percentage of the numerical rank of each
//! colour plane through a truncated SVD, and writes the reconstructed image. An alpha
//! plane, if present, is copied unchanged.

use anyhow::{Context, Result, ensure};
use clap::Parser;
use svd_compression::{
    QlParams,
    algorithms::DEFAULT_EPS,
    utils::image_io::{load, save},
};
use std::{path::PathBuf, time::Instant};

/// Command-line arguments for the compression runner.
#[derive(Parser, Debug)]
#[clap(
    name = "compress",
    about = "Compresses an image by truncating the SVD of each colour plane."
)]
struct CompressArgs {
    /// Path of the image to compress.
    #[clap(long, value_name = "PATH")]
    input: PathBuf,

    /// Path of the compressed image. The format follows the extension.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,

    /// Percentage of the rank to remove, in [0, 100].
    #[clap(long, default_value_t = 50.0)]
    percent: f64,

    /// Relative deflation tolerance of the QL solver.
    #[clap(long, default_value_t = DEFAULT_EPS)]
    eps: f64,

    /// Maximum QL sweeps per eigenvalue. Defaults to floor(1 / eps^2).
    #[clap(long)]
    max_iterations: Option<usize>,

    /// Enables debug logging.
    #[clap(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = CompressArgs::parse();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).try_init()?;

    ensure!(
        (0.0..=100.0).contains(&args.percent),
        "--percent must lie in [0, 100], got {}",
        args.percent
    );

    let mut params = QlParams::new(args.eps);
    if let Some(max_iterations) = args.max_iterations {
        params = params.with_max_iterations(max_iterations);
    }

    let image = load(&args.input).with_context(|| format!("failed to read {:?}", args.input))?;
    let (height, width) = image.dimensions();
    log::info!(
        "Compressing {:?}: {}x{} {:?}, removing {}% of the rank",
        args.input,
        width,
        height,
        image.layout(),
        args.percent
    );

    let start = Instant::now();
    let compressed = image.compress(args.percent, &params)?;
    log::info!("Compression finished in {:.2?}.", start.elapsed());

    save(&compressed, &args.output)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    log::info!("Compressed image saved to {:?}.", &args.output);
    Ok(())
}
