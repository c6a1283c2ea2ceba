//! Experiment Runner for the Rank/Error Trade-off.
//!
//! This executable decomposes a reproducible random test matrix once and then sweeps the
//! compression percentage, recording how many singular values are kept and the
//! reconstruction error of each truncation. An optional planted rank makes the knee of
//! the error curve visible.

use anyhow::{Result, ensure};
use clap::Parser;
use faer::Mat;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::path::PathBuf;
use svd_compression::{QlParams, algorithms::svd::retained_rank, svd_with_params};

/// Command-line arguments for the error profile experiment.
#[derive(Parser, Debug)]
#[clap(
    name = "error-profile",
    about = "Measures reconstruction error of truncated SVDs across compression percentages."
)]
struct ProfileArgs {
    /// Number of rows of the test matrix.
    #[clap(long, default_value_t = 200)]
    rows: usize,

    /// Number of columns of the test matrix.
    #[clap(long, default_value_t = 150)]
    cols: usize,

    /// Rank of the planted low-rank component. Full-rank noise only when omitted.
    #[clap(long)]
    planted_rank: Option<usize>,

    /// Magnitude of the dense noise added on top of the planted component.
    #[clap(long, default_value_t = 1e-3)]
    noise: f64,

    /// Step size for iterating the percentage.
    #[clap(long, default_value_t = 5.0)]
    step: f64,

    /// Seed of the random number generator.
    #[clap(long, default_value_t = 42)]
    seed: u64,

    /// Path to the output CSV file where results will be written.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

/// Represents a single row of data in the output CSV file.
#[derive(Debug, Serialize)]
struct ProfileResult {
    /// Percentage of the rank removed.
    percent: f64,
    /// Number of singular triplets used in the reconstruction.
    retained_rank: usize,
    /// Numerical rank of the test matrix.
    rank: usize,
    /// Frobenius norm ||A - A_r||_F.
    frobenius_error: f64,
    /// ||A - A_r||_F / ||A||_F.
    relative_error: f64,
}

/// Builds `L Rᵀ + noise · N` with `L`, `R` of `planted_rank` columns and dense noise `N`.
fn create_test_matrix(args: &ProfileArgs, rng: &mut StdRng) -> Mat<f64> {
    let mut noise = Mat::from_fn(args.rows, args.cols, |_, _| rng.random::<f64>() - 0.5);
    let Some(k) = args.planted_rank else {
        return noise;
    };

    let left = Mat::from_fn(args.rows, k, |_, _| rng.random::<f64>() - 0.5);
    let right = Mat::from_fn(args.cols, k, |_, _| rng.random::<f64>() - 0.5);
    let planted = left.as_ref() * right.as_ref().transpose();
    for j in 0..args.cols {
        for i in 0..args.rows {
            noise[(i, j)] = planted[(i, j)] + args.noise * noise[(i, j)];
        }
    }
    noise
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .try_init()?;
    let args = ProfileArgs::parse();
    ensure!(args.step > 0.0, "--step must be positive, got {}", args.step);
    log::info!(
        "Starting error profile for a {}x{} matrix (planted rank: {:?})",
        args.rows,
        args.cols,
        args.planted_rank
    );

    let mut rng = StdRng::seed_from_u64(args.seed); // For reproducible results.
    let a = create_test_matrix(&args, &mut rng);
    let a_norm = a.norm_l2();

    let decomposition = svd_with_params(a.as_ref(), &QlParams::default())?;
    log::info!("Numerical rank: {}", decomposition.rank);

    let mut writer = csv::Writer::from_path(&args.output)?;
    let steps = (100.0 / args.step).floor() as usize;
    for s in 0..=steps {
        let percent = (s as f64 * args.step).min(100.0);
        let r = retained_rank(decomposition.rank, percent)?;
        let approx = decomposition.reconstruct(r);
        let frobenius_error = (&a - &approx).norm_l2();
        let relative_error = if a_norm > 0.0 {
            frobenius_error / a_norm
        } else {
            0.0
        };

        writer.serialize(ProfileResult {
            percent,
            retained_rank: r,
            rank: decomposition.rank,
            frobenius_error,
            relative_error,
        })?;
    }

    writer.flush()?;
    log::info!("Error profile complete. Results saved to {:?}.", &args.output);
    Ok(())
}
