//! End-to-end run on a small in-memory rating table.
//!
//! Loads rows, computes baseline stats, trains the factorization engine on
//! both execution paths, persists the learned state, and writes predictions
//! for the held-out rows.
//!
//! Run with `RUST_LOG=debug` to see per-epoch logging.

use std::error::Error;
use std::sync::Arc;

use cinefactor::config::ColumnLayout;
use cinefactor::model::FactorParams;
use cinefactor::serialization::Persist;
use cinefactor::submission::write_predictions;
use cinefactor::{Baseline, BaselineStats, Model, Ratings, StatsSnapshot, SvdConfig, SvdEngine};
use tracing_subscriber::EnvFilter;

/// `[user, movie, time, rating]` rows.
fn rating_rows() -> Vec<[f64; 4]> {
    vec![
        [1.0, 2.0, 100.0, 1.0],
        [3.0, 4.0, 101.0, 2.0],
        [5.0, 1.0, 102.0, 3.0],
        [2.0, 3.0, 103.0, 4.0],
        [4.0, 5.0, 104.0, 5.0],
        [1.0, 3.0, 105.0, 1.0],
        [5.0, 2.0, 106.0, 2.0],
        [2.0, 1.0, 107.0, 5.0],
        [3.0, 5.0, 108.0, 3.0],
        [4.0, 2.0, 109.0, 4.0],
    ]
}

fn held_out_rows() -> Vec<[f64; 4]> {
    vec![
        [1.0, 4.0, 200.0, 0.0],
        [2.0, 5.0, 201.0, 0.0],
        [3.0, 1.0, 202.0, 0.0],
        [4.0, 2.0, 203.0, 0.0],
    ]
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let layout = ColumnLayout::default();
    let train = Ratings::from_rows(&rating_rows(), &layout)?;
    let held_out = Ratings::from_rows(&held_out_rows(), &layout)?;

    let mut stats = BaselineStats::new();
    stats.load(train.clone())?;
    stats.compute()?;
    println!(
        "global average {:.4}, offset average {:.4}",
        stats.global_average()?,
        stats.offset_global_average()?
    );
    let snapshot = stats.snapshot()?;
    let stats: Arc<dyn Baseline> = Arc::new(snapshot.clone());

    let base = SvdConfig::builder().learn_rate(0.01).verbose(true);
    let mut reference = SvdEngine::new(base.clone().build());
    let mut accelerated = SvdEngine::new(base.run_accelerated(true).build());
    reference.train(train.clone(), Arc::clone(&stats), 50)?;
    accelerated.train(train.clone(), Arc::clone(&stats), 50)?;

    println!("train rmse: reference {:.4}", reference.rmse(&train)?);
    println!("train rmse: accelerated {:.4}", accelerated.rmse(&train)?);

    let dir = std::env::temp_dir();
    let stats_path = dir.join("cinefactor_stats.bin");
    let params_path = dir.join("cinefactor_factors.bin");
    snapshot.save_to_file(&stats_path)?;
    accelerated.extract_params()?.save_to_file(&params_path)?;

    let restored = SvdEngine::from_params(
        FactorParams::load_from_file(&params_path)?,
        Arc::new(StatsSnapshot::load_from_file(&stats_path)?),
    )?;
    let predictions = restored.predict(&held_out)?;

    println!("held-out predictions:");
    write_predictions(std::io::stdout().lock(), &predictions)?;
    Ok(())
}
