//! Train the reference and accelerated paths on the same synthetic ratings
//! and compare epoch time, test RMSE and the largest factor divergence.
//!
//! Writes `path_comparison.json` in the working directory.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use benchmarks::{benchmark_fn, BenchmarkStats, SyntheticRatings, SyntheticSpec};
use cinefactor::{Baseline, ExecutionPath, Model, SvdConfig, SvdEngine};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

const EPOCHS: usize = 20;

fn train(
    data: &SyntheticRatings,
    stats: Arc<dyn Baseline>,
    execution: ExecutionPath,
) -> cinefactor::Result<SvdEngine> {
    let config = SvdConfig::builder()
        .learn_rate(0.01)
        .execution(execution)
        .build();
    let mut engine = SvdEngine::new(config);
    engine.train(data.train.clone(), stats, EPOCHS)?;
    Ok(engine)
}

fn max_divergence(a: &SvdEngine, b: &SvdEngine) -> f32 {
    let pairs = [(a.users(), b.users()), (a.movies(), b.movies())];
    pairs
        .into_iter()
        .filter_map(|(x, y)| Some((x?, y?)))
        .flat_map(|(x, y)| {
            x.iter()
                .zip(y.iter())
                .map(|(p, q)| (p - q).abs())
                .collect::<Vec<_>>()
        })
        .fold(0.0, f32::max)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data = SyntheticRatings::generate(SyntheticSpec::default(), 0.2)?;
    let stats: Arc<dyn Baseline> = Arc::new(data.stats.clone());
    info!(train = data.train.len(), test = data.test.len(), "generated synthetic ratings");

    let mut report = serde_json::Map::new();
    let mut engines = Vec::new();
    for (name, path) in [
        ("reference", ExecutionPath::Reference),
        ("accelerated", ExecutionPath::Accelerated),
    ] {
        let (runs, times) = benchmark_fn(1, 3, || train(&data, Arc::clone(&stats), path));
        let timing = BenchmarkStats::from_times(times);
        let engine = runs.into_iter().last().ok_or("no timed runs")??;
        let rmse = engine.rmse(&data.test)?;
        info!(path = name, rmse, mean_ms = timing.mean_ms, "trained");

        report.insert(
            name.to_string(),
            json!({
                "epochs": EPOCHS,
                "test_rmse": rmse,
                "mean_ms": timing.mean_ms,
                "std_dev_ms": timing.std_dev_ms,
                "median_ms": timing.median_ms,
            }),
        );
        engines.push(engine);
    }

    if let [reference, accelerated] = engines.as_slice() {
        let divergence = max_divergence(reference, accelerated);
        info!(divergence, "max factor divergence between paths");
        report.insert("max_factor_divergence".to_string(), json!(divergence));
    }

    let mut file = File::create("path_comparison.json")?;
    writeln!(file, "{}", serde_json::to_string_pretty(&report)?)?;
    info!("wrote path_comparison.json");
    Ok(())
}
