//! Train a Random Forest model on the house price reference dataset
//!
//! Usage: cargo run --bin train

use anyhow::{Context, Result};
use house_price_forest::logging::setup_logger;
use house_price_forest::pipeline;
use house_price_forest::PipelineConfig;
use tracing::info;

/// Exits non-zero with "Failed to load data" when the reference dataset is
/// missing, and with "Training pipeline failed" for any other stage error.
fn main() -> Result<()> {
    setup_logger()?;

    let config = PipelineConfig::default();

    match pipeline::run(&config) {
        Ok(metrics) => {
            info!("Run finished, test R-Squared: {:.4}", metrics.r2);
            Ok(())
        }
        Err(e) if e.is_data_not_found() => Err(e).context("Failed to load data"),
        Err(e) => Err(e).context("Training pipeline failed"),
    }
}
