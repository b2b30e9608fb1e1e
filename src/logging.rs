//! Logging setup

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global INFO-level log subscriber.
///
/// Fails if a global subscriber has already been set.
pub fn setup_logger() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
