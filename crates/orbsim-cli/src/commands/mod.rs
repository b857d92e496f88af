pub mod element;
pub mod field;
pub mod minimize;

use crate::error::{CliError, Result};
use orbsim::core::models::element::Element;
use orbsim::engine::cancel::CancellationToken;
use orbsim::engine::error::EngineError;
use tokio::task::JoinError;
use tracing::warn;

/// Runs `job` on the blocking pool. Ctrl-C cancels the token handed to the job, and the
/// job's own result (normally `EngineError::Cancelled`) is awaited before returning.
pub async fn run_cancellable<T, F>(job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(CancellationToken) -> std::result::Result<T, EngineError> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let worker_token = cancel.clone();
    let mut handle = tokio::task::spawn_blocking(move || job(worker_token));

    tokio::select! {
        joined = &mut handle => finish(joined),
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("Interrupt received, cancelling the running computation...");
            cancel.cancel();
            finish(handle.await)
        }
    }
}

fn finish<T>(joined: std::result::Result<std::result::Result<T, EngineError>, JoinError>) -> Result<T> {
    let result = joined.map_err(|e| CliError::Other(anyhow::anyhow!("Worker task failed: {}", e)))?;
    Ok(result?)
}

/// Accepts an element symbol (`"Fe"`) or an atomic number (`"26"`).
pub fn parse_element(value: &str) -> Result<&'static Element> {
    let value = value.trim();
    let element = match value.parse::<u8>() {
        Ok(number) => Element::from_atomic_number(number),
        Err(_) => Element::from_symbol(value),
    };
    element.ok_or_else(|| {
        let last = Element::all().last().map(|e| e.symbol).unwrap_or("?");
        CliError::Argument(format!(
            "Unknown element '{}'. Supported elements are H through {}.",
            value, last
        ))
    })
}
