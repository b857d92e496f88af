use thiserror::Error;

use super::config::ConfigError;
use crate::core::colormap::cyclic::ColormapError;
use crate::core::colormap::opacity::OpacityCurveError;
use crate::core::models::atom::AtomError;
use crate::core::models::formula::FormulaError;
use crate::core::models::molecule::GeometryError;
use crate::core::orbitals::quantum::QuantumNumberError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid quantum numbers: {0}")]
    InvalidQuantumNumbers(#[from] QuantumNumberError),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("Invalid formula: {0}")]
    InvalidFormula(#[from] FormulaError),

    #[error("Colormap error: {0}")]
    Colormap(#[from] ColormapError),

    #[error("Invalid opacity curve: {0}")]
    OpacityCurve(#[from] OpacityCurveError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Result was computed for model revision {expected}, but the model is now at revision {current}")]
    StaleRevision { expected: u64, current: u64 },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl From<AtomError> for EngineError {
    fn from(err: AtomError) -> Self {
        EngineError::InvalidGeometry(GeometryError::Atom(err))
    }
}
