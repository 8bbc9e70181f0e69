use thiserror::Error;

/// Top-level error type for the bargaining engine.
#[derive(Debug, Error)]
pub enum BargainError {
    #[error("gamma sampler did not converge for shape {shape} after {iterations} iterations")]
    Sampling { shape: f64, iterations: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("transcript export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BargainError>;
