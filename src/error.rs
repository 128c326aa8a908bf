use thiserror::Error;

/// Main error type for the simulator
///
/// Only the edges of the crate (configuration, model files, results output)
/// can fail. The simulation loop itself encodes every in-loop condition as a
/// reward, a reason tag, or a termination flag.
#[derive(Error, Debug)]
pub enum SimError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    Validation(String),

    // Policy model errors
    #[error("Model load error: {0}")]
    ModelLoad(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for SimError
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Build a validation error from a list of collected problems
    pub fn from_validation(errors: Vec<String>) -> Self {
        SimError::Validation(errors.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_joined() {
        let err = SimError::from_validation(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "Validation failed: a; b");
    }

    #[test]
    fn test_anyhow_context_preserved() {
        use anyhow::Context;

        let failed: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "worker panicked",
        ));
        let err: SimError = failed.context("backtest task failed").unwrap_err().into();
        assert!(matches!(err, SimError::Other(_)));
        assert_eq!(err.to_string(), "backtest task failed: worker panicked");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SimError = io.into();
        assert!(matches!(err, SimError::Io(_)));
    }
}
