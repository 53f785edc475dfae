//! The error type shared by every thesis-stats crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied setting is out of range (alpha, quantile level, ...)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The data cannot be used as given
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// A statistic or distribution evaluation produced no usable number
    #[error("Computation error: {0}")]
    Computation(String),

    /// X'X (or a Hessian) could not be inverted
    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// No observations reached `operation`
    pub fn empty_input(operation: &str) -> Self {
        tracing::trace!(operation, "empty input");
        Self::InsufficientData {
            expected: 1,
            actual: 0,
        }
    }

    /// Paired inputs of different lengths
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    pub fn non_finite(context: &str) -> Self {
        Self::Computation(format!("{context} contains NaN or infinite values"))
    }
}

/// Significance levels must lie strictly between 0 and 1
pub fn check_alpha(alpha: f64) -> Result<f64> {
    if alpha > 0.0 && alpha < 1.0 {
        return Ok(alpha);
    }
    Err(Error::InvalidParameter(format!(
        "alpha {alpha} must be in (0, 1)"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        assert_eq!(
            Error::size_mismatch(12, 11, "paired t-test").to_string(),
            "Invalid input: Size mismatch in paired t-test: expected 12, got 11"
        );
        assert_eq!(
            Error::non_finite("F statistic").to_string(),
            "Computation error: F statistic contains NaN or infinite values"
        );
        assert_eq!(
            Error::SingularMatrix("predictors are collinear".into()).to_string(),
            "Singular matrix: predictors are collinear"
        );
        assert!(matches!(
            Error::empty_input("median"),
            Error::InsufficientData {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn test_check_alpha() {
        assert_eq!(check_alpha(0.05).unwrap(), 0.05);
        assert_eq!(check_alpha(0.001).unwrap(), 0.001);
        for bad in [0.0, 1.0, -0.1, f64::NAN] {
            assert!(check_alpha(bad).is_err(), "{bad} accepted");
        }
        assert_eq!(
            check_alpha(1.5).unwrap_err().to_string(),
            "Invalid parameter: alpha 1.5 must be in (0, 1)"
        );
    }

    #[test]
    fn test_conversions() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "survey.csv").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("survey.csv"));

        let err: Error = anyhow::anyhow!("solver diverged").into();
        assert!(matches!(err, Error::Other(_)));
    }
}
