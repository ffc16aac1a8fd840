//! Error handling and error types for the traffic GBDT pipeline.
//!
//! Every fallible stage (generation, feature assembly, training, evaluation,
//! prediction, persistence) reports failures through [`TrafficGbdtError`].
//! Validation happens at the entry of each operation and errors are returned
//! to the caller immediately.

use std::io;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum TrafficGbdtError {
    /// Invalid or unusable input data
    #[error("Data error: {message}")]
    Data {
        /// What was wrong with the data
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Invalid configuration parameter
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Rejected value
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A fitted model that cannot be used for scoring
    #[error("Model state error: {message}")]
    ModelState {
        /// What makes the model unusable
        message: String,
    },

    /// Model serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the failure
        message: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        /// Underlying error
        #[from]
        source: io::Error,
    },

    /// CSV parsing errors
    #[error("CSV parsing error: {source}")]
    Csv {
        /// Underlying error
        #[from]
        source: csv::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying error
        #[from]
        source: serde_json::Error,
    },

    /// Bincode serialization errors
    #[error("Bincode error: {source}")]
    Bincode {
        /// Underlying error
        #[from]
        source: bincode::Error,
    },

    /// Internal library errors (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal {
        /// Broken invariant
        message: String,
    },
}

/// Type alias for Results using TrafficGbdtError
pub type Result<T> = std::result::Result<T, TrafficGbdtError>;

impl TrafficGbdtError {
    /// Create a data error
    pub fn data<S: Into<String>>(message: S) -> Self {
        TrafficGbdtError::Data {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        TrafficGbdtError::Config {
            message: message.into(),
        }
    }

    /// Create a model state error
    pub fn model_state<S: Into<String>>(message: S) -> Self {
        TrafficGbdtError::ModelState {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        TrafficGbdtError::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error (should be used sparingly)
    pub fn internal<S: Into<String>>(message: S) -> Self {
        TrafficGbdtError::Internal {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        TrafficGbdtError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a length mismatch error between two parallel inputs
    pub fn length_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        TrafficGbdtError::data(format!(
            "{} length mismatch: expected {}, got {}",
            what, expected, actual
        ))
    }

    /// True for data errors (empty input, bad values, mismatched lengths)
    pub fn is_data_error(&self) -> bool {
        matches!(self, TrafficGbdtError::Data { .. })
    }

    /// True for configuration errors, including invalid parameters
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            TrafficGbdtError::Config { .. } | TrafficGbdtError::InvalidParameter { .. }
        )
    }

    /// True for unusable-model errors
    pub fn is_model_state_error(&self) -> bool {
        matches!(self, TrafficGbdtError::ModelState { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            TrafficGbdtError::Data { .. } => "data",
            TrafficGbdtError::Config { .. } => "config",
            TrafficGbdtError::InvalidParameter { .. } => "config",
            TrafficGbdtError::ModelState { .. } => "model_state",
            TrafficGbdtError::Serialization { .. } => "serialization",
            TrafficGbdtError::IO { .. } => "io",
            TrafficGbdtError::Csv { .. } => "csv",
            TrafficGbdtError::Json { .. } => "json",
            TrafficGbdtError::Bincode { .. } => "bincode",
            TrafficGbdtError::Internal { .. } => "internal",
        }
    }
}

/// Build a [`TrafficGbdtError::Config`] from a message or format string.
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::TrafficGbdtError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::TrafficGbdtError::config(format!($fmt, $($arg)*))
    };
}

/// Build a [`TrafficGbdtError::Data`] from a message or format string.
#[macro_export]
macro_rules! data_error {
    ($msg:expr) => {
        $crate::core::error::TrafficGbdtError::data($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::TrafficGbdtError::data(format!($fmt, $($arg)*))
    };
}

/// Build a [`TrafficGbdtError::ModelState`] from a message or format string.
#[macro_export]
macro_rules! model_state_error {
    ($msg:expr) => {
        $crate::core::error::TrafficGbdtError::model_state($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::TrafficGbdtError::model_state(format!($fmt, $($arg)*))
    };
}

/// Return `Err($err)` from the enclosing function unless `$cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TrafficGbdtError::config("test configuration error");
        assert_eq!(err.category(), "config");
        assert!(err.is_config_error());

        let err = TrafficGbdtError::data("empty dataset");
        assert_eq!(err.category(), "data");
        assert!(err.is_data_error());

        let err = TrafficGbdtError::model_state("no features");
        assert_eq!(err.category(), "model_state");
        assert!(err.is_model_state_error());
    }

    #[test]
    fn test_error_macros() {
        let err = config_error!("test error");
        assert!(matches!(err, TrafficGbdtError::Config { .. }));

        let err = data_error!("bad value in column {}", 3);
        assert!(matches!(err, TrafficGbdtError::Data { .. }));
        assert!(err.to_string().contains("column 3"));

        let err = model_state_error!("tree {} references feature {}", 0, 9);
        assert!(matches!(err, TrafficGbdtError::ModelState { .. }));
    }

    #[test]
    fn test_ensure_macro() {
        fn check(value: usize) -> Result<usize> {
            ensure!(value > 0, TrafficGbdtError::data("value must be positive"));
            Ok(value)
        }

        assert!(check(1).is_ok());
        assert!(check(0).unwrap_err().is_data_error());
    }

    #[test]
    fn test_parameter_errors_are_config_errors() {
        let err = TrafficGbdtError::invalid_parameter("learning_rate", "-0.5", "must be positive");
        assert_eq!(err.category(), "config");
        assert!(err.is_config_error());
        assert!(err.to_string().contains("learning_rate = -0.5"));
    }

    #[test]
    fn test_length_mismatch() {
        let err = TrafficGbdtError::length_mismatch("labels", 10, 9);
        assert!(err.is_data_error());
        assert!(err.to_string().contains("expected 10, got 9"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: TrafficGbdtError = io_err.into();
        assert!(matches!(err, TrafficGbdtError::IO { .. }));
        assert_eq!(err.category(), "io");
    }
}
