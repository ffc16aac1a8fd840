//! Core infrastructure module.
//!
//! - [`types`]: Fundamental data types and enumerations
//! - [`constants`]: Feature layout and configuration defaults
//! - [`error`]: Error handling and error types
//! - [`traits`]: Seams between the boosting loop and its collaborators
//!
//! ```rust
//! use traffic_gbdt::core::{
//!     constants::{DEFAULT_LEARNING_RATE, NUM_FEATURES},
//!     error::{Result, TrafficGbdtError},
//!     types::GrowthStrategy,
//! };
//!
//! assert_eq!(NUM_FEATURES, 7);
//! assert_eq!(GrowthStrategy::default(), GrowthStrategy::LeafWise);
//! let err = TrafficGbdtError::data("empty dataset");
//! assert_eq!(err.category(), "data");
//! # let _ = DEFAULT_LEARNING_RATE;
//! # let _: Result<()> = Ok(());
//! ```

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{Result, TrafficGbdtError};
pub use traits::*;
pub use types::*;

use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Initialize logging through `env_logger`.
///
/// Defaults `RUST_LOG` to `info` when it is unset. Safe to call repeatedly;
/// only the first call has an effect.
pub fn initialize_logging() {
    LOGGING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", "info");
        }

        // Another logger may already be installed by the host application
        let _ = env_logger::try_init();
        log::debug!("traffic-gbdt {} logging initialized", TRAFFIC_GBDT_VERSION);
    });
}

/// Check whether [`initialize_logging`] has run.
pub fn is_logging_initialized() -> bool {
    LOGGING_INIT.is_completed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_initialization_is_idempotent() {
        initialize_logging();
        initialize_logging();
        assert!(is_logging_initialized());
    }
}
