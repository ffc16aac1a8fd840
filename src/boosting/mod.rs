//! Gradient boosting for binary traffic classification.
//!
//! - [`objective`]: logistic loss, its gradients and the sigmoid link
//! - [`ensemble`]: the trained additive model
//! - [`gbdt`]: the boosting loop
//! - [`history`]: per-round training loss

pub mod ensemble;
pub mod gbdt;
pub mod history;
pub mod objective;

pub use ensemble::{Ensemble, EnsembleStatistics};
pub use gbdt::GBDTTrainer;
pub use history::TrainingHistory;
pub use objective::{sigmoid, BinaryLogloss};
