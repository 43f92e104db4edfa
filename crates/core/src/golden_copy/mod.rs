//! Golden copy module - persisted expected results and the regression
//! workflow built on dump, restore, capture and compare.

mod golden_copy_model;
mod golden_copy_persistence;
mod golden_copy_workflow;

pub use golden_copy_model::GoldenCopy;
pub use golden_copy_persistence::GoldenCopyPersistence;
pub use golden_copy_workflow::{GoldenCopyWorkflow, RegressionOutcome};
