//! Restore module - loads a dump into empty masters and relinks references.

mod restore_model;
mod restore_service;

pub use restore_model::{IdentityMap, RestoreSummary};
pub use restore_service::DatabaseRestore;

#[cfg(test)]
mod restore_tests;
