//! Dump module - writes masters to a container with stable file names.

mod dump_model;
mod dump_service;

pub use dump_model::{DumpFilter, DumpSummary, IdMappings};
pub use dump_service::DatabaseDump;

#[cfg(test)]
mod dump_tests;
