//! Regression Core - golden copy dump, restore and comparison.
//!
//! This crate holds the storage-agnostic engine: master traits and an
//! in-memory implementation, the transport layer that writes records to
//! directories or archives, dump and restore of whole databases, result
//! capture and the comparison that decides whether a regression run
//! matches its golden copy. Persistent masters live in the
//! `storage-sqlite` crate.

pub mod compare;
pub mod config;
pub mod constants;
pub mod dump;
pub mod equality;
pub mod errors;
pub mod golden_copy;
pub mod identity;
pub mod masters;
pub mod restore;
pub mod results;
pub mod transport;
pub mod utils;
pub mod values;

#[cfg(test)]
mod test_fixtures;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
