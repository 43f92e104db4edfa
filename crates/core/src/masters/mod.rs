//! Masters module - entity records, master contracts and in-process masters.

mod master_set;
mod masters_model;
mod masters_traits;
mod memory_master;
mod tracking_master;

// Re-export the public interface
pub use master_set::Masters;
pub use masters_model::*;
pub use masters_traits::{Entity, MasterTrait};
pub use memory_master::InMemoryMaster;
pub use tracking_master::{AccessTracker, TrackingMaster};
