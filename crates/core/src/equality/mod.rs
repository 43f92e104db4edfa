//! Equality module - tolerance-aware comparison of computed values.

mod comparators;
mod equality_checker;

pub use comparators::{double_slices_equal, doubles_equal};
pub use equality_checker::{EqualityChecker, ValueComparator};
