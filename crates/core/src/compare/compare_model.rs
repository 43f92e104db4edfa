use std::collections::BTreeMap;

use crate::results::{CalculatedValue, CalculationResultKey, ValueProperties};

/// Classification of two result sets.
///
/// `only_base`, `only_test`, `different` and the equal keys partition the
/// union of both key sets. `different_properties` is a subset of the equal
/// keys whose resolved properties drifted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationDifference {
    pub equal_count: usize,
    pub only_base: BTreeMap<CalculationResultKey, CalculatedValue>,
    pub only_test: BTreeMap<CalculationResultKey, CalculatedValue>,
    pub different: BTreeMap<CalculationResultKey, (CalculatedValue, CalculatedValue)>,
    pub different_properties: BTreeMap<CalculationResultKey, (ValueProperties, ValueProperties)>,
}

impl CalculationDifference {
    /// True when nothing differs; property drift only counts when
    /// `check_properties` is set.
    pub fn is_empty(&self, check_properties: bool) -> bool {
        self.only_base.is_empty()
            && self.only_test.is_empty()
            && self.different.is_empty()
            && (!check_properties || self.different_properties.is_empty())
    }

    /// Number of distinct keys across both result sets.
    pub fn total_keys(&self) -> usize {
        self.equal_count + self.only_base.len() + self.only_test.len() + self.different.len()
    }
}
