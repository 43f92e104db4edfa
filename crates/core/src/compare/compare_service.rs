use log::{debug, info};

use super::compare_model::CalculationDifference;
use crate::equality::EqualityChecker;
use crate::results::CalculationResults;

/// Classifies every key of two result sets as equal, different, or present
/// on one side only.
#[derive(Clone)]
pub struct ResultComparator {
    checker: EqualityChecker,
    delta: f64,
    check_properties: bool,
}

impl ResultComparator {
    pub fn new(checker: EqualityChecker, delta: f64) -> Self {
        Self {
            checker,
            delta,
            check_properties: false,
        }
    }

    /// Also records equal values whose resolved properties differ.
    pub fn with_property_check(mut self, enabled: bool) -> Self {
        self.check_properties = enabled;
        self
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn checks_properties(&self) -> bool {
        self.check_properties
    }

    pub fn compare(&self, base: &CalculationResults, test: &CalculationResults) -> CalculationDifference {
        let mut difference = CalculationDifference::default();

        for (key, base_value) in base.iter() {
            let Some(test_value) = test.get(key) else {
                difference.only_base.insert(key.clone(), base_value.clone());
                continue;
            };

            if !self.checker.equal(&base_value.value, &test_value.value, self.delta) {
                debug!(
                    "{} differs: {} vs {}",
                    key,
                    base_value.value.summary(),
                    test_value.value.summary()
                );
                difference
                    .different
                    .insert(key.clone(), (base_value.clone(), test_value.clone()));
                continue;
            }

            difference.equal_count += 1;
            if self.check_properties
                && base_value.specification_properties != test_value.specification_properties
            {
                difference.different_properties.insert(
                    key.clone(),
                    (
                        base_value.specification_properties.clone(),
                        test_value.specification_properties.clone(),
                    ),
                );
            }
        }

        for (key, test_value) in test.iter() {
            if !base.contains_key(key) {
                difference.only_test.insert(key.clone(), test_value.clone());
            }
        }

        info!(
            "Compared {} keys: {} equal, {} different, {} only in base, {} only in test, {} with different properties",
            difference.total_keys(),
            difference.equal_count,
            difference.different.len(),
            difference.only_base.len(),
            difference.only_test.len(),
            difference.different_properties.len()
        );
        difference
    }
}
