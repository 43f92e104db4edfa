use log::trace;
use std::collections::HashMap;
use std::sync::Arc;

use super::comparators::*;
use crate::values::{ResultValue, ValueKind};

/// Decides whether two values of the same kind are equal within `delta`.
pub trait ValueComparator: Send + Sync {
    fn equal(&self, checker: &EqualityChecker, a: &ResultValue, b: &ResultValue, delta: f64) -> bool;
}

impl<F> ValueComparator for F
where
    F: Fn(&EqualityChecker, &ResultValue, &ResultValue, f64) -> bool + Send + Sync,
{
    fn equal(&self, checker: &EqualityChecker, a: &ResultValue, b: &ResultValue, delta: f64) -> bool {
        self(checker, a, b, delta)
    }
}

/// Tolerance-aware equality over [`ResultValue`]s with an open registry.
///
/// A comparator registered for `(kind, type name)` wins over one registered
/// for the kind alone; values with no comparator fall back to exact
/// equality. Comparators receive the checker so nested values go back
/// through the same registry.
#[derive(Clone, Default)]
pub struct EqualityChecker {
    by_type: HashMap<(ValueKind, String), Arc<dyn ValueComparator>>,
    by_kind: HashMap<ValueKind, Arc<dyn ValueComparator>>,
}

impl EqualityChecker {
    /// Checker with the built-in comparators registered.
    pub fn new() -> Self {
        let mut checker = Self::empty();
        checker
            .register_kind(ValueKind::Double, compare_double)
            .register_kind(ValueKind::Integer, compare_integer)
            .register_kind(ValueKind::DoubleArray, compare_double_array)
            .register_kind(ValueKind::List, compare_list)
            .register_kind(ValueKind::Record, compare_record)
            .register_kind(ValueKind::CurrencyAmount, compare_currency_amount)
            .register_kind(ValueKind::MultipleCurrencyAmount, compare_multiple_currency_amount)
            .register_kind(ValueKind::LabelledMatrix1D, compare_labelled_matrix)
            .register_kind(ValueKind::Curve, compare_curve)
            .register_kind(ValueKind::FactoryCall, compare_factory_call);
        checker
    }

    /// Checker with no comparators: everything compares exactly.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register_kind<C>(&mut self, kind: ValueKind, comparator: C) -> &mut Self
    where
        C: ValueComparator + 'static,
    {
        self.by_kind.insert(kind, Arc::new(comparator));
        self
    }

    /// Registers a comparator for one record or factory type name.
    pub fn register_type<C>(&mut self, kind: ValueKind, type_name: impl Into<String>, comparator: C) -> &mut Self
    where
        C: ValueComparator + 'static,
    {
        self.by_type.insert((kind, type_name.into()), Arc::new(comparator));
        self
    }

    pub fn has_comparator(&self, kind: ValueKind) -> bool {
        self.by_kind.contains_key(&kind)
    }

    pub fn equal(&self, a: &ResultValue, b: &ResultValue, delta: f64) -> bool {
        let kind = a.kind();
        if kind != b.kind() {
            return false;
        }

        if let Some(type_name) = a.type_name() {
            let key = (kind, type_name.to_string());
            if let Some(comparator) = self.by_type.get(&key) {
                trace!("Comparing {} '{}' with registered comparator", kind, type_name);
                return b.type_name() == Some(type_name) && comparator.equal(self, a, b, delta);
            }
        }

        match self.by_kind.get(&kind) {
            Some(comparator) => comparator.equal(self, a, b, delta),
            None => a == b,
        }
    }
}
