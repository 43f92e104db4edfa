//! Built-in comparators registered by [`EqualityChecker::new`].
//!
//! [`EqualityChecker::new`]: super::EqualityChecker::new

use super::equality_checker::EqualityChecker;
use crate::values::{CurveFunction, ResultValue};

/// Doubles match when identical (which covers equal infinities), when both
/// are NaN, or when they differ by at most `delta`.
pub fn doubles_equal(a: f64, b: f64, delta: f64) -> bool {
    if a == b || (a.is_nan() && b.is_nan()) {
        return true;
    }
    (a - b).abs() <= delta
}

pub fn double_slices_equal(a: &[f64], b: &[f64], delta: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| doubles_equal(*x, *y, delta))
}

pub(crate) fn compare_double(_: &EqualityChecker, a: &ResultValue, b: &ResultValue, delta: f64) -> bool {
    match (a, b) {
        (ResultValue::Double(x), ResultValue::Double(y)) => doubles_equal(*x, *y, delta),
        _ => false,
    }
}

pub(crate) fn compare_integer(_: &EqualityChecker, a: &ResultValue, b: &ResultValue, delta: f64) -> bool {
    match (a, b) {
        (ResultValue::Integer(x), ResultValue::Integer(y)) => {
            x == y || doubles_equal(*x as f64, *y as f64, delta)
        }
        _ => false,
    }
}

pub(crate) fn compare_double_array(
    _: &EqualityChecker,
    a: &ResultValue,
    b: &ResultValue,
    delta: f64,
) -> bool {
    match (a, b) {
        (ResultValue::DoubleArray(x), ResultValue::DoubleArray(y)) => double_slices_equal(x, y, delta),
        _ => false,
    }
}

pub(crate) fn compare_list(checker: &EqualityChecker, a: &ResultValue, b: &ResultValue, delta: f64) -> bool {
    match (a, b) {
        (ResultValue::List(x), ResultValue::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(u, v)| checker.equal(u, v, delta))
        }
        _ => false,
    }
}

pub(crate) fn compare_record(checker: &EqualityChecker, a: &ResultValue, b: &ResultValue, delta: f64) -> bool {
    match (a, b) {
        (ResultValue::Record(x), ResultValue::Record(y)) => {
            x.type_name == y.type_name
                && x.fields.len() == y.fields.len()
                && x.fields.iter().all(|(name, value)| {
                    y.fields
                        .get(name)
                        .is_some_and(|other| checker.equal(value, other, delta))
                })
        }
        _ => false,
    }
}

pub(crate) fn compare_currency_amount(
    _: &EqualityChecker,
    a: &ResultValue,
    b: &ResultValue,
    delta: f64,
) -> bool {
    match (a, b) {
        (ResultValue::CurrencyAmount(x), ResultValue::CurrencyAmount(y)) => {
            x.currency == y.currency && doubles_equal(x.amount, y.amount, delta)
        }
        _ => false,
    }
}

/// Amounts in the same currency set, each within `delta`.
pub(crate) fn compare_multiple_currency_amount(
    _: &EqualityChecker,
    a: &ResultValue,
    b: &ResultValue,
    delta: f64,
) -> bool {
    match (a, b) {
        (ResultValue::MultipleCurrencyAmount(x), ResultValue::MultipleCurrencyAmount(y)) => {
            x.len() == y.len()
                && x.iter().all(|(currency, amount)| {
                    y.get(currency)
                        .is_some_and(|other| doubles_equal(*amount, *other, delta))
                })
        }
        _ => false,
    }
}

pub(crate) fn compare_labelled_matrix(
    _: &EqualityChecker,
    a: &ResultValue,
    b: &ResultValue,
    delta: f64,
) -> bool {
    match (a, b) {
        (ResultValue::LabelledMatrix1D(x), ResultValue::LabelledMatrix1D(y)) => {
            double_slices_equal(&x.keys, &y.keys, delta)
                && double_slices_equal(&x.values, &y.values, delta)
                && x.labels == y.labels
        }
        _ => false,
    }
}

pub(crate) fn compare_curve(_: &EqualityChecker, a: &ResultValue, b: &ResultValue, delta: f64) -> bool {
    match (a, b) {
        (ResultValue::Curve(x), ResultValue::Curve(y)) => {
            x.name == y.name && curve_functions_equal(&x.function, &y.function, delta)
        }
        _ => false,
    }
}

fn curve_functions_equal(a: &CurveFunction, b: &CurveFunction, delta: f64) -> bool {
    match (a, b) {
        (CurveFunction::Constant { level: x }, CurveFunction::Constant { level: y }) => {
            doubles_equal(*x, *y, delta)
        }
        (
            CurveFunction::Interpolated {
                xs: xa,
                ys: ya,
                interpolator: ia,
            },
            CurveFunction::Interpolated {
                xs: xb,
                ys: yb,
                interpolator: ib,
            },
        ) => ia == ib && double_slices_equal(xa, xb, delta) && double_slices_equal(ya, yb, delta),
        (
            CurveFunction::NelsonSiegel {
                beta0: a0,
                beta1: a1,
                beta2: a2,
                lambda: al,
            },
            CurveFunction::NelsonSiegel {
                beta0: b0,
                beta1: b1,
                beta2: b2,
                lambda: bl,
            },
        ) => double_slices_equal(&[*a0, *a1, *a2, *al], &[*b0, *b1, *b2, *bl], delta),
        (
            CurveFunction::Shifted {
                base: base_a,
                shift: shift_a,
            },
            CurveFunction::Shifted {
                base: base_b,
                shift: shift_b,
            },
        ) => doubles_equal(*shift_a, *shift_b, delta) && curve_functions_equal(base_a, base_b, delta),
        _ => false,
    }
}

pub(crate) fn compare_factory_call(
    checker: &EqualityChecker,
    a: &ResultValue,
    b: &ResultValue,
    delta: f64,
) -> bool {
    match (a, b) {
        (ResultValue::FactoryCall(x), ResultValue::FactoryCall(y)) => {
            x.outer_type == y.outer_type
                && x.method_name == y.method_name
                && x.arguments.len() == y.arguments.len()
                && x
                    .arguments
                    .iter()
                    .zip(&y.arguments)
                    .all(|(u, v)| checker.equal(u, v, delta))
        }
        _ => false,
    }
}
