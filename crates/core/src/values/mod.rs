//! Values module - the tagged union of computed result values.

mod values_model;

pub use values_model::{
    CurrencyAmount, Curve, CurveFunction, FactoryCall, LabelledMatrix1D, ResultValue, ValueKind,
    ValueRecord,
};
