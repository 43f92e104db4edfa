//! Computed values captured from a view run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::utils::float_serde::{float_serde, float_serde_map, float_serde_vec};

/// A value produced by the calculation engine.
///
/// Factory-built shapes (curves, factory calls) are explicit variants so two
/// values can be compared structurally without inspecting closures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ResultValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(#[serde(with = "float_serde")] f64),
    Text(String),
    DoubleArray(#[serde(with = "float_serde_vec")] Vec<f64>),
    List(Vec<ResultValue>),
    Record(ValueRecord),
    CurrencyAmount(CurrencyAmount),
    /// Amounts keyed by ISO currency code.
    MultipleCurrencyAmount(#[serde(with = "float_serde_map")] BTreeMap<String, f64>),
    LabelledMatrix1D(LabelledMatrix1D),
    Curve(Curve),
    FactoryCall(FactoryCall),
}

/// Discriminant of a [`ResultValue`], used to key comparators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Double,
    Text,
    DoubleArray,
    List,
    Record,
    CurrencyAmount,
    MultipleCurrencyAmount,
    LabelledMatrix1D,
    Curve,
    FactoryCall,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl ResultValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ResultValue::Null => ValueKind::Null,
            ResultValue::Boolean(_) => ValueKind::Boolean,
            ResultValue::Integer(_) => ValueKind::Integer,
            ResultValue::Double(_) => ValueKind::Double,
            ResultValue::Text(_) => ValueKind::Text,
            ResultValue::DoubleArray(_) => ValueKind::DoubleArray,
            ResultValue::List(_) => ValueKind::List,
            ResultValue::Record(_) => ValueKind::Record,
            ResultValue::CurrencyAmount(_) => ValueKind::CurrencyAmount,
            ResultValue::MultipleCurrencyAmount(_) => ValueKind::MultipleCurrencyAmount,
            ResultValue::LabelledMatrix1D(_) => ValueKind::LabelledMatrix1D,
            ResultValue::Curve(_) => ValueKind::Curve,
            ResultValue::FactoryCall(_) => ValueKind::FactoryCall,
        }
    }

    /// Finer-grained type name for variants that carry one.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            ResultValue::Record(record) => Some(&record.type_name),
            ResultValue::FactoryCall(call) => Some(&call.outer_type),
            ResultValue::Curve(curve) => Some(curve.function.shape()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ResultValue::Double(value) => Some(*value),
            ResultValue::Integer(value) => Some(*value as f64),
            ResultValue::CurrencyAmount(amount) => Some(amount.amount),
            _ => None,
        }
    }

    /// Short rendering for reports.
    pub fn summary(&self) -> String {
        match self {
            ResultValue::Null => "null".to_string(),
            ResultValue::Boolean(value) => value.to_string(),
            ResultValue::Integer(value) => value.to_string(),
            ResultValue::Double(value) => value.to_string(),
            ResultValue::Text(value) => format!("\"{}\"", value),
            ResultValue::DoubleArray(values) => format!("double[{}]", values.len()),
            ResultValue::List(values) => format!("list[{}]", values.len()),
            ResultValue::Record(record) => format!("{}{{{} fields}}", record.type_name, record.fields.len()),
            ResultValue::CurrencyAmount(amount) => format!("{} {}", amount.currency, amount.amount),
            ResultValue::MultipleCurrencyAmount(amounts) => amounts
                .iter()
                .map(|(currency, amount)| format!("{} {}", currency, amount))
                .collect::<Vec<_>>()
                .join(", "),
            ResultValue::LabelledMatrix1D(matrix) => format!("matrix[{}]", matrix.keys.len()),
            ResultValue::Curve(curve) => format!("curve {} ({})", curve.name, curve.function.shape()),
            ResultValue::FactoryCall(call) => {
                format!("{}.{}({} args)", call.outer_type, call.method_name, call.arguments.len())
            }
        }
    }
}

impl From<f64> for ResultValue {
    fn from(value: f64) -> Self {
        ResultValue::Double(value)
    }
}

impl From<i64> for ResultValue {
    fn from(value: i64) -> Self {
        ResultValue::Integer(value)
    }
}

impl From<&str> for ResultValue {
    fn from(value: &str) -> Self {
        ResultValue::Text(value.to_string())
    }
}

/// Structured value object compared field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRecord {
    pub type_name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, ResultValue>,
}

impl ValueRecord {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<ResultValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyAmount {
    pub currency: String,
    #[serde(with = "float_serde")]
    pub amount: f64,
}

/// One-dimensional labelled matrix: parallel keys, values and labels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelledMatrix1D {
    #[serde(with = "float_serde_vec")]
    pub keys: Vec<f64>,
    #[serde(with = "float_serde_vec")]
    pub values: Vec<f64>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curve {
    pub name: String,
    pub function: CurveFunction,
}

/// Shape of a curve, described by the data its factory was called with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum CurveFunction {
    Constant {
        #[serde(with = "float_serde")]
        level: f64,
    },
    #[serde(rename_all = "camelCase")]
    Interpolated {
        #[serde(with = "float_serde_vec")]
        xs: Vec<f64>,
        #[serde(with = "float_serde_vec")]
        ys: Vec<f64>,
        interpolator: String,
    },
    NelsonSiegel {
        #[serde(with = "float_serde")]
        beta0: f64,
        #[serde(with = "float_serde")]
        beta1: f64,
        #[serde(with = "float_serde")]
        beta2: f64,
        #[serde(with = "float_serde")]
        lambda: f64,
    },
    Shifted {
        base: Box<CurveFunction>,
        #[serde(with = "float_serde")]
        shift: f64,
    },
}

impl CurveFunction {
    pub fn shape(&self) -> &'static str {
        match self {
            CurveFunction::Constant { .. } => "constant",
            CurveFunction::Interpolated { .. } => "interpolated",
            CurveFunction::NelsonSiegel { .. } => "nelsonSiegel",
            CurveFunction::Shifted { .. } => "shifted",
        }
    }
}

/// Descriptor of a value rebuilt by calling `outer_type::method_name` with
/// `arguments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryCall {
    pub outer_type: String,
    pub method_name: String,
    #[serde(default)]
    pub arguments: Vec<ResultValue>,
}
