use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::engine_model::ComputationTargetType;
use crate::values::ResultValue;

/// Named constraints attached to a computed value, each with a set of
/// allowed values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueProperties(BTreeMap<String, BTreeSet<String>>);

impl ValueProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.entry(name.into()).or_default().insert(value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ValueProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, values)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            write!(f, "{}=[{}]", name, values.join(","))?;
        }
        f.write_str("}")
    }
}

/// Identifies one captured result independently of the durable identities
/// of the database it was computed from.
///
/// Node results carry the path of node names from the root. Position and
/// trade results carry the stable id taken from their `regressionId`
/// attribute; position results also carry their parent node's path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResultKey {
    pub calc_config_name: String,
    pub value_name: String,
    #[serde(default)]
    pub properties: ValueProperties,
    pub path: Option<Vec<String>>,
    pub target_id: Option<String>,
}

impl CalculationResultKey {
    pub fn for_node_path(
        calc_config_name: impl Into<String>,
        value_name: impl Into<String>,
        properties: ValueProperties,
        path: Vec<String>,
    ) -> Self {
        Self {
            calc_config_name: calc_config_name.into(),
            value_name: value_name.into(),
            properties,
            path: Some(path),
            target_id: None,
        }
    }

    pub fn for_position(
        calc_config_name: impl Into<String>,
        value_name: impl Into<String>,
        properties: ValueProperties,
        parent_path: Option<Vec<String>>,
        target_id: Option<String>,
    ) -> Self {
        Self {
            calc_config_name: calc_config_name.into(),
            value_name: value_name.into(),
            properties,
            path: parent_path,
            target_id,
        }
    }

    pub fn for_trade(
        calc_config_name: impl Into<String>,
        value_name: impl Into<String>,
        properties: ValueProperties,
        target_id: Option<String>,
    ) -> Self {
        Self {
            calc_config_name: calc_config_name.into(),
            value_name: value_name.into(),
            properties,
            path: None,
            target_id,
        }
    }
}

/// Absent values sort after present ones.
fn cmp_present_first<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Element-wise, with a path that is a prefix of another sorting after it.
fn cmp_paths(a: &Option<Vec<String>>, b: &Option<Vec<String>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            for (u, v) in x.iter().zip(y) {
                match u.cmp(v) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            y.len().cmp(&x.len())
        }
        _ => cmp_present_first(a, b),
    }
}

impl Ord for CalculationResultKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.calc_config_name
            .cmp(&other.calc_config_name)
            .then_with(|| cmp_present_first(&self.target_id, &other.target_id))
            .then_with(|| cmp_paths(&self.path, &other.path))
            .then_with(|| self.value_name.cmp(&other.value_name))
            .then_with(|| self.properties.cmp(&other.properties))
    }
}

impl PartialOrd for CalculationResultKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CalculationResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.calc_config_name, self.value_name)?;
        if let Some(path) = &self.path {
            write!(f, " path={}", path.join("/"))?;
        }
        if let Some(target_id) = &self.target_id {
            write!(f, " target={}", target_id)?;
        }
        if !self.properties.is_empty() {
            write!(f, " {}", self.properties)?;
        }
        Ok(())
    }
}

/// A captured value with the properties the engine actually resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedValue {
    pub value: ResultValue,
    #[serde(default)]
    pub specification_properties: ValueProperties,
    pub target_type: ComputationTargetType,
    pub target_name: String,
}

impl CalculatedValue {
    pub fn new(value: impl Into<ResultValue>, target_type: ComputationTargetType, target_name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            specification_properties: ValueProperties::default(),
            target_type,
            target_name: target_name.into(),
        }
    }

    pub fn with_specification_properties(mut self, properties: ValueProperties) -> Self {
        self.specification_properties = properties;
        self
    }
}

/// Serialized form of one result; JSON object keys must be strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub key: CalculationResultKey,
    pub value: CalculatedValue,
}

/// Captured results of one view run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ResultEntry>", into = "Vec<ResultEntry>")]
pub struct CalculationResults {
    entries: BTreeMap<CalculationResultKey, CalculatedValue>,
}

impl CalculationResults {
    pub fn new(entries: BTreeMap<CalculationResultKey, CalculatedValue>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &CalculationResultKey) -> Option<&CalculatedValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &CalculationResultKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CalculationResultKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CalculationResultKey, &CalculatedValue)> {
        self.entries.iter()
    }
}

impl FromIterator<(CalculationResultKey, CalculatedValue)> for CalculationResults {
    fn from_iter<I: IntoIterator<Item = (CalculationResultKey, CalculatedValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<ResultEntry>> for CalculationResults {
    fn from(entries: Vec<ResultEntry>) -> Self {
        entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }
}

impl From<CalculationResults> for Vec<ResultEntry> {
    fn from(results: CalculationResults) -> Self {
        results
            .entries
            .into_iter()
            .map(|(key, value)| ResultEntry { key, value })
            .collect()
    }
}
