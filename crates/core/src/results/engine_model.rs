//! Output of a view run, as handed over by the calculation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::results_model::ValueProperties;
use crate::identity::ObjectId;
use crate::masters::Portfolio;
use crate::values::ResultValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputationTargetType {
    PortfolioNode,
    Position,
    Trade,
    Security,
    Primitive,
}

/// What a value was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationTarget {
    pub target_type: ComputationTargetType,
    pub id: ObjectId,
    pub name: String,
    /// Node holding a position target, when known.
    pub parent_node_id: Option<ObjectId>,
}

impl ComputationTarget {
    pub fn node(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            target_type: ComputationTargetType::PortfolioNode,
            id,
            name: name.into(),
            parent_node_id: None,
        }
    }

    pub fn position(id: ObjectId, name: impl Into<String>, parent_node_id: Option<ObjectId>) -> Self {
        Self {
            target_type: ComputationTargetType::Position,
            id,
            name: name.into(),
            parent_node_id,
        }
    }

    pub fn trade(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            target_type: ComputationTargetType::Trade,
            id,
            name: name.into(),
            parent_node_id: None,
        }
    }

    pub fn security(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            target_type: ComputationTargetType::Security,
            id,
            name: name.into(),
            parent_node_id: None,
        }
    }
}

/// One value produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedValue {
    pub calc_config_name: String,
    pub target: ComputationTarget,
    pub value_name: String,
    /// Constraints the value was requested with.
    #[serde(default)]
    pub requirement_properties: ValueProperties,
    /// Properties the engine actually resolved.
    #[serde(default)]
    pub specification_properties: ValueProperties,
    pub value: ResultValue,
}

/// Everything one view run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewComputationResult {
    pub view_name: String,
    pub snapshot_name: String,
    pub valuation_time: DateTime<Utc>,
    /// Portfolio the view was computed over, used to derive node paths.
    pub portfolio: Option<Portfolio>,
    pub values: Vec<ComputedValue>,
}
