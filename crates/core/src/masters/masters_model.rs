//! Entity records held by the masters and carried through dump and restore.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::REGRESSION_ID_ATTRIBUTE;
use crate::identity::{ExternalId, ExternalIdBundle, ObjectId};
use crate::utils::float_serde::{float_serde, float_serde_map, float_serde_option};

/// Entity category. Each category lives in its own master and its own dump
/// directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Security,
    Position,
    Portfolio,
    Config,
    TimeSeries,
    Holiday,
    Exchange,
    Snapshot,
    LegalEntity,
    Convention,
}

impl EntityKind {
    /// Restore order: every category only references categories before it.
    pub const RESTORE_ORDER: [EntityKind; 10] = [
        EntityKind::Security,
        EntityKind::Position,
        EntityKind::Portfolio,
        EntityKind::Config,
        EntityKind::TimeSeries,
        EntityKind::Holiday,
        EntityKind::Exchange,
        EntityKind::Snapshot,
        EntityKind::LegalEntity,
        EntityKind::Convention,
    ];

    /// Directory (or archive entry prefix) holding this category in a dump.
    pub fn type_name(self) -> &'static str {
        match self {
            EntityKind::Security => "securities",
            EntityKind::Position => "positions",
            EntityKind::Portfolio => "portfolios",
            EntityKind::Config => "configs",
            EntityKind::TimeSeries => "timeseries",
            EntityKind::Holiday => "holidays",
            EntityKind::Exchange => "exchanges",
            EntityKind::Snapshot => "snapshots",
            EntityKind::LegalEntity => "legalentities",
            EntityKind::Convention => "conventions",
        }
    }

    /// Short code prepended to dump identifiers, for readability only.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Security => "sec",
            EntityKind::Position => "pos",
            EntityKind::Portfolio => "prt",
            EntityKind::Config => "cfg",
            EntityKind::TimeSeries => "hts",
            EntityKind::Holiday => "hol",
            EntityKind::Exchange => "exg",
            EntityKind::Snapshot => "snp",
            EntityKind::LegalEntity => "len",
            EntityKind::Convention => "con",
        }
    }

    /// Scheme suffix used when a master mints identities for this category.
    pub fn scheme_suffix(self) -> &'static str {
        match self {
            EntityKind::Security => "Sec",
            EntityKind::Position => "Pos",
            EntityKind::Portfolio => "Prt",
            EntityKind::Config => "Cfg",
            EntityKind::TimeSeries => "Hts",
            EntityKind::Holiday => "Hol",
            EntityKind::Exchange => "Exg",
            EntityKind::Snapshot => "Snp",
            EntityKind::LegalEntity => "Len",
            EntityKind::Convention => "Con",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

fn regression_id_of(attributes: &BTreeMap<String, String>) -> Option<&str> {
    attributes.get(REGRESSION_ID_ATTRIBUTE).map(String::as_str)
}

/// Sets the regression attribute unless it is already present.
fn tag_regression_id(attributes: &mut BTreeMap<String, String>, id: &ObjectId) -> bool {
    if attributes.contains_key(REGRESSION_ID_ATTRIBUTE) {
        return false;
    }
    attributes.insert(REGRESSION_ID_ATTRIBUTE.to_string(), id.to_string());
    true
}

/// A tradable instrument.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    pub security_type: String,
    pub external_ids: ExternalIdBundle,
    pub currency: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Reference from a position or trade to a security.
///
/// The external identifiers survive a restore unchanged; only the durable
/// identity is rewritten.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityLink {
    pub object_id: Option<ObjectId>,
    pub external_ids: ExternalIdBundle,
}

impl SecurityLink {
    pub fn to_object(object_id: ObjectId) -> Self {
        Self {
            object_id: Some(object_id),
            external_ids: ExternalIdBundle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub unique_id: Option<ObjectId>,
    pub parent_position_id: Option<ObjectId>,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    pub security_link: SecurityLink,
    pub counterparty: Option<ExternalId>,
    pub trade_date: NaiveDate,
    #[serde(default, with = "float_serde_option")]
    pub premium: Option<f64>,
    pub premium_currency: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Trade {
    pub fn regression_id(&self) -> Option<&str> {
        regression_id_of(&self.attributes)
    }

    /// Records `id` as the trade's regression id unless one is already set.
    /// Returns whether the attribute was added.
    pub fn tag_regression_id(&mut self, id: &ObjectId) -> bool {
        tag_regression_id(&mut self.attributes, id)
    }
}

/// Holding of a quantity of one security, optionally broken down into trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    pub security_link: SecurityLink,
    #[serde(default)]
    pub trades: Vec<Trade>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub provider_id: Option<ExternalId>,
}

impl Position {
    pub fn regression_id(&self) -> Option<&str> {
        regression_id_of(&self.attributes)
    }

    /// Records `id` as the position's regression id unless one is already
    /// set. Returns whether the attribute was added.
    pub fn tag_regression_id(&mut self, id: &ObjectId) -> bool {
        tag_regression_id(&mut self.attributes, id)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioNode {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub child_nodes: Vec<PortfolioNode>,
    #[serde(default)]
    pub position_ids: Vec<ObjectId>,
}

impl PortfolioNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Visits this node and all descendants in pre-order, passing the path
    /// of node names from the root (inclusive).
    pub fn visit_pre_order<F>(&self, visitor: &mut F)
    where
        F: FnMut(&PortfolioNode, &[String]),
    {
        let mut path = Vec::new();
        self.visit_inner(&mut path, visitor);
    }

    fn visit_inner<F>(&self, path: &mut Vec<String>, visitor: &mut F)
    where
        F: FnMut(&PortfolioNode, &[String]),
    {
        path.push(self.name.clone());
        visitor(self, path);
        for child in &self.child_nodes {
            child.visit_inner(path, visitor);
        }
        path.pop();
    }

    /// Applies `f` to this node and every descendant.
    pub fn for_each_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut PortfolioNode),
    {
        f(self);
        for child in &mut self.child_nodes {
            child.for_each_mut(f);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    pub root_node: PortfolioNode,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// A stored configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigItem {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    pub value: ConfigValue,
}

impl ConfigItem {
    pub fn is_view_definition(&self) -> bool {
        matches!(self.value, ConfigValue::ViewDefinition(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "camelCase")]
pub enum ConfigValue {
    ViewDefinition(ViewDefinition),
    Scenario(ScenarioDefinition),
    ScenarioParameters(ScenarioParameters),
    #[serde(rename_all = "camelCase")]
    Other {
        type_name: String,
        document: serde_json::Value,
    },
}

/// What to compute, for which portfolio, under which scenarios.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition {
    pub name: String,
    pub portfolio_id: Option<ObjectId>,
    #[serde(default)]
    pub calculation_configurations: Vec<ViewCalculationConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCalculationConfiguration {
    pub name: String,
    pub scenario_id: Option<ObjectId>,
    pub scenario_parameters_id: Option<ObjectId>,
    #[serde(default)]
    pub value_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDefinition {
    pub name: String,
    /// Market data shifts keyed by curve or ticker.
    #[serde(default, with = "float_serde_map")]
    pub shifts: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioParameters {
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    #[serde(with = "float_serde")]
    pub value: f64,
}

/// Historical time series together with its descriptive metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalTimeSeries {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    pub external_ids: ExternalIdBundle,
    pub data_field: String,
    pub data_source: String,
    pub data_provider: String,
    pub observation_time: String,
    #[serde(default)]
    pub points: Vec<TimeSeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    pub holiday_type: String,
    pub region: Option<ExternalId>,
    pub currency: Option<String>,
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    pub external_ids: ExternalIdBundle,
    pub region: Option<ExternalId>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotValue {
    pub target: ExternalId,
    pub field: String,
    #[serde(default, with = "float_serde_option")]
    pub market_value: Option<f64>,
    #[serde(default, with = "float_serde_option")]
    pub override_value: Option<f64>,
}

/// Frozen set of market data values a view can be run against.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataSnapshot {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    pub basis_view_name: Option<String>,
    #[serde(default)]
    pub values: Vec<SnapshotValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalEntity {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    pub external_ids: ExternalIdBundle,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Convention {
    pub unique_id: Option<ObjectId>,
    pub name: String,
    pub convention_type: String,
    pub external_ids: ExternalIdBundle,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}
