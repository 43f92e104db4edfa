//! Record builders shared by unit tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::errors::{Error, Result};
use crate::identity::{ExternalId, ExternalIdBundle, ObjectId};
use crate::masters::*;
use crate::results::{
    ComputationTarget, ComputedValue, ValueProperties, ViewComputationResult, ViewRunnerTrait,
};
use crate::values::ResultValue;

pub fn security(name: &str) -> Security {
    Security {
        unique_id: None,
        name: name.to_string(),
        security_type: "EQUITY".to_string(),
        external_ids: ExternalIdBundle::of([ExternalId::new("TICKER", name)]),
        currency: Some("USD".to_string()),
        attributes: BTreeMap::new(),
    }
}

pub fn trade(security_id: &ObjectId, quantity: Decimal) -> Trade {
    Trade {
        unique_id: None,
        parent_position_id: None,
        quantity,
        security_link: SecurityLink::to_object(security_id.clone()),
        counterparty: Some(ExternalId::new("CPARTY", "BROKER")),
        trade_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        premium: Some(12.5),
        premium_currency: Some("USD".to_string()),
        attributes: BTreeMap::new(),
    }
}

pub fn position(name: &str, security_id: &ObjectId, quantity: Decimal) -> Position {
    Position {
        unique_id: None,
        name: name.to_string(),
        quantity,
        security_link: SecurityLink::to_object(security_id.clone()),
        trades: Vec::new(),
        attributes: BTreeMap::new(),
        provider_id: None,
    }
}

pub fn portfolio(name: &str, position_ids: &[ObjectId]) -> Portfolio {
    let mut root = PortfolioNode::new("Root");
    root.position_ids = position_ids.to_vec();
    Portfolio {
        unique_id: None,
        name: name.to_string(),
        root_node: root,
        attributes: BTreeMap::new(),
    }
}

pub fn scenario(name: &str) -> ConfigItem {
    let mut shifts = BTreeMap::new();
    shifts.insert("USD-OIS".to_string(), 0.0001);
    ConfigItem {
        unique_id: None,
        name: name.to_string(),
        value: ConfigValue::Scenario(ScenarioDefinition {
            name: name.to_string(),
            shifts,
        }),
    }
}

pub fn view_definition(
    name: &str,
    portfolio_id: Option<ObjectId>,
    scenario_id: Option<ObjectId>,
) -> ConfigItem {
    ConfigItem {
        unique_id: None,
        name: name.to_string(),
        value: ConfigValue::ViewDefinition(ViewDefinition {
            name: name.to_string(),
            portfolio_id,
            calculation_configurations: vec![ViewCalculationConfiguration {
                name: "Default".to_string(),
                scenario_id,
                scenario_parameters_id: None,
                value_names: vec!["PV".to_string()],
            }],
        }),
    }
}

pub fn holiday(name: &str) -> Holiday {
    Holiday {
        unique_id: None,
        name: name.to_string(),
        holiday_type: "BANK".to_string(),
        region: Some(ExternalId::new("REGION", "US")),
        currency: None,
        dates: vec![NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()],
    }
}

/// View runner valuing every position at a fixed price per unit.
///
/// Emits node, position and trade values, reading the masters the way an
/// engine would so tracking masters see every record it touches.
pub struct FixtureViewRunner {
    pub price: f64,
}

#[async_trait]
impl ViewRunnerTrait for FixtureViewRunner {
    async fn run_view(
        &self,
        masters: &Masters,
        view_name: &str,
        snapshot_name: &str,
        valuation_time: DateTime<Utc>,
    ) -> Result<ViewComputationResult> {
        let view = masters
            .configs
            .search_all()?
            .into_iter()
            .find_map(|item| match item.value {
                ConfigValue::ViewDefinition(view) if view.name == view_name => Some(view),
                _ => None,
            })
            .ok_or_else(|| Error::ViewExecution(format!("no view named '{}'", view_name)))?;
        let portfolio_id = view
            .portfolio_id
            .clone()
            .ok_or_else(|| Error::ViewExecution(format!("view '{}' has no portfolio", view_name)))?;
        let portfolio = masters.portfolios.get(&portfolio_id)?;
        let calc = view
            .calculation_configurations
            .first()
            .map(|calc| calc.name.clone())
            .unwrap_or_else(|| "Default".to_string());

        let mut values = Vec::new();
        self.price_node(masters, &portfolio.root_node, &calc, &mut values)?;
        Ok(ViewComputationResult {
            view_name: view_name.to_string(),
            snapshot_name: snapshot_name.to_string(),
            valuation_time,
            portfolio: Some(portfolio),
            values,
        })
    }
}

impl FixtureViewRunner {
    fn price_node(
        &self,
        masters: &Masters,
        node: &PortfolioNode,
        calc: &str,
        values: &mut Vec<ComputedValue>,
    ) -> Result<f64> {
        let mut total = 0.0;
        for child in &node.child_nodes {
            total += self.price_node(masters, child, calc, values)?;
        }
        for position_id in &node.position_ids {
            let position = masters.positions.get(position_id)?;
            if let Some(security_id) = &position.security_link.object_id {
                masters.securities.get(security_id)?;
            }
            for trade in &position.trades {
                if let Some(trade_id) = &trade.unique_id {
                    let pv = trade.quantity.to_f64().unwrap_or_default() * self.price;
                    values.push(pv_value(calc, ComputationTarget::trade(trade_id.clone(), "trade"), pv));
                }
            }
            let pv = position.quantity.to_f64().unwrap_or_default() * self.price;
            values.push(pv_value(
                calc,
                ComputationTarget::position(position_id.clone(), &position.name, node.unique_id.clone()),
                pv,
            ));
            total += pv;
        }
        if let Some(node_id) = &node.unique_id {
            values.push(pv_value(calc, ComputationTarget::node(node_id.clone(), &node.name), total));
        }
        Ok(total)
    }
}

fn pv_value(calc: &str, target: ComputationTarget, pv: f64) -> ComputedValue {
    ComputedValue {
        calc_config_name: calc.to_string(),
        target,
        value_name: "PV".to_string(),
        requirement_properties: ValueProperties::new(),
        specification_properties: ValueProperties::new().with("Function", "FixturePricer"),
        value: ResultValue::Double(pv),
    }
}
