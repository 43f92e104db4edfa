//! Shared builders for the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use regression_core::identity::{ExternalId, ExternalIdBundle, ObjectId};
use regression_core::masters::*;

pub fn security(ticker: &str) -> Security {
    Security {
        unique_id: None,
        name: ticker.to_string(),
        security_type: "EQUITY".to_string(),
        external_ids: ExternalIdBundle::of([ExternalId::new("TICKER", ticker)]),
        currency: Some("EUR".to_string()),
        attributes: BTreeMap::new(),
    }
}

pub fn position_with_trades(name: &str, security_id: &ObjectId, lots: &[Decimal]) -> Position {
    let trades = lots
        .iter()
        .enumerate()
        .map(|(i, quantity)| Trade {
            unique_id: None,
            parent_position_id: None,
            quantity: *quantity,
            security_link: SecurityLink::to_object(security_id.clone()),
            counterparty: None,
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 2 + i as u32).unwrap_or_default(),
            premium: None,
            premium_currency: None,
            attributes: BTreeMap::new(),
        })
        .collect();
    Position {
        unique_id: None,
        name: name.to_string(),
        quantity: lots.iter().copied().sum(),
        security_link: SecurityLink::to_object(security_id.clone()),
        trades,
        attributes: BTreeMap::new(),
        provider_id: None,
    }
}

/// Portfolio with `Root` holding `root_positions` and one `Equities` child
/// holding `child_positions`.
pub fn two_level_portfolio(
    name: &str,
    root_positions: &[ObjectId],
    child_positions: &[ObjectId],
) -> Portfolio {
    let mut child = PortfolioNode::new("Equities");
    child.position_ids = child_positions.to_vec();
    let mut root = PortfolioNode::new("Root");
    root.position_ids = root_positions.to_vec();
    root.child_nodes.push(child);
    Portfolio {
        unique_id: None,
        name: name.to_string(),
        root_node: root,
        attributes: BTreeMap::new(),
    }
}

pub fn view(name: &str, portfolio_id: &ObjectId) -> ConfigItem {
    ConfigItem {
        unique_id: None,
        name: name.to_string(),
        value: ConfigValue::ViewDefinition(ViewDefinition {
            name: name.to_string(),
            portfolio_id: Some(portfolio_id.clone()),
            calculation_configurations: vec![ViewCalculationConfiguration {
                name: "Default".to_string(),
                scenario_id: None,
                scenario_parameters_id: None,
                value_names: vec!["PV".to_string()],
            }],
        }),
    }
}

pub fn time_series(ticker: &str) -> HistoricalTimeSeries {
    HistoricalTimeSeries {
        unique_id: None,
        name: format!("{} close", ticker),
        external_ids: ExternalIdBundle::of([ExternalId::new("TICKER", ticker)]),
        data_field: "CLOSE".to_string(),
        data_source: "EXCHANGE".to_string(),
        data_provider: "DEFAULT".to_string(),
        observation_time: "LONDON_CLOSE".to_string(),
        points: vec![
            TimeSeriesPoint {
                date: NaiveDate::from_ymd_opt(2024, 6, 27).unwrap_or_default(),
                value: 101.25,
            },
            TimeSeriesPoint {
                date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap_or_default(),
                value: 102.5,
            },
        ],
    }
}

pub fn holiday(name: &str) -> Holiday {
    Holiday {
        unique_id: None,
        name: name.to_string(),
        holiday_type: "BANK".to_string(),
        region: Some(ExternalId::new("ISO_COUNTRY", "DE")),
        currency: Some("EUR".to_string()),
        dates: vec![NaiveDate::from_ymd_opt(2024, 12, 25).unwrap_or_default()],
    }
}

pub fn exchange(mic: &str) -> Exchange {
    Exchange {
        unique_id: None,
        name: mic.to_string(),
        external_ids: ExternalIdBundle::of([ExternalId::new("MIC", mic)]),
        region: Some(ExternalId::new("ISO_COUNTRY", "DE")),
        time_zone: Some("Europe/Berlin".to_string()),
    }
}

/// Snapshot with one plain and one unbounded value.
pub fn snapshot(name: &str) -> MarketDataSnapshot {
    MarketDataSnapshot {
        unique_id: None,
        name: name.to_string(),
        basis_view_name: Some("Europe PV".to_string()),
        values: vec![
            SnapshotValue {
                target: ExternalId::new("TICKER", "SAP"),
                field: "Market_Value".to_string(),
                market_value: Some(180.4),
                override_value: None,
            },
            SnapshotValue {
                target: ExternalId::new("TICKER", "SIE"),
                field: "Market_Value".to_string(),
                market_value: Some(f64::INFINITY),
                override_value: Some(175.0),
            },
        ],
    }
}

pub fn legal_entity(name: &str) -> LegalEntity {
    LegalEntity {
        unique_id: None,
        name: name.to_string(),
        external_ids: ExternalIdBundle::of([ExternalId::new("LEI", "529900D6BF99LW9R2E68")]),
        attributes: BTreeMap::from([("rating".to_string(), "A".to_string())]),
    }
}

pub fn convention(name: &str) -> Convention {
    Convention {
        unique_id: None,
        name: name.to_string(),
        convention_type: "SWAP_LEG".to_string(),
        external_ids: ExternalIdBundle::of([ExternalId::new("CONVENTION", name)]),
        attributes: BTreeMap::from([("dayCount".to_string(), "ACT/360".to_string())]),
    }
}

/// A small but fully linked database: three securities, two positions with
/// trades, one two-level portfolio and a view over it, plus one record of
/// every other category.
pub async fn populated(prefix: &str) -> Masters {
    let masters = Masters::in_memory_with_prefix(prefix);
    let mut security_ids = Vec::new();
    for ticker in ["ASML", "SAP", "SIE"] {
        let added = masters.securities.add(security(ticker)).await.unwrap();
        security_ids.push(added.unique_id.unwrap());
    }

    let first = masters
        .positions
        .add(position_with_trades(
            "ASML",
            &security_ids[0],
            &[Decimal::from(10), Decimal::from(5)],
        ))
        .await
        .unwrap();
    let second = masters
        .positions
        .add(position_with_trades("SAP", &security_ids[1], &[Decimal::from(20)]))
        .await
        .unwrap();

    let portfolio = masters
        .portfolios
        .add(two_level_portfolio(
            "Europe",
            &[first.unique_id.unwrap()],
            &[second.unique_id.unwrap()],
        ))
        .await
        .unwrap();
    masters
        .configs
        .add(view("Europe PV", portfolio.unique_id.as_ref().unwrap()))
        .await
        .unwrap();

    masters.time_series.add(time_series("SAP")).await.unwrap();
    masters.holidays.add(holiday("Christmas")).await.unwrap();
    masters.exchanges.add(exchange("XETR")).await.unwrap();
    masters.snapshots.add(snapshot("EOD")).await.unwrap();
    masters.legal_entities.add(legal_entity("Europe Fund")).await.unwrap();
    masters.conventions.add(convention("EUR-EURIBOR-6M")).await.unwrap();
    masters
}
