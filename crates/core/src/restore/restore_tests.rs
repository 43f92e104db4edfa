//! Tests for restoring dumps into fresh masters.

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::constants::REGRESSION_ID_ATTRIBUTE;
    use crate::dump::{DatabaseDump, IdMappings};
    use crate::errors::{Error, MasterError};
    use crate::identity::ObjectId;
    use crate::masters::*;
    use crate::restore::*;
    use crate::test_fixtures::*;
    use crate::transport::{JsonCodec, MemoryContainer, RegressionIo};

    type MemoryIo = RegressionIo<JsonCodec, MemoryContainer>;

    fn dump_of(masters: &Masters) -> MemoryIo {
        let mut io = RegressionIo::new(JsonCodec::compact(), MemoryContainer::new());
        DatabaseDump::new(masters.clone(), IdMappings::new())
            .dump(&mut io)
            .unwrap();
        io
    }

    fn only<T: Clone>(records: Vec<T>) -> T {
        assert_eq!(records.len(), 1);
        records[0].clone()
    }

    #[tokio::test]
    async fn test_security_position_portfolio_round_trip() {
        let source = Masters::in_memory_with_prefix("Src");
        let s = source.securities.add(security("AAPL")).await.unwrap();
        let s_id = s.unique_id.clone().unwrap();
        let mut p = position("Apple holding", &s_id, dec!(250));
        p.trades.push(trade(&s_id, dec!(250)));
        let p = source.positions.add(p).await.unwrap();
        let p_id = p.unique_id.clone().unwrap();
        let old_trade_id = p.trades[0].unique_id.clone().unwrap();
        let f = source.portfolios.add(portfolio("Main", &[p_id.clone()])).await.unwrap();

        let mut io = dump_of(&source);
        let destination = Masters::in_memory_with_prefix("Dst");
        let summary = DatabaseRestore::new(destination.clone())
            .restore(&mut io)
            .await
            .unwrap();

        assert_eq!(summary.dangling_references, 0);
        assert_eq!(summary.count(EntityKind::Security), 1);
        assert_eq!(summary.count(EntityKind::Position), 1);
        assert_eq!(summary.count(EntityKind::Portfolio), 1);

        let s2 = only(destination.securities.search_all().unwrap());
        let s2_id = s2.unique_id.clone().unwrap();
        assert_ne!(s2_id, s_id);
        assert_eq!(summary.new_id(EntityKind::Security, &s_id), Some(&s2_id));
        assert_eq!(s2.external_ids, s.external_ids);

        let p2 = only(destination.positions.search_all().unwrap());
        let p2_id = p2.unique_id.clone().unwrap();
        assert_ne!(p2_id, p_id);
        assert_eq!(p2.regression_id(), Some(p_id.to_string().as_str()));
        assert_eq!(p2.security_link.object_id, Some(s2_id.clone()));
        assert_eq!(p2.quantity, dec!(250));

        let t2 = &p2.trades[0];
        assert_eq!(t2.regression_id(), Some(old_trade_id.to_string().as_str()));
        assert_ne!(t2.unique_id, Some(old_trade_id));
        assert_eq!(t2.parent_position_id, Some(p2_id.clone()));
        assert_eq!(t2.security_link.object_id, Some(s2_id));

        let f2 = only(destination.portfolios.search_all().unwrap());
        assert_eq!(f2.name, f.name);
        assert_eq!(f2.root_node.position_ids, vec![p2_id]);
        assert_ne!(f2.root_node.unique_id, f.root_node.unique_id);
    }

    #[tokio::test]
    async fn test_dangling_references_are_cleared_and_counted() {
        let source = Masters::in_memory_with_prefix("Src");
        let missing_security = ObjectId::new("SrcSec", "404");
        let missing_position = ObjectId::new("SrcPos", "404");
        let kept = source
            .positions
            .add(position("Orphan", &missing_security, dec!(1)))
            .await
            .unwrap();
        source
            .portfolios
            .add(portfolio(
                "Main",
                &[kept.unique_id.clone().unwrap(), missing_position],
            ))
            .await
            .unwrap();

        let mut io = dump_of(&source);
        let destination = Masters::in_memory_with_prefix("Dst");
        let summary = DatabaseRestore::new(destination.clone())
            .restore(&mut io)
            .await
            .unwrap();

        assert_eq!(summary.dangling_references, 2);
        let restored = only(destination.positions.search_all().unwrap());
        assert_eq!(restored.security_link.object_id, None);
        let restored_portfolio = only(destination.portfolios.search_all().unwrap());
        assert_eq!(
            restored_portfolio.root_node.position_ids,
            vec![restored.unique_id.unwrap()]
        );
    }

    #[tokio::test]
    async fn test_existing_regression_id_is_kept() {
        let source = Masters::in_memory_with_prefix("Src");
        let s = source.securities.add(security("AAPL")).await.unwrap();
        let mut p = position("Carried", s.unique_id.as_ref().unwrap(), dec!(5));
        p.attributes
            .insert(REGRESSION_ID_ATTRIBUTE.to_string(), "Orig~7".to_string());
        source.positions.add(p).await.unwrap();

        let mut io = dump_of(&source);
        let destination = Masters::in_memory_with_prefix("Dst");
        DatabaseRestore::new(destination.clone())
            .restore(&mut io)
            .await
            .unwrap();

        let restored = only(destination.positions.search_all().unwrap());
        assert_eq!(restored.regression_id(), Some("Orig~7"));
    }

    #[tokio::test]
    async fn test_view_references_follow_restored_configs() {
        let source = Masters::in_memory_with_prefix("Src");
        let f = source.portfolios.add(portfolio("Main", &[])).await.unwrap();
        let f_id = f.unique_id.clone().unwrap();
        let sc = source.configs.add(scenario("Shock")).await.unwrap();
        let sc_id = sc.unique_id.clone().unwrap();
        let mut view = view_definition("Risk", Some(f_id.clone()), Some(sc_id.clone()));
        if let ConfigValue::ViewDefinition(definition) = &mut view.value {
            definition.calculation_configurations[0].scenario_parameters_id =
                Some(ObjectId::new("SrcCfg", "999"));
        }
        source.configs.add(view).await.unwrap();

        let mut io = dump_of(&source);
        let destination = Masters::in_memory_with_prefix("Dst");
        let summary = DatabaseRestore::new(destination.clone())
            .restore(&mut io)
            .await
            .unwrap();

        assert_eq!(summary.count(EntityKind::Config), 2);
        assert_eq!(summary.dangling_references, 1);

        let new_portfolio = summary.new_id(EntityKind::Portfolio, &f_id).cloned();
        let new_scenario = summary.new_id(EntityKind::Config, &sc_id).cloned();
        assert!(new_scenario.is_some());

        let configs = destination.configs.search_all().unwrap();
        let restored_view = configs
            .iter()
            .find_map(|item| match &item.value {
                ConfigValue::ViewDefinition(definition) => Some(definition.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(restored_view.portfolio_id, new_portfolio);
        let calc = &restored_view.calculation_configurations[0];
        assert_eq!(calc.scenario_id, new_scenario);
        assert_eq!(calc.scenario_parameters_id, None);
    }

    #[tokio::test]
    async fn test_non_empty_destination_is_rejected() {
        let source = Masters::in_memory_with_prefix("Src");
        source.holidays.add(holiday("Christmas")).await.unwrap();
        let mut io = dump_of(&source);

        let destination = Masters::in_memory_with_prefix("Dst");
        destination.securities.add(security("AAPL")).await.unwrap();
        let err = DatabaseRestore::new(destination.clone())
            .restore(&mut io)
            .await
            .unwrap_err();

        match err {
            Error::Master(MasterError::NotEmpty(kinds)) => assert_eq!(kinds, "securities"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(destination.holidays.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_dump_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut io = RegressionIo::directory(dir.path().join("absent"), JsonCodec::pretty()).unwrap();
        let err = DatabaseRestore::new(Masters::in_memory())
            .restore(&mut io)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(crate::errors::TransportError::MissingFile(_))
        ));
    }
}
