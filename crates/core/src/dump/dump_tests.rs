//! Tests for the database dump and id mappings.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::tempdir;

    use crate::dump::*;
    use crate::errors::{Error, MasterError, Result};
    use crate::identity::ObjectId;
    use crate::masters::*;
    use crate::test_fixtures::*;
    use crate::transport::{JsonCodec, MemoryContainer, RegressionIo};

    async fn populated_masters() -> Masters {
        let masters = Masters::in_memory();
        let apple = masters.securities.add(security("AAPL")).await.unwrap();
        masters.securities.add(security("MSFT")).await.unwrap();
        let apple_id = apple.unique_id.clone().unwrap();
        let mut held = position("Apple holding", &apple_id, dec!(100));
        held.trades.push(trade(&apple_id, dec!(100)));
        let held = masters.positions.add(held).await.unwrap();
        masters
            .portfolios
            .add(portfolio("Main", &[held.unique_id.unwrap()]))
            .await
            .unwrap();
        masters
    }

    fn file_names(root: &Path, type_name: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(root.join(type_name))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_first_dump_layout() {
        let masters = populated_masters().await;
        let dir = tempdir().unwrap();
        let mut io = RegressionIo::directory(dir.path(), JsonCodec::pretty()).unwrap();

        let summary = DatabaseDump::new(masters, IdMappings::new())
            .dump(&mut io)
            .unwrap();

        assert_eq!(summary.counts[&EntityKind::Security], 2);
        assert_eq!(summary.counts[&EntityKind::Position], 1);
        assert_eq!(summary.counts[&EntityKind::Portfolio], 1);
        assert_eq!(summary.counts[&EntityKind::Holiday], 0);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.new_ids, 4);

        assert_eq!(file_names(dir.path(), "securities"), vec!["sec1.json", "sec2.json"]);
        assert_eq!(file_names(dir.path(), "positions"), vec!["pos1.json"]);
        assert_eq!(file_names(dir.path(), "portfolios"), vec!["prt1.json"]);
        assert!(dir.path().join("idMappings.json").is_file());
        assert!(!dir.path().join("holidays").exists());
    }

    #[tokio::test]
    async fn test_redump_is_byte_identical_and_new_ids_are_fresh() {
        let masters = populated_masters().await;
        let dir = tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let third = dir.path().join("third");

        let mut first_io = RegressionIo::directory(&first, JsonCodec::pretty()).unwrap();
        let summary = DatabaseDump::new(masters.clone(), IdMappings::new())
            .dump(&mut first_io)
            .unwrap();
        let first_max = summary.id_mappings.max_id();

        let previous = IdMappings::load(&mut first_io).unwrap();
        assert_eq!(previous, summary.id_mappings);

        let mut second_io = RegressionIo::directory(&second, JsonCodec::pretty()).unwrap();
        let summary = DatabaseDump::new(masters.clone(), previous.clone())
            .dump(&mut second_io)
            .unwrap();
        assert_eq!(summary.new_ids, 0);
        for type_name in ["securities", "positions", "portfolios"] {
            for name in file_names(&first, type_name) {
                let a = fs::read(first.join(type_name).join(&name)).unwrap();
                let b = fs::read(second.join(type_name).join(&name)).unwrap();
                assert_eq!(a, b, "{}/{} differs between dumps", type_name, name);
            }
        }
        assert_eq!(
            fs::read(first.join("idMappings.json")).unwrap(),
            fs::read(second.join("idMappings.json")).unwrap()
        );

        let added = masters.securities.add(security("GOOG")).await.unwrap();
        let mut third_io = RegressionIo::directory(&third, JsonCodec::pretty()).unwrap();
        let summary = DatabaseDump::new(masters, previous.clone())
            .dump(&mut third_io)
            .unwrap();

        let new_id = summary.id_mappings.get(added.unique_id.as_ref().unwrap()).unwrap();
        assert!(new_id > first_max);
        assert!(summary.id_mappings.max_id() >= new_id);
        for (object_id, dump_id) in previous.iter() {
            assert_eq!(summary.id_mappings.get(object_id), Some(dump_id));
        }
        let names = file_names(&third, "securities");
        assert_eq!(names.len(), 3);
        assert!(names.contains(&format!("sec{}.json", new_id)));
    }

    #[test]
    fn test_load_without_previous_dump_is_empty() {
        let dir = tempdir().unwrap();
        let mut io = RegressionIo::directory(dir.path().join("never"), JsonCodec::pretty()).unwrap();
        assert!(IdMappings::load(&mut io).unwrap().is_empty());

        let mut io = RegressionIo::new(JsonCodec::compact(), MemoryContainer::new());
        let loaded = IdMappings::load(&mut io).unwrap();
        assert_eq!(loaded.max_id(), 0);
    }

    #[test]
    fn test_mapping_max_only_grows() {
        let a = ObjectId::new("MemSec", "1");
        let b = ObjectId::new("MemSec", "2");
        let mappings = IdMappings::from_ids(BTreeMap::from([(a.clone(), 7)]));
        assert_eq!(mappings.max_id(), 7);

        let extended = mappings.with_new_ids([(b.clone(), 3)]);
        assert_eq!(extended.max_id(), 7);
        assert_eq!(extended.get(&a), Some(7));
        assert_eq!(extended.get(&b), Some(3));
    }

    #[tokio::test]
    async fn test_accessed_filter_dumps_only_tracked_records() {
        let masters = populated_masters().await;
        let (tracked, tracker) = masters.tracked();
        let wanted = masters.securities.search_all().unwrap()[1].clone();
        tracked.securities.get(wanted.unique_id.as_ref().unwrap()).unwrap();

        let container = MemoryContainer::new();
        let mut io = RegressionIo::new(JsonCodec::compact(), container.clone());
        let summary = DatabaseDump::new(masters, IdMappings::new())
            .with_filter(DumpFilter::Accessed(tracker))
            .dump(&mut io)
            .unwrap();

        assert_eq!(summary.total(), 1);
        let blobs = container.snapshot().unwrap();
        assert!(blobs.contains_key("securities/sec1.json"));
        assert!(!blobs.contains_key("securities/sec2.json"));
        assert!(blobs.contains_key("idMappings.json"));
    }

    /// Master whose reads always fail.
    struct BrokenMaster;

    #[async_trait]
    impl MasterTrait<Position> for BrokenMaster {
        fn search_all(&self) -> Result<Vec<Position>> {
            Err(Error::Master(MasterError::Storage("disk on fire".to_string())))
        }

        fn get(&self, object_id: &ObjectId) -> Result<Position> {
            Err(Error::Master(MasterError::NotFound(object_id.to_string())))
        }

        async fn add(&self, entity: Position) -> Result<Position> {
            Ok(entity)
        }

        async fn update(&self, entity: Position) -> Result<Position> {
            Ok(entity)
        }
    }

    #[tokio::test]
    async fn test_failed_dump_leaves_nothing_behind() {
        let mut masters = populated_masters().await;
        masters.positions = Arc::new(BrokenMaster);

        let container = MemoryContainer::new();
        let mut io = RegressionIo::new(JsonCodec::compact(), container.clone());
        let err = DatabaseDump::new(masters.clone(), IdMappings::new())
            .dump(&mut io)
            .unwrap_err();
        assert!(matches!(err, Error::Master(MasterError::Storage(_))));
        assert!(container.is_empty().unwrap());

        let dir = tempdir().unwrap();
        let archive = dir.path().join("dump.zip");
        let mut io = RegressionIo::archive(&archive, JsonCodec::compact());
        assert!(DatabaseDump::new(masters, IdMappings::new()).dump(&mut io).is_err());
        assert!(!archive.exists());
    }
}
