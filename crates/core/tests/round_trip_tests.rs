//! Integration tests for dumping a database and restoring it elsewhere,
//! through both container layouts.

mod common;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use regression_core::dump::{DatabaseDump, DumpFilter, IdMappings};
use regression_core::identity::ObjectId;
use regression_core::masters::*;
use regression_core::restore::{DatabaseRestore, RestoreSummary};
use regression_core::transport::{container_for_path, Container, Codec, JsonCodec, RegressionIo};
use tempfile::tempdir;

async fn dump_and_restore<C: Codec, S: Container>(
    source: &Masters,
    io: &mut RegressionIo<C, S>,
) -> (Masters, RestoreSummary) {
    DatabaseDump::new(source.clone(), IdMappings::new())
        .dump(io)
        .unwrap();
    let destination = Masters::in_memory_with_prefix("Dst");
    let summary = DatabaseRestore::new(destination.clone())
        .restore(io)
        .await
        .unwrap();
    (destination, summary)
}

/// Every link in `masters` resolves to a record in `masters`.
fn assert_references_resolve(masters: &Masters) {
    let securities: BTreeSet<ObjectId> = masters
        .securities
        .search_all()
        .unwrap()
        .into_iter()
        .filter_map(|s| s.unique_id)
        .collect();
    let positions = masters.positions.search_all().unwrap();
    let position_ids: BTreeSet<ObjectId> =
        positions.iter().filter_map(|p| p.unique_id.clone()).collect();

    for position in &positions {
        let link = position.security_link.object_id.as_ref().unwrap();
        assert!(securities.contains(link), "position links unknown {}", link);
        for trade in &position.trades {
            assert!(securities.contains(trade.security_link.object_id.as_ref().unwrap()));
        }
    }

    for portfolio in masters.portfolios.search_all().unwrap() {
        portfolio.root_node.visit_pre_order(&mut |node, _| {
            for id in &node.position_ids {
                assert!(position_ids.contains(id), "node holds unknown {}", id);
            }
        });
        let portfolio_id = portfolio.unique_id.clone().unwrap();
        for item in masters.configs.search_all().unwrap() {
            if let ConfigValue::ViewDefinition(view) = item.value {
                assert_eq!(view.portfolio_id.as_ref(), Some(&portfolio_id));
            }
        }
    }
}

/// Records of one category with identities cleared, by name.
fn without_ids<T: Entity>(master: &dyn MasterTrait<T>) -> Vec<T> {
    let mut records = master.search_all().unwrap();
    for record in &mut records {
        record.clear_ids();
    }
    records.sort_by(|a, b| a.name().cmp(b.name()));
    records
}

fn assert_same_records<T: Entity + PartialEq>(
    source: &dyn MasterTrait<T>,
    destination: &dyn MasterTrait<T>,
) {
    let expected = without_ids(source);
    assert_eq!(expected.len(), 1, "fixture holds one {}", T::KIND);
    assert_eq!(without_ids(destination), expected);
}

fn assert_restored_copy(source: &Masters, destination: &Masters, summary: &RestoreSummary) {
    assert_eq!(summary.count(EntityKind::Security), 3);
    assert_eq!(summary.count(EntityKind::Position), 2);
    assert_eq!(summary.count(EntityKind::Portfolio), 1);
    assert_eq!(summary.count(EntityKind::Config), 1);
    for kind in [
        EntityKind::TimeSeries,
        EntityKind::Holiday,
        EntityKind::Exchange,
        EntityKind::Snapshot,
        EntityKind::LegalEntity,
        EntityKind::Convention,
    ] {
        assert_eq!(summary.count(kind), 1, "{} not restored", kind);
    }
    assert_eq!(summary.dangling_references, 0);
    assert_references_resolve(destination);

    // Categories without references come back unchanged apart from identity.
    assert_same_records(&*source.time_series, &*destination.time_series);
    assert_same_records(&*source.holidays, &*destination.holidays);
    assert_same_records(&*source.exchanges, &*destination.exchanges);
    assert_same_records(&*source.snapshots, &*destination.snapshots);
    assert_same_records(&*source.legal_entities, &*destination.legal_entities);
    assert_same_records(&*source.conventions, &*destination.conventions);

    // Each restored position remembers the identity it had in the source.
    let source_positions = source.positions.search_all().unwrap();
    for original in &source_positions {
        let old_id = original.unique_id.as_ref().unwrap();
        let new_id = summary.new_id(EntityKind::Position, old_id).unwrap();
        let restored = destination.positions.get(new_id).unwrap();
        assert_eq!(restored.regression_id(), Some(old_id.to_string().as_str()));
        assert_eq!(restored.name, original.name);
        assert_eq!(restored.quantity, original.quantity);

        let old_trades: Vec<String> = original
            .trades
            .iter()
            .map(|t| t.unique_id.as_ref().unwrap().to_string())
            .collect();
        let tagged: Vec<&str> = restored
            .trades
            .iter()
            .filter_map(|t| t.regression_id())
            .collect();
        assert_eq!(tagged, old_trades);
    }
}

#[tokio::test]
async fn test_directory_round_trip_keeps_references() {
    let dir = tempdir().unwrap();
    let source = common::populated("Src").await;
    let mut io = RegressionIo::directory(dir.path().join("dump"), JsonCodec::pretty()).unwrap();

    let (destination, summary) = dump_and_restore(&source, &mut io).await;
    assert_restored_copy(&source, &destination, &summary);
}

#[tokio::test]
async fn test_archive_round_trip_keeps_references() {
    let dir = tempdir().unwrap();
    let source = common::populated("Src").await;
    let mut io = RegressionIo::archive(dir.path().join("dump.zip"), JsonCodec::compact());

    let (destination, summary) = dump_and_restore(&source, &mut io).await;
    assert!(dir.path().join("dump.zip").is_file());
    assert_restored_copy(&source, &destination, &summary);
}

#[tokio::test]
async fn test_container_is_chosen_from_path() {
    let dir = tempdir().unwrap();
    let source = common::populated("Src").await;

    for name in ["boxed.zip", "boxed"] {
        let path = dir.path().join(name);
        let mut io = RegressionIo::new(JsonCodec::pretty(), container_for_path(&path).unwrap());
        let (destination, summary) = dump_and_restore(&source, &mut io).await;
        assert_restored_copy(&source, &destination, &summary);
    }
    assert!(dir.path().join("boxed.zip").is_file());
    assert!(dir.path().join("boxed").join("securities").is_dir());
}

fn read_tree(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut entries = Vec::new();
    for category in fs::read_dir(root).unwrap() {
        let category = category.unwrap().path();
        if category.is_dir() {
            for file in fs::read_dir(&category).unwrap() {
                let file = file.unwrap().path();
                let name = format!(
                    "{}/{}",
                    category.file_name().unwrap().to_string_lossy(),
                    file.file_name().unwrap().to_string_lossy()
                );
                entries.push((name, fs::read(&file).unwrap()));
            }
        }
    }
    entries.sort();
    entries
}

#[tokio::test]
async fn test_redump_with_previous_mappings_keeps_file_names() {
    let dir = tempdir().unwrap();
    let source = common::populated("Src").await;

    let first_root = dir.path().join("first");
    let mut first = RegressionIo::directory(&first_root, JsonCodec::pretty()).unwrap();
    let first_summary = DatabaseDump::new(source.clone(), IdMappings::new())
        .dump(&mut first)
        .unwrap();
    let first_files = read_tree(&first_root);

    source
        .securities
        .add(common::security("ADS"))
        .await
        .unwrap();

    let previous = IdMappings::load(&mut first).unwrap();
    assert_eq!(previous, first_summary.id_mappings);

    let second_root = dir.path().join("second");
    let mut second = RegressionIo::directory(&second_root, JsonCodec::pretty()).unwrap();
    let second_summary = DatabaseDump::new(source.clone(), previous)
        .dump(&mut second)
        .unwrap();
    let second_files = read_tree(&second_root);

    assert_eq!(second_summary.new_ids, 1);
    for entry in &first_files {
        assert!(second_files.contains(entry), "{} changed between dumps", entry.0);
    }
    let added: Vec<&String> = second_files
        .iter()
        .map(|(name, _)| name)
        .filter(|name| !first_files.iter().any(|(first, _)| first == *name))
        .collect();
    assert_eq!(
        added,
        vec![&format!("securities/sec{}.json", first_summary.id_mappings.max_id() + 1)]
    );
}

#[tokio::test]
async fn test_restored_database_dumps_to_same_shape() {
    let dir = tempdir().unwrap();
    let source = common::populated("Src").await;
    let mut io = RegressionIo::directory(dir.path().join("dump"), JsonCodec::pretty()).unwrap();
    let (destination, _) = dump_and_restore(&source, &mut io).await;

    let mut again = RegressionIo::directory(dir.path().join("again"), JsonCodec::pretty()).unwrap();
    let summary = DatabaseDump::new(destination, IdMappings::new())
        .dump(&mut again)
        .unwrap();

    assert_eq!(summary.counts[&EntityKind::Security], 3);
    assert_eq!(summary.counts[&EntityKind::Position], 2);
    assert_eq!(summary.counts[&EntityKind::Snapshot], 1);
    assert_eq!(summary.total(), 13);
}

#[tokio::test]
async fn test_redump_into_same_directory_drops_records_left_out() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("dump");
    let source = common::populated("Src").await;
    let mut io = RegressionIo::directory(&root, JsonCodec::pretty()).unwrap();
    let first = DatabaseDump::new(source.clone(), IdMappings::new())
        .dump(&mut io)
        .unwrap();
    assert_eq!(first.counts[&EntityKind::Security], 3);

    // Read a single security through tracking masters and dump only that.
    let (tracked, tracker) = source.tracked();
    let asml = source
        .securities
        .search_all()
        .unwrap()
        .into_iter()
        .find(|s| s.name == "ASML")
        .unwrap();
    tracked.securities.get(asml.unique_id.as_ref().unwrap()).unwrap();

    let previous = IdMappings::load(&mut io).unwrap();
    let second = DatabaseDump::new(source.clone(), previous)
        .with_filter(DumpFilter::Accessed(tracker))
        .dump(&mut io)
        .unwrap();
    assert_eq!(second.counts[&EntityKind::Security], 1);
    assert_eq!(second.total(), 1);
    assert_eq!(fs::read_dir(root.join("securities")).unwrap().count(), 1);
    assert!(!root.join("holidays").exists());

    let destination = Masters::in_memory_with_prefix("Dst");
    let summary = DatabaseRestore::new(destination.clone())
        .restore(&mut io)
        .await
        .unwrap();
    assert_eq!(summary.total(), 1);
    let restored = destination.securities.search_all().unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].name, "ASML");
}
