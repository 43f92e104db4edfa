use anyhow::{bail, Context};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{info, warn};

use crate::main_lib::open_dump;
use regression_core::compare::{ReportGenerator, ResultComparator};
use regression_core::config::RegressionConfig;
use regression_core::dump::{DatabaseDump, IdMappings};
use regression_core::equality::EqualityChecker;
use regression_core::golden_copy::{GoldenCopy, GoldenCopyPersistence};
use regression_core::restore::DatabaseRestore;
use regression_core::transport::JsonCodec;
use regression_storage_sqlite::open_masters;

pub async fn dump(db: &Path, output: &Path, previous: Option<&Path>) -> anyhow::Result<()> {
    let masters = open_masters(db).with_context(|| format!("opening {}", db.display()))?;

    let mapping_source = previous.unwrap_or(output);
    let id_mappings = if mapping_source.exists() {
        IdMappings::load(&mut open_dump(mapping_source)?)?
    } else {
        IdMappings::new()
    };

    let mut io = open_dump(output)?;
    let summary = DatabaseDump::new(masters, id_mappings).dump(&mut io)?;
    for (kind, count) in &summary.counts {
        info!("{:>14}: {}", kind.to_string(), count);
    }
    println!(
        "Dumped {} records to {} ({} new ids)",
        summary.total(),
        output.display(),
        summary.new_ids
    );
    Ok(())
}

pub async fn restore(input: &Path, db: &Path) -> anyhow::Result<()> {
    let masters = open_masters(db).with_context(|| format!("opening {}", db.display()))?;
    let mut io = open_dump(input)?;
    let summary = DatabaseRestore::new(masters).restore(&mut io).await?;

    if summary.dangling_references > 0 {
        warn!(
            "{} references pointed outside the dump and were cleared",
            summary.dangling_references
        );
    }
    println!("Restored {} records into {}", summary.total(), db.display());
    Ok(())
}

/// Compares two golden copies. Fails after printing the report when they
/// differ, so the exit status reflects the outcome.
pub fn compare(
    base: &Path,
    test: &Path,
    delta: Option<f64>,
    properties: bool,
    report: Option<&Path>,
    config: &RegressionConfig,
) -> anyhow::Result<()> {
    let base_copy = load(base)?;
    let test_copy = load(test)?;
    let config = match delta {
        Some(delta) => config.clone().with_delta(delta)?,
        None => config.clone(),
    };
    let check_properties = properties || config.compare_properties;

    let difference = ResultComparator::new(EqualityChecker::new(), config.delta)
        .with_property_check(check_properties)
        .compare(&base_copy.calculation_results, &test_copy.calculation_results);
    let generator = ReportGenerator::new(&difference)
        .with_title(format!(
            "Comparison of {} against {}",
            test.display(),
            base.display()
        ))
        .with_properties(check_properties);

    print!("{}", generator.render());
    if let Some(path) = report {
        generator.write_file(path)?;
        info!("Report written to {}", path.display());
    }

    if !difference.is_empty(check_properties) {
        bail!("results differ from {}", base.display());
    }
    Ok(())
}

pub fn show(path: &Path) -> anyhow::Result<()> {
    print!("{}", describe(&load(path)?));
    Ok(())
}

fn load(path: &Path) -> anyhow::Result<GoldenCopy> {
    GoldenCopyPersistence::load_file(path, JsonCodec::pretty())
        .with_context(|| format!("loading golden copy {}", path.display()))
}

fn describe(golden_copy: &GoldenCopy) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "View:           {}", golden_copy.view_name);
    let _ = writeln!(out, "Snapshot:       {}", golden_copy.snapshot_name);
    let _ = writeln!(out, "Valuation time: {}", golden_copy.valuation_time.to_rfc3339());
    let _ = writeln!(out, "Version:        {}", golden_copy.version);
    let _ = writeln!(out, "Results:        {}", golden_copy.calculation_results.len());
    for (key, value) in golden_copy.calculation_results.iter() {
        let _ = writeln!(out, "  {} = {}", key, value.value.summary());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use regression_core::results::{
        CalculatedValue, CalculationResultKey, CalculationResults, ComputationTargetType,
        ValueProperties,
    };
    use tempfile::tempdir;

    fn golden(dir: &Path, snapshot: &str, pv: f64) -> std::path::PathBuf {
        let results: CalculationResults = [(
            CalculationResultKey::for_node_path(
                "Default",
                "PV",
                ValueProperties::new(),
                vec!["Root".to_string()],
            ),
            CalculatedValue::new(pv, ComputationTargetType::PortfolioNode, "Root"),
        )]
        .into_iter()
        .collect();
        let copy = GoldenCopy::create(
            snapshot,
            "Risk",
            Utc.with_ymd_and_hms(2024, 6, 28, 17, 0, 0).unwrap(),
            results,
        );
        GoldenCopyPersistence::new(dir, JsonCodec::pretty())
            .unwrap()
            .save(&copy)
            .unwrap()
    }

    #[test]
    fn test_compare_within_tolerance_succeeds() {
        let dir = tempdir().unwrap();
        let base = golden(dir.path(), "A", 100.0);
        let test = golden(dir.path(), "B", 100.0000001);
        let report = dir.path().join("out").join("report.txt");

        compare(&base, &test, None, false, Some(&report), &RegressionConfig::default()).unwrap();
        assert!(std::fs::read_to_string(report).unwrap().contains("Equal:                1"));
    }

    #[test]
    fn test_compare_outside_tolerance_fails() {
        let dir = tempdir().unwrap();
        let base = golden(dir.path(), "A", 100.0);
        let test = golden(dir.path(), "B", 101.0);

        let config = RegressionConfig::default();
        assert!(compare(&base, &test, None, false, None, &config).is_err());
        compare(&base, &test, Some(2.0), false, None, &config).unwrap();
    }

    #[test]
    fn test_describe_lists_results() {
        let dir = tempdir().unwrap();
        let path = golden(dir.path(), "EOD", 42.0);
        let text = describe(&load(&path).unwrap());

        assert!(text.contains("View:           Risk"));
        assert!(text.contains("Results:        1"));
        assert!(text.contains("42"));
    }

    #[test]
    fn test_missing_golden_copy_is_reported() {
        let dir = tempdir().unwrap();
        let err = show(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
