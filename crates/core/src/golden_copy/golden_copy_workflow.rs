use chrono::{DateTime, Utc};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use super::golden_copy_model::GoldenCopy;
use super::golden_copy_persistence::GoldenCopyPersistence;
use crate::compare::{CalculationDifference, ReportGenerator, ResultComparator};
use crate::config::RegressionConfig;
use crate::dump::{DatabaseDump, DumpFilter, DumpSummary, IdMappings};
use crate::equality::EqualityChecker;
use crate::errors::{Error, Result};
use crate::masters::Masters;
use crate::restore::{DatabaseRestore, RestoreSummary};
use crate::results::{
    CalculationResultCapture, CalculationResults, MasterTargetResolver, TargetResolverTrait,
    ViewRunnerTrait,
};
use crate::transport::{Codec, Container, JsonCodec, RegressionIo};

/// Creates golden copies and checks fresh view runs against them.
pub struct GoldenCopyWorkflow {
    runner: Arc<dyn ViewRunnerTrait>,
    checker: EqualityChecker,
    config: RegressionConfig,
}

impl GoldenCopyWorkflow {
    pub fn new(runner: Arc<dyn ViewRunnerTrait>, config: RegressionConfig) -> Self {
        Self {
            runner,
            checker: EqualityChecker::new(),
            config,
        }
    }

    /// Replaces the equality checker, e.g. one with extra comparators.
    pub fn with_checker(mut self, checker: EqualityChecker) -> Self {
        self.checker = checker;
        self
    }

    pub fn config(&self) -> &RegressionConfig {
        &self.config
    }

    /// Runs the view and captures its results as a golden copy.
    ///
    /// Untagged positions and trades are keyed by their own identity, which
    /// is the regression id a restore of these masters stamps on them.
    pub async fn create_golden_copy(
        &self,
        masters: &Masters,
        view_name: &str,
        snapshot_name: &str,
        valuation_time: DateTime<Utc>,
    ) -> Result<GoldenCopy> {
        let resolver = MasterTargetResolver::build_for_source(&*masters.positions)?;
        self.capture(masters, &resolver, view_name, snapshot_name, valuation_time)
            .await
            .map(|results| GoldenCopy::create(snapshot_name, view_name, valuation_time, results))
    }

    /// Creates a golden copy while tracking master reads, then dumps only the
    /// records the view touched.
    pub async fn create_and_dump<C: Codec, S: Container>(
        &self,
        masters: &Masters,
        view_name: &str,
        snapshot_name: &str,
        valuation_time: DateTime<Utc>,
        io: &mut RegressionIo<C, S>,
        id_mappings: IdMappings,
    ) -> Result<(GoldenCopy, DumpSummary)> {
        let (tracked, tracker) = masters.tracked();
        // Built from the untracked masters so indexing does not count as use.
        let resolver = MasterTargetResolver::build_for_source(&*masters.positions)?;
        let results = self
            .capture(&tracked, &resolver, view_name, snapshot_name, valuation_time)
            .await?;
        info!(
            "View '{}' touched {} records",
            view_name,
            tracker.len()
        );

        let summary = DatabaseDump::new(masters.clone(), id_mappings)
            .with_filter(DumpFilter::Accessed(tracker))
            .dump(io)?;
        let golden_copy = GoldenCopy::create(snapshot_name, view_name, valuation_time, results);
        Ok((golden_copy, summary))
    }

    /// Restores a dump into `destination`, reruns the view at the golden
    /// copy's valuation time and compares against the stored golden copy.
    pub async fn run_regression<C: Codec, S: Container>(
        &self,
        io: &mut RegressionIo<C, S>,
        destination: &Masters,
        view_name: &str,
        snapshot_name: &str,
    ) -> Result<RegressionOutcome> {
        let mut persistence =
            GoldenCopyPersistence::new(self.config.golden_copy_dir.clone(), JsonCodec::pretty())?;
        let golden_copy = persistence.load(view_name, snapshot_name)?;

        let restore = DatabaseRestore::new(destination.clone()).restore(io).await?;
        let resolver = MasterTargetResolver::build(&*destination.positions)?;
        let test = self
            .capture(
                destination,
                &resolver,
                view_name,
                snapshot_name,
                golden_copy.valuation_time,
            )
            .await?;

        Ok(self.outcome(&golden_copy, &test, restore))
    }

    /// Compares already captured results against a golden copy.
    pub fn compare(&self, golden_copy: &GoldenCopy, test: &CalculationResults) -> RegressionOutcome {
        self.outcome(golden_copy, test, RestoreSummary::default())
    }

    async fn capture(
        &self,
        masters: &Masters,
        resolver: &dyn TargetResolverTrait,
        view_name: &str,
        snapshot_name: &str,
        valuation_time: DateTime<Utc>,
    ) -> Result<CalculationResults> {
        info!(
            "Running view '{}' on snapshot '{}' at {}",
            view_name, snapshot_name, valuation_time
        );
        let run = self
            .runner
            .run_view(masters, view_name, snapshot_name, valuation_time)
            .await?;
        Ok(CalculationResultCapture::capture(&run, resolver))
    }

    fn outcome(
        &self,
        golden_copy: &GoldenCopy,
        test: &CalculationResults,
        restore: RestoreSummary,
    ) -> RegressionOutcome {
        let difference = ResultComparator::new(self.checker.clone(), self.config.delta)
            .with_property_check(self.config.compare_properties)
            .compare(&golden_copy.calculation_results, test);
        let title = format!(
            "Regression report for view '{}' on snapshot '{}'",
            golden_copy.view_name, golden_copy.snapshot_name
        );
        let mut outcome = RegressionOutcome {
            identifier: golden_copy.identifier(),
            difference,
            report: String::new(),
            restore,
            title,
            check_properties: self.config.compare_properties,
            report_dir: self.config.report_dir.clone(),
        };
        outcome.report = outcome.report_generator().render();
        outcome
    }
}

/// Result of one regression check.
#[derive(Debug, Clone)]
pub struct RegressionOutcome {
    /// `<view>.<snapshot>` of the golden copy checked against.
    pub identifier: String,
    pub difference: CalculationDifference,
    pub report: String,
    pub restore: RestoreSummary,
    title: String,
    check_properties: bool,
    report_dir: Option<PathBuf>,
}

impl RegressionOutcome {
    pub fn is_clean(&self) -> bool {
        self.difference.is_empty(self.check_properties)
    }

    pub fn report_generator(&self) -> ReportGenerator<'_> {
        ReportGenerator::new(&self.difference)
            .with_title(self.title.clone())
            .with_properties(self.check_properties)
    }

    /// Fails with the rendered report when anything differs, writing the
    /// report to the configured report directory first.
    pub fn assert_clean(&self) -> Result<()> {
        if self.is_clean() {
            info!("Regression check for {} passed", self.identifier);
            return Ok(());
        }

        if let Some(dir) = &self.report_dir {
            let path = dir.join(format!("{}.report.txt", self.identifier));
            if let Err(e) = self.report_generator().write_file(&path) {
                warn!("Failed to write regression report to {}: {}", path.display(), e);
            }
        }
        Err(Error::RegressionFailed(self.report.clone()))
    }
}
