use log::{debug, info, warn};
use std::sync::Arc;

use super::restore_model::{IdentityMap, RestoreSummary};
use crate::errors::{Error, MasterError, Result};
use crate::identity::ObjectId;
use crate::masters::*;
use crate::transport::{Codec, Container, RegressionIo};

/// Every record of a dump, decoded and sorted by original identity.
#[derive(Debug, Default)]
struct DumpContents {
    securities: Vec<Security>,
    positions: Vec<Position>,
    portfolios: Vec<Portfolio>,
    configs: Vec<ConfigItem>,
    time_series: Vec<HistoricalTimeSeries>,
    holidays: Vec<Holiday>,
    exchanges: Vec<Exchange>,
    snapshots: Vec<MarketDataSnapshot>,
    legal_entities: Vec<LegalEntity>,
    conventions: Vec<Convention>,
}

impl DumpContents {
    fn read<C: Codec, S: Container>(io: &mut RegressionIo<C, S>) -> Result<Self> {
        let mut session = io.read_session()?;
        let io: &mut RegressionIo<C, S> = &mut session;
        let contents = Self {
            securities: read_sorted(io)?,
            positions: read_sorted(io)?,
            portfolios: read_sorted(io)?,
            configs: read_sorted(io)?,
            time_series: read_sorted(io)?,
            holidays: read_sorted(io)?,
            exchanges: read_sorted(io)?,
            snapshots: read_sorted(io)?,
            legal_entities: read_sorted(io)?,
            conventions: read_sorted(io)?,
        };
        session.finish()?;
        Ok(contents)
    }
}

fn read_sorted<T: Entity, C: Codec, S: Container>(io: &mut RegressionIo<C, S>) -> Result<Vec<T>> {
    let mut records: Vec<T> = io
        .read_all::<T>(T::KIND.type_name())?
        .into_iter()
        .map(|(_, record)| record)
        .collect();
    records.sort_by(|a, b| a.object_id().cmp(&b.object_id()));
    debug!("Read {} {} from dump", records.len(), T::KIND);
    Ok(records)
}

/// Loads a dump into empty masters, translating every reference between
/// records to the identities the destination mints.
pub struct DatabaseRestore {
    masters: Masters,
}

impl DatabaseRestore {
    pub fn new(masters: Masters) -> Self {
        Self { masters }
    }

    pub async fn restore<C: Codec, S: Container>(
        &self,
        io: &mut RegressionIo<C, S>,
    ) -> Result<RestoreSummary> {
        let occupied = self.masters.non_empty_kinds()?;
        if !occupied.is_empty() {
            let kinds: Vec<&str> = occupied.iter().map(|kind| kind.type_name()).collect();
            return Err(Error::Master(MasterError::NotEmpty(kinds.join(", "))));
        }

        info!("Restoring dump from {}", io.describe());
        let contents = DumpContents::read(io)?;
        let mut run = RestoreRun::default();

        let securities = run.insert_all(&self.masters.securities, contents.securities).await?;

        let positions: Vec<Position> = contents
            .positions
            .into_iter()
            .map(|position| run.prepare_position(position, &securities))
            .collect();
        let positions = run.insert_all(&self.masters.positions, positions).await?;

        let portfolios: Vec<Portfolio> = contents
            .portfolios
            .into_iter()
            .map(|portfolio| run.prepare_portfolio(portfolio, &positions))
            .collect();
        let portfolios = run.insert_all(&self.masters.portfolios, portfolios).await?;

        // Views reference scenario configs, so the others go in first.
        let (views, others): (Vec<ConfigItem>, Vec<ConfigItem>) = contents
            .configs
            .into_iter()
            .partition(ConfigItem::is_view_definition);
        let mut configs = run.insert_all(&self.masters.configs, others).await?;
        let views: Vec<ConfigItem> = views
            .into_iter()
            .map(|view| run.prepare_view(view, &portfolios, &configs))
            .collect();
        configs.extend(run.insert_all(&self.masters.configs, views).await?);

        let time_series = run.insert_all(&self.masters.time_series, contents.time_series).await?;
        let holidays = run.insert_all(&self.masters.holidays, contents.holidays).await?;
        let exchanges = run.insert_all(&self.masters.exchanges, contents.exchanges).await?;
        let snapshots = run.insert_all(&self.masters.snapshots, contents.snapshots).await?;
        let legal_entities = run
            .insert_all(&self.masters.legal_entities, contents.legal_entities)
            .await?;
        let conventions = run.insert_all(&self.masters.conventions, contents.conventions).await?;

        let summary = &mut run.summary;
        for (kind, map) in [
            (EntityKind::Security, securities),
            (EntityKind::Position, positions),
            (EntityKind::Portfolio, portfolios),
            (EntityKind::Config, configs),
            (EntityKind::TimeSeries, time_series),
            (EntityKind::Holiday, holidays),
            (EntityKind::Exchange, exchanges),
            (EntityKind::Snapshot, snapshots),
            (EntityKind::LegalEntity, legal_entities),
            (EntityKind::Convention, conventions),
        ] {
            summary.restored.insert(kind, map);
        }

        info!(
            "Restore complete: {} records, {} dangling references",
            run.summary.total(),
            run.summary.dangling_references
        );
        Ok(run.summary)
    }
}

/// State of one restore pass.
#[derive(Default)]
struct RestoreRun {
    summary: RestoreSummary,
}

impl RestoreRun {
    /// Adds `records` in order, returning old to new identities.
    async fn insert_all<T: Entity>(
        &mut self,
        master: &Arc<dyn MasterTrait<T>>,
        records: Vec<T>,
    ) -> Result<IdentityMap> {
        let mut map = IdentityMap::new();
        for mut record in records {
            let old = record.object_id().cloned();
            record.clear_ids();
            let stored = master.add(record).await?;
            let new = stored.object_id().cloned().ok_or_else(|| {
                Error::Master(MasterError::InvalidRecord(format!(
                    "{} master returned '{}' without an identity",
                    T::KIND,
                    stored.name()
                )))
            })?;
            match old {
                Some(old) => {
                    debug!("Restored {} {} as {}", T::KIND, old, new);
                    map.insert(old, new);
                }
                None => {
                    warn!("Dumped {} '{}' had no identity", T::KIND, stored.name());
                    self.summary.unidentified_records += 1;
                }
            }
        }
        if !map.is_empty() {
            info!("Restored {} {}", map.len(), T::KIND);
        }
        Ok(map)
    }

    /// Rewrites `field` through `map`, clearing it when the target was not
    /// part of the dump.
    fn remap(&mut self, map: &IdentityMap, field: &mut Option<ObjectId>, owner: &str) {
        let Some(old) = field.take() else {
            return;
        };
        match map.get(&old) {
            Some(new) => *field = Some(new.clone()),
            None => {
                warn!("{} references {} which is not in the dump; clearing it", owner, old);
                self.summary.dangling_references += 1;
            }
        }
    }

    fn prepare_position(&mut self, mut position: Position, securities: &IdentityMap) -> Position {
        if let Some(old) = position.unique_id.clone() {
            position.tag_regression_id(&old);
        }
        let owner = format!("position '{}'", position.name);
        self.remap(securities, &mut position.security_link.object_id, &owner);

        let mut trades = std::mem::take(&mut position.trades);
        for trade in &mut trades {
            if let Some(old) = trade.unique_id.clone() {
                trade.tag_regression_id(&old);
            }
            let owner = format!("trade in position '{}'", position.name);
            self.remap(securities, &mut trade.security_link.object_id, &owner);
        }
        position.trades = trades;
        position
    }

    fn prepare_portfolio(&mut self, mut portfolio: Portfolio, positions: &IdentityMap) -> Portfolio {
        let name = portfolio.name.clone();
        let mut dangling = 0;
        portfolio.root_node.for_each_mut(&mut |node| {
            node.position_ids.retain_mut(|old| match positions.get(old) {
                Some(new) => {
                    *old = new.clone();
                    true
                }
                None => {
                    warn!(
                        "Portfolio '{}' node '{}' holds position {} which is not in the dump; dropping it",
                        name, node.name, old
                    );
                    dangling += 1;
                    false
                }
            });
        });
        self.summary.dangling_references += dangling;
        portfolio
    }

    fn prepare_view(
        &mut self,
        mut item: ConfigItem,
        portfolios: &IdentityMap,
        configs: &IdentityMap,
    ) -> ConfigItem {
        if let ConfigValue::ViewDefinition(view) = &mut item.value {
            let owner = format!("view '{}'", view.name);
            self.remap(portfolios, &mut view.portfolio_id, &owner);
            for calc in &mut view.calculation_configurations {
                let owner = format!("view '{}' configuration '{}'", view.name, calc.name);
                self.remap(configs, &mut calc.scenario_id, &owner);
                self.remap(configs, &mut calc.scenario_parameters_id, &owner);
            }
        }
        item
    }
}
