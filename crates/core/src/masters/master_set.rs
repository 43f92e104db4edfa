use std::sync::Arc;

use super::masters_model::*;
use super::masters_traits::{Entity, MasterTrait};
use super::memory_master::InMemoryMaster;
use super::tracking_master::{AccessTracker, TrackingMaster};
use crate::errors::Result;

/// One master per entity category, as seen by dump and restore.
#[derive(Clone)]
pub struct Masters {
    pub securities: Arc<dyn MasterTrait<Security>>,
    pub positions: Arc<dyn MasterTrait<Position>>,
    pub portfolios: Arc<dyn MasterTrait<Portfolio>>,
    pub configs: Arc<dyn MasterTrait<ConfigItem>>,
    pub time_series: Arc<dyn MasterTrait<HistoricalTimeSeries>>,
    pub holidays: Arc<dyn MasterTrait<Holiday>>,
    pub exchanges: Arc<dyn MasterTrait<Exchange>>,
    pub snapshots: Arc<dyn MasterTrait<MarketDataSnapshot>>,
    pub legal_entities: Arc<dyn MasterTrait<LegalEntity>>,
    pub conventions: Arc<dyn MasterTrait<Convention>>,
}

fn in_memory<T: Entity>() -> Arc<dyn MasterTrait<T>> {
    Arc::new(InMemoryMaster::<T>::for_kind())
}

fn in_memory_with<T: Entity>(prefix: &str) -> Arc<dyn MasterTrait<T>> {
    Arc::new(InMemoryMaster::<T>::new(format!(
        "{}{}",
        prefix,
        T::KIND.scheme_suffix()
    )))
}

fn tracking<T: Entity>(
    inner: &Arc<dyn MasterTrait<T>>,
    tracker: &Arc<AccessTracker>,
) -> Arc<dyn MasterTrait<T>> {
    Arc::new(TrackingMaster::new(inner.clone(), tracker.clone()))
}

impl Masters {
    /// A fresh, empty set of in-memory masters.
    pub fn in_memory() -> Self {
        Self {
            securities: in_memory(),
            positions: in_memory(),
            portfolios: in_memory(),
            configs: in_memory(),
            time_series: in_memory(),
            holidays: in_memory(),
            exchanges: in_memory(),
            snapshots: in_memory(),
            legal_entities: in_memory(),
            conventions: in_memory(),
        }
    }

    /// Empty in-memory masters minting identities under `prefix`, so two
    /// sets never hand out equal identities.
    pub fn in_memory_with_prefix(prefix: &str) -> Self {
        Self {
            securities: in_memory_with(prefix),
            positions: in_memory_with(prefix),
            portfolios: in_memory_with(prefix),
            configs: in_memory_with(prefix),
            time_series: in_memory_with(prefix),
            holidays: in_memory_with(prefix),
            exchanges: in_memory_with(prefix),
            snapshots: in_memory_with(prefix),
            legal_entities: in_memory_with(prefix),
            conventions: in_memory_with(prefix),
        }
    }

    /// Wraps every master in a tracking decorator sharing one tracker.
    pub fn tracked(&self) -> (Masters, Arc<AccessTracker>) {
        let tracker = Arc::new(AccessTracker::new());
        let masters = Self {
            securities: tracking(&self.securities, &tracker),
            positions: tracking(&self.positions, &tracker),
            portfolios: tracking(&self.portfolios, &tracker),
            configs: tracking(&self.configs, &tracker),
            time_series: tracking(&self.time_series, &tracker),
            holidays: tracking(&self.holidays, &tracker),
            exchanges: tracking(&self.exchanges, &tracker),
            snapshots: tracking(&self.snapshots, &tracker),
            legal_entities: tracking(&self.legal_entities, &tracker),
            conventions: tracking(&self.conventions, &tracker),
        };
        (masters, tracker)
    }

    /// Record count per category, in restore order.
    pub fn counts(&self) -> Result<Vec<(EntityKind, usize)>> {
        Ok(vec![
            (EntityKind::Security, self.securities.count()?),
            (EntityKind::Position, self.positions.count()?),
            (EntityKind::Portfolio, self.portfolios.count()?),
            (EntityKind::Config, self.configs.count()?),
            (EntityKind::TimeSeries, self.time_series.count()?),
            (EntityKind::Holiday, self.holidays.count()?),
            (EntityKind::Exchange, self.exchanges.count()?),
            (EntityKind::Snapshot, self.snapshots.count()?),
            (EntityKind::LegalEntity, self.legal_entities.count()?),
            (EntityKind::Convention, self.conventions.count()?),
        ])
    }

    /// Categories that already hold records.
    pub fn non_empty_kinds(&self) -> Result<Vec<EntityKind>> {
        Ok(self
            .counts()?
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(kind, _)| kind)
            .collect())
    }
}
