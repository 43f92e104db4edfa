use log::{debug, info, warn};
use std::collections::BTreeMap;

use super::dump_model::{DumpFilter, DumpSummary, IdMappings};
use crate::constants::ID_MAPPINGS_IDENTIFIER;
use crate::errors::Result;
use crate::identity::ObjectId;
use crate::masters::{Entity, EntityKind, MasterTrait, Masters};
use crate::transport::{Codec, Container, RegressionIo};

/// Writes the contents of a set of masters to a container.
///
/// Categories are written in restore order and records within a category in
/// durable identity order, so dumping an unchanged database twice yields the
/// same entries with the same bytes.
pub struct DatabaseDump {
    masters: Masters,
    id_mappings: IdMappings,
    filter: DumpFilter,
}

impl DatabaseDump {
    pub fn new(masters: Masters, id_mappings: IdMappings) -> Self {
        Self {
            masters,
            id_mappings,
            filter: DumpFilter::All,
        }
    }

    pub fn with_filter(mut self, filter: DumpFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Dumps every category in one write session. Each category replaces
    /// whatever the container held for it before.
    ///
    /// Any failure drops the session before it finishes, which discards
    /// everything written so far.
    pub fn dump<C: Codec, S: Container>(&self, io: &mut RegressionIo<C, S>) -> Result<DumpSummary> {
        info!("Dumping masters to {}", io.describe());
        let mut session = io.write_session()?;
        let mut run = DumpRun::new(&self.id_mappings, &self.filter);
        let target: &mut RegressionIo<C, S> = &mut session;

        run.category(&*self.masters.securities, target)?;
        run.category(&*self.masters.positions, target)?;
        run.category(&*self.masters.portfolios, target)?;
        run.category(&*self.masters.configs, target)?;
        run.category(&*self.masters.time_series, target)?;
        run.category(&*self.masters.holidays, target)?;
        run.category(&*self.masters.exchanges, target)?;
        run.category(&*self.masters.snapshots, target)?;
        run.category(&*self.masters.legal_entities, target)?;
        run.category(&*self.masters.conventions, target)?;

        let new_ids = run.assigned.len();
        let id_mappings = self.id_mappings.with_new_ids(run.assigned);
        target.write(None, ID_MAPPINGS_IDENTIFIER, &id_mappings)?;
        session.finish()?;

        let summary = DumpSummary {
            counts: run.counts,
            new_ids,
            id_mappings,
        };
        info!(
            "Dump complete: {} records, {} new ids, max id {}",
            summary.total(),
            summary.new_ids,
            summary.id_mappings.max_id()
        );
        Ok(summary)
    }
}

/// State of one dump pass.
struct DumpRun<'a> {
    previous: &'a IdMappings,
    filter: &'a DumpFilter,
    assigned: BTreeMap<ObjectId, i64>,
    counts: BTreeMap<EntityKind, usize>,
}

impl<'a> DumpRun<'a> {
    fn new(previous: &'a IdMappings, filter: &'a DumpFilter) -> Self {
        Self {
            previous,
            filter,
            assigned: BTreeMap::new(),
            counts: BTreeMap::new(),
        }
    }

    fn category<T: Entity, C: Codec, S: Container>(
        &mut self,
        master: &dyn MasterTrait<T>,
        io: &mut RegressionIo<C, S>,
    ) -> Result<()> {
        let kind = T::KIND;
        io.replace_type(kind.type_name())?;
        let mut records: Vec<(ObjectId, T)> = Vec::new();
        for record in master.search_all()? {
            match record.object_id().cloned() {
                Some(object_id) if self.filter.admits(kind, &object_id) => {
                    records.push((object_id, record))
                }
                Some(_) => {}
                None => warn!("Skipping {} '{}' without an identity", kind, record.name()),
            }
        }
        records.sort_by(|a, b| a.0.cmp(&b.0));

        // Each category numbers new records from the persisted maximum.
        let mut next_id = self.previous.max_id() + 1;
        for (object_id, record) in &records {
            let dump_id = match self.previous.get(object_id) {
                Some(dump_id) => dump_id,
                None => {
                    let dump_id = next_id;
                    next_id += 1;
                    self.assigned.insert(object_id.clone(), dump_id);
                    dump_id
                }
            };
            let identifier = format!("{}{}", kind.prefix(), dump_id);
            debug!("Writing {} {} as {}", kind, object_id, identifier);
            io.write(Some(kind.type_name()), &identifier, record)?;
        }

        info!("Dumped {} {}", records.len(), kind);
        self.counts.insert(kind, records.len());
        Ok(())
    }
}
