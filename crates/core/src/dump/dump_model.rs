use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::ID_MAPPINGS_IDENTIFIER;
use crate::errors::{Error, Result, TransportError};
use crate::identity::ObjectId;
use crate::masters::{AccessTracker, EntityKind};
use crate::transport::{Codec, Container, RegressionIo};

/// Persisted map from durable identity to compact dump id.
///
/// Carried from one dump to the next so an unchanged record keeps its file
/// name. Every id is at most `max_id`, and `max_id` never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdMappings {
    #[serde(default)]
    ids: BTreeMap<ObjectId, i64>,
    #[serde(default)]
    max_id: i64,
}

impl IdMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from explicit assignments, deriving `max_id`.
    pub fn from_ids(ids: BTreeMap<ObjectId, i64>) -> Self {
        Self::default().with_new_ids(ids)
    }

    pub fn get(&self, object_id: &ObjectId) -> Option<i64> {
        self.ids.get(object_id).copied()
    }

    pub fn max_id(&self) -> i64 {
        self.max_id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, i64)> {
        self.ids.iter().map(|(id, dump_id)| (id, *dump_id))
    }

    /// Returns a copy extended with `new_ids`, with `max_id` recomputed over
    /// previous and new assignments.
    pub fn with_new_ids(&self, new_ids: impl IntoIterator<Item = (ObjectId, i64)>) -> Self {
        let mut ids = self.ids.clone();
        ids.extend(new_ids);
        let max_id = ids.values().copied().fold(self.max_id, i64::max);
        Self { ids, max_id }
    }

    /// Loads the mapping persisted by a previous dump.
    ///
    /// A missing dump or a dump without a mapping record yields an empty
    /// mapping; that is the first-run case, not an error.
    pub fn load<C: Codec, S: Container>(io: &mut RegressionIo<C, S>) -> Result<Self> {
        let mut session = match io.read_session() {
            Ok(session) => session,
            Err(Error::Transport(TransportError::MissingFile(path))) => {
                info!("No previous dump at {}, starting with empty id mappings", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        if !session.contains(None, ID_MAPPINGS_IDENTIFIER)? {
            info!(
                "{} holds no id mappings, starting with empty id mappings",
                session.describe()
            );
            session.finish()?;
            return Ok(Self::default());
        }

        let loaded: IdMappings = session.read(None, ID_MAPPINGS_IDENTIFIER)?;
        session.finish()?;
        // Repairs a hand-edited record whose maximum lags its ids.
        let mappings = Self::default().with_new_ids(loaded.ids).raised_to(loaded.max_id);
        info!(
            "Loaded {} id mappings (max id {})",
            mappings.len(),
            mappings.max_id
        );
        Ok(mappings)
    }

    fn raised_to(mut self, max_id: i64) -> Self {
        self.max_id = self.max_id.max(max_id);
        self
    }
}

/// Selects which records a dump writes.
#[derive(Debug, Clone, Default)]
pub enum DumpFilter {
    /// Every record with a durable identity.
    #[default]
    All,
    /// Only records read through tracking masters sharing this tracker.
    Accessed(Arc<AccessTracker>),
}

impl DumpFilter {
    pub fn admits(&self, kind: EntityKind, object_id: &ObjectId) -> bool {
        match self {
            DumpFilter::All => true,
            DumpFilter::Accessed(tracker) => tracker.contains(kind, object_id),
        }
    }
}

/// Outcome of a completed dump.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpSummary {
    /// Records written per category.
    pub counts: BTreeMap<EntityKind, usize>,
    /// Number of records that received a dump id for the first time.
    pub new_ids: usize,
    /// Mapping as persisted at the end of the dump.
    pub id_mappings: IdMappings,
}

impl DumpSummary {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}
