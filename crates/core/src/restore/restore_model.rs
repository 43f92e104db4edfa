use std::collections::BTreeMap;

use crate::identity::ObjectId;
use crate::masters::EntityKind;

/// Old identity (as dumped) to new identity (as minted by the destination).
pub type IdentityMap = BTreeMap<ObjectId, ObjectId>;

/// Outcome of a completed restore.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreSummary {
    /// Identity translation per category.
    pub restored: BTreeMap<EntityKind, IdentityMap>,
    /// References that pointed at records missing from the dump. Each one was
    /// cleared (or dropped from its list) and logged.
    pub dangling_references: usize,
    /// Dumped records that carried no identity of their own.
    pub unidentified_records: usize,
}

impl RestoreSummary {
    pub fn identities(&self, kind: EntityKind) -> Option<&IdentityMap> {
        self.restored.get(&kind)
    }

    /// New identity of a dumped record.
    pub fn new_id(&self, kind: EntityKind, old: &ObjectId) -> Option<&ObjectId> {
        self.restored.get(&kind).and_then(|map| map.get(old))
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.restored.get(&kind).map_or(0, BTreeMap::len)
    }

    pub fn total(&self) -> usize {
        self.restored.values().map(BTreeMap::len).sum::<usize>() + self.unidentified_records
    }
}
