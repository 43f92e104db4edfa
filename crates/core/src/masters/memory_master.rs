use async_trait::async_trait;
use log::debug;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::masters_traits::{Entity, MasterTrait};
use crate::errors::{Error, MasterError, Result};
use crate::identity::ObjectId;

/// Master keeping its records in process memory.
///
/// Identities are minted sequentially under one scheme, so two masters with
/// different schemes never hand out colliding identities.
pub struct InMemoryMaster<T: Entity> {
    scheme: String,
    records: RwLock<BTreeMap<ObjectId, T>>,
    counter: AtomicU64,
}

impl<T: Entity> InMemoryMaster<T> {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            records: RwLock::new(BTreeMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Creates a master whose scheme is `Mem` plus the category suffix.
    pub fn for_kind() -> Self {
        Self::new(format!("Mem{}", T::KIND.scheme_suffix()))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    fn mint(&self) -> ObjectId {
        let next = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        ObjectId::new(self.scheme.clone(), next.to_string())
    }

    fn read_records(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ObjectId, T>>> {
        self.records
            .read()
            .map_err(|_| Error::Master(MasterError::Storage("record lock poisoned".to_string())))
    }

    fn write_records(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<ObjectId, T>>> {
        self.records
            .write()
            .map_err(|_| Error::Master(MasterError::Storage("record lock poisoned".to_string())))
    }
}

#[async_trait]
impl<T: Entity> MasterTrait<T> for InMemoryMaster<T> {
    fn search_all(&self) -> Result<Vec<T>> {
        Ok(self.read_records()?.values().cloned().collect())
    }

    fn get(&self, object_id: &ObjectId) -> Result<T> {
        self.read_records()?
            .get(object_id)
            .cloned()
            .ok_or_else(|| Error::Master(MasterError::NotFound(object_id.to_string())))
    }

    async fn add(&self, entity: T) -> Result<T> {
        if let Some(existing) = entity.object_id() {
            return Err(Error::Master(MasterError::InvalidRecord(format!(
                "{} '{}' already carries identity {}",
                T::KIND,
                entity.name(),
                existing
            ))));
        }

        let mut entity = entity;
        let object_id = self.mint();
        entity.set_object_id(Some(object_id.clone()));
        entity.assign_child_ids(&mut || self.mint());

        debug!("Added {} '{}' as {}", T::KIND, entity.name(), object_id);
        self.write_records()?.insert(object_id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T> {
        let object_id = entity.object_id().cloned().ok_or_else(|| {
            Error::Master(MasterError::InvalidRecord(format!(
                "{} '{}' has no identity to update",
                T::KIND,
                entity.name()
            )))
        })?;

        let mut entity = entity;
        entity.assign_child_ids(&mut || self.mint());

        let mut records = self.write_records()?;
        match records.get_mut(&object_id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(Error::Master(MasterError::NotFound(object_id.to_string()))),
        }
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read_records()?.len())
    }
}
