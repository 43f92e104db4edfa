use async_trait::async_trait;
use dashmap::DashSet;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::masters_model::EntityKind;
use super::masters_traits::{Entity, MasterTrait};
use crate::errors::Result;
use crate::identity::ObjectId;

/// Set of identities read through tracking masters.
///
/// View execution may read masters from several worker threads at once, so
/// the set is concurrent.
#[derive(Debug, Default)]
pub struct AccessTracker {
    accessed: DashSet<(EntityKind, ObjectId)>,
}

impl AccessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: EntityKind, object_id: &ObjectId) {
        self.accessed.insert((kind, object_id.clone()));
    }

    pub fn contains(&self, kind: EntityKind, object_id: &ObjectId) -> bool {
        self.accessed.contains(&(kind, object_id.clone()))
    }

    /// Identities of one category that have been read, in sorted order.
    pub fn accessed(&self, kind: EntityKind) -> BTreeSet<ObjectId> {
        self.accessed
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .map(|entry| entry.key().1.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.accessed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessed.is_empty()
    }
}

/// Decorator recording every identity read from the wrapped master.
pub struct TrackingMaster<T: Entity> {
    inner: Arc<dyn MasterTrait<T>>,
    tracker: Arc<AccessTracker>,
}

impl<T: Entity> TrackingMaster<T> {
    pub fn new(inner: Arc<dyn MasterTrait<T>>, tracker: Arc<AccessTracker>) -> Self {
        Self { inner, tracker }
    }

    fn track(&self, entity: &T) {
        if let Some(object_id) = entity.object_id() {
            self.tracker.record(T::KIND, object_id);
        }
    }
}

#[async_trait]
impl<T: Entity> MasterTrait<T> for TrackingMaster<T> {
    fn search_all(&self) -> Result<Vec<T>> {
        let records = self.inner.search_all()?;
        for record in &records {
            self.track(record);
        }
        Ok(records)
    }

    fn get(&self, object_id: &ObjectId) -> Result<T> {
        let record = self.inner.get(object_id)?;
        self.tracker.record(T::KIND, object_id);
        Ok(record)
    }

    async fn add(&self, entity: T) -> Result<T> {
        self.inner.add(entity).await
    }

    async fn update(&self, entity: T) -> Result<T> {
        self.inner.update(entity).await
    }

    fn count(&self) -> Result<usize> {
        self.inner.count()
    }
}
