//! Master contracts.
//!
//! These traits define the search/add/update contract every entity store
//! offers, without any storage-specific types. The dump and restore services
//! only ever talk to masters through them.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use super::masters_model::*;
use crate::errors::Result;
use crate::identity::ObjectId;

/// A record that can live in a master.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Durable identity assigned by the owning master, if stored.
    fn object_id(&self) -> Option<&ObjectId>;

    fn set_object_id(&mut self, object_id: Option<ObjectId>);

    fn name(&self) -> &str;

    /// Gives nested records their identities once the record's own identity
    /// has been minted. `mint` returns a fresh identity per call.
    fn assign_child_ids(&mut self, _mint: &mut dyn FnMut() -> ObjectId) {}

    /// Removes the record's identity and any nested identities.
    fn clear_ids(&mut self) {
        self.set_object_id(None);
    }
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl Entity for $ty {
            const KIND: EntityKind = $kind;

            fn object_id(&self) -> Option<&ObjectId> {
                self.unique_id.as_ref()
            }

            fn set_object_id(&mut self, object_id: Option<ObjectId>) {
                self.unique_id = object_id;
            }

            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

impl_entity!(Security, EntityKind::Security);
impl_entity!(ConfigItem, EntityKind::Config);
impl_entity!(HistoricalTimeSeries, EntityKind::TimeSeries);
impl_entity!(Holiday, EntityKind::Holiday);
impl_entity!(Exchange, EntityKind::Exchange);
impl_entity!(MarketDataSnapshot, EntityKind::Snapshot);
impl_entity!(LegalEntity, EntityKind::LegalEntity);
impl_entity!(Convention, EntityKind::Convention);

impl Entity for Position {
    const KIND: EntityKind = EntityKind::Position;

    fn object_id(&self) -> Option<&ObjectId> {
        self.unique_id.as_ref()
    }

    fn set_object_id(&mut self, object_id: Option<ObjectId>) {
        self.unique_id = object_id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    /// Trades get their own identity and point back at this position.
    fn assign_child_ids(&mut self, mint: &mut dyn FnMut() -> ObjectId) {
        let parent = self.unique_id.clone();
        for trade in &mut self.trades {
            if trade.unique_id.is_none() {
                trade.unique_id = Some(mint());
            }
            trade.parent_position_id = parent.clone();
        }
    }

    fn clear_ids(&mut self) {
        self.unique_id = None;
        for trade in &mut self.trades {
            trade.unique_id = None;
            trade.parent_position_id = None;
        }
    }
}

impl Entity for Portfolio {
    const KIND: EntityKind = EntityKind::Portfolio;

    fn object_id(&self) -> Option<&ObjectId> {
        self.unique_id.as_ref()
    }

    fn set_object_id(&mut self, object_id: Option<ObjectId>) {
        self.unique_id = object_id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn assign_child_ids(&mut self, mint: &mut dyn FnMut() -> ObjectId) {
        self.root_node.for_each_mut(&mut |node| {
            if node.unique_id.is_none() {
                node.unique_id = Some(mint());
            }
        });
    }

    fn clear_ids(&mut self) {
        self.unique_id = None;
        self.root_node.for_each_mut(&mut |node| node.unique_id = None);
    }
}

/// Trait defining the contract for a master of one entity category.
///
/// Reads are synchronous, writes are async; implementations handle their own
/// transaction management.
#[async_trait]
pub trait MasterTrait<T: Entity>: Send + Sync {
    /// Returns every record currently held.
    fn search_all(&self) -> Result<Vec<T>>;

    /// Retrieves one record by its durable identity.
    fn get(&self, object_id: &ObjectId) -> Result<T>;

    /// Inserts a record without an identity. The master mints the identity
    /// (and nested identities) and returns the stored record.
    async fn add(&self, entity: T) -> Result<T>;

    /// Replaces an existing record, matched by its identity.
    async fn update(&self, entity: T) -> Result<T>;

    /// Number of records held.
    fn count(&self) -> Result<usize> {
        Ok(self.search_all()?.len())
    }
}
