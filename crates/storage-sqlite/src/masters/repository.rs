use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use log::debug;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use super::model::MasterDocumentDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::master_documents::dsl::*;
use regression_core::errors::{Error, MasterError, Result};
use regression_core::identity::ObjectId;
use regression_core::masters::{Entity, MasterTrait};

/// Master of one entity category backed by the `master_documents` table.
///
/// Identities are random UUIDs under the master's scheme; nested records
/// (trades, portfolio nodes) get theirs from the same scheme.
pub struct SqliteMaster<T: Entity> {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    scheme: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> SqliteMaster<T> {
    /// Creates a master whose scheme is `Db` plus the category suffix.
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self::with_scheme(pool, writer, format!("Db{}", T::KIND.scheme_suffix()))
    }

    pub fn with_scheme(pool: Arc<DbPool>, writer: WriteHandle, scheme: impl Into<String>) -> Self {
        SqliteMaster {
            pool,
            writer,
            scheme: scheme.into(),
            _entity: PhantomData,
        }
    }

    fn kind_name() -> &'static str {
        T::KIND.type_name()
    }
}

fn mint(scheme: &str) -> ObjectId {
    ObjectId::new(scheme, Uuid::new_v4().to_string())
}

fn entity_from_db<T: Entity>(row: &MasterDocumentDB) -> Result<T> {
    serde_json::from_str(&row.document).into_core()
}

fn identity_of<T: Entity>(entity: &T) -> Result<ObjectId> {
    entity.object_id().cloned().ok_or_else(|| {
        Error::Master(MasterError::InvalidRecord(format!(
            "{} '{}' has no identity",
            T::KIND,
            entity.name()
        )))
    })
}

#[async_trait]
impl<T: Entity> MasterTrait<T> for SqliteMaster<T> {
    fn search_all(&self) -> Result<Vec<T>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = master_documents
            .filter(kind.eq(Self::kind_name()))
            .order(object_id.asc())
            .select(MasterDocumentDB::as_select())
            .load::<MasterDocumentDB>(&mut conn)
            .into_core()?;

        rows.iter().map(entity_from_db::<T>).collect()
    }

    fn get(&self, id: &ObjectId) -> Result<T> {
        let mut conn = get_connection(&self.pool)?;
        let row = master_documents
            .filter(object_id.eq(id.to_string()))
            .filter(kind.eq(Self::kind_name()))
            .select(MasterDocumentDB::as_select())
            .first::<MasterDocumentDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::Master(MasterError::NotFound(id.to_string())))?;

        entity_from_db(&row)
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
        let new_id = mint(&self.scheme);
        entity.set_object_id(Some(new_id.clone()));
        entity.assign_child_ids(&mut || mint(&self.scheme));

        let now = Utc::now().naive_utc();
        let row = MasterDocumentDB {
            object_id: new_id.to_string(),
            kind: Self::kind_name().to_string(),
            name: entity.name().to_string(),
            document: serde_json::to_string(&entity).map_err(StorageError::from)?,
            created_at: now,
            updated_at: now,
        };

        self.writer
            .exec(move |conn| {
                diesel::insert_into(master_documents)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;

        debug!("Added {} '{}' as {}", T::KIND, entity.name(), new_id);
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T> {
        let id = identity_of(&entity)?;
        let mut entity = entity;
        entity.assign_child_ids(&mut || mint(&self.scheme));

        let id_text = id.to_string();
        let new_name = entity.name().to_string();
        let new_document = serde_json::to_string(&entity).map_err(StorageError::from)?;
        let now = Utc::now().naive_utc();
        let category = Self::kind_name();

        let updated = self
            .writer
            .exec(move |conn| {
                diesel::update(
                    master_documents
                        .filter(object_id.eq(&id_text))
                        .filter(kind.eq(category)),
                )
                .set((name.eq(new_name), document.eq(new_document), updated_at.eq(now)))
                .execute(conn)
                .map_err(|e| StorageError::from(e).into())
            })
            .await?;

        if updated == 0 {
            return Err(Error::Master(MasterError::NotFound(id.to_string())));
        }
        Ok(entity)
    }

    fn count(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let total: i64 = master_documents
            .filter(kind.eq(Self::kind_name()))
            .count()
            .get_result(&mut conn)
            .into_core()?;
        Ok(usize::try_from(total).unwrap_or_default())
    }
}
