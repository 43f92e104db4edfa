//! SQLite storage implementation for the masters.

mod model;
mod repository;

pub use model::MasterDocumentDB;
pub use repository::SqliteMaster;

// Re-export trait from core for convenience
pub use regression_core::masters::MasterTrait;

use log::info;
use std::path::Path;
use std::sync::Arc;

use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};
use regression_core::errors::Result;
use regression_core::masters::{Entity, Masters};

fn sqlite<T: Entity>(pool: &Arc<DbPool>, writer: &WriteHandle) -> Arc<dyn MasterTrait<T>> {
    Arc::new(SqliteMaster::<T>::new(pool.clone(), writer.clone()))
}

/// Opens (creating and migrating if needed) the database at `db_path` and
/// returns one SQLite master per category, sharing a pool and a writer.
///
/// Must be called from within a Tokio runtime, which runs the writer.
pub fn open_masters(db_path: &Path) -> Result<Masters> {
    let db_url = init(db_path)?;
    let pool = create_pool(&db_url)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());
    info!("Opened masters database at {}", db_url);

    Ok(Masters {
        securities: sqlite(&pool, &writer),
        positions: sqlite(&pool, &writer),
        portfolios: sqlite(&pool, &writer),
        configs: sqlite(&pool, &writer),
        time_series: sqlite(&pool, &writer),
        holidays: sqlite(&pool, &writer),
        exchanges: sqlite(&pool, &writer),
        snapshots: sqlite(&pool, &writer),
        legal_entities: sqlite(&pool, &writer),
        conventions: sqlite(&pool, &writer),
    })
}
