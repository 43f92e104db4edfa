//! Database model for stored master records.

use chrono::NaiveDateTime;
use diesel::prelude::*;

/// One record of any category, stored as its JSON document.
#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::master_documents)]
#[diesel(primary_key(object_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MasterDocumentDB {
    pub object_id: String,
    pub kind: String,
    pub name: String,
    pub document: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
