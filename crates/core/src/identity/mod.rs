//! Identity module - durable object identities and external identifiers.

mod identity_model;

pub use identity_model::{ExternalId, ExternalIdBundle, ObjectId};
