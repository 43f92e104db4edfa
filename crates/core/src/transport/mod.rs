//! Transport module - codecs, blob containers and their composition.
//!
//! A [`Codec`] turns one object into bytes; a [`Container`] stores byte blobs
//! under `(type, identifier)` keys. [`RegressionIo`] composes the two, so a
//! new container (or codec) never touches the other half.

mod codec;
mod container;
mod directory_container;
mod memory_container;
mod regression_io;
mod zip_container;

pub use codec::{Codec, JsonCodec, JsonContext};
pub use container::{BlobKey, Container};
pub use directory_container::DirectoryContainer;
pub use memory_container::MemoryContainer;
pub use regression_io::{ReadSession, RegressionIo, WriteSession};
pub use zip_container::ZipContainer;

use std::path::Path;

/// Container picked from a path: `.zip` files are archives, anything else a
/// directory tree.
pub fn container_for_path(path: &Path) -> crate::errors::Result<Box<dyn Container>> {
    let is_archive = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);
    if is_archive {
        Ok(Box::new(ZipContainer::new(path)))
    } else {
        Ok(Box::new(DirectoryContainer::new(path)?))
    }
}
