//! Containers store byte blobs under a `(type, identifier)` key.

use crate::errors::Result;

/// Address of one blob.
///
/// `type_name` is `None` for the reserved type-less slot (the id mapping
/// record, golden copies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobKey<'a> {
    pub type_name: Option<&'a str>,
    pub identifier: &'a str,
    pub extension: &'a str,
}

impl<'a> BlobKey<'a> {
    pub fn typed(type_name: &'a str, identifier: &'a str, extension: &'a str) -> Self {
        Self {
            type_name: Some(type_name),
            identifier,
            extension,
        }
    }

    pub fn untyped(identifier: &'a str, extension: &'a str) -> Self {
        Self {
            type_name: None,
            identifier,
            extension,
        }
    }

    /// Relative entry name, `type/<id><ext>` or `<id><ext>`.
    pub fn entry_name(&self) -> String {
        match self.type_name {
            Some(type_name) => format!("{}/{}{}", type_name, self.identifier, self.extension),
            None => format!("{}{}", self.identifier, self.extension),
        }
    }
}

/// Byte-blob store with scoped write and read sessions.
///
/// Sessions are not safe for concurrent use: every write of one dump goes
/// through one open session. `abort_write` discards whatever the current
/// session wrote so that a failed pass never leaves a valid-looking dump.
pub trait Container: Send {
    fn begin_write(&mut self) -> Result<()>;

    fn end_write(&mut self) -> Result<()>;

    fn abort_write(&mut self);

    /// Marks `type_name` as rewritten by the open write session: the commit
    /// drops every stored entry of that type the session did not put.
    fn replace_type(&mut self, type_name: &str) -> Result<()>;

    fn begin_read(&mut self) -> Result<()>;

    fn end_read(&mut self) -> Result<()>;

    fn put(&mut self, key: &BlobKey<'_>, bytes: &[u8]) -> Result<()>;

    fn get(&mut self, key: &BlobKey<'_>) -> Result<Vec<u8>>;

    fn contains(&mut self, key: &BlobKey<'_>) -> Result<bool>;

    /// Identifiers stored under `type_name`, extension stripped, sorted.
    fn identifiers(&mut self, type_name: &str, extension: &str) -> Result<Vec<String>>;

    /// Human readable location for log messages.
    fn describe(&self) -> String;
}

impl<S: Container + ?Sized> Container for Box<S> {
    fn begin_write(&mut self) -> Result<()> {
        (**self).begin_write()
    }

    fn end_write(&mut self) -> Result<()> {
        (**self).end_write()
    }

    fn abort_write(&mut self) {
        (**self).abort_write()
    }

    fn replace_type(&mut self, type_name: &str) -> Result<()> {
        (**self).replace_type(type_name)
    }

    fn begin_read(&mut self) -> Result<()> {
        (**self).begin_read()
    }

    fn end_read(&mut self) -> Result<()> {
        (**self).end_read()
    }

    fn put(&mut self, key: &BlobKey<'_>, bytes: &[u8]) -> Result<()> {
        (**self).put(key, bytes)
    }

    fn get(&mut self, key: &BlobKey<'_>) -> Result<Vec<u8>> {
        (**self).get(key)
    }

    fn contains(&mut self, key: &BlobKey<'_>) -> Result<bool> {
        (**self).contains(key)
    }

    fn identifiers(&mut self, type_name: &str, extension: &str) -> Result<Vec<String>> {
        (**self).identifiers(type_name, extension)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Strips `extension` from an entry's file name, if it has it.
pub(crate) fn strip_extension<'a>(file_name: &'a str, extension: &str) -> Option<&'a str> {
    file_name
        .strip_suffix(extension)
        .filter(|stem| !stem.is_empty())
}
