use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::container::{strip_extension, BlobKey, Container};
use crate::errors::{Error, Result, TransportError};

type Blobs = BTreeMap<String, Vec<u8>>;

/// In-process container. Clones share the committed blobs, so a test can
/// write through one handle and read through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    committed: Arc<Mutex<Blobs>>,
    staged: Option<Blobs>,
    replaced: Vec<String>,
    reading: bool,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every committed entry, keyed by entry name.
    pub fn snapshot(&self) -> Result<Blobs> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Blobs>> {
        self.committed
            .lock()
            .map_err(|_| Error::Unexpected("memory container lock poisoned".to_string()))
    }

    fn require_reading(&self) -> Result<()> {
        if !self.reading {
            return Err(TransportError::SessionNotOpen("read").into());
        }
        Ok(())
    }
}

fn is_entry_of(entry: &str, type_name: &str) -> bool {
    entry
        .strip_prefix(type_name)
        .is_some_and(|rest| rest.starts_with('/'))
}

impl Container for MemoryContainer {
    fn begin_write(&mut self) -> Result<()> {
        if self.staged.is_some() {
            return Err(TransportError::SessionAlreadyOpen("write").into());
        }
        self.staged = Some(Blobs::new());
        self.replaced.clear();
        Ok(())
    }

    fn end_write(&mut self) -> Result<()> {
        let staged = self
            .staged
            .take()
            .ok_or(TransportError::SessionNotOpen("write"))?;
        let replaced = std::mem::take(&mut self.replaced);
        let mut committed = self.lock()?;
        committed.retain(|entry, _| {
            !replaced
                .iter()
                .any(|type_name| is_entry_of(entry, type_name))
        });
        committed.extend(staged);
        Ok(())
    }

    fn abort_write(&mut self) {
        self.staged = None;
        self.replaced.clear();
    }

    fn replace_type(&mut self, type_name: &str) -> Result<()> {
        if self.staged.is_none() {
            return Err(TransportError::SessionNotOpen("write").into());
        }
        self.replaced.push(type_name.to_string());
        Ok(())
    }

    fn begin_read(&mut self) -> Result<()> {
        if self.reading {
            return Err(TransportError::SessionAlreadyOpen("read").into());
        }
        self.reading = true;
        Ok(())
    }

    fn end_read(&mut self) -> Result<()> {
        if !self.reading {
            return Err(TransportError::SessionNotOpen("read").into());
        }
        self.reading = false;
        Ok(())
    }

    fn put(&mut self, key: &BlobKey<'_>, bytes: &[u8]) -> Result<()> {
        let staged = self
            .staged
            .as_mut()
            .ok_or(TransportError::SessionNotOpen("write"))?;
        staged.insert(key.entry_name(), bytes.to_vec());
        Ok(())
    }

    fn get(&mut self, key: &BlobKey<'_>) -> Result<Vec<u8>> {
        self.require_reading()?;
        let name = key.entry_name();
        self.lock()?
            .get(&name)
            .cloned()
            .ok_or_else(|| TransportError::MissingFile(name).into())
    }

    fn contains(&mut self, key: &BlobKey<'_>) -> Result<bool> {
        self.require_reading()?;
        Ok(self.lock()?.contains_key(&key.entry_name()))
    }

    fn identifiers(&mut self, type_name: &str, extension: &str) -> Result<Vec<String>> {
        self.require_reading()?;
        let prefix = format!("{}/", type_name);
        Ok(self
            .lock()?
            .keys()
            .filter_map(|entry| entry.strip_prefix(prefix.as_str()))
            .filter(|rest| !rest.contains('/'))
            .filter_map(|rest| strip_extension(rest, extension))
            .map(str::to_string)
            .collect())
    }

    fn describe(&self) -> String {
        "in-memory container".to_string()
    }
}
