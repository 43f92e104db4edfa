use log::{debug, warn};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::container::{strip_extension, BlobKey, Container};
use crate::errors::{Result, TransportError};

const STAGING_DIR: &str = ".staging";
const REPLACED_DIR: &str = ".replaced";

/// Directory tree layout: `root/type/<id><ext>`, type-less blobs directly in
/// `root`.
///
/// Writes land in `root/.staging` and are moved into place by `end_write`, so
/// an aborted session leaves the previous contents of `root` untouched. Type
/// directories marked with `replace_type` are swapped out whole; if the
/// commit fails they are moved back.
#[derive(Debug)]
pub struct DirectoryContainer {
    root: PathBuf,
    staged: Vec<String>,
    replaced: BTreeSet<String>,
    writing: bool,
    reading: bool,
}

impl DirectoryContainer {
    /// Fails fast if `root` exists but is not a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_directory_or_absent(&root)?;
        Ok(Self {
            root,
            staged: Vec::new(),
            replaced: BTreeSet::new(),
            writing: false,
            reading: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    fn path_for(&self, key: &BlobKey<'_>) -> PathBuf {
        self.root.join(key.entry_name())
    }

    /// Moves replaced type directories aside, then the staged entries into
    /// place. Every type moved aside is recorded in `moved_aside`.
    fn commit_staged(&self, moved_aside: &mut Vec<String>) -> Result<()> {
        let staging = self.staging_dir();
        let backup = staging.join(REPLACED_DIR);
        for type_name in &self.replaced {
            let target = self.root.join(type_name);
            if !target.exists() {
                continue;
            }
            fs::create_dir_all(&backup).map_err(TransportError::Io)?;
            fs::rename(&target, backup.join(type_name)).map_err(TransportError::Io)?;
            moved_aside.push(type_name.clone());
        }
        for entry in &self.staged {
            let target = self.root.join(entry);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(TransportError::Io)?;
            }
            fs::rename(staging.join(entry), &target).map_err(TransportError::Io)?;
        }
        Ok(())
    }

    /// Puts type directories moved aside by a failed commit back in place.
    fn roll_back(&self, moved_aside: &[String]) {
        let backup = self.staging_dir().join(REPLACED_DIR);
        for type_name in moved_aside {
            let target = self.root.join(type_name);
            if target.exists() {
                if let Err(e) = fs::remove_dir_all(&target) {
                    warn!("Failed to remove partial commit {}: {}", target.display(), e);
                    continue;
                }
            }
            if let Err(e) = fs::rename(backup.join(type_name), &target) {
                warn!("Failed to restore {}: {}", target.display(), e);
            }
        }
    }

    /// Removes the staging directory and closes the write session.
    fn close_write(&mut self) {
        let staging = self.staging_dir();
        if let Err(e) = fs::remove_dir_all(&staging) {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to discard staged entries in {}: {}", staging.display(), e);
            }
        }
        self.staged.clear();
        self.replaced.clear();
        self.writing = false;
    }

    fn require_reading(&self) -> Result<()> {
        if !self.reading {
            return Err(TransportError::SessionNotOpen("read").into());
        }
        Ok(())
    }
}

fn ensure_directory_or_absent(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(TransportError::NotADirectory(path.display().to_string()).into());
    }
    Ok(())
}

impl Container for DirectoryContainer {
    fn begin_write(&mut self) -> Result<()> {
        if self.writing {
            return Err(TransportError::SessionAlreadyOpen("write").into());
        }
        ensure_directory_or_absent(&self.root)?;
        let staging = self.staging_dir();
        if staging.exists() {
            // Left behind by a process that died mid-session.
            fs::remove_dir_all(&staging).map_err(TransportError::Io)?;
        }
        fs::create_dir_all(&staging).map_err(TransportError::Io)?;
        self.staged.clear();
        self.replaced.clear();
        self.writing = true;
        Ok(())
    }

    fn end_write(&mut self) -> Result<()> {
        if !self.writing {
            return Err(TransportError::SessionNotOpen("write").into());
        }
        let mut moved_aside = Vec::new();
        let committed = self.commit_staged(&mut moved_aside);
        if committed.is_err() {
            self.roll_back(&moved_aside);
        }
        let count = self.staged.len();
        self.close_write();
        committed?;
        debug!("Committed {} entries to {}", count, self.root.display());
        Ok(())
    }

    fn abort_write(&mut self) {
        if self.writing {
            self.close_write();
        }
    }

    fn replace_type(&mut self, type_name: &str) -> Result<()> {
        if !self.writing {
            return Err(TransportError::SessionNotOpen("write").into());
        }
        self.replaced.insert(type_name.to_string());
        Ok(())
    }

    fn begin_read(&mut self) -> Result<()> {
        if self.reading {
            return Err(TransportError::SessionAlreadyOpen("read").into());
        }
        ensure_directory_or_absent(&self.root)?;
        if !self.root.exists() {
            return Err(TransportError::MissingFile(self.root.display().to_string()).into());
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
        if !self.writing {
            return Err(TransportError::SessionNotOpen("write").into());
        }
        let entry = key.entry_name();
        let path = self.staging_dir().join(&entry);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(TransportError::Io)?;
        }
        fs::write(&path, bytes).map_err(TransportError::Io)?;
        self.staged.push(entry);
        Ok(())
    }

    fn get(&mut self, key: &BlobKey<'_>) -> Result<Vec<u8>> {
        self.require_reading()?;
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(TransportError::MissingFile(path.display().to_string()).into())
            }
            Err(e) => Err(TransportError::Io(e).into()),
        }
    }

    fn contains(&mut self, key: &BlobKey<'_>) -> Result<bool> {
        self.require_reading()?;
        Ok(self.path_for(key).is_file())
    }

    fn identifiers(&mut self, type_name: &str, extension: &str) -> Result<Vec<String>> {
        self.require_reading()?;
        let dir = self.root.join(type_name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        ensure_directory_or_absent(&dir)?;

        let mut identifiers = Vec::new();
        for entry in fs::read_dir(&dir).map_err(TransportError::Io)? {
            let entry = entry.map_err(TransportError::Io)?;
            if !entry.file_type().map_err(TransportError::Io)?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                warn!("Skipping non UTF-8 file name in {}", dir.display());
                continue;
            };
            if let Some(identifier) = strip_extension(file_name, extension) {
                identifiers.push(identifier.to_string());
            }
        }
        identifiers.sort();
        Ok(identifiers)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}
