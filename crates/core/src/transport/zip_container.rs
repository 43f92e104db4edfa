use log::{debug, warn};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::container::{strip_extension, BlobKey, Container};
use crate::constants::PARTIAL_ARCHIVE_SUFFIX;
use crate::errors::{Result, TransportError};

/// Single-archive layout: entries named `type/<id><ext>`.
///
/// The write session streams into `<archive>.partial`; only a successful
/// `end_write` renames it to the archive path. Reads open the archive for
/// random access.
pub struct ZipContainer {
    path: PathBuf,
    writer: Option<ZipWriter<File>>,
    archive: Option<ZipArchive<File>>,
}

impl ZipContainer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            archive: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn partial_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(PARTIAL_ARCHIVE_SUFFIX);
        PathBuf::from(name)
    }

    fn entry_options() -> SimpleFileOptions {
        // Fixed timestamps keep archives of unchanged data byte-identical.
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
    }

    fn archive(&mut self) -> Result<&mut ZipArchive<File>> {
        self.archive
            .as_mut()
            .ok_or_else(|| TransportError::SessionNotOpen("read").into())
    }
}

fn finalize(writer: ZipWriter<File>, partial: &Path, path: &Path) -> Result<()> {
    let file = writer.finish().map_err(TransportError::from)?;
    file.sync_all().map_err(TransportError::Io)?;
    drop(file);
    fs::rename(partial, path).map_err(TransportError::Io)?;
    Ok(())
}

fn remove_partial(partial: &Path) {
    if let Err(e) = fs::remove_file(partial) {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove partial archive {}: {}", partial.display(), e);
        }
    }
}

impl Container for ZipContainer {
    fn begin_write(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Err(TransportError::SessionAlreadyOpen("write").into());
        }
        if self.path.is_dir() {
            return Err(TransportError::Archive(format!(
                "{} is a directory, expected an archive file",
                self.path.display()
            ))
            .into());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(TransportError::Io)?;
        }
        let file = File::create(self.partial_path()).map_err(TransportError::Io)?;
        self.writer = Some(ZipWriter::new(file));
        Ok(())
    }

    fn end_write(&mut self) -> Result<()> {
        let writer = self
            .writer
            .take()
            .ok_or(TransportError::SessionNotOpen("write"))?;
        let partial = self.partial_path();
        if let Err(e) = finalize(writer, &partial, &self.path) {
            remove_partial(&partial);
            return Err(e);
        }
        debug!("Finalized archive {}", self.path.display());
        Ok(())
    }

    fn abort_write(&mut self) {
        if self.writer.take().is_some() {
            remove_partial(&self.partial_path());
        }
    }

    /// Every write session builds a fresh archive, so there is nothing left
    /// over to drop.
    fn replace_type(&mut self, _type_name: &str) -> Result<()> {
        if self.writer.is_none() {
            return Err(TransportError::SessionNotOpen("write").into());
        }
        Ok(())
    }

    fn begin_read(&mut self) -> Result<()> {
        if self.archive.is_some() {
            return Err(TransportError::SessionAlreadyOpen("read").into());
        }
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TransportError::MissingFile(self.path.display().to_string()).into())
            }
            Err(e) => return Err(TransportError::Io(e).into()),
        };
        self.archive = Some(ZipArchive::new(file).map_err(TransportError::from)?);
        Ok(())
    }

    fn end_read(&mut self) -> Result<()> {
        self.archive
            .take()
            .map(|_| ())
            .ok_or_else(|| TransportError::SessionNotOpen("read").into())
    }

    fn put(&mut self, key: &BlobKey<'_>, bytes: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or(TransportError::SessionNotOpen("write"))?;
        writer
            .start_file(key.entry_name(), Self::entry_options())
            .map_err(TransportError::from)?;
        writer.write_all(bytes).map_err(TransportError::Io)?;
        Ok(())
    }

    fn get(&mut self, key: &BlobKey<'_>) -> Result<Vec<u8>> {
        let name = key.entry_name();
        let display = self.path.display().to_string();
        let archive = self.archive()?;
        let mut entry = match archive.by_name(&name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(TransportError::MissingFile(format!("{}!{}", display, name)).into())
            }
            Err(e) => return Err(TransportError::from(e).into()),
        };
        // Header sizes are untrusted; let the reader grow the buffer.
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(TransportError::Io)?;
        Ok(bytes)
    }

    fn contains(&mut self, key: &BlobKey<'_>) -> Result<bool> {
        let name = key.entry_name();
        let archive = self.archive()?;
        let found = archive.file_names().any(|entry| entry == name);
        Ok(found)
    }

    fn identifiers(&mut self, type_name: &str, extension: &str) -> Result<Vec<String>> {
        let prefix = format!("{}/", type_name);
        let archive = self.archive()?;
        let mut identifiers: Vec<String> = archive
            .file_names()
            .filter_map(|entry| entry.strip_prefix(prefix.as_str()))
            .filter(|rest| !rest.contains('/'))
            .filter_map(|rest| strip_extension(rest, extension))
            .map(str::to_string)
            .collect();
        identifiers.sort();
        Ok(identifiers)
    }

    fn describe(&self) -> String {
        format!("archive {}", self.path.display())
    }
}
