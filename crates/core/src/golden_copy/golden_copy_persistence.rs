use log::info;
use std::path::{Path, PathBuf};

use super::golden_copy_model::GoldenCopy;
use crate::errors::{Result, TransportError};
use crate::transport::{Codec, DirectoryContainer, RegressionIo};

/// Stores golden copies as `<view>.<snapshot><ext>` in one directory.
pub struct GoldenCopyPersistence<C: Codec> {
    io: RegressionIo<C, DirectoryContainer>,
    dir: PathBuf,
}

impl<C: Codec> GoldenCopyPersistence<C> {
    pub fn new(dir: impl Into<PathBuf>, codec: C) -> Result<Self> {
        let dir = dir.into();
        Ok(Self {
            io: RegressionIo::directory(dir.clone(), codec)?,
            dir,
        })
    }

    /// File a golden copy for `view_name` on `snapshot_name` is stored in.
    pub fn path_for(&self, view_name: &str, snapshot_name: &str) -> PathBuf {
        self.dir.join(format!(
            "{}{}",
            GoldenCopy::identifier_for(view_name, snapshot_name),
            self.io.codec().logical_file_extension()
        ))
    }

    pub fn save(&mut self, golden_copy: &GoldenCopy) -> Result<PathBuf> {
        let mut session = self.io.write_session()?;
        session.write(None, &golden_copy.identifier(), golden_copy)?;
        session.finish()?;

        let path = self.path_for(&golden_copy.view_name, &golden_copy.snapshot_name);
        info!(
            "Saved golden copy of {} results to {}",
            golden_copy.calculation_results.len(),
            path.display()
        );
        Ok(path)
    }

    pub fn load(&mut self, view_name: &str, snapshot_name: &str) -> Result<GoldenCopy> {
        let identifier = GoldenCopy::identifier_for(view_name, snapshot_name);
        let mut session = self.io.read_session()?;
        let golden_copy: GoldenCopy = session.read(None, &identifier)?;
        session.finish()?;
        Ok(golden_copy)
    }

    /// Loads a golden copy from an explicit file path.
    pub fn load_file(path: &Path, codec: C) -> Result<GoldenCopy> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| TransportError::MissingFile(path.display().to_string()))?;
        let extension = codec.logical_file_extension().to_string();
        let identifier = file_name.strip_suffix(extension.as_str()).unwrap_or(file_name);
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut io = RegressionIo::directory(dir, codec)?;
        let mut session = io.read_session()?;
        if !session.contains(None, identifier)? {
            return Err(TransportError::MissingFile(path.display().to_string()).into());
        }
        let golden_copy: GoldenCopy = session.read(None, identifier)?;
        session.finish()?;
        Ok(golden_copy)
    }
}
