use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use super::codec::Codec;
use super::container::{BlobKey, Container};
use super::directory_container::DirectoryContainer;
use super::zip_container::ZipContainer;
use crate::errors::{Result, TransportError};

/// A codec composed with a container.
///
/// Owns the codec context of the open session, so nothing about a session
/// lives in process-wide state.
pub struct RegressionIo<C: Codec, S: Container> {
    codec: C,
    container: S,
    write_context: Option<C::Context>,
    read_context: Option<C::Context>,
}

impl<C: Codec> RegressionIo<C, DirectoryContainer> {
    pub fn directory(root: impl Into<PathBuf>, codec: C) -> Result<Self> {
        Ok(Self::new(codec, DirectoryContainer::new(root)?))
    }
}

impl<C: Codec> RegressionIo<C, ZipContainer> {
    pub fn archive(path: impl Into<PathBuf>, codec: C) -> Self {
        Self::new(codec, ZipContainer::new(path))
    }
}

impl<C: Codec, S: Container> RegressionIo<C, S> {
    pub fn new(codec: C, container: S) -> Self {
        Self {
            codec,
            container,
            write_context: None,
            read_context: None,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn container(&self) -> &S {
        &self.container
    }

    pub fn into_container(self) -> S {
        self.container
    }

    pub fn describe(&self) -> String {
        self.container.describe()
    }

    pub fn begin_write(&mut self) -> Result<()> {
        if self.write_context.is_some() {
            return Err(TransportError::SessionAlreadyOpen("write").into());
        }
        self.container.begin_write()?;
        match self.codec.open_write() {
            Ok(context) => {
                self.write_context = Some(context);
                Ok(())
            }
            Err(e) => {
                self.container.abort_write();
                Err(e)
            }
        }
    }

    pub fn end_write(&mut self) -> Result<()> {
        let context = self
            .write_context
            .take()
            .ok_or(TransportError::SessionNotOpen("write"))?;
        if let Err(e) = self.codec.close_write(context) {
            self.container.abort_write();
            return Err(e);
        }
        self.container.end_write()
    }

    /// Discards everything written in the open session.
    pub fn abort_write(&mut self) {
        self.write_context = None;
        self.container.abort_write();
    }

    /// Makes the open session the only source of entries under `type_name`.
    pub fn replace_type(&mut self, type_name: &str) -> Result<()> {
        if self.write_context.is_none() {
            return Err(TransportError::SessionNotOpen("write").into());
        }
        self.container.replace_type(type_name)
    }

    pub fn begin_read(&mut self) -> Result<()> {
        if self.read_context.is_some() {
            return Err(TransportError::SessionAlreadyOpen("read").into());
        }
        self.container.begin_read()?;
        match self.codec.open_read() {
            Ok(context) => {
                self.read_context = Some(context);
                Ok(())
            }
            Err(e) => {
                let _ = self.container.end_read();
                Err(e)
            }
        }
    }

    pub fn end_read(&mut self) -> Result<()> {
        let context = self
            .read_context
            .take()
            .ok_or(TransportError::SessionNotOpen("read"))?;
        let closed = self.codec.close_read(context);
        self.container.end_read()?;
        closed
    }

    /// Opens a write session released on every exit path: dropping the guard
    /// without [`WriteSession::finish`] aborts the session.
    pub fn write_session(&mut self) -> Result<WriteSession<'_, C, S>> {
        self.begin_write()?;
        Ok(WriteSession {
            io: self,
            finished: false,
        })
    }

    /// Opens a read session closed when the guard is dropped.
    pub fn read_session(&mut self) -> Result<ReadSession<'_, C, S>> {
        self.begin_read()?;
        Ok(ReadSession {
            io: self,
            finished: false,
        })
    }

    /// Encodes `value` and stores it under `(type_name, identifier)`.
    pub fn write<T: Serialize>(
        &mut self,
        type_name: Option<&str>,
        identifier: &str,
        value: &T,
    ) -> Result<()> {
        let context = self
            .write_context
            .as_mut()
            .ok_or(TransportError::SessionNotOpen("write"))?;
        let mut bytes = Vec::new();
        self.codec.write(context, value, &mut bytes)?;
        let key = BlobKey {
            type_name,
            identifier,
            extension: self.codec.logical_file_extension(),
        };
        self.container.put(&key, &bytes)
    }

    pub fn read<T: DeserializeOwned>(&mut self, type_name: Option<&str>, identifier: &str) -> Result<T> {
        if self.read_context.is_none() {
            return Err(TransportError::SessionNotOpen("read").into());
        }
        let key = BlobKey {
            type_name,
            identifier,
            extension: self.codec.logical_file_extension(),
        };
        let bytes = self.container.get(&key)?;
        let context = self
            .read_context
            .as_mut()
            .ok_or(TransportError::SessionNotOpen("read"))?;
        self.codec.read(context, &mut bytes.as_slice())
    }

    pub fn contains(&mut self, type_name: Option<&str>, identifier: &str) -> Result<bool> {
        let key = BlobKey {
            type_name,
            identifier,
            extension: self.codec.logical_file_extension(),
        };
        self.container.contains(&key)
    }

    pub fn identifiers(&mut self, type_name: &str) -> Result<Vec<String>> {
        let extension = self.codec.logical_file_extension().to_string();
        self.container.identifiers(type_name, &extension)
    }

    /// Decodes every object stored under `type_name`, in identifier order.
    pub fn read_all<T: DeserializeOwned>(&mut self, type_name: &str) -> Result<Vec<(String, T)>> {
        let identifiers = self.identifiers(type_name)?;
        let mut objects = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            let object = self.read(Some(type_name), &identifier)?;
            objects.push((identifier, object));
        }
        Ok(objects)
    }
}

/// Scoped write session. See [`RegressionIo::write_session`].
pub struct WriteSession<'a, C: Codec, S: Container> {
    io: &'a mut RegressionIo<C, S>,
    finished: bool,
}

impl<C: Codec, S: Container> WriteSession<'_, C, S> {
    /// Commits everything written in this session.
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.io.end_write()
    }
}

impl<C: Codec, S: Container> Deref for WriteSession<'_, C, S> {
    type Target = RegressionIo<C, S>;

    fn deref(&self) -> &Self::Target {
        self.io
    }
}

impl<C: Codec, S: Container> DerefMut for WriteSession<'_, C, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.io
    }
}

impl<C: Codec, S: Container> Drop for WriteSession<'_, C, S> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                "Write session on {} dropped before finishing; discarding its output",
                self.io.describe()
            );
            self.io.abort_write();
        }
    }
}

/// Scoped read session. See [`RegressionIo::read_session`].
pub struct ReadSession<'a, C: Codec, S: Container> {
    io: &'a mut RegressionIo<C, S>,
    finished: bool,
}

impl<C: Codec, S: Container> ReadSession<'_, C, S> {
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.io.end_read()
    }
}

impl<C: Codec, S: Container> Deref for ReadSession<'_, C, S> {
    type Target = RegressionIo<C, S>;

    fn deref(&self) -> &Self::Target {
        self.io
    }
}

impl<C: Codec, S: Container> DerefMut for ReadSession<'_, C, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.io
    }
}

impl<C: Codec, S: Container> Drop for ReadSession<'_, C, S> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.io.end_read() {
                warn!("Failed to close read session on {}: {}", self.io.describe(), e);
            }
        }
    }
}
