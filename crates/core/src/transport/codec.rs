//! Codecs turn one object into bytes and back.

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};

use crate::constants::JSON_FILE_EXTENSION;
use crate::errors::{Result, TransportError};

/// Encoding of single objects.
///
/// `open_write`/`open_read` establish a context that lives for one session
/// and is handed back to `close_write`/`close_read`. The context is owned by
/// the caller, never by the codec, so one codec value can serve independent
/// sessions.
pub trait Codec: Send + Sync {
    type Context: Send;

    fn open_write(&self) -> Result<Self::Context>;

    fn close_write(&self, context: Self::Context) -> Result<()>;

    fn open_read(&self) -> Result<Self::Context>;

    fn close_read(&self, context: Self::Context) -> Result<()>;

    fn write<T: Serialize>(
        &self,
        context: &mut Self::Context,
        value: &T,
        out: &mut dyn Write,
    ) -> Result<()>;

    fn read<T: DeserializeOwned>(&self, context: &mut Self::Context, input: &mut dyn Read)
        -> Result<T>;

    /// Extension containers append to identifiers, including the dot.
    fn logical_file_extension(&self) -> &str;
}

/// Per-session bookkeeping for [`JsonCodec`].
#[derive(Debug, Default)]
pub struct JsonContext {
    objects: usize,
}

impl JsonContext {
    pub fn objects(&self) -> usize {
        self.objects
    }
}

/// JSON codec backed by `serde_json`.
///
/// Pretty output is stable for a given value (maps are ordered), which keeps
/// repeated dumps of an unchanged store byte-identical.
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::pretty()
    }
}

impl Codec for JsonCodec {
    type Context = JsonContext;

    fn open_write(&self) -> Result<JsonContext> {
        Ok(JsonContext::default())
    }

    fn close_write(&self, context: JsonContext) -> Result<()> {
        debug!("JSON write session closed after {} objects", context.objects);
        Ok(())
    }

    fn open_read(&self) -> Result<JsonContext> {
        Ok(JsonContext::default())
    }

    fn close_read(&self, context: JsonContext) -> Result<()> {
        debug!("JSON read session closed after {} objects", context.objects);
        Ok(())
    }

    fn write<T: Serialize>(
        &self,
        context: &mut JsonContext,
        value: &T,
        out: &mut dyn Write,
    ) -> Result<()> {
        let encoded = if self.pretty {
            serde_json::to_writer_pretty(&mut *out, value)
        } else {
            serde_json::to_writer(&mut *out, value)
        };
        encoded.map_err(|e| TransportError::Encode(e.to_string()))?;
        if self.pretty {
            out.write_all(b"\n").map_err(TransportError::Io)?;
        }
        context.objects += 1;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, context: &mut JsonContext, input: &mut dyn Read) -> Result<T> {
        let value = serde_json::from_reader(&mut *input)
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        context.objects += 1;
        Ok(value)
    }

    fn logical_file_extension(&self) -> &str {
        JSON_FILE_EXTENSION
    }
}
