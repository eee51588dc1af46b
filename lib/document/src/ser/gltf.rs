//! Utilities for serializing [Documents](crate::Document) to [glTF](https://github.com/KhronosGroup/glTF) JSON.
//!
//! # See Also
//!
//! * [glTF Specification](https://registry.khronos.org/glTF/specs/2.0/glTF-2.0.html)

use std::{io::Write, path::Path};

use crate::{Document, DocumentError};

/// The value of the `generator` field in output glTF assets.
///
/// See also: [glTF Asset Specification](https://registry.khronos.org/glTF/specs/2.0/glTF-2.0.html#asset)
pub const GENERATOR_ID: &str = concat!("omi-document@", env!("CARGO_PKG_VERSION"));

/// Minimum glTF version required to load generated assets.
///
/// See also: [glTF Asset Specification](https://registry.khronos.org/glTF/specs/2.0/glTF-2.0.html#asset)
pub const MIN_VERSION: &str = "2.0";

impl Document {
    /// Fill in `asset.generator` if the document doesn't already name one.
    pub fn stamp_generator(&mut self) {
        self.asset.generator.get_or_insert_with(|| GENERATOR_ID.to_owned());
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String, DocumentError> {
        let res = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        res.map_err(DocumentError::from)
    }

    pub fn to_writer(&self, writer: impl Write, pretty: bool) -> Result<(), DocumentError> {
        let res = if pretty {
            serde_json::to_writer_pretty(writer, self)
        } else {
            serde_json::to_writer(writer, self)
        };
        res.map_err(DocumentError::from)
    }

    #[tracing::instrument(skip(self), fields(path = ?path.as_ref()))]
    pub fn write_path(&self, path: impl AsRef<Path>, pretty: bool) -> Result<(), DocumentError> {
        tracing::debug!("writing glTF document");
        let file = std::fs::File::create(path)?;
        self.to_writer(std::io::BufWriter::new(file), pretty)
    }
}
