//! Deserialization of [Documents](crate::Document) from storage.
//!
//! # Notes
//!
//! * Coordinate system: right-handed, Y-up; no conversion happens at this level.
//! * glTF data *may* contain scenes, and it *may* specify a default scene, but these aren't
//!   required by the format.

#[cfg(feature = "de_gltf")]
pub mod gltf;

use std::path::Path;

use crate::{Document, DocumentError};

/// The magic bytes at the start of a binary glTF container.
pub const GLB_MAGIC: &[u8; 4] = b"glTF";

impl Document {
    /// Parse a document from glTF JSON.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, DocumentError> {
        serde_json::from_slice(data).map_err(DocumentError::from)
    }

    /// Parse a document from either glTF JSON or a GLB container; the format is detected from
    /// the leading magic bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, DocumentError> {
        if data.starts_with(GLB_MAGIC) {
            #[cfg(feature = "de_gltf")]
            return gltf::from_glb_slice(data);
            #[cfg(not(feature = "de_gltf"))]
            return Err(DocumentError::GlbUnsupported);
        }
        Self::from_json_slice(data)
    }

    #[tracing::instrument(skip_all, fields(path = ?path.as_ref()))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(DocumentError::IsADirectory(path.to_path_buf()));
        }
        tracing::debug!("reading glTF document");
        let data = std::fs::read(path)?;
        Self::from_slice(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json() {
        let doc = Document::from_json_slice(br#"{"asset":{"version":"2.0"}}"#).unwrap();
        assert_eq!(doc.asset.version, "2.0");
        assert!(doc.nodes.is_empty());
    }

    #[test]
    fn unknown_fields_survive() {
        let doc = Document::from_json_slice(
            br#"{"asset":{"version":"2.0"},"buffers":[{"byteLength":4}],"nodes":[{"matrix":[1]}]}"#,
        )
        .unwrap();
        assert!(doc.other.contains_key("buffers"));
        assert!(doc.nodes[0].other.contains_key("matrix"));
    }
}
