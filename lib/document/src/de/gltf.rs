//! Reading documents out of binary glTF (GLB) containers.
//!
//! Only the JSON chunk is used; binary chunk contents are left for the host to resolve.
//!
//! # See Also
//!
//! * [GLB File Format Specification](https://registry.khronos.org/glTF/specs/2.0/glTF-2.0.html#glb-file-format-specification)

use ::gltf::Glb;

use crate::{Document, DocumentError};

/// Parse the JSON chunk of a GLB container.
pub fn from_glb_slice(data: &[u8]) -> Result<Document, DocumentError> {
    let glb = Glb::from_slice(data)?;
    tracing::trace!(
        version = glb.header.version,
        length = glb.header.length,
        has_bin = glb.bin.is_some(),
        "read GLB container"
    );
    Document::from_json_slice(&glb.json)
}
