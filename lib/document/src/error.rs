use std::{io, path::PathBuf};

/// Errors encountered while reading or writing [Documents](crate::Document).
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "de_gltf")]
    #[error(transparent)]
    Glb(#[from] ::gltf::Error),
    #[error("binary glTF container support is disabled (enable the `de_gltf` feature)")]
    GlbUnsupported,
    #[error("expected file, found directory: {0:?}")]
    IsADirectory(PathBuf),
    #[error("node {node} lists child {child}, but the document only has {count} nodes")]
    ChildOutOfRange {
        node: usize,
        child: usize,
        count: usize,
    },
}
