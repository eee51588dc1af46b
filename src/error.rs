use crate::validate::Validation;

/// Errors raised by the extension pipeline.
///
/// Per-node and per-record failures are isolated by the pass drivers: they're recorded as
/// [diagnostics](crate::Diagnostic) and the pass carries on. Only registry misuse
/// ([`InvalidArgument`](Error::InvalidArgument)) is fatal to the call that caused it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("mesh reference {0} does not resolve to a loaded mesh")]
    MissingMeshReference(i64),
    #[error("shape reference {0} does not resolve to a valid document shape")]
    MissingShapeReference(i64),
    #[error("node reference {0} does not resolve to a document node")]
    MissingNodeReference(i64),
    #[error("no shape conversion exists for host collider kind `{0}`")]
    UnsupportedColliderKind(String),
    #[error("no host collider exists for shape type `{0}`")]
    UnsupportedShapeType(String),
    #[error("validation failed: {}", .0.errors().join("; "))]
    ValidationFailed(Validation),
    #[error("side data `{key}` holds a `{found}`, not a `{expected}`")]
    SideDataType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Document(#[from] omi_document::DocumentError),
    #[error("pass cancelled")]
    Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
