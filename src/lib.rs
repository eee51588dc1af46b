//! Import/export pipeline for glTF extension blocks: physics shapes, bodies & joints, audio
//! emitters, skies, and a handful of pure-data node extensions.
//!
//! A [Registry] routes each named extension block to its [handlers](registry::ExtensionHandler).
//! An [Importer] or [Exporter] walks a parsed [Document](omi_document::Document) once per pass,
//! lending the handlers an [ImportContext] or [ExportContext] which tracks index ↔ object
//! correspondences for the length of that pass. Everything host-specific goes through
//! [HostScene](host::HostScene); [MemoryScene](host::MemoryScene) is a complete in-memory
//! implementation.
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

pub mod context;
pub mod convert;
pub mod data;
pub mod diagnostics;
mod error;
pub mod handlers;
pub mod host;
mod pipeline;
pub mod registry;
pub mod settings;
pub mod validate;

pub use context::{ExportContext, ImportContext, SideChannel};
pub use convert::{BodyEngine, Converted, CoordinateSpace, ShapeEngine};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::*;
pub use pipeline::*;
pub use registry::Registry;
pub use settings::Settings;
pub use validate::Validation;

#[doc(no_inline)]
pub use omi_document as document;
