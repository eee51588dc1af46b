//! The parsed form of a glTF document, as consumed and produced by the extension pipeline.
//!
//! Only the parts of the document the pipeline needs are typed (scenes, nodes, meshes and every
//! `extensions` map); everything else is carried through verbatim so that a document survives a
//! read/write cycle.

#[cfg(feature = "deserialize")]
pub mod de;

#[cfg(feature = "serialize")]
pub mod ser;

mod data;
mod error;
pub use data::*;
pub use error::*;
