//! Serialization of [Documents](crate::Document) to storage.

pub mod gltf;

pub use self::gltf::{GENERATOR_ID, MIN_VERSION};
