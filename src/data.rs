//! Wire records for each extension kind, mirroring their JSON schemas, and the resolved records
//! the rest of the crate works with.
//!
//! Wire records keep optional numeric fields as [Defaulted]; `resolve` turns them into concrete
//! values exactly once, when a record is parsed.

mod audio;
mod body;
mod joint;
mod link;
mod personality;
mod seat;
mod shape;
mod sky;
mod spawn;

pub use audio::*;
pub use body::*;
pub use joint::*;
pub use link::*;
pub use personality::*;
pub use seat::*;
pub use shape::*;
pub use sky::*;
pub use spawn::*;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

#[doc(no_inline)]
pub use omi_common::Defaulted;

use crate::{Error, Result};

/// Extension keys understood by the built-in handlers.
pub mod names {
    pub const PHYSICS_SHAPE: &str = "OMI_physics_shape";
    pub const PHYSICS_BODY: &str = "OMI_physics_body";
    pub const PHYSICS_JOINT: &str = "OMI_physics_joint";
    pub const AUDIO_EMITTER: &str = "KHR_audio_emitter";
    pub const ENVIRONMENT_SKY: &str = "OMI_environment_sky";
    pub const SPAWN_POINT: &str = "OMI_spawn_point";
    pub const SEAT: &str = "OMI_seat";
    pub const LINK: &str = "OMI_link";
    pub const PERSONALITY: &str = "OMI_personality";
}

/// Parse an extension block into its wire record.
pub fn parse<T: DeserializeOwned>(block: &Value) -> Result<T> {
    T::deserialize(block).map_err(Error::from)
}

/// Serialize a wire record into an extension block.
pub fn to_block<T: Serialize>(record: &T) -> Result<Value> {
    serde_json::to_value(record).map_err(Error::from)
}

/// Convert an index read from a document into a `usize`, failing with `err` when negative.
pub(crate) fn index(value: i64, err: fn(i64) -> Error) -> Result<usize> {
    usize::try_from(value).map_err(|_| err(value))
}
