//! Built-in extension handlers.

mod audio;
mod node_data;
mod physics_body;
mod physics_joint;
mod physics_shape;
mod sky;

use std::sync::Arc;

pub use audio::*;
pub use node_data::*;
pub use physics_body::*;
pub use physics_joint::*;
pub use physics_shape::*;
pub use sky::*;

use crate::{
    data::{names, LinkJson, PersonalityJson, SeatJson, SpawnPointJson},
    host::HostScene,
    registry::Registry,
};

/// Register a handler for every built-in extension.
pub fn register_builtin<H: HostScene>(registry: &mut Registry<H>) {
    let builtin: [(&str, Arc<dyn crate::registry::ExtensionHandler<H>>); 9] = [
        (names::PHYSICS_SHAPE, Arc::new(ShapeHandler)),
        (names::PHYSICS_BODY, Arc::new(BodyHandler)),
        (names::PHYSICS_JOINT, Arc::new(JointHandler)),
        (names::AUDIO_EMITTER, Arc::new(AudioHandler)),
        (names::ENVIRONMENT_SKY, Arc::new(SkyHandler)),
        (names::SPAWN_POINT, Arc::new(DataHandler::<SpawnPointJson>::new())),
        (names::SEAT, Arc::new(DataHandler::<SeatJson>::new())),
        (names::LINK, Arc::new(DataHandler::<LinkJson>::new())),
        (names::PERSONALITY, Arc::new(DataHandler::<PersonalityJson>::new())),
    ];
    for (name, handler) in builtin {
        // names are non-empty constants
        if let Err(e) = registry.register(name, handler) {
            tracing::error!(extension = name, "failed to register built-in handler: {e}");
        }
    }
}
