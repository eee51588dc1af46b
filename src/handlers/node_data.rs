use std::marker::PhantomData;

use nalgebra::Vector3;
use omi_common::Defaulted;
use omi_document::NodeIndex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    context::{ExportContext, ImportContext},
    convert::CoordinateSpace,
    data::{self, names, LinkJson, PersonalityJson, SeatJson, SpawnPointJson, DEFAULT_KNEE_ANGLE},
    host::HostScene,
    registry::{ExtensionHandler, NodeHandler},
    validate::{validate_link, validate_personality, validate_seat, validate_spawn_point},
    Result, Validation,
};

/// A node extension whose block is stored on the host object as metadata, after validation and
/// any coordinate conversion.
pub trait NodeData: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Extension name, also used as the metadata key.
    const NAME: &'static str;

    fn validate(&self) -> Validation;

    fn to_host(self, _space: &CoordinateSpace) -> Self {
        self
    }

    fn from_host(self, _space: &CoordinateSpace) -> Self {
        self
    }
}

impl NodeData for SpawnPointJson {
    const NAME: &'static str = names::SPAWN_POINT;

    fn validate(&self) -> Validation {
        validate_spawn_point(self)
    }
}

impl NodeData for LinkJson {
    const NAME: &'static str = names::LINK;

    fn validate(&self) -> Validation {
        validate_link(self)
    }
}

impl NodeData for PersonalityJson {
    const NAME: &'static str = names::PERSONALITY;

    fn validate(&self) -> Validation {
        validate_personality(self)
    }
}

impl NodeData for SeatJson {
    const NAME: &'static str = names::SEAT;

    fn validate(&self) -> Validation {
        validate_seat(self)
    }

    /// Host seats always carry an explicit angle, in host units.
    fn to_host(self, space: &CoordinateSpace) -> Self {
        let point = |p: [f32; 3]| -> [f32; 3] { space.point(Vector3::from(p)).into() };
        Self {
            back: point(self.back),
            foot: point(self.foot),
            knee: point(self.knee),
            angle: Defaulted::Specified(self.knee_angle() * space.angle_unit.per_radian()),
        }
    }

    fn from_host(self, space: &CoordinateSpace) -> Self {
        let point = |p: [f32; 3]| -> [f32; 3] { space.point(Vector3::from(p)).into() };
        let angle = self.angle.map(|a| a / space.angle_unit.per_radian());
        Self {
            back: point(self.back),
            foot: point(self.foot),
            knee: point(self.knee),
            angle: match angle {
                Defaulted::Specified(a) => Defaulted::unless_default(a, &DEFAULT_KNEE_ANGLE),
                Defaulted::Default => Defaulted::Default,
            },
        }
    }
}

/// Handler for a [NodeData] extension.
pub struct DataHandler<T>(PhantomData<fn() -> T>);

impl<T> DataHandler<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for DataHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for DataHandler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DataHandler")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<H: HostScene, T: NodeData> ExtensionHandler<H> for DataHandler<T> {
    fn node(&self) -> Option<&dyn NodeHandler<H>> {
        Some(self)
    }
}

impl<H: HostScene, T: NodeData> NodeHandler<H> for DataHandler<T> {
    fn import_node(
        &self,
        block: &Value,
        node: NodeIndex,
        object: H::Object,
        ctx: &mut ImportContext<'_, H>,
    ) -> Result<()> {
        let record: T = data::parse(block)?;
        ctx.accept(record.validate(), T::NAME, Some(node))?;
        let value = data::to_block(&record.to_host(&ctx.space()))?;
        ctx.host_mut().attach_metadata(object, T::NAME, value);
        Ok(())
    }

    fn export_node(
        &self,
        object: H::Object,
        node: NodeIndex,
        ctx: &mut ExportContext<'_, H>,
    ) -> Result<Option<Value>> {
        let Some(value) = ctx.host().metadata(object, T::NAME) else {
            return Ok(None);
        };
        let record = data::parse::<T>(&value)?.from_host(&ctx.space());
        ctx.accept(record.validate(), T::NAME, Some(node))?;
        data::to_block(&record).map(Some)
    }
}
