use omi_document::NodeIndex;
use serde_json::Value;

use crate::{
    context::{ExportContext, ImportContext},
    convert::BodyEngine,
    data::{self, names, BodyJson},
    handlers::{ImportedShapes, SHAPES_KEY},
    host::HostScene,
    registry::{ExtensionHandler, NodeHandler},
    validate::validate_body,
    Result,
};

/// `OMI_physics_body`: motion, colliders and triggers of individual nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyHandler;

impl<H: HostScene> ExtensionHandler<H> for BodyHandler {
    fn node(&self) -> Option<&dyn NodeHandler<H>> {
        Some(self)
    }
}

impl<H: HostScene> NodeHandler<H> for BodyHandler {
    fn import_node(
        &self,
        block: &Value,
        node: NodeIndex,
        object: H::Object,
        ctx: &mut ImportContext<'_, H>,
    ) -> Result<()> {
        let json: BodyJson = data::parse(block)?;
        let shapes = ctx
            .try_get_side_data::<ImportedShapes>(SHAPES_KEY)
            .map(|s| s.0.clone())
            .unwrap_or_default();
        // shape indices are resolved by the engine, which fails with MissingShapeReference
        ctx.accept(validate_body(&json, None), names::PHYSICS_BODY, Some(node))?;
        let body = json.resolve()?;
        BodyEngine::new(ctx.settings()).import(&body, &shapes, object, ctx)
    }

    fn export_node(
        &self,
        object: H::Object,
        node: NodeIndex,
        ctx: &mut ExportContext<'_, H>,
    ) -> Result<Option<Value>> {
        let engine = BodyEngine::new(ctx.settings());
        match engine.export(object, node, ctx)? {
            Some(body) => data::to_block(&BodyJson::from(&body)).map(Some),
            None => Ok(None),
        }
    }
}
