use serde_json::Value;

use crate::{
    context::{ExportContext, ImportContext},
    data::{self, names, ShapeDocumentJson, ShapeJson, ShapeRecord},
    diagnostics::Diagnostic,
    host::HostScene,
    registry::{DocumentHandler, ExtensionHandler},
    validate::validate_shape,
    Result,
};

/// Side channel key of the imported [ImportedShapes].
pub const SHAPES_KEY: &str = "OMI_physics_shape/shapes";

/// The document shape array, as imported; `None` marks shapes which failed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedShapes(pub Vec<Option<ShapeRecord>>);

/// `OMI_physics_shape`: owns the document shape array.
///
/// On import the resolved shapes are stashed for the body handler; on export the shapes
/// registered while exporting bodies are written out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeHandler;

impl<H: HostScene> ExtensionHandler<H> for ShapeHandler {
    fn document(&self) -> Option<&dyn DocumentHandler<H>> {
        Some(self)
    }
}

impl<H: HostScene> DocumentHandler<H> for ShapeHandler {
    fn import_document(&self, block: &Value, ctx: &mut ImportContext<'_, H>) -> Result<()> {
        let doc: ShapeDocumentJson = data::parse(block)?;
        let mut shapes = Vec::with_capacity(doc.shapes.len());
        for (i, json) in doc.shapes.iter().enumerate() {
            shapes.push(import_shape(i, json, ctx));
        }
        tracing::debug!(
            count = shapes.len(),
            valid = shapes.iter().flatten().count(),
            "imported physics shapes"
        );
        ctx.get_or_create_side_data::<ImportedShapes>(SHAPES_KEY)?.0 = shapes;
        Ok(())
    }

    fn export_document(&self, ctx: &mut ExportContext<'_, H>) -> Result<Option<Value>> {
        let records = ctx.take_records::<ShapeRecord>(names::PHYSICS_SHAPE)?;
        if records.is_empty() {
            return Ok(None);
        }
        let doc = ShapeDocumentJson {
            shapes: records.iter().map(ShapeJson::from).collect(),
        };
        data::to_block(&doc).map(Some)
    }
}

fn import_shape<H: HostScene>(
    index: usize,
    json: &ShapeJson,
    ctx: &mut ImportContext<'_, H>,
) -> Option<ShapeRecord> {
    let validation = validate_shape(json).with_context(format!("shapes[{index}]"));
    let res = ctx
        .accept(validation, names::PHYSICS_SHAPE, None)
        .and_then(|_| json.resolve());
    match res {
        Ok(record) => Some(record),
        Err(e) => {
            ctx.report(
                Diagnostic::skipped(format!("shape {index} skipped: {e}"))
                    .extension(names::PHYSICS_SHAPE),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{host::MemoryScene, settings::Settings};

    #[test]
    fn invalid_shapes_leave_holes() {
        let mut host = MemoryScene::new();
        let settings = Settings::default();
        let mut ctx = ImportContext::new(&mut host, &settings);
        let block = serde_json::json!({"shapes": [
            {"type": "sphere"},
            {"type": "box", "box": {"size": [0, 1, 1]}},
            {"type": "torus"},
        ]});
        ShapeHandler.import_document(&block, &mut ctx).unwrap();
        let shapes = ctx.try_get_side_data::<ImportedShapes>(SHAPES_KEY).unwrap();
        assert_eq!(
            shapes.0,
            [Some(ShapeRecord::Sphere { radius: 0.5 }), None, None]
        );
        assert_eq!(ctx.diagnostics().len(), 2);
    }
}
