use omi_document::SceneIndex;
use serde_json::Value;

use crate::{
    context::{ExportContext, ImportContext},
    data::{self, names, SceneSkyJson, Sky, SkyDocumentJson, SkyJson},
    diagnostics::Diagnostic,
    host::HostScene,
    registry::{DocumentHandler, ExtensionHandler, SceneHandler},
    validate::validate_sky,
    Error, Result, Validation,
};

/// Side channel key of the imported [ImportedSkies].
pub const SKIES_KEY: &str = "OMI_environment_sky/skies";

/// The document sky array; `None` marks skies which failed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedSkies(pub Vec<Option<Sky>>);

/// `OMI_environment_sky`: a document sky array referenced by scenes.
///
/// The resolved [Sky] is attached to the host scene as metadata under the extension name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkyHandler;

impl<H: HostScene> ExtensionHandler<H> for SkyHandler {
    fn document(&self) -> Option<&dyn DocumentHandler<H>> {
        Some(self)
    }

    fn scene(&self) -> Option<&dyn SceneHandler<H>> {
        Some(self)
    }
}

impl<H: HostScene> DocumentHandler<H> for SkyHandler {
    fn import_document(&self, block: &Value, ctx: &mut ImportContext<'_, H>) -> Result<()> {
        let doc: SkyDocumentJson = data::parse(block)?;
        let mut skies = Vec::with_capacity(doc.skies.len());
        for (i, json) in doc.skies.iter().enumerate() {
            let validation = validate_sky(json).with_context(format!("skies[{i}]"));
            match ctx.accept(validation, names::ENVIRONMENT_SKY, None) {
                Ok(()) => skies.push(Some(json.resolve())),
                Err(e) => {
                    ctx.report(
                        Diagnostic::skipped(format!("sky {i} skipped: {e}"))
                            .extension(names::ENVIRONMENT_SKY),
                    );
                    skies.push(None);
                }
            }
        }
        ctx.get_or_create_side_data::<ImportedSkies>(SKIES_KEY)?.0 = skies;
        Ok(())
    }

    fn export_document(&self, ctx: &mut ExportContext<'_, H>) -> Result<Option<Value>> {
        let skies = ctx.take_records::<SkyJson>(names::ENVIRONMENT_SKY)?;
        if skies.is_empty() {
            return Ok(None);
        }
        data::to_block(&SkyDocumentJson { skies }).map(Some)
    }
}

impl<H: HostScene> SceneHandler<H> for SkyHandler {
    fn import_scene(
        &self,
        block: &Value,
        scene: SceneIndex,
        ctx: &mut ImportContext<'_, H>,
    ) -> Result<()> {
        let json: SceneSkyJson = data::parse(block)?;
        let sky = ctx
            .try_get_side_data::<ImportedSkies>(SKIES_KEY)
            .zip(usize::try_from(json.sky).ok())
            .and_then(|(skies, i)| skies.0.get(i).copied().flatten())
            .ok_or_else(|| {
                Error::ValidationFailed(Validation::error(format!(
                    "sky {} is out of range or failed to import",
                    json.sky
                )))
            })?;
        let value = data::to_block(&sky)?;
        ctx.host_mut()
            .attach_scene_metadata(scene, names::ENVIRONMENT_SKY, value);
        Ok(())
    }

    fn export_scene(
        &self,
        scene: SceneIndex,
        ctx: &mut ExportContext<'_, H>,
    ) -> Result<Option<Value>> {
        let Some(value) = ctx.host().scene_metadata(scene, names::ENVIRONMENT_SKY) else {
            return Ok(None);
        };
        let sky: Sky = data::parse(&value)?;
        let json = SkyJson::from(&sky);
        let key = serde_json::to_string(&json)?;
        let sky = ctx.get_or_register_index(names::ENVIRONMENT_SKY, key, || Ok(json))? as i64;
        data::to_block(&SceneSkyJson { sky }).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{host::MemoryScene, settings::Settings};
    use serde_json::json;

    #[test]
    fn scenes_share_skies() {
        let mut host = MemoryScene::new();
        let settings = Settings::default();
        {
            let mut ctx = ImportContext::new(&mut host, &settings);
            let doc = json!({"skies": [
                {"type": "gradient", "gradient": {"topColor": [0.25, 0.5, 0.75]}},
                {"type": "panorama", "panorama": {}},
            ]});
            SkyHandler.import_document(&doc, &mut ctx).unwrap();
            assert_eq!(ctx.diagnostics().len(), 1);
            SkyHandler
                .import_scene(&json!({"sky": 0}), 0, &mut ctx)
                .unwrap();
            SkyHandler
                .import_scene(&json!({"sky": 0}), 1, &mut ctx)
                .unwrap();
            assert!(matches!(
                SkyHandler.import_scene(&json!({"sky": 1}), 2, &mut ctx),
                Err(Error::ValidationFailed(_))
            ));
        }
        let sky: Sky =
            serde_json::from_value(host.scene_metadata(1, names::ENVIRONMENT_SKY).unwrap())
                .unwrap();
        match sky {
            Sky::Gradient { top_color, .. } => assert_eq!(top_color, [0.25, 0.5, 0.75]),
            other => panic!("expected a gradient sky, got {other:?}"),
        }

        let mut ctx = ExportContext::new(&host, &settings);
        assert_eq!(
            SkyHandler.export_scene(1, &mut ctx).unwrap(),
            Some(json!({"sky": 0}))
        );
        assert_eq!(
            SkyHandler.export_scene(0, &mut ctx).unwrap(),
            Some(json!({"sky": 0}))
        );
        assert_eq!(SkyHandler.export_scene(2, &mut ctx).unwrap(), None);
        let doc = SkyHandler.export_document(&mut ctx).unwrap().unwrap();
        assert_eq!(
            doc,
            json!({"skies": [{"type": "gradient", "gradient": {"topColor": [0.25, 0.5, 0.75]}}]})
        );
    }
}
