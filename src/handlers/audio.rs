use omi_common::Defaulted;
use omi_document::{NodeIndex, SceneIndex};
use serde_json::Value;

use crate::{
    context::{ExportContext, ImportContext},
    data::{
        self, names, AudioDataJson, AudioDocumentJson, AudioEmitter, AudioEmitterJson,
        AudioSource, AudioSourceJson, EmitterType, NodeEmitterJson, PositionalJson,
        SceneEmittersJson, DEFAULT_GAIN,
    },
    diagnostics::Diagnostic,
    host::HostScene,
    registry::{DocumentHandler, ExtensionHandler, NodeHandler, SceneHandler},
    validate::validate_audio_document,
    Error, Result, Validation,
};

/// Side channel key of the imported [ImportedEmitters].
pub const EMITTERS_KEY: &str = "KHR_audio_emitter/emitters";

const AUDIO_KIND: &str = "KHR_audio_emitter/audio";
const SOURCES_KIND: &str = "KHR_audio_emitter/sources";
const EMITTERS_KIND: &str = EMITTERS_KEY;

/// The document emitter array with every source & payload reference resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedEmitters(pub Vec<AudioEmitter>);

fn imported_emitter<H: HostScene>(ctx: &ImportContext<'_, H>, index: i64) -> Result<AudioEmitter> {
    ctx.try_get_side_data::<ImportedEmitters>(EMITTERS_KEY)
        .zip(usize::try_from(index).ok())
        .and_then(|(e, i)| e.0.get(i))
        .cloned()
        .ok_or_else(|| {
            Error::ValidationFailed(Validation::error(format!(
                "emitter {index} is out of range"
            )))
        })
}

/// `KHR_audio_emitter`: global emitters on scenes, positional emitters on nodes.
///
/// Resolved [AudioEmitter]s are attached to host objects & scenes as metadata under the
/// extension name.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioHandler;

impl<H: HostScene> ExtensionHandler<H> for AudioHandler {
    fn document(&self) -> Option<&dyn DocumentHandler<H>> {
        Some(self)
    }

    fn node(&self) -> Option<&dyn NodeHandler<H>> {
        Some(self)
    }

    fn scene(&self) -> Option<&dyn SceneHandler<H>> {
        Some(self)
    }
}

impl<H: HostScene> DocumentHandler<H> for AudioHandler {
    fn import_document(&self, block: &Value, ctx: &mut ImportContext<'_, H>) -> Result<()> {
        let doc: AudioDocumentJson = data::parse(block)?;
        ctx.accept(validate_audio_document(&doc), names::AUDIO_EMITTER, None)?;

        // indices were bounds checked above
        let sources: Vec<AudioSource> = doc
            .sources
            .iter()
            .map(|s| {
                let audio = s
                    .audio
                    .and_then(|a| doc.audio.get(usize::try_from(a).ok()?).cloned());
                s.resolve(audio)
            })
            .collect();
        let emitters = doc
            .emitters
            .iter()
            .map(|e| {
                let own = e
                    .sources
                    .iter()
                    .filter_map(|s| sources.get(usize::try_from(*s).ok()?).cloned())
                    .collect();
                e.resolve(own)
            })
            .collect();
        ctx.get_or_create_side_data::<ImportedEmitters>(EMITTERS_KEY)?
            .0 = emitters;
        Ok(())
    }

    fn export_document(&self, ctx: &mut ExportContext<'_, H>) -> Result<Option<Value>> {
        let doc = AudioDocumentJson {
            audio: ctx.take_records(AUDIO_KIND)?,
            sources: ctx.take_records(SOURCES_KIND)?,
            emitters: ctx.take_records(EMITTERS_KIND)?,
        };
        if doc.emitters.is_empty() && doc.sources.is_empty() && doc.audio.is_empty() {
            return Ok(None);
        }
        data::to_block(&doc).map(Some)
    }
}

impl<H: HostScene> SceneHandler<H> for AudioHandler {
    fn import_scene(
        &self,
        block: &Value,
        scene: SceneIndex,
        ctx: &mut ImportContext<'_, H>,
    ) -> Result<()> {
        let json: SceneEmittersJson = data::parse(block)?;
        let mut emitters = Vec::with_capacity(json.emitters.len());
        for &index in &json.emitters {
            let emitter = imported_emitter(ctx, index)?;
            if emitter.kind != EmitterType::Global {
                ctx.report(
                    Diagnostic::lossy(format!(
                        "scene {scene} references positional emitter {index}; it plays unspatialized"
                    ))
                    .extension(names::AUDIO_EMITTER),
                );
            }
            emitters.push(emitter);
        }
        let value = data::to_block(&emitters)?;
        ctx.host_mut()
            .attach_scene_metadata(scene, names::AUDIO_EMITTER, value);
        Ok(())
    }

    fn export_scene(
        &self,
        scene: SceneIndex,
        ctx: &mut ExportContext<'_, H>,
    ) -> Result<Option<Value>> {
        let Some(value) = ctx.host().scene_metadata(scene, names::AUDIO_EMITTER) else {
            return Ok(None);
        };
        let emitters: Vec<AudioEmitter> = data::parse(&value)?;
        if emitters.is_empty() {
            return Ok(None);
        }
        let emitters = emitters
            .iter()
            .map(|e| register_emitter(e, ctx).map(|i| i as i64))
            .collect::<Result<Vec<_>>>()?;
        data::to_block(&SceneEmittersJson { emitters }).map(Some)
    }
}

impl<H: HostScene> NodeHandler<H> for AudioHandler {
    fn import_node(
        &self,
        block: &Value,
        node: NodeIndex,
        object: H::Object,
        ctx: &mut ImportContext<'_, H>,
    ) -> Result<()> {
        let json: NodeEmitterJson = data::parse(block)?;
        let emitter = imported_emitter(ctx, json.emitter)?;
        if emitter.kind != EmitterType::Positional {
            ctx.report(
                Diagnostic::lossy(format!(
                    "node references global emitter {}; it plays unspatialized",
                    json.emitter
                ))
                .extension(names::AUDIO_EMITTER)
                .node(node),
            );
        }
        let value = data::to_block(&emitter)?;
        ctx.host_mut()
            .attach_metadata(object, names::AUDIO_EMITTER, value);
        Ok(())
    }

    fn export_node(
        &self,
        object: H::Object,
        _node: NodeIndex,
        ctx: &mut ExportContext<'_, H>,
    ) -> Result<Option<Value>> {
        let Some(value) = ctx.host().metadata(object, names::AUDIO_EMITTER) else {
            return Ok(None);
        };
        let emitter: AudioEmitter = data::parse(&value)?;
        let emitter = register_emitter(&emitter, ctx)? as i64;
        data::to_block(&NodeEmitterJson { emitter }).map(Some)
    }
}

/// Register `emitter` and everything it references, returning its index in the emitter array.
fn register_emitter<H: HostScene>(
    emitter: &AudioEmitter,
    ctx: &mut ExportContext<'_, H>,
) -> Result<usize> {
    let mut sources = Vec::with_capacity(emitter.sources.len());
    for source in &emitter.sources {
        let audio = match &source.audio {
            Some(audio) => Some(register(ctx, AUDIO_KIND, audio.clone())? as i64),
            None => None,
        };
        let json = AudioSourceJson {
            gain: Defaulted::unless_default(source.gain, &DEFAULT_GAIN),
            auto_play: Defaulted::unless_default(source.auto_play, &false),
            looping: Defaulted::unless_default(source.looping, &false),
            audio,
        };
        sources.push(register(ctx, SOURCES_KIND, json)? as i64);
    }
    let json = AudioEmitterJson {
        kind: emitter.kind,
        name: emitter.name.clone(),
        gain: Defaulted::unless_default(emitter.gain, &DEFAULT_GAIN),
        sources,
        positional: match emitter.kind {
            EmitterType::Global => None,
            EmitterType::Positional => emitter
                .positional
                .as_ref()
                .map(PositionalJson::from)
                .filter(|p| *p != PositionalJson::default()),
        },
    };
    register(ctx, EMITTERS_KIND, json)
}

/// Deduplicate a record by its serialized form.
fn register<H, T>(ctx: &mut ExportContext<'_, H>, kind: &str, record: T) -> Result<usize>
where
    H: HostScene,
    T: serde::Serialize + Send + 'static,
{
    let key = serde_json::to_string(&record)?;
    ctx.get_or_register_index(kind, key, || Ok(record))
}
