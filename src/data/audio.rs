use std::f32::consts::TAU;

use omi_common::Defaulted;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GAIN: f32 = 1.0;
pub const DEFAULT_CONE_ANGLE: f32 = TAU;
pub const DEFAULT_CONE_OUTER_GAIN: f32 = 0.0;
pub const DEFAULT_MAX_DISTANCE: f32 = 10000.0;
pub const DEFAULT_REF_DISTANCE: f32 = 1.0;
pub const DEFAULT_ROLLOFF_FACTOR: f32 = 1.0;

/// Document-level `KHR_audio_emitter` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioDocumentJson {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio: Vec<AudioDataJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<AudioSourceJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emitters: Vec<AudioEmitterJson>,
}

/// Audio payload location; exactly one of `uri` or `bufferView` is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDataJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSourceJson {
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub gain: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub auto_play: Defaulted<bool>,
    #[serde(default, rename = "loop", skip_serializing_if = "Defaulted::is_default")]
    pub looping: Defaulted<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitterType {
    /// Non-spatialized; attached to scenes.
    #[default]
    Global,
    /// Spatialized; attached to nodes.
    Positional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceModel {
    Linear,
    #[default]
    Inverse,
    Exponential,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioEmitterJson {
    #[serde(rename = "type")]
    pub kind: EmitterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub gain: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positional: Option<PositionalJson>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionalJson {
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub cone_inner_angle: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub cone_outer_angle: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub cone_outer_gain: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub distance_model: Defaulted<DistanceModel>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub max_distance: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub ref_distance: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub rolloff_factor: Defaulted<f32>,
}

/// Node-level `KHR_audio_emitter` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEmitterJson {
    pub emitter: i64,
}

/// Scene-level `KHR_audio_emitter` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneEmittersJson {
    #[serde(default)]
    pub emitters: Vec<i64>,
}

// resolved records; these are what's attached to host objects & scenes

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSource {
    pub gain: f32,
    pub auto_play: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub audio: Option<AudioDataJson>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Positional {
    pub cone_inner_angle: f32,
    pub cone_outer_angle: f32,
    pub cone_outer_gain: f32,
    pub distance_model: DistanceModel,
    pub max_distance: f32,
    pub ref_distance: f32,
    pub rolloff_factor: f32,
}

impl Default for Positional {
    fn default() -> Self {
        PositionalJson::default().resolve()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioEmitter {
    #[serde(rename = "type")]
    pub kind: EmitterType,
    pub name: Option<String>,
    pub gain: f32,
    pub sources: Vec<AudioSource>,
    /// Present iff `kind` is [EmitterType::Positional].
    pub positional: Option<Positional>,
}

impl PositionalJson {
    pub fn resolve(&self) -> Positional {
        Positional {
            cone_inner_angle: self.cone_inner_angle.resolve(DEFAULT_CONE_ANGLE),
            cone_outer_angle: self.cone_outer_angle.resolve(DEFAULT_CONE_ANGLE),
            cone_outer_gain: self.cone_outer_gain.resolve(DEFAULT_CONE_OUTER_GAIN),
            distance_model: self.distance_model.resolve(DistanceModel::default()),
            max_distance: self.max_distance.resolve(DEFAULT_MAX_DISTANCE),
            ref_distance: self.ref_distance.resolve(DEFAULT_REF_DISTANCE),
            rolloff_factor: self.rolloff_factor.resolve(DEFAULT_ROLLOFF_FACTOR),
        }
    }
}

impl From<&Positional> for PositionalJson {
    fn from(p: &Positional) -> Self {
        Self {
            cone_inner_angle: Defaulted::unless_default(p.cone_inner_angle, &DEFAULT_CONE_ANGLE),
            cone_outer_angle: Defaulted::unless_default(p.cone_outer_angle, &DEFAULT_CONE_ANGLE),
            cone_outer_gain: Defaulted::unless_default(
                p.cone_outer_gain,
                &DEFAULT_CONE_OUTER_GAIN,
            ),
            distance_model: Defaulted::unless_default(p.distance_model, &DistanceModel::default()),
            max_distance: Defaulted::unless_default(p.max_distance, &DEFAULT_MAX_DISTANCE),
            ref_distance: Defaulted::unless_default(p.ref_distance, &DEFAULT_REF_DISTANCE),
            rolloff_factor: Defaulted::unless_default(p.rolloff_factor, &DEFAULT_ROLLOFF_FACTOR),
        }
    }
}

impl AudioSourceJson {
    /// `audio` is the already-resolved payload this source refers to, if any.
    pub fn resolve(&self, audio: Option<AudioDataJson>) -> AudioSource {
        AudioSource {
            gain: self.gain.resolve(DEFAULT_GAIN),
            auto_play: self.auto_play.resolve(false),
            looping: self.looping.resolve(false),
            audio,
        }
    }
}

impl AudioEmitterJson {
    /// `sources` are the already-resolved sources this emitter refers to.
    pub fn resolve(&self, sources: Vec<AudioSource>) -> AudioEmitter {
        AudioEmitter {
            kind: self.kind,
            name: self.name.clone(),
            gain: self.gain.resolve(DEFAULT_GAIN),
            sources,
            positional: match self.kind {
                EmitterType::Global => None,
                EmitterType::Positional => {
                    Some(self.positional.unwrap_or_default().resolve())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_defaults() {
        let e: AudioEmitterJson = serde_json::from_str(r#"{"type":"positional"}"#).unwrap();
        let e = e.resolve(vec![]);
        let p = e.positional.unwrap();
        assert_eq!(e.gain, 1.0);
        assert_eq!(p.cone_inner_angle, TAU);
        assert_eq!(p.cone_outer_gain, 0.0);
        assert_eq!(p.distance_model, DistanceModel::Inverse);
        assert_eq!(p.max_distance, 10000.0);
        assert_eq!(p.rolloff_factor, 1.0);
    }

    #[test]
    fn global_has_no_positional() {
        let e: AudioEmitterJson =
            serde_json::from_str(r#"{"type":"global","positional":{"refDistance":3}}"#).unwrap();
        assert_eq!(e.resolve(vec![]).positional, None);
    }

    #[test]
    fn defaults_are_omitted_when_writing() {
        let json = PositionalJson::from(&Positional {
            ref_distance: 2.0,
            ..Default::default()
        });
        assert_eq!(
            serde_json::to_value(json).unwrap(),
            serde_json::json!({"refDistance": 2.0})
        );
    }

    #[test]
    fn loop_keyword() {
        let s: AudioSourceJson = serde_json::from_str(r#"{"loop":true,"audio":0}"#).unwrap();
        let s = s.resolve(None);
        assert!(s.looping);
        assert!(!s.auto_play);
    }
}
