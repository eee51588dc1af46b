use std::f32::consts::TAU;

use crate::{
    data::{AudioDocumentJson, AudioEmitterJson, EmitterType, PositionalJson},
    validate::{check_non_negative, check_positive, warn_outside, Validation},
};

pub fn validate_positional(p: &PositionalJson) -> Validation {
    let mut v = Validation::new();
    let p = p.resolve();
    warn_outside(&mut v, "coneInnerAngle", p.cone_inner_angle, 0.0, TAU);
    warn_outside(&mut v, "coneOuterAngle", p.cone_outer_angle, 0.0, TAU);
    if p.cone_inner_angle > p.cone_outer_angle {
        v.push_warning(format!(
            "coneInnerAngle ({}) is wider than coneOuterAngle ({})",
            p.cone_inner_angle, p.cone_outer_angle
        ));
    }
    warn_outside(&mut v, "coneOuterGain", p.cone_outer_gain, 0.0, 1.0);
    check_positive(&mut v, "maxDistance", p.max_distance);
    check_non_negative(&mut v, "refDistance", p.ref_distance);
    check_non_negative(&mut v, "rolloffFactor", p.rolloff_factor);
    v
}

/// `source_count` bounds the emitter's source indices.
pub fn validate_emitter(emitter: &AudioEmitterJson, source_count: usize) -> Validation {
    let mut v = Validation::new();
    check_non_negative(&mut v, "gain", emitter.gain.resolve(1.0));
    for s in &emitter.sources {
        if !usize::try_from(*s).map_or(false, |s| s < source_count) {
            v.push_error(format!("source {s} is out of range"));
        }
    }
    match (emitter.kind, &emitter.positional) {
        (EmitterType::Positional, Some(p)) => v.absorb(validate_positional(p)),
        (EmitterType::Global, Some(_)) => {
            v.push_warning("global emitter has positional properties; they're ignored")
        }
        _ => (),
    }
    v
}

pub fn validate_audio_document(doc: &AudioDocumentJson) -> Validation {
    let mut v = Validation::new();
    for (i, data) in doc.audio.iter().enumerate() {
        if data.uri.is_some() == data.buffer_view.is_some() {
            v.push_error(format!(
                "audio[{i}]: exactly one of uri or bufferView must be given"
            ));
        }
        if data.buffer_view.is_some() && data.mime_type.is_none() {
            v.push_error(format!("audio[{i}]: mimeType is required with bufferView"));
        }
    }
    for (i, source) in doc.sources.iter().enumerate() {
        let mut sv = Validation::new();
        check_non_negative(&mut sv, "gain", source.gain.resolve(1.0));
        if let Some(audio) = source.audio {
            if !usize::try_from(audio).map_or(false, |a| a < doc.audio.len()) {
                sv.push_error(format!("audio {audio} is out of range"));
            }
        }
        v.absorb(sv.with_context(format!("sources[{i}]")));
    }
    for (i, emitter) in doc.emitters.iter().enumerate() {
        v.absorb(validate_emitter(emitter, doc.sources.len()).with_context(format!("emitters[{i}]")));
    }
    v
}
