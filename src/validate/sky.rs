use crate::{
    data::{SkyJson, SkyType},
    validate::{check_non_negative, warn_outside, Validation},
};

pub fn validate_sky(sky: &SkyJson) -> Validation {
    let mut v = Validation::new();
    let payloads = [
        (SkyType::Plain, sky.plain.is_some()),
        (SkyType::Gradient, sky.gradient.is_some()),
        (SkyType::Panorama, sky.panorama.is_some()),
        (SkyType::Physical, sky.physical.is_some()),
    ];
    for (ty, _) in payloads.iter().filter(|(ty, present)| *present && *ty != sky.kind) {
        v.push_error(format!("{:?} sky carries a {ty:?} payload", sky.kind));
    }
    if sky.kind == SkyType::Panorama {
        let sources = sky
            .panorama
            .map_or(0, |p| p.cubemap.is_some() as u8 + p.equirectangular.is_some() as u8);
        if sources != 1 {
            v.push_error("panorama must specify exactly one of cubemap or equirectangular");
        }
    }
    let resolved = sky.resolve();
    for (field, color) in resolved.colors() {
        for c in color {
            check_non_negative(&mut v, field, c);
        }
        if color.iter().any(|c| *c > 1.0) {
            v.push_warning(format!("{field} {color:?} is outside [0, 1] (HDR)"));
        }
    }
    if let crate::data::Sky::Physical {
        rayleigh_coefficient,
        mie_coefficient,
        mie_eccentricity,
        ..
    } = resolved
    {
        check_non_negative(&mut v, "rayleighCoefficient", rayleigh_coefficient);
        check_non_negative(&mut v, "mieCoefficient", mie_coefficient);
        warn_outside(&mut v, "mieEccentricity", mie_eccentricity, -1.0, 1.0);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sky(json: &str) -> Validation {
        validate_sky(&serde_json::from_str(json).unwrap())
    }

    #[test]
    fn panorama_needs_one_source() {
        assert!(sky(r#"{"type":"panorama","panorama":{"equirectangular":0}}"#).is_valid());
        assert!(!sky(r#"{"type":"panorama","panorama":{}}"#).is_valid());
        assert!(!sky(
            r#"{"type":"panorama","panorama":{"equirectangular":0,"cubemap":[0,1,2,3,4,5]}}"#
        )
        .is_valid());
    }

    #[test]
    fn hdr_colors_warn() {
        let v = sky(r#"{"type":"plain","plain":{"color":[2,0,0]}}"#);
        assert!(v.is_valid());
        assert_eq!(v.warnings().len(), 1);
    }
}
