use omi_common::Defaulted;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PLAIN_COLOR: [f32; 3] = [0.0, 0.0, 0.0];
pub const DEFAULT_GRADIENT_TOP: [f32; 3] = [0.385, 0.454, 0.55];
pub const DEFAULT_GRADIENT_HORIZON: [f32; 3] = [0.646, 0.656, 0.67];
pub const DEFAULT_GRADIENT_BOTTOM: [f32; 3] = [0.2, 0.169, 0.133];
pub const DEFAULT_RAYLEIGH_COLOR: [f32; 3] = [0.3, 0.405, 0.6];
pub const DEFAULT_MIE_COLOR: [f32; 3] = [0.69, 0.729, 0.812];
pub const DEFAULT_GROUND_COLOR: [f32; 3] = [0.1, 0.07, 0.034];
pub const DEFAULT_RAYLEIGH_COEFFICIENT: f32 = 2.0;
pub const DEFAULT_MIE_COEFFICIENT: f32 = 0.005;
pub const DEFAULT_MIE_ECCENTRICITY: f32 = 0.8;

/// Document-level `OMI_environment_sky` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkyDocumentJson {
    #[serde(default)]
    pub skies: Vec<SkyJson>,
}

/// Scene-level `OMI_environment_sky` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSkyJson {
    pub sky: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkyType {
    Plain,
    Gradient,
    Panorama,
    Physical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyJson {
    #[serde(rename = "type")]
    pub kind: SkyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain: Option<PlainSkyJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<GradientSkyJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panorama: Option<PanoramaSkyJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical: Option<PhysicalSkyJson>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlainSkyJson {
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub color: Defaulted<[f32; 3]>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientSkyJson {
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub top_color: Defaulted<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub horizon_color: Defaulted<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub bottom_color: Defaulted<[f32; 3]>,
}

/// Texture references; exactly one of the two sources must be given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanoramaSkyJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cubemap: Option<[i64; 6]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equirectangular: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalSkyJson {
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub rayleigh_color: Defaulted<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub rayleigh_coefficient: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub mie_color: Defaulted<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub mie_coefficient: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub mie_eccentricity: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub ground_color: Defaulted<[f32; 3]>,
}

/// A resolved sky, as attached to host scenes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Sky {
    Plain {
        color: [f32; 3],
    },
    #[serde(rename_all = "camelCase")]
    Gradient {
        top_color: [f32; 3],
        horizon_color: [f32; 3],
        bottom_color: [f32; 3],
    },
    Panorama {
        cubemap: Option<[i64; 6]>,
        equirectangular: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Physical {
        rayleigh_color: [f32; 3],
        rayleigh_coefficient: f32,
        mie_color: [f32; 3],
        mie_coefficient: f32,
        mie_eccentricity: f32,
        ground_color: [f32; 3],
    },
}

impl Sky {
    /// Every color this sky carries, for range checks.
    pub fn colors(&self) -> Vec<(&'static str, [f32; 3])> {
        match *self {
            Sky::Plain { color } => vec![("color", color)],
            Sky::Gradient {
                top_color,
                horizon_color,
                bottom_color,
            } => vec![
                ("topColor", top_color),
                ("horizonColor", horizon_color),
                ("bottomColor", bottom_color),
            ],
            Sky::Panorama { .. } => vec![],
            Sky::Physical {
                rayleigh_color,
                mie_color,
                ground_color,
                ..
            } => vec![
                ("rayleighColor", rayleigh_color),
                ("mieColor", mie_color),
                ("groundColor", ground_color),
            ],
        }
    }
}

impl SkyJson {
    pub fn resolve(&self) -> Sky {
        match self.kind {
            SkyType::Plain => {
                let p = self.plain.unwrap_or_default();
                Sky::Plain {
                    color: p.color.resolve(DEFAULT_PLAIN_COLOR),
                }
            }
            SkyType::Gradient => {
                let g = self.gradient.unwrap_or_default();
                Sky::Gradient {
                    top_color: g.top_color.resolve(DEFAULT_GRADIENT_TOP),
                    horizon_color: g.horizon_color.resolve(DEFAULT_GRADIENT_HORIZON),
                    bottom_color: g.bottom_color.resolve(DEFAULT_GRADIENT_BOTTOM),
                }
            }
            SkyType::Panorama => {
                let p = self.panorama.unwrap_or_default();
                Sky::Panorama {
                    cubemap: p.cubemap,
                    equirectangular: p.equirectangular,
                }
            }
            SkyType::Physical => {
                let p = self.physical.unwrap_or_default();
                Sky::Physical {
                    rayleigh_color: p.rayleigh_color.resolve(DEFAULT_RAYLEIGH_COLOR),
                    rayleigh_coefficient: p
                        .rayleigh_coefficient
                        .resolve(DEFAULT_RAYLEIGH_COEFFICIENT),
                    mie_color: p.mie_color.resolve(DEFAULT_MIE_COLOR),
                    mie_coefficient: p.mie_coefficient.resolve(DEFAULT_MIE_COEFFICIENT),
                    mie_eccentricity: p.mie_eccentricity.resolve(DEFAULT_MIE_ECCENTRICITY),
                    ground_color: p.ground_color.resolve(DEFAULT_GROUND_COLOR),
                }
            }
        }
    }
}

impl From<&Sky> for SkyJson {
    fn from(sky: &Sky) -> Self {
        let mut res = SkyJson {
            kind: SkyType::Plain,
            plain: None,
            gradient: None,
            panorama: None,
            physical: None,
        };
        match *sky {
            Sky::Plain { color } => {
                res.plain = Some(PlainSkyJson {
                    color: Defaulted::unless_default(color, &DEFAULT_PLAIN_COLOR),
                })
            }
            Sky::Gradient {
                top_color,
                horizon_color,
                bottom_color,
            } => {
                res.kind = SkyType::Gradient;
                res.gradient = Some(GradientSkyJson {
                    top_color: Defaulted::unless_default(top_color, &DEFAULT_GRADIENT_TOP),
                    horizon_color: Defaulted::unless_default(
                        horizon_color,
                        &DEFAULT_GRADIENT_HORIZON,
                    ),
                    bottom_color: Defaulted::unless_default(bottom_color, &DEFAULT_GRADIENT_BOTTOM),
                })
            }
            Sky::Panorama {
                cubemap,
                equirectangular,
            } => {
                res.kind = SkyType::Panorama;
                res.panorama = Some(PanoramaSkyJson {
                    cubemap,
                    equirectangular,
                })
            }
            Sky::Physical {
                rayleigh_color,
                rayleigh_coefficient,
                mie_color,
                mie_coefficient,
                mie_eccentricity,
                ground_color,
            } => {
                res.kind = SkyType::Physical;
                res.physical = Some(PhysicalSkyJson {
                    rayleigh_color: Defaulted::unless_default(
                        rayleigh_color,
                        &DEFAULT_RAYLEIGH_COLOR,
                    ),
                    rayleigh_coefficient: Defaulted::unless_default(
                        rayleigh_coefficient,
                        &DEFAULT_RAYLEIGH_COEFFICIENT,
                    ),
                    mie_color: Defaulted::unless_default(mie_color, &DEFAULT_MIE_COLOR),
                    mie_coefficient: Defaulted::unless_default(
                        mie_coefficient,
                        &DEFAULT_MIE_COEFFICIENT,
                    ),
                    mie_eccentricity: Defaulted::unless_default(
                        mie_eccentricity,
                        &DEFAULT_MIE_ECCENTRICITY,
                    ),
                    ground_color: Defaulted::unless_default(ground_color, &DEFAULT_GROUND_COLOR),
                })
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_defaults() {
        let s: SkyJson = serde_json::from_str(r#"{"type":"gradient","gradient":{"topColor":[0,0,1]}}"#)
            .unwrap();
        assert_eq!(
            s.resolve(),
            Sky::Gradient {
                top_color: [0.0, 0.0, 1.0],
                horizon_color: DEFAULT_GRADIENT_HORIZON,
                bottom_color: DEFAULT_GRADIENT_BOTTOM,
            }
        );
    }

    #[test]
    fn resolved_skies_write_back_sparsely() {
        let sky = Sky::Physical {
            rayleigh_color: DEFAULT_RAYLEIGH_COLOR,
            rayleigh_coefficient: 3.0,
            mie_color: DEFAULT_MIE_COLOR,
            mie_coefficient: DEFAULT_MIE_COEFFICIENT,
            mie_eccentricity: DEFAULT_MIE_ECCENTRICITY,
            ground_color: DEFAULT_GROUND_COLOR,
        };
        let json = SkyJson::from(&sky);
        assert_eq!(
            serde_json::to_value(&json).unwrap(),
            serde_json::json!({"type": "physical", "physical": {"rayleighCoefficient": 3.0}})
        );
        assert_eq!(json.resolve(), sky);
    }
}
