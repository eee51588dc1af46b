use std::{fmt, str::FromStr};

use nalgebra::Vector3;
use omi_common::{canonical_key, Defaulted};
use serde::{Deserialize, Serialize};

use crate::Error;

pub const DEFAULT_BOX_SIZE: [f32; 3] = [1.0, 1.0, 1.0];
pub const DEFAULT_SPHERE_RADIUS: f32 = 0.5;
pub const DEFAULT_CAPSULE_HEIGHT: f32 = 1.0;
pub const DEFAULT_CAPSULE_RADIUS: f32 = 0.5;
pub const DEFAULT_CYLINDER_HEIGHT: f32 = 2.0;
pub const DEFAULT_CYLINDER_RADIUS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Box,
    Sphere,
    Capsule,
    Cylinder,
    Convex,
    Trimesh,
}

impl ShapeType {
    pub const ALL: [ShapeType; 6] = [
        Self::Box,
        Self::Sphere,
        Self::Capsule,
        Self::Cylinder,
        Self::Convex,
        Self::Trimesh,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Sphere => "sphere",
            Self::Capsule => "capsule",
            Self::Cylinder => "cylinder",
            Self::Convex => "convex",
            Self::Trimesh => "trimesh",
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnsupportedShapeType(s.to_owned()))
    }
}

/// Document-level `OMI_physics_shape` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeDocumentJson {
    #[serde(default)]
    pub shapes: Vec<ShapeJson>,
}

/// One entry of the document shape array.
///
/// The variant payload normally lives in a sub-object named after the type (`{"type": "box",
/// "box": {"size": [..]}}`); payload fields written inline next to `type` are accepted too when
/// that sub-object is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeJson {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "box", skip_serializing_if = "Option::is_none")]
    pub box_: Option<BoxJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sphere: Option<SphereJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capsule: Option<TaperedJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cylinder: Option<TaperedJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convex: Option<MeshRefJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trimesh: Option<MeshRefJson>,
    #[serde(flatten)]
    pub inline: InlineShapeJson,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxJson {
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub size: Defaulted<[f32; 3]>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SphereJson {
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub radius: Defaulted<f32>,
}

/// Payload of capsules & cylinders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaperedJson {
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub height: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub radius_top: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub radius_bottom: Defaulted<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshRefJson {
    #[serde(default = "missing_index")]
    pub mesh: i64,
}

fn missing_index() -> i64 {
    -1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineShapeJson {
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub size: Defaulted<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub radius: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub height: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub radius_top: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub radius_bottom: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub mesh: Defaulted<i64>,
}

impl InlineShapeJson {
    fn tapered(&self) -> TaperedJson {
        TaperedJson {
            height: self.height,
            radius_top: self.radius_top,
            radius_bottom: self.radius_bottom,
        }
    }
}

/// A shape with possibly differing top & bottom radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tapered {
    /// For capsules, the length of the cylindrical section, excluding the caps.
    pub height: f32,
    pub radius_top: f32,
    pub radius_bottom: f32,
}

impl Tapered {
    #[inline]
    pub fn new(height: f32, radius: f32) -> Self {
        Self {
            height,
            radius_top: radius,
            radius_bottom: radius,
        }
    }

    #[inline]
    pub fn is_symmetric(&self) -> bool {
        self.radius_top == self.radius_bottom
    }

    fn resolve(json: TaperedJson, height: f32, radius: f32) -> Self {
        Self {
            height: json.height.resolve(height),
            radius_top: json.radius_top.resolve(radius),
            radius_bottom: json.radius_bottom.resolve(radius),
        }
    }
}

impl From<Tapered> for TaperedJson {
    fn from(t: Tapered) -> Self {
        Self {
            height: t.height.into(),
            radius_top: t.radius_top.into(),
            radius_bottom: t.radius_bottom.into(),
        }
    }
}

/// A resolved physics shape; all defaults have been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeRecord {
    Box { size: Vector3<f32> },
    Sphere { radius: f32 },
    Capsule(Tapered),
    Cylinder(Tapered),
    Convex { mesh: i64 },
    Trimesh { mesh: i64 },
}

impl ShapeRecord {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Self::Box { .. } => ShapeType::Box,
            Self::Sphere { .. } => ShapeType::Sphere,
            Self::Capsule(_) => ShapeType::Capsule,
            Self::Cylinder(_) => ShapeType::Cylinder,
            Self::Convex { .. } => ShapeType::Convex,
            Self::Trimesh { .. } => ShapeType::Trimesh,
        }
    }

    /// Content key under which equal shapes are deduplicated on export.
    pub fn canonical_key(&self) -> String {
        let ty = self.shape_type().as_str();
        match self {
            Self::Box { size } => canonical_key(ty, size.as_slice()),
            Self::Sphere { radius } => canonical_key(ty, &[*radius]),
            Self::Capsule(t) | Self::Cylinder(t) => {
                canonical_key(ty, &[t.height, t.radius_top, t.radius_bottom])
            }
            Self::Convex { mesh } | Self::Trimesh { mesh } => format!("{ty}:{mesh}"),
        }
    }
}

impl ShapeJson {
    /// Resolve this entry into a [ShapeRecord], applying the documented defaults for any
    /// unspecified field.
    ///
    /// # Errors
    /// * [Error::UnsupportedShapeType] if `type` isn't a known shape type
    pub fn resolve(&self) -> Result<ShapeRecord, Error> {
        let inline = &self.inline;
        Ok(match self.kind.parse::<ShapeType>()? {
            ShapeType::Box => {
                let size = self.box_.map_or(inline.size, |b| b.size);
                ShapeRecord::Box {
                    size: size.resolve(DEFAULT_BOX_SIZE).into(),
                }
            }
            ShapeType::Sphere => {
                let radius = self.sphere.map_or(inline.radius, |s| s.radius);
                ShapeRecord::Sphere {
                    radius: radius.resolve(DEFAULT_SPHERE_RADIUS),
                }
            }
            ShapeType::Capsule => ShapeRecord::Capsule(Tapered::resolve(
                self.capsule.unwrap_or_else(|| inline.tapered()),
                DEFAULT_CAPSULE_HEIGHT,
                DEFAULT_CAPSULE_RADIUS,
            )),
            ShapeType::Cylinder => ShapeRecord::Cylinder(Tapered::resolve(
                self.cylinder.unwrap_or_else(|| inline.tapered()),
                DEFAULT_CYLINDER_HEIGHT,
                DEFAULT_CYLINDER_RADIUS,
            )),
            ShapeType::Convex => ShapeRecord::Convex {
                mesh: self.mesh_ref(self.convex),
            },
            ShapeType::Trimesh => ShapeRecord::Trimesh {
                mesh: self.mesh_ref(self.trimesh),
            },
        })
    }

    fn mesh_ref(&self, nested: Option<MeshRefJson>) -> i64 {
        nested.map_or_else(|| self.inline.mesh.resolve(missing_index()), |m| m.mesh)
    }

    /// Names of the variant sub-objects present on this entry.
    pub fn payloads(&self) -> impl Iterator<Item = ShapeType> + '_ {
        [
            (ShapeType::Box, self.box_.is_some()),
            (ShapeType::Sphere, self.sphere.is_some()),
            (ShapeType::Capsule, self.capsule.is_some()),
            (ShapeType::Cylinder, self.cylinder.is_some()),
            (ShapeType::Convex, self.convex.is_some()),
            (ShapeType::Trimesh, self.trimesh.is_some()),
        ]
        .into_iter()
        .filter_map(|(t, present)| present.then_some(t))
    }
}

impl From<&ShapeRecord> for ShapeJson {
    /// Written in the nested form, with every field explicit.
    fn from(record: &ShapeRecord) -> Self {
        let mut res = ShapeJson {
            kind: record.shape_type().as_str().to_owned(),
            ..Default::default()
        };
        match *record {
            ShapeRecord::Box { size } => {
                res.box_ = Some(BoxJson {
                    size: Defaulted::Specified(size.into()),
                })
            }
            ShapeRecord::Sphere { radius } => {
                res.sphere = Some(SphereJson {
                    radius: radius.into(),
                })
            }
            ShapeRecord::Capsule(t) => res.capsule = Some(t.into()),
            ShapeRecord::Cylinder(t) => res.cylinder = Some(t.into()),
            ShapeRecord::Convex { mesh } => res.convex = Some(MeshRefJson { mesh }),
            ShapeRecord::Trimesh { mesh } => res.trimesh = Some(MeshRefJson { mesh }),
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(json: &str) -> ShapeRecord {
        serde_json::from_str::<ShapeJson>(json)
            .unwrap()
            .resolve()
            .unwrap()
    }

    #[test]
    fn defaults_per_variant() {
        assert_eq!(
            shape(r#"{"type":"box"}"#),
            ShapeRecord::Box {
                size: Vector3::new(1.0, 1.0, 1.0)
            }
        );
        assert_eq!(
            shape(r#"{"type":"sphere","sphere":{}}"#),
            ShapeRecord::Sphere { radius: 0.5 }
        );
        assert_eq!(
            shape(r#"{"type":"capsule"}"#),
            ShapeRecord::Capsule(Tapered::new(1.0, 0.5))
        );
        assert_eq!(
            shape(r#"{"type":"cylinder"}"#),
            ShapeRecord::Cylinder(Tapered::new(2.0, 0.5))
        );
    }

    #[test]
    fn nested_and_inline_payloads() {
        let nested = shape(r#"{"type":"capsule","capsule":{"height":1.0,"radiusTop":0.6}}"#);
        let inline = shape(r#"{"type":"capsule","height":1.0,"radiusTop":0.6}"#);
        assert_eq!(nested, inline);
        assert_eq!(
            nested,
            ShapeRecord::Capsule(Tapered {
                height: 1.0,
                radius_top: 0.6,
                radius_bottom: 0.5
            })
        );
    }

    #[test]
    fn type_is_case_insensitive() {
        assert_eq!(
            shape(r#"{"type":"SPHERE","sphere":{"radius":2}}"#),
            ShapeRecord::Sphere { radius: 2.0 }
        );
    }

    #[test]
    fn unknown_type() {
        let json: ShapeJson = serde_json::from_str(r#"{"type":"torus"}"#).unwrap();
        assert!(matches!(
            json.resolve(),
            Err(Error::UnsupportedShapeType(t)) if t == "torus"
        ));
    }

    #[test]
    fn missing_mesh_is_negative() {
        assert_eq!(
            shape(r#"{"type":"convex","convex":{}}"#),
            ShapeRecord::Convex { mesh: -1 }
        );
        assert_eq!(
            shape(r#"{"type":"trimesh","trimesh":{"mesh":3}}"#),
            ShapeRecord::Trimesh { mesh: 3 }
        );
    }

    #[test]
    fn written_explicitly() {
        let json = ShapeJson::from(&ShapeRecord::Capsule(Tapered::new(1.0, 0.5)));
        assert_eq!(
            serde_json::to_value(&json).unwrap(),
            serde_json::json!({
                "type": "capsule",
                "capsule": {"height": 1.0, "radiusTop": 0.5, "radiusBottom": 0.5}
            })
        );
    }

    #[test]
    fn keys_distinguish_variants() {
        let capsule = ShapeRecord::Capsule(Tapered::new(1.0, 0.5));
        let cylinder = ShapeRecord::Cylinder(Tapered::new(1.0, 0.5));
        assert_eq!(capsule.canonical_key(), "capsule:1:0.5:0.5");
        assert_ne!(capsule.canonical_key(), cylinder.canonical_key());
    }
}
