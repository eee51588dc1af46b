use std::{fmt, str::FromStr};

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use omi_common::Defaulted;
use serde::{Deserialize, Serialize};

use crate::{data::index, Error, Result, Validation};

pub const DEFAULT_MASS: f32 = 1.0;
pub const IDENTITY_ORIENTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Node-level `OMI_physics_body` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<MotionJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collider: Option<ColliderJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<TriggerJson>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionJson {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub mass: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub linear_velocity: Defaulted<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub angular_velocity: Defaulted<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub center_of_mass: Defaulted<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub inertia_diagonal: Defaulted<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub inertia_orientation: Defaulted<[f32; 4]>,
}

/// A solid collider, referencing the document shape array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColliderJson {
    pub shape: i64,
}

/// Either a single non-solid shape, or a compound trigger made of child nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionType {
    Static,
    Kinematic,
    Dynamic,
}

impl MotionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Kinematic => "kinematic",
            Self::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for MotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid motion type: {0}")]
pub struct UnknownMotionType(pub String);

impl FromStr for MotionType {
    type Err = UnknownMotionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Static, Self::Kinematic, Self::Dynamic]
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMotionType(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionRecord {
    pub kind: MotionType,
    pub mass: f32,
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub center_of_mass: Vector3<f32>,
    /// Zero means the host should compute inertia from the colliders.
    pub inertia_diagonal: Vector3<f32>,
    pub inertia_orientation: UnitQuaternion<f32>,
}

impl MotionRecord {
    /// A motion record with every other field at its default.
    pub fn new(kind: MotionType) -> Self {
        Self {
            kind,
            mass: DEFAULT_MASS,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            center_of_mass: Vector3::zeros(),
            inertia_diagonal: Vector3::zeros(),
            inertia_orientation: UnitQuaternion::identity(),
        }
    }

    /// Whether velocity & inertia fields carry meaning for this motion type.
    #[inline]
    pub fn is_simulated(&self) -> bool {
        self.kind == MotionType::Dynamic
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerRecord {
    Shape(usize),
    /// The listed nodes together form the trigger volume.
    Compound(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BodyRecord {
    pub motion: Option<MotionRecord>,
    /// Index into the document shape array of the solid collider.
    pub collider: Option<usize>,
    pub trigger: Option<TriggerRecord>,
}

impl BodyRecord {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.motion.is_none() && self.collider.is_none() && self.trigger.is_none()
    }
}

fn quaternion([x, y, z, w]: [f32; 4]) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z))
}

impl MotionJson {
    /// # Errors
    /// * [Error::ValidationFailed] if the motion type isn't recognized
    pub fn resolve(&self) -> Result<MotionRecord> {
        let kind = self
            .kind
            .parse::<MotionType>()
            .map_err(|e| Error::ValidationFailed(Validation::error(e.to_string())))?;
        let mut res = MotionRecord::new(kind);
        res.mass = self.mass.resolve(DEFAULT_MASS);
        res.center_of_mass = self.center_of_mass.resolve([0.0; 3]).into();
        // non-simulated bodies ignore velocities & inertia, even when present
        if res.is_simulated() {
            res.linear_velocity = self.linear_velocity.resolve([0.0; 3]).into();
            res.angular_velocity = self.angular_velocity.resolve([0.0; 3]).into();
            res.inertia_diagonal = self.inertia_diagonal.resolve([0.0; 3]).into();
            res.inertia_orientation =
                quaternion(self.inertia_orientation.resolve(IDENTITY_ORIENTATION));
        }
        Ok(res)
    }
}

impl From<&MotionRecord> for MotionJson {
    fn from(m: &MotionRecord) -> Self {
        let vector = |v: Vector3<f32>| Defaulted::unless_default(v.into(), &[0.0; 3]);
        let mut res = MotionJson {
            kind: m.kind.as_str().to_owned(),
            mass: Defaulted::unless_default(m.mass, &DEFAULT_MASS),
            center_of_mass: vector(m.center_of_mass),
            ..Default::default()
        };
        if m.kind == MotionType::Static {
            res.mass = Defaulted::Default;
            res.center_of_mass = Defaulted::Default;
        }
        if m.is_simulated() {
            let q = m.inertia_orientation.into_inner().coords;
            res.linear_velocity = vector(m.linear_velocity);
            res.angular_velocity = vector(m.angular_velocity);
            res.inertia_diagonal = vector(m.inertia_diagonal);
            res.inertia_orientation =
                Defaulted::unless_default([q.x, q.y, q.z, q.w], &IDENTITY_ORIENTATION);
        }
        res
    }
}

impl BodyJson {
    /// # Errors
    /// * [Error::ValidationFailed] if the motion type isn't recognized
    /// * [Error::MissingShapeReference] if a shape index is negative
    /// * [Error::MissingNodeReference] if a trigger node index is negative
    pub fn resolve(&self) -> Result<BodyRecord> {
        let motion = self.motion.as_ref().map(MotionJson::resolve).transpose()?;
        let collider = self
            .collider
            .map(|c| index(c.shape, Error::MissingShapeReference))
            .transpose()?;
        let trigger = match &self.trigger {
            None => None,
            Some(TriggerJson {
                shape: Some(shape), ..
            }) => Some(TriggerRecord::Shape(index(
                *shape,
                Error::MissingShapeReference,
            )?)),
            Some(TriggerJson { nodes, .. }) => Some(TriggerRecord::Compound(
                nodes
                    .iter()
                    .flatten()
                    .map(|&n| index(n, Error::MissingNodeReference))
                    .collect::<Result<_>>()?,
            )),
        };
        Ok(BodyRecord {
            motion,
            collider,
            trigger,
        })
    }
}

impl From<&BodyRecord> for BodyJson {
    fn from(b: &BodyRecord) -> Self {
        Self {
            motion: b.motion.as_ref().map(MotionJson::from),
            collider: b.collider.map(|shape| ColliderJson {
                shape: shape as i64,
            }),
            trigger: b.trigger.as_ref().map(|t| match t {
                TriggerRecord::Shape(shape) => TriggerJson {
                    shape: Some(*shape as i64),
                    nodes: None,
                },
                TriggerRecord::Compound(nodes) => TriggerJson {
                    shape: None,
                    nodes: Some(nodes.iter().map(|&n| n as i64).collect()),
                },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> Result<BodyRecord> {
        serde_json::from_str::<BodyJson>(json).unwrap().resolve()
    }

    #[test]
    fn motion_type_is_case_insensitive() {
        assert_eq!("Dynamic".parse::<MotionType>(), Ok(MotionType::Dynamic));
        assert_eq!("KINEMATIC".parse::<MotionType>(), Ok(MotionType::Kinematic));
        assert_eq!(
            "bouncy".parse::<MotionType>().unwrap_err().to_string(),
            "Invalid motion type: bouncy"
        );
    }

    #[test]
    fn unknown_motion_type_fails() {
        match body(r#"{"motion":{"type":"bouncy"}}"#) {
            Err(Error::ValidationFailed(v)) => {
                assert_eq!(v.errors(), ["Invalid motion type: bouncy"])
            }
            other => panic!("expected a validation failure, got {other:?}"),
        }
    }

    #[test]
    fn static_ignores_velocity() {
        let b = body(r#"{"motion":{"type":"static","linearVelocity":[1,2,3]}}"#).unwrap();
        let m = b.motion.unwrap();
        assert_eq!(m.kind, MotionType::Static);
        assert_eq!(m.linear_velocity, Vector3::zeros());
    }

    #[test]
    fn dynamic_defaults() {
        let m = body(r#"{"motion":{"type":"dynamic"}}"#)
            .unwrap()
            .motion
            .unwrap();
        assert_eq!(m, MotionRecord::new(MotionType::Dynamic));
        assert_eq!(m.mass, 1.0);
    }

    #[test]
    fn triggers() {
        assert_eq!(
            body(r#"{"trigger":{"shape":2}}"#).unwrap().trigger,
            Some(TriggerRecord::Shape(2))
        );
        assert_eq!(
            body(r#"{"trigger":{"nodes":[4,5]}}"#).unwrap().trigger,
            Some(TriggerRecord::Compound(vec![4, 5]))
        );
        assert!(matches!(
            body(r#"{"collider":{"shape":-1}}"#),
            Err(Error::MissingShapeReference(-1))
        ));
    }

    #[test]
    fn static_writes_only_type() {
        let json = MotionJson::from(&MotionRecord::new(MotionType::Static));
        assert_eq!(
            serde_json::to_value(&json).unwrap(),
            serde_json::json!({"type": "static"})
        );
    }
}
