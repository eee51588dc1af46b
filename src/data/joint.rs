use omi_common::Defaulted;
use serde::{Deserialize, Serialize};

use crate::{data::index, Error, Result};

/// Document-level `OMI_physics_joint` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointDocumentJson {
    #[serde(default)]
    pub physics_joints: Vec<JointSettings>,
}

/// A reusable set of joint constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointSettings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub limits: Vec<JointLimit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drives: Vec<JointDrive>,
}

/// Constrains motion along (or around) the listed axes to `[min, max]`.
///
/// A missing bound leaves that side free; with both missing the axes are locked at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointLimit {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linear_axes: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub angular_axes: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    /// Absent means the limit is rigid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub damping: Defaulted<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveType {
    Linear,
    Angular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveMode {
    Force,
    Acceleration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointDrive {
    #[serde(rename = "type")]
    pub kind: DriveType,
    pub mode: DriveMode,
    pub axis: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_force: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_target: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_target: Option<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub stiffness: Defaulted<f32>,
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub damping: Defaulted<f32>,
}

/// Node-level `OMI_physics_joint` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointJson {
    pub connected_node: i64,
    pub joint: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub enable_collision: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointRecord {
    pub connected_node: usize,
    /// Index into the document `physicsJoints` array.
    pub settings: usize,
    pub enable_collision: bool,
}

impl JointJson {
    /// Bounds are checked separately; see [validate_joint](crate::validate::validate_joint).
    ///
    /// # Errors
    /// * [Error::MissingNodeReference] if `connectedNode` is negative
    /// * [Error::InvalidArgument] if `joint` is negative
    pub fn resolve(&self) -> Result<JointRecord> {
        Ok(JointRecord {
            connected_node: index(self.connected_node, Error::MissingNodeReference)?,
            settings: index(self.joint, |i| {
                Error::InvalidArgument(format!("joint settings index {i} is negative"))
            })?,
            enable_collision: self.enable_collision,
        })
    }
}

impl From<&JointRecord> for JointJson {
    fn from(r: &JointRecord) -> Self {
        Self {
            connected_node: r.connected_node as i64,
            joint: r.settings as i64,
            enable_collision: r.enable_collision,
        }
    }
}

impl JointSettings {
    /// Content key under which equal settings are deduplicated on export.
    pub fn canonical_key(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_document() {
        let doc: JointDocumentJson = serde_json::from_str(
            r#"{"physicsJoints":[{"limits":[{"linearAxes":[0,1,2]},{"angularAxes":[0],"min":-1,"max":1}],
                "drives":[{"type":"angular","mode":"force","axis":0,"velocityTarget":2.0,"damping":0.5}]}]}"#,
        )
        .unwrap();
        let settings = &doc.physics_joints[0];
        assert_eq!(settings.limits.len(), 2);
        assert_eq!(settings.limits[0].linear_axes, [0, 1, 2]);
        assert!(settings.limits[0].damping.is_default());
        assert_eq!(settings.drives[0].kind, DriveType::Angular);
        assert_eq!(settings.drives[0].damping, Defaulted::Specified(0.5));
    }

    #[test]
    fn enable_collision_defaults_off() {
        let j: JointJson = serde_json::from_str(r#"{"connectedNode":3,"joint":0}"#).unwrap();
        assert_eq!(
            j.resolve().unwrap(),
            JointRecord {
                connected_node: 3,
                settings: 0,
                enable_collision: false
            }
        );
        assert_eq!(
            serde_json::to_string(&j).unwrap(),
            r#"{"connectedNode":3,"joint":0}"#
        );
    }

    #[test]
    fn equal_settings_share_a_key() {
        let a = JointSettings {
            limits: vec![JointLimit {
                angular_axes: vec![1],
                max: Some(0.5),
                ..Default::default()
            }],
            drives: vec![],
        };
        assert_eq!(
            a.canonical_key().unwrap(),
            a.clone().canonical_key().unwrap()
        );
        assert_ne!(
            a.canonical_key().unwrap(),
            JointSettings::default().canonical_key().unwrap()
        );
    }
}
