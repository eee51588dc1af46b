//! Explicit pass configuration. There is no global settings instance: a [Settings] value is
//! handed to each [Importer](crate::Importer) / [Exporter](crate::Exporter) and borrowed by the
//! contexts they create.

use serde::{Deserialize, Serialize};

use crate::convert::{AngleUnit, Handedness};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: HostConventions,
    pub shapes: ShapeSettings,
    pub validation: ValidationSettings,
}

/// How the host scene graph represents space and primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConventions {
    pub handedness: Handedness,
    /// Unit used by the host for angular velocities.
    pub angle_unit: AngleUnit,
    /// Whether host box colliders are sized by full or half extents.
    pub box_extents: BoxExtents,
    /// Whether the host has a cylinder collider primitive.
    pub native_cylinder: bool,
}

impl Default for HostConventions {
    fn default() -> Self {
        Self {
            handedness: Handedness::RightHanded,
            angle_unit: AngleUnit::Radians,
            box_extents: BoxExtents::Full,
            native_cylinder: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxExtents {
    /// `extents` is the full edge length along each axis, as in glTF.
    #[default]
    Full,
    /// `extents` is half the edge length along each axis.
    Half,
}

impl BoxExtents {
    /// Factor applied to a full-size vector to get this convention's extents.
    #[inline]
    pub fn scale(self) -> f32 {
        match self {
            Self::Full => 1.0,
            Self::Half => 0.5,
        }
    }
}

/// How a tapered shape (differing top & bottom radii) collapses onto a single host radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusPolicy {
    #[default]
    Average,
    /// Take the larger radius, so the host shape encloses the original.
    Max,
}

impl RadiusPolicy {
    #[inline]
    pub fn collapse(self, top: f32, bottom: f32) -> f32 {
        match self {
            Self::Average => (top + bottom) / 2.0,
            Self::Max => top.max(bottom),
        }
    }
}

/// What to do with cylinders when the host has no cylinder primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CylinderFallback {
    /// Substitute a capsule of the same height.
    #[default]
    Capsule,
    /// Generate an exact convex mesh collider.
    Mesh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeSettings {
    pub radius_policy: RadiusPolicy,
    pub cylinder_fallback: CylinderFallback,
    /// Number of radial subdivisions in generated cylinder meshes.
    pub cylinder_segments: u32,
}

impl Default for ShapeSettings {
    fn default() -> Self {
        Self {
            radius_policy: RadiusPolicy::Average,
            cylinder_fallback: CylinderFallback::Capsule,
            cylinder_segments: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Reject records that only produced warnings.
    pub warnings_as_errors: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{"host":{"box_extents":"half"},"shapes":{"radius_policy":"max"}}"#)
                .unwrap();
        assert_eq!(s.host.box_extents, BoxExtents::Half);
        assert_eq!(s.host.handedness, Handedness::RightHanded);
        assert_eq!(s.shapes.radius_policy, RadiusPolicy::Max);
        assert_eq!(s.shapes.cylinder_segments, 16);
    }

    #[test]
    fn radius_policies() {
        assert_eq!(RadiusPolicy::Average.collapse(0.6, 0.4), 0.5);
        assert_eq!(RadiusPolicy::Max.collapse(0.6, 0.4), 0.6);
    }
}
