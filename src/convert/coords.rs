use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// How a host's coordinate system relates to glTF's (right-handed, +Y up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    #[default]
    RightHanded,
    /// Left-handed, mirrored across the YZ plane.
    FlipX,
    /// Left-handed, mirrored across the XY plane.
    FlipZ,
}

impl Handedness {
    /// The mirrored axis, if any.
    #[inline]
    fn axis(self) -> Option<usize> {
        match self {
            Self::RightHanded => None,
            Self::FlipX => Some(0),
            Self::FlipZ => Some(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnit {
    /// Factor converting radians to this unit.
    #[inline]
    pub fn per_radian(self) -> f32 {
        match self {
            Self::Radians => 1.0,
            Self::Degrees => 180.0 / std::f32::consts::PI,
        }
    }
}

/// Maps quantities between glTF space & host space.
///
/// Every mirroring operation is its own inverse, so the same functions serve both directions;
/// only unit conversion differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoordinateSpace {
    pub handedness: Handedness,
    pub angle_unit: AngleUnit,
}

impl CoordinateSpace {
    pub fn new(handedness: Handedness, angle_unit: AngleUnit) -> Self {
        Self {
            handedness,
            angle_unit,
        }
    }

    /// Positions, translations and linear velocities.
    pub fn point(&self, mut v: Vector3<f32>) -> Vector3<f32> {
        if let Some(axis) = self.handedness.axis() {
            v[axis] = -v[axis];
        }
        v
    }

    /// Axial vectors (angular velocity, torque); under a mirror these keep the mirrored component
    /// and negate the other two.
    pub fn axial(&self, mut v: Vector3<f32>) -> Vector3<f32> {
        if let Some(axis) = self.handedness.axis() {
            for i in (0..3).filter(|i| *i != axis) {
                v[i] = -v[i];
            }
        }
        v
    }

    pub fn rotation(&self, q: UnitQuaternion<f32>) -> UnitQuaternion<f32> {
        match self.handedness.axis() {
            None => q,
            Some(axis) => {
                let mut imag = q.imag();
                for i in (0..3).filter(|i| *i != axis) {
                    imag[i] = -imag[i];
                }
                UnitQuaternion::new_unchecked(Quaternion::from_parts(q.scalar(), imag))
            }
        }
    }

    /// glTF angular velocity (rad/s) to host angular velocity.
    pub fn angular_velocity_to_host(&self, v: Vector3<f32>) -> Vector3<f32> {
        self.axial(v) * self.angle_unit.per_radian()
    }

    pub fn angular_velocity_from_host(&self, v: Vector3<f32>) -> Vector3<f32> {
        self.axial(v) / self.angle_unit.per_radian()
    }
}
