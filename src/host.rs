//! The interface to the host scene graph which extensions are imported into & exported from.
//!
//! The pipeline only ever calls creation & query primitives on a [HostScene]; object lifetimes
//! belong to the host.

mod memory;
pub mod parry;

pub use memory::*;

use std::{fmt::Debug, hash::Hash};

use nalgebra::{Point3, UnitQuaternion, Vector3};
use omi_document::{MeshIndex, Mesh, Node, NodeIndex, SceneIndex};
use serde_json::Value;

use crate::data::{JointSettings, MotionType};

/// Trait alias for host handle types.
pub trait Handle: Copy + Eq + Hash + Debug + Send + Sync + 'static {}
impl<T> Handle for T where T: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

pub trait HostScene {
    type Object: Handle;
    type Mesh: Handle;

    /// Create the host object for a document node.
    fn spawn_object(&mut self, index: NodeIndex, node: &Node) -> Self::Object;
    fn set_parent(&mut self, child: Self::Object, parent: Self::Object);

    /// Materialize a document mesh.
    fn load_mesh(&mut self, index: MeshIndex, mesh: &Mesh) -> Self::Mesh;
    /// Create a mesh from raw geometry, e.g. a collider approximation.
    fn generate_mesh(&mut self, vertices: Vec<Point3<f32>>, triangles: Vec<[u32; 3]>)
        -> Self::Mesh;

    fn add_collider(&mut self, object: Self::Object, collider: HostCollider<Self::Mesh>);
    fn colliders(&self, object: Self::Object) -> Vec<HostCollider<Self::Mesh>>;

    fn set_rigid_body(&mut self, object: Self::Object, body: HostRigidBody);
    fn rigid_body(&self, object: Self::Object) -> Option<HostRigidBody>;

    /// Mark `object` as a trigger whose volume is made up of the colliders of `parts`.
    fn set_compound_trigger(&mut self, object: Self::Object, parts: Vec<Self::Object>);
    fn compound_trigger(&self, object: Self::Object) -> Option<Vec<Self::Object>>;

    fn add_joint(&mut self, object: Self::Object, joint: HostJoint<Self::Object>);
    fn joints(&self, object: Self::Object) -> Vec<HostJoint<Self::Object>>;

    /// Attach opaque extension data to an object, replacing any previous value under `key`.
    fn attach_metadata(&mut self, object: Self::Object, key: &str, value: Value);
    fn metadata(&self, object: Self::Object, key: &str) -> Option<Value>;

    fn attach_scene_metadata(&mut self, scene: SceneIndex, key: &str, value: Value);
    fn scene_metadata(&self, scene: SceneIndex, key: &str) -> Option<Value>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostColliderKind<M> {
    /// Sized according to the host's [BoxExtents](crate::settings::BoxExtents) convention.
    Box { extents: Vector3<f32> },
    Sphere { radius: f32 },
    /// `height` is the total height, caps included.
    Capsule { radius: f32, height: f32 },
    Cylinder { radius: f32, height: f32 },
    Mesh { mesh: M, convex: bool },
    /// A host primitive with no extension counterpart.
    Other(String),
}

impl<M> HostColliderKind<M> {
    pub fn name(&self) -> &str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Capsule { .. } => "capsule",
            Self::Cylinder { .. } => "cylinder",
            Self::Mesh { convex: true, .. } => "convex mesh",
            Self::Mesh { convex: false, .. } => "mesh",
            Self::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostCollider<M> {
    pub kind: HostColliderKind<M>,
    /// Non-solid; reports overlaps instead of colliding.
    pub is_trigger: bool,
}

impl<M> HostCollider<M> {
    #[inline]
    pub fn solid(kind: HostColliderKind<M>) -> Self {
        Self {
            kind,
            is_trigger: false,
        }
    }

    #[inline]
    pub fn trigger(kind: HostColliderKind<M>) -> Self {
        Self {
            kind,
            is_trigger: true,
        }
    }
}

/// A rigid body, in host space & units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostRigidBody {
    pub motion: MotionType,
    pub mass: f32,
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub center_of_mass: Vector3<f32>,
    /// Principal inertia & its orientation; `None` lets the host derive it from the colliders.
    pub inertia: Option<(Vector3<f32>, UnitQuaternion<f32>)>,
}

impl HostRigidBody {
    pub fn new(motion: MotionType) -> Self {
        Self {
            motion,
            mass: crate::data::DEFAULT_MASS,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            center_of_mass: Vector3::zeros(),
            inertia: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostJoint<O> {
    pub connected: O,
    pub enable_collision: bool,
    pub settings: JointSettings,
}
