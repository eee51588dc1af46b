use std::collections::{BTreeMap, HashMap};

use nalgebra::Point3;
use omi_document::{Mesh, MeshIndex, Node, NodeIndex, SceneIndex};
use serde_json::Value;

use crate::host::{HostCollider, HostJoint, HostRigidBody, HostScene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshId(pub u32);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryObject {
    pub name: Option<String>,
    /// The document node this object was spawned from, if any.
    pub node: Option<NodeIndex>,
    pub parent: Option<ObjectId>,
    pub colliders: Vec<HostCollider<MeshId>>,
    pub body: Option<HostRigidBody>,
    pub compound_trigger: Option<Vec<ObjectId>>,
    pub joints: Vec<HostJoint<ObjectId>>,
    pub metadata: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemoryMesh {
    Loaded {
        index: MeshIndex,
        name: Option<String>,
    },
    Generated {
        vertices: Vec<Point3<f32>>,
        triangles: Vec<[u32; 3]>,
    },
}

/// A scene graph held entirely in memory; the reference [HostScene].
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    objects: Vec<MemoryObject>,
    meshes: Vec<MemoryMesh>,
    scene_metadata: HashMap<SceneIndex, BTreeMap<String, Value>>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object not backed by any document node.
    pub fn add_object(&mut self, name: impl Into<String>) -> ObjectId {
        self.push_object(MemoryObject {
            name: Some(name.into()),
            ..Default::default()
        })
    }

    /// Create a mesh standing in for document mesh `index`.
    pub fn add_mesh(&mut self, index: MeshIndex) -> MeshId {
        self.push_mesh(MemoryMesh::Loaded { index, name: None })
    }

    fn push_object(&mut self, obj: MemoryObject) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(obj);
        id
    }

    fn push_mesh(&mut self, mesh: MemoryMesh) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(mesh);
        id
    }

    #[inline]
    pub fn object(&self, id: ObjectId) -> Option<&MemoryObject> {
        self.objects.get(id.0 as usize)
    }

    #[inline]
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut MemoryObject> {
        self.objects.get_mut(id.0 as usize)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &MemoryObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, o)| (ObjectId(i as u32), o))
    }

    #[inline]
    pub fn mesh(&self, id: MeshId) -> Option<&MemoryMesh> {
        self.meshes.get(id.0 as usize)
    }

    #[inline]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Geometry of a generated mesh; loaded meshes carry none.
    pub fn geometry(&self, id: MeshId) -> Option<(&[Point3<f32>], &[[u32; 3]])> {
        match self.mesh(id)? {
            MemoryMesh::Generated {
                vertices,
                triangles,
            } => Some((vertices.as_slice(), triangles.as_slice())),
            MemoryMesh::Loaded { .. } => None,
        }
    }
}

impl HostScene for MemoryScene {
    type Object = ObjectId;
    type Mesh = MeshId;

    fn spawn_object(&mut self, index: NodeIndex, node: &Node) -> ObjectId {
        self.push_object(MemoryObject {
            name: node.name.clone(),
            node: Some(index),
            ..Default::default()
        })
    }

    fn set_parent(&mut self, child: ObjectId, parent: ObjectId) {
        if let Some(obj) = self.object_mut(child) {
            obj.parent = Some(parent);
        }
    }

    fn load_mesh(&mut self, index: MeshIndex, mesh: &Mesh) -> MeshId {
        self.push_mesh(MemoryMesh::Loaded {
            index,
            name: mesh.name.clone(),
        })
    }

    fn generate_mesh(&mut self, vertices: Vec<Point3<f32>>, triangles: Vec<[u32; 3]>) -> MeshId {
        self.push_mesh(MemoryMesh::Generated {
            vertices,
            triangles,
        })
    }

    fn add_collider(&mut self, object: ObjectId, collider: HostCollider<MeshId>) {
        if let Some(obj) = self.object_mut(object) {
            obj.colliders.push(collider);
        }
    }

    fn colliders(&self, object: ObjectId) -> Vec<HostCollider<MeshId>> {
        self.object(object)
            .map(|o| o.colliders.clone())
            .unwrap_or_default()
    }

    fn set_rigid_body(&mut self, object: ObjectId, body: HostRigidBody) {
        if let Some(obj) = self.object_mut(object) {
            obj.body = Some(body);
        }
    }

    fn rigid_body(&self, object: ObjectId) -> Option<HostRigidBody> {
        self.object(object)?.body
    }

    fn set_compound_trigger(&mut self, object: ObjectId, parts: Vec<ObjectId>) {
        if let Some(obj) = self.object_mut(object) {
            obj.compound_trigger = Some(parts);
        }
    }

    fn compound_trigger(&self, object: ObjectId) -> Option<Vec<ObjectId>> {
        self.object(object)?.compound_trigger.clone()
    }

    fn add_joint(&mut self, object: ObjectId, joint: HostJoint<ObjectId>) {
        if let Some(obj) = self.object_mut(object) {
            obj.joints.push(joint);
        }
    }

    fn joints(&self, object: ObjectId) -> Vec<HostJoint<ObjectId>> {
        self.object(object)
            .map(|o| o.joints.clone())
            .unwrap_or_default()
    }

    fn attach_metadata(&mut self, object: ObjectId, key: &str, value: Value) {
        if let Some(obj) = self.object_mut(object) {
            obj.metadata.insert(key.to_owned(), value);
        }
    }

    fn metadata(&self, object: ObjectId, key: &str) -> Option<Value> {
        self.object(object)?.metadata.get(key).cloned()
    }

    fn attach_scene_metadata(&mut self, scene: SceneIndex, key: &str, value: Value) {
        self.scene_metadata
            .entry(scene)
            .or_default()
            .insert(key.to_owned(), value);
    }

    fn scene_metadata(&self, scene: SceneIndex, key: &str) -> Option<Value> {
        self.scene_metadata.get(&scene)?.get(key).cloned()
    }
}
