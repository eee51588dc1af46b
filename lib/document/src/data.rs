use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extension blocks attached to a glTF object, keyed by extension name.
pub type Extensions = Map<String, Value>;

/// Index of a node within [`Document::nodes`].
pub type NodeIndex = usize;
/// Index of a mesh within [`Document::meshes`].
pub type MeshIndex = usize;
/// Index of a scene within [`Document::scenes`].
pub type SceneIndex = usize;

fn is_empty_map(map: &Extensions) -> bool {
    map.is_empty()
}

/// A glTF asset.
///
/// See also: [glTF 2.0 Spec](https://registry.khronos.org/glTF/specs/2.0/glTF-2.0.html#gltf-basics)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub asset: Asset,
    /// If extant, the index of the default scene
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<SceneIndex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<Mesh>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_required: Vec<String>,
    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub extensions: Extensions,
    /// Everything else (accessors, buffers, materials, ...), untouched.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_owned(),
            generator: None,
            min_version: None,
            other: Map::new(),
        }
    }
}

/// A set of root nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeIndex>,
    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub extensions: Extensions,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// An object within a scene hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshIndex>,
    /// (x, y, z); right-handed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f32; 3]>,
    /// unit quaternion, (x, y, z, w)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub extensions: Extensions,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Mesh data. Primitives are carried as raw JSON; resolving them is the host's business.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub extensions: Extensions,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Node {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl Document {
    /// The parent of each node, indexed by node.
    ///
    /// # Errors
    ///
    /// * [`ChildOutOfRange`](crate::DocumentError::ChildOutOfRange) if any node lists a child
    ///   outside of `self.nodes`.
    pub fn parents(&self) -> Result<Vec<Option<NodeIndex>>, crate::DocumentError> {
        let count = self.nodes.len();
        let mut res = vec![None; count];
        for (node, n) in self.nodes.iter().enumerate() {
            for &child in &n.children {
                if child >= count {
                    return Err(crate::DocumentError::ChildOutOfRange { node, child, count });
                }
                res[child] = Some(node);
            }
        }
        Ok(res)
    }

    /// The largest valid node index, if there are any nodes at all.
    #[inline]
    pub fn max_node_index(&self) -> Option<NodeIndex> {
        self.nodes.len().checked_sub(1)
    }

    /// Every extension name present on the document, a scene, a node, or a mesh, in order of
    /// first appearance.
    pub fn extension_names(&self) -> Vec<String> {
        let mut res: Vec<String> = Vec::new();
        let maps = std::iter::once(&self.extensions)
            .chain(self.scenes.iter().map(|s| &s.extensions))
            .chain(self.nodes.iter().map(|n| &n.extensions))
            .chain(self.meshes.iter().map(|m| &m.extensions));
        for map in maps {
            for name in map.keys() {
                if !res.iter().any(|n| n == name) {
                    res.push(name.clone());
                }
            }
        }
        res
    }

    /// Add `name` to `extensionsUsed`, if it isn't there already.
    pub fn mark_used(&mut self, name: &str) {
        if !self.extensions_used.iter().any(|n| n == name) {
            self.extensions_used.push(name.to_owned());
        }
    }

    /// Remove `name` from `extensionsUsed` & `extensionsRequired`.
    pub fn unmark_used(&mut self, name: &str) {
        self.extensions_used.retain(|n| n != name);
        self.extensions_required.retain(|n| n != name);
    }
}
