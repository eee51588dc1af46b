use std::{any::Any, collections::HashMap};

use omi_document::{MeshIndex, NodeIndex};

use crate::{
    context::SideChannel,
    convert::CoordinateSpace,
    diagnostics::{Diagnostic, Diagnostics},
    host::HostScene,
    settings::Settings,
    Error, Result, Validation,
};

/// State of a single import pass.
pub struct ImportContext<'p, H: HostScene> {
    host: &'p mut H,
    settings: &'p Settings,
    nodes: HashMap<NodeIndex, H::Object>,
    meshes: HashMap<MeshIndex, H::Mesh>,
    node_count: usize,
    side: SideChannel,
    diagnostics: Diagnostics,
}

impl<'p, H: HostScene> ImportContext<'p, H> {
    pub fn new(host: &'p mut H, settings: &'p Settings) -> Self {
        Self {
            host,
            settings,
            nodes: HashMap::new(),
            meshes: HashMap::new(),
            node_count: 0,
            side: SideChannel::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    #[inline]
    pub fn settings(&self) -> &'p Settings {
        self.settings
    }

    #[inline]
    pub fn space(&self) -> CoordinateSpace {
        CoordinateSpace::new(
            self.settings.host.handedness,
            self.settings.host.angle_unit,
        )
    }

    #[inline]
    pub fn host(&self) -> &H {
        &*self.host
    }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut *self.host
    }

    /// Record the host object created for document node `index`.
    ///
    /// # Errors
    /// * [Error::InvalidArgument] if `index` already has an object; each node produces exactly one
    pub fn register_node(&mut self, index: NodeIndex, object: H::Object) -> Result<()> {
        if self.nodes.contains_key(&index) {
            return Err(Error::InvalidArgument(format!(
                "node {index} is already registered"
            )));
        }
        self.nodes.insert(index, object);
        self.node_count = self.node_count.max(index + 1);
        Ok(())
    }

    #[inline]
    pub fn host_object(&self, index: NodeIndex) -> Option<H::Object> {
        self.nodes.get(&index).copied()
    }

    /// Like [host_object](Self::host_object), for indices read straight from a record.
    ///
    /// # Errors
    /// * [Error::MissingNodeReference] if `index` is negative or has no object
    pub fn resolve_node(&self, index: i64) -> Result<H::Object> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.host_object(i))
            .ok_or(Error::MissingNodeReference(index))
    }

    /// One past the largest registered node index.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// # Errors
    /// * [Error::InvalidArgument] if `index` already has a mesh
    pub fn register_mesh(&mut self, index: MeshIndex, mesh: H::Mesh) -> Result<()> {
        if self.meshes.contains_key(&index) {
            return Err(Error::InvalidArgument(format!(
                "mesh {index} is already registered"
            )));
        }
        self.meshes.insert(index, mesh);
        Ok(())
    }

    #[inline]
    pub fn mesh(&self, index: MeshIndex) -> Option<H::Mesh> {
        self.meshes.get(&index).copied()
    }

    /// # Errors
    /// * [Error::MissingMeshReference] if `index` is negative or has no mesh
    pub fn resolve_mesh(&self, index: i64) -> Result<H::Mesh> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.mesh(i))
            .ok_or(Error::MissingMeshReference(index))
    }

    /// See [SideChannel::get_or_create].
    pub fn get_or_create_side_data<T: Any + Send + Default>(&mut self, key: &str) -> Result<&mut T> {
        self.side.get_or_create(key)
    }

    /// See [SideChannel::try_get].
    pub fn try_get_side_data<T: Any>(&self, key: &str) -> Option<&T> {
        self.side.try_get(key)
    }

    #[inline]
    pub fn side(&mut self) -> &mut SideChannel {
        &mut self.side
    }

    #[inline]
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Pass or fail a record on its validation result, reporting any warnings it carries.
    ///
    /// # Errors
    /// * [Error::ValidationFailed] if `validation` has errors (or warnings, when those are
    ///   treated as errors)
    pub fn accept(
        &mut self,
        validation: Validation,
        extension: &str,
        node: Option<usize>,
    ) -> Result<()> {
        let warnings = validation.into_result(&self.settings.validation)?;
        self.diagnostics.push_warnings(extension, node, &warnings);
        Ok(())
    }

    #[inline]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (HashMap<NodeIndex, H::Object>, Diagnostics) {
        (self.nodes, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryScene;

    #[test]
    fn node_keys_are_unique() {
        let mut host = MemoryScene::new();
        let a = host.add_object("a");
        let b = host.add_object("b");
        let settings = Settings::default();
        let mut ctx = ImportContext::new(&mut host, &settings);
        ctx.register_node(3, a).unwrap();
        assert!(matches!(
            ctx.register_node(3, b),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(ctx.host_object(3), Some(a));
        assert_eq!(ctx.node_count(), 4);
    }

    #[test]
    fn unresolved_meshes() {
        let mut host = MemoryScene::new();
        let m = host.add_mesh(0);
        let settings = Settings::default();
        let mut ctx = ImportContext::new(&mut host, &settings);
        ctx.register_mesh(0, m).unwrap();
        assert_eq!(ctx.resolve_mesh(0).unwrap(), m);
        assert!(matches!(
            ctx.resolve_mesh(-1),
            Err(Error::MissingMeshReference(-1))
        ));
        assert!(matches!(
            ctx.resolve_mesh(1),
            Err(Error::MissingMeshReference(1))
        ));
    }
}
