use std::{
    any::{type_name, Any},
    collections::HashMap,
};

use omi_document::{MeshIndex, NodeIndex};

use crate::{
    context::SideChannel,
    convert::CoordinateSpace,
    diagnostics::{Diagnostic, Diagnostics},
    host::HostScene,
    settings::Settings,
    Error, Result, Validation,
};

/// Content-addressed accumulator for one kind of exported record.
struct DedupTable {
    keys: HashMap<String, usize>,
    /// `Vec<T>`, in index order
    records: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl DedupTable {
    fn new<T: Any + Send>() -> Self {
        Self {
            keys: HashMap::new(),
            records: Box::new(Vec::<T>::new()),
            type_name: type_name::<Vec<T>>(),
        }
    }

    fn records_mut<T: Any>(&mut self, kind: &str) -> Result<&mut Vec<T>> {
        let found = self.type_name;
        self.records
            .downcast_mut::<Vec<T>>()
            .ok_or_else(|| Error::SideDataType {
                key: kind.to_owned(),
                expected: type_name::<Vec<T>>(),
                found,
            })
    }
}

/// State of a single export pass.
///
/// The deduplication tables are the only state shared between node visits. Passes run
/// sequentially, so they need no locking; they're dropped with the context.
pub struct ExportContext<'p, H: HostScene> {
    host: &'p H,
    settings: &'p Settings,
    objects: HashMap<H::Object, NodeIndex>,
    meshes: HashMap<H::Mesh, MeshIndex>,
    side: SideChannel,
    dedup: HashMap<String, DedupTable>,
    diagnostics: Diagnostics,
}

impl<'p, H: HostScene> ExportContext<'p, H> {
    pub fn new(host: &'p H, settings: &'p Settings) -> Self {
        Self {
            host,
            settings,
            objects: HashMap::new(),
            meshes: HashMap::new(),
            side: SideChannel::new(),
            dedup: HashMap::new(),
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
    pub fn host(&self) -> &'p H {
        self.host
    }

    /// # Errors
    /// * [Error::InvalidArgument] if `object` is already mapped to a node
    pub fn register_object(&mut self, object: H::Object, index: NodeIndex) -> Result<()> {
        if let Some(prev) = self.objects.get(&object) {
            return Err(Error::InvalidArgument(format!(
                "{object:?} is already exported as node {prev}"
            )));
        }
        self.objects.insert(object, index);
        Ok(())
    }

    #[inline]
    pub fn node_index(&self, object: H::Object) -> Option<NodeIndex> {
        self.objects.get(&object).copied()
    }

    /// # Errors
    /// * [Error::InvalidArgument] if `mesh` is already mapped to an index
    pub fn register_mesh(&mut self, mesh: H::Mesh, index: MeshIndex) -> Result<()> {
        if let Some(prev) = self.meshes.get(&mesh) {
            return Err(Error::InvalidArgument(format!(
                "{mesh:?} is already exported as mesh {prev}"
            )));
        }
        self.meshes.insert(mesh, index);
        Ok(())
    }

    #[inline]
    pub fn mesh_index(&self, mesh: H::Mesh) -> Option<MeshIndex> {
        self.meshes.get(&mesh).copied()
    }

    /// The export index of the record of `kind` whose content key is `key`.
    ///
    /// The first time a key is seen in this pass, `build` materializes the record, which is
    /// appended to the `kind` accumulator under the next index; later calls with an equal key
    /// return that same index without calling `build`.
    ///
    /// # Errors
    /// * [Error::SideDataType] if `kind` already accumulates records of another type
    /// * anything returned by `build`
    pub fn get_or_register_index<T: Any + Send>(
        &mut self,
        kind: &str,
        key: String,
        build: impl FnOnce() -> Result<T>,
    ) -> Result<usize> {
        let table = self
            .dedup
            .entry(kind.to_owned())
            .or_insert_with(DedupTable::new::<T>);
        let existing = table.keys.get(&key).copied();
        let records = table.records_mut::<T>(kind)?;
        if let Some(index) = existing {
            return Ok(index);
        }
        let index = records.len();
        records.push(build()?);
        tracing::trace!(kind, key = key.as_str(), index, "registered export record");
        table.keys.insert(key, index);
        Ok(index)
    }

    /// Records accumulated so far for `kind`.
    pub fn records<T: Any>(&self, kind: &str) -> &[T] {
        self.dedup
            .get(kind)
            .and_then(|t| t.records.downcast_ref::<Vec<T>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remove the `kind` accumulator, returning its records in index order.
    ///
    /// # Errors
    /// * [Error::SideDataType] if `kind` accumulates records of another type
    pub fn take_records<T: Any>(&mut self, kind: &str) -> Result<Vec<T>> {
        match self.dedup.get_mut(kind) {
            None => Ok(Vec::new()),
            Some(table) => {
                let res = std::mem::take(table.records_mut::<T>(kind)?);
                self.dedup.remove(kind);
                Ok(res)
            }
        }
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

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryScene;

    #[test]
    fn equal_keys_share_an_index() {
        let host = MemoryScene::new();
        let settings = Settings::default();
        let mut ctx = ExportContext::new(&host, &settings);
        let mut builds = 0;
        let mut register = |ctx: &mut ExportContext<MemoryScene>, key: &str| {
            ctx.get_or_register_index("shape", key.to_owned(), || {
                builds += 1;
                Ok(key.to_owned())
            })
            .unwrap()
        };
        assert_eq!(register(&mut ctx, "sphere:1"), 0);
        assert_eq!(register(&mut ctx, "box:1:1:1"), 1);
        assert_eq!(register(&mut ctx, "sphere:1"), 0);
        assert_eq!(builds, 2);
        assert_eq!(ctx.records::<String>("shape"), ["sphere:1", "box:1:1:1"]);
        assert_eq!(ctx.take_records::<String>("shape").unwrap().len(), 2);
        assert!(ctx.records::<String>("shape").is_empty());
    }

    #[test]
    fn kinds_are_typed() {
        let host = MemoryScene::new();
        let settings = Settings::default();
        let mut ctx = ExportContext::new(&host, &settings);
        ctx.get_or_register_index("a", "k".into(), || Ok(1u32))
            .unwrap();
        assert!(matches!(
            ctx.get_or_register_index("a", "k".into(), || Ok("x")),
            Err(Error::SideDataType { .. })
        ));
        assert!(ctx.take_records::<String>("a").is_err());
        assert_eq!(ctx.take_records::<u32>("a").unwrap(), [1]);
    }

    #[test]
    fn failed_builds_register_nothing() {
        let host = MemoryScene::new();
        let settings = Settings::default();
        let mut ctx = ExportContext::new(&host, &settings);
        assert!(ctx
            .get_or_register_index::<u32>("a", "k".into(), || Err(Error::Cancelled))
            .is_err());
        assert_eq!(ctx.get_or_register_index("a", "k".into(), || Ok(7u32)).unwrap(), 0);
    }
}
