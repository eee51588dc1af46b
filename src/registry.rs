//! Routing of named extension blocks to handlers.

use std::{collections::HashMap, sync::Arc};

use omi_document::{NodeIndex, SceneIndex};
use serde_json::Value;

use crate::{
    context::{ExportContext, ImportContext},
    host::HostScene,
    Error, Result,
};

/// Handles a document-level extension block.
pub trait DocumentHandler<H: HostScene> {
    fn import_document(&self, block: &Value, ctx: &mut ImportContext<'_, H>) -> Result<()>;
    /// Runs after every node & scene has been exported.
    fn export_document(&self, ctx: &mut ExportContext<'_, H>) -> Result<Option<Value>>;
}

/// Handles a node-level extension block.
pub trait NodeHandler<H: HostScene> {
    fn import_node(
        &self,
        block: &Value,
        node: NodeIndex,
        object: H::Object,
        ctx: &mut ImportContext<'_, H>,
    ) -> Result<()>;
    fn export_node(
        &self,
        object: H::Object,
        node: NodeIndex,
        ctx: &mut ExportContext<'_, H>,
    ) -> Result<Option<Value>>;
}

/// Handles a scene-level extension block.
pub trait SceneHandler<H: HostScene> {
    fn import_scene(
        &self,
        block: &Value,
        scene: SceneIndex,
        ctx: &mut ImportContext<'_, H>,
    ) -> Result<()>;
    fn export_scene(
        &self,
        scene: SceneIndex,
        ctx: &mut ExportContext<'_, H>,
    ) -> Result<Option<Value>>;
}

/// A handler for one extension, exposing whichever levels it operates on.
pub trait ExtensionHandler<H: HostScene>: Send + Sync {
    /// Handlers registered under the same name run in ascending priority order.
    fn priority(&self) -> i32 {
        0
    }

    fn document(&self) -> Option<&dyn DocumentHandler<H>> {
        None
    }

    fn node(&self) -> Option<&dyn NodeHandler<H>> {
        None
    }

    fn scene(&self) -> Option<&dyn SceneHandler<H>> {
        None
    }
}

/// Maps extension names to handlers.
///
/// Registration must be complete before any pass starts; during a pass the registry is only
/// read, and may be shared by passes running on other threads.
pub struct Registry<H: HostScene> {
    handlers: HashMap<String, Vec<Arc<dyn ExtensionHandler<H>>>>,
}

impl<H: HostScene> Clone for Registry<H> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<H: HostScene> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostScene> std::fmt::Debug for Registry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.handlers.iter().map(|(k, v)| (k, v.len())))
            .finish()
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "extension name must not be empty".to_owned(),
        ));
    }
    Ok(())
}

impl<H: HostScene> Registry<H> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with a handler for every built-in extension.
    pub fn with_builtin() -> Self {
        let mut res = Self::new();
        crate::handlers::register_builtin(&mut res);
        res
    }

    /// Make `handler` the only handler for `name`, replacing any previous registration.
    ///
    /// # Errors
    /// * [Error::InvalidArgument] if `name` is empty; the registry is left unchanged
    pub fn register(&mut self, name: &str, handler: Arc<dyn ExtensionHandler<H>>) -> Result<()> {
        check_name(name)?;
        if self
            .handlers
            .insert(name.to_owned(), vec![handler])
            .is_some()
        {
            tracing::debug!(extension = name, "replaced extension handler");
        }
        Ok(())
    }

    /// Add `handler` alongside any existing handlers for `name`; all of them receive the
    /// extension's blocks on import.
    ///
    /// # Errors
    /// * [Error::InvalidArgument] if `name` is empty; the registry is left unchanged
    pub fn register_broadcast(
        &mut self,
        name: &str,
        handler: Arc<dyn ExtensionHandler<H>>,
    ) -> Result<()> {
        check_name(name)?;
        self.handlers
            .entry(name.to_owned())
            .or_default()
            .push(handler);
        Ok(())
    }

    /// Remove every handler for `name`. Returns whether there were any.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.handlers.remove(name).is_some()
    }

    /// Handlers for `name`, by ascending priority; equal priorities keep registration order.
    pub fn handlers_for(&self, name: &str) -> Vec<Arc<dyn ExtensionHandler<H>>> {
        let mut res = self.handlers.get(name).cloned().unwrap_or_default();
        // stable
        res.sort_by_key(|h| h.priority());
        res
    }

    #[inline]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.get(name).map_or(false, |h| !h.is_empty())
    }

    /// Every registered extension name, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut res: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        res.sort_unstable();
        res
    }
}
