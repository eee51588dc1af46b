//! Import & export pass drivers.
//!
//! A pass walks a [Document] once, routing every extension block present on the document, its
//! scenes and its nodes through a [Registry]. Failures of individual handlers are isolated:
//! they are recorded as [Diagnostics] and the pass moves on.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use omi_document::{Document, Extensions, NodeIndex};
use serde_json::Value;

use crate::{
    context::{ExportContext, ImportContext},
    diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity},
    host::HostScene,
    registry::{ExtensionHandler, Registry},
    settings::Settings,
    Error, Result,
};

/// Shared flag for cancelling a pass from another thread.
///
/// Passes check it between node visits; a cancelled pass fails with [Error::Cancelled].
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Outcome of an import pass.
#[derive(Debug)]
pub struct ImportReport<H: HostScene> {
    /// Host object of each document node, indexed by node.
    pub objects: Vec<H::Object>,
    /// Host mesh of each document mesh, indexed by mesh.
    pub meshes: Vec<H::Mesh>,
    pub diagnostics: Diagnostics,
}

/// Outcome of an export pass.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Extensions written anywhere in the document.
    pub extensions_used: Vec<String>,
    pub diagnostics: Diagnostics,
}

/// Turn a handler failure into a diagnostic.
fn isolate(result: Result<()>, extension: &str, node: Option<NodeIndex>) -> Option<Diagnostic> {
    let diag = match result {
        Ok(()) => return None,
        Err(Error::ValidationFailed(v)) => {
            Diagnostic::new(Severity::Error, DiagnosticKind::Validation, v.to_string())
        }
        Err(e) => Diagnostic::skipped(e.to_string()),
    };
    Some(diag.extension(extension).node(node))
}

/// Drives import passes.
pub struct Importer<'r, H: HostScene> {
    registry: &'r Registry<H>,
    settings: Settings,
    cancel: CancelFlag,
}

impl<'r, H: HostScene> Importer<'r, H> {
    pub fn new(registry: &'r Registry<H>, settings: Settings) -> Self {
        Self {
            registry,
            settings,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Materialize `document` in `host` and apply every extension block.
    ///
    /// Meshes & nodes are created first (with their hierarchy), then document, scene and node
    /// extensions are dispatched in that order.
    ///
    /// # Errors
    /// * [Error::Document] if the node hierarchy references nonexistent nodes
    /// * [Error::Cancelled] if the cancel flag was raised
    pub fn import(&self, document: &Document, host: &mut H) -> Result<ImportReport<H>> {
        let parents = document.parents()?;
        let mut ctx = ImportContext::new(host, &self.settings);

        let mut meshes = Vec::with_capacity(document.meshes.len());
        for (i, mesh) in document.meshes.iter().enumerate() {
            let handle = ctx.host_mut().load_mesh(i, mesh);
            ctx.register_mesh(i, handle)?;
            meshes.push(handle);
        }
        let mut objects = Vec::with_capacity(document.nodes.len());
        for (i, node) in document.nodes.iter().enumerate() {
            let object = ctx.host_mut().spawn_object(i, node);
            ctx.register_node(i, object)?;
            objects.push(object);
        }
        for (child, parent) in parents.iter().enumerate() {
            if let Some(parent) = parent {
                ctx.host_mut().set_parent(objects[child], objects[*parent]);
            }
        }
        tracing::debug!(
            meshes = document.meshes.len(),
            nodes = objects.len(),
            "materialized document"
        );

        let mut dispatch = Dispatch::new(self.registry, document);

        for (name, block) in &document.extensions {
            for handler in dispatch.handlers(name, None, |h| h.document().is_some()) {
                if let Some(h) = handler.document() {
                    let res = h.import_document(block, &mut ctx);
                    if let Some(diag) = isolate(res, name, None) {
                        ctx.report(diag);
                    }
                }
            }
        }
        for (i, scene) in document.scenes.iter().enumerate() {
            for (name, block) in &scene.extensions {
                for handler in dispatch.handlers(name, None, |h| h.scene().is_some()) {
                    if let Some(h) = handler.scene() {
                        let res = h.import_scene(block, i, &mut ctx);
                        if let Some(diag) = isolate(res, name, None) {
                            ctx.report(diag);
                        }
                    }
                }
            }
        }
        for (i, node) in document.nodes.iter().enumerate() {
            self.cancel.check()?;
            for (name, block) in &node.extensions {
                for handler in dispatch.handlers(name, Some(i), |h| h.node().is_some()) {
                    if let Some(h) = handler.node() {
                        let res = h.import_node(block, i, objects[i], &mut ctx);
                        if let Some(diag) = isolate(res, name, Some(i)) {
                            ctx.report(diag);
                        }
                    }
                }
            }
        }

        for diag in dispatch.unhandled {
            ctx.report(diag);
        }
        let (_, diagnostics) = ctx.into_parts();
        tracing::info!(
            nodes = objects.len(),
            warnings = diagnostics.count(Severity::Warning),
            errors = diagnostics.count(Severity::Error),
            "import finished"
        );
        Ok(ImportReport {
            objects,
            meshes,
            diagnostics,
        })
    }
}

/// Handler lookup for an import pass, remembering which extensions nothing could handle.
struct Dispatch<'r, 'd, H: HostScene> {
    registry: &'r Registry<H>,
    required: &'d [String],
    seen: HashSet<String>,
    unhandled: Vec<Diagnostic>,
}

impl<'r, 'd, H: HostScene> Dispatch<'r, 'd, H> {
    fn new(registry: &'r Registry<H>, document: &'d Document) -> Self {
        Self {
            registry,
            required: &document.extensions_required,
            seen: HashSet::new(),
            unhandled: Vec::new(),
        }
    }

    fn handlers(
        &mut self,
        name: &str,
        node: Option<NodeIndex>,
        level: impl Fn(&dyn ExtensionHandler<H>) -> bool,
    ) -> Vec<Arc<dyn ExtensionHandler<H>>> {
        let res: Vec<_> = self
            .registry
            .handlers_for(name)
            .into_iter()
            .filter(|h| level(&**h))
            .collect();
        if res.is_empty() && self.seen.insert(name.to_owned()) {
            let severity = if self.required.iter().any(|r| r == name) {
                Severity::Warning
            } else {
                Severity::Info
            };
            self.unhandled.push(
                Diagnostic::new(
                    severity,
                    DiagnosticKind::Unhandled,
                    format!("no handler for {name} at this level; block ignored"),
                )
                .extension(name)
                .node(node),
            );
        }
        res
    }
}

/// Drives export passes.
pub struct Exporter<'r, H: HostScene> {
    registry: &'r Registry<H>,
    settings: Settings,
    cancel: CancelFlag,
}

impl<'r, H: HostScene> Exporter<'r, H> {
    pub fn new(registry: &'r Registry<H>, settings: Settings) -> Self {
        Self {
            registry,
            settings,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Write the extension blocks of `host` into `document`.
    ///
    /// `objects[i]` is the host object of node `i` and `meshes[i]` the host mesh of mesh `i`.
    /// Node extensions are exported first, then scene extensions, then document extensions, so
    /// that document-level accumulators are complete when they're written. Blocks of registered
    /// extensions already present in `document` are replaced.
    ///
    /// # Errors
    /// * [Error::InvalidArgument] if `objects` doesn't have exactly one object per node, or
    ///   `meshes` has more entries than the document has meshes
    /// * [Error::Cancelled] if the cancel flag was raised
    pub fn export(
        &self,
        host: &H,
        objects: &[H::Object],
        meshes: &[H::Mesh],
        document: &mut Document,
    ) -> Result<ExportReport> {
        if objects.len() != document.nodes.len() {
            return Err(Error::InvalidArgument(format!(
                "{} objects given for {} nodes",
                objects.len(),
                document.nodes.len()
            )));
        }
        if meshes.len() > document.meshes.len() {
            return Err(Error::InvalidArgument(format!(
                "{} meshes given for {} document meshes",
                meshes.len(),
                document.meshes.len()
            )));
        }
        let mut ctx = ExportContext::new(host, &self.settings);
        for (i, &object) in objects.iter().enumerate() {
            ctx.register_object(object, i)?;
        }
        for (i, &mesh) in meshes.iter().enumerate() {
            ctx.register_mesh(mesh, i)?;
        }

        let names = self.registry.names();
        let mut used = Vec::new();
        let mut failures = Vec::new();

        for (i, &object) in objects.iter().enumerate() {
            self.cancel.check()?;
            for name in &names {
                let handlers = self.registry.handlers_for(name);
                let block = export_level(
                    handlers.iter().filter_map(|h| h.node()),
                    |h| h.export_node(object, i, &mut ctx),
                    &mut failures,
                );
                report_failures(&mut ctx, &mut failures, name, Some(i));
                write_block(&mut document.nodes[i].extensions, name, block, &mut used);
            }
        }
        for i in 0..document.scenes.len() {
            for name in &names {
                let handlers = self.registry.handlers_for(name);
                let block = export_level(
                    handlers.iter().filter_map(|h| h.scene()),
                    |h| h.export_scene(i, &mut ctx),
                    &mut failures,
                );
                report_failures(&mut ctx, &mut failures, name, None);
                write_block(&mut document.scenes[i].extensions, name, block, &mut used);
            }
        }
        for name in &names {
            let handlers = self.registry.handlers_for(name);
            let block = export_level(
                handlers.iter().filter_map(|h| h.document()),
                |h| h.export_document(&mut ctx),
                &mut failures,
            );
            report_failures(&mut ctx, &mut failures, name, None);
            write_block(&mut document.extensions, name, block, &mut used);
        }

        for name in &used {
            document.mark_used(name);
        }
        let present = document.extension_names();
        for name in names
            .iter()
            .filter(|n| !present.iter().any(|p| p == *n))
        {
            document.unmark_used(name);
        }
        let diagnostics = ctx.into_diagnostics();
        tracing::info!(
            extensions = used.len(),
            warnings = diagnostics.count(Severity::Warning),
            errors = diagnostics.count(Severity::Error),
            "export finished"
        );
        Ok(ExportReport {
            extensions_used: used,
            diagnostics,
        })
    }
}

/// Run `export` on each handler until one produces a block.
///
/// Returns `None` if no handler operates at this level, `Some(None)` if none produced a block.
fn export_level<'a, T: ?Sized + 'a>(
    handlers: impl IntoIterator<Item = &'a T>,
    mut export: impl FnMut(&'a T) -> Result<Option<Value>>,
    failures: &mut Vec<Error>,
) -> Option<Option<Value>> {
    let mut any = false;
    for h in handlers {
        any = true;
        match export(h) {
            Ok(Some(block)) => return Some(Some(block)),
            Ok(None) => (),
            Err(e) => failures.push(e),
        }
    }
    any.then_some(None)
}

fn report_failures<H: HostScene>(
    ctx: &mut ExportContext<'_, H>,
    failures: &mut Vec<Error>,
    extension: &str,
    node: Option<NodeIndex>,
) {
    for e in failures.drain(..) {
        if let Some(diag) = isolate(Err(e), extension, node) {
            ctx.report(diag);
        }
    }
}

fn write_block(
    extensions: &mut Extensions,
    name: &str,
    block: Option<Option<Value>>,
    used: &mut Vec<String>,
) {
    match block {
        None => (),
        Some(None) => {
            extensions.remove(name);
        }
        Some(Some(block)) => {
            extensions.insert(name.to_owned(), block);
            if !used.iter().any(|u| u == name) {
                used.push(name.to_owned());
            }
        }
    }
}
