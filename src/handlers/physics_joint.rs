use omi_document::NodeIndex;
use serde_json::Value;

use crate::{
    context::{ExportContext, ImportContext},
    data::{self, names, JointDocumentJson, JointJson, JointRecord, JointSettings},
    diagnostics::Diagnostic,
    host::{HostJoint, HostScene},
    registry::{DocumentHandler, ExtensionHandler, NodeHandler},
    validate::{validate_joint, validate_joint_settings},
    Error, Result, Validation,
};

/// Side channel key of the imported [ImportedJointSettings].
pub const JOINT_SETTINGS_KEY: &str = "OMI_physics_joint/settings";

/// The document `physicsJoints` array; `None` marks settings which failed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedJointSettings(pub Vec<Option<JointSettings>>);

/// `OMI_physics_joint`: joint settings at document level, joints between nodes at node level.
///
/// Joint limits & drives are expressed in the joint's local frame and are passed to the host
/// as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct JointHandler;

impl<H: HostScene> ExtensionHandler<H> for JointHandler {
    fn document(&self) -> Option<&dyn DocumentHandler<H>> {
        Some(self)
    }

    fn node(&self) -> Option<&dyn NodeHandler<H>> {
        Some(self)
    }
}

impl<H: HostScene> DocumentHandler<H> for JointHandler {
    fn import_document(&self, block: &Value, ctx: &mut ImportContext<'_, H>) -> Result<()> {
        let doc: JointDocumentJson = data::parse(block)?;
        let mut settings = Vec::with_capacity(doc.physics_joints.len());
        for (i, s) in doc.physics_joints.into_iter().enumerate() {
            let validation = validate_joint_settings(&s).with_context(format!("physicsJoints[{i}]"));
            match ctx.accept(validation, names::PHYSICS_JOINT, None) {
                Ok(()) => settings.push(Some(s)),
                Err(e) => {
                    ctx.report(
                        Diagnostic::skipped(format!("joint settings {i} skipped: {e}"))
                            .extension(names::PHYSICS_JOINT),
                    );
                    settings.push(None);
                }
            }
        }
        ctx.get_or_create_side_data::<ImportedJointSettings>(JOINT_SETTINGS_KEY)?
            .0 = settings;
        Ok(())
    }

    fn export_document(&self, ctx: &mut ExportContext<'_, H>) -> Result<Option<Value>> {
        let physics_joints = ctx.take_records::<JointSettings>(names::PHYSICS_JOINT)?;
        if physics_joints.is_empty() {
            return Ok(None);
        }
        data::to_block(&JointDocumentJson { physics_joints }).map(Some)
    }
}

impl<H: HostScene> NodeHandler<H> for JointHandler {
    fn import_node(
        &self,
        block: &Value,
        node: NodeIndex,
        object: H::Object,
        ctx: &mut ImportContext<'_, H>,
    ) -> Result<()> {
        let json: JointJson = data::parse(block)?;
        let all_settings = ctx
            .try_get_side_data::<ImportedJointSettings>(JOINT_SETTINGS_KEY)
            .map(|s| s.0.as_slice())
            .unwrap_or_default();
        let validation = validate_joint(
            &json,
            ctx.node_count().saturating_sub(1),
            all_settings.len(),
        );
        let settings = all_settings
            .get(json.joint.max(0) as usize)
            .cloned()
            .flatten();
        ctx.accept(validation, names::PHYSICS_JOINT, Some(node))?;

        let JointRecord {
            connected_node,
            settings: index,
            enable_collision,
        } = json.resolve()?;
        let settings = settings.ok_or_else(|| {
            Error::ValidationFailed(Validation::error(format!(
                "joint settings {index} failed to import"
            )))
        })?;
        let connected = ctx.resolve_node(connected_node as i64)?;
        ctx.host_mut().add_joint(
            object,
            HostJoint {
                connected,
                enable_collision,
                settings,
            },
        );
        Ok(())
    }

    fn export_node(
        &self,
        object: H::Object,
        node: NodeIndex,
        ctx: &mut ExportContext<'_, H>,
    ) -> Result<Option<Value>> {
        let mut joints = ctx.host().joints(object).into_iter();
        let Some(joint) = joints.next() else {
            return Ok(None);
        };
        let extra = joints.count();
        if extra > 0 {
            ctx.report(
                Diagnostic::skipped(format!(
                    "{extra} extra joint(s) dropped; a node exports at most one joint"
                ))
                .extension(names::PHYSICS_JOINT)
                .node(node),
            );
        }
        let connected_node = ctx
            .node_index(joint.connected)
            .ok_or(Error::MissingNodeReference(-1))?;
        let key = joint.settings.canonical_key()?;
        let settings = joint.settings;
        let index = ctx.get_or_register_index(names::PHYSICS_JOINT, key, || Ok(settings))?;
        let record = JointRecord {
            connected_node,
            settings: index,
            enable_collision: joint.enable_collision,
        };
        data::to_block(&JointJson::from(&record)).map(Some)
    }
}
