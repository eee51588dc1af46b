use nalgebra::Vector3;

use crate::{
    context::{ExportContext, ImportContext},
    convert::{CoordinateSpace, ShapeEngine},
    data::{names, BodyRecord, MotionRecord, ShapeRecord, TriggerRecord},
    diagnostics::Diagnostic,
    host::{HostCollider, HostRigidBody, HostScene},
    settings::Settings,
    Error, Result,
};

/// Converts physics bodies to & from host rigid bodies, colliders and triggers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyEngine {
    pub space: CoordinateSpace,
    pub shapes: ShapeEngine,
}

impl BodyEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            space: CoordinateSpace::new(settings.host.handedness, settings.host.angle_unit),
            shapes: ShapeEngine::new(settings),
        }
    }

    pub fn motion_to_host(&self, m: &MotionRecord) -> HostRigidBody {
        let mut res = HostRigidBody::new(m.kind);
        res.mass = m.mass;
        res.center_of_mass = self.space.point(m.center_of_mass);
        if m.is_simulated() {
            res.linear_velocity = self.space.point(m.linear_velocity);
            res.angular_velocity = self.space.angular_velocity_to_host(m.angular_velocity);
            if m.inertia_diagonal != Vector3::zeros() {
                res.inertia = Some((
                    m.inertia_diagonal,
                    self.space.rotation(m.inertia_orientation),
                ));
            }
        }
        res
    }

    pub fn motion_from_host(&self, b: &HostRigidBody) -> MotionRecord {
        let mut res = MotionRecord::new(b.motion);
        res.mass = b.mass;
        res.center_of_mass = self.space.point(b.center_of_mass);
        if res.is_simulated() {
            res.linear_velocity = self.space.point(b.linear_velocity);
            res.angular_velocity = self.space.angular_velocity_from_host(b.angular_velocity);
            if let Some((diagonal, orientation)) = b.inertia {
                res.inertia_diagonal = diagonal;
                res.inertia_orientation = self.space.rotation(orientation);
            }
        }
        res
    }

    /// Apply a body to `object`.
    ///
    /// Every reference is resolved before the host is touched, so a failure leaves `object`
    /// unchanged (apart from any generated approximation meshes).
    ///
    /// # Errors
    /// * [Error::MissingShapeReference] if a shape index isn't in `shapes` (or that shape failed
    ///   to import)
    /// * [Error::MissingNodeReference] if a compound trigger names a node without an object
    /// * [Error::MissingMeshReference] if a mesh shape's mesh isn't loaded
    pub fn import<H: HostScene>(
        &self,
        body: &BodyRecord,
        shapes: &[Option<ShapeRecord>],
        object: H::Object,
        ctx: &mut ImportContext<'_, H>,
    ) -> Result<()> {
        let shape = |index: usize| {
            shapes
                .get(index)
                .copied()
                .flatten()
                .ok_or(Error::MissingShapeReference(index as i64))
        };

        let mut colliders = Vec::new();
        let mut lossy = Vec::new();
        let mut compound = None;
        if let Some(index) = body.collider {
            let (kind, diag) = self.shapes.to_host(&shape(index)?, ctx)?.into_parts();
            colliders.push(HostCollider::solid(kind));
            lossy.extend(diag);
        }
        match &body.trigger {
            None => (),
            Some(TriggerRecord::Shape(index)) => {
                let (kind, diag) = self.shapes.to_host(&shape(*index)?, ctx)?.into_parts();
                colliders.push(HostCollider::trigger(kind));
                lossy.extend(diag);
            }
            Some(TriggerRecord::Compound(nodes)) => {
                let parts = nodes
                    .iter()
                    .map(|&n| ctx.resolve_node(n as i64))
                    .collect::<Result<Vec<_>>>()?;
                compound = Some(parts);
            }
        }

        let host = ctx.host_mut();
        if let Some(motion) = &body.motion {
            host.set_rigid_body(object, self.motion_to_host(motion));
        }
        for collider in colliders {
            host.add_collider(object, collider);
        }
        if let Some(parts) = compound {
            host.set_compound_trigger(object, parts);
        }
        for diag in lossy {
            ctx.report(diag.extension(names::PHYSICS_SHAPE));
        }
        Ok(())
    }

    /// Extract the body of `object`, registering its shapes with the export shape accumulator.
    ///
    /// Colliders which can't be converted are skipped & reported. Returns `None` if `object`
    /// has nothing to export.
    pub fn export<H: HostScene>(
        &self,
        object: H::Object,
        node: usize,
        ctx: &mut ExportContext<'_, H>,
    ) -> Result<Option<BodyRecord>> {
        let host = ctx.host();
        let mut res = BodyRecord {
            motion: host.rigid_body(object).map(|b| self.motion_from_host(&b)),
            ..Default::default()
        };

        for collider in host.colliders(object) {
            let slot_taken = if collider.is_trigger {
                res.trigger.is_some()
            } else {
                res.collider.is_some()
            };
            if slot_taken {
                ctx.report(
                    Diagnostic::skipped(format!(
                        "extra {} collider dropped; a node exports at most one solid collider and one trigger",
                        collider.kind.name()
                    ))
                    .extension(names::PHYSICS_BODY)
                    .node(node),
                );
                continue;
            }
            let index = match self.export_shape(&collider, node, ctx) {
                Ok(index) => index,
                Err(e) => {
                    ctx.report(
                        Diagnostic::skipped(format!("collider skipped: {e}"))
                            .extension(names::PHYSICS_SHAPE)
                            .node(node),
                    );
                    continue;
                }
            };
            if collider.is_trigger {
                res.trigger = Some(TriggerRecord::Shape(index));
            } else {
                res.collider = Some(index);
            }
        }

        if res.trigger.is_none() {
            if let Some(parts) = host.compound_trigger(object) {
                let mut nodes = Vec::with_capacity(parts.len());
                for part in parts {
                    match ctx.node_index(part) {
                        Some(n) => nodes.push(n),
                        None => ctx.report(
                            Diagnostic::skipped(format!(
                                "compound trigger part {part:?} isn't an exported node"
                            ))
                            .extension(names::PHYSICS_BODY)
                            .node(node),
                        ),
                    }
                }
                res.trigger = Some(TriggerRecord::Compound(nodes));
            }
        }

        Ok((!res.is_empty()).then_some(res))
    }

    fn export_shape<H: HostScene>(
        &self,
        collider: &HostCollider<H::Mesh>,
        node: usize,
        ctx: &mut ExportContext<'_, H>,
    ) -> Result<usize> {
        let (record, lossy) = self.shapes.from_host(&collider.kind, ctx)?.into_parts();
        if let Some(diag) = lossy {
            ctx.report(diag.extension(names::PHYSICS_SHAPE).node(node));
        }
        ctx.get_or_register_index(names::PHYSICS_SHAPE, record.canonical_key(), || Ok(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        convert::{AngleUnit, Handedness},
        data::MotionType,
        host::{HostColliderKind, MemoryScene},
    };

    fn flipped() -> Settings {
        let mut settings = Settings::default();
        settings.host.handedness = Handedness::FlipZ;
        settings.host.angle_unit = AngleUnit::Degrees;
        settings
    }

    #[test]
    fn motion_round_trip() {
        let engine = BodyEngine::new(&flipped());
        let mut m = MotionRecord::new(MotionType::Dynamic);
        m.mass = 3.0;
        m.linear_velocity = Vector3::new(1.0, 2.0, 3.0);
        m.angular_velocity = Vector3::new(0.5, 0.0, -0.25);
        m.inertia_diagonal = Vector3::new(1.0, 1.0, 2.0);
        let host = engine.motion_to_host(&m);
        assert_eq!(host.linear_velocity, Vector3::new(1.0, 2.0, -3.0));
        assert!(host.inertia.is_some());
        let back = engine.motion_from_host(&host);
        assert_eq!(back.kind, MotionType::Dynamic);
        assert_eq!(back.linear_velocity, m.linear_velocity);
        assert!((back.angular_velocity - m.angular_velocity).norm() < 1e-5);
        assert_eq!(back.inertia_diagonal, m.inertia_diagonal);
    }

    #[test]
    fn zero_inertia_is_automatic() {
        let engine = BodyEngine::default();
        let host = engine.motion_to_host(&MotionRecord::new(MotionType::Dynamic));
        assert_eq!(host.inertia, None);
    }

    #[test]
    fn missing_shape_changes_nothing() {
        let mut host = MemoryScene::new();
        let obj = host.add_object("body");
        let settings = Settings::default();
        let mut ctx = ImportContext::new(&mut host, &settings);
        let body = BodyRecord {
            motion: Some(MotionRecord::new(MotionType::Dynamic)),
            collider: Some(3),
            trigger: None,
        };
        let res = BodyEngine::new(&settings).import(&body, &[], obj, &mut ctx);
        assert!(matches!(res, Err(Error::MissingShapeReference(3))));
        drop(ctx);
        assert_eq!(host.rigid_body(obj), None);
    }

    #[test]
    fn trigger_only_bodies() {
        let mut host = MemoryScene::new();
        let obj = host.add_object("zone");
        host.add_collider(
            obj,
            HostCollider::trigger(HostColliderKind::Sphere { radius: 2.0 }),
        );
        let settings = Settings::default();
        let mut ctx = ExportContext::new(&host, &settings);
        let body = BodyEngine::new(&settings)
            .export(obj, 0, &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(body.motion, None);
        assert_eq!(body.collider, None);
        assert_eq!(body.trigger, Some(TriggerRecord::Shape(0)));
    }

    #[test]
    fn nothing_to_export() {
        let mut host = MemoryScene::new();
        let obj = host.add_object("plain");
        let settings = Settings::default();
        let mut ctx = ExportContext::new(&host, &settings);
        assert_eq!(
            BodyEngine::new(&settings).export(obj, 0, &mut ctx).unwrap(),
            None
        );
    }
}
