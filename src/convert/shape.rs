use nalgebra::Point3;
use omi_document::MeshIndex;

use crate::{
    context::{ExportContext, ImportContext},
    convert::Converted,
    data::{ShapeRecord, Tapered},
    host::{parry::frustum_geometry, HostColliderKind, HostScene},
    settings::{CylinderFallback, HostConventions, Settings, ShapeSettings},
    Error, Result,
};

/// Where the shape engine gets host meshes from during import.
pub trait MeshSource {
    type Mesh;

    /// # Errors
    /// * [Error::MissingMeshReference] if `index` doesn't resolve to a loaded mesh
    fn resolve_mesh(&self, index: i64) -> Result<Self::Mesh>;
    fn generate_mesh(&mut self, vertices: Vec<Point3<f32>>, triangles: Vec<[u32; 3]>)
        -> Self::Mesh;
}

/// Where the shape engine looks up document mesh indices during export.
pub trait MeshIndexLookup {
    type Mesh;

    fn mesh_index(&self, mesh: &Self::Mesh) -> Option<MeshIndex>;
}

impl<H: HostScene> MeshSource for ImportContext<'_, H> {
    type Mesh = H::Mesh;

    fn resolve_mesh(&self, index: i64) -> Result<H::Mesh> {
        ImportContext::resolve_mesh(self, index)
    }

    fn generate_mesh(&mut self, vertices: Vec<Point3<f32>>, triangles: Vec<[u32; 3]>) -> H::Mesh {
        self.host_mut().generate_mesh(vertices, triangles)
    }
}

impl<H: HostScene> MeshIndexLookup for ExportContext<'_, H> {
    type Mesh = H::Mesh;

    fn mesh_index(&self, mesh: &H::Mesh) -> Option<MeshIndex> {
        ExportContext::mesh_index(self, *mesh)
    }
}

/// Converts [ShapeRecords](ShapeRecord) to & from host collider primitives, according to the
/// host's conventions and the configured approximation policies.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShapeEngine {
    pub host: HostConventions,
    pub policy: ShapeSettings,
}

impl ShapeEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            host: settings.host,
            policy: settings.shapes,
        }
    }

    /// Collapse tapered radii onto one, flagging the loss if they differ.
    fn radius(&self, shape: &str, t: &Tapered) -> Converted<f32> {
        let r = self.policy.radius_policy.collapse(t.radius_top, t.radius_bottom);
        if t.is_symmetric() {
            Converted::exact(r)
        } else {
            Converted::lossy(
                r,
                format!(
                    "{shape} radii {} (top) & {} (bottom) collapsed to {r}",
                    t.radius_top, t.radius_bottom
                ),
            )
        }
    }

    /// Build the host collider equivalent to `record`.
    ///
    /// # Errors
    /// * [Error::MissingMeshReference] if a convex/trimesh shape's mesh isn't loaded
    pub fn to_host<S: MeshSource>(
        &self,
        record: &ShapeRecord,
        meshes: &mut S,
    ) -> Result<Converted<HostColliderKind<S::Mesh>>> {
        Ok(match *record {
            ShapeRecord::Box { size } => Converted::exact(HostColliderKind::Box {
                extents: size * self.host.box_extents.scale(),
            }),
            ShapeRecord::Sphere { radius } => Converted::exact(HostColliderKind::Sphere { radius }),
            ShapeRecord::Capsule(t) => self.radius("capsule", &t).map(|radius| {
                HostColliderKind::Capsule {
                    radius,
                    height: t.height + 2.0 * radius,
                }
            }),
            ShapeRecord::Cylinder(t) if self.host.native_cylinder => {
                self.radius("cylinder", &t)
                    .map(|radius| HostColliderKind::Cylinder {
                        radius,
                        height: t.height,
                    })
            }
            ShapeRecord::Cylinder(t) => match self.policy.cylinder_fallback {
                CylinderFallback::Capsule => {
                    let radius = self.radius("cylinder", &t).value;
                    Converted::lossy(
                        HostColliderKind::Capsule {
                            radius,
                            height: t.height,
                        },
                        format!(
                            "host has no cylinder primitive; substituted a capsule of radius {radius}"
                        ),
                    )
                }
                CylinderFallback::Mesh => {
                    let segments = self.policy.cylinder_segments;
                    let (vertices, triangles) =
                        frustum_geometry(t.height, t.radius_top, t.radius_bottom, segments);
                    let mesh = meshes.generate_mesh(vertices, triangles);
                    Converted::lossy(
                        HostColliderKind::Mesh { mesh, convex: true },
                        format!(
                            "host has no cylinder primitive; tessellated into {segments} segments"
                        ),
                    )
                }
            },
            ShapeRecord::Convex { mesh } => Converted::exact(HostColliderKind::Mesh {
                mesh: meshes.resolve_mesh(mesh)?,
                convex: true,
            }),
            ShapeRecord::Trimesh { mesh } => Converted::exact(HostColliderKind::Mesh {
                mesh: meshes.resolve_mesh(mesh)?,
                convex: false,
            }),
        })
    }

    /// Recover the shape record a host collider represents.
    ///
    /// # Errors
    /// * [Error::MissingMeshReference] if a mesh collider's mesh has no document index
    /// * [Error::UnsupportedColliderKind] for [Other](HostColliderKind::Other) colliders
    pub fn from_host<L: MeshIndexLookup>(
        &self,
        kind: &HostColliderKind<L::Mesh>,
        meshes: &L,
    ) -> Result<Converted<ShapeRecord>> {
        Ok(match kind {
            HostColliderKind::Box { extents } => Converted::exact(ShapeRecord::Box {
                size: extents / self.host.box_extents.scale(),
            }),
            HostColliderKind::Sphere { radius } => {
                Converted::exact(ShapeRecord::Sphere { radius: *radius })
            }
            HostColliderKind::Capsule { radius, height } => {
                let mid = height - 2.0 * radius;
                let record = ShapeRecord::Capsule(Tapered::new(mid.max(0.0), *radius));
                if mid < 0.0 {
                    Converted::lossy(
                        record,
                        format!(
                            "capsule height {height} is less than its diameter; clamped to 0"
                        ),
                    )
                } else {
                    Converted::exact(record)
                }
            }
            HostColliderKind::Cylinder { radius, height } => {
                Converted::exact(ShapeRecord::Cylinder(Tapered::new(*height, *radius)))
            }
            HostColliderKind::Mesh { mesh, convex } => {
                let mesh = meshes
                    .mesh_index(mesh)
                    .map(|i| i as i64)
                    .ok_or(Error::MissingMeshReference(-1))?;
                Converted::exact(if *convex {
                    ShapeRecord::Convex { mesh }
                } else {
                    ShapeRecord::Trimesh { mesh }
                })
            }
            HostColliderKind::Other(name) => {
                return Err(Error::UnsupportedColliderKind(name.clone()))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;
    use crate::{
        host::{MemoryMesh, MemoryScene},
        settings::{BoxExtents, RadiusPolicy},
    };

    fn import(settings: &Settings, record: &ShapeRecord) -> Result<Converted<HostColliderKind<crate::host::MeshId>>> {
        let mut host = MemoryScene::new();
        let mut ctx = ImportContext::new(&mut host, settings);
        ShapeEngine::new(settings).to_host(record, &mut ctx)
    }

    #[test]
    fn asymmetric_capsule() {
        let record = ShapeRecord::Capsule(Tapered {
            height: 1.0,
            radius_top: 0.6,
            radius_bottom: 0.4,
        });
        let res = import(&Settings::default(), &record).unwrap();
        assert!(res.is_lossy());
        match res.value {
            HostColliderKind::Capsule { radius, height } => {
                assert!((radius - 0.5).abs() < 1e-6);
                assert!((height - 2.0).abs() < 1e-6);
            }
            other => panic!("expected a capsule, got {other:?}"),
        }
    }

    #[test]
    fn max_radius_policy() {
        let mut settings = Settings::default();
        settings.shapes.radius_policy = RadiusPolicy::Max;
        let record = ShapeRecord::Capsule(Tapered {
            height: 1.0,
            radius_top: 0.6,
            radius_bottom: 0.4,
        });
        match import(&settings, &record).unwrap().value {
            HostColliderKind::Capsule { radius, height } => {
                assert_eq!(radius, 0.6);
                assert!((height - 2.2).abs() < 1e-6);
            }
            other => panic!("expected a capsule, got {other:?}"),
        }
    }

    #[test]
    fn half_extent_boxes() {
        let mut settings = Settings::default();
        settings.host.box_extents = BoxExtents::Half;
        let record = ShapeRecord::Box {
            size: Vector3::new(2.0, 4.0, 6.0),
        };
        let res = import(&settings, &record).unwrap();
        assert_eq!(
            res,
            Converted::exact(HostColliderKind::Box {
                extents: Vector3::new(1.0, 2.0, 3.0)
            })
        );
    }

    #[test]
    fn cylinder_strategies() {
        let record = ShapeRecord::Cylinder(Tapered::new(2.0, 0.5));
        let mut settings = Settings::default();
        let capsule = import(&settings, &record).unwrap();
        assert!(capsule.is_lossy());
        assert_eq!(
            capsule.value,
            HostColliderKind::Capsule {
                radius: 0.5,
                height: 2.0
            }
        );

        settings.host.native_cylinder = true;
        assert_eq!(
            import(&settings, &record).unwrap(),
            Converted::exact(HostColliderKind::Cylinder {
                radius: 0.5,
                height: 2.0
            })
        );

        settings.host.native_cylinder = false;
        settings.shapes.cylinder_fallback = CylinderFallback::Mesh;
        let mut host = MemoryScene::new();
        let mut ctx = ImportContext::new(&mut host, &settings);
        let res = ShapeEngine::new(&settings)
            .to_host(&record, &mut ctx)
            .unwrap();
        let HostColliderKind::Mesh { mesh, convex: true } = res.value else {
            panic!("expected a convex mesh, got {:?}", res.value);
        };
        drop(ctx);
        assert!(matches!(host.mesh(mesh), Some(MemoryMesh::Generated { .. })));
    }

    #[test]
    fn unresolved_mesh() {
        let res = import(&Settings::default(), &ShapeRecord::Convex { mesh: 0 });
        assert!(matches!(res, Err(Error::MissingMeshReference(0))));
    }

    #[test]
    fn short_capsule_clamps() {
        let host = MemoryScene::new();
        let settings = Settings::default();
        let ctx = ExportContext::new(&host, &settings);
        let res = ShapeEngine::new(&settings)
            .from_host(
                &HostColliderKind::Capsule {
                    radius: 1.0,
                    height: 1.5,
                },
                &ctx,
            )
            .unwrap();
        assert!(res.is_lossy());
        assert_eq!(res.value, ShapeRecord::Capsule(Tapered::new(0.0, 1.0)));
    }

    #[test]
    fn other_colliders_are_unsupported() {
        let host = MemoryScene::new();
        let settings = Settings::default();
        let ctx = ExportContext::new(&host, &settings);
        assert!(matches!(
            ShapeEngine::new(&settings).from_host(&HostColliderKind::Other("plane".into()), &ctx),
            Err(Error::UnsupportedColliderKind(k)) if k == "plane"
        ));
    }

    #[test]
    fn every_variant_round_trips() {
        let mut settings = Settings::default();
        settings.host.native_cylinder = true;
        settings.host.box_extents = BoxExtents::Half;
        let engine = ShapeEngine::new(&settings);

        let mut host = MemoryScene::new();
        let hull = host.add_mesh(0);
        let terrain = host.add_mesh(1);
        let records = [
            ShapeRecord::Box {
                size: Vector3::new(2.0, 4.0, 6.0),
            },
            ShapeRecord::Sphere { radius: 0.5 },
            ShapeRecord::Capsule(Tapered::new(1.0, 0.5)),
            ShapeRecord::Cylinder(Tapered::new(2.0, 0.25)),
            ShapeRecord::Convex { mesh: 0 },
            ShapeRecord::Trimesh { mesh: 1 },
        ];

        let mut ctx = ImportContext::new(&mut host, &settings);
        ctx.register_mesh(0, hull).unwrap();
        ctx.register_mesh(1, terrain).unwrap();
        let colliders = records
            .iter()
            .map(|r| {
                let res = engine.to_host(r, &mut ctx).unwrap();
                assert!(!res.is_lossy(), "{r:?}");
                res.value
            })
            .collect::<Vec<_>>();
        drop(ctx);

        assert_eq!(
            colliders[4],
            HostColliderKind::Mesh {
                mesh: hull,
                convex: true
            }
        );
        assert_eq!(
            colliders[5],
            HostColliderKind::Mesh {
                mesh: terrain,
                convex: false
            }
        );

        let mut ctx = ExportContext::new(&host, &settings);
        ctx.register_mesh(hull, 0).unwrap();
        ctx.register_mesh(terrain, 1).unwrap();
        for (record, collider) in records.iter().zip(&colliders) {
            let back = engine.from_host(collider, &ctx).unwrap();
            assert_eq!(back, Converted::exact(*record));
        }
    }

    #[test]
    fn unexported_mesh_has_no_index() {
        let mut host = MemoryScene::new();
        let mesh = host.add_mesh(0);
        let settings = Settings::default();
        let ctx = ExportContext::new(&host, &settings);
        let res = ShapeEngine::new(&settings).from_host(
            &HostColliderKind::Mesh {
                mesh,
                convex: true,
            },
            &ctx,
        );
        assert!(matches!(res, Err(Error::MissingMeshReference(_))));
    }
}
