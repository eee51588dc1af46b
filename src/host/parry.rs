//! Bridges host colliders to [parry3d] shapes, for hosts whose physics runs on parry (or
//! rapier), and generates approximation geometry.

use nalgebra::{Point3, Vector3};
use parry3d::{
    bounding_volume::Aabb,
    shape::{Cylinder, Shape, SharedShape},
};

use crate::{host::HostColliderKind, settings::BoxExtents};

/// Build the parry shape equivalent to a host collider.
///
/// `geometry` supplies vertices & triangles for mesh colliders. Returns `None` for
/// [Other](HostColliderKind::Other) colliders, for meshes without geometry, and for degenerate
/// convex hulls.
pub fn shared_shape<M>(
    kind: &HostColliderKind<M>,
    box_extents: BoxExtents,
    geometry: impl FnOnce(&M) -> Option<(Vec<Point3<f32>>, Vec<[u32; 3]>)>,
) -> Option<SharedShape> {
    match kind {
        HostColliderKind::Box { extents } => {
            let half = extents * (0.5 / box_extents.scale());
            Some(SharedShape::cuboid(half.x, half.y, half.z))
        }
        HostColliderKind::Sphere { radius } => Some(SharedShape::ball(*radius)),
        HostColliderKind::Capsule { radius, height } => {
            let half_segment = (height - 2.0 * radius).max(0.0) / 2.0;
            Some(SharedShape::capsule_y(half_segment, *radius))
        }
        HostColliderKind::Cylinder { radius, height } => {
            Some(SharedShape::cylinder(height / 2.0, *radius))
        }
        HostColliderKind::Mesh { mesh, convex } => {
            let (vertices, triangles) = geometry(mesh)?;
            if *convex {
                SharedShape::convex_hull(&vertices)
            } else {
                Some(SharedShape::convex_decomposition(&vertices, &triangles))
            }
        }
        HostColliderKind::Other(_) => None,
    }
}

/// Volume & local bounds of a shape.
pub fn measure(shape: &SharedShape) -> (f32, Aabb) {
    (shape.mass_properties(1.0).mass(), shape.compute_local_aabb())
}

/// Triangulate a (possibly tapered) cylinder centered on the origin along +Y.
pub fn frustum_geometry(
    height: f32,
    radius_top: f32,
    radius_bottom: f32,
    segments: u32,
) -> (Vec<Point3<f32>>, Vec<[u32; 3]>) {
    let (mut vertices, triangles) = Cylinder::new(height / 2.0, 1.0).to_trimesh(segments.max(3));
    for v in &mut vertices {
        let r = if v.y > 0.0 { radius_top } else { radius_bottom };
        v.coords.component_mul_assign(&Vector3::new(r, 1.0, r));
    }
    (vertices, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_geometry<M>(_: &M) -> Option<(Vec<Point3<f32>>, Vec<[u32; 3]>)> {
        None
    }

    #[test]
    fn box_extents_convention() {
        let kind = HostColliderKind::<()>::Box {
            extents: Vector3::new(2.0, 4.0, 6.0),
        };
        let full = shared_shape(&kind, BoxExtents::Full, no_geometry).unwrap();
        let half = shared_shape(&kind, BoxExtents::Half, no_geometry).unwrap();
        assert_eq!(
            full.as_cuboid().unwrap().half_extents,
            Vector3::new(1.0, 2.0, 3.0)
        );
        assert_eq!(
            half.as_cuboid().unwrap().half_extents,
            Vector3::new(2.0, 4.0, 6.0)
        );
    }

    #[test]
    fn capsule_total_height() {
        let kind = HostColliderKind::<()>::Capsule {
            radius: 0.5,
            height: 2.0,
        };
        let shape = shared_shape(&kind, BoxExtents::Full, no_geometry).unwrap();
        let (_, aabb) = measure(&shape);
        assert!((aabb.maxs.y - 1.0).abs() < 1e-5);
        assert!((aabb.maxs.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn frustum_radii() {
        let (vertices, triangles) = frustum_geometry(2.0, 0.25, 1.0, 8);
        assert!(!triangles.is_empty());
        for v in &vertices {
            let r = (v.x * v.x + v.z * v.z).sqrt();
            if v.y > 0.0 {
                assert!((v.y - 1.0).abs() < 1e-5);
                assert!(r <= 0.25 + 1e-5);
            } else {
                assert!(r <= 1.0 + 1e-5);
            }
        }
        let hull = shared_shape(
            &HostColliderKind::Mesh {
                mesh: (),
                convex: true,
            },
            BoxExtents::Full,
            |_| Some((vertices.clone(), triangles.clone())),
        );
        assert!(hull.is_some());
    }

    #[test]
    fn other_has_no_shape() {
        assert!(shared_shape(
            &HostColliderKind::<()>::Other("heightfield".into()),
            BoxExtents::Full,
            no_geometry
        )
        .is_none());
    }
}
