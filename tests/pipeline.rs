use omi_gltf::{
    data::{names, MotionType, ShapeDocumentJson, ShapeRecord},
    document::Document,
    host::{HostColliderKind, HostScene, MemoryScene},
    CancelFlag, DiagnosticKind, Error, Exporter, Importer, Registry, Settings, Severity,
};
use nalgebra::Vector3;
use serde_json::{json, Value};

fn document(mut value: Value) -> Document {
    value["asset"] = json!({"version": "2.0"});
    serde_json::from_value(value).unwrap()
}

fn import(doc: &Document) -> (MemoryScene, omi_gltf::ImportReport<MemoryScene>) {
    let registry = Registry::with_builtin();
    let mut host = MemoryScene::new();
    let report = Importer::new(&registry, Settings::default())
        .import(doc, &mut host)
        .unwrap();
    (host, report)
}

/// Export into a copy of `doc` with every extension block removed.
fn export(
    host: &MemoryScene,
    report: &omi_gltf::ImportReport<MemoryScene>,
    doc: &Document,
) -> (Document, omi_gltf::ExportReport) {
    let mut out = doc.clone();
    out.extensions.clear();
    out.extensions_used.clear();
    for node in &mut out.nodes {
        node.extensions.clear();
    }
    for scene in &mut out.scenes {
        scene.extensions.clear();
    }
    let registry = Registry::with_builtin();
    let res = Exporter::new(&registry, Settings::default())
        .export(host, &report.objects, &report.meshes, &mut out)
        .unwrap();
    (out, res)
}

fn exported_shapes(doc: &Document) -> Vec<ShapeRecord> {
    let shapes: ShapeDocumentJson =
        serde_json::from_value(doc.extensions[names::PHYSICS_SHAPE].clone()).unwrap();
    shapes.shapes.iter().map(|s| s.resolve().unwrap()).collect()
}

#[test]
fn asymmetric_capsule_round_trip() {
    let doc = document(json!({
        "extensions": {"OMI_physics_shape": {"shapes": [
            {"type": "capsule", "height": 1.0, "radiusTop": 0.6, "radiusBottom": 0.4}
        ]}},
        "nodes": [{"name": "pill", "extensions": {"OMI_physics_body": {"collider": {"shape": 0}}}}],
    }));
    let (host, report) = import(&doc);

    let colliders = host.colliders(report.objects[0]);
    assert_eq!(colliders.len(), 1);
    assert!(!colliders[0].is_trigger);
    match colliders[0].kind {
        HostColliderKind::Capsule { radius, height } => {
            assert!((radius - 0.5).abs() < 1e-6);
            assert!((height - 2.0).abs() < 1e-6);
        }
        ref other => panic!("expected a capsule, got {other:?}"),
    }
    assert_eq!(
        report
            .diagnostics
            .of_kind(DiagnosticKind::LossyConversion)
            .count(),
        1
    );

    let (out, res) = export(&host, &report, &doc);
    assert!(res.diagnostics.is_empty());
    assert_eq!(
        out.nodes[0].extensions[names::PHYSICS_BODY],
        json!({"collider": {"shape": 0}})
    );
    match exported_shapes(&out).as_slice() {
        [ShapeRecord::Capsule(t)] => {
            assert!((t.height - 1.0).abs() < 1e-6);
            assert!((t.radius_top - 0.5).abs() < 1e-6);
            assert_eq!(t.radius_top, t.radius_bottom);
        }
        other => panic!("expected one capsule, got {other:?}"),
    }
    assert!(out.extensions_used.iter().any(|n| n == names::PHYSICS_SHAPE));
    assert!(out.extensions_used.iter().any(|n| n == names::PHYSICS_BODY));
}

#[test]
fn equal_shapes_are_exported_once() {
    let sphere = json!({"type": "sphere", "sphere": {"radius": 0.25}});
    let body = json!({"OMI_physics_body": {"motion": {"type": "dynamic", "mass": 2.0}, "collider": {"shape": 0}}});
    let doc = document(json!({
        "extensions": {"OMI_physics_shape": {"shapes": [sphere.clone(), sphere]}},
        "nodes": [
            {"extensions": body},
            {"extensions": {"OMI_physics_body": {"collider": {"shape": 1}}}},
        ],
    }));
    let (host, report) = import(&doc);
    let (out, _) = export(&host, &report, &doc);
    assert_eq!(
        exported_shapes(&out),
        [ShapeRecord::Sphere { radius: 0.25 }]
    );
    assert_eq!(
        out.nodes[0].extensions[names::PHYSICS_BODY],
        json!({"motion": {"type": "dynamic", "mass": 2.0}, "collider": {"shape": 0}})
    );
    assert_eq!(
        out.nodes[1].extensions[names::PHYSICS_BODY],
        json!({"collider": {"shape": 0}})
    );
}

#[test]
fn unspecified_sizes_use_defaults() {
    let doc = document(json!({
        "extensions": {"OMI_physics_shape": {"shapes": [{"type": "box"}, {"type": "sphere"}]}},
        "nodes": [{"extensions": {"OMI_physics_body": {"collider": {"shape": 0}, "trigger": {"shape": 1}}}}],
    }));
    let (host, report) = import(&doc);
    let colliders = host.colliders(report.objects[0]);
    assert_eq!(colliders.len(), 2);
    match colliders[0].kind {
        HostColliderKind::Box { extents } => assert_eq!(extents.as_slice(), [1.0, 1.0, 1.0]),
        ref other => panic!("expected a box, got {other:?}"),
    }
    assert!(colliders[1].is_trigger);
    assert!(matches!(
        colliders[1].kind,
        HostColliderKind::Sphere { radius } if radius == 0.5
    ));
}

#[test]
fn unknown_motion_type_creates_nothing() {
    let doc = document(json!({
        "nodes": [{"extensions": {"OMI_physics_body": {"motion": {"type": "bouncy"}}}}],
    }));
    let (host, report) = import(&doc);
    assert_eq!(host.rigid_body(report.objects[0]), None);
    let errors: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, DiagnosticKind::Validation);
    assert_eq!(errors[0].node, Some(0));
    assert!(errors[0].message.contains("Invalid motion type: bouncy"));
}

#[test]
fn unsimulated_bodies_ignore_dynamics() {
    let doc = document(json!({
        "nodes": [
            {"extensions": {"OMI_physics_body": {"motion": {"type": "static", "inertiaDiagonal": [-1, 0, 0]}}}},
            {"extensions": {"OMI_physics_body": {"motion": {"type": "kinematic", "inertiaOrientation": [0, 0, 0, 0], "linearVelocity": [1, 2, 3]}}}},
        ],
    }));
    let (host, report) = import(&doc);
    assert_eq!(report.diagnostics.count(Severity::Error), 0);
    let fixed = host.rigid_body(report.objects[0]).unwrap();
    assert_eq!(fixed.motion, MotionType::Static);
    assert_eq!(fixed.inertia, None);
    let moving = host.rigid_body(report.objects[1]).unwrap();
    assert_eq!(moving.motion, MotionType::Kinematic);
    assert_eq!(moving.linear_velocity, Vector3::zeros());
}

#[test]
fn dynamic_triggers() {
    let doc = document(json!({
        "extensions": {"OMI_physics_shape": {"shapes": [{"type": "sphere", "sphere": {"radius": 2.0}}]}},
        "nodes": [{"extensions": {"OMI_physics_body": {
            "motion": {"type": "dynamic", "mass": 4.0},
            "trigger": {"shape": 0},
        }}}],
    }));
    let (host, report) = import(&doc);
    let body = host.rigid_body(report.objects[0]).unwrap();
    assert_eq!(body.motion, MotionType::Dynamic);
    assert_eq!(body.mass, 4.0);
    let colliders = host.colliders(report.objects[0]);
    assert_eq!(colliders.len(), 1);
    assert!(colliders[0].is_trigger);

    let (out, _) = export(&host, &report, &doc);
    assert_eq!(
        out.nodes[0].extensions[names::PHYSICS_BODY],
        json!({"motion": {"type": "dynamic", "mass": 4.0}, "trigger": {"shape": 0}})
    );
}

#[test]
fn declined_extensions_are_no_longer_used() {
    let doc = document(json!({
        "extensionsUsed": ["OMI_physics_joint", "EXT_other"],
        "extensionsRequired": ["OMI_physics_joint"],
        "extensions": {"OMI_physics_joint": {"physicsJoints": [{}]}},
        "nodes": [{"extensions": {"OMI_physics_joint": {"connectedNode": 5, "joint": 0}}}],
    }));
    let (host, report) = import(&doc);
    assert!(host.joints(report.objects[0]).is_empty());

    let mut out = doc.clone();
    let registry = Registry::with_builtin();
    Exporter::new(&registry, Settings::default())
        .export(&host, &report.objects, &report.meshes, &mut out)
        .unwrap();
    assert!(out.nodes[0].extensions.is_empty());
    assert!(out.extensions.is_empty());
    assert_eq!(out.extensions_used, ["EXT_other"]);
    assert!(out.extensions_required.is_empty());
}

#[test]
fn spawn_point_title_boundary() {
    let doc = document(json!({
        "nodes": [
            {"extensions": {"OMI_spawn_point": {"title": "t".repeat(128)}}},
            {"extensions": {"OMI_spawn_point": {"title": "t".repeat(129)}}},
        ],
    }));
    let (host, report) = import(&doc);
    assert!(host
        .metadata(report.objects[0], names::SPAWN_POINT)
        .is_some());
    assert!(host
        .metadata(report.objects[1], names::SPAWN_POINT)
        .is_none());
    assert_eq!(report.diagnostics.count(Severity::Error), 1);
    assert_eq!(report.diagnostics.count(Severity::Warning), 0);
}

#[test]
fn failures_are_isolated_per_node() {
    let doc = document(json!({
        "extensions": {"OMI_physics_shape": {"shapes": [
            {"type": "trimesh", "trimesh": {"mesh": 3}},
            {"type": "sphere"},
        ]}},
        "nodes": [
            {"extensions": {"OMI_physics_body": {"motion": {"type": "static"}, "collider": {"shape": 0}}}},
            {"extensions": {"OMI_physics_body": {"collider": {"shape": 1}}}},
            {"extensions": {"OMI_physics_body": {"collider": {"shape": 7}}}},
        ],
    }));
    let (host, report) = import(&doc);
    // all-or-nothing per node
    assert!(host.colliders(report.objects[0]).is_empty());
    assert_eq!(host.rigid_body(report.objects[0]), None);
    assert_eq!(host.colliders(report.objects[1]).len(), 1);
    assert!(host.colliders(report.objects[2]).is_empty());

    let failed: Vec<_> = report
        .diagnostics
        .iter()
        .filter_map(|d| (d.severity == Severity::Error).then_some(d.node))
        .collect();
    assert_eq!(failed, [Some(0), Some(2)]);
}

#[test]
fn unhandled_extensions_are_reported_once() {
    let doc = document(json!({
        "extensionsRequired": ["EXT_required"],
        "nodes": [
            {"extensions": {"EXT_unknown": {}}},
            {"extensions": {"EXT_unknown": {}, "EXT_required": {}}},
        ],
    }));
    let (_, report) = import(&doc);
    let unhandled: Vec<_> = report
        .diagnostics
        .of_kind(DiagnosticKind::Unhandled)
        .map(|d| (d.extension.as_deref(), d.severity))
        .collect();
    assert_eq!(
        unhandled,
        [
            (Some("EXT_unknown"), Severity::Info),
            (Some("EXT_required"), Severity::Warning)
        ]
    );
}

#[test]
fn joints_connect_nodes() {
    let doc = document(json!({
        "extensions": {"OMI_physics_joint": {"physicsJoints": [
            {"limits": [{"linearAxes": [0, 1, 2]}]},
        ]}},
        "nodes": [
            {"name": "hinge", "extensions": {"OMI_physics_joint": {"connectedNode": 1, "joint": 0}}},
            {"name": "door", "extensions": {"OMI_physics_joint": {"connectedNode": 0, "joint": 0, "enableCollision": true}}},
            {"name": "broken", "extensions": {"OMI_physics_joint": {"connectedNode": 9, "joint": 0}}},
        ],
    }));
    let (host, report) = import(&doc);
    let joints = host.joints(report.objects[0]);
    assert_eq!(joints.len(), 1);
    assert_eq!(joints[0].connected, report.objects[1]);
    assert!(host.joints(report.objects[2]).is_empty());
    assert_eq!(report.diagnostics.count(Severity::Error), 1);

    let (out, _) = export(&host, &report, &doc);
    let settings = &out.extensions[names::PHYSICS_JOINT]["physicsJoints"];
    assert_eq!(settings.as_array().map(Vec::len), Some(1));
    assert_eq!(
        out.nodes[1].extensions[names::PHYSICS_JOINT],
        json!({"connectedNode": 0, "joint": 0, "enableCollision": true})
    );
    assert!(out.nodes[2].extensions.is_empty());
}

#[test]
fn scene_extensions_round_trip() {
    let doc = document(json!({
        "extensions": {
            "OMI_environment_sky": {"skies": [{"type": "plain", "plain": {"color": [0.5, 0.5, 1.0]}}]},
            "KHR_audio_emitter": {
                "audio": [{"uri": "wind.ogg"}],
                "sources": [{"audio": 0, "autoPlay": true}],
                "emitters": [{"type": "global", "sources": [0]}],
            },
        },
        "scenes": [{"nodes": [0], "extensions": {
            "OMI_environment_sky": {"sky": 0},
            "KHR_audio_emitter": {"emitters": [0]},
        }}],
        "nodes": [{}],
    }));
    let (host, report) = import(&doc);
    assert!(report.diagnostics.is_empty());
    let (mut out, _) = export(&host, &report, &doc);
    assert_eq!(out.scenes[0].extensions, doc.scenes[0].extensions);
    out.extensions_used.sort();
    assert_eq!(out.extensions_used, [names::AUDIO_EMITTER, names::ENVIRONMENT_SKY]);
    assert_eq!(
        out.extensions[names::ENVIRONMENT_SKY],
        doc.extensions[names::ENVIRONMENT_SKY]
    );
}

#[test]
fn cancelled_imports_stop() {
    let doc = document(json!({"nodes": [{}, {}]}));
    let registry = Registry::with_builtin();
    let cancel = CancelFlag::new();
    cancel.cancel();
    let mut host = MemoryScene::new();
    let res = Importer::new(&registry, Settings::default())
        .with_cancel(cancel)
        .import(&doc, &mut host);
    assert!(matches!(res, Err(Error::Cancelled)));
}

#[test]
fn export_needs_one_object_per_node() {
    let mut doc = document(json!({"nodes": [{}, {}]}));
    let mut host = MemoryScene::new();
    let a = host.add_object("a");
    let registry = Registry::with_builtin();
    let res = Exporter::new(&registry, Settings::default()).export(&host, &[a], &[], &mut doc);
    assert!(matches!(res, Err(Error::InvalidArgument(_))));
}

#[test]
fn builtin_registry_covers_every_extension() {
    let registry = Registry::<MemoryScene>::with_builtin();
    for name in [
        names::PHYSICS_SHAPE,
        names::PHYSICS_BODY,
        names::PHYSICS_JOINT,
        names::AUDIO_EMITTER,
        names::ENVIRONMENT_SKY,
        names::SPAWN_POINT,
        names::SEAT,
        names::LINK,
        names::PERSONALITY,
    ] {
        assert!(registry.has_handler(name), "{name}");
    }
    assert_eq!(registry.names().len(), 9);
}
