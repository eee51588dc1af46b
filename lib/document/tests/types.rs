use omi_document::{Document, Node, Scene};

#[test]
fn parents_follow_children() {
    let mut doc = Document::default();
    doc.nodes.push(Node {
        children: vec![1, 2],
        ..Node::named("root")
    });
    doc.nodes.push(Node::named("a"));
    doc.nodes.push(Node::named("b"));
    assert_eq!(doc.parents().unwrap(), vec![None, Some(0), Some(0)]);
}

#[test]
fn out_of_range_child_is_rejected() {
    let mut doc = Document::default();
    doc.nodes.push(Node {
        children: vec![4],
        ..Default::default()
    });
    assert!(doc.parents().is_err());
}

#[test]
fn extension_names_are_collected_once() {
    let mut doc = Document::default();
    doc.extensions
        .insert("OMI_physics_shape".to_owned(), serde_json::json!({"shapes": []}));
    let mut node = Node::default();
    node.extensions
        .insert("OMI_physics_body".to_owned(), serde_json::json!({}));
    doc.nodes.push(node.clone());
    doc.nodes.push(node);
    let mut scene = Scene::default();
    scene
        .extensions
        .insert("OMI_physics_shape".to_owned(), serde_json::json!({}));
    doc.scenes.push(scene);
    assert_eq!(
        doc.extension_names(),
        vec!["OMI_physics_shape".to_owned(), "OMI_physics_body".to_owned()]
    );
}

#[test]
fn write_then_read() {
    let mut doc = Document::default();
    doc.nodes.push(Node::named("thing"));
    doc.mark_used("OMI_link");
    doc.mark_used("OMI_link");
    doc.stamp_generator();
    let json = doc.to_json_string(false).unwrap();
    let back = Document::from_json_slice(json.as_bytes()).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.extensions_used, vec!["OMI_link".to_owned()]);
}

#[test]
fn unmark_used() {
    let mut doc = Document::default();
    doc.mark_used("OMI_seat");
    doc.mark_used("OMI_link");
    doc.extensions_required.push("OMI_seat".to_owned());
    doc.unmark_used("OMI_seat");
    assert_eq!(doc.extensions_used, vec!["OMI_link".to_owned()]);
    assert!(doc.extensions_required.is_empty());
}
