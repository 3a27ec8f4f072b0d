use std::path::Path;

use embed_layout::{
    DragEvent, InteractionController, Layout, LayoutConfig, LayoutError, Notification, Rect,
    build_layout, export_model, parse_document,
};

fn load_fixture(rel: &str) -> embed_layout::Result<Layout> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel);
    assert!(path.exists(), "fixture missing: {}", rel);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    let document = parse_document(&input).expect("parse failed");
    build_layout(document, LayoutConfig::default())
}

fn drag(layout: &mut Layout, node: &str, x: f32, y: f32) -> Vec<Notification> {
    let mut controller = InteractionController::new();
    let mut notes = Vec::new();
    for event in [
        DragEvent::Start {
            node: node.to_string(),
        },
        DragEvent::Move {
            node: node.to_string(),
            x,
            y,
        },
        DragEvent::End {
            node: node.to_string(),
        },
    ] {
        notes.extend(controller.handle(layout, event).expect("drag failed"));
    }
    notes
}

fn fitted(notes: &[Notification]) -> Vec<&str> {
    notes
        .iter()
        .filter_map(|note| match note {
            Notification::ContainerFitted { node, .. } => Some(node.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn valid_fixtures_round_trip() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = ["nested.json", "flat.json5", "deep.json"];

    for rel in candidates {
        let layout = load_fixture(rel).unwrap_or_else(|err| panic!("{rel}: {err}"));
        let exported = export_model(&layout);
        let model = layout.model();

        let exported_ids: Vec<&String> = exported.nodes.keys().collect();
        let model_ids: Vec<&String> = model.nodes().map(|node| &node.id).collect();
        assert_eq!(exported_ids, model_ids, "{rel}: node keys");
        for node in model.nodes() {
            let raw = &exported.nodes[&node.id];
            assert_eq!(raw.kind.as_deref(), Some(node.kind.as_str()), "{rel}");
            assert_eq!(raw.parent_id, node.parent_id, "{rel}");
        }
        assert_eq!(exported.links.len(), model.link_count(), "{rel}: links");
        for link in model.links() {
            let raw = &exported.links[&link.id];
            assert_eq!(raw.source.id, link.source.node);
            assert_eq!(raw.target.port, link.target.port);
        }

        // Re-importing the export reproduces the same topology.
        let again = embed_layout::build_model(&exported, &LayoutConfig::default()).unwrap();
        assert_eq!(again.node_count(), model.node_count(), "{rel}");
        for node in model.nodes() {
            assert_eq!(
                again.node(&node.id).unwrap().children(),
                node.children(),
                "{rel}"
            );
            assert_eq!(
                again.node(&node.id).unwrap().link_ids(),
                node.link_ids(),
                "{rel}"
            );
        }
    }
}

#[test]
fn invalid_fixtures_are_rejected() {
    assert_eq!(
        load_fixture("bad_orientation.json").unwrap_err(),
        LayoutError::InvalidOrientation {
            port: "p".to_string(),
            value: "north".to_string(),
        }
    );
    assert_eq!(
        load_fixture("missing_type.json").unwrap_err(),
        LayoutError::MissingType {
            node: "b".to_string(),
        }
    );
}

#[test]
fn every_link_reaches_every_ancestor_once() {
    for rel in ["nested.json", "deep.json"] {
        let layout = load_fixture(rel).unwrap();
        let model = layout.model();
        for link in model.links() {
            for endpoint in [&link.source.node, &link.target.node] {
                let mut chain = vec![endpoint.clone()];
                chain.extend(model.ancestors(endpoint).unwrap());
                for id in chain {
                    let count = model
                        .node(&id)
                        .unwrap()
                        .link_ids()
                        .iter()
                        .filter(|candidate| *candidate == &link.id)
                        .count();
                    assert_eq!(count, 1, "{rel}: link {} on {id}", link.id);
                }
            }
        }
    }
}

#[test]
fn fit_all_encloses_nested_services() {
    let mut layout = load_fixture("nested.json").unwrap();
    layout.fit_all().unwrap();
    let model = layout.model();

    assert_eq!(
        model.node("service").unwrap().bounds(),
        Rect::new(20.0, 40.0, 120.0, 180.0)
    );
    assert_eq!(
        model.node("system").unwrap().bounds(),
        Rect::new(60.0, 60.0, 140.0, 220.0)
    );
    assert_eq!(
        model.world_bounds("parse").unwrap(),
        Rect::new(80.0, 120.0, 100.0, 50.0)
    );
}

#[test]
fn deep_drag_fits_each_frame_once_inner_to_outer() {
    let mut layout = load_fixture("deep.json").unwrap();
    layout.fit_all().unwrap();
    let notes = drag(&mut layout, "x", 40.0, 80.0);
    assert_eq!(fitted(&notes), vec!["f3", "f2", "f1", "f0"]);

    let mut links: Vec<&str> = notes
        .iter()
        .filter_map(|note| match note {
            Notification::LinkChanged { link, segment } => {
                assert_eq!(*segment, layout.link_segment(link).unwrap());
                Some(link.as_str())
            }
            _ => None,
        })
        .collect();
    links.sort();
    assert_eq!(links, vec!["frame-z", "xy", "xz"]);

    let model = layout.model();
    let pad = layout.config().padding;
    // x was dragged right and down, so it bounds f3 on the left and y on the top.
    let x = model.world_bounds("x").unwrap();
    let y = model.world_bounds("y").unwrap();
    let f3 = model.world_bounds("f3").unwrap();
    assert_eq!(f3.x, x.x - pad.left);
    assert_eq!(f3.y, y.y - pad.top);
    assert_eq!(f3.right(), y.right() + pad.right);
    assert_eq!(f3.bottom(), x.bottom() + pad.bottom);
}

#[test]
fn flat_move_only_touches_the_node() {
    let mut layout = load_fixture("flat.json5").unwrap();
    let notes = drag(&mut layout, "a", -20.0, 15.0);
    assert!(fitted(&notes).is_empty());
    assert!(notes.contains(&Notification::NodeChanged {
        node: "a".to_string(),
        local: Rect::new(-20.0, 15.0, 100.0, 50.0),
        world: Rect::new(-20.0, 15.0, 100.0, 50.0),
    }));
    let segment = layout.link_segment("ab").unwrap();
    assert_eq!((segment.source.x, segment.source.y), (83.5, 40.0));
}

#[test]
fn export_rounds_to_two_decimals() {
    let layout = load_fixture("flat.json5").unwrap();
    let exported = export_model(&layout);
    let b = &exported.nodes["b"];
    assert_eq!(b.x, Some(200.12));
    assert_eq!(b.y, Some(10.99));
    assert_eq!(b.width, Some(80.0));
    assert_eq!(b.height, Some(50.0));
    assert_eq!(b.kind.as_deref(), Some("box"));
}
