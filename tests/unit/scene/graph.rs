use super::*;
use crate::foundation::core::{Color, Size};
use crate::raster::bitmap::Bitmap;
use crate::scene::node::NodeKind;

fn node_at(x: f64, y: f64) -> Node {
    Node::new(NodeKind::Rectangle, Point::new(x, y), Size::new(10.0, 10.0), Color::BLACK)
}

#[test]
fn ensure_active_layer_creates_once() {
    let mut scene = Scene::new();
    let a = scene.ensure_active_layer();
    let b = scene.ensure_active_layer();
    assert_eq!(a, b);
    assert_eq!(scene.layers().len(), 1);
    assert_eq!(scene.layers()[0].name(), "Layer 1");
}

#[test]
fn deleting_a_layer_evicts_its_nodes() {
    let mut scene = Scene::new();
    let mut cache = RenderCache::new();
    let lid = scene.on_layer_create();
    let ids: Vec<NodeId> = (0..3)
        .filter_map(|i| {
            scene
                .layer_mut(lid)
                .and_then(|l| l.push_node(node_at(f64::from(i), 0.0)))
        })
        .collect();
    let other = scene.on_layer_create();
    let keep = scene
        .layer_mut(other)
        .and_then(|l| l.push_node(node_at(0.0, 0.0)))
        .unwrap();
    for id in ids.iter().chain([&keep]) {
        cache.insert(*id, 0, Bitmap::transparent(1, 1));
    }

    assert!(scene.on_layer_delete(lid, &mut cache));
    for id in &ids {
        assert!(!cache.contains(*id));
    }
    assert!(cache.contains(keep));
    assert_eq!(scene.layers().len(), 1);
}

#[test]
fn locked_layer_cannot_be_deleted() {
    let mut scene = Scene::new();
    let mut cache = RenderCache::new();
    let lid = scene.on_layer_create();
    assert!(scene.on_layer_update(LayerUpdate {
        locked: Some(true),
        ..LayerUpdate::for_layer(lid)
    }));
    assert!(!scene.on_layer_delete(lid, &mut cache));
    assert_eq!(scene.layers().len(), 1);
}

#[test]
fn deleting_active_layer_moves_active_to_top() {
    let mut scene = Scene::new();
    let mut cache = RenderCache::new();
    let a = scene.on_layer_create();
    let b = scene.on_layer_create();
    assert_eq!(scene.active_layer_id(), Some(b));
    scene.on_layer_delete(b, &mut cache);
    assert_eq!(scene.active_layer_id(), Some(a));
    scene.on_layer_delete(a, &mut cache);
    assert_eq!(scene.active_layer_id(), None);
}

#[test]
fn update_respects_lock_ordering() {
    let mut scene = Scene::new();
    let lid = scene.on_layer_create();
    scene.on_layer_update(LayerUpdate {
        locked: Some(true),
        ..LayerUpdate::for_layer(lid)
    });

    assert!(!scene.on_layer_update(LayerUpdate {
        name: Some("nope".into()),
        ..LayerUpdate::for_layer(lid)
    }));
    assert_eq!(scene.layer(lid).map(Layer::name), Some("Layer 1"));

    assert!(scene.on_layer_update(LayerUpdate {
        name: Some("bg".into()),
        locked: Some(false),
        ..LayerUpdate::for_layer(lid)
    }));
    assert_eq!(scene.layer(lid).map(Layer::name), Some("bg"));

    assert!(scene.on_layer_update(LayerUpdate {
        visible: Some(false),
        locked: Some(true),
        ..LayerUpdate::for_layer(lid)
    }));
    let layer = scene.layer(lid).unwrap();
    assert!(!layer.is_visible());
    assert!(layer.is_locked());
}

#[test]
fn reorder_requires_a_permutation() {
    let mut scene = Scene::new();
    let a = scene.on_layer_create();
    let b = scene.on_layer_create();
    let c = scene.on_layer_create();
    assert!(!scene.on_layer_reorder(&[a, b]));
    assert!(!scene.on_layer_reorder(&[a, a, b]));
    assert!(!scene.on_layer_reorder(&[a, b, LayerId(u64::MAX)]));
    assert!(scene.on_layer_reorder(&[c, a, b]));
    let order: Vec<LayerId> = scene.layers().iter().map(Layer::id).collect();
    assert_eq!(order, vec![c, a, b]);
}

#[test]
fn topmost_hit_skips_hidden_layers() {
    let mut scene = Scene::new();
    let low = scene.on_layer_create();
    let below = scene
        .layer_mut(low)
        .and_then(|l| l.push_node(node_at(0.0, 0.0)))
        .unwrap();
    let high = scene.on_layer_create();
    let above = scene
        .layer_mut(high)
        .and_then(|l| l.push_node(node_at(0.0, 0.0)))
        .unwrap();

    assert_eq!(scene.topmost_hit(Point::new(5.0, 5.0)), Some(above));
    scene.on_layer_update(LayerUpdate {
        visible: Some(false),
        ..LayerUpdate::for_layer(high)
    });
    assert_eq!(scene.topmost_hit(Point::new(5.0, 5.0)), Some(below));
}

#[test]
fn remove_nodes_skips_locked_layers() {
    let mut scene = Scene::new();
    let mut cache = RenderCache::new();
    let l1 = scene.on_layer_create();
    let n1 = scene.layer_mut(l1).and_then(|l| l.push_node(node_at(0.0, 0.0))).unwrap();
    let l2 = scene.on_layer_create();
    let n2 = scene.layer_mut(l2).and_then(|l| l.push_node(node_at(0.0, 0.0))).unwrap();
    scene.on_layer_update(LayerUpdate {
        locked: Some(true),
        ..LayerUpdate::for_layer(l2)
    });

    let ids: HashSet<NodeId> = [n1, n2].into_iter().collect();
    assert_eq!(scene.remove_nodes(&ids, &mut cache), 1);
    assert!(!scene.contains_node(n1));
    assert!(scene.contains_node(n2));
    assert!(scene.node_mut(n2).is_none());
}

#[test]
fn snapshots_mirror_layers() {
    let mut scene = Scene::new();
    let lid = scene.on_layer_create();
    scene.layer_mut(lid).and_then(|l| l.push_node(node_at(3.0, 4.0)));
    let snaps = scene.snapshots();
    assert_eq!(snaps.len(), 1);
    assert_eq!(snaps[0].nodes[0].x, 3.0);
    let json = serde_json::to_value(&snaps).unwrap();
    assert_eq!(json[0]["nodes"][0]["kind"], "rectangle");
    assert_eq!(json[0]["nodes"][0]["colour"], "#000000");
}
