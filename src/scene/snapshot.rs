use serde::Serialize;

use crate::foundation::core::Color;
use crate::foundation::ids::{LayerId, NodeId};
use crate::scene::layer::Layer;
use crate::scene::node::{Node, NodeKind};

/// Read-only view of a node for chrome panels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub colour: Color,
    pub z_index: i32,
    pub has_image: bool,
    pub effects: Vec<String>,
}

impl From<&Node> for NodeSnapshot {
    fn from(n: &Node) -> Self {
        Self {
            id: n.id(),
            kind: n.kind(),
            x: n.x(),
            y: n.y(),
            width: n.width(),
            height: n.height(),
            rotation: n.rotation(),
            colour: n.colour(),
            z_index: n.z_index(),
            has_image: n.image().is_some(),
            effects: n.effects().iter().map(|e| e.name().to_owned()).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayerSnapshot {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub nodes: Vec<NodeSnapshot>,
}

impl From<&Layer> for LayerSnapshot {
    fn from(l: &Layer) -> Self {
        Self {
            id: l.id(),
            name: l.name().to_owned(),
            visible: l.is_visible(),
            locked: l.is_locked(),
            nodes: l.nodes().iter().map(NodeSnapshot::from).collect(),
        }
    }
}
