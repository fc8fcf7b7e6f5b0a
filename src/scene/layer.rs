use crate::foundation::core::Point;
use crate::foundation::ids::{LayerId, NodeId};
use crate::scene::node::Node;

/// Ordered, named group of nodes. Draw order is vector order.
///
/// While locked, every mutator except [`Layer::set_locked`] refuses and reports `false`/`None`.
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    name: String,
    visible: bool,
    locked: bool,
    nodes: Vec<Node>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LayerId::fresh(),
            name: name.into(),
            visible: true,
            locked: false,
            nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    fn refuse(&self, what: &str) -> bool {
        if self.locked {
            tracing::debug!(layer = self.id.0, op = what, "layer is locked");
        }
        self.locked
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        if self.refuse("rename") {
            return false;
        }
        self.name = name.into();
        true
    }

    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.refuse("set_visible") {
            return false;
        }
        self.visible = visible;
        true
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.refuse("node_mut") {
            return None;
        }
        self.nodes.iter_mut().find(|n| n.id() == id)
    }

    /// All nodes for in-place mutation, or `None` while locked.
    pub fn nodes_mut(&mut self) -> Option<&mut [Node]> {
        if self.refuse("nodes_mut") {
            return None;
        }
        Some(&mut self.nodes)
    }

    /// Append on top of the draw order. A locked layer drops the node.
    pub fn push_node(&mut self, node: Node) -> Option<NodeId> {
        if self.refuse("push_node") {
            return None;
        }
        let id = node.id();
        self.nodes.push(node);
        Some(id)
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        if self.refuse("remove_node") {
            return None;
        }
        let idx = self.nodes.iter().position(|n| n.id() == id)?;
        Some(self.nodes.remove(idx))
    }

    /// Remove every node whose id satisfies `pred`, returning the removed nodes.
    pub fn remove_where(&mut self, mut pred: impl FnMut(NodeId) -> bool) -> Vec<Node> {
        if self.refuse("remove_where") {
            return Vec::new();
        }
        let (removed, kept) = std::mem::take(&mut self.nodes)
            .into_iter()
            .partition(|n| pred(n.id()));
        self.nodes = kept;
        removed
    }

    /// Topmost node whose shape contains `p` (canvas space).
    pub fn node_at(&self, p: Point) -> Option<&Node> {
        self.nodes.iter().rev().find(|n| n.hit_point(p))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;
