use std::collections::HashSet;

use serde::Deserialize;

use crate::foundation::core::Point;
use crate::foundation::ids::{LayerId, NodeId};
use crate::render::cache::RenderCache;
use crate::scene::layer::Layer;
use crate::scene::node::Node;
use crate::scene::snapshot::LayerSnapshot;

/// Partial layer update issued by the layer panel. `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayerUpdate {
    pub id: Option<LayerId>,
    pub name: Option<String>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
}

impl LayerUpdate {
    pub fn for_layer(id: LayerId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

/// The ordered layer list plus the active-layer pointer.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    layers: Vec<Layer>,
    active: Option<LayerId>,
    created: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.layer(id))
    }

    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        let id = self.active?;
        self.layer_mut(id)
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        if self.layer(id).is_none() {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Active layer id, creating a layer first when there is none.
    pub fn ensure_active_layer(&mut self) -> LayerId {
        match self.active {
            Some(id) if self.layer(id).is_some() => id,
            _ => self.on_layer_create(),
        }
    }

    /// Append a new layer on top and make it active.
    pub fn on_layer_create(&mut self) -> LayerId {
        self.created += 1;
        let layer = Layer::new(format!("Layer {}", self.created));
        let id = layer.id();
        tracing::debug!(layer = id.0, "created layer");
        self.layers.push(layer);
        self.active = Some(id);
        id
    }

    /// Apply `update` to its layer (or the active one when `id` is absent).
    ///
    /// Unlocking happens before and locking after the other fields, so one update can both
    /// unlock and rename. Returns `false` when the layer is missing or a field was refused.
    pub fn on_layer_update(&mut self, update: LayerUpdate) -> bool {
        let Some(id) = update.id.or(self.active) else {
            return false;
        };
        let Some(layer) = self.layer_mut(id) else {
            return false;
        };
        let mut ok = true;
        if update.locked == Some(false) {
            layer.set_locked(false);
        }
        if let Some(name) = update.name {
            ok &= layer.set_name(name);
        }
        if let Some(visible) = update.visible {
            ok &= layer.set_visible(visible);
        }
        if update.locked == Some(true) {
            layer.set_locked(true);
        }
        ok
    }

    /// Remove a layer with its nodes and release their cache entries. Locked layers stay.
    pub fn on_layer_delete(&mut self, id: LayerId, cache: &mut RenderCache) -> bool {
        let Some(idx) = self.layers.iter().position(|l| l.id() == id) else {
            return false;
        };
        if self.layers[idx].is_locked() {
            tracing::debug!(layer = id.0, "refusing to delete locked layer");
            return false;
        }
        let layer = self.layers.remove(idx);
        cache.evict_for_layer(&layer);
        if self.active == Some(id) {
            self.active = self.layers.last().map(Layer::id);
        }
        true
    }

    /// Reorder layers to `order`, which must be a permutation of the current layer ids.
    pub fn on_layer_reorder(&mut self, order: &[LayerId]) -> bool {
        if order.len() != self.layers.len() {
            return false;
        }
        let unique: HashSet<LayerId> = order.iter().copied().collect();
        if unique.len() != order.len() || order.iter().any(|id| self.layer(*id).is_none()) {
            return false;
        }
        let mut old = std::mem::take(&mut self.layers);
        for id in order {
            if let Some(pos) = old.iter().position(|l| l.id() == *id) {
                self.layers.push(old.swap_remove(pos));
            }
        }
        true
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.layers.iter().find_map(|l| l.node(id))
    }

    /// Mutable node access; `None` when missing or its layer is locked.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let layer = self.layers.iter_mut().find(|l| l.contains(id))?;
        layer.node_mut(id)
    }

    pub fn layer_of(&self, id: NodeId) -> Option<LayerId> {
        self.layers.iter().find(|l| l.contains(id)).map(Layer::id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }

    /// Topmost visible node under `p` (canvas space): last layer first, last node first.
    pub fn topmost_hit(&self, p: Point) -> Option<NodeId> {
        self.layers
            .iter()
            .rev()
            .filter(|l| l.is_visible())
            .find_map(|l| l.node_at(p))
            .map(Node::id)
    }

    /// Remove the given nodes from every unlocked layer, evicting their cache entries.
    pub fn remove_nodes(&mut self, ids: &HashSet<NodeId>, cache: &mut RenderCache) -> usize {
        let mut removed = 0;
        for layer in self.layers.iter_mut().filter(|l| !l.is_locked()) {
            let gone = layer.remove_where(|id| ids.contains(&id));
            removed += gone.len();
            cache.evict_nodes(gone.iter().map(Node::id));
        }
        removed
    }

    pub fn snapshots(&self) -> Vec<LayerSnapshot> {
        self.layers.iter().map(LayerSnapshot::from).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
