use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique node identifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Process-wide unique layer identifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LayerId(pub u64);

impl LayerId {
    pub fn fresh() -> Self {
        Self(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Key of a [`crate::RenderCache`] entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Node(NodeId),
    /// The single checkerboard bitmap backing the safe-zone overlay.
    SafeZone,
}

impl From<NodeId> for CacheKey {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}
