pub(crate) mod effect;
pub(crate) mod graph;
pub(crate) mod jobs;
pub(crate) mod layer;
pub(crate) mod node;
pub(crate) mod snapshot;
