pub(crate) mod cache;
pub(crate) mod pipeline;
pub(crate) mod renderer;
