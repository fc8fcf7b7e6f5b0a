pub(crate) mod bitmap;
pub(crate) mod blur;
pub(crate) mod filter;
pub(crate) mod surface;
