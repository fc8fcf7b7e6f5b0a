pub(crate) mod editor;
pub(crate) mod script;
pub(crate) mod selection;
pub(crate) mod tool;
