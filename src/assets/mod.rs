pub(crate) mod decode;
pub(crate) mod payload;
pub(crate) mod svg;
