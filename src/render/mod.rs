pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod filter;
pub(crate) mod frame;
pub(crate) mod layout;
pub(crate) mod overlay;
pub(crate) mod surface;
