//! Interactive placement: pointer gestures over a preview rectangle mapped onto a normalized
//! [`Placement`](crate::config::Placement).

pub(crate) mod gesture;
pub(crate) mod preview;
