#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use surgnav_calib as calib;

#[doc(inline)]
pub use surgnav_projection as projection;
