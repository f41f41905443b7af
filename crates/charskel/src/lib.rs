#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use charskel_image as image;

#[doc(inline)]
pub use charskel_imgproc as imgproc;

#[doc(inline)]
pub use charskel_io as io;

#[doc(inline)]
pub use charskel_viz as viz;
