#![deny(missing_docs)]
//! Image types and traits for generating and manipulating images

/// image representation for computer vision purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// dense binary and scalar volumes.
pub mod volume;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
pub use crate::volume::{Volume, VolumeSize};
