#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access and encoding/decoding failures.
pub mod error;

/// High-level image reading functions.
///
/// See [`functional::read_image_any_gray8`] for automatic format detection.
pub mod functional;

/// PNG image encoding and decoding.
pub mod png;

pub use error::IoError;
