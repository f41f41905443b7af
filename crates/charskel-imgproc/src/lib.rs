#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// iso-line extraction module.
pub mod contours;

/// exact euclidean distance transform.
pub mod distance_transform;

/// utilities to draw on images.
pub mod draw;

/// image filtering module.
pub mod filter;

/// skeletonization and thinning of binary images.
pub mod morphology;

/// conversions between masks and numeric images.
pub mod ops;

/// module containing parallization utilities.
pub mod parallel;

/// operations to threshold images.
pub mod threshold;
