//! Skeletonization and thinning of binary images.
//!
//! Every routine treats `true` as foreground with 8-connectivity and pixels outside the
//! image as background.

mod neighborhood;

/// Medial axis transform.
mod medial_axis;
pub use medial_axis::medial_axis;

/// Lookup table driven parallel skeletonization.
mod skeletonize;
pub use skeletonize::skeletonize;

/// Topology preserving 3-D thinning.
mod skeletonize_3d;
pub use skeletonize_3d::{skeletonize_3d, skeletonize_3d_volume};

/// Guo-Hall thinning with an optional iteration cap.
mod thin;
pub use thin::thin;
