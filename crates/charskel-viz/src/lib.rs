#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// colormaps for scalar and binary panels.
pub mod colormap;

/// Error types for the visualization module.
pub mod error;

/// multi-panel figures.
pub mod figure;

pub use colormap::Colormap;
pub use error::VizError;
pub use figure::{Figure, Overlay, Panel, PanelData};
