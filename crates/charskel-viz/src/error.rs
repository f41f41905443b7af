use charskel_image::{ImageError, ImageSize};
use charskel_io::IoError;

/// An error type for building and rendering figures.
#[derive(thiserror::Error, Debug)]
pub enum VizError {
    /// A panel or overlay does not have the size of the other panels.
    #[error("Panel size {0} does not match the figure panel size {1}")]
    PanelSizeMismatch(ImageSize, ImageSize),

    /// Every cell of the grid already holds a panel.
    #[error("Figure grid of {0}x{1} cells is full")]
    GridOverflow(usize, usize),

    /// The figure has nothing to render.
    #[error("Figure has no panels")]
    EmptyFigure,

    /// The upscaling factor must be at least one.
    #[error("Invalid render scale {0}")]
    InvalidScale(usize),

    /// The rendered composite would hold more pixels than allowed.
    #[error("Figure rendered at scale {0} exceeds {1} pixels")]
    CanvasTooLarge(usize, usize),

    /// Error from an image operation.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// Error while writing the figure to disk.
    #[error(transparent)]
    IoError(#[from] IoError),

    /// Error while logging to the viewer.
    #[error(transparent)]
    RecordingError(#[from] rerun::RecordingStreamError),
}
