use std::path::Path;

use charskel_image::{Image, ImageError, ImageSize};
use charskel_imgproc::{
    contours::{find_contours, Contour},
    draw::draw_polyline,
    ops::mask_to_f32,
    parallel,
};
use charskel_io::png::write_image_png_rgb8;

use crate::colormap::{apply_colormap, Colormap};
use crate::error::VizError;

// gap between panels and around the grid, in output pixels
const MARGIN: usize = 4;
const BACKGROUND: [u8; 3] = [255, 255, 255];

/// Largest composite [`Figure::render`] allocates, in pixels.
pub const MAX_CANVAS_PIXELS: usize = 1 << 26;

/// The raster shown by a panel.
#[derive(Clone, Debug)]
pub enum PanelData {
    /// A grayscale image, shown with its intensities.
    Gray(Image<u8, 1>),
    /// A binary mask, background at the low end of the colormap.
    Mask(Image<bool, 1>),
    /// A scalar image, normalized by its largest finite value.
    Scalar(Image<f32, 1>),
}

impl PanelData {
    /// The size of the raster.
    pub fn size(&self) -> ImageSize {
        match self {
            PanelData::Gray(img) => img.size(),
            PanelData::Mask(img) => img.size(),
            PanelData::Scalar(img) => img.size(),
        }
    }
}

impl From<Image<u8, 1>> for PanelData {
    fn from(img: Image<u8, 1>) -> Self {
        PanelData::Gray(img)
    }
}

impl From<Image<bool, 1>> for PanelData {
    fn from(img: Image<bool, 1>) -> Self {
        PanelData::Mask(img)
    }
}

impl From<Image<f32, 1>> for PanelData {
    fn from(img: Image<f32, 1>) -> Self {
        PanelData::Scalar(img)
    }
}

/// Polylines drawn on top of a panel.
#[derive(Clone, Debug)]
pub struct Overlay {
    size: ImageSize,
    contours: Vec<Contour>,
    color: [u8; 3],
}

impl Overlay {
    /// Trace the iso-lines of a mask.
    ///
    /// # Arguments
    ///
    /// * `mask` - The mask to outline; true maps to 1.0 and false to 0.0.
    /// * `level` - The iso-value, 0.5 follows the boundary between pixels.
    /// * `color` - The color of the lines.
    pub fn contours(mask: &Image<bool, 1>, level: f32, color: [u8; 3]) -> Result<Self, ImageError> {
        let mut values = Image::from_size_val(mask.size(), 0.0f32)?;
        mask_to_f32(mask, &mut values)?;

        Ok(Self {
            size: mask.size(),
            contours: find_contours(&values, level),
            color,
        })
    }

    /// The traced contours.
    pub fn polylines(&self) -> &[Contour] {
        &self.contours
    }

    /// The color of the lines.
    pub fn color(&self) -> [u8; 3] {
        self.color
    }
}

/// A titled cell of a [`Figure`].
#[derive(Clone, Debug)]
pub struct Panel {
    title: String,
    data: PanelData,
    colormap: Colormap,
    overlays: Vec<Overlay>,
}

impl Panel {
    /// Create a panel with the gray colormap and no overlays.
    pub fn new(title: impl Into<String>, data: impl Into<PanelData>) -> Self {
        Self {
            title: title.into(),
            data: data.into(),
            colormap: Colormap::default(),
            overlays: Vec::new(),
        }
    }

    /// Set the colormap of the panel.
    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    /// Add an overlay drawn on top of the panel.
    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlays.push(overlay);
        self
    }

    /// The title of the panel.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The size of the raster.
    pub fn size(&self) -> ImageSize {
        self.data.size()
    }

    /// The overlays of the panel.
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Map the raster to RGB with the panel colormap.
    ///
    /// Gray intensities are divided by 255, masks map to the two ends of the colormap and
    /// scalar rasters are normalized by their largest finite value.
    pub fn to_rgb(&self) -> Result<Image<u8, 3>, ImageError> {
        let mut rgb = Image::from_size_val(self.size(), 0u8)?;
        let colormap = self.colormap;
        match &self.data {
            PanelData::Gray(img) => parallel::par_iter_rows(img, &mut rgb, |src, dst| {
                dst.copy_from_slice(&colormap.map(src[0] as f32 / 255.0));
            }),
            PanelData::Mask(img) => parallel::par_iter_rows(img, &mut rgb, |src, dst| {
                dst.copy_from_slice(&colormap.map(if src[0] { 1.0 } else { 0.0 }));
            }),
            PanelData::Scalar(img) => apply_colormap(img, &mut rgb, colormap)?,
        }
        Ok(rgb)
    }
}

/// A grid of panels sharing one raster size.
///
/// # Examples
///
/// ```
/// use charskel_image::{Image, ImageSize};
/// use charskel_viz::{Figure, Panel};
///
/// let size = ImageSize { width: 3, height: 2 };
/// let mut figure = Figure::new("demo", 1, 2);
/// figure.add_panel(Panel::new("gray", Image::<u8, 1>::from_size_val(size, 10).unwrap())).unwrap();
/// figure.add_panel(Panel::new("mask", Image::<bool, 1>::from_size_val(size, true).unwrap())).unwrap();
///
/// let composite = figure.render(2).unwrap();
/// assert_eq!(composite.size(), ImageSize { width: 24, height: 12 });
/// ```
#[derive(Clone, Debug)]
pub struct Figure {
    title: String,
    rows: usize,
    cols: usize,
    panels: Vec<Panel>,
}

impl Figure {
    /// Create an empty figure of `rows` x `cols` cells.
    pub fn new(title: impl Into<String>, rows: usize, cols: usize) -> Self {
        Self {
            title: title.into(),
            rows,
            cols,
            panels: Vec::with_capacity(rows * cols),
        }
    }

    /// The title of the figure.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The panels in row-major order.
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Place a panel in the next free cell, filling the grid row by row.
    ///
    /// The panel and its overlays must have the size of the panels already added.
    pub fn add_panel(&mut self, panel: Panel) -> Result<(), VizError> {
        if self.panels.len() >= self.rows * self.cols {
            return Err(VizError::GridOverflow(self.rows, self.cols));
        }

        let expected = self.panels.first().map_or(panel.size(), Panel::size);
        let sizes = std::iter::once(panel.size()).chain(panel.overlays.iter().map(|o| o.size));
        for size in sizes {
            if size != expected {
                return Err(VizError::PanelSizeMismatch(size, expected));
            }
        }

        self.panels.push(panel);
        Ok(())
    }

    /// Compose the panels into one RGB image.
    ///
    /// Every panel is upscaled by `scale` with nearest-neighbor sampling, its overlays are
    /// drawn on top and the cells are separated by a white margin. Empty cells stay white.
    ///
    /// Fails with [`VizError::CanvasTooLarge`] when the composite would exceed
    /// [`MAX_CANVAS_PIXELS`].
    pub fn render(&self, scale: usize) -> Result<Image<u8, 3>, VizError> {
        if scale == 0 {
            return Err(VizError::InvalidScale(scale));
        }
        let panel_size = self
            .panels
            .first()
            .map(Panel::size)
            .ok_or(VizError::EmptyFigure)?;

        let size = canvas_size(panel_size, self.rows, self.cols, scale)
            .filter(|size| size.area() <= MAX_CANVAS_PIXELS)
            .ok_or(VizError::CanvasTooLarge(scale, MAX_CANVAS_PIXELS))?;
        let (cell_w, cell_h) = (panel_size.width * scale, panel_size.height * scale);

        let mut canvas = Image::<u8, 3>::from_size_val(size, 0)?;
        canvas
            .as_slice_mut()
            .chunks_exact_mut(3)
            .for_each(|p| p.copy_from_slice(&BACKGROUND));

        let thickness = (scale / 4).max(1);
        for (k, panel) in self.panels.iter().enumerate() {
            let x0 = MARGIN + (k % self.cols) * (cell_w + MARGIN);
            let y0 = MARGIN + (k / self.cols) * (cell_h + MARGIN);

            blit_scaled(&panel.to_rgb()?, &mut canvas, (x0, y0), scale);

            for overlay in &panel.overlays {
                for contour in &overlay.contours {
                    draw_polyline(
                        &mut canvas,
                        &contour.points,
                        (x0 as i64, y0 as i64),
                        scale as f32,
                        overlay.color,
                        thickness,
                    );
                }
            }
        }

        log::debug!("rendered figure '{}' at {}", self.title, size);

        Ok(canvas)
    }

    /// Log every panel to a recording stream.
    ///
    /// Panels land under `<figure>/<panel>` and their overlays under
    /// `<figure>/<panel>/contours`.
    pub fn log(&self, rec: &rerun::RecordingStream) -> Result<(), VizError> {
        let root = entity_name(&self.title);

        for panel in &self.panels {
            let path = format!("{root}/{}", entity_name(&panel.title));
            let rgb = panel.to_rgb()?;

            rec.log(
                path.as_str(),
                &rerun::Image::from_elements(
                    rgb.as_slice(),
                    rgb.size().into(),
                    rerun::ColorModel::RGB,
                ),
            )?;

            for (i, overlay) in panel.overlays.iter().enumerate() {
                // rerun puts pixel centers at half-integer coordinates
                let strips = overlay
                    .contours
                    .iter()
                    .map(|c| {
                        c.points
                            .iter()
                            .map(|p| [p[0] + 0.5, p[1] + 0.5])
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>();

                rec.log(
                    format!("{path}/contours_{i}").as_str(),
                    &rerun::LineStrips2D::new(strips).with_colors([overlay.color]),
                )?;
            }
        }

        Ok(())
    }

    /// Spawn a rerun viewer and log the figure to it.
    pub fn show(&self) -> Result<(), VizError> {
        let rec = rerun::RecordingStreamBuilder::new(self.title.as_str()).spawn()?;
        self.log(&rec)?;
        log::info!("figure '{}' sent to the viewer", self.title);
        Ok(())
    }

    /// Render the figure and write it as a PNG file.
    pub fn save(&self, file_path: impl AsRef<Path>, scale: usize) -> Result<(), VizError> {
        let canvas = self.render(scale)?;
        write_image_png_rgb8(file_path.as_ref(), &canvas)?;
        log::info!("figure '{}' saved to {:?}", self.title, file_path.as_ref());
        Ok(())
    }
}

// None on overflow
fn canvas_size(panel: ImageSize, rows: usize, cols: usize, scale: usize) -> Option<ImageSize> {
    let side = |cells: usize, len: usize| {
        let cell = len.checked_mul(scale)?;
        cells
            .checked_mul(cell)?
            .checked_add(cells.checked_add(1)?.checked_mul(MARGIN)?)
    };
    let size = ImageSize {
        width: side(cols, panel.width)?,
        height: side(rows, panel.height)?,
    };
    size.width.checked_mul(size.height)?;
    Some(size)
}

fn blit_scaled(src: &Image<u8, 3>, dst: &mut Image<u8, 3>, origin: (usize, usize), scale: usize) {
    let dst_cols = dst.cols();
    let src_cols = src.cols();
    let data = dst.as_slice_mut();

    for (y, row) in src.as_slice().chunks_exact(3 * src_cols.max(1)).enumerate() {
        for (x, pixel) in row.chunks_exact(3).enumerate() {
            for dy in 0..scale {
                let start = ((origin.1 + y * scale + dy) * dst_cols + origin.0 + x * scale) * 3;
                data[start..start + 3 * scale]
                    .chunks_exact_mut(3)
                    .for_each(|p| p.copy_from_slice(pixel));
            }
        }
    }
}

fn entity_name(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
