use charskel_image::{Image, ImageError};
use charskel_imgproc::parallel;

// magma sampled at t = 0, 1/8, ..., 1
const MAGMA: [[u8; 3]; 9] = [
    [0, 0, 4],
    [28, 16, 68],
    [79, 18, 123],
    [129, 37, 129],
    [181, 54, 122],
    [229, 80, 100],
    [251, 135, 97],
    [254, 194, 135],
    [252, 253, 191],
];

/// Mapping from a normalized scalar in `[0, 1]` to an RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Colormap {
    /// Black to white.
    #[default]
    Gray,
    /// Perceptually uniform black, purple, orange, light yellow ramp.
    Magma,
}

impl Colormap {
    /// Map a normalized value to a color.
    ///
    /// Values are clamped to `[0, 1]` and NaN maps to the low end.
    ///
    /// # Examples
    ///
    /// ```
    /// use charskel_viz::Colormap;
    ///
    /// assert_eq!(Colormap::Gray.map(1.0), [255, 255, 255]);
    /// assert_eq!(Colormap::Magma.map(0.0), [0, 0, 4]);
    /// ```
    pub fn map(&self, t: f32) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Colormap::Gray => {
                let v = (t * 255.0).round() as u8;
                [v, v, v]
            }
            Colormap::Magma => {
                let pos = t * (MAGMA.len() - 1) as f32;
                let i = (pos.floor() as usize).min(MAGMA.len() - 2);
                let frac = pos - i as f32;
                let (lo, hi) = (MAGMA[i], MAGMA[i + 1]);
                let mut rgb = [0u8; 3];
                for (c, v) in rgb.iter_mut().enumerate() {
                    *v = (lo[c] as f32 + (hi[c] as f32 - lo[c] as f32) * frac).round() as u8;
                }
                rgb
            }
        }
    }
}

/// Color a scalar image, normalized by its largest finite value.
///
/// Negative values map to the low end and values above the finite maximum, infinities
/// included, to the high end. An image without a positive finite value maps entirely to
/// the low end.
///
/// # Arguments
///
/// * `src` - The input scalar image.
/// * `dst` - The output RGB image.
/// * `colormap` - The colormap to apply.
pub fn apply_colormap(
    src: &Image<f32, 1>,
    dst: &mut Image<u8, 3>,
    colormap: Colormap,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let max = src
        .as_slice()
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f32, f32::max);
    let scale = if max > 0.0 { 1.0 / max } else { 0.0 };

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel.copy_from_slice(&colormap.map(src_pixel[0] * scale));
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_colormap, Colormap};
    use charskel_image::{Image, ImageError, ImageSize};

    #[test]
    fn colormap_endpoints() {
        assert_eq!(Colormap::Gray.map(0.0), [0, 0, 0]);
        assert_eq!(Colormap::Gray.map(1.0), [255, 255, 255]);
        assert_eq!(Colormap::Magma.map(0.0), [0, 0, 4]);
        assert_eq!(Colormap::Magma.map(1.0), [252, 253, 191]);
        assert_eq!(Colormap::Magma.map(0.5), [181, 54, 122]);
        // out of range
        assert_eq!(Colormap::Magma.map(-3.0), [0, 0, 4]);
        assert_eq!(Colormap::Magma.map(7.0), [252, 253, 191]);
        assert_eq!(Colormap::Gray.map(f32::NAN), [0, 0, 0]);
    }

    #[test]
    fn apply_colormap_normalizes_by_finite_max() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 1,
        };
        let src = Image::<f32, 1>::new(size, vec![0.0, 1.0, 2.0, f32::INFINITY])?;
        let mut dst = Image::<u8, 3>::from_size_val(size, 0)?;
        apply_colormap(&src, &mut dst, Colormap::Gray)?;

        assert_eq!(
            dst.as_slice(),
            &[0, 0, 0, 128, 128, 128, 255, 255, 255, 255, 255, 255]
        );

        Ok(())
    }

    #[test]
    fn apply_colormap_all_zero() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let src = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut dst = Image::<u8, 3>::from_size_val(size, 9)?;
        apply_colormap(&src, &mut dst, Colormap::Magma)?;

        assert!(dst.as_slice().chunks_exact(3).all(|p| p == [0, 0, 4]));

        Ok(())
    }
}
