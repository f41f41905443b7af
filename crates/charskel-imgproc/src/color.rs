use charskel_image::{Image, ImageError};

use crate::parallel;

/// Convert an RGB8 image to grayscale using fixed point weights.
///
/// The weights approximate `0.299 * R + 0.587 * G + 0.114 * B` with 8 bits of precision.
///
/// # Arguments
///
/// * `src` - The input RGB image.
/// * `dst` - The output grayscale image.
///
/// # Examples
///
/// ```
/// use charskel_image::{Image, ImageSize};
/// use charskel_imgproc::color::gray_from_rgb_u8;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize { width: 2, height: 1 },
///     vec![255, 255, 255, 0, 0, 0],
/// )
/// .unwrap();
///
/// let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
/// gray_from_rgb_u8(&image, &mut gray).unwrap();
///
/// assert_eq!(gray.as_slice(), &[255, 0]);
/// ```
pub fn gray_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let r = src_pixel[0] as u16;
        let g = src_pixel[1] as u16;
        let b = src_pixel[2] as u16;
        dst_pixel[0] = ((r * 77 + g * 150 + b * 29 + 128) >> 8) as u8;
    });

    Ok(())
}
