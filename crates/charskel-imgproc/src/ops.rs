use charskel_image::{Image, ImageError};

use crate::parallel;

fn check_size<T, U>(src: &Image<T, 1>, dst: &Image<U, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Convert a mask to floating point, 1.0 for foreground and 0.0 for background.
pub fn mask_to_f32(src: &Image<bool, 1>, dst: &mut Image<f32, 1>) -> Result<(), ImageError> {
    check_size(src, dst)?;

    parallel::par_iter_rows_val(src, dst, |&fg, out| {
        *out = if fg { 1.0 } else { 0.0 };
    });

    Ok(())
}

/// Keep the values of `src` where `mask` is set and write zero elsewhere.
///
/// # Arguments
///
/// * `src` - The input values, e.g. a distance map.
/// * `mask` - The mask selecting the values to keep.
/// * `dst` - The masked output.
///
/// # Examples
///
/// ```
/// use charskel_image::{Image, ImageSize};
/// use charskel_imgproc::ops::apply_mask;
///
/// let size = ImageSize { width: 3, height: 1 };
/// let distance = Image::<f32, 1>::new(size, vec![1.0, 2.0, 1.0]).unwrap();
/// let skeleton = Image::<bool, 1>::new(size, vec![false, true, false]).unwrap();
/// let mut out = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
///
/// apply_mask(&distance, &skeleton, &mut out).unwrap();
/// assert_eq!(out.as_slice(), &[0.0, 2.0, 0.0]);
/// ```
pub fn apply_mask(
    src: &Image<f32, 1>,
    mask: &Image<bool, 1>,
    dst: &mut Image<f32, 1>,
) -> Result<(), ImageError> {
    check_size(src, mask)?;
    check_size(src, dst)?;

    parallel::par_iter_rows_val_two(src, mask, dst, |&v, &keep, out| {
        *out = if keep { v } else { 0.0 };
    });

    Ok(())
}

/// Count the foreground pixels of a mask.
pub fn count_nonzero(src: &Image<bool, 1>) -> usize {
    src.as_slice().iter().filter(|&&fg| fg).count()
}

#[cfg(test)]
mod tests {
    use charskel_image::{Image, ImageError, ImageSize};

    #[test]
    fn mask_to_f32_and_count() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 1,
        };
        let mask = Image::<bool, 1>::new(size, vec![false, true, true, false])?;
        assert_eq!(super::count_nonzero(&mask), 2);

        let mut values = Image::<f32, 1>::from_size_val(size, -1.0)?;
        super::mask_to_f32(&mask, &mut values)?;
        assert_eq!(values.as_slice(), &[0.0, 1.0, 1.0, 0.0]);

        Ok(())
    }

    #[test]
    fn apply_mask_size_mismatch() -> Result<(), ImageError> {
        let values = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            1.0,
        )?;
        let mask = Image::<bool, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 3,
            },
            true,
        )?;
        let mut out = Image::<f32, 1>::from_size_val(values.size(), 0.0)?;

        assert_eq!(
            super::apply_mask(&values, &mask, &mut out),
            Err(ImageError::InvalidImageSize(2, 2, 2, 3))
        );

        Ok(())
    }
}
