use charskel_image::{Image, ImageError};

use crate::{filter, parallel};

/// How the neighborhood of a pixel is weighted by [`threshold_local`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LocalThresholdMethod {
    /// Gaussian weights with `sigma = (block_size - 1) / 6`.
    #[default]
    Gaussian,
    /// Uniform weights over the `block_size x block_size` window.
    Mean,
}

/// Binarize a grayscale image into a mask, foreground being `pixel > threshold`.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output mask.
/// * `threshold` - The cut value.
///
/// # Examples
///
/// ```
/// use charskel_image::{Image, ImageSize};
/// use charskel_imgproc::threshold::binarize;
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 1 }, vec![10, 90, 200]).unwrap();
/// let mut mask = Image::<bool, 1>::from_size_val(image.size(), false).unwrap();
///
/// binarize(&image, &mut mask, 90).unwrap();
/// assert_eq!(mask.as_slice(), &[false, false, true]);
/// ```
pub fn binarize(
    src: &Image<u8, 1>,
    dst: &mut Image<bool, 1>,
    threshold: u8,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = *src_pixel > threshold;
    });

    Ok(())
}

fn histogram_u8<const C: usize>(src: &Image<u8, C>) -> [u64; 256] {
    let mut histogram = [0u64; 256];
    for &pixel in src.as_slice() {
        histogram[pixel as usize] += 1;
    }
    histogram
}

/// Compute the Otsu threshold of an image.
///
/// The returned value `t` is the cut maximizing the between-class variance of the two
/// classes `<= t` and `> t`. The first maximum wins on ties. For an image with at least two
/// distinct intensities `t` lies in `[min, max)`; for a uniform image the single intensity is
/// returned, which leaves `pixel > t` empty.
///
/// # Arguments
///
/// * `src` - The input image.
///
/// # Errors
///
/// Returns [`ImageError::EmptyImage`] if the image has no pixels.
///
/// # Examples
///
/// ```
/// use charskel_image::{Image, ImageSize};
/// use charskel_imgproc::threshold::otsu_threshold_value;
///
/// let data = vec![10u8, 12, 11, 200, 210, 205];
/// let image = Image::<_, 1>::new(ImageSize { width: 3, height: 2 }, data).unwrap();
///
/// assert_eq!(otsu_threshold_value(&image).unwrap(), 12);
/// ```
pub fn otsu_threshold_value<const C: usize>(src: &Image<u8, C>) -> Result<u8, ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage(src.cols(), src.rows()));
    }

    let histogram = histogram_u8(src);
    let total_pixels = src.as_slice().len() as f64;

    // Calculate total sum for mean computation
    let sum_total = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum::<f64>();

    // a uniform image keeps its single intensity as threshold
    let mut best_threshold = histogram.iter().position(|&c| c > 0).unwrap_or(0) as u8;
    let mut best_variance = 0.0;

    // Initialize accumulators
    let mut weight_back = 0.0;
    let mut sum_back = 0.0;

    for (current_threshold, &hist_count) in histogram.iter().enumerate() {
        // Update background class accumulators
        weight_back += hist_count as f64;
        sum_back += current_threshold as f64 * hist_count as f64;

        // Skip empty classes
        if weight_back == 0.0 || weight_back == total_pixels {
            continue;
        }

        // Calculate means for both classes
        let mean_back = sum_back / weight_back;
        let weight_fore = total_pixels - weight_back;
        let mean_fore = (sum_total - sum_back) / weight_fore;

        // Calculate between-class variance
        let variance = weight_back * weight_fore * (mean_back - mean_fore).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best_threshold = current_threshold as u8;
        }
    }

    log::debug!("otsu threshold {best_threshold} (variance {best_variance:.2})");

    Ok(best_threshold)
}

/// Compute a local threshold surface.
///
/// Every pixel gets the weighted mean of its `block_size x block_size` neighborhood minus
/// `offset`. Borders are mirrored.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output threshold surface, in the intensity units of `src`.
/// * `block_size` - Side of the neighborhood, odd and greater than one.
/// * `offset` - Constant subtracted from the weighted mean.
/// * `method` - Weighting of the neighborhood.
pub fn threshold_local(
    src: &Image<u8, 1>,
    dst: &mut Image<f32, 1>,
    block_size: usize,
    offset: f32,
    method: LocalThresholdMethod,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if block_size % 2 == 0 || block_size < 3 {
        return Err(ImageError::InvalidBlockSize(block_size));
    }

    let src_f32 = src.map(|&v| v as f32);

    match method {
        LocalThresholdMethod::Gaussian => {
            let sigma = (block_size - 1) as f32 / 6.0;
            filter::gaussian_blur_reflect(&src_f32, dst, sigma)?;
        }
        LocalThresholdMethod::Mean => {
            filter::box_blur_reflect(&src_f32, dst, block_size)?;
        }
    }

    dst.as_slice_mut().iter_mut().for_each(|v| *v -= offset);

    Ok(())
}

/// Binarize an image against a per-pixel threshold surface, foreground being `pixel > surface`.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `threshold` - The threshold surface, e.g. from [`threshold_local`].
/// * `dst` - The output mask.
pub fn binarize_local(
    src: &Image<u8, 1>,
    threshold: &Image<f32, 1>,
    dst: &mut Image<bool, 1>,
) -> Result<(), ImageError> {
    if src.size() != threshold.size() || src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            threshold.cols(),
            threshold.rows(),
        ));
    }

    parallel::par_iter_rows_val_two(src, threshold, dst, |src_pixel, thr_pixel, dst_pixel| {
        *dst_pixel = *src_pixel as f32 > *thr_pixel;
    });

    Ok(())
}
