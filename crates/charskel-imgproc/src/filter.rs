use charskel_image::{Image, ImageError};

/// Create a box blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn box_blur_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0 / kernel_size as f32; kernel_size]
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum one.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size - 1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Map an out of range index back into `[0, n)` mirroring about the pixel edges
/// (`d c b a | a b c d | d c b a`).
#[inline]
pub(crate) fn reflect_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let mut i = i.rem_euclid(period);
    if i >= n {
        i = period - 1 - i;
    }
    i as usize
}

/// Apply a separable filter with mirrored borders.
///
/// The same odd sized kernel is applied along the rows and then along the columns.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
/// * `kernel` - The 1d kernel, its length must be odd.
pub fn separable_filter_reflect(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    kernel: &[f32],
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if kernel.len() % 2 == 0 {
        return Err(ImageError::InvalidBlockSize(kernel.len()));
    }

    let (width, height) = (src.cols(), src.rows());
    if width == 0 || height == 0 {
        return Ok(());
    }

    let radius = (kernel.len() / 2) as isize;
    let src_data = src.as_slice();

    // horizontal pass
    let mut tmp = vec![0.0f32; width * height];
    for (y, tmp_row) in tmp.chunks_exact_mut(width).enumerate() {
        let row = &src_data[y * width..(y + 1) * width];
        for (x, out) in tmp_row.iter_mut().enumerate() {
            *out = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * row[reflect_index(x as isize + k as isize - radius, width)])
                .sum();
        }
    }

    // vertical pass
    let dst_data = dst.as_slice_mut();
    for y in 0..height {
        for x in 0..width {
            dst_data[y * width + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    let yy = reflect_index(y as isize + k as isize - radius, height);
                    w * tmp[yy * width + x]
                })
                .sum();
        }
    }

    Ok(())
}

/// Blur an image with a gaussian kernel truncated at four standard deviations.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
/// * `sigma` - The standard deviation of the gaussian.
pub fn gaussian_blur_reflect(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    sigma: f32,
) -> Result<(), ImageError> {
    let radius = (4.0 * sigma + 0.5) as usize;
    let kernel = gaussian_kernel_1d(2 * radius + 1, sigma);
    separable_filter_reflect(src, dst, &kernel)
}

/// Blur an image with a box kernel of odd size.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
/// * `kernel_size` - The side of the box, must be odd.
pub fn box_blur_reflect(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    separable_filter_reflect(src, dst, &box_blur_kernel_1d(kernel_size))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use charskel_image::{Image, ImageError, ImageSize};

    #[test]
    fn reflect_index() {
        assert_eq!(super::reflect_index(-1, 4), 0);
        assert_eq!(super::reflect_index(-2, 4), 1);
        assert_eq!(super::reflect_index(4, 4), 3);
        assert_eq!(super::reflect_index(5, 4), 2);
        assert_eq!(super::reflect_index(9, 4), 1);
        assert_eq!(super::reflect_index(3, 1), 0);
    }

    #[test]
    fn gaussian_kernel_sums_to_one() {
        let kernel = super::gaussian_kernel_1d(7, 1.5);
        assert_eq!(kernel.len(), 7);
        assert_relative_eq!(kernel.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(kernel[0], kernel[6]);
        assert!(kernel[3] > kernel[2]);
    }

    #[test]
    fn box_blur_constant_image() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 4,
        };
        let image = Image::<f32, 1>::from_size_val(size, 3.0)?;
        let mut blurred = Image::<f32, 1>::from_size_val(size, 0.0)?;
        super::box_blur_reflect(&image, &mut blurred, 3)?;

        for v in blurred.as_slice() {
            assert_relative_eq!(*v, 3.0, epsilon = 1e-5);
        }

        Ok(())
    }

    #[test]
    fn box_blur_row() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 3,
                height: 1,
            },
            vec![0.0, 3.0, 6.0],
        )?;
        let mut blurred = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
        super::box_blur_reflect(&image, &mut blurred, 3)?;

        // mirrored borders: [0 | 0 3 6 | 6]
        assert_relative_eq!(blurred.as_slice()[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(blurred.as_slice()[1], 3.0, epsilon = 1e-5);
        assert_relative_eq!(blurred.as_slice()[2], 5.0, epsilon = 1e-5);

        Ok(())
    }

    #[test]
    fn even_kernel_rejected() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let image = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut out = Image::<f32, 1>::from_size_val(size, 0.0)?;
        assert_eq!(
            super::box_blur_reflect(&image, &mut out, 4),
            Err(ImageError::InvalidBlockSize(4))
        );

        Ok(())
    }
}
