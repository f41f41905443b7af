use charskel_image::{Image, ImageError};

/// Offsets of a neighbor as (row, column).
pub(crate) type Offset = (isize, isize);

pub(crate) fn check_size<T, U>(src: &Image<T, 1>, dst: &Image<U, 1>) -> Result<(), ImageError> {
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

/// A working copy of a mask surrounded by a one pixel background frame.
///
/// Neighbors of any interior pixel can be read without bounds checks, and pixels outside
/// the image read as background.
pub(crate) struct PaddedMask {
    data: Vec<bool>,
    stride: usize,
    width: usize,
    height: usize,
}

impl PaddedMask {
    pub fn from_image(src: &Image<bool, 1>) -> Self {
        let (width, height) = (src.cols(), src.rows());
        let stride = width + 2;
        let mut data = vec![false; stride * (height + 2)];

        if width > 0 {
            for (y, row) in src.as_slice().chunks_exact(width).enumerate() {
                let start = (y + 1) * stride + 1;
                data[start..start + width].copy_from_slice(row);
            }
        }

        Self {
            data,
            stride,
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        self.data[idx]
    }

    #[inline]
    pub fn set(&mut self, idx: usize, val: bool) {
        self.data[idx] = val;
    }

    /// Padded indices of the foreground pixels in raster order.
    pub fn foreground(&self) -> Vec<usize> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (y + 1) * self.stride + x + 1))
            .filter(|&idx| self.data[idx])
            .collect()
    }

    /// Map a padded index back to the linear index in the source image.
    #[inline]
    pub fn unpadded(&self, idx: usize) -> usize {
        (idx / self.stride - 1) * self.width + idx % self.stride - 1
    }

    /// Pack the neighbors listed in `offsets` into a byte, bit `i` for `offsets[i]`.
    #[inline]
    pub fn pattern(&self, idx: usize, offsets: &[Offset; 8]) -> u8 {
        offsets
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &(dy, dx))| {
                let n = (idx as isize + dy * self.stride as isize + dx) as usize;
                acc | ((self.data[n] as u8) << i)
            })
    }

    /// Pack the 3x3 window in row-major order, the center lands on bit 4.
    #[inline]
    pub fn window(&self, idx: usize) -> usize {
        let top = idx - self.stride - 1;
        let mut code = 0;
        for r in 0..3 {
            for c in 0..3 {
                code |= (self.data[top + r * self.stride + c] as usize) << (r * 3 + c);
            }
        }
        code
    }

    pub fn write_to(&self, dst: &mut Image<bool, 1>) {
        if self.width == 0 {
            return;
        }
        for (y, row) in dst.as_slice_mut().chunks_exact_mut(self.width).enumerate() {
            let start = (y + 1) * self.stride + 1;
            row.copy_from_slice(&self.data[start..start + self.width]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PaddedMask;
    use charskel_image::{Image, ImageError, ImageSize};

    #[test]
    fn padded_mask_window() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<bool, 1>::new(
            ImageSize { width: 2, height: 2 },
            vec![
                true, false,
                true, true,
            ],
        )?;
        let mask = PaddedMask::from_image(&image);

        let fg = mask.foreground();
        assert_eq!(fg.len(), 3);

        // top-left pixel sees the frame above and to the left
        assert_eq!(mask.window(fg[0]), (1 << 4) | (1 << 7) | (1 << 8));
        // south-east, south and the pixel itself
        let offsets = [
            (0, 1),
            (1, 1),
            (1, 0),
            (0, 0),
            (-1, 0),
            (-1, -1),
            (0, -1),
            (-1, 1),
        ];
        assert_eq!(mask.pattern(fg[0], &offsets), 0b0000_1110);

        let mut out = Image::<bool, 1>::from_size_val(image.size(), false)?;
        mask.write_to(&mut out);
        assert_eq!(out, image);

        Ok(())
    }
}
