use crate::{error::ImageError, Image, ImageSize};

/// Size of a volume in voxels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VolumeSize {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Number of planes.
    pub depth: usize,
}

impl VolumeSize {
    /// Number of voxels covered by the size.
    pub fn volume(&self) -> usize {
        self.width * self.height * self.depth
    }
}

impl From<ImageSize> for VolumeSize {
    fn from(size: ImageSize) -> Self {
        VolumeSize {
            width: size.width,
            height: size.height,
            depth: 1,
        }
    }
}

/// A single channel volume stored plane by plane, row-major inside each plane.
///
/// # Examples
///
/// ```
/// use charskel_image::{Volume, VolumeSize};
///
/// let size = VolumeSize { width: 4, height: 3, depth: 2 };
/// let mut volume = Volume::from_size_val(size, false);
/// volume.set(1, 2, 3, true).unwrap();
///
/// assert_eq!(volume.get(1, 2, 3), Some(&true));
/// assert_eq!(volume.get(2, 0, 0), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Volume<T> {
    size: VolumeSize,
    data: Vec<T>,
}

impl<T> Volume<T> {
    /// Create a volume filled with a single value.
    pub fn from_size_val(size: VolumeSize, val: T) -> Self
    where
        T: Clone,
    {
        Self {
            size,
            data: vec![val; size.volume()],
        }
    }

    /// Get the size of the volume.
    pub fn size(&self) -> VolumeSize {
        self.size
    }

    /// Get the number of planes.
    pub fn depth(&self) -> usize {
        self.size.depth
    }

    /// Get the number of rows of each plane.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of columns of each plane.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the voxel data as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the voxel data as a flat mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get the voxel at plane `z`, row `y` and column `x`.
    pub fn get(&self, z: usize, y: usize, x: usize) -> Option<&T> {
        if z >= self.size.depth || y >= self.size.height || x >= self.size.width {
            return None;
        }
        self.data
            .get((z * self.size.height + y) * self.size.width + x)
    }

    /// Set the voxel at plane `z`, row `y` and column `x`.
    pub fn set(&mut self, z: usize, y: usize, x: usize, val: T) -> Result<(), ImageError> {
        if z >= self.size.depth || y >= self.size.height || x >= self.size.width {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.size.width,
                self.size.height,
            ));
        }
        let idx = (z * self.size.height + y) * self.size.width + x;
        self.data[idx] = val;
        Ok(())
    }
}

impl<T: Clone> From<&Image<T, 1>> for Volume<T> {
    fn from(image: &Image<T, 1>) -> Self {
        Volume {
            size: image.size().into(),
            data: image.as_slice().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Volume, VolumeSize};
    use crate::{Image, ImageError, ImageSize};

    #[test]
    fn volume_set_get() -> Result<(), ImageError> {
        let size = VolumeSize {
            width: 2,
            height: 2,
            depth: 2,
        };
        let mut volume = Volume::from_size_val(size, 0u8);
        volume.set(1, 1, 0, 7)?;

        assert_eq!(volume.size(), size);
        assert_eq!(volume.get(1, 1, 0), Some(&7));
        assert_eq!(volume.as_slice()[6], 7);
        assert_eq!(volume.get(0, 2, 0), None);
        assert_eq!(
            volume.set(2, 0, 0, 1),
            Err(ImageError::PixelIndexOutOfBounds(0, 0, 2, 2))
        );

        Ok(())
    }

    #[test]
    fn volume_from_image() -> Result<(), ImageError> {
        let image = Image::<bool, 1>::new(
            ImageSize {
                width: 3,
                height: 1,
            },
            vec![true, false, true],
        )?;
        let volume = Volume::from(&image);
        assert_eq!(volume.depth(), 1);
        assert_eq!((volume.width(), volume.height()), (3, 1));
        assert_eq!(volume.get(0, 0, 2), Some(&true));
        assert_eq!(volume.as_slice(), image.as_slice());

        Ok(())
    }
}
