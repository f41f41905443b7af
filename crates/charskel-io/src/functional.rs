use std::path::Path;

use charskel_image::{Image, ImageSize};
use charskel_imgproc::color::gray_from_rgb_u8;

use crate::error::IoError;

/// Reads an image from the given file path and converts it to grayscale.
///
/// The format is detected from the file content, any format supported by the image crate
/// can be read, at any bit depth. Color images are converted with [`gray_from_rgb_u8`] and
/// alpha channels are dropped.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A grayscale image with a single channel.
pub fn read_image_any_gray8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    // 16 bit and float samples are rescaled to 8 bits by the conversion
    let color = img.color();
    let gray = if color.has_color() {
        let rgb = Image::<u8, 3>::new(size, img.into_rgb8().into_raw())?;
        let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;
        gray_from_rgb_u8(&rgb, &mut gray)?;
        gray
    } else {
        Image::<u8, 1>::new(size, img.into_luma8().into_raw())?
    };

    log::debug!(
        "read {} ({size}, {color:?}) as grayscale",
        file_path.display()
    );

    Ok(gray)
}

#[cfg(test)]
mod tests {
    use crate::error::IoError;
    use crate::functional::read_image_any_gray8;

    #[test]
    fn read_missing_file() {
        let result = read_image_any_gray8("does/not/exist.jpeg");
        assert!(matches!(result, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn read_gray16() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gray16.png");

        let values = [0u16, 25700, 65535];
        image::ImageBuffer::from_fn(3, 1, |x, _| image::Luma([values[x as usize]]))
            .save(&file_path)?;

        let gray = read_image_any_gray8(&file_path)?;
        assert_eq!(gray.size().width, 3);
        assert_eq!(gray.as_slice(), &[0, 100, 255]);

        Ok(())
    }

    #[test]
    fn read_rgb16() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("rgb16.png");

        image::ImageBuffer::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgb([65535u16, 0, 0])
            } else {
                image::Rgb([65535u16, 65535, 65535])
            }
        })
        .save(&file_path)?;

        let gray = read_image_any_gray8(&file_path)?;
        assert_eq!(gray.as_slice(), &[77, 255]);

        Ok(())
    }
}
