use std::{fs, fs::File, path::Path};

use charskel_image::{Image, ImageSize};
use png::{BitDepth, ColorType, Decoder, Encoder};

use crate::error::IoError;

/// Read a PNG image with a single channel (gray8).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A grayscale image with a single channel.
pub fn read_image_png_gray8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let (buf, size) = read_png_impl(file_path, ColorType::Grayscale)?;
    Ok(Image::new(size, buf)?)
}

/// Read a PNG image with three channels (rgb8).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A RGB image with three channels.
pub fn read_image_png_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let (buf, size) = read_png_impl(file_path, ColorType::Rgb)?;
    Ok(Image::new(size, buf)?)
}

/// Writes the given PNG _(gray8)_ data to the given file path.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG image.
/// * `image` - The grayscale image to write.
pub fn write_image_png_gray8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Grayscale,
    )
}

/// Writes the given PNG _(rgb8)_ data to the given file path.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG image.
/// * `image` - The RGB image to write.
pub fn write_image_png_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Rgb,
    )
}

fn read_png_impl(
    file_path: impl AsRef<Path>,
    expected: ColorType,
) -> Result<(Vec<u8>, ImageSize), IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    // verify the file extension
    if file_path.extension().map_or(true, |ext| ext != "png") {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let file = fs::File::open(file_path)?;
    let mut reader = Decoder::new(file)
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    if info.color_type != expected || info.bit_depth != BitDepth::Eight {
        return Err(IoError::PngDecodeError(format!(
            "expected 8 bit {expected:?}, found {:?} {:?}",
            info.bit_depth, info.color_type
        )));
    }
    buf.truncate(info.buffer_size());

    let size = ImageSize {
        width: info.width as usize,
        height: info.height as usize,
    };

    Ok((buf, size))
}

fn write_png_impl(
    file_path: impl AsRef<Path>,
    image_data: &[u8],
    image_size: ImageSize,
    depth: BitDepth,
    color_type: ColorType,
) -> Result<(), IoError> {
    let file = File::create(file_path)?;

    let mut encoder = Encoder::new(file, image_size.width as u32, image_size.height as u32);
    encoder.set_color(color_type);
    encoder.set_depth(depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;

    #[test]
    fn read_write_png_gray8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gray.png");

        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 4,
                height: 2,
            },
            vec![0, 32, 64, 96, 128, 160, 192, 255],
        )?;
        write_image_png_gray8(&file_path, &image)?;

        let image_back = read_image_png_gray8(&file_path)?;
        assert_eq!(image_back, image);

        Ok(())
    }

    #[test]
    fn read_png_wrong_color_type() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("rgb.png");

        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            7,
        )?;
        write_image_png_rgb8(&file_path, &image)?;

        assert_eq!(read_image_png_rgb8(&file_path)?, image);
        assert!(matches!(
            read_image_png_gray8(&file_path),
            Err(IoError::PngDecodeError(_))
        ));

        Ok(())
    }

    #[test]
    fn read_png_invalid_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("image.jpeg");
        fs::write(&file_path, [0u8; 4])?;

        assert!(matches!(
            read_image_png_gray8(&file_path),
            Err(IoError::InvalidFileExtension(_))
        ));

        Ok(())
    }
}
