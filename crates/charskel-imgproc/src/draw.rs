use charskel_image::Image;

#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x < 0 || y < 0 || x >= img.cols() as i64 || y >= img.rows() as i64 {
        return;
    }
    let start = (y as usize * img.cols() + x as usize) * C;
    img.as_slice_mut()[start..start + C].copy_from_slice(&color);
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// Pixels falling outside the image are skipped.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The side of the square stamped at every point of the line.
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    // stamp covers [-lo, hi] so even thicknesses stay exact
    let lo = (thickness.max(1) as i64 - 1) / 2;
    let hi = thickness.max(1) as i64 - 1 - lo;

    loop {
        for j in -lo..=hi {
            for i in -lo..=hi {
                set_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a polyline given in pixel-center coordinates onto an upscaled image.
///
/// A point `[x, y]` lands at `origin + ((x + 0.5) * scale, (y + 0.5) * scale)`, which maps
/// the center of a source pixel onto the center of its `scale` x `scale` block.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `points` - The vertices of the polyline as `[x, y]`.
/// * `origin` - The top-left corner of the upscaled area as (x, y).
/// * `scale` - The upscaling factor applied to the coordinates.
/// * `color` - The color of the line.
/// * `thickness` - The thickness of the line.
pub fn draw_polyline<const C: usize>(
    img: &mut Image<u8, C>,
    points: &[[f32; 2]],
    origin: (i64, i64),
    scale: f32,
    color: [u8; C],
    thickness: usize,
) {
    let project = |p: &[f32; 2]| {
        (
            origin.0 + ((p[0] + 0.5) * scale).floor() as i64,
            origin.1 + ((p[1] + 0.5) * scale).floor() as i64,
        )
    };

    match points {
        [] => {}
        [single] => {
            let p = project(single);
            draw_line(img, p, p, color, thickness);
        }
        _ => {
            for pair in points.windows(2) {
                draw_line(img, project(&pair[0]), project(&pair[1]), color, thickness);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use charskel_image::{Image, ImageError, ImageSize};

    #[rustfmt::skip]
    #[test]
    fn draw_line_diagonal() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        super::draw_line(&mut img, (0, 0), (4, 4), [255], 1);
        assert_eq!(
            img.as_slice(),
            &[
                255,   0,   0,   0,   0,
                  0, 255,   0,   0,   0,
                  0,   0, 255,   0,   0,
                  0,   0,   0, 255,   0,
                  0,   0,   0,   0, 255,
            ]
        );
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn draw_line_clipped() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 4, height: 2 }, vec![0u8; 8],
        )?;
        super::draw_line(&mut img, (-3, 1), (6, 1), [9], 1);
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0, 0,
                9, 9, 9, 9,
            ]
        );
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn draw_polyline_scaled() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 6, height: 6 }, vec![0u8; 36],
        )?;
        // centers of pixels (0, 0) and (2, 0) at scale 2
        super::draw_polyline(&mut img, &[[0.0, 0.0], [2.0, 0.0]], (0, 0), 2.0, [1], 1);
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0, 0, 0, 0,
                0, 1, 1, 1, 1, 1,
                0, 0, 0, 0, 0, 0,
                0, 0, 0, 0, 0, 0,
                0, 0, 0, 0, 0, 0,
                0, 0, 0, 0, 0, 0,
            ]
        );
        Ok(())
    }
}
