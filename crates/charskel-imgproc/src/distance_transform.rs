use charskel_image::{Image, ImageError};

// squared distance transform of a sampled function (Felzenszwalb & Huttenlocher),
// infinite samples carry no site.
fn squared_edt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    let Some(first) = f.iter().position(|x| x.is_finite()) else {
        d.fill(f64::INFINITY);
        return;
    };

    let mut k = 0;
    v[0] = first;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in first + 1..n {
        if !f[q].is_finite() {
            continue;
        }
        let fq = f[q] + (q * q) as f64;
        loop {
            let p = v[k];
            let s = (fq - (f[p] + (p * p) as f64)) / (2.0 * (q - p) as f64);
            if s <= z[k] {
                // z[0] is -inf so this never underflows
                k -= 1;
                continue;
            }
            k += 1;
            v[k] = q;
            z[k] = s;
            z[k + 1] = f64::INFINITY;
            break;
        }
    }

    k = 0;
    for (q, dq) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let p = v[k];
        let diff = q as f64 - p as f64;
        *dq = diff * diff + f[p];
    }
}

/// Compute the exact euclidean distance transform of a mask.
///
/// Every foreground pixel receives the distance to the nearest background pixel, every
/// background pixel receives zero. Pixels outside the image do not count as background, so a
/// mask without any background pixel yields `f32::INFINITY` everywhere.
///
/// # Arguments
///
/// * `src` - The input mask.
/// * `dst` - The output distance map.
///
/// # Examples
///
/// ```
/// use charskel_image::{Image, ImageSize};
/// use charskel_imgproc::distance_transform::distance_transform_edt;
///
/// let mask = Image::<bool, 1>::new(
///     ImageSize { width: 5, height: 1 },
///     vec![false, true, true, true, false],
/// )
/// .unwrap();
/// let mut distance = Image::<f32, 1>::from_size_val(mask.size(), 0.0).unwrap();
///
/// distance_transform_edt(&mask, &mut distance).unwrap();
/// assert_eq!(distance.as_slice(), &[0.0, 1.0, 2.0, 1.0, 0.0]);
/// ```
pub fn distance_transform_edt(
    src: &Image<bool, 1>,
    dst: &mut Image<f32, 1>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (width, height) = (src.cols(), src.rows());
    if width == 0 || height == 0 {
        return Ok(());
    }

    let mut grid = src
        .as_slice()
        .iter()
        .map(|&fg| if fg { f64::INFINITY } else { 0.0 })
        .collect::<Vec<_>>();

    let n = width.max(height);
    let mut f = vec![0.0f64; n];
    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    // columns
    for x in 0..width {
        for y in 0..height {
            f[y] = grid[y * width + x];
        }
        squared_edt_1d(&f[..height], &mut d[..height], &mut v, &mut z);
        for y in 0..height {
            grid[y * width + x] = d[y];
        }
    }

    // rows
    for row in grid.chunks_exact_mut(width) {
        f[..width].copy_from_slice(row);
        squared_edt_1d(&f[..width], &mut d[..width], &mut v, &mut z);
        row.copy_from_slice(&d[..width]);
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(grid.iter())
        .for_each(|(out, &sq)| *out = sq.sqrt() as f32);

    Ok(())
}
