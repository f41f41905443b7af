use charskel_image::{Image, ImageError};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::neighborhood::{check_size, PaddedMask};
use crate::distance_transform::distance_transform_edt;

const CENTER: usize = 1 << 4;

const fn adjacent(a: usize, b: usize) -> bool {
    a != b && (a / 3).abs_diff(b / 3) <= 1 && (a % 3).abs_diff(b % 3) <= 1
}

// number of 8-connected components of a row-major 3x3 pattern
const fn components(pattern: usize) -> u32 {
    let mut seen = 0usize;
    let mut count = 0;
    let mut start = 0;
    while start < 9 {
        if (pattern >> start) & 1 == 1 && (seen >> start) & 1 == 0 {
            count += 1;
            let mut component = 1usize << start;
            loop {
                let mut grown = component;
                let mut i = 0;
                while i < 9 {
                    if (component >> i) & 1 == 1 {
                        let mut j = 0;
                        while j < 9 {
                            if (pattern >> j) & 1 == 1 && adjacent(i, j) {
                                grown |= 1 << j;
                            }
                            j += 1;
                        }
                    }
                    i += 1;
                }
                if grown == component {
                    break;
                }
                component = grown;
            }
            seen |= component;
        }
        start += 1;
    }
    count
}

// true when the center pixel of the pattern must be kept
const fn build_table() -> [bool; 512] {
    let mut table = [false; 512];
    let mut pattern: usize = 0;
    while pattern < 512 {
        if pattern & CENTER != 0 {
            let splits = components(pattern) != components(pattern & !CENTER);
            let sparse = pattern.count_ones() < 3;
            table[pattern] = splits || sparse;
        }
        pattern += 1;
    }
    table
}

const KEEP: [bool; 512] = build_table();

/// Compute the medial axis of a mask.
///
/// Foreground pixels are visited from the closest to the background to the farthest, ties
/// broken by cornerness (number of background pixels in the 3x3 window) and then by a
/// seeded random order. A visited pixel is removed unless that changes the number of
/// 8-connected components in its 3x3 window or leaves the window with fewer than three
/// foreground pixels.
///
/// A mask without background pixels is ordered by the distance to the image border instead.
/// The distance output still holds the transform itself, infinite everywhere in that case.
///
/// # Arguments
///
/// * `src` - The input mask.
/// * `dst` - The output medial axis.
/// * `distance` - Optional output for the euclidean distance transform of `src`.
/// * `seed` - Seed of the tie-break order; the same seed gives the same output.
///
/// # Examples
///
/// ```
/// use charskel_image::{Image, ImageSize};
/// use charskel_imgproc::morphology::medial_axis;
///
/// let size = ImageSize { width: 9, height: 5 };
/// let mut mask = Image::<bool, 1>::from_size_val(size, false).unwrap();
/// for y in 1..4 {
///     for x in 1..8 {
///         mask.set_pixel(x, y, 0, true).unwrap();
///     }
/// }
///
/// let mut skeleton = Image::<bool, 1>::from_size_val(size, false).unwrap();
/// let mut distance = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
/// medial_axis(&mask, &mut skeleton, Some(&mut distance), 0).unwrap();
///
/// assert!(*skeleton.get_pixel(4, 2, 0).unwrap());
/// assert_eq!(*distance.get_pixel(4, 2, 0).unwrap(), 2.0);
/// ```
pub fn medial_axis(
    src: &Image<bool, 1>,
    dst: &mut Image<bool, 1>,
    distance: Option<&mut Image<f32, 1>>,
    seed: u64,
) -> Result<(), ImageError> {
    check_size(src, dst)?;
    if let Some(distance) = distance.as_deref() {
        check_size(src, distance)?;
    }

    let mut edt = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    distance_transform_edt(src, &mut edt)?;

    let mut mask = PaddedMask::from_image(src);
    let points = mask.foreground();

    let corners = points
        .iter()
        .map(|&idx| 9 - mask.window(idx).count_ones())
        .collect::<Vec<_>>();
    // without background the distance to the image frame orders the pixels
    let width = src.width();
    let height = src.height();
    let no_background = edt.as_slice().iter().all(|d| d.is_infinite());
    let distances = points
        .iter()
        .map(|&idx| {
            let i = mask.unpadded(idx);
            if no_background {
                let (x, y) = (i % width, i / width);
                (x + 1).min(y + 1).min(width - x).min(height - y) as f32
            } else {
                edt.as_slice()[i]
            }
        })
        .collect::<Vec<_>>();

    let mut tie_break = (0..points.len()).collect::<Vec<_>>();
    tie_break.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut order = (0..points.len()).collect::<Vec<_>>();
    order.sort_unstable_by(|&a, &b| {
        distances[a]
            .total_cmp(&distances[b])
            .then(corners[a].cmp(&corners[b]))
            .then(tie_break[a].cmp(&tie_break[b]))
    });

    let mut removed = 0;
    for i in order {
        let idx = points[i];
        let keep = KEEP[mask.window(idx) | CENTER];
        if !keep {
            removed += 1;
        }
        mask.set(idx, keep);
    }

    log::debug!(
        "medial_axis: {} of {} pixels kept",
        points.len() - removed,
        points.len()
    );

    mask.write_to(dst);

    if let Some(distance) = distance {
        distance.as_slice_mut().copy_from_slice(edt.as_slice());
    }

    Ok(())
}
