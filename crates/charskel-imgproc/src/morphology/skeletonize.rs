use charskel_image::{Image, ImageError};

use super::neighborhood::{check_size, Offset, PaddedMask};

// NW, N, NE, E, SE, S, SW, W
const NEIGHBORS: [Offset; 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

const fn bit(pattern: usize, i: usize) -> u8 {
    ((pattern >> i) & 1) as u8
}

// 1: removable in the first subiteration, 2: in the second, 3: in both.
const fn build_lut() -> [u8; 256] {
    let mut lut = [0u8; 256];
    let mut pattern: usize = 0;
    while pattern < 256 {
        let nw = bit(pattern, 0);
        let n = bit(pattern, 1);
        let ne = bit(pattern, 2);
        let e = bit(pattern, 3);
        let se = bit(pattern, 4);
        let s = bit(pattern, 5);
        let sw = bit(pattern, 6);
        let w = bit(pattern, 7);

        // clockwise starting north
        let ring = [n, ne, e, se, s, sw, w, nw];
        let mut neighbors = 0;
        let mut transitions = 0;
        let mut i = 0;
        while i < 8 {
            neighbors += ring[i];
            if ring[i] == 0 && ring[(i + 1) % 8] == 1 {
                transitions += 1;
            }
            i += 1;
        }

        if neighbors >= 2 && neighbors <= 6 && transitions == 1 {
            let mut value = 0;
            if e == 0 || s == 0 {
                value |= 1;
            }
            if n == 0 || w == 0 {
                value |= 2;
            }
            lut[pattern] = value;
        }
        pattern += 1;
    }
    lut
}

const LUT: [u8; 256] = build_lut();

// 8-connectivity number of a neighborhood, ring counterclockwise from east
const fn connectivity(ring: [u8; 8]) -> u8 {
    let mut count = 0;
    let mut k = 0;
    while k < 8 {
        let a = 1 - ring[k];
        count += a - a * (1 - ring[k + 1]) * (1 - ring[(k + 2) % 8]);
        k += 2;
    }
    count
}

// pixels left on a staircase: 2 to 6 neighbors forming a single 8-connected group
const fn build_staircase() -> [bool; 256] {
    let mut table = [false; 256];
    let mut pattern: usize = 0;
    while pattern < 256 {
        let ring = [
            bit(pattern, 3),
            bit(pattern, 2),
            bit(pattern, 1),
            bit(pattern, 0),
            bit(pattern, 7),
            bit(pattern, 6),
            bit(pattern, 5),
            bit(pattern, 4),
        ];
        let neighbors = (pattern as u32).count_ones();
        table[pattern] = neighbors >= 2 && neighbors <= 6 && connectivity(ring) == 1;
        pattern += 1;
    }
    table
}

const STAIRCASE: [bool; 256] = build_staircase();

/// Reduce the foreground of a mask to a one pixel wide skeleton.
///
/// Parallel thinning in two subiterations driven by a lookup table. A pixel is removable
/// when it has between two and six foreground neighbors and a single background to
/// foreground transition around it. The first subiteration only peels south and east
/// border points, the second north and west border points.
///
/// The transition count keeps the two-pixel steps of sloped strokes. Once the parallel
/// passes converge, a sequential raster pass removes the pixels whose neighbors still form a
/// single 8-connected group, then the parallel passes resume. Iterates until nothing
/// changes, so the result is a fixed point of the transform.
///
/// # Arguments
///
/// * `src` - The input mask.
/// * `dst` - The output skeleton.
///
/// # Returns
///
/// The number of iterations that removed pixels.
///
/// # Examples
///
/// ```
/// use charskel_image::{Image, ImageSize};
/// use charskel_imgproc::morphology::skeletonize;
///
/// let size = ImageSize { width: 7, height: 5 };
/// let mut mask = Image::<bool, 1>::from_size_val(size, false).unwrap();
/// for y in 1..4 {
///     for x in 1..6 {
///         mask.set_pixel(x, y, 0, true).unwrap();
///     }
/// }
///
/// let mut skeleton = Image::<bool, 1>::from_size_val(size, false).unwrap();
/// skeletonize(&mask, &mut skeleton).unwrap();
///
/// assert!(skeleton.as_slice().iter().filter(|&&v| v).count() < 15);
/// ```
pub fn skeletonize(src: &Image<bool, 1>, dst: &mut Image<bool, 1>) -> Result<usize, ImageError> {
    check_size(src, dst)?;

    let mut mask = PaddedMask::from_image(src);
    let mut points = mask.foreground();
    let mut removed = Vec::new();
    let mut iterations = 0;

    loop {
        let mut changed = false;
        for pass in [1u8, 2] {
            removed.clear();
            removed.extend(
                points
                    .iter()
                    .copied()
                    .filter(|&idx| {
                        mask.get(idx) && LUT[mask.pattern(idx, &NEIGHBORS) as usize] & pass != 0
                    }),
            );
            for &idx in &removed {
                mask.set(idx, false);
            }
            changed |= !removed.is_empty();
        }

        if !changed {
            // sequential, every removal sees the previous ones
            for &idx in &points {
                if STAIRCASE[mask.pattern(idx, &NEIGHBORS) as usize] {
                    mask.set(idx, false);
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }

        points.retain(|&idx| mask.get(idx));
        iterations += 1;
        log::debug!("skeletonize: iteration {iterations}, {} pixels left", points.len());
    }

    mask.write_to(dst);

    Ok(iterations)
}
