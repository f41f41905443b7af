use charskel_image::{Image, ImageError};

use super::neighborhood::{check_size, Offset, PaddedMask};

// counterclockwise starting east: E, NE, N, NW, W, SW, S, SE
const NEIGHBORS: [Offset; 8] = [
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// removal tables of the two subiterations (Guo & Hall, 1989)
const fn build_luts() -> ([bool; 256], [bool; 256]) {
    let mut first = [false; 256];
    let mut second = [false; 256];
    let mut pattern: usize = 0;
    while pattern < 256 {
        let mut b = [false; 8];
        let mut i = 0;
        while i < 8 {
            b[i] = (pattern >> i) & 1 == 1;
            i += 1;
        }

        // G1: a single 8-connected component around the pixel
        let mut crossings = 0;
        let mut i = 0;
        while i < 8 {
            if !b[i] && (b[i + 1] || b[(i + 2) % 8]) {
                crossings += 1;
            }
            i += 2;
        }
        let g1 = crossings == 1;

        // G2: endpoint check
        let mut n1 = 0;
        let mut n2 = 0;
        let mut k = 1;
        while k < 8 {
            if b[k - 1] || b[k] {
                n1 += 1;
            }
            if b[k] || b[(k + 1) % 8] {
                n2 += 1;
            }
            k += 2;
        }
        let m = if n1 < n2 { n1 } else { n2 };
        let g2 = m == 2 || m == 3;

        // G3 and G3': north-east and south-west corner checks
        let g3 = !((b[1] || b[2] || !b[7]) && b[0]);
        let g3p = !((b[5] || b[6] || !b[3]) && b[4]);

        first[pattern] = g1 && g2 && g3;
        second[pattern] = g1 && g2 && g3p;
        pattern += 1;
    }
    (first, second)
}

const FIRST_PASS: [bool; 256] = build_luts().0;
const SECOND_PASS: [bool; 256] = build_luts().1;

/// Thin the foreground of a mask with the Guo-Hall algorithm.
///
/// Each iteration runs two parallel subiterations. The iteration count can be capped to get a
/// partially thinned result; further iterations only ever remove pixels, so a capped result is
/// a superset of the converged one.
///
/// # Arguments
///
/// * `src` - The input mask.
/// * `dst` - The output thinned mask.
/// * `max_iter` - Maximum number of iterations, `None` runs until convergence and `Some(0)`
///   copies the input.
///
/// # Returns
///
/// The number of iterations that removed pixels.
pub fn thin(
    src: &Image<bool, 1>,
    dst: &mut Image<bool, 1>,
    max_iter: Option<usize>,
) -> Result<usize, ImageError> {
    check_size(src, dst)?;

    let mut mask = PaddedMask::from_image(src);
    let mut points = mask.foreground();
    let mut removed = Vec::new();
    let mut iterations = 0;

    while max_iter.map_or(true, |max| iterations < max) {
        let mut changed = false;
        for lut in [&FIRST_PASS, &SECOND_PASS] {
            removed.clear();
            removed.extend(
                points
                    .iter()
                    .copied()
                    .filter(|&idx| {
                        mask.get(idx) && lut[mask.pattern(idx, &NEIGHBORS) as usize]
                    }),
            );
            for &idx in &removed {
                mask.set(idx, false);
            }
            changed |= !removed.is_empty();
        }

        if !changed {
            break;
        }

        points.retain(|&idx| mask.get(idx));
        iterations += 1;
        log::debug!("thin: iteration {iterations}, {} pixels left", points.len());
    }

    mask.write_to(dst);

    Ok(iterations)
}

#[cfg(test)]
mod tests {
    use charskel_image::{Image, ImageError, ImageSize};

    fn rectangle() -> Result<Image<bool, 1>, ImageError> {
        let size = ImageSize {
            width: 15,
            height: 9,
        };
        let mut mask = Image::<bool, 1>::from_size_val(size, false)?;
        for y in 2..7 {
            for x in 2..13 {
                mask.set_pixel(x, y, 0, true)?;
            }
        }
        Ok(mask)
    }

    fn count(mask: &Image<bool, 1>) -> usize {
        mask.as_slice().iter().filter(|&&v| v).count()
    }

    #[test]
    fn thin_rectangle() -> Result<(), ImageError> {
        let mask = rectangle()?;
        let mut thinned = Image::from_size_val(mask.size(), false)?;
        let iterations = super::thin(&mask, &mut thinned, None)?;

        assert_eq!(iterations, 2);
        assert_eq!(count(&thinned), 7);
        for x in 4..11 {
            assert!(*thinned.get_pixel(x, 4, 0)?);
        }

        Ok(())
    }

    #[test]
    fn thin_iteration_cap() -> Result<(), ImageError> {
        let mask = rectangle()?;
        let mut thinned = Image::from_size_val(mask.size(), false)?;

        assert_eq!(super::thin(&mask, &mut thinned, Some(0))?, 0);
        assert_eq!(thinned, mask);

        assert_eq!(super::thin(&mask, &mut thinned, Some(1))?, 1);
        assert_eq!(count(&thinned), 27);

        assert_eq!(super::thin(&mask, &mut thinned, Some(10))?, 2);
        assert_eq!(count(&thinned), 7);

        Ok(())
    }

    #[test]
    fn thin_small_square() -> Result<(), ImageError> {
        let mut mask = Image::<bool, 1>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            false,
        )?;
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            mask.set_pixel(x, y, 0, true)?;
        }
        let mut thinned = Image::from_size_val(mask.size(), false)?;
        super::thin(&mask, &mut thinned, None)?;

        assert_eq!(count(&thinned), 1);
        assert!(*thinned.get_pixel(1, 2, 0)?);

        Ok(())
    }
}
