use charskel_image::{Image, ImageError, Volume, VolumeSize};

use super::neighborhood::check_size;

// index of an offset inside the flattened 3x3x3 neighborhood
const fn neighbor(dz: isize, dy: isize, dx: isize) -> usize {
    ((dz + 1) * 9 + (dy + 1) * 3 + (dx + 1)) as usize
}

const CENTER: usize = 13;

const fn sign(bit: bool) -> isize {
    if bit {
        1
    } else {
        -1
    }
}

// the 7 voxels sharing each corner vertex with the center
const fn build_corners() -> [[usize; 7]; 8] {
    let mut corners = [[0; 7]; 8];
    let mut k = 0;
    while k < 8 {
        let (sz, sy, sx) = (sign(k & 4 != 0), sign(k & 2 != 0), sign(k & 1 != 0));
        let mut m = 1;
        while m < 8 {
            corners[k][m - 1] = neighbor(
                if m & 4 != 0 { sz } else { 0 },
                if m & 2 != 0 { sy } else { 0 },
                if m & 1 != 0 { sx } else { 0 },
            );
            m += 1;
        }
        k += 1;
    }
    corners
}

// the 3 voxels sharing each edge with the center
const fn build_edges() -> [[usize; 3]; 12] {
    let mut edges = [[0; 3]; 12];
    let mut e = 0;
    while e < 12 {
        let (a, b) = (sign(e & 2 != 0), sign(e & 1 != 0));
        let cells = [(a, 0), (0, b), (a, b)];
        let mut i = 0;
        while i < 3 {
            let (u, v) = cells[i];
            edges[e][i] = match e / 4 {
                0 => neighbor(0, u, v),
                1 => neighbor(u, 0, v),
                _ => neighbor(u, v, 0),
            };
            i += 1;
        }
        e += 1;
    }
    edges
}

// 26-adjacency between the voxels of the neighborhood, the center excluded
const fn build_adjacency() -> [u32; 27] {
    let mut adjacency = [0u32; 27];
    let mut i: usize = 0;
    while i < 27 {
        let mut j: usize = 0;
        while j < 27 {
            let close = (i / 9).abs_diff(j / 9) <= 1
                && ((i / 3) % 3).abs_diff((j / 3) % 3) <= 1
                && (i % 3).abs_diff(j % 3) <= 1;
            if i != j && i != CENTER && j != CENTER && close {
                adjacency[i] |= 1 << j;
            }
            j += 1;
        }
        i += 1;
    }
    adjacency
}

const CORNERS: [[usize; 7]; 8] = build_corners();
const EDGES: [[usize; 3]; 12] = build_edges();
const FACES: [usize; 6] = [
    neighbor(-1, 0, 0),
    neighbor(1, 0, 0),
    neighbor(0, -1, 0),
    neighbor(0, 1, 0),
    neighbor(0, 0, -1),
    neighbor(0, 0, 1),
];
const ADJACENCY: [u32; 27] = build_adjacency();

fn gather(data: &[bool], idx: usize, offsets: &[isize; 27]) -> [bool; 27] {
    let mut n = [false; 27];
    for (v, &offset) in n.iter_mut().zip(offsets.iter()) {
        *v = data[(idx as isize + offset) as usize];
    }
    n
}

fn is_endpoint(n: &[bool; 27]) -> bool {
    n.iter().filter(|&&v| v).count() == 2
}

// removing the center cube also removes every vertex, edge and face it shares only with
// background voxels; the euler characteristic holds when those cancel out.
fn is_euler_invariant(n: &[bool; 27]) -> bool {
    let lost = |cells: &[usize]| cells.iter().all(|&i| !n[i]);
    let vertices = CORNERS.iter().filter(|c| lost(&c[..])).count() as isize;
    let edges = EDGES.iter().filter(|c| lost(&c[..])).count() as isize;
    let faces = FACES.iter().filter(|&&i| !n[i]).count() as isize;
    vertices - edges + faces == 1
}

// the foreground neighbors form a single 26-connected component
fn is_simple(n: &[bool; 27]) -> bool {
    let set = n
        .iter()
        .enumerate()
        .filter(|&(i, &v)| v && i != CENTER)
        .fold(0u32, |acc, (i, _)| acc | 1 << i);
    if set == 0 {
        return false;
    }

    let mut component = 1u32 << set.trailing_zeros();
    loop {
        let mut grown = component;
        let mut bits = component;
        while bits != 0 {
            let i = bits.trailing_zeros() as usize;
            grown |= ADJACENCY[i] & set;
            bits &= bits - 1;
        }
        if grown == component {
            break;
        }
        component = grown;
    }

    component == set
}

/// Skeletonize a binary volume with the Lee-Kashyap-Chu thinning algorithm.
///
/// Border voxels are peeled from six directions in turn (-y, +y, +x, -x, +z, -z). In each
/// direction the candidates are the foreground voxels with a background neighbor on that side
/// that are neither endpoints nor change the topology of their 26-neighborhood. Candidates are
/// rechecked one by one before deletion. Thinning stops once a full round over the six
/// directions deletes nothing.
///
/// # Arguments
///
/// * `src` - The input volume.
///
/// # Returns
///
/// The skeleton with the same size as the input.
pub fn skeletonize_3d_volume(src: &Volume<bool>) -> Result<Volume<bool>, ImageError> {
    let size = src.size();
    let padded_size = VolumeSize {
        width: size.width + 2,
        height: size.height + 2,
        depth: size.depth + 2,
    };

    let mut volume = Volume::from_size_val(padded_size, false);
    for z in 0..size.depth {
        for y in 0..size.height {
            for x in 0..size.width {
                if src.get(z, y, x) == Some(&true) {
                    volume.set(z + 1, y + 1, x + 1, true)?;
                }
            }
        }
    }

    let row = padded_size.width as isize;
    let plane = (padded_size.width * padded_size.height) as isize;

    let mut offsets = [0isize; 27];
    for dz in -1..=1 {
        for dy in -1..=1 {
            for dx in -1..=1 {
                offsets[neighbor(dz, dy, dx)] = dz * plane + dy * row + dx;
            }
        }
    }
    let directions = [-row, row, 1, -1, plane, -plane];

    let data = volume.as_slice_mut();

    let mut points = data
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v)
        .map(|(i, _)| i)
        .collect::<Vec<_>>();
    let mut candidates = Vec::new();
    let mut iterations = 0;

    loop {
        let mut unchanged = 0;
        for &direction in &directions {
            candidates.clear();
            for &idx in &points {
                if data[(idx as isize + direction) as usize] {
                    continue;
                }
                let n = gather(data, idx, &offsets);
                if is_endpoint(&n) || !is_euler_invariant(&n) || !is_simple(&n) {
                    continue;
                }
                candidates.push(idx);
            }

            // earlier deletions in this round may have changed the neighborhood
            let mut changed = false;
            for &idx in &candidates {
                if is_simple(&gather(data, idx, &offsets)) {
                    data[idx] = false;
                    changed = true;
                }
            }

            if changed {
                points.retain(|&idx| data[idx]);
            } else {
                unchanged += 1;
            }
        }

        iterations += 1;
        log::debug!(
            "skeletonize_3d: iteration {iterations}, {} voxels left",
            points.len()
        );

        if unchanged == directions.len() {
            break;
        }
    }

    let mut skeleton = Volume::from_size_val(size, false);
    for z in 0..size.depth {
        for y in 0..size.height {
            for x in 0..size.width {
                if volume.get(z + 1, y + 1, x + 1) == Some(&true) {
                    skeleton.set(z, y, x, true)?;
                }
            }
        }
    }

    Ok(skeleton)
}

/// Skeletonize a mask with the Lee-Kashyap-Chu thinning algorithm.
///
/// The mask is handled as a volume of depth one, see [`skeletonize_3d_volume`].
///
/// # Arguments
///
/// * `src` - The input mask.
/// * `dst` - The output skeleton.
pub fn skeletonize_3d(src: &Image<bool, 1>, dst: &mut Image<bool, 1>) -> Result<(), ImageError> {
    check_size(src, dst)?;

    let skeleton = skeletonize_3d_volume(&Volume::from(src))?;
    dst.as_slice_mut().copy_from_slice(skeleton.as_slice());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{is_endpoint, is_euler_invariant, is_simple, neighbor, ADJACENCY, CENTER};
    use charskel_image::{Image, ImageError, ImageSize, Volume, VolumeSize};

    fn neighborhood(cells: &[(isize, isize, isize)]) -> [bool; 27] {
        let mut n = [false; 27];
        n[CENTER] = true;
        for &(dz, dy, dx) in cells {
            n[neighbor(dz, dy, dx)] = true;
        }
        n
    }

    #[test]
    fn adjacency_table() {
        let bits = |cells: &[usize]| cells.iter().fold(0u32, |acc, &i| acc | 1 << i);

        // corner voxel touches its 2x2x2 block, the center left out
        assert_eq!(ADJACENCY[0], bits(&[1, 3, 4, 9, 10, 12]));
        assert_eq!(
            ADJACENCY[neighbor(1, 1, 1)],
            bits(&[14, 16, 17, 22, 23, 25])
        );
        assert_eq!(ADJACENCY[1], bits(&[0, 2, 3, 4, 5, 9, 10, 11, 12, 14]));
        assert_eq!(ADJACENCY[CENTER], 0);
        for (i, &row) in ADJACENCY.iter().enumerate() {
            assert_eq!(row & 1 << i, 0);
        }
    }

    #[test]
    fn topology_checks() {
        let isolated = neighborhood(&[]);
        assert!(!is_euler_invariant(&isolated));
        assert!(!is_simple(&isolated));

        let end = neighborhood(&[(0, 0, 1)]);
        assert!(is_endpoint(&end));
        assert!(is_euler_invariant(&end));
        assert!(is_simple(&end));

        let middle = neighborhood(&[(0, 0, 1), (0, 0, -1)]);
        assert!(!is_euler_invariant(&middle));
        assert!(!is_simple(&middle));

        // removing the center of a full block opens a cavity
        let full = [true; 27];
        assert!(!is_euler_invariant(&full));
        assert!(is_simple(&full));
    }

    #[test]
    fn skeletonize_3d_thin_rectangle() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 12,
            height: 7,
        };
        let mut mask = Image::<bool, 1>::from_size_val(size, false)?;
        for y in 2..5 {
            for x in 1..11 {
                mask.set_pixel(x, y, 0, true)?;
            }
        }
        let mut skeleton = Image::<bool, 1>::from_size_val(size, false)?;
        super::skeletonize_3d(&mask, &mut skeleton)?;

        for y in 0..7 {
            for x in 0..12 {
                let expected = y == 3 && (1..11).contains(&x);
                assert_eq!(*skeleton.get_pixel(x, y, 0)?, expected, "pixel ({x}, {y})");
            }
        }

        Ok(())
    }

    #[test]
    fn skeletonize_3d_rod() -> Result<(), ImageError> {
        let size = VolumeSize {
            width: 5,
            height: 5,
            depth: 9,
        };
        let mut volume = Volume::from_size_val(size, false);
        for z in 1..8 {
            for y in 1..4 {
                for x in 1..4 {
                    volume.set(z, y, x, true)?;
                }
            }
        }

        let skeleton = super::skeletonize_3d_volume(&volume)?;
        assert_eq!(skeleton.size(), size);

        let kept = (0..9)
            .flat_map(|z| (0..5).flat_map(move |y| (0..5).map(move |x| (z, y, x))))
            .filter(|&(z, y, x)| skeleton.get(z, y, x) == Some(&true))
            .collect::<Vec<_>>();
        assert_eq!(kept, (1..8).map(|z| (z, 2, 2)).collect::<Vec<_>>());

        Ok(())
    }

    #[test]
    fn skeletonize_3d_empty() -> Result<(), ImageError> {
        let size = VolumeSize {
            width: 4,
            height: 0,
            depth: 2,
        };
        let skeleton = super::skeletonize_3d_volume(&Volume::from_size_val(size, false))?;
        assert_eq!(skeleton.size(), size);
        assert!(skeleton.as_slice().is_empty());

        Ok(())
    }
}
