use std::collections::{BTreeMap, BTreeSet};

use charskel_image::Image;

/// An iso-line traced through an image.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    /// The vertices as `[x, y]` in pixel coordinates.
    ///
    /// Closed contours repeat their first point at the end.
    pub points: Vec<[f32; 2]>,
    /// Whether the contour forms a loop.
    pub closed: bool,
}

impl Contour {
    /// Returns the number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the contour has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

const TOP: u8 = 0;
const BOTTOM: u8 = 1;
const LEFT: u8 = 2;
const RIGHT: u8 = 3;

// segments per cell configuration, corner bits: ul = 1, ur = 2, ll = 4, lr = 8.
// the saddles (6, 9) keep the high corners apart.
const SEGMENTS: [&[(u8, u8)]; 16] = [
    &[],
    &[(TOP, LEFT)],
    &[(TOP, RIGHT)],
    &[(LEFT, RIGHT)],
    &[(LEFT, BOTTOM)],
    &[(TOP, BOTTOM)],
    &[(TOP, RIGHT), (LEFT, BOTTOM)],
    &[(RIGHT, BOTTOM)],
    &[(RIGHT, BOTTOM)],
    &[(TOP, LEFT), (RIGHT, BOTTOM)],
    &[(TOP, BOTTOM)],
    &[(LEFT, BOTTOM)],
    &[(LEFT, RIGHT)],
    &[(TOP, RIGHT)],
    &[(TOP, LEFT)],
    &[],
];

struct Grid<'a> {
    data: &'a [f32],
    width: usize,
    level: f32,
}

impl Grid<'_> {
    #[inline]
    fn at(&self, r: usize, c: usize) -> f32 {
        self.data[r * self.width + c]
    }

    // horizontal edges have even ids, vertical edges odd ids
    fn edge_id(&self, r: usize, c: usize, side: u8) -> usize {
        let (r, c, vertical) = match side {
            TOP => (r, c, 0),
            BOTTOM => (r + 1, c, 0),
            LEFT => (r, c, 1),
            _ => (r, c + 1, 1),
        };
        (r * self.width + c) * 2 + vertical
    }

    fn crossing(&self, id: usize) -> [f32; 2] {
        let cell = id / 2;
        let (r, c) = (cell / self.width, cell % self.width);
        let v0 = self.at(r, c);
        if id % 2 == 0 {
            let t = (self.level - v0) / (self.at(r, c + 1) - v0);
            [c as f32 + t, r as f32]
        } else {
            let t = (self.level - v0) / (self.at(r + 1, c) - v0);
            [c as f32, r as f32 + t]
        }
    }
}

/// Find the iso-lines of a scalar image at a given level using marching squares.
///
/// A corner is inside when its value is strictly greater than `level`. Ambiguous saddle
/// cells separate the inside corners. Contours reaching the image border stay open, all
/// others are closed. The output order is deterministic.
///
/// # Arguments
///
/// * `src` - The input scalar image.
/// * `level` - The iso value to trace.
///
/// # Returns
///
/// The list of contours with points as `[x, y]`.
///
/// # Examples
///
/// ```
/// use charskel_image::{Image, ImageSize};
/// use charskel_imgproc::contours::find_contours;
///
/// let mut image = Image::<f32, 1>::from_size_val(ImageSize { width: 3, height: 3 }, 0.0).unwrap();
/// image.set_pixel(1, 1, 0, 1.0).unwrap();
///
/// let contours = find_contours(&image, 0.5);
/// assert_eq!(contours.len(), 1);
/// assert!(contours[0].closed);
/// ```
pub fn find_contours(src: &Image<f32, 1>, level: f32) -> Vec<Contour> {
    let (width, height) = (src.cols(), src.rows());
    if width < 2 || height < 2 {
        return Vec::new();
    }

    let grid = Grid {
        data: src.as_slice(),
        width,
        level,
    };

    // every crossing belongs to at most two cells, so nodes have degree one or two
    let mut adjacency: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for r in 0..height - 1 {
        for c in 0..width - 1 {
            let case = (grid.at(r, c) > level) as usize
                | ((grid.at(r, c + 1) > level) as usize) << 1
                | ((grid.at(r + 1, c) > level) as usize) << 2
                | ((grid.at(r + 1, c + 1) > level) as usize) << 3;

            for &(a, b) in SEGMENTS[case] {
                let (a, b) = (grid.edge_id(r, c, a), grid.edge_id(r, c, b));
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            }
        }
    }

    let mut visited = BTreeSet::new();
    let mut contours = Vec::new();

    let walk = |start: usize, visited: &mut BTreeSet<usize>| {
        let mut chain = vec![start];
        visited.insert(start);
        let mut current = start;
        loop {
            let next = adjacency
                .get(&current)
                .and_then(|n| n.iter().copied().find(|id| !visited.contains(id)));
            let Some(next) = next else {
                break;
            };
            visited.insert(next);
            chain.push(next);
            current = next;
        }
        chain
    };

    // open chains start at their endpoints
    let endpoints = adjacency
        .iter()
        .filter(|(_, n)| n.len() == 1)
        .map(|(&id, _)| id)
        .collect::<Vec<_>>();
    for id in endpoints {
        if visited.contains(&id) {
            continue;
        }
        let chain = walk(id, &mut visited);
        contours.push(Contour {
            points: chain.iter().map(|&e| grid.crossing(e)).collect(),
            closed: false,
        });
    }

    let remaining = adjacency.keys().copied().collect::<Vec<_>>();
    for id in remaining {
        if visited.contains(&id) {
            continue;
        }
        let chain = walk(id, &mut visited);
        let mut points = chain.iter().map(|&e| grid.crossing(e)).collect::<Vec<_>>();
        if let Some(&first) = points.first() {
            points.push(first);
        }
        contours.push(Contour {
            points,
            closed: true,
        });
    }

    log::debug!("traced {} contours at level {level}", contours.len());

    contours
}

#[cfg(test)]
mod tests {
    use charskel_image::{Image, ImageError, ImageSize};

    #[test]
    fn contour_single_pixel() -> Result<(), ImageError> {
        let mut image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 5,
                height: 5,
            },
            0.0,
        )?;
        image.set_pixel(2, 2, 0, 1.0)?;

        let contours = super::find_contours(&image, 0.5);
        assert_eq!(contours.len(), 1);

        let contour = &contours[0];
        assert!(contour.closed);
        assert_eq!(contour.len(), 5);
        assert_eq!(contour.points.first(), contour.points.last());

        let mut points = contour.points[..4].to_vec();
        points.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        assert_eq!(
            points,
            vec![[1.5, 2.0], [2.0, 1.5], [2.0, 2.5], [2.5, 2.0]]
        );

        Ok(())
    }

    #[test]
    fn contour_open_at_border() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<f32, 1>::new(
            ImageSize { width: 3, height: 3 },
            vec![
                1.0, 0.0, 0.0,
                1.0, 0.0, 0.0,
                1.0, 0.0, 0.0,
            ],
        )?;

        let contours = super::find_contours(&image, 0.5);
        assert_eq!(contours.len(), 1);
        assert!(!contours[0].closed);
        assert_eq!(contours[0].points, vec![[0.5, 0.0], [0.5, 1.0], [0.5, 2.0]]);

        Ok(())
    }

    #[test]
    fn contour_saddle_separates_high_corners() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<f32, 1>::new(
            ImageSize { width: 4, height: 4 },
            vec![
                0.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 0.0,
            ],
        )?;

        let contours = super::find_contours(&image, 0.5);
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().all(|c| c.closed && c.len() == 5));

        Ok(())
    }

    #[test]
    fn contour_flat_image() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 4,
                height: 3,
            },
            1.0,
        )?;
        assert!(super::find_contours(&image, 0.5).is_empty());

        Ok(())
    }
}
