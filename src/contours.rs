// Pure Rust contour tracing over a binary mask.
// Outer borders are followed with an 8-connected clockwise Moore search; each
// call owns its label buffer, so tracing is safe to run from many threads.

use ndarray::Array2;

use crate::geometry::Point2f;
use crate::map::BinaryMask;

/// 8-connectivity, clockwise in image coordinates (y down), starting East.
const DIR: [(i32, i32); 8] = [
    (1, 0),   // 0: East
    (1, 1),   // 1: SE
    (0, 1),   // 2: South
    (-1, 1),  // 3: SW
    (-1, 0),  // 4: West
    (-1, -1), // 5: NW
    (0, -1),  // 6: North
    (1, -1),  // 7: NE
];

#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<(i32, i32)>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area (shoelace over the pixel coordinates).
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let mut twice = 0i64;
        for i in 0..n {
            let (x1, y1) = self.points[i];
            let (x2, y2) = self.points[(i + 1) % n];
            twice += x1 as i64 * y2 as i64 - x2 as i64 * y1 as i64;
        }
        twice.abs() as f64 * 0.5
    }

    pub fn to_points(&self) -> Vec<Point2f> {
        self.points.iter().map(|&p| Point2f::from(p)).collect()
    }
}

/// Result of one tracing pass.
#[derive(Debug, Clone, Default)]
pub struct ContourSet {
    /// Contours with at least 3 points, largest enclosed area first.
    pub contours: Vec<Contour>,
    /// Foreground pixels that received a region label.
    pub labeled_pixels: usize,
    /// Traces dropped for having fewer than 3 points.
    pub discarded: usize,
}

/// Find outer-border contours of the foreground regions in `mask`.
///
/// The mask is scanned row-major; an unlabeled foreground pixel whose left
/// neighbour is background (or the image edge) starts a new trace. Equal
/// areas keep their discovery order.
pub fn find_contours(mask: &BinaryMask) -> ContourSet {
    let (width, height) = (mask.width(), mask.height());
    let mut labels = Array2::<u32>::zeros((height, width));
    let mut set = ContourSet::default();
    let mut label = 1u32;

    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) || labels[[y, x]] != 0 {
                continue;
            }
            if x > 0 && mask.get(x - 1, y) {
                continue;
            }

            let border = follow_border(mask, &mut labels, (x as i32, y as i32), label);
            label += 1;

            if border.len() >= 3 {
                set.contours.push(Contour { points: border });
            } else {
                set.discarded += 1;
            }
        }
    }

    set.labeled_pixels = labels.iter().filter(|&&l| l != 0).count();

    // Stable sort: ties stay in row-major discovery order.
    let mut keyed: Vec<(f64, Contour)> = set
        .contours
        .drain(..)
        .map(|c| (c.area(), c))
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    set.contours = keyed.into_iter().map(|(_, c)| c).collect();

    set
}

/// Walk the border from `start` until it is back at `start` and about to
/// repeat its first move, labelling every visited pixel. A start pixel that
/// joins two lobes is passed through once per lobe before the walk closes.
fn follow_border(
    mask: &BinaryMask,
    labels: &mut Array2<u32>,
    start: (i32, i32),
    label: u32,
) -> Vec<(i32, i32)> {
    let mut border = vec![start];
    labels[[start.1 as usize, start.0 as usize]] = label;

    // Treat the start as entered moving East: the search begins at NW,
    // just clockwise of the background pixel to the West.
    let mut dir = 0usize;
    let (mut cx, mut cy) = start;
    let mut first_move: Option<usize> = None;

    // A closed border visits each pixel at most 4 times.
    let max_steps = 4 * mask.width() * mask.height() + 8;

    for _ in 0..max_steps {
        let next = (0..8).map(|k| (dir + 5 + k) % 8).find_map(|d| {
            let (dx, dy) = DIR[d];
            let (nx, ny) = (cx + dx, cy + dy);
            mask.is_foreground(nx, ny).then_some((d, nx, ny))
        });

        let Some((d, nx, ny)) = next else {
            // Isolated pixel, open contour.
            break;
        };

        match first_move {
            None => first_move = Some(d),
            Some(first) if (cx, cy) == start && d == first => break,
            Some(_) => {}
        }

        labels[[ny as usize, nx as usize]] = label;
        border.push((nx, ny));
        cx = nx;
        cy = ny;
        dir = d;
    }

    // The closing step re-enters the start pixel; keep it once.
    if border.len() > 1 && border.last() == Some(&start) {
        border.pop();
    }

    border
}
