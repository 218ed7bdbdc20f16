//! Planar geometry over sub-pixel points: areas, convex hull, minimum-area
//! rectangle (rotating calipers) and point-in-polygon.

use std::cmp::Ordering;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Edges shorter than this are treated as degenerate.
pub(crate) const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2f {
    pub x: f32,
    pub y: f32,
}

impl Point2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub(crate) fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x as f64, self.y as f64)
    }

    pub(crate) fn from_vector(v: Vector2<f64>) -> Self {
        Self::new(v.x as f32, v.y as f32)
    }
}

impl From<(i32, i32)> for Point2f {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x as f32, y as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Shoelace area; positive when the vertices wind counter-clockwise in the
/// algebraic (x right, y up) sense.
pub fn signed_area(points: &[Point2f]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0f64;
    for i in 0..n {
        let p1 = points[i];
        let p2 = points[(i + 1) % n];
        area += p1.x as f64 * p2.y as f64 - p2.x as f64 * p1.y as f64;
    }
    area * 0.5
}

pub fn polygon_area(points: &[Point2f]) -> f64 {
    signed_area(points).abs()
}

/// Length of the closed boundary, including the edge from last to first.
pub fn perimeter(points: &[Point2f]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }

    (0..n)
        .map(|i| (points[(i + 1) % n].to_vector() - points[i].to_vector()).norm())
        .sum()
}

/// Ray-casting even-odd test.
pub fn point_in_polygon(x: f32, y: f32, polygon: &[Point2f]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let xi = polygon[i].x;
        let yi = polygon[i].y;
        let xj = polygon[j].x;
        let yj = polygon[j].y;

        let intersect = ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi);
        if intersect {
            inside = !inside;
        }
        j = i;
    }

    inside
}

fn cross(o: Point2f, a: Point2f, b: Point2f) -> f64 {
    (a.x as f64 - o.x as f64) * (b.y as f64 - o.y as f64)
        - (a.y as f64 - o.y as f64) * (b.x as f64 - o.x as f64)
}

/// Andrew's monotone chain. The hull is counter-clockwise, starts at the
/// lowest (x, y) point and contains no collinear vertices.
pub fn convex_hull(points: &[Point2f]) -> Vec<Point2f> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y)));

    let mut lower: Vec<Point2f> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point2f> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    // Each chain ends where the other starts.
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Oriented bounding rectangle. `width` runs along the edge from
/// `points[0]` to `points[1]`, `height` from `points[1]` to `points[2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinAreaRect {
    pub points: [Point2f; 4],
    pub width: f32,
    pub height: f32,
}

impl MinAreaRect {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn short_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Minimum-area enclosing rectangle of a convex hull (rotating calipers).
///
/// Every hull edge is tried as the rectangle axis; on equal areas the first
/// edge in hull order wins. Hulls with fewer than three points or only
/// degenerate edges fall back to the axis-aligned bounding box.
pub fn min_area_rect(hull: &[Point2f]) -> MinAreaRect {
    if hull.is_empty() {
        return MinAreaRect {
            points: [Point2f::default(); 4],
            width: 0.0,
            height: 0.0,
        };
    }

    let n = hull.len();
    let mut best: Option<(f64, Vector2<f64>, Vector2<f64>, [f64; 4])> = None;

    if n >= 3 {
        for i in 0..n {
            let edge = hull[(i + 1) % n].to_vector() - hull[i].to_vector();
            let edge_len = edge.norm();
            if edge_len < EPS {
                continue;
            }

            let u = edge / edge_len;
            let v = Vector2::new(-u.y, u.x);

            let mut min_u = f64::MAX;
            let mut max_u = f64::MIN;
            let mut min_v = f64::MAX;
            let mut max_v = f64::MIN;
            for pt in hull {
                let p = pt.to_vector();
                let pu = p.dot(&u);
                let pv = p.dot(&v);
                min_u = min_u.min(pu);
                max_u = max_u.max(pu);
                min_v = min_v.min(pv);
                max_v = max_v.max(pv);
            }

            let area = (max_u - min_u) * (max_v - min_v);
            if best.as_ref().map_or(true, |(best_area, ..)| area < *best_area) {
                best = Some((area, u, v, [min_u, max_u, min_v, max_v]));
            }
        }
    }

    let Some((_, u, v, [min_u, max_u, min_v, max_v])) = best else {
        return axis_aligned_rect(hull);
    };

    let corner = |a: f64, b: f64| Point2f::from_vector(u * a + v * b);
    MinAreaRect {
        points: [
            corner(min_u, min_v),
            corner(max_u, min_v),
            corner(max_u, max_v),
            corner(min_u, max_v),
        ],
        width: (max_u - min_u) as f32,
        height: (max_v - min_v) as f32,
    }
}

fn axis_aligned_rect(points: &[Point2f]) -> MinAreaRect {
    let (min_x, max_x, min_y, max_y) = bounds(points);
    MinAreaRect {
        points: [
            Point2f::new(min_x, min_y),
            Point2f::new(max_x, min_y),
            Point2f::new(max_x, max_y),
            Point2f::new(min_x, max_y),
        ],
        width: max_x - min_x,
        height: max_y - min_y,
    }
}

/// `(min_x, max_x, min_y, max_y)` of a non-empty point set.
pub(crate) fn bounds(points: &[Point2f]) -> (f32, f32, f32, f32) {
    points.iter().fold(
        (f32::MAX, f32::MIN, f32::MAX, f32::MIN),
        |(min_x, max_x, min_y, max_y), p| {
            (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
        },
    )
}

/// Order rectangle corners as top-left, top-right, bottom-right, bottom-left
/// (image coordinates, y pointing down).
pub fn order_points_clockwise(pts: [Point2f; 4]) -> [Point2f; 4] {
    let mut pts_vec = pts.to_vec();
    pts_vec.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

    let (mut tl, mut bl) = (pts_vec[0], pts_vec[1]);
    if tl.y > bl.y {
        std::mem::swap(&mut tl, &mut bl);
    }

    let (mut tr, mut br) = (pts_vec[2], pts_vec[3]);
    if tr.y > br.y {
        std::mem::swap(&mut tr, &mut br);
    }

    [tl, tr, br, bl]
}

/// True when no two non-adjacent edges of the closed polygon intersect.
pub fn is_simple_polygon(points: &[Point2f]) -> bool {
    let n = points.len();
    if n < 4 {
        return n == 3 && polygon_area(points) > EPS;
    }

    for i in 0..n {
        let a1 = points[i];
        let a2 = points[(i + 1) % n];
        for j in (i + 2)..n {
            // First and last edge share a vertex.
            if i == 0 && j == n - 1 {
                continue;
            }
            let b1 = points[j];
            let b2 = points[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

fn segments_intersect(p1: Point2f, p2: Point2f, q1: Point2f, q2: Point2f) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

fn on_segment(a: Point2f, b: Point2f, p: Point2f) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}
