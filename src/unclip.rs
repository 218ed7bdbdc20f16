//! Outward polygon offset ("unclip") compensating the shrunk text kernels a DB
//! detector is trained on.

use nalgebra::Vector2;

use crate::geometry::{perimeter, signed_area, Point2f, EPS};

/// Default clamp of the miter factor at sharp corners.
pub const DEFAULT_MAX_MITER: f32 = 4.0;

/// Offset `polygon` outward by `|area| * ratio / perimeter` with miter joins.
///
/// Each vertex moves along the sum of its two adjacent outward edge normals,
/// scaled by the miter factor `1 / (1 + n1·n2)` capped at `max_miter`; for a
/// right angle this moves both edges out by exactly the offset distance. The
/// direction follows the winding, so clockwise and counter-clockwise input
/// both grow. Polygons with fewer than 3 points, or with zero perimeter, are
/// returned unchanged.
pub fn unclip(polygon: &[Point2f], ratio: f32, max_miter: f32) -> Vec<Point2f> {
    let n = polygon.len();
    if n < 3 {
        return polygon.to_vec();
    }

    let area = signed_area(polygon);
    let length = perimeter(polygon);
    if length < EPS {
        return polygon.to_vec();
    }

    let distance = area.abs() * ratio as f64 / length;
    let outward = if area < 0.0 { -distance } else { distance };
    let max_miter = max_miter as f64;

    (0..n)
        .map(|i| {
            let prev = polygon[(i + n - 1) % n].to_vector();
            let cur = polygon[i].to_vector();
            let next = polygon[(i + 1) % n].to_vector();

            let shift = match (edge_normal(prev, cur), edge_normal(cur, next)) {
                (Some(n1), Some(n2)) => {
                    let denom = 1.0 + n1.dot(&n2);
                    let miter = if denom > EPS {
                        (1.0 / denom).min(max_miter)
                    } else {
                        max_miter
                    };
                    (n1 + n2) * miter
                }
                (Some(normal), None) | (None, Some(normal)) => normal,
                (None, None) => Vector2::zeros(),
            };

            Point2f::from_vector(cur + shift * outward)
        })
        .collect()
}

/// Unit normal of the edge `a -> b` rotated -90°, which points outward for
/// counter-clockwise (positive area) polygons. `None` for degenerate edges.
fn edge_normal(a: Vector2<f64>, b: Vector2<f64>) -> Option<Vector2<f64>> {
    let edge = b - a;
    let len = edge.norm();
    if len < EPS {
        return None;
    }
    Some(Vector2::new(edge.y, -edge.x) / len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_area;

    fn pts(coords: &[(f32, f32)]) -> Vec<Point2f> {
        coords.iter().map(|&(x, y)| Point2f::new(x, y)).collect()
    }

    fn assert_close(a: &[Point2f], b: &[Point2f], tol: f32) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(b) {
            assert!(
                (p.x - q.x).abs() <= tol && (p.y - q.y).abs() <= tol,
                "{p:?} != {q:?}"
            );
        }
    }

    #[test]
    fn test_rectangle_offsets_every_edge_by_distance() {
        // 20x10: area 200, perimeter 60, ratio 1.5 -> d = 5
        let rect = pts(&[(10.0, 10.0), (30.0, 10.0), (30.0, 20.0), (10.0, 20.0)]);
        let expanded = unclip(&rect, 1.5, DEFAULT_MAX_MITER);
        assert_close(
            &expanded,
            &pts(&[(5.0, 5.0), (35.0, 5.0), (35.0, 25.0), (5.0, 25.0)]),
            1e-4,
        );
    }

    #[test]
    fn test_winding_does_not_change_result() {
        let ccw = pts(&[(0.0, 0.0), (8.0, 0.0), (8.0, 4.0), (0.0, 4.0)]);
        let cw: Vec<Point2f> = ccw.iter().rev().copied().collect();

        let grown_ccw = unclip(&ccw, 2.0, DEFAULT_MAX_MITER);
        let grown_cw = unclip(&cw, 2.0, DEFAULT_MAX_MITER);
        let grown_cw_reordered: Vec<Point2f> = grown_cw.iter().rev().copied().collect();

        assert_close(&grown_ccw, &grown_cw_reordered, 1e-4);
        assert!(polygon_area(&grown_cw) > polygon_area(&cw));
    }

    #[test]
    fn test_zero_ratio_is_identity() {
        let poly = pts(&[(1.5, 2.0), (9.25, 3.0), (7.0, 8.5), (2.0, 6.0)]);
        assert_close(&unclip(&poly, 0.0, DEFAULT_MAX_MITER), &poly, 1e-6);
    }

    #[test]
    fn test_expansion_never_shrinks() {
        let polys = [
            pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 3.0), (0.0, 3.0)]),
            pts(&[(5.0, 0.0), (10.0, 5.0), (5.0, 10.0), (0.0, 5.0)]),
            pts(&[(0.0, 0.0), (12.0, 1.0), (6.0, 9.0)]),
        ];
        for poly in &polys {
            for ratio in [0.1f32, 1.0, 1.5, 3.0] {
                let grown = unclip(poly, ratio, DEFAULT_MAX_MITER);
                assert!(polygon_area(&grown) >= polygon_area(poly), "ratio {ratio}");
            }
        }
    }

    #[test]
    fn test_sharp_corner_is_clamped() {
        // Thin sliver: the tip miter factor would be huge without the clamp.
        let sliver = pts(&[(0.0, 0.0), (100.0, 1.0), (0.0, 2.0)]);
        let d = polygon_area(&sliver) * 1.5 / crate::geometry::perimeter(&sliver);
        let grown = unclip(&sliver, 1.5, DEFAULT_MAX_MITER);

        let tip = sliver[1].to_vector();
        let moved = (grown[1].to_vector() - tip).norm();
        // |n1 + n2| <= 2, so the shift is bounded by 2 * max_miter * d.
        assert!(moved <= 2.0 * DEFAULT_MAX_MITER as f64 * d + 1e-6);
        assert!(grown[1].x > sliver[1].x, "tip must still move outward");
    }

    #[test]
    fn test_degenerate_inputs() {
        let two = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(unclip(&two, 1.5, DEFAULT_MAX_MITER), two);

        let point = pts(&[(3.0, 3.0), (3.0, 3.0), (3.0, 3.0)]);
        assert_eq!(unclip(&point, 1.5, DEFAULT_MAX_MITER), point);

        // Repeated vertex: its zero-length edge falls back to the other normal.
        let dup = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let grown = unclip(&dup, 1.0, DEFAULT_MAX_MITER);
        assert!(grown.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert!(polygon_area(&grown) > polygon_area(&dup));
    }
}
