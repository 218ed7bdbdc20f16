use crate::geometry::{Point2f, EPS};

/// Douglas-Peucker simplification of the chain `points[0] ..= points[n-1]`.
///
/// Points farther than `epsilon` from the chord of their segment are kept and
/// the segment is split there. Runs on an explicit work stack, so long nearly
/// collinear runs cannot exhaust the call stack. Fewer than 3 points pass
/// through unchanged.
pub fn simplify(points: &[Point2f], epsilon: f32) -> Vec<Point2f> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let epsilon = epsilon as f64;
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((start, end)) = stack.pop() {
        if end - start < 2 {
            continue;
        }

        let mut max_dist = 0.0f64;
        let mut max_index = start;
        for i in (start + 1)..end {
            let dist = perpendicular_distance(points[i], points[start], points[end]);
            if dist > max_dist {
                max_dist = dist;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((max_index, end));
            stack.push((start, max_index));
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

/// Distance from `p` to the line through `a` and `b`; when the chord is
/// degenerate (closed contours start and end next to each other) the distance
/// to `a` is used instead.
fn perpendicular_distance(p: Point2f, a: Point2f, b: Point2f) -> f64 {
    let chord = b.to_vector() - a.to_vector();
    let offset = p.to_vector() - a.to_vector();
    let len = chord.norm();
    if len < EPS {
        return offset.norm();
    }
    (chord.x * offset.y - chord.y * offset.x).abs() / len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f32, f32)]) -> Vec<Point2f> {
        coords.iter().map(|&(x, y)| Point2f::new(x, y)).collect()
    }

    #[test]
    fn test_collinear_run_collapses_to_endpoints() {
        let line: Vec<Point2f> = (0..50).map(|i| Point2f::new(i as f32, 0.0)).collect();
        assert_eq!(simplify(&line, 2.0), pts(&[(0.0, 0.0), (49.0, 0.0)]));
    }

    #[test]
    fn test_keeps_corner_beyond_tolerance() {
        let chain = pts(&[(0.0, 0.0), (5.0, 0.5), (10.0, 0.0), (10.0, 10.0)]);
        let simplified = simplify(&chain, 2.0);
        assert_eq!(simplified, pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]));
    }

    #[test]
    fn test_small_input_passes_through() {
        let two = pts(&[(0.0, 0.0), (3.0, 4.0)]);
        assert_eq!(simplify(&two, 2.0), two);
        assert!(simplify(&[], 2.0).is_empty());
    }

    #[test]
    fn test_traced_rectangle_keeps_its_corners() {
        // Closed border of a 6x4 block, start and end pixels adjacent.
        let mut ring = Vec::new();
        for x in 0..6 {
            ring.push((x as f32, 0.0));
        }
        for y in 1..4 {
            ring.push((5.0, y as f32));
        }
        for x in (0..5).rev() {
            ring.push((x as f32, 3.0));
        }
        for y in (1..3).rev() {
            ring.push((0.0, y as f32));
        }
        let ring = pts(&ring);
        let simplified = simplify(&ring, 0.5);

        for corner in pts(&[(0.0, 0.0), (5.0, 0.0), (5.0, 3.0), (0.0, 3.0)]) {
            assert!(simplified.contains(&corner), "{corner:?} dropped");
        }
        assert!(simplified.len() < ring.len());
    }

    #[test]
    fn test_long_noisy_run_does_not_overflow() {
        let zigzag: Vec<Point2f> = (0..5_000)
            .map(|i| Point2f::new(i as f32, if i % 2 == 0 { 0.0 } else { 3.0 }))
            .collect();
        let simplified = simplify(&zigzag, 1.0);
        assert_eq!(simplified.len(), zigzag.len());
    }

    #[test]
    fn test_zero_epsilon_drops_only_collinear_points() {
        let chain = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0)]);
        assert_eq!(simplify(&chain, 0.0), pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0)]));
    }
}
