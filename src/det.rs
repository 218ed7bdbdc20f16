use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::geometry::{bounds, Point2f, Size};

/// Axis-aligned integer box in original-image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Smallest integer box covering every point.
    pub fn from_points(points: &[Point2f]) -> Self {
        if points.is_empty() {
            return Self { x: 0, y: 0, width: 0, height: 0 };
        }
        let (min_x, max_x, min_y, max_y) = bounds(points);
        let x = min_x.floor() as i32;
        let y = min_y.floor() as i32;
        Self {
            x,
            y,
            width: max_x.ceil() as i32 - x,
            height: max_y.ceil() as i32 - y,
        }
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// One text region handed to recognition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
    pub bbox: BoundingBox,
    /// Mean confidence inside the region, in map units.
    pub score: f32,
    /// Region outline in original-image coordinates.
    pub polygon: Vec<Point2f>,
}

impl DetectedRegion {
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        let mut ring: Vec<Coord<f64>> = self
            .polygon
            .iter()
            .map(|p| Coord { x: p.x as f64, y: p.y as f64 })
            .collect();
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        Polygon::new(LineString(ring), vec![])
    }
}

impl From<&DetectedRegion> for Polygon<f64> {
    fn from(region: &DetectedRegion) -> Self {
        region.to_geo_polygon()
    }
}

/// A polygon in map coordinates that passed scoring.
#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub polygon: Vec<Point2f>,
    pub score: f32,
}

/// Scale candidates into the original image, drop boxes smaller than
/// `min_box_area` and sort the rest into reading order (top-to-bottom, then
/// left-to-right).
pub(crate) fn assemble_regions(
    candidates: Vec<Candidate>,
    map_size: Size,
    original: Size,
    min_box_area: u32,
) -> Vec<DetectedRegion> {
    let scale_x = original.width as f32 / map_size.width as f32;
    let scale_y = original.height as f32 / map_size.height as f32;
    let max_x = original.width.saturating_sub(1) as f32;
    let max_y = original.height.saturating_sub(1) as f32;

    let mut regions: Vec<DetectedRegion> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let polygon: Vec<Point2f> = candidate
                .polygon
                .iter()
                .map(|p| {
                    Point2f::new(
                        (p.x * scale_x).clamp(0.0, max_x),
                        (p.y * scale_y).clamp(0.0, max_y),
                    )
                })
                .collect();

            let bbox = BoundingBox::from_points(&polygon);
            if bbox.area() < min_box_area as i64 {
                tracing::trace!(?bbox, "region below minimum box area");
                return None;
            }

            Some(DetectedRegion {
                bbox,
                score: candidate.score,
                polygon,
            })
        })
        .collect();

    sorted_regions(&mut regions);
    regions
}

/// Stable, so regions sharing a box origin keep their candidate order.
fn sorted_regions(regions: &mut [DetectedRegion]) {
    regions.sort_by(|a, b| (a.bbox.y, a.bbox.x).cmp(&(b.bbox.y, b.bbox.x)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, side: f32) -> Vec<Point2f> {
        vec![
            Point2f::new(x, y),
            Point2f::new(x + side, y),
            Point2f::new(x + side, y + side),
            Point2f::new(x, y + side),
        ]
    }

    #[test]
    fn test_bounding_box_from_points() {
        let bbox = BoundingBox::from_points(&[
            Point2f::new(1.2, 3.7),
            Point2f::new(5.5, 2.1),
            Point2f::new(4.0, 8.9),
        ]);
        assert_eq!(bbox, BoundingBox { x: 1, y: 2, width: 5, height: 7 });
        assert_eq!(bbox.area(), 35);
    }

    #[test]
    fn test_assemble_scales_to_original_size() {
        let candidates = vec![Candidate {
            polygon: square(10.0, 10.0, 10.0),
            score: 0.8,
        }];
        let regions = assemble_regions(candidates, Size::new(100, 100), Size::new(200, 300), 10);
        assert_eq!(regions.len(), 1);
        assert_eq!(
            regions[0].bbox,
            BoundingBox { x: 20, y: 30, width: 20, height: 30 }
        );
        assert_eq!(regions[0].score, 0.8);
    }

    #[test]
    fn test_assemble_filters_small_and_sorts_reading_order() {
        let candidates = vec![
            Candidate { polygon: square(50.0, 40.0, 10.0), score: 0.9 },
            Candidate { polygon: square(60.0, 5.0, 10.0), score: 0.9 },
            Candidate { polygon: square(10.0, 5.0, 10.0), score: 0.9 },
            Candidate { polygon: square(30.0, 70.0, 2.0), score: 0.9 },
        ];
        let regions = assemble_regions(candidates, Size::new(100, 100), Size::new(100, 100), 10);

        assert_eq!(regions.len(), 3);
        let origins: Vec<(i32, i32)> = regions.iter().map(|r| (r.bbox.x, r.bbox.y)).collect();
        assert_eq!(origins, vec![(10, 5), (60, 5), (50, 40)]);
        assert!(regions.iter().all(|r| r.bbox.area() >= 10));
    }

    #[test]
    fn test_assemble_clips_to_image() {
        let candidates = vec![Candidate {
            polygon: square(-4.0, 90.0, 20.0),
            score: 0.7,
        }];
        let regions = assemble_regions(candidates, Size::new(100, 100), Size::new(100, 100), 10);
        let bbox = regions[0].bbox;
        assert_eq!((bbox.x, bbox.y), (0, 90));
        assert_eq!((bbox.x + bbox.width, bbox.y + bbox.height), (16, 99));
    }

    #[test]
    fn test_geo_polygon_is_closed() {
        let region = DetectedRegion {
            bbox: BoundingBox { x: 0, y: 0, width: 4, height: 4 },
            score: 1.0,
            polygon: square(0.0, 0.0, 4.0),
        };
        let poly: Polygon<f64> = (&region).into();
        let ring = &poly.exterior().0;
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_region_serializes_to_json() {
        let region = DetectedRegion {
            bbox: BoundingBox { x: 1, y: 2, width: 3, height: 4 },
            score: 0.5,
            polygon: square(1.0, 2.0, 3.0),
        };
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json["bbox"]["width"], 3);
        assert_eq!(json["polygon"].as_array().map(Vec::len), Some(4));
    }
}
