use ndarray::Array4;
use tracing::{debug, trace};

use crate::contours::find_contours;
use crate::det::{assemble_regions, Candidate, DetectedRegion};
use crate::error::DetError;
use crate::geometry::{
    bounds, convex_hull, is_simple_polygon, min_area_rect, order_points_clockwise,
    point_in_polygon, MinAreaRect, Point2f, Size,
};
use crate::map::ConfidenceMap;
use crate::simplify::simplify;
use crate::types::{BoxType, DetOptions, ScoreMode};
use crate::unclip::unclip;

/// Converts a DB confidence map into scored text regions.
///
/// Holds only validated options; every call allocates its own scratch
/// buffers, so one instance can serve many threads.
#[derive(Debug, Clone)]
pub struct DBPostProcess {
    options: DetOptions,
}

impl DBPostProcess {
    pub fn new(options: DetOptions) -> Result<Self, DetError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &DetOptions {
        &self.options
    }

    /// Run on the raw `(1, 1, H, W)` detector output.
    pub fn process_nchw(
        &self,
        pred: &Array4<f32>,
        original: Size,
    ) -> Result<Vec<DetectedRegion>, DetError> {
        let map = ConfidenceMap::from_nchw(pred)?;
        self.process(&map, original)
    }

    /// Extract regions from `map`, scaled into an image of size `original`.
    pub fn process(
        &self,
        map: &ConfidenceMap,
        original: Size,
    ) -> Result<Vec<DetectedRegion>, DetError> {
        if original.width == 0 || original.height == 0 {
            return Err(DetError::InvalidImageSize {
                width: original.width,
                height: original.height,
            });
        }
        if map.is_empty() {
            return Ok(Vec::new());
        }

        let opts = &self.options;
        let mask = map.binarize(opts.thresh);
        let mask = if opts.use_dilation {
            mask.dilate_2x2()
        } else {
            mask
        };

        let traced = find_contours(&mask);
        debug!(
            contours = traced.contours.len(),
            discarded = traced.discarded,
            labeled_pixels = traced.labeled_pixels,
            "traced binary mask"
        );

        let mut candidates = Vec::new();
        for contour in traced.contours.iter().take(opts.max_candidates) {
            let points = contour.to_points();
            if let Some(candidate) = self.candidate_from_contour(map, &points) {
                candidates.push(candidate);
            }
        }

        let map_size = Size::new(map.width() as u32, map.height() as u32);
        let regions = assemble_regions(candidates, map_size, original, opts.min_box_area);
        debug!(regions = regions.len(), "extracted text regions");
        Ok(regions)
    }

    fn candidate_from_contour(&self, map: &ConfidenceMap, contour: &[Point2f]) -> Option<Candidate> {
        let opts = &self.options;

        let simplified = simplify(contour, opts.simplify_epsilon);
        if simplified.len() < 3 {
            trace!(points = simplified.len(), "contour collapsed by simplification");
            return None;
        }

        let hull = convex_hull(&simplified);
        let rect = min_area_rect(&hull);
        if rect.short_side() < opts.min_size {
            trace!(short_side = rect.short_side(), "candidate too thin");
            return None;
        }

        let score = match opts.score_mode {
            ScoreMode::Fast => box_score_fast(map, &rect.points),
            ScoreMode::Slow => box_score_fast(map, contour),
        };
        if score < opts.box_thresh {
            trace!(score, "candidate below box threshold");
            return None;
        }

        let polygon = match opts.box_type {
            BoxType::Quad => {
                let expanded = unclip(&rect.points, opts.unclip_ratio, opts.max_miter);
                let rect2 = min_area_rect(&convex_hull(&expanded));
                if rect2.short_side() < opts.min_size + 2.0 {
                    trace!(short_side = rect2.short_side(), "expanded box too thin");
                    return None;
                }
                order_points_clockwise(rect2.points).to_vec()
            }
            BoxType::Poly => self.expand_polygon(simplified, hull, rect)?,
        };

        Some(Candidate { polygon, score })
    }

    fn expand_polygon(
        &self,
        simplified: Vec<Point2f>,
        hull: Vec<Point2f>,
        rect: MinAreaRect,
    ) -> Option<Vec<Point2f>> {
        let opts = &self.options;

        // Offsetting needs a consistent winding; a self-intersecting outline
        // has none, so its hull stands in for it.
        let outline = if is_simple_polygon(&simplified) {
            simplified
        } else {
            trace!("self-intersecting contour replaced by its convex hull");
            if hull.len() >= 3 {
                hull
            } else {
                rect.points.to_vec()
            }
        };

        let expanded = unclip(&outline, opts.unclip_ratio, opts.max_miter);
        let rect2 = min_area_rect(&convex_hull(&expanded));
        if rect2.short_side() < opts.min_size + 2.0 {
            trace!(short_side = rect2.short_side(), "expanded polygon too thin");
            return None;
        }
        Some(expanded)
    }
}

/// Mean map value over the pixels whose centre lies inside `polygon`.
///
/// Only the polygon's integer bounding box, clamped to the map, is visited.
/// Non-finite map values are skipped; no covered pixel scores 0.
pub fn box_score_fast(map: &ConfidenceMap, polygon: &[Point2f]) -> f32 {
    if polygon.len() < 3 || map.is_empty() {
        return 0.0;
    }

    let w = map.width() as i32;
    let h = map.height() as i32;
    let (min_x, max_x, min_y, max_y) = bounds(polygon);

    let xmin = (min_x.floor() as i32).clamp(0, w - 1);
    let xmax = (max_x.ceil() as i32).clamp(0, w - 1);
    let ymin = (min_y.floor() as i32).clamp(0, h - 1);
    let ymax = (max_y.ceil() as i32).clamp(0, h - 1);

    let mut sum = 0.0f64;
    let mut count = 0usize;
    for y in ymin..=ymax {
        for x in xmin..=xmax {
            if !point_in_polygon(x as f32 + 0.5, y as f32 + 0.5, polygon) {
                continue;
            }
            let v = map.get(x as usize, y as usize);
            if v.is_finite() {
                sum += v as f64;
                count += 1;
            }
        }
    }

    if count == 0 {
        0.0
    } else {
        (sum / count as f64) as f32
    }
}
