//! # RustO! Det - Text Region Extraction
//!
//! Pure Rust post-processing for DB-style text detectors: turns a per-pixel
//! confidence map into scored, oriented text regions in original-image
//! coordinates, ready to be cropped for recognition.
//!
//! ## Pipeline
//!
//! - **Binarize** the map against `thresh` (optionally with a 2x2 dilation)
//! - **Trace** outer borders of the foreground regions (Moore neighbour)
//! - **Simplify** each border with Douglas-Peucker
//! - **Fit** the minimum-area rectangle over the convex hull
//! - **Score** the candidate by its mean confidence and drop weak ones
//! - **Unclip** the polygon outward to undo the kernel shrinkage
//! - **Scale** into the original image, filter small boxes, sort top-to-bottom
//!
//! ## Quick Start
//!
//! ```rust
//! use rusto_det::{extract_regions, ConfidenceMap, DetOptions, Size};
//!
//! let mut values = vec![0.0f32; 100 * 100];
//! for y in 10..20 {
//!     for x in 10..30 {
//!         values[y * 100 + x] = 0.9;
//!     }
//! }
//! let map = ConfidenceMap::from_shape_vec(100, 100, values)?;
//!
//! let regions = extract_regions(&map, Size::new(100, 100), &DetOptions::default())?;
//! assert_eq!(regions.len(), 1);
//!
//! for region in &regions {
//!     println!("{:?} score={:.3}", region.bbox, region.score);
//! }
//! # Ok::<(), rusto_det::DetError>(())
//! ```

mod contours;
mod det;
mod error;
mod geometry;
mod map;
mod postprocess;
mod simplify;
mod types;
mod unclip;

// Public API exports
pub use crate::contours::{find_contours, Contour, ContourSet};
pub use crate::det::{BoundingBox, DetectedRegion};
pub use crate::error::DetError;
pub use crate::geometry::{
    convex_hull, is_simple_polygon, min_area_rect, order_points_clockwise, perimeter,
    point_in_polygon, polygon_area, signed_area, MinAreaRect, Point2f, Size,
};
pub use crate::map::{BinaryMask, ConfidenceMap};
pub use crate::postprocess::{box_score_fast, DBPostProcess};
pub use crate::simplify::simplify;
pub use crate::types::{BoxType, DetOptions, ScoreMode};
pub use crate::unclip::{unclip, DEFAULT_MAX_MITER};

/// Run the whole extraction with `options` in one call.
///
/// Equivalent to `DBPostProcess::new(options.clone())?.process(map, original)`.
pub fn extract_regions(
    map: &ConfidenceMap,
    original: Size,
    options: &DetOptions,
) -> Result<Vec<DetectedRegion>, DetError> {
    DBPostProcess::new(options.clone())?.process(map, original)
}
