//! Confidence map and binary mask rasters.

use image::{GrayImage, Luma};
use ndarray::{Array2, Array4, ArrayView2, Axis};

use crate::error::DetError;

/// Per-pixel text confidence produced by the detection network, row-major H×W.
#[derive(Debug, Clone)]
pub struct ConfidenceMap {
    data: Array2<f32>,
}

impl ConfidenceMap {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// Build a map from a flat row-major buffer. The buffer length must be
    /// exactly `height * width`.
    pub fn from_shape_vec(height: usize, width: usize, values: Vec<f32>) -> Result<Self, DetError> {
        let data = Array2::from_shape_vec((height, width), values)?;
        Ok(Self { data })
    }

    /// Take the single channel of a `(1, 1, H, W)` detector output.
    pub fn from_nchw(pred: &Array4<f32>) -> Result<Self, DetError> {
        let (n, c, h, w) = pred.dim();
        if n != 1 || c != 1 {
            return Err(DetError::InvalidInputShape(format!(
                "expected (1, 1, H, W), got ({n}, {c}, {h}, {w})"
            )));
        }
        let data = pred
            .index_axis(Axis(0), 0)
            .index_axis(Axis(0), 0)
            .to_owned();
        Ok(Self { data })
    }

    /// Maps stored as 8-bit images are scaled into [0, 1].
    pub fn from_gray_image(img: &GrayImage) -> Self {
        let (width, height) = img.dimensions();
        let data = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            img.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
        });
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[[y, x]]
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// Threshold into a foreground mask: `mask[y, x] = map[y, x] > thresh`.
    /// NaN never passes the comparison and is background.
    pub fn binarize(&self, thresh: f32) -> BinaryMask {
        BinaryMask {
            data: self.data.mapv(|v| v > thresh),
        }
    }
}

/// Foreground mask with the same dimensions as the map it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    data: Array2<bool>,
}

impl BinaryMask {
    pub fn new(data: Array2<bool>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[[y, x]]
    }

    /// Bounds-checked lookup; anything outside the raster is background.
    #[inline]
    pub fn is_foreground(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.data
            .get([y as usize, x as usize])
            .copied()
            .unwrap_or(false)
    }

    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// 2x2 dilation with the kernel anchored at the top-left: a pixel becomes
    /// foreground if it or its right, lower or lower-right neighbour is.
    pub fn dilate_2x2(&self) -> BinaryMask {
        let (height, width) = self.data.dim();
        let data = Array2::from_shape_fn((height, width), |(y, x)| {
            let x1 = (x + 1).min(width - 1);
            let y1 = (y + 1).min(height - 1);
            self.data[[y, x]] || self.data[[y, x1]] || self.data[[y1, x]] || self.data[[y1, x1]]
        });
        BinaryMask { data }
    }

    /// Render as a 0/255 grayscale image for inspection.
    pub fn to_gray_image(&self) -> GrayImage {
        let mut img = GrayImage::new(self.width() as u32, self.height() as u32);
        for ((y, x), &v) in self.data.indexed_iter() {
            img.put_pixel(x as u32, y as u32, Luma([if v { 255 } else { 0 }]));
        }
        img
    }
}
