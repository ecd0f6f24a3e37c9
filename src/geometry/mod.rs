//! Pixel geometry for detected text
//!
//! OCR services report text positions normalized to the unit square. This
//! module maps those shapes onto concrete pixel rectangles for a given image
//! size. Columns scale by image width and rows by image height; polygons are
//! reduced to their axis-aligned bounding box.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while mapping normalized geometry to pixels
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid image dimensions {width}x{height}")]
    InvalidImageDimensions { width: u32, height: u32 },

    #[error("polygon has no points")]
    EmptyPolygon,
}

/// Axis-aligned box with all fields in [0, 1], relative to image size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Single polygon vertex in [0, 1] coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

/// Geometry attached to a detected text block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextGeometry {
    /// Axis-aligned bounding box
    BoundingBox(NormalizedBox),
    /// Ordered vertex sequence (typically four corners)
    Polygon(Vec<NormalizedPoint>),
}

/// Rectangle in absolute pixel coordinates
///
/// Invariant: `x1 <= x2 <= image width` and `y1 <= y2 <= image height` once
/// produced by [`to_pixel_box`] or [`PixelBox::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelBox {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// True when the box covers no pixels
    pub fn is_empty(&self) -> bool {
        self.x1 == self.x2 || self.y1 == self.y2
    }

    /// Constrain the box to a `width` x `height` image
    pub fn clamped(self, width: u32, height: u32) -> PixelBox {
        PixelBox {
            x1: self.x1.min(width),
            y1: self.y1.min(height),
            x2: self.x2.min(width),
            y2: self.y2.min(height),
        }
    }
}

/// Map normalized geometry onto pixel coordinates for an image of the given
/// size. The result is clamped into the image bounds.
pub fn to_pixel_box(
    geometry: &TextGeometry,
    image_width: u32,
    image_height: u32,
) -> Result<PixelBox, GeometryError> {
    if image_width == 0 || image_height == 0 {
        return Err(GeometryError::InvalidImageDimensions {
            width: image_width,
            height: image_height,
        });
    }

    let w = image_width as f32;
    let h = image_height as f32;

    let (x1, y1, x2, y2) = match geometry {
        TextGeometry::BoundingBox(b) => {
            let x1 = (b.left * w).round();
            let y1 = (b.top * h).round();
            let x2 = x1 + (b.width * w).round();
            let y2 = y1 + (b.height * h).round();
            (x1, y1, x2, y2)
        }
        TextGeometry::Polygon(points) => {
            if points.is_empty() {
                return Err(GeometryError::EmptyPolygon);
            }
            let min_x = points.iter().map(|p| p.x * w).fold(f32::INFINITY, f32::min);
            let min_y = points.iter().map(|p| p.y * h).fold(f32::INFINITY, f32::min);
            let max_x = points.iter().map(|p| p.x * w).fold(f32::NEG_INFINITY, f32::max);
            let max_y = points.iter().map(|p| p.y * h).fold(f32::NEG_INFINITY, f32::max);
            (min_x.round(), min_y.round(), max_x.round(), max_y.round())
        }
    };

    let (x1, x2) = (x1.min(x2), x1.max(x2));
    let (y1, y2) = (y1.min(y2), y1.max(y2));

    Ok(PixelBox {
        x1: clamp_axis(x1, image_width),
        y1: clamp_axis(y1, image_height),
        x2: clamp_axis(x2, image_width),
        y2: clamp_axis(y2, image_height),
    })
}

/// Clamp a rounded coordinate into [0, max]
fn clamp_axis(value: f32, max: u32) -> u32 {
    (value.max(0.0) as i64).min(i64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(left: f32, top: f32, width: f32, height: f32) -> TextGeometry {
        TextGeometry::BoundingBox(NormalizedBox {
            left,
            top,
            width,
            height,
        })
    }

    #[test]
    fn test_box_maps_columns_by_width_rows_by_height() {
        // 1000 wide, 2000 tall
        let result = to_pixel_box(&boxed(0.1, 0.05, 0.3, 0.04), 1000, 2000).unwrap();

        assert_eq!(
            result,
            PixelBox {
                x1: 100,
                y1: 100,
                x2: 400,
                y2: 180
            }
        );
    }

    #[test]
    fn test_box_output_stays_within_image_bounds() {
        let cases = [
            boxed(0.0, 0.0, 1.0, 1.0),
            boxed(0.9, 0.9, 0.3, 0.3),
            boxed(0.5, 0.5, 0.0, 0.0),
            boxed(0.999, 0.001, 0.002, 0.998),
        ];

        for geometry in &cases {
            let b = to_pixel_box(geometry, 640, 480).unwrap();
            assert!(b.x1 <= b.x2, "x order violated for {geometry:?}");
            assert!(b.y1 <= b.y2, "y order violated for {geometry:?}");
            assert!(b.x2 <= 640, "x2 out of bounds for {geometry:?}");
            assert!(b.y2 <= 480, "y2 out of bounds for {geometry:?}");
        }
    }

    #[test]
    fn test_overflowing_box_is_clamped() {
        let b = to_pixel_box(&boxed(0.9, 0.9, 0.5, 0.5), 100, 100).unwrap();
        assert_eq!(b, PixelBox { x1: 90, y1: 90, x2: 100, y2: 100 });
    }

    #[test]
    fn test_polygon_reduces_to_bounding_box() {
        let geometry = TextGeometry::Polygon(vec![
            NormalizedPoint { x: 0.2, y: 0.1 },
            NormalizedPoint { x: 0.6, y: 0.1 },
            NormalizedPoint { x: 0.6, y: 0.3 },
            NormalizedPoint { x: 0.2, y: 0.3 },
        ]);

        let b = to_pixel_box(&geometry, 500, 1000).unwrap();
        assert_eq!(b, PixelBox { x1: 100, y1: 100, x2: 300, y2: 300 });
    }

    #[test]
    fn test_skewed_polygon_covers_all_vertices() {
        let geometry = TextGeometry::Polygon(vec![
            NormalizedPoint { x: 0.5, y: 0.1 },
            NormalizedPoint { x: 0.9, y: 0.5 },
            NormalizedPoint { x: 0.5, y: 0.9 },
            NormalizedPoint { x: 0.1, y: 0.5 },
        ]);

        let b = to_pixel_box(&geometry, 100, 100).unwrap();
        assert_eq!(b, PixelBox { x1: 10, y1: 10, x2: 90, y2: 90 });
    }

    #[test]
    fn test_empty_polygon_is_rejected() {
        let result = to_pixel_box(&TextGeometry::Polygon(vec![]), 100, 100);
        assert!(matches!(result, Err(GeometryError::EmptyPolygon)));
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        let geometry = boxed(0.1, 0.1, 0.5, 0.5);

        assert!(matches!(
            to_pixel_box(&geometry, 0, 100),
            Err(GeometryError::InvalidImageDimensions { width: 0, height: 100 })
        ));
        assert!(matches!(
            to_pixel_box(&geometry, 100, 0),
            Err(GeometryError::InvalidImageDimensions { width: 100, height: 0 })
        ));
    }

    #[test]
    fn test_clamped_constrains_oversized_box() {
        let b = PixelBox { x1: 10, y1: 20, x2: 500, y2: 700 };
        assert_eq!(
            b.clamped(100, 100),
            PixelBox { x1: 10, y1: 20, x2: 100, y2: 100 }
        );
    }

    #[test]
    fn test_empty_box_detection() {
        assert!(PixelBox { x1: 5, y1: 5, x2: 5, y2: 9 }.is_empty());
        assert!(PixelBox { x1: 5, y1: 5, x2: 9, y2: 5 }.is_empty());
        assert!(!PixelBox { x1: 5, y1: 5, x2: 9, y2: 9 }.is_empty());
    }
}
