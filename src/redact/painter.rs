//! Region painter
//!
//! Burns planned regions onto the image buffer: an opaque fill wipes the
//! pixels, a contrasting outline keeps the edit visible for audit. The
//! buffer is mutated in place; the invocation owns it exclusively.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use tracing::{debug, info};

use super::RedactionRegion;
use crate::geometry::PixelBox;

/// Paint style for redaction boxes
#[derive(Debug, Clone)]
pub struct RedactionStyle {
    /// Fill color; fully opaque so no source pixel survives
    pub fill: Rgba<u8>,
    /// Outline color, drawn just inside the box edge
    pub outline: Rgba<u8>,
    /// Outline thickness in pixels
    pub outline_width: u32,
}

impl Default for RedactionStyle {
    fn default() -> Self {
        Self {
            fill: Rgba([20, 20, 20, 255]),
            outline: Rgba([255, 255, 255, 255]),
            outline_width: 3,
        }
    }
}

/// Applies redaction regions to an image buffer
pub struct Redactor {
    style: RedactionStyle,
}

impl Redactor {
    pub fn new(style: RedactionStyle) -> Self {
        Self { style }
    }

    /// Apply all regions in order, mutating `image` in place.
    pub fn redact(&self, image: &mut RgbaImage, regions: &[RedactionRegion]) {
        for region in regions {
            self.paint(image, region.bounds);
            debug!(text = %region.source_text, "redacted region");
        }
        if !regions.is_empty() {
            info!(count = regions.len(), "applied redactions");
        }
    }

    /// Like [`Redactor::redact`], but snapshots the buffer after each fill
    /// and each outline pass. The frames feed the audit preview.
    pub fn redact_recording(
        &self,
        image: &mut RgbaImage,
        regions: &[RedactionRegion],
    ) -> Vec<RgbaImage> {
        let mut frames = Vec::with_capacity(regions.len() * 2);
        for region in regions {
            let bounds = region.bounds.clamped(image.width(), image.height());
            if bounds.is_empty() {
                continue;
            }
            self.fill(image, bounds);
            frames.push(image.clone());
            self.outline(image, bounds);
            frames.push(image.clone());
            debug!(text = %region.source_text, "redacted region");
        }
        if !regions.is_empty() {
            info!(count = regions.len(), "applied redactions");
        }
        frames
    }

    fn paint(&self, image: &mut RgbaImage, bounds: PixelBox) {
        let bounds = bounds.clamped(image.width(), image.height());
        if bounds.is_empty() {
            return;
        }
        self.fill(image, bounds);
        self.outline(image, bounds);
    }

    fn fill(&self, image: &mut RgbaImage, bounds: PixelBox) {
        let rect =
            Rect::at(bounds.x1 as i32, bounds.y1 as i32).of_size(bounds.width(), bounds.height());
        draw_filled_rect_mut(image, rect, self.style.fill);
    }

    fn outline(&self, image: &mut RgbaImage, bounds: PixelBox) {
        // Rings shrink inward so the outline never spills outside the box
        for inset in 0..self.style.outline_width {
            let w = bounds.width().saturating_sub(inset * 2);
            let h = bounds.height().saturating_sub(inset * 2);
            if w == 0 || h == 0 {
                break;
            }
            let rect = Rect::at((bounds.x1 + inset) as i32, (bounds.y1 + inset) as i32)
                .of_size(w, h);
            draw_hollow_rect_mut(image, rect, self.style.outline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: Rgba<u8> = Rgba([7, 99, 7, 255]);

    fn source_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, SOURCE)
    }

    fn region(x1: u32, y1: u32, x2: u32, y2: u32) -> RedactionRegion {
        RedactionRegion {
            source_text: "Patient: John Doe".to_string(),
            bounds: PixelBox { x1, y1, x2, y2 },
        }
    }

    #[test]
    fn test_no_interior_pixel_survives() {
        let mut image = source_image(60, 40);
        let redactor = Redactor::new(RedactionStyle::default());

        redactor.redact(&mut image, &[region(10, 10, 30, 25)]);

        for y in 10..25 {
            for x in 10..30 {
                assert_ne!(
                    *image.get_pixel(x, y),
                    SOURCE,
                    "pixel ({x}, {y}) kept its original value"
                );
            }
        }
    }

    #[test]
    fn test_pixels_outside_region_are_untouched() {
        let mut image = source_image(60, 40);
        let redactor = Redactor::new(RedactionStyle::default());

        redactor.redact(&mut image, &[region(10, 10, 30, 25)]);

        assert_eq!(*image.get_pixel(9, 10), SOURCE);
        assert_eq!(*image.get_pixel(30, 10), SOURCE);
        assert_eq!(*image.get_pixel(10, 9), SOURCE);
        assert_eq!(*image.get_pixel(10, 25), SOURCE);
        assert_eq!(*image.get_pixel(59, 39), SOURCE);
    }

    #[test]
    fn test_redaction_is_idempotent() {
        let redactor = Redactor::new(RedactionStyle::default());
        let regions = [region(5, 5, 40, 30), region(20, 10, 55, 35)];

        let mut once = source_image(60, 40);
        redactor.redact(&mut once, &regions);

        let mut twice = source_image(60, 40);
        redactor.redact(&mut twice, &regions);
        redactor.redact(&mut twice, &regions);

        assert_eq!(once.as_raw(), twice.as_raw());
    }

    #[test]
    fn test_fill_and_outline_colors_are_applied() {
        let style = RedactionStyle::default();
        let mut image = source_image(60, 40);
        let redactor = Redactor::new(style.clone());

        redactor.redact(&mut image, &[region(10, 10, 30, 25)]);

        // Edge row carries the outline, the middle carries the fill
        assert_eq!(*image.get_pixel(10, 10), style.outline);
        assert_eq!(*image.get_pixel(20, 17), style.fill);
    }

    #[test]
    fn test_out_of_bounds_region_is_clamped() {
        let mut image = source_image(20, 20);
        let redactor = Redactor::new(RedactionStyle::default());

        // Bounds far beyond the buffer must not panic
        redactor.redact(&mut image, &[region(15, 15, 500, 500)]);

        assert_ne!(*image.get_pixel(16, 16), SOURCE);
        assert_eq!(*image.get_pixel(10, 10), SOURCE);
    }

    #[test]
    fn test_degenerate_region_is_a_no_op() {
        let mut image = source_image(20, 20);
        let redactor = Redactor::new(RedactionStyle::default());

        redactor.redact(&mut image, &[region(5, 5, 5, 15)]);

        assert_eq!(image.as_raw(), source_image(20, 20).as_raw());
    }

    #[test]
    fn test_recording_yields_two_frames_per_region() {
        let mut image = source_image(30, 30);
        let redactor = Redactor::new(RedactionStyle::default());
        let regions = [region(2, 2, 10, 10), region(12, 12, 28, 28)];

        let frames = redactor.redact_recording(&mut image, &regions);

        assert_eq!(frames.len(), 4);
        // Final frame matches the finished buffer
        assert_eq!(frames[3].as_raw(), image.as_raw());
    }

    #[test]
    fn test_recording_matches_plain_redaction() {
        let regions = [region(3, 4, 20, 18)];
        let redactor = Redactor::new(RedactionStyle::default());

        let mut plain = source_image(30, 30);
        redactor.redact(&mut plain, &regions);

        let mut recorded = source_image(30, 30);
        redactor.redact_recording(&mut recorded, &regions);

        assert_eq!(plain.as_raw(), recorded.as_raw());
    }
}
