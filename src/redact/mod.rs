//! Redaction planning and application
//!
//! Turns classified text blocks into pixel regions and burns them onto the
//! image buffer.

pub mod painter;
pub mod planner;
pub mod preview;

pub use painter::{RedactionStyle, Redactor};
pub use planner::{ClassificationFailure, RedactionPlan, RedactionPlanner};

use crate::geometry::PixelBox;

/// A rectangle scheduled for obliteration, with the text that triggered it
#[derive(Debug, Clone)]
pub struct RedactionRegion {
    /// Detected text this region covers
    pub source_text: String,
    /// Pixel bounds within the image
    pub bounds: PixelBox,
}
