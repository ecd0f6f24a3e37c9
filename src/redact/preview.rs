//! Animated audit preview
//!
//! Replays the redaction pass as a looping GIF so a reviewer can watch each
//! region being obliterated. The preview stays local; only the final image
//! goes back to object storage.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const FRAME_DELAY_MS: u32 = 300;

/// Errors from preview encoding
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to write preview file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode preview: {0}")]
    Encode(#[from] image::ImageError),

    #[error("no frames to encode")]
    Empty,
}

/// Encode recorded frames as a looping GIF at `path`.
pub fn write_gif(path: &Path, frames: Vec<RgbaImage>) -> Result<(), PreviewError> {
    if frames.is_empty() {
        return Err(PreviewError::Empty);
    }

    let frame_count = frames.len();
    let file = File::create(path)?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Finite(2))?;

    for image in frames {
        let frame = Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(FRAME_DELAY_MS, 1));
        encoder.encode_frame(frame)?;
    }

    info!(frames = frame_count, path = %path.display(), "wrote audit preview");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_writes_gif_with_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.gif");

        let frames = vec![
            RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255])),
            RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255])),
        ];

        write_gif(&path, frames).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"GIF8"));
    }

    #[test]
    fn test_rejects_empty_frame_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.gif");

        assert!(matches!(write_gif(&path, vec![]), Err(PreviewError::Empty)));
        assert!(!path.exists());
    }
}
