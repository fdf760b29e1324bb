use image::DynamicImage;

use super::pipeline::{FaceDetector, FrameSource};

/// Placeholder frame source used until a real camera integration is wired:
/// yields a fixed dark frame every poll.
pub struct StillFrameSource {
    frame_width: u32,
    frame_height: u32,
}

impl StillFrameSource {
    pub fn new() -> Self {
        Self {
            frame_width: 224,
            frame_height: 224,
        }
    }
}

impl Default for StillFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for StillFrameSource {
    fn capture(&mut self) -> Option<DynamicImage> {
        Some(DynamicImage::new_rgb8(self.frame_width, self.frame_height))
    }
}

/// Detector standing in for a real model: reports one face on every frame,
/// so stub sessions accumulate no missing time.
pub struct AlwaysPresentDetector;

impl FaceDetector for AlwaysPresentDetector {
    fn detect(&mut self, _frame: &DynamicImage) -> anyhow::Result<usize> {
        Ok(1)
    }
}
