//! Frame sources and clip-level rendering.
//!
//! A [`FrameSource`] stands in for the host's frame-I/O runtime: it reports
//! clip metadata and hands out frames by index. [`render_clip`] requests all
//! frames concurrently, one [`SpectrumScratch`] per Rayon worker.

use rayon::prelude::*;

use crate::filter::{FftSpectrum, FilterError, SpectrumScratch};
use crate::types::{Plane, VideoFormat, VideoInfo};

/// Supplies frames of a clip by index.
pub trait FrameSource: Sync {
    fn video_info(&self) -> VideoInfo;

    fn get_frame(&self, index: usize) -> Result<Plane, FilterError>;
}

/// A clip held in memory, one plane per frame.
#[derive(Debug, Clone)]
pub struct MemorySource {
    frames: Vec<Plane>,
    format: Option<VideoFormat>,
}

impl MemorySource {
    /// Build a clip; `format` is the format every frame shares, or `None` if
    /// the frames disagree.
    pub fn new(frames: Vec<Plane>, format: Option<VideoFormat>) -> Self {
        Self { frames, format }
    }

    /// A clip of 8-bit gray frames.
    pub fn gray8(frames: Vec<Plane>) -> Self {
        Self::new(frames, Some(VideoFormat::GRAY8))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for MemorySource {
    /// Width and height are reported as 0 when frame sizes differ.
    fn video_info(&self) -> VideoInfo {
        let geometry = self.frames.first().map(Plane::geometry);
        let uniform = geometry
            .is_some_and(|g| self.frames.iter().all(|frame| frame.geometry() == g));
        let (width, height) = match geometry {
            Some(g) if uniform => (g.width, g.height),
            _ => (0, 0),
        };
        VideoInfo {
            format: self.format,
            width,
            height,
            num_frames: self.frames.len(),
        }
    }

    fn get_frame(&self, index: usize) -> Result<Plane, FilterError> {
        self.frames
            .get(index)
            .cloned()
            .ok_or(FilterError::FrameOutOfRange {
                index,
                num_frames: self.frames.len(),
            })
    }
}

/// Render every frame of `source`, in frame order.
///
/// Frames are processed in parallel; each worker reuses its own scratch
/// buffers across the frames it handles.
pub fn render_clip(
    filter: &FftSpectrum,
    source: &dyn FrameSource,
) -> Result<Vec<Plane>, FilterError> {
    let num_frames = source.video_info().num_frames;
    let geometry = filter.geometry();

    (0..num_frames)
        .into_par_iter()
        .map_init(
            || SpectrumScratch::new(geometry),
            |scratch, index| {
                let frame = source.get_frame(index)?;
                filter.process_frame_with(&frame, scratch)
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_info_of_uniform_clip() {
        let clip = MemorySource::gray8(vec![Plane::zeroed(10, 6), Plane::zeroed(10, 6)]);
        let info = clip.video_info();
        assert!(info.is_constant_format());
        assert_eq!((info.width, info.height, info.num_frames), (10, 6, 2));
    }

    #[test]
    fn test_mixed_sizes_are_not_constant() {
        let clip = MemorySource::gray8(vec![Plane::zeroed(10, 6), Plane::zeroed(12, 6)]);
        assert!(!clip.video_info().is_constant_format());
        assert!(!MemorySource::gray8(Vec::new()).video_info().is_constant_format());
    }

    #[test]
    fn test_out_of_range_frame() {
        let clip = MemorySource::gray8(vec![Plane::zeroed(4, 4)]);
        assert!(clip.get_frame(0).is_ok());
        assert!(matches!(
            clip.get_frame(3),
            Err(FilterError::FrameOutOfRange { index: 3, num_frames: 1 })
        ));
    }
}
