//! Job runner: ties together frame loading, the filter and PNG output.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use image::DynamicImage;
use log::info;

use fftspectrum_compute::create_backend;
use fftspectrum_core::{
    render_clip, ColorFamily, FftSpectrum, FrameSource, MemorySource, Plane, SampleType,
    VideoFormat, VideoInfo,
};

use crate::config::JobConfig;

/// A decoded input image with the format it was stored in.
pub struct LoadedFrame {
    pub path: PathBuf,
    pub format: VideoFormat,
    /// Luma of the image as an 8-bit plane.
    pub plane: Plane,
}

/// Report the storage format of a decoded image.
pub fn image_format(img: &DynamicImage) -> VideoFormat {
    let (color_family, sample_type, bits_per_sample) = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLumaA8(_) => {
            (ColorFamily::Gray, SampleType::Integer, 8)
        }
        DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
            (ColorFamily::Gray, SampleType::Integer, 16)
        }
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => {
            (ColorFamily::Rgb, SampleType::Integer, 8)
        }
        DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgba16(_) => {
            (ColorFamily::Rgb, SampleType::Integer, 16)
        }
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            (ColorFamily::Rgb, SampleType::Float, 32)
        }
        _ => (ColorFamily::Compat, SampleType::Integer, 8),
    };
    VideoFormat {
        color_family,
        sample_type,
        bits_per_sample,
    }
}

/// Decode one image file.
pub fn load_frame(path: &Path) -> Result<LoadedFrame> {
    let img = image::open(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let format = image_format(&img);
    let luma = img.to_luma8();
    let (width, height) = (luma.width() as usize, luma.height() as usize);
    let plane = Plane::from_packed(width, height, luma.into_raw())
        .with_context(|| format!("{}: truncated pixel data", path.display()))?;
    Ok(LoadedFrame {
        path: path.to_path_buf(),
        format,
        plane,
    })
}

/// Assemble loaded frames into a clip; the format is only constant if every
/// frame shares it.
pub fn build_clip(frames: &[LoadedFrame]) -> MemorySource {
    let format = frames.first().map(|f| f.format).filter(|first| {
        frames.iter().all(|f| f.format == *first)
    });
    MemorySource::new(frames.iter().map(|f| f.plane.clone()).collect(), format)
}

/// Encode a rendered plane as an 8-bit grayscale PNG.
pub fn write_plane_png(plane: &Plane, path: &Path) -> Result<()> {
    let img = image::GrayImage::from_raw(
        plane.width() as u32,
        plane.height() as u32,
        plane.to_packed(),
    )
    .context("Rendered plane does not match its dimensions")?;
    img.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn frame_stem(input: &Path, index: usize) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("frame{:05}", index))
}

/// Output paths for a clip: `<dir>/<stem><suffix>.png`.
///
/// Inputs sharing a file stem get their frame index folded in as
/// `<stem>_<index><suffix>.png`, so no output overwrites another.
pub fn output_paths(inputs: &[PathBuf], directory: &Path, suffix: &str) -> Vec<PathBuf> {
    let stems: Vec<String> = inputs
        .iter()
        .enumerate()
        .map(|(index, input)| frame_stem(input, index))
        .collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stem in &stems {
        *counts.entry(stem.as_str()).or_default() += 1;
    }
    stems
        .iter()
        .enumerate()
        .map(|(index, stem)| {
            if counts[stem.as_str()] > 1 {
                directory.join(format!("{}_{:05}{}.png", stem, index, suffix))
            } else {
                directory.join(format!("{}{}.png", stem, suffix))
            }
        })
        .collect()
}

/// A job whose frames are loaded and whose filter is constructed.
pub struct PreparedJob {
    pub filter: FftSpectrum,
    pub clip: MemorySource,
    pub inputs: Vec<PathBuf>,
}

/// Load the job's frames and construct the filter without rendering.
pub fn prepare_job(job: &JobConfig) -> Result<PreparedJob> {
    let frames = job
        .input
        .frames
        .iter()
        .map(|path| load_frame(path))
        .collect::<Result<Vec<_>>>()?;

    let clip = build_clip(&frames);
    let backend = create_backend(&job.compute.backend)?;
    let filter = FftSpectrum::new(&clip.video_info(), job.spectrum, backend)?;
    Ok(PreparedJob {
        filter,
        clip,
        inputs: frames.into_iter().map(|f| f.path).collect(),
    })
}

/// Run a full render job and return the written file paths.
pub fn run_job(job: &JobConfig, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let PreparedJob {
        filter,
        clip,
        inputs,
    } = prepare_job(job)?;
    let clip_info: &VideoInfo = filter.input_info();
    println!(
        "  {} frame(s), {}x{}, grid {}",
        clip_info.num_frames,
        clip_info.width,
        clip_info.height,
        if filter.shows_grid() { "on" } else { "off" }
    );

    let started = Instant::now();
    let rendered = render_clip(&filter, &clip)?;
    info!("rendered {} frame(s) in {:?}", rendered.len(), started.elapsed());

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let written = output_paths(&inputs, out_dir, &job.output.suffix);
    for (path, plane) in written.iter().zip(&rendered) {
        write_plane_png(plane, path)?;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn write_gray(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = GrayImage::from_fn(width, height, |x, y| Luma([((x * 5 + y * 3) % 256) as u8]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_run_job_writes_gray_spectra() {
        let dir = tempfile::tempdir().unwrap();
        let frames = vec![
            write_gray(dir.path(), "a.png", 40, 30),
            write_gray(dir.path(), "b.png", 40, 30),
        ];
        let job = JobConfig::from_frames(frames, true, "auto".into());
        let out_dir = dir.path().join("out");

        let written = run_job(&job, &out_dir).unwrap();
        assert_eq!(written, vec![out_dir.join("a_spectrum.png"), out_dir.join("b_spectrum.png")]);

        let img = image::open(&written[0]).unwrap();
        assert!(matches!(img, DynamicImage::ImageLuma8(_)));
        let gray = img.to_luma8();
        assert_eq!(gray.dimensions(), (40, 30));
        // Grid lines cross at the centre.
        assert_eq!(gray.get_pixel(20, 0).0[0], 255);
        assert_eq!(gray.get_pixel(0, 15).0[0], 255);
    }

    #[test]
    fn test_rgb_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        RgbImage::from_pixel(8, 8, Rgb([10, 20, 30])).save(&path).unwrap();

        let job = JobConfig::from_frames(vec![path], false, "auto".into());
        let err = prepare_job(&job).err().expect("rgb clip must be rejected");
        assert!(
            err.to_string()
                .contains("only constant-format 8-bit integer luma-containing input supported"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_mixed_sizes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let frames = vec![
            write_gray(dir.path(), "a.png", 16, 16),
            write_gray(dir.path(), "b.png", 16, 8),
        ];
        let job = JobConfig::from_frames(frames, false, "cpu".into());
        assert!(prepare_job(&job).is_err());
    }

    #[test]
    fn test_output_path_naming() {
        let paths = output_paths(&[PathBuf::from("in/clip.0001.png")], Path::new("out"), "_s");
        assert_eq!(paths, vec![PathBuf::from("out/clip.0001_s.png")]);
    }

    #[test]
    fn test_repeated_stems_get_distinct_outputs() {
        let inputs = vec![
            PathBuf::from("a/x.png"),
            PathBuf::from("b/x.png"),
            PathBuf::from("b/y.png"),
        ];
        let paths = output_paths(&inputs, Path::new("out"), "_spectrum");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("out/x_00000_spectrum.png"),
                PathBuf::from("out/x_00001_spectrum.png"),
                PathBuf::from("out/y_spectrum.png"),
            ]
        );
    }

    #[test]
    fn test_same_named_frames_in_two_directories_are_both_written() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        let frames = vec![
            write_gray(&dir.path().join("a"), "x.png", 16, 16),
            write_gray(&dir.path().join("b"), "x.png", 16, 16),
        ];
        let job = JobConfig::from_frames(frames, false, "cpu".into());
        let out_dir = dir.path().join("out");

        let written = run_job(&job, &out_dir).unwrap();
        assert_eq!(written.len(), 2);
        assert_ne!(written[0], written[1]);
        assert!(written.iter().all(|path| path.exists()));
    }
}
