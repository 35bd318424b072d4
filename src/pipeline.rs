//! Feeding a video stream through a background model

use anyhow::{bail, Context, Result};
use cvbind_cv::BackgroundModel;
use opencv::{
    core::{self, Mat},
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::time::{Duration, Instant};

/// Anything that yields frames until it runs dry
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Mat>>;
}

impl FrameSource for VideoCapture {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let grabbed = self.read(&mut frame).context("Failed to read frame")?;
        if !grabbed || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

/// Open a camera (numeric input) or a video file
pub fn open_source(input: &str) -> Result<VideoCapture> {
    let capture = match input.parse::<i32>() {
        Ok(index) => VideoCapture::new(index, videoio::CAP_ANY)
            .with_context(|| format!("Failed to open camera {}", index))?,
        Err(_) => VideoCapture::from_file(input, videoio::CAP_ANY)
            .with_context(|| format!("Failed to open video: {}", input))?,
    };
    if !capture.is_opened()? {
        bail!("Could not open video source '{}'", input);
    }
    Ok(capture)
}

#[derive(Debug, Clone, Default)]
pub struct SubtractionStats {
    pub frames: u64,
    /// Mean share of pixels classified as foreground (shadows excluded)
    pub mean_foreground: f64,
    pub peak_foreground: f64,
    pub elapsed: Duration,
}

/// Share of mask pixels marked as definite foreground
pub fn foreground_fraction(mask: &Mat) -> Result<f64> {
    let total = mask.total();
    if total == 0 {
        return Ok(0.0);
    }
    let definite = core::greater_than_mat_f64(mask, 200.0)?.to_mat()?;
    Ok(core::count_non_zero(&definite)? as f64 / total as f64)
}

pub fn run_subtraction<S, M>(
    source: &mut S,
    model: &mut M,
    max_frames: Option<u64>,
) -> Result<SubtractionStats>
where
    S: FrameSource + ?Sized,
    M: BackgroundModel + ?Sized,
{
    let start = Instant::now();
    let mut stats = SubtractionStats::default();
    let mut fraction_sum = 0.0;

    tracing::info!("Starting background subtraction");

    while max_frames.map_or(true, |max| stats.frames < max) {
        let Some(frame) = source.next_frame()? else {
            tracing::info!("Source exhausted");
            break;
        };

        let separation = model
            .apply(&frame)
            .with_context(|| format!("Failed to apply frame {}", stats.frames + 1))?;
        let fraction = foreground_fraction(&separation.foreground_mask)?;

        stats.frames += 1;
        fraction_sum += fraction;
        stats.peak_foreground = stats.peak_foreground.max(fraction);
        tracing::debug!(frame = stats.frames, foreground = fraction, "frame separated");

        if stats.frames % 30 == 0 {
            let fps = stats.frames as f64 / start.elapsed().as_secs_f64();
            tracing::info!(
                "Frame {}: foreground={:.1}%, fps={:.1}",
                stats.frames,
                fraction * 100.0,
                fps
            );
        }
    }

    if stats.frames > 0 {
        stats.mean_foreground = fraction_sum / stats.frames as f64;
    }
    stats.elapsed = start.elapsed();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvbind_cv::{Mog2Model, Mog2Settings};
    use opencv::core::{Rect, Scalar, CV_8UC3};
    use opencv::imgproc;
    use std::collections::VecDeque;

    struct Frames(VecDeque<Mat>);

    impl FrameSource for Frames {
        fn next_frame(&mut self) -> Result<Option<Mat>> {
            Ok(self.0.pop_front())
        }
    }

    fn scene(with_object: bool) -> Result<Mat> {
        let mut frame = Mat::new_rows_cols_with_default(40, 40, CV_8UC3, Scalar::all(30.0))?;
        if with_object {
            imgproc::rectangle(
                &mut frame,
                Rect::new(0, 0, 20, 40),
                Scalar::all(220.0),
                -1,
                imgproc::LINE_8,
                0,
            )?;
        }
        Ok(frame)
    }

    #[test]
    fn test_stops_when_source_runs_dry() -> Result<()> {
        let mut frames = Frames((0..5).map(|_| scene(false)).collect::<Result<_>>()?);
        let mut model = Mog2Model::default();

        let stats = run_subtraction(&mut frames, &mut model, None)?;
        assert_eq!(stats.frames, 5);
        assert_eq!(model.frames_seen(), 5);
        Ok(())
    }

    #[test]
    fn test_respects_frame_limit() -> Result<()> {
        let mut frames = Frames((0..5).map(|_| scene(false)).collect::<Result<_>>()?);
        let mut model = Mog2Model::default();

        let stats = run_subtraction(&mut frames, &mut model, Some(3))?;
        assert_eq!(stats.frames, 3);
        assert_eq!(frames.0.len(), 2);
        Ok(())
    }

    #[test]
    fn test_object_raises_peak_foreground() -> Result<()> {
        let mut queue: VecDeque<Mat> = (0..20).map(|_| scene(false)).collect::<Result<_>>()?;
        queue.push_back(scene(true)?);
        let mut frames = Frames(queue);
        let mut model = Mog2Model::new(Mog2Settings {
            detect_shadows: false,
            ..Default::default()
        })?;

        let stats = run_subtraction(&mut frames, &mut model, None)?;
        assert!(stats.peak_foreground > 0.4);
        assert!(stats.mean_foreground < stats.peak_foreground);
        Ok(())
    }
}
