//! Background/foreground separation over a stream of frames
//!
//! A model is an explicit handle owned by whoever feeds it frames. Each
//! stream gets its own handle; nothing is shared between handles.

pub mod cuda;
pub mod mog2;
pub mod settings;

pub use cuda::CudaMog2Model;
pub use mog2::Mog2Model;
pub use settings::Mog2Settings;

use opencv::{core::Mat, prelude::*};

use crate::convert::mat_shape;
use crate::error::CvError;
use crate::Result;

/// Lifecycle of a background model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// No statistics yet; the native model is built on the next frame
    Uninitialized,
    /// At least one frame was accepted; later frames must match its format
    Initialized,
}

/// Result of feeding one frame to a model
#[derive(Debug)]
pub struct Separation {
    /// Same rows and cols as the frame, 8-bit single channel.
    /// 255 marks foreground, 127 a detected shadow (when enabled), 0 background.
    pub foreground_mask: Mat,
    /// The frame that was fed in, returned unchanged
    pub frame: Mat,
}

/// A model is Initialized once a frame has been applied successfully, and
/// goes back to Uninitialized on [`BackgroundModel::reset`].
pub trait BackgroundModel {
    /// Feed one frame and classify its pixels.
    ///
    /// The first call on an uninitialized model builds the native model;
    /// later calls keep updating it.
    fn apply(&mut self, frame: &Mat) -> Result<Separation>;

    /// The model's current estimate of the background, `None` before the
    /// first frame
    fn background_image(&self) -> Result<Option<Mat>>;

    /// Drop all accumulated statistics
    fn reset(&mut self);

    fn state(&self) -> ModelState;

    /// Frames fed since construction or the last reset
    fn frames_seen(&self) -> u64;
}

/// Size and OpenCV type of the frames a model was initialized with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    pub rows: i32,
    pub cols: i32,
    pub typ: i32,
}

impl FrameFormat {
    pub fn of(frame: &Mat) -> Self {
        Self {
            rows: frame.rows(),
            cols: frame.cols(),
            typ: frame.typ(),
        }
    }
}

/// Validate a frame before it reaches a native model.
///
/// Once a model has seen a frame, every later frame must have the same size
/// and type; OpenCV would otherwise silently rebuild the model.
pub(crate) fn check_frame(frame: &Mat, expected: Option<FrameFormat>) -> Result<FrameFormat> {
    if frame.empty() {
        return Err(CvError::invalid("frame is empty"));
    }
    mat_shape(frame)?;

    let format = FrameFormat::of(frame);
    match expected {
        Some(expected) if expected.rows != format.rows || expected.cols != format.cols => {
            Err(CvError::invalid(format!(
                "frame is {}x{}, model was initialized with {}x{} frames",
                format.rows, format.cols, expected.rows, expected.cols
            )))
        }
        Some(expected) if expected.typ != format.typ => Err(CvError::invalid(format!(
            "frame type {} differs from type {} the model was initialized with",
            format.typ, expected.typ
        ))),
        _ => Ok(format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use opencv::core::{Scalar, CV_8UC1, CV_8UC3};

    #[test]
    fn test_check_frame_rejects_empty() {
        let err = check_frame(&Mat::default(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_check_frame_size_must_stay_fixed() -> Result<()> {
        let frame = Mat::new_rows_cols_with_default(4, 6, CV_8UC3, Scalar::all(0.0))?;
        let format = check_frame(&frame, None)?;
        assert_eq!((format.rows, format.cols, format.typ), (4, 6, CV_8UC3));
        assert_eq!(check_frame(&frame, Some(format))?, format);

        let rotated = FrameFormat {
            rows: 6,
            cols: 4,
            ..format
        };
        let err = check_frame(&frame, Some(rotated)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        Ok(())
    }

    #[test]
    fn test_check_frame_type_must_stay_fixed() -> Result<()> {
        let color = Mat::new_rows_cols_with_default(4, 6, CV_8UC3, Scalar::all(0.0))?;
        let gray = Mat::new_rows_cols_with_default(4, 6, CV_8UC1, Scalar::all(0.0))?;
        let format = check_frame(&color, None)?;

        let err = check_frame(&gray, Some(format)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("type"));
        Ok(())
    }
}
