//! Accelerated MOG2 model running on a CUDA device
//!
//! Frames are uploaded to the device, classified there, and the mask is
//! downloaded before `apply` returns. Results track the CPU model closely but
//! are not bit-identical to it. Without the `cuda` feature the model cannot be
//! constructed and every entry point reports [`CvError::AcceleratorUnavailable`].

use opencv::core::Mat;
#[cfg(feature = "cuda")]
use opencv::{
    core::{self, GpuMat, Ptr},
    cudabgsegm::{create_background_subtractor_mog2, CUDA_BackgroundSubtractorMOG2},
    prelude::*,
    video::{BackgroundSubtractorTrait, BackgroundSubtractorTraitConst},
};

use super::{check_frame, BackgroundModel, FrameFormat, ModelState, Mog2Settings, Separation};
use crate::error::CvError;
use crate::Result;

pub struct CudaMog2Model {
    settings: Mog2Settings,
    #[cfg(feature = "cuda")]
    subtractor: Option<Ptr<CUDA_BackgroundSubtractorMOG2>>,
    frame_format: Option<FrameFormat>,
    frames_seen: u64,
}

/// Whether this build can run the accelerated model at all
pub fn accelerator_available() -> bool {
    ensure_device().is_ok()
}

#[cfg(feature = "cuda")]
fn ensure_device() -> Result<()> {
    if core::get_cuda_enabled_device_count()? < 1 {
        return Err(CvError::AcceleratorUnavailable);
    }
    Ok(())
}

#[cfg(not(feature = "cuda"))]
fn ensure_device() -> Result<()> {
    Err(CvError::AcceleratorUnavailable)
}

impl CudaMog2Model {
    pub fn new(settings: Mog2Settings) -> Result<Self> {
        settings.validate()?;
        ensure_device()?;
        Ok(Self {
            settings,
            #[cfg(feature = "cuda")]
            subtractor: None,
            frame_format: None,
            frames_seen: 0,
        })
    }

    pub fn settings(&self) -> &Mog2Settings {
        &self.settings
    }

    #[cfg(feature = "cuda")]
    fn build(&self) -> Result<Ptr<CUDA_BackgroundSubtractorMOG2>> {
        tracing::debug!(
            history = self.settings.history,
            var_threshold = self.settings.var_threshold,
            detect_shadows = self.settings.detect_shadows,
            "building CUDA MOG2 model"
        );
        Ok(create_background_subtractor_mog2(
            self.settings.history,
            self.settings.var_threshold,
            self.settings.detect_shadows,
        )?)
    }
}

impl BackgroundModel for CudaMog2Model {
    #[cfg(feature = "cuda")]
    fn apply(&mut self, frame: &Mat) -> Result<Separation> {
        let format = check_frame(frame, self.frame_format)?;

        let subtractor = match self.subtractor.take() {
            Some(subtractor) => subtractor,
            None => self.build()?,
        };
        let subtractor = self.subtractor.insert(subtractor);

        let learning_rate = self.settings.learning_rate;
        let classified = (|| -> Result<Mat> {
            let mut device_frame = GpuMat::new_def()?;
            device_frame.upload(frame)?;
            let mut device_mask = GpuMat::new_def()?;
            BackgroundSubtractorTrait::apply(
                subtractor,
                &device_frame,
                &mut device_mask,
                learning_rate,
            )?;

            let mut mask = Mat::default();
            device_mask.download(&mut mask)?;
            Ok(mask)
        })();
        let mask = match classified {
            Ok(mask) => mask,
            Err(err) => {
                // a model that never accepted a frame stays uninitialized
                if self.frame_format.is_none() {
                    self.subtractor = None;
                }
                return Err(err);
            }
        };

        self.frame_format = Some(format);
        self.frames_seen += 1;
        tracing::trace!(frame = self.frames_seen, "frame applied on device");

        Ok(Separation {
            foreground_mask: mask,
            frame: frame.try_clone()?,
        })
    }

    #[cfg(not(feature = "cuda"))]
    fn apply(&mut self, frame: &Mat) -> Result<Separation> {
        check_frame(frame, self.frame_format)?;
        Err(CvError::AcceleratorUnavailable)
    }

    #[cfg(feature = "cuda")]
    fn background_image(&self) -> Result<Option<Mat>> {
        let Some(subtractor) = &self.subtractor else {
            return Ok(None);
        };
        let mut device_background = GpuMat::new_def()?;
        BackgroundSubtractorTraitConst::get_background_image(subtractor, &mut device_background)?;
        let mut background = Mat::default();
        device_background.download(&mut background)?;
        Ok(Some(background))
    }

    #[cfg(not(feature = "cuda"))]
    fn background_image(&self) -> Result<Option<Mat>> {
        Err(CvError::AcceleratorUnavailable)
    }

    fn reset(&mut self) {
        tracing::debug!(frames_seen = self.frames_seen, "resetting CUDA MOG2 model");
        #[cfg(feature = "cuda")]
        {
            self.subtractor = None;
        }
        self.frame_format = None;
        self.frames_seen = 0;
    }

    fn state(&self) -> ModelState {
        if self.frame_format.is_some() {
            ModelState::Initialized
        } else {
            ModelState::Uninitialized
        }
    }

    fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_unavailable_without_cuda() {
        assert!(!accelerator_available());
        let err = CudaMog2Model::new(Mog2Settings::default())
            .err()
            .expect("no accelerator in this build");
        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[cfg(feature = "cuda")]
    #[test]
    fn test_device_mask_matches_frame_size() -> Result<()> {
        use crate::background::Mog2Model;
        use opencv::core::{Scalar, CV_8UC3};

        if !accelerator_available() {
            return Ok(());
        }

        let mut cpu = Mog2Model::default();
        let mut gpu = CudaMog2Model::new(Mog2Settings::default())?;
        let frame = Mat::new_rows_cols_with_default(32, 48, CV_8UC3, Scalar::all(50.0))?;

        let cpu_out = cpu.apply(&frame)?;
        let gpu_out = gpu.apply(&frame)?;
        assert_eq!(gpu.state(), ModelState::Initialized);
        assert_eq!(gpu_out.foreground_mask.rows(), cpu_out.foreground_mask.rows());
        assert_eq!(gpu_out.foreground_mask.cols(), cpu_out.foreground_mask.cols());
        Ok(())
    }

    #[cfg(feature = "cuda")]
    #[test]
    fn test_device_frame_type_change_is_rejected() -> Result<()> {
        use opencv::core::{Scalar, CV_8UC1, CV_8UC3};

        if !accelerator_available() {
            return Ok(());
        }

        let mut gpu = CudaMog2Model::new(Mog2Settings::default())?;
        gpu.apply(&Mat::new_rows_cols_with_default(16, 16, CV_8UC3, Scalar::all(0.0))?)?;

        let gray = Mat::new_rows_cols_with_default(16, 16, CV_8UC1, Scalar::all(0.0))?;
        let err = gpu.apply(&gray).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(gpu.frames_seen(), 1);
        Ok(())
    }
}
