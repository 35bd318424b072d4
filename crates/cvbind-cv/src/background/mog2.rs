//! CPU mixture-of-Gaussians model backed by OpenCV's MOG2

use opencv::{
    core::{Mat, Ptr},
    prelude::*,
    video::{create_background_subtractor_mog2, BackgroundSubtractorMOG2},
};

use super::{check_frame, BackgroundModel, FrameFormat, ModelState, Mog2Settings, Separation};
use crate::Result;

pub struct Mog2Model {
    settings: Mog2Settings,
    subtractor: Option<Ptr<BackgroundSubtractorMOG2>>,
    frame_format: Option<FrameFormat>,
    frames_seen: u64,
}

impl Mog2Model {
    /// Create an uninitialized model; nothing native is allocated until the
    /// first frame arrives.
    pub fn new(settings: Mog2Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            subtractor: None,
            frame_format: None,
            frames_seen: 0,
        })
    }

    pub fn settings(&self) -> &Mog2Settings {
        &self.settings
    }

    fn build(&self) -> Result<Ptr<BackgroundSubtractorMOG2>> {
        let Mog2Settings {
            history,
            var_threshold,
            detect_shadows,
            learning_rate: _,
        } = self.settings;

        tracing::debug!(history, var_threshold, detect_shadows, "building MOG2 model");
        Ok(create_background_subtractor_mog2(
            history,
            var_threshold,
            detect_shadows,
        )?)
    }
}

impl Default for Mog2Model {
    fn default() -> Self {
        Self {
            settings: Mog2Settings::default(),
            subtractor: None,
            frame_format: None,
            frames_seen: 0,
        }
    }
}

impl BackgroundModel for Mog2Model {
    fn apply(&mut self, frame: &Mat) -> Result<Separation> {
        let format = check_frame(frame, self.frame_format)?;

        let subtractor = match self.subtractor.take() {
            Some(subtractor) => subtractor,
            None => self.build()?,
        };
        let subtractor = self.subtractor.insert(subtractor);

        let mut mask = Mat::default();
        if let Err(err) = subtractor.apply(frame, &mut mask, self.settings.learning_rate) {
            // a model that never accepted a frame stays uninitialized
            if self.frame_format.is_none() {
                self.subtractor = None;
            }
            return Err(err.into());
        }

        self.frame_format = Some(format);
        self.frames_seen += 1;
        tracing::trace!(
            frame = self.frames_seen,
            rows = format.rows,
            cols = format.cols,
            "frame applied"
        );

        Ok(Separation {
            foreground_mask: mask,
            frame: frame.try_clone()?,
        })
    }

    fn background_image(&self) -> Result<Option<Mat>> {
        let Some(subtractor) = &self.subtractor else {
            return Ok(None);
        };
        let mut background = Mat::default();
        subtractor.get_background_image(&mut background)?;
        Ok(Some(background))
    }

    fn reset(&mut self) {
        tracing::debug!(frames_seen = self.frames_seen, "resetting MOG2 model");
        self.subtractor = None;
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
