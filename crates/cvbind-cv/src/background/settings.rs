//! Tunables of the mixture-of-Gaussians background model

use serde::{Deserialize, Serialize};

use crate::error::CvError;
use crate::Result;

/// Parameters handed to OpenCV's MOG2 subtractor.
///
/// The defaults are OpenCV's own, so a default-configured model behaves like
/// `createBackgroundSubtractorMOG2()` with no arguments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mog2Settings {
    /// Number of recent frames that shape the model
    pub history: i32,
    /// Squared Mahalanobis distance threshold for a pixel to match the model
    pub var_threshold: f64,
    pub detect_shadows: bool,
    /// Negative selects the automatic rate derived from `history`
    pub learning_rate: f64,
}

impl Default for Mog2Settings {
    fn default() -> Self {
        Self {
            history: 500,
            var_threshold: 16.0,
            detect_shadows: true,
            learning_rate: -1.0,
        }
    }
}

impl Mog2Settings {
    pub fn validate(&self) -> Result<()> {
        if self.history <= 0 {
            return Err(CvError::invalid(format!(
                "history must be positive, got {}",
                self.history
            )));
        }
        if self.var_threshold.is_nan() || self.var_threshold <= 0.0 {
            return Err(CvError::invalid(format!(
                "var_threshold must be positive, got {}",
                self.var_threshold
            )));
        }
        if self.learning_rate.is_nan() || self.learning_rate > 1.0 {
            return Err(CvError::invalid(format!(
                "learning_rate must be a number no greater than 1.0, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Mog2Settings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_history = Mog2Settings {
            history: 0,
            ..Default::default()
        };
        assert!(bad_history.validate().is_err());

        let bad_threshold = Mog2Settings {
            var_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(bad_threshold.validate().is_err());

        let bad_rate = Mog2Settings {
            learning_rate: 1.5,
            ..Default::default()
        };
        assert!(bad_rate.validate().is_err());
    }

    #[test]
    fn test_rejects_nan_learning_rate() {
        let settings = Mog2Settings {
            learning_rate: f64::NAN,
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);

        // negative still selects the automatic rate
        let automatic = Mog2Settings {
            learning_rate: -0.5,
            ..Default::default()
        };
        assert!(automatic.validate().is_ok());
    }
}
