//! Matrix shape: rows x cols x channels

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ArrayError;

/// OpenCV's `CV_CN_MAX`
pub const MAX_CHANNELS: usize = 512;

/// Widest sample of any supported depth (`f64`)
const MAX_SAMPLE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
    pub channels: usize,
}

impl Shape {
    pub fn new(rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            rows,
            cols,
            channels,
        }
    }

    /// Interpret an ndarray-style shape. Rank 2 is single-channel, rank 3
    /// carries channels on the last axis.
    pub fn from_dims(dims: &[usize]) -> Result<Self, ArrayError> {
        let shape = match *dims {
            [rows, cols] => Self::new(rows, cols, 1),
            [rows, cols, channels] => Self::new(rows, cols, channels),
            _ => return Err(ArrayError::UnsupportedRank(dims.len())),
        };
        shape.validate()?;
        Ok(shape)
    }

    pub fn validate(&self) -> Result<(), ArrayError> {
        for (axis, len) in [self.rows, self.cols, self.channels].into_iter().enumerate() {
            if len == 0 {
                return Err(ArrayError::EmptyAxis { axis });
            }
            if len > i32::MAX as usize {
                return Err(ArrayError::AxisTooLarge { axis, len });
            }
        }
        if self.channels > MAX_CHANNELS {
            return Err(ArrayError::TooManyChannels(self.channels));
        }
        // the byte length must be addressable for every depth
        let fits = self
            .checked_sample_count()
            .and_then(|count| count.checked_mul(MAX_SAMPLE_SIZE))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !fits {
            return Err(ArrayError::TooManySamples(*self));
        }
        Ok(())
    }

    /// ndarray dimensions a matrix of this shape converts back to
    pub fn dims(&self) -> Vec<usize> {
        if self.channels == 1 {
            vec![self.rows, self.cols]
        } else {
            vec![self.rows, self.cols, self.channels]
        }
    }

    /// Number of samples; exact for any shape that passed [`Shape::validate`]
    pub fn sample_count(&self) -> usize {
        self.rows
            .saturating_mul(self.cols)
            .saturating_mul(self.channels)
    }

    pub fn checked_sample_count(&self) -> Option<usize> {
        self.rows
            .checked_mul(self.cols)?
            .checked_mul(self.channels)
    }

    /// Same rows and cols, channels ignored
    pub fn same_plane(&self, other: &Shape) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.rows, self.cols, self.channels)
    }
}
