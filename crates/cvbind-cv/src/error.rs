//! Error types for cvbind-cv

use cvbind_core::{ArrayError, Shape};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CvError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Incompatible sizes for matrix multiplication: {left} * {right}")]
    IncompatibleShape { left: Shape, right: Shape },

    #[error("No CUDA device available (built without the `cuda` feature or no device found)")]
    AcceleratorUnavailable,

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}

/// Coarse classification of a [`CvError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unconvertible or malformed input
    InvalidArgument,
    /// Multiply operands with mismatched inner dimensions
    IncompatibleShape,
    /// The native library or device failed
    Backend,
}

impl CvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CvError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CvError::IncompatibleShape { .. } => ErrorKind::IncompatibleShape,
            CvError::AcceleratorUnavailable | CvError::OpenCv(_) => ErrorKind::Backend,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CvError::InvalidArgument(message.into())
    }
}

impl From<ArrayError> for CvError {
    fn from(err: ArrayError) -> Self {
        CvError::InvalidArgument(err.to_string())
    }
}
