//! Errors raised while interpreting host arrays

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    #[error("expected a 2-D or 3-D array, got {0} dimension(s)")]
    UnsupportedRank(usize),

    #[error("array axis {axis} has length zero")]
    EmptyAxis { axis: usize },

    #[error("{0} channels exceeds the maximum of 512")]
    TooManyChannels(usize),

    #[error("array axis {axis} has length {len}, which does not fit a matrix dimension")]
    AxisTooLarge { axis: usize, len: usize },

    #[error("a {0} matrix holds more samples than can be addressed")]
    TooManySamples(crate::shape::Shape),

    #[error("unsupported element type: {0}")]
    UnsupportedDepth(String),

    #[error("sample buffer holds {actual} bytes, shape requires {expected}")]
    BufferLength { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArrayError::UnsupportedRank(4);
        assert!(err.to_string().contains("4 dimension"));

        let err = ArrayError::TooManyChannels(600);
        assert!(err.to_string().contains("512"));
    }
}
