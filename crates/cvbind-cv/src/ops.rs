//! Stateless matrix operations exposed by the binding surface

use cvbind_core::{Depth, HostArray};
use opencv::{
    core::{self, Mat, Scalar, CV_16UC3},
    prelude::*,
};

use crate::convert::{from_mat, mat_depth, mat_shape, to_mat};
use crate::error::CvError;
use crate::Result;

pub const ZERO_ROWS: i32 = 240;
pub const ZERO_COLS: i32 = 320;
pub const ZERO_CHANNELS: i32 = 3;

/// Matrix product of two host arrays.
///
/// Converts both operands, multiplies them with [`dot_mat`] and converts the
/// product back.
pub fn dot(left: &HostArray, right: &HostArray) -> Result<HostArray> {
    let left = to_mat(left)?;
    let right = to_mat(right)?;
    from_mat(&dot_mat(&left, &right)?)
}

/// Matrix product `left * right`.
///
/// Fails with [`CvError::IncompatibleShape`] when `left.cols != right.rows`,
/// before anything is computed. Both operands must share one floating-point
/// type with one (real) or two (complex) channels, which is what OpenCV's
/// GEMM accepts.
pub fn dot_mat(left: &Mat, right: &Mat) -> Result<Mat> {
    let _span = tracing::debug_span!("dot_mat").entered();

    let left_shape = mat_shape(left)?;
    let right_shape = mat_shape(right)?;
    if left_shape.cols != right_shape.rows {
        return Err(CvError::IncompatibleShape {
            left: left_shape,
            right: right_shape,
        });
    }

    let depth = mat_depth(left)?;
    if left.typ() != right.typ() {
        return Err(CvError::invalid(format!(
            "operands must share one element type, got {depth}x{} and {}x{}",
            left_shape.channels,
            mat_depth(right)?,
            right_shape.channels
        )));
    }
    if !depth.is_float() || left_shape.channels > 2 {
        return Err(CvError::invalid(format!(
            "matrix multiplication needs float32 or float64 samples with 1 or 2 channels, got {depth} with {}",
            left_shape.channels
        )));
    }

    Ok(core::mul_mat_mat(left, right)?.to_mat()?)
}

/// Add exactly 1.0 to every channel of every element.
///
/// The input is left untouched and a new matrix is returned. Integer depths
/// saturate the way OpenCV always does (`u8` 255 stays 255).
pub fn increment_elements_by_one(matrix: &Mat) -> Result<Mat> {
    let shape = mat_shape(matrix)?;
    let channels = shape.channels as i32;

    // a Scalar only carries four channels, so add on a single-channel view
    let flat = matrix.reshape(1, 0)?;
    let sum = core::add_mat_scalar(&flat, Scalar::all(1.0))?.to_mat()?;
    Ok(sum.reshape(channels, 0)?.try_clone()?)
}

/// [`increment_elements_by_one`] for host arrays
pub fn increment(array: &HostArray) -> Result<HostArray> {
    from_mat(&increment_elements_by_one(&to_mat(array)?)?)
}

/// A zero-filled 240x320 matrix with three unsigned 16-bit channels
pub fn make_cv16u_matrix() -> Result<Mat> {
    Ok(Mat::zeros(ZERO_ROWS, ZERO_COLS, CV_16UC3)?.to_mat()?)
}

/// [`make_cv16u_matrix`] as a host array of shape `(240, 320, 3)`
pub fn make_cv16u_array() -> Result<HostArray> {
    let array = from_mat(&make_cv16u_matrix()?)?;
    debug_assert_eq!(array.depth(), Depth::U16);
    Ok(array)
}
