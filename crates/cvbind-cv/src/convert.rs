//! Conversion between host arrays and OpenCV matrices
//!
//! Every operation in this crate funnels its inputs and outputs through
//! [`to_mat`] and [`from_mat`]; there is no second conversion path.

use cvbind_core::{Depth, HostArray, Shape};
use opencv::{
    core::{Mat, Scalar},
    prelude::*,
};

use crate::error::CvError;
use crate::Result;

/// Number of bits OpenCV shifts the channel count by inside a type code
const CN_SHIFT: i32 = 3;

/// OpenCV matrix type code for `depth` with `channels` channels
pub fn mat_type(depth: Depth, channels: usize) -> i32 {
    depth.code() + ((channels as i32 - 1) << CN_SHIFT)
}

/// Shape of a 2-D matrix
pub fn mat_shape(mat: &Mat) -> Result<Shape> {
    if mat.dims() > 2 {
        return Err(CvError::invalid(format!(
            "matrix has {} dimensions, only 2-D matrices cross the boundary",
            mat.dims()
        )));
    }
    let shape = Shape::new(
        mat.rows().max(0) as usize,
        mat.cols().max(0) as usize,
        mat.channels().max(0) as usize,
    );
    shape.validate()?;
    Ok(shape)
}

/// Element depth of a matrix
pub fn mat_depth(mat: &Mat) -> Result<Depth> {
    Ok(Depth::from_code(mat.depth())?)
}

/// Copy a host array into a freshly allocated, continuous matrix.
///
/// Sample values are copied bit for bit; the matrix type is derived from the
/// array's element type and channel axis.
pub fn to_mat(array: &HostArray) -> Result<Mat> {
    let _span = tracing::debug_span!("to_mat", depth = %array.depth()).entered();

    let (shape, bytes) = array.to_ne_bytes()?;
    let mut mat = Mat::new_rows_cols_with_default(
        shape.rows as i32,
        shape.cols as i32,
        mat_type(array.depth(), shape.channels),
        Scalar::all(0.0),
    )?;

    let target = mat.data_bytes_mut()?;
    if target.len() != bytes.len() {
        return Err(CvError::invalid(format!(
            "matrix buffer holds {} bytes, array supplies {}",
            target.len(),
            bytes.len()
        )));
    }
    target.copy_from_slice(&bytes);

    tracing::trace!(%shape, "array converted to matrix");
    Ok(mat)
}

/// Copy a matrix out into a host array.
///
/// Single-channel matrices come back as rank 2, multi-channel ones as rank 3
/// with channels last.
pub fn from_mat(mat: &Mat) -> Result<HostArray> {
    let _span = tracing::debug_span!("from_mat").entered();

    let shape = mat_shape(mat)?;
    let depth = mat_depth(mat)?;

    let continuous;
    let source = if mat.is_continuous() {
        mat
    } else {
        continuous = mat.try_clone()?;
        &continuous
    };

    Ok(HostArray::from_ne_bytes(depth, shape, source.data_bytes()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array3};
    use opencv::core::{Rect, CV_16UC3, CV_32FC1, CV_64FC1, CV_8UC1};

    #[test]
    fn test_mat_type_codes() {
        assert_eq!(mat_type(Depth::U8, 1), CV_8UC1);
        assert_eq!(mat_type(Depth::U16, 3), CV_16UC3);
        assert_eq!(mat_type(Depth::F32, 1), CV_32FC1);
        assert_eq!(mat_type(Depth::F64, 1), CV_64FC1);
    }

    #[test]
    fn test_to_mat_preserves_layout() -> Result<()> {
        let array = HostArray::new(arr2(&[[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.0]]));
        let mat = to_mat(&array)?;

        assert_eq!(mat.rows(), 2);
        assert_eq!(mat.cols(), 3);
        assert_eq!(mat.typ(), CV_64FC1);
        assert_eq!(*mat.at_2d::<f64>(1, 2)?, 6.0);
        assert_eq!(*mat.at_2d::<f64>(0, 1)?, 2.0);
        Ok(())
    }

    #[test]
    fn test_multichannel_round_trip() -> Result<()> {
        let original =
            Array3::from_shape_fn((4, 5, 3), |(r, c, ch)| (r * 15 + c * 3 + ch) as u16 * 1000);
        let host = HostArray::new(original);

        let mat = to_mat(&host)?;
        assert_eq!(mat.typ(), CV_16UC3);
        assert_eq!(mat.channels(), 3);

        let back = from_mat(&mat)?;
        assert_eq!(back, host);
        Ok(())
    }

    #[test]
    fn test_from_mat_handles_submatrix() -> Result<()> {
        let host = HostArray::new(arr2(&[[1u8, 2, 3], [4, 5, 6], [7, 8, 9]]));
        let mat = to_mat(&host)?;
        let roi = Mat::roi(&mat, Rect::new(1, 1, 2, 2))?;
        assert!(!roi.is_continuous());
        let back = from_mat(&roi)?;
        assert_eq!(back, HostArray::new(arr2(&[[5u8, 6], [8, 9]])));
        Ok(())
    }

    #[test]
    fn test_empty_matrix_is_invalid() {
        let err = from_mat(&Mat::default()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_rank_one_array_is_invalid() {
        let err = to_mat(&HostArray::new(ndarray::arr1(&[1.0f32, 2.0]))).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }
}
