//! `pbcvt`: OpenCV matrix operations for Python
//!
//! Every function takes and returns numpy arrays. Arrays are copied into
//! OpenCV matrices on the way in and copied out on the way back, so results
//! never alias the caller's buffers.

mod array;
mod errors;
mod model;

use cvbind_cv::{dot_mat, from_mat, ops, to_mat};
use pyo3::prelude::*;
use pyo3::types::PyTuple;

use array::{extract_array, into_py_array};
use errors::{to_py_err, IncompatibleShape, InvalidArgument};
use model::{BackgroundSubtractor, GpuBackgroundSubtractor};

/// Matrix product of two numpy arrays
#[pyfunction]
fn dot<'py>(
    py: Python<'py>,
    left: &Bound<'py, PyAny>,
    right: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let product = ops::dot(&extract_array(left)?, &extract_array(right)?).map_err(to_py_err)?;
    Ok(into_py_array(py, product))
}

/// Matrix product computed on converted matrices; same result as `dot`
#[pyfunction]
fn dot2<'py>(
    py: Python<'py>,
    left: &Bound<'py, PyAny>,
    right: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let left = to_mat(&extract_array(left)?).map_err(to_py_err)?;
    let right = to_mat(&extract_array(right)?).map_err(to_py_err)?;
    let product = dot_mat(&left, &right)
        .and_then(|m| from_mat(&m))
        .map_err(to_py_err)?;
    Ok(into_py_array(py, product))
}

/// Feed a frame to a background model; returns `(foreground_mask, frame)`
#[pyfunction]
fn apply<'py>(
    py: Python<'py>,
    mut model: PyRefMut<'py, BackgroundSubtractor>,
    frame: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyTuple>> {
    model.apply(py, frame)
}

/// `apply` on a CUDA-backed model
#[pyfunction]
#[pyo3(name = "applyGPU")]
fn apply_gpu<'py>(
    py: Python<'py>,
    mut model: PyRefMut<'py, GpuBackgroundSubtractor>,
    frame: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyTuple>> {
    model.apply(py, frame)
}

/// A new 240x320x3 uint16 array of zeros
#[pyfunction]
fn make_cv16u_matrix(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
    let zeros = ops::make_cv16u_array().map_err(to_py_err)?;
    Ok(into_py_array(py, zeros))
}

#[pyfunction]
#[pyo3(name = "makeCV_16UC3Matrix")]
fn make_cv16uc3_matrix(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
    make_cv16u_matrix(py)
}

/// A new array with every element increased by one (saturating for integer
/// dtypes). The argument is not modified.
#[pyfunction]
fn increment_elements_by_one<'py>(
    py: Python<'py>,
    matrix: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let incremented = ops::increment(&extract_array(matrix)?).map_err(to_py_err)?;
    Ok(into_py_array(py, incremented))
}

#[pymodule]
fn pbcvt(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(dot, m)?)?;
    m.add_function(wrap_pyfunction!(dot2, m)?)?;
    m.add_function(wrap_pyfunction!(apply, m)?)?;
    m.add_function(wrap_pyfunction!(apply_gpu, m)?)?;
    m.add_function(wrap_pyfunction!(make_cv16u_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(make_cv16uc3_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(increment_elements_by_one, m)?)?;

    m.add_class::<BackgroundSubtractor>()?;
    m.add_class::<GpuBackgroundSubtractor>()?;

    let py = m.py();
    m.add("InvalidArgument", py.get_type_bound::<InvalidArgument>())?;
    m.add("IncompatibleShape", py.get_type_bound::<IncompatibleShape>())?;
    m.add(
        "CUDA_AVAILABLE",
        cvbind_cv::background::cuda::accelerator_available(),
    )?;
    Ok(())
}
