//! numpy arrays in and out of the binding surface

use cvbind_core::HostArray;
use numpy::{IntoPyArray, PyReadonlyArrayDyn};
use pyo3::prelude::*;

use crate::errors::InvalidArgument;

/// numpy arrays of every dtype OpenCV can hold.
///
/// Extraction tries each variant in turn, so anything else (lists, float16,
/// complex, object arrays) falls through to an error.
#[derive(FromPyObject)]
enum InputArray<'py> {
    U8(PyReadonlyArrayDyn<'py, u8>),
    I8(PyReadonlyArrayDyn<'py, i8>),
    U16(PyReadonlyArrayDyn<'py, u16>),
    I16(PyReadonlyArrayDyn<'py, i16>),
    I32(PyReadonlyArrayDyn<'py, i32>),
    F32(PyReadonlyArrayDyn<'py, f32>),
    F64(PyReadonlyArrayDyn<'py, f64>),
}

/// Copy a numpy array into a [`HostArray`]. The caller's buffer is only
/// read, never retained.
pub fn extract_array(ob: &Bound<'_, PyAny>) -> PyResult<HostArray> {
    let input: InputArray = ob.extract().map_err(|_| {
        InvalidArgument::new_err(
            "expected a numpy array of dtype uint8, int8, uint16, int16, int32, float32 or float64",
        )
    })?;

    Ok(match input {
        InputArray::U8(a) => a.as_array().to_owned().into(),
        InputArray::I8(a) => a.as_array().to_owned().into(),
        InputArray::U16(a) => a.as_array().to_owned().into(),
        InputArray::I16(a) => a.as_array().to_owned().into(),
        InputArray::I32(a) => a.as_array().to_owned().into(),
        InputArray::F32(a) => a.as_array().to_owned().into(),
        InputArray::F64(a) => a.as_array().to_owned().into(),
    })
}

/// Hand a [`HostArray`] to Python as a new numpy array
pub fn into_py_array(py: Python<'_>, array: HostArray) -> Bound<'_, PyAny> {
    match array {
        HostArray::U8(a) => a.into_pyarray_bound(py).into_any(),
        HostArray::I8(a) => a.into_pyarray_bound(py).into_any(),
        HostArray::U16(a) => a.into_pyarray_bound(py).into_any(),
        HostArray::I16(a) => a.into_pyarray_bound(py).into_any(),
        HostArray::I32(a) => a.into_pyarray_bound(py).into_any(),
        HostArray::F32(a) => a.into_pyarray_bound(py).into_any(),
        HostArray::F64(a) => a.into_pyarray_bound(py).into_any(),
    }
}
