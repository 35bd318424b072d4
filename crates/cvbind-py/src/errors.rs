//! Python exceptions raised by pbcvt

use cvbind_cv::{CvError, ErrorKind};
use pyo3::create_exception;
use pyo3::exceptions::{PyRuntimeError, PyTypeError};
use pyo3::PyErr;

create_exception!(
    pbcvt,
    InvalidArgument,
    PyTypeError,
    "An argument could not be interpreted as a supported matrix."
);
create_exception!(
    pbcvt,
    IncompatibleShape,
    PyTypeError,
    "Incompatible sizes for matrix multiplication."
);

pub fn to_py_err(err: CvError) -> PyErr {
    let message = err.to_string();
    match err.kind() {
        ErrorKind::InvalidArgument => InvalidArgument::new_err(message),
        ErrorKind::IncompatibleShape => IncompatibleShape::new_err(message),
        ErrorKind::Backend => PyRuntimeError::new_err(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvbind_core::Shape;
    use pyo3::Python;

    #[test]
    fn test_errors_map_to_python_exceptions() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let err = to_py_err(CvError::InvalidArgument("bad dtype".into()));
            assert!(err.is_instance_of::<InvalidArgument>(py));
            assert!(err.is_instance_of::<PyTypeError>(py));

            let err = to_py_err(CvError::IncompatibleShape {
                left: Shape::new(2, 3, 1),
                right: Shape::new(2, 2, 1),
            });
            assert!(err.is_instance_of::<IncompatibleShape>(py));
            assert!(err.is_instance_of::<PyTypeError>(py));
            assert!(!err.is_instance_of::<InvalidArgument>(py));

            let err = to_py_err(CvError::AcceleratorUnavailable);
            assert!(err.is_instance_of::<PyRuntimeError>(py));
            assert!(!err.is_instance_of::<PyTypeError>(py));
        });
    }
}
