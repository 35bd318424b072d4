//! Background model handles owned by Python callers

use cvbind_cv::{
    from_mat, to_mat, BackgroundModel, CudaMog2Model, ModelState, Mog2Model, Mog2Settings,
};
use pyo3::prelude::*;
use pyo3::types::PyTuple;

use crate::array::{extract_array, into_py_array};
use crate::errors::to_py_err;

/// Feed one numpy frame to `model` and return `(foreground_mask, frame)`
fn separate<'py, M: BackgroundModel>(
    py: Python<'py>,
    model: &mut M,
    frame: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyTuple>> {
    let frame = to_mat(&extract_array(frame)?).map_err(to_py_err)?;
    let separation = model.apply(&frame).map_err(to_py_err)?;

    let mask = from_mat(&separation.foreground_mask).map_err(to_py_err)?;
    let frame = from_mat(&separation.frame).map_err(to_py_err)?;
    Ok(PyTuple::new_bound(
        py,
        [into_py_array(py, mask), into_py_array(py, frame)],
    ))
}

fn background<'py, M: BackgroundModel>(
    py: Python<'py>,
    model: &M,
) -> PyResult<Option<Bound<'py, PyAny>>> {
    match model.background_image().map_err(to_py_err)? {
        Some(image) => Ok(Some(into_py_array(py, from_mat(&image).map_err(to_py_err)?))),
        None => Ok(None),
    }
}

fn settings(
    history: i32,
    var_threshold: f64,
    detect_shadows: bool,
    learning_rate: f64,
) -> Mog2Settings {
    Mog2Settings {
        history,
        var_threshold,
        detect_shadows,
        learning_rate,
    }
}

/// Mixture-of-Gaussians background model for one video stream.
///
/// Create one per stream and pass it to every `apply` call for that stream.
/// A handle must stay on the thread that created it.
#[pyclass(unsendable, module = "pbcvt")]
pub struct BackgroundSubtractor {
    inner: Mog2Model,
}

#[pymethods]
impl BackgroundSubtractor {
    #[new]
    #[pyo3(signature = (history = 500, var_threshold = 16.0, detect_shadows = true, learning_rate = -1.0))]
    fn new(
        history: i32,
        var_threshold: f64,
        detect_shadows: bool,
        learning_rate: f64,
    ) -> PyResult<Self> {
        let inner = Mog2Model::new(settings(history, var_threshold, detect_shadows, learning_rate))
            .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Classify a frame; returns `(foreground_mask, frame)`
    pub fn apply<'py>(
        &mut self,
        py: Python<'py>,
        frame: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyTuple>> {
        separate(py, &mut self.inner, frame)
    }

    /// Current background estimate, or None before the first frame
    fn background_image<'py>(&self, py: Python<'py>) -> PyResult<Option<Bound<'py, PyAny>>> {
        background(py, &self.inner)
    }

    /// Forget everything learned so far
    fn reset(&mut self) {
        self.inner.reset();
    }

    #[getter]
    fn initialized(&self) -> bool {
        self.inner.state() == ModelState::Initialized
    }

    #[getter]
    fn frames_seen(&self) -> u64 {
        self.inner.frames_seen()
    }

    fn __repr__(&self) -> String {
        let s = self.inner.settings();
        format!(
            "BackgroundSubtractor(history={}, var_threshold={}, detect_shadows={}, frames_seen={})",
            s.history,
            s.var_threshold,
            if s.detect_shadows { "True" } else { "False" },
            self.inner.frames_seen()
        )
    }
}

/// Same as `BackgroundSubtractor`, computed on a CUDA device
#[pyclass(unsendable, module = "pbcvt")]
pub struct GpuBackgroundSubtractor {
    inner: CudaMog2Model,
}

#[pymethods]
impl GpuBackgroundSubtractor {
    #[new]
    #[pyo3(signature = (history = 500, var_threshold = 16.0, detect_shadows = true, learning_rate = -1.0))]
    fn new(
        history: i32,
        var_threshold: f64,
        detect_shadows: bool,
        learning_rate: f64,
    ) -> PyResult<Self> {
        let inner =
            CudaMog2Model::new(settings(history, var_threshold, detect_shadows, learning_rate))
                .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    pub fn apply<'py>(
        &mut self,
        py: Python<'py>,
        frame: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyTuple>> {
        separate(py, &mut self.inner, frame)
    }

    fn background_image<'py>(&self, py: Python<'py>) -> PyResult<Option<Bound<'py, PyAny>>> {
        background(py, &self.inner)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    #[getter]
    fn initialized(&self) -> bool {
        self.inner.state() == ModelState::Initialized
    }

    #[getter]
    fn frames_seen(&self) -> u64 {
        self.inner.frames_seen()
    }
}
