//! cvbind computer vision surface
//!
//! A thin, typed layer over OpenCV: host arrays are converted to matrices in
//! exactly one place ([`convert`]), each operation delegates to a single
//! library call, and background models are explicit handles instead of
//! process-wide state.
//!
//! Every operation blocks until the native computation finishes. Matrices are
//! owned by the caller; nothing here keeps a reference after returning.

pub mod background;
pub mod convert;
pub mod error;
pub mod ops;

// Re-export commonly used types
pub use background::{
    BackgroundModel, CudaMog2Model, ModelState, Mog2Model, Mog2Settings, Separation,
};
pub use convert::{from_mat, to_mat};
pub use error::{CvError, ErrorKind};
pub use ops::{
    dot, dot_mat, increment, increment_elements_by_one, make_cv16u_array, make_cv16u_matrix,
};

pub use cvbind_core::{Depth, HostArray, Shape};

// Error handling
pub type Result<T> = std::result::Result<T, CvError>;
