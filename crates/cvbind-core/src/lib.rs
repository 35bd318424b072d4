//! Host-side array model for the cvbind binding surface.
//!
//! Everything a caller hands across the boundary is described here: the
//! element depths OpenCV understands, the `rows x cols x channels` shape of a
//! matrix, and [`HostArray`], the ndarray-backed value that gets converted to
//! and from a native matrix. Nothing in this crate links against OpenCV.

pub mod array;
pub mod depth;
pub mod error;
pub mod shape;

pub use array::{ArrayElement, HostArray};
pub use depth::{Depth, Sample};
pub use error::ArrayError;
pub use shape::Shape;

pub type Result<T> = std::result::Result<T, ArrayError>;
