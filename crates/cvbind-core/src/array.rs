//! Typed host arrays crossing the binding boundary

use ndarray::{ArrayD, ArrayViewD, IxDyn};

use crate::depth::{Depth, Sample};
use crate::error::ArrayError;
use crate::shape::Shape;
use crate::Result;

/// An owned n-dimensional array of one of the supported element types.
///
/// This is the caller-side representation of a matrix: a numpy array on the
/// Python side, a plain `ndarray` for Rust callers.
#[derive(Debug, Clone, PartialEq)]
pub enum HostArray {
    U8(ArrayD<u8>),
    I8(ArrayD<i8>),
    U16(ArrayD<u16>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

/// Runs `$body` with `$a` bound to the inner array, whatever its type.
macro_rules! dispatch {
    ($value:expr, $a:ident => $body:expr) => {
        match $value {
            HostArray::U8($a) => $body,
            HostArray::I8($a) => $body,
            HostArray::U16($a) => $body,
            HostArray::I16($a) => $body,
            HostArray::I32($a) => $body,
            HostArray::F32($a) => $body,
            HostArray::F64($a) => $body,
        }
    };
}

/// Links a [`Sample`] type to its [`HostArray`] variant.
pub trait ArrayElement: Sample {
    fn wrap(array: ArrayD<Self>) -> HostArray;
    fn peek(array: &HostArray) -> Option<&ArrayD<Self>>;
}

macro_rules! impl_array_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ArrayElement for $ty {
                fn wrap(array: ArrayD<Self>) -> HostArray {
                    HostArray::$variant(array)
                }

                fn peek(array: &HostArray) -> Option<&ArrayD<Self>> {
                    match array {
                        HostArray::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<ArrayD<$ty>> for HostArray {
                fn from(array: ArrayD<$ty>) -> Self {
                    HostArray::$variant(array)
                }
            }
        )*
    };
}

impl_array_element! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    i32 => I32,
    f32 => F32,
    f64 => F64,
}

impl HostArray {
    /// Wrap any fixed-dimension ndarray
    pub fn new<T, D>(array: ndarray::Array<T, D>) -> Self
    where
        T: ArrayElement,
        D: ndarray::Dimension,
    {
        T::wrap(array.into_dyn())
    }

    pub fn zeros(depth: Depth, shape: Shape) -> Result<Self> {
        shape.validate()?;
        let dims = IxDyn(&shape.dims());
        Ok(match depth {
            Depth::U8 => HostArray::U8(ArrayD::zeros(dims)),
            Depth::I8 => HostArray::I8(ArrayD::zeros(dims)),
            Depth::U16 => HostArray::U16(ArrayD::zeros(dims)),
            Depth::I16 => HostArray::I16(ArrayD::zeros(dims)),
            Depth::I32 => HostArray::I32(ArrayD::zeros(dims)),
            Depth::F32 => HostArray::F32(ArrayD::zeros(dims)),
            Depth::F64 => HostArray::F64(ArrayD::zeros(dims)),
        })
    }

    pub fn depth(&self) -> Depth {
        match self {
            HostArray::U8(_) => Depth::U8,
            HostArray::I8(_) => Depth::I8,
            HostArray::U16(_) => Depth::U16,
            HostArray::I16(_) => Depth::I16,
            HostArray::I32(_) => Depth::I32,
            HostArray::F32(_) => Depth::F32,
            HostArray::F64(_) => Depth::F64,
        }
    }

    /// Raw ndarray dimensions
    pub fn dims(&self) -> &[usize] {
        dispatch!(self, a => a.shape())
    }

    /// Matrix shape, validated for the native library
    pub fn shape(&self) -> Result<Shape> {
        Shape::from_dims(self.dims())
    }

    /// Borrow the samples as `T`, if that is the element type
    pub fn view<T: ArrayElement>(&self) -> Option<ArrayViewD<'_, T>> {
        T::peek(self).map(|a| a.view())
    }

    /// Samples in row-major, channel-interleaved order as native-endian bytes.
    ///
    /// Strided or transposed arrays are walked in logical order, so the
    /// result always describes a continuous matrix.
    pub fn to_ne_bytes(&self) -> Result<(Shape, Vec<u8>)> {
        let shape = self.shape()?;
        let mut bytes = Vec::with_capacity(shape.sample_count() * self.depth().size());
        dispatch!(self, a => a.iter().for_each(|v| v.write_ne(&mut bytes)));
        Ok((shape, bytes))
    }

    /// Rebuild an array from the byte layout produced by
    /// [`HostArray::to_ne_bytes`].
    pub fn from_ne_bytes(depth: Depth, shape: Shape, bytes: &[u8]) -> Result<Self> {
        shape.validate()?;
        match depth {
            Depth::U8 => decode::<u8>(shape, bytes),
            Depth::I8 => decode::<i8>(shape, bytes),
            Depth::U16 => decode::<u16>(shape, bytes),
            Depth::I16 => decode::<i16>(shape, bytes),
            Depth::I32 => decode::<i32>(shape, bytes),
            Depth::F32 => decode::<f32>(shape, bytes),
            Depth::F64 => decode::<f64>(shape, bytes),
        }
    }

    /// Widen every sample to `f64`; exact for all supported depths.
    pub fn to_f64(&self) -> ArrayD<f64> {
        dispatch!(self, a => a.mapv(|v| v as f64))
    }
}

fn decode<T: ArrayElement>(shape: Shape, bytes: &[u8]) -> Result<HostArray> {
    let size = T::DEPTH.size();
    let expected = shape.sample_count() * size;
    if bytes.len() != expected {
        return Err(ArrayError::BufferLength {
            expected,
            actual: bytes.len(),
        });
    }

    let samples: Vec<T> = bytes.chunks_exact(size).map(T::read_ne).collect();
    let array = ArrayD::from_shape_vec(IxDyn(&shape.dims()), samples).map_err(|_| {
        ArrayError::BufferLength {
            expected,
            actual: bytes.len(),
        }
    })?;
    Ok(T::wrap(array))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array3};

    #[test]
    fn test_depth_follows_variant() {
        let a = HostArray::new(arr2(&[[1u16, 2], [3, 4]]));
        assert_eq!(a.depth(), Depth::U16);
        assert_eq!(a.shape().unwrap(), Shape::new(2, 2, 1));
    }

    #[test]
    fn test_bytes_are_row_major() {
        let a = HostArray::new(arr2(&[[1u8, 2, 3], [4, 5, 6]]));
        let (shape, bytes) = a.to_ne_bytes().unwrap();
        assert_eq!(shape, Shape::new(2, 3, 1));
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_transposed_input_is_copied_in_logical_order() {
        let a = arr2(&[[1u8, 2], [3, 4]]).reversed_axes();
        let (_, bytes) = HostArray::new(a).to_ne_bytes().unwrap();
        assert_eq!(bytes, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_multichannel_rebuild_preserves_values() {
        let original = Array3::from_shape_fn((2, 3, 3), |(r, c, ch)| {
            (r * 100 + c * 10 + ch) as f64 + 0.125
        });
        let host = HostArray::new(original.clone());
        let (shape, bytes) = host.to_ne_bytes().unwrap();
        let rebuilt = HostArray::from_ne_bytes(Depth::F64, shape, &bytes).unwrap();
        assert_eq!(rebuilt.view::<f64>().unwrap(), original.into_dyn().view());
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = HostArray::from_ne_bytes(Depth::U16, Shape::new(2, 2, 1), &[0u8; 7]);
        assert_eq!(
            err,
            Err(ArrayError::BufferLength {
                expected: 8,
                actual: 7
            })
        );
    }

    #[test]
    fn test_oversized_shape_is_rejected_before_decoding() {
        let huge = Shape::new(i32::MAX as usize, i32::MAX as usize, 512);
        assert_eq!(
            HostArray::from_ne_bytes(Depth::F64, huge, &[]),
            Err(ArrayError::TooManySamples(huge))
        );
        assert!(HostArray::zeros(Depth::U8, huge).is_err());
    }

    #[test]
    fn test_zeros() {
        let z = HostArray::zeros(Depth::U16, Shape::new(240, 320, 3)).unwrap();
        assert_eq!(z.dims(), &[240, 320, 3]);
        assert!(z.view::<u16>().unwrap().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_rank_one_is_not_a_matrix() {
        let a = HostArray::new(ndarray::arr1(&[1.0f32, 2.0]));
        assert_eq!(a.shape(), Err(ArrayError::UnsupportedRank(1)));
    }
}
