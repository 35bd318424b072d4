//! Element depths shared by host arrays and OpenCV matrices

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ArrayError;

/// Numeric element type of a matrix.
///
/// The discriminants are OpenCV's depth codes (`CV_8U` .. `CV_64F`), so a
/// depth can be handed to the native library without a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Depth {
    U8 = 0,
    I8 = 1,
    U16 = 2,
    I16 = 3,
    I32 = 4,
    F32 = 5,
    F64 = 6,
}

impl Depth {
    pub const ALL: [Depth; 7] = [
        Depth::U8,
        Depth::I8,
        Depth::U16,
        Depth::I16,
        Depth::I32,
        Depth::F32,
        Depth::F64,
    ];

    /// OpenCV depth code
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Result<Self, ArrayError> {
        Self::ALL
            .into_iter()
            .find(|depth| depth.code() == code)
            .ok_or_else(|| ArrayError::UnsupportedDepth(format!("OpenCV depth code {code}")))
    }

    /// Size of one sample in bytes
    pub fn size(self) -> usize {
        match self {
            Depth::U8 | Depth::I8 => 1,
            Depth::U16 | Depth::I16 => 2,
            Depth::I32 | Depth::F32 => 4,
            Depth::F64 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Depth::F32 | Depth::F64)
    }

    /// numpy-style dtype name
    pub fn name(self) -> &'static str {
        match self {
            Depth::U8 => "uint8",
            Depth::I8 => "int8",
            Depth::U16 => "uint16",
            Depth::I16 => "int16",
            Depth::I32 => "int32",
            Depth::F32 => "float32",
            Depth::F64 => "float64",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Depth {
    type Err = ArrayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|depth| {
                depth.name() == lowered || format!("{depth:?}").to_lowercase() == lowered
            })
            .ok_or_else(|| ArrayError::UnsupportedDepth(s.to_string()))
    }
}

/// A scalar type that can live inside a matrix.
///
/// Samples travel as native-endian bytes, which is how a continuous OpenCV
/// matrix stores them.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    const DEPTH: Depth;

    fn write_ne(self, out: &mut Vec<u8>);

    /// `bytes` is exactly `Self::DEPTH.size()` long.
    fn read_ne(bytes: &[u8]) -> Self;
}

macro_rules! impl_sample {
    ($($ty:ty => $depth:ident),* $(,)?) => {
        $(
            impl Sample for $ty {
                const DEPTH: Depth = Depth::$depth;

                fn write_ne(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_ne_bytes());
                }

                fn read_ne(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_ne_bytes(raw)
                }
            }
        )*
    };
}

impl_sample! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    i32 => I32,
    f32 => F32,
    f64 => F64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_codes_match_opencv() {
        assert_eq!(Depth::U8.code(), 0);
        assert_eq!(Depth::U16.code(), 2);
        assert_eq!(Depth::F64.code(), 6);
        assert_eq!(Depth::from_code(5).unwrap(), Depth::F32);
        assert!(Depth::from_code(7).is_err());
    }

    #[test]
    fn test_sample_sizes_agree_with_depth() {
        assert_eq!(Depth::U16.size(), std::mem::size_of::<u16>());
        assert_eq!(Depth::I32.size(), std::mem::size_of::<i32>());
        assert_eq!(Depth::F64.size(), std::mem::size_of::<f64>());
    }

    #[test]
    fn test_parse_depth() {
        assert_eq!("uint16".parse::<Depth>().unwrap(), Depth::U16);
        assert_eq!("F32".parse::<Depth>().unwrap(), Depth::F32);
        assert!("float16".parse::<Depth>().is_err());
    }

    #[test]
    fn test_sample_bytes() {
        let mut out = Vec::new();
        (-2.5f64).write_ne(&mut out);
        513u16.write_ne(&mut out);
        assert_eq!(out.len(), 10);
        assert_eq!(f64::read_ne(&out[..8]), -2.5);
        assert_eq!(u16::read_ne(&out[8..]), 513);
    }
}
