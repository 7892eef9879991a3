//! Sample types and flexible type promotion.

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub};

use ndarray::ArrayD;
use num_complex::Complex;
use num_traits::{AsPrimitive, Zero};

use crate::Pixels;

/// Runtime tag of the sample type stored in an [`crate::Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Binary (`bool`).
    Bin,
    /// `u8`.
    UInt8,
    /// `u16`.
    UInt16,
    /// `u32`.
    UInt32,
    /// `u64`.
    UInt64,
    /// `i8`.
    SInt8,
    /// `i16`.
    SInt16,
    /// `i32`.
    SInt32,
    /// `i64`.
    SInt64,
    /// `f32`.
    SFloat,
    /// `f64`.
    DFloat,
    /// `Complex<f32>`.
    SComplex,
    /// `Complex<f64>`.
    DComplex,
}

impl DataType {
    /// True for [`DataType::Bin`].
    pub fn is_binary(self) -> bool {
        matches!(self, DataType::Bin)
    }

    /// True for the two complex types.
    pub fn is_complex(self) -> bool {
        matches!(self, DataType::SComplex | DataType::DComplex)
    }

    /// True for every non-complex type, binary included.
    pub fn is_real(self) -> bool {
        !self.is_complex()
    }

    /// The smallest floating-point or complex type that holds every value of `self` without
    /// loss.
    ///
    /// Binary, 8-bit and 16-bit integers promote to single precision, wider integers to double
    /// precision; floating-point and complex types are returned unchanged.
    pub fn suggest_flex(self) -> DataType {
        match self {
            DataType::Bin
            | DataType::UInt8
            | DataType::UInt16
            | DataType::SInt8
            | DataType::SInt16
            | DataType::SFloat => DataType::SFloat,
            DataType::UInt32
            | DataType::UInt64
            | DataType::SInt32
            | DataType::SInt64
            | DataType::DFloat => DataType::DFloat,
            DataType::SComplex => DataType::SComplex,
            DataType::DComplex => DataType::DComplex,
        }
    }

    /// True when the flex type of `self` is double precision.
    pub fn is_double_precision(self) -> bool {
        matches!(self.suggest_flex(), DataType::DFloat | DataType::DComplex)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Bin => "BIN",
            DataType::UInt8 => "UINT8",
            DataType::UInt16 => "UINT16",
            DataType::UInt32 => "UINT32",
            DataType::UInt64 => "UINT64",
            DataType::SInt8 => "SINT8",
            DataType::SInt16 => "SINT16",
            DataType::SInt32 => "SINT32",
            DataType::SInt64 => "SINT64",
            DataType::SFloat => "SFLOAT",
            DataType::DFloat => "DFLOAT",
            DataType::SComplex => "SCOMPLEX",
            DataType::DComplex => "DCOMPLEX",
        };
        f.write_str(name)
    }
}

/// A sample type an [`crate::Image`] can store.
///
/// Each sample type names its flex type, the working type the engines compute in.
pub trait Sample: Copy + Send + Sync + fmt::Debug + 'static {
    /// Runtime tag of this type.
    const DATA_TYPE: DataType;

    /// Working type used for accumulation.
    type Flex: FlexSample;

    /// Lossless conversion into the working type.
    fn to_flex(self) -> Self::Flex;

    /// The value as a real number, `None` for complex samples.
    fn real_value(self) -> Option<f64>;

    /// Wrap an owned array into the type-erased pixel storage.
    fn wrap(array: ArrayD<Self>) -> Pixels;

    /// Borrow the typed array back out of the pixel storage.
    fn unwrap_ref(pixels: &Pixels) -> Option<&ArrayD<Self>>;

    /// Take the typed array back out of the pixel storage.
    fn unwrap(pixels: Pixels) -> Option<ArrayD<Self>>;
}

/// A working type: floating point or complex, closed under the filter arithmetic.
///
/// Filter coefficients are always real; [`FlexSample::coefficient`] converts them to the real
/// component type and [`FlexSample::scale`] applies them.
pub trait FlexSample:
    Sample<Flex = Self>
    + Zero
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + AddAssign
{
    /// Real component type.
    type Real: Copy + Send + Sync + fmt::Debug + AsPrimitive<f32> + AsPrimitive<f64>;

    /// Convert a filter coefficient to the real component type.
    fn coefficient(value: f64) -> Self::Real;

    /// Multiply by a real coefficient.
    fn scale(self, coefficient: Self::Real) -> Self;

    /// The sample as a complex number of its own precision.
    fn to_complex(self) -> Complex<Self::Real>;
}

macro_rules! sample_impl {
    ($ty:ty, $variant:ident, $flex:ty, $to_flex:expr, $real:expr) => {
        impl Sample for $ty {
            const DATA_TYPE: DataType = DataType::$variant;
            type Flex = $flex;

            #[inline]
            fn to_flex(self) -> $flex {
                ($to_flex)(self)
            }

            #[inline]
            fn real_value(self) -> Option<f64> {
                ($real)(self)
            }

            fn wrap(array: ArrayD<Self>) -> Pixels {
                Pixels::$variant(array)
            }

            fn unwrap_ref(pixels: &Pixels) -> Option<&ArrayD<Self>> {
                match pixels {
                    Pixels::$variant(array) => Some(array),
                    _ => None,
                }
            }

            fn unwrap(pixels: Pixels) -> Option<ArrayD<Self>> {
                match pixels {
                    Pixels::$variant(array) => Some(array),
                    _ => None,
                }
            }
        }
    };
}

sample_impl!(
    bool,
    Bin,
    f32,
    |v: bool| if v { 1.0 } else { 0.0 },
    |v: bool| Some(if v { 1.0 } else { 0.0 })
);
sample_impl!(u8, UInt8, f32, |v: u8| v as f32, |v: u8| Some(v as f64));
sample_impl!(u16, UInt16, f32, |v: u16| v as f32, |v: u16| Some(v as f64));
sample_impl!(u32, UInt32, f64, |v: u32| v as f64, |v: u32| Some(v as f64));
sample_impl!(u64, UInt64, f64, |v: u64| v as f64, |v: u64| Some(v as f64));
sample_impl!(i8, SInt8, f32, |v: i8| v as f32, |v: i8| Some(v as f64));
sample_impl!(i16, SInt16, f32, |v: i16| v as f32, |v: i16| Some(v as f64));
sample_impl!(i32, SInt32, f64, |v: i32| v as f64, |v: i32| Some(v as f64));
sample_impl!(i64, SInt64, f64, |v: i64| v as f64, |v: i64| Some(v as f64));
sample_impl!(f32, SFloat, f32, |v: f32| v, |v: f32| Some(v as f64));
sample_impl!(f64, DFloat, f64, |v: f64| v, Some);
sample_impl!(
    Complex<f32>,
    SComplex,
    Complex<f32>,
    |v: Complex<f32>| v,
    |_: Complex<f32>| None
);
sample_impl!(
    Complex<f64>,
    DComplex,
    Complex<f64>,
    |v: Complex<f64>| v,
    |_: Complex<f64>| None
);

macro_rules! flex_real_impl {
    ($ty:ty) => {
        impl FlexSample for $ty {
            type Real = $ty;

            #[inline]
            fn coefficient(value: f64) -> $ty {
                value as $ty
            }

            #[inline]
            fn scale(self, coefficient: $ty) -> Self {
                coefficient * self
            }

            #[inline]
            fn to_complex(self) -> Complex<$ty> {
                Complex::new(self, 0.0)
            }
        }
    };
}

macro_rules! flex_complex_impl {
    ($ty:ty) => {
        impl FlexSample for Complex<$ty> {
            type Real = $ty;

            #[inline]
            fn coefficient(value: f64) -> $ty {
                value as $ty
            }

            #[inline]
            fn scale(self, coefficient: $ty) -> Self {
                self * coefficient
            }

            #[inline]
            fn to_complex(self) -> Complex<$ty> {
                self
            }
        }
    };
}

flex_real_impl!(f32);
flex_real_impl!(f64);
flex_complex_impl!(f32);
flex_complex_impl!(f64);
