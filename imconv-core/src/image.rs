//! Runtime-typed image container.

use ndarray::{ArrayD, ArrayViewD};
use num_complex::Complex;

use crate::{DataType, Error, Result, Sample};

/// Type-erased pixel storage: one owned array per supported sample type.
#[derive(Debug, Clone, PartialEq)]
pub enum Pixels {
    /// Binary samples.
    Bin(ArrayD<bool>),
    /// `u8` samples.
    UInt8(ArrayD<u8>),
    /// `u16` samples.
    UInt16(ArrayD<u16>),
    /// `u32` samples.
    UInt32(ArrayD<u32>),
    /// `u64` samples.
    UInt64(ArrayD<u64>),
    /// `i8` samples.
    SInt8(ArrayD<i8>),
    /// `i16` samples.
    SInt16(ArrayD<i16>),
    /// `i32` samples.
    SInt32(ArrayD<i32>),
    /// `i64` samples.
    SInt64(ArrayD<i64>),
    /// `f32` samples.
    SFloat(ArrayD<f32>),
    /// `f64` samples.
    DFloat(ArrayD<f64>),
    /// `Complex<f32>` samples.
    SComplex(ArrayD<Complex<f32>>),
    /// `Complex<f64>` samples.
    DComplex(ArrayD<Complex<f64>>),
}

/// Generic operation applied to the typed pixels of an [`Image`].
///
/// [`Image::visit`] resolves the sample type once and hands the typed view to
/// [`SampleVisitor::visit`], so inner loops never check types per sample.
pub trait SampleVisitor {
    /// Value produced by the visit.
    type Output;

    /// Run the operation on a typed view.
    fn visit<T: Sample>(self, pixels: ArrayViewD<'_, T>) -> Self::Output;
}

macro_rules! dispatch {
    ($pixels:expr, $array:ident => $body:expr) => {
        match $pixels {
            Pixels::Bin($array) => $body,
            Pixels::UInt8($array) => $body,
            Pixels::UInt16($array) => $body,
            Pixels::UInt32($array) => $body,
            Pixels::UInt64($array) => $body,
            Pixels::SInt8($array) => $body,
            Pixels::SInt16($array) => $body,
            Pixels::SInt32($array) => $body,
            Pixels::SInt64($array) => $body,
            Pixels::SFloat($array) => $body,
            Pixels::DFloat($array) => $body,
            Pixels::SComplex($array) => $body,
            Pixels::DComplex($array) => $body,
        }
    };
}

impl Pixels {
    /// Runtime sample type of the storage.
    pub fn data_type(&self) -> DataType {
        match self {
            Pixels::Bin(_) => DataType::Bin,
            Pixels::UInt8(_) => DataType::UInt8,
            Pixels::UInt16(_) => DataType::UInt16,
            Pixels::UInt32(_) => DataType::UInt32,
            Pixels::UInt64(_) => DataType::UInt64,
            Pixels::SInt8(_) => DataType::SInt8,
            Pixels::SInt16(_) => DataType::SInt16,
            Pixels::SInt32(_) => DataType::SInt32,
            Pixels::SInt64(_) => DataType::SInt64,
            Pixels::SFloat(_) => DataType::SFloat,
            Pixels::DFloat(_) => DataType::DFloat,
            Pixels::SComplex(_) => DataType::SComplex,
            Pixels::DComplex(_) => DataType::DComplex,
        }
    }

    /// Sizes of the array along each axis.
    pub fn shape(&self) -> &[usize] {
        dispatch!(self, array => array.shape())
    }
}

/// An N-dimensional image: optional storage of one typed array.
///
/// An image without storage is "not allocated"; every engine rejects it with
/// [`Error::NotAllocated`] before doing any work.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pixels: Option<Pixels>,
}

impl Image {
    /// An image without storage.
    pub fn new() -> Self {
        Self { pixels: None }
    }

    /// Take ownership of a typed array.
    pub fn from_array<T: Sample>(array: ArrayD<T>) -> Self {
        Self {
            pixels: Some(T::wrap(array)),
        }
    }

    /// True when the image has storage.
    pub fn is_forged(&self) -> bool {
        self.pixels.is_some()
    }

    /// Sample type, `None` when not allocated.
    pub fn data_type(&self) -> Option<DataType> {
        self.pixels.as_ref().map(Pixels::data_type)
    }

    /// Sizes along each axis, `None` when not allocated.
    pub fn shape(&self) -> Option<&[usize]> {
        self.pixels.as_ref().map(Pixels::shape)
    }

    /// Number of axes, 0 when not allocated.
    pub fn ndim(&self) -> usize {
        self.shape().map_or(0, <[usize]>::len)
    }

    /// Borrow the storage.
    pub fn pixels(&self) -> Option<&Pixels> {
        self.pixels.as_ref()
    }

    /// Borrow the pixels as a typed view if the sample type matches `T`.
    pub fn view<T: Sample>(&self) -> Option<ArrayViewD<'_, T>> {
        self.pixels
            .as_ref()
            .and_then(T::unwrap_ref)
            .map(|array| array.view())
    }

    /// Take the pixels out as a typed array if the sample type matches `T`.
    pub fn into_array<T: Sample>(self) -> Option<ArrayD<T>> {
        self.pixels.and_then(T::unwrap)
    }

    /// Run `visitor` on the typed pixels.
    ///
    /// `arg` names the image in the [`Error::NotAllocated`] raised when it has no storage.
    pub fn visit<V: SampleVisitor>(&self, arg: &'static str, visitor: V) -> Result<V::Output> {
        let pixels = self.pixels.as_ref().ok_or(Error::NotAllocated { arg })?;
        Ok(dispatch!(pixels, array => visitor.visit(array.view())))
    }
}

impl<T: Sample> From<ArrayD<T>> for Image {
    fn from(array: ArrayD<T>) -> Self {
        Self::from_array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    struct Sum;

    impl SampleVisitor for Sum {
        type Output = Option<f64>;

        fn visit<T: Sample>(self, pixels: ArrayViewD<'_, T>) -> Option<f64> {
            pixels.iter().map(|v| v.real_value()).sum()
        }
    }

    #[test]
    fn unallocated_image_is_rejected() {
        let img = Image::new();
        assert!(!img.is_forged());
        assert_eq!(img.ndim(), 0);
        assert_eq!(
            img.visit("in", Sum),
            Err(Error::NotAllocated { arg: "in" })
        );
    }

    #[test]
    fn visit_dispatches_on_stored_type() {
        let img = Image::from(ArrayD::from_elem(IxDyn(&[2, 3]), 4u16));
        assert_eq!(img.data_type(), Some(DataType::UInt16));
        assert_eq!(img.shape(), Some(&[2usize, 3][..]));
        assert_eq!(img.visit("in", Sum), Ok(Some(24.0)));
        assert!(img.view::<u16>().is_some());
        assert!(img.view::<f32>().is_none());

        let complex = Image::from(ArrayD::from_elem(IxDyn(&[2]), Complex::new(1.0f32, 1.0)));
        assert_eq!(complex.visit("in", Sum), Ok(None));
    }

    #[test]
    fn typed_array_round_trips() {
        let array = ArrayD::from_elem(IxDyn(&[4]), 1.5f64);
        let img = Image::from_array(array.clone());
        assert_eq!(img.clone().into_array::<f64>(), Some(array));
        assert_eq!(img.into_array::<f32>(), None);
    }
}
