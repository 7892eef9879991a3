//! Convolution through the Fourier domain.
//!
//! Transforms are unnormalized in the forward direction and scaled by `1 / N` in the inverse
//! direction. Frequency arrays use the standard layout, zero frequency at index 0. A spatial
//! filter is placed with its center pixel (`size / 2` along each axis) on index 0, so the
//! result matches the spatial engines under periodic boundaries. A smaller frequency filter is
//! padded around the zero frequency, keeping a Hermitian filter Hermitian.

use alloc::{string::ToString, vec, vec::Vec};
use core::marker::PhantomData;
use core::str::FromStr;

use imconv_core::{DataType, Error, FlexSample, Image, Result, Sample, SampleVisitor};
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};
use num_complex::Complex;
use num_traits::{AsPrimitive, Zero};
use rustfft::{FftDirection, FftNum, FftPlanner};

use super::traits::FourierConvolveND;
use crate::kernel::KernelLifecycle;

/// Domain an operand is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Representation {
    /// Samples in space.
    #[default]
    Spatial,
    /// Fourier coefficients.
    Frequency,
}

impl FromStr for Representation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "spatial" => Ok(Representation::Spatial),
            "frequency" => Ok(Representation::Frequency),
            other => Err(Error::InvalidRepresentation {
                name: other.to_string(),
            }),
        }
    }
}

/// Working precision of the transforms.
pub trait Precision: FftNum + Sample {
    /// Convert a real component of any flex type.
    fn from_real<R>(value: R) -> Self
    where
        R: AsPrimitive<f32> + AsPrimitive<f64>;
}

impl Precision for f32 {
    #[inline]
    fn from_real<R>(value: R) -> Self
    where
        R: AsPrimitive<f32> + AsPrimitive<f64>,
    {
        AsPrimitive::<f32>::as_(value)
    }
}

impl Precision for f64 {
    #[inline]
    fn from_real<R>(value: R) -> Self
    where
        R: AsPrimitive<f32> + AsPrimitive<f64>,
    {
        AsPrimitive::<f64>::as_(value)
    }
}

struct ToComplex<P>(PhantomData<P>);

impl<P: Precision> SampleVisitor for ToComplex<P> {
    type Output = ArrayD<Complex<P>>;

    fn visit<T: Sample>(self, pixels: ArrayViewD<'_, T>) -> ArrayD<Complex<P>> {
        pixels.mapv(|v| {
            let c = v.to_flex().to_complex();
            Complex::new(P::from_real(c.re), P::from_real(c.im))
        })
    }
}

/// In-place N-D transform: a 1-D transform along every axis longer than one sample.
///
/// The inverse is scaled by `1 / N`.
pub fn fft_nd<P: Precision>(array: &mut ArrayD<Complex<P>>, direction: FftDirection) {
    let mut planner = FftPlanner::<P>::new();
    let mut line = Vec::new();
    let mut scratch = Vec::new();
    for axis in 0..array.ndim() {
        let len = array.len_of(Axis(axis));
        if len <= 1 {
            continue;
        }
        let fft = planner.plan_fft(len, direction);
        line.resize(len, Complex::zero());
        scratch.resize(fft.get_inplace_scratch_len(), Complex::zero());
        for mut lane in array.lanes_mut(Axis(axis)) {
            line.iter_mut().zip(lane.iter()).for_each(|(dst, &src)| *dst = src);
            fft.process_with_scratch(&mut line, &mut scratch);
            lane.iter_mut().zip(&line).for_each(|(dst, &src)| *dst = src);
        }
    }
    if direction == FftDirection::Inverse && !array.is_empty() {
        let scale = P::from_real(1.0 / array.len() as f64);
        array.mapv_inplace(|c| c * scale);
    }
}

/// Constructor config for [`FourierConvolutionKernel`].
#[derive(Debug, Clone, Default)]
pub struct FourierConvolutionConfig {
    /// Filter image, no larger than the input along any axis.
    pub filter: Image,
    /// Domain of the input.
    pub input_representation: Representation,
    /// Domain of the filter.
    pub filter_representation: Representation,
    /// Domain of the output.
    pub output_representation: Representation,
}

/// Frequency-domain convolution kernel.
#[derive(Debug, Clone)]
pub struct FourierConvolutionKernel {
    filter: Image,
    filter_type: DataType,
    input_representation: Representation,
    filter_representation: Representation,
    output_representation: Representation,
}

impl KernelLifecycle for FourierConvolutionKernel {
    type Config = FourierConvolutionConfig;

    fn try_new(config: Self::Config) -> Result<Self> {
        let filter_type = config
            .filter
            .data_type()
            .ok_or(Error::NotAllocated { arg: "filter" })?;
        Ok(Self {
            filter: config.filter,
            filter_type,
            input_representation: config.input_representation,
            filter_representation: config.filter_representation,
            output_representation: config.output_representation,
        })
    }
}

impl FourierConvolutionKernel {
    fn convolve<P>(&self, input: &Image, input_type: DataType) -> Result<Image>
    where
        P: Precision,
        Complex<P>: Sample,
    {
        let shape = input
            .shape()
            .ok_or(Error::NotAllocated { arg: "in" })?
            .to_vec();
        let mut filter = self.filter.visit("filter", ToComplex::<P>(PhantomData))?;
        while filter.ndim() < shape.len() {
            let axis = filter.ndim();
            filter = filter.insert_axis(Axis(axis));
        }
        let fits = filter.ndim() == shape.len()
            && filter.shape().iter().zip(&shape).all(|(f, n)| f <= n);
        if !fits {
            return Err(Error::SizeMismatch {
                arg: "filter",
                expected: shape,
                got: filter.shape().to_vec(),
            });
        }

        let mut real = true;
        let mut product = input.visit("in", ToComplex::<P>(PhantomData))?;
        match self.input_representation {
            Representation::Spatial => {
                real &= input_type.is_real();
                fft_nd(&mut product, FftDirection::Forward);
            }
            Representation::Frequency => real = false,
        }

        let mut padded = pad_filter(&filter, &shape, self.filter_representation);
        match self.filter_representation {
            Representation::Spatial => {
                real &= self.filter_type.is_real();
                fft_nd(&mut padded, FftDirection::Forward);
            }
            Representation::Frequency => real = false,
        }

        Zip::from(&mut product)
            .and(&padded)
            .for_each(|a, &b| *a = *a * b);
        if self.output_representation == Representation::Frequency {
            return Ok(Image::from_array(product));
        }
        fft_nd(&mut product, FftDirection::Inverse);
        if real {
            Ok(Image::from_array(product.mapv(|c| c.re)))
        } else {
            Ok(Image::from_array(product))
        }
    }
}

/// Zero-pad `filter` to `shape`.
///
/// A spatial filter is shifted so its center pixel lands on index 0. A frequency filter keeps
/// its positive frequencies at the low end and its negative frequencies at the high end of each
/// axis.
fn pad_filter<P: Precision>(
    filter: &ArrayD<Complex<P>>,
    shape: &[usize],
    representation: Representation,
) -> ArrayD<Complex<P>> {
    let mut padded = ArrayD::<Complex<P>>::zeros(IxDyn(shape));
    let mut target = vec![0usize; shape.len()];
    for (index, &value) in filter.indexed_iter() {
        for (axis, t) in target.iter_mut().enumerate() {
            let (k, m, n) = (index[axis], filter.len_of(Axis(axis)), shape[axis]);
            *t = match representation {
                Representation::Spatial => (k + n - m / 2) % n,
                Representation::Frequency if k < m.div_ceil(2) => k,
                Representation::Frequency => n - (m - k),
            };
        }
        padded[target.as_slice()] = value;
    }
    padded
}

impl FourierConvolveND for FourierConvolutionKernel {
    fn run_image(&self, input: &Image) -> Result<Image> {
        let input_type = input.data_type().ok_or(Error::NotAllocated { arg: "in" })?;
        let double = input_type.is_double_precision() || self.filter_type.is_double_precision();
        log::debug!(
            "Fourier convolution of {} image with {} filter, {} precision",
            input_type,
            self.filter_type,
            if double { "double" } else { "single" }
        );
        if double {
            self.convolve::<f64>(input, input_type)
        } else {
            self.convolve::<f32>(input, input_type)
        }
    }
}

/// Convolve `input` with `filter` by multiplication in the Fourier domain.
///
/// Boundaries are periodic. The filter may have fewer axes than the input but must not be larger
/// along any axis. A spatial output is real when both operands were real and spatial, complex
/// otherwise; a frequency output is always complex.
pub fn convolve_ft(
    input: &Image,
    filter: &Image,
    output_representation: Representation,
    input_representation: Representation,
    filter_representation: Representation,
) -> Result<Image> {
    if !input.is_forged() {
        return Err(Error::NotAllocated { arg: "in" });
    }
    let kernel = FourierConvolutionKernel::try_new(FourierConvolutionConfig {
        filter: filter.clone(),
        input_representation,
        filter_representation,
        output_representation,
    })?;
    kernel.run_image(input)
}
