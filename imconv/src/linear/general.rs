//! General convolution with an arbitrary N-D kernel.

use alloc::vec::Vec;

use imconv_core::{Error, FlexSample, Image, Result, Sample};
use ndarray::{ArrayD, ArrayViewD};

use super::traits::ConvolveND;
use super::uniform::{UniformFilterConfig, UniformFilterKernel};
use crate::boundary::BoundaryCondition;
use crate::framework::{full, FullLineFilter, FullLineParams};
use crate::kernel::{check_len, KernelLifecycle, Write1D};
use crate::neighborhood::Kernel;

/// Line filter computing the weighted sum over the pixel table.
#[derive(Debug, Clone)]
pub struct GeneralConvolutionLineFilter<F: FlexSample> {
    weights: Vec<F::Real>,
}

impl<F: FlexSample> GeneralConvolutionLineFilter<F> {
    /// Convert the kernel weights to the real component type of `F`.
    pub fn new(kernel: &Kernel) -> Self {
        Self {
            weights: kernel.weights().iter().map(|&w| F::coefficient(w)).collect(),
        }
    }
}

impl<F: FlexSample> FullLineFilter<F> for GeneralConvolutionLineFilter<F> {
    fn filter<O>(&self, params: &FullLineParams<'_, F>, out: &mut O) -> Result<()>
    where
        O: Write1D<F> + ?Sized,
    {
        let out = out.write_slice_mut()?;
        check_len("out", params.length, out.len())?;
        check_len("pixel_table", self.weights.len(), params.table.len())?;
        let offsets = params.table.offsets();
        for (i, o) in out.iter_mut().enumerate() {
            let center = params.center(i);
            let mut sum = F::zero();
            for (&offset, &w) in offsets.iter().zip(&self.weights) {
                sum += params.input[(center + offset) as usize].scale(w);
            }
            *o = sum;
        }
        Ok(())
    }
}

/// Constructor config for [`GeneralConvolutionKernel`].
#[derive(Debug, Clone)]
pub struct GeneralConvolutionConfig {
    /// Filter as read from the filter image, origin at `size / 2` along every axis.
    pub kernel: Kernel,
    /// Empty for the default, one entry to broadcast, or one per axis.
    pub boundary: Vec<BoundaryCondition>,
}

/// General convolution kernel.
///
/// The filter is mirrored on construction, so running the kernel convolves rather than
/// correlates. Binary filters compute the mean over their footprint.
#[derive(Debug, Clone)]
pub struct GeneralConvolutionKernel {
    kernel: Kernel,
    boundary: Vec<BoundaryCondition>,
}

impl KernelLifecycle for GeneralConvolutionKernel {
    type Config = GeneralConvolutionConfig;

    fn try_new(config: Self::Config) -> Result<Self> {
        let mut kernel = config.kernel;
        kernel.mirror();
        Ok(Self {
            kernel,
            boundary: config.boundary,
        })
    }
}

impl ConvolveND for GeneralConvolutionKernel {
    fn run<T: Sample>(&self, input: ArrayViewD<'_, T>) -> Result<ArrayD<T::Flex>> {
        let ndim = input.ndim();
        if ndim == 0 {
            return Err(Error::UnsupportedDimensionality { arg: "in", ndim });
        }
        if self.kernel.is_binary() {
            log::debug!("general convolution with a binary kernel, computing the uniform filter");
            let uniform = UniformFilterKernel::try_new(UniformFilterConfig {
                kernel: self.kernel.clone(),
                boundary: self.boundary.clone(),
            })?;
            return uniform.run(input);
        }
        let mut kernel = self.kernel.clone();
        kernel.expand_dimensionality(ndim)?;
        let boundary = BoundaryCondition::resolve(&self.boundary, ndim)?;
        log::debug!(
            "general convolution of {} image {:?} with {} kernel pixels",
            T::DATA_TYPE,
            input.shape(),
            kernel.len()
        );
        full(
            input,
            &kernel,
            &boundary,
            &GeneralConvolutionLineFilter::<T::Flex>::new(&kernel),
        )
    }
}

/// Convolve `input` with the filter image `filter`.
///
/// The filter origin is at `size / 2` along every axis. A filter with fewer axes than `input` is
/// extended with singleton axes. Zero-valued filter pixels are skipped. A binary filter yields
/// the mean over its set pixels. Complex filters are not supported.
pub fn general_convolution(
    input: &Image,
    filter: &Image,
    boundary: &[BoundaryCondition],
) -> Result<Image> {
    if !input.is_forged() {
        return Err(Error::NotAllocated { arg: "in" });
    }
    let kernel = GeneralConvolutionKernel::try_new(GeneralConvolutionConfig {
        kernel: Kernel::try_from_image(filter)?,
        boundary: boundary.to_vec(),
    })?;
    kernel.run_image(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::uniform::uniform_filter;
    use alloc::vec;
    use ndarray::{array, IxDyn};
    use num_complex::Complex;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn run(input: &Image, filter: &Image, bc: BoundaryCondition) -> ArrayD<f64> {
        general_convolution(input, filter, &[bc])
            .expect("general convolution")
            .into_array::<f64>()
            .expect("f64 output")
    }

    #[test]
    fn impulse_reproduces_the_filter() {
        let mut impulse = ArrayD::<f64>::zeros(IxDyn(&[5, 5]));
        impulse[[2, 2]] = 1.0;
        let weights = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]].into_dyn();
        let out = run(
            &Image::from(impulse),
            &Image::from(weights.clone()),
            BoundaryCondition::AddZeros,
        );
        let mut expected = ArrayD::<f64>::zeros(IxDyn(&[5, 5]));
        expected
            .slice_mut(ndarray::s![1..4, 1..4])
            .assign(&weights);
        assert_eq!(out, expected);
    }

    #[test]
    fn filter_is_mirrored() {
        // Correlating with [1, 0, 0] reads the left neighbour, convolving reads the right one.
        let input = Image::from(array![1.0f64, 2.0, 3.0, 4.0].into_dyn());
        let filter = Image::from(array![1.0f64, 0.0, 0.0].into_dyn());
        let out = run(&input, &filter, BoundaryCondition::Periodic);
        assert_eq!(out, array![2.0, 3.0, 4.0, 1.0].into_dyn());
    }

    #[test]
    fn binary_filter_is_the_uniform_filter() {
        let mut rng = StdRng::seed_from_u64(5);
        let input = Image::from(ArrayD::from_shape_simple_fn(IxDyn(&[9, 7]), || {
            rng.random_range(0u16..1000)
        }));
        let mask = array![[true, true, false], [false, true, true]].into_dyn();
        let out = general_convolution(
            &input,
            &Image::from(mask.clone()),
            &[BoundaryCondition::SymmetricMirror],
        )
        .expect("binary general convolution");

        let mut footprint = Kernel::from_mask(mask.view());
        footprint.mirror();
        let expected = uniform_filter(&input, &footprint, &[BoundaryCondition::SymmetricMirror])
            .expect("uniform filter");
        assert_eq!(out, expected);
        assert_eq!(out.data_type(), Some(imconv_core::DataType::SFloat));
    }

    #[test]
    fn all_zero_filter_gives_zeros() {
        let input = Image::from(array![1.0f64, 2.0, 3.0].into_dyn());
        let filter = Image::from(array![0.0f64, 0.0].into_dyn());
        let out = run(&input, &filter, BoundaryCondition::Periodic);
        assert_eq!(out, ArrayD::<f64>::zeros(IxDyn(&[3])));
    }

    #[test]
    fn argument_errors() {
        let image = Image::from(array![1.0f64, 2.0].into_dyn());
        let filter = Image::from(array![1.0f64].into_dyn());
        assert_eq!(
            general_convolution(&Image::new(), &filter, &[]),
            Err(Error::NotAllocated { arg: "in" })
        );
        assert_eq!(
            general_convolution(&image, &Image::new(), &[]),
            Err(Error::NotAllocated { arg: "kernel" })
        );
        let complex = Image::from(array![Complex::new(1.0f32, 0.0)].into_dyn());
        assert_eq!(
            general_convolution(&image, &complex, &[]),
            Err(Error::DataTypeNotSupported {
                arg: "kernel",
                data_type: imconv_core::DataType::SComplex
            })
        );
        let filter_2d = Image::from(array![[1.0f64]].into_dyn());
        assert_eq!(
            general_convolution(&image, &filter_2d, &[]),
            Err(Error::DimensionalityMismatch {
                arg: "kernel",
                expected: 1,
                got: 2
            })
        );
    }
}
