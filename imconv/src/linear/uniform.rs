//! Uniform (box) filter: the mean over a kernel footprint.

use alloc::vec::Vec;

use imconv_core::{Error, FlexSample, Image, Result, Sample};
use ndarray::{ArrayD, ArrayViewD};

use super::traits::ConvolveND;
use crate::boundary::BoundaryCondition;
use crate::framework::{full, FullLineFilter, FullLineParams};
use crate::kernel::{check_len, KernelLifecycle, Write1D};
use crate::neighborhood::Kernel;

/// Line filter averaging the samples under the pixel table.
#[derive(Debug, Clone, Copy)]
pub struct UniformLineFilter<F: FlexSample> {
    norm: F::Real,
}

impl<F: FlexSample> UniformLineFilter<F> {
    /// Average over `count` pixels.
    pub fn new(count: usize) -> Self {
        Self {
            norm: F::coefficient(1.0 / count as f64),
        }
    }
}

impl<F: FlexSample> FullLineFilter<F> for UniformLineFilter<F> {
    fn filter<O>(&self, params: &FullLineParams<'_, F>, out: &mut O) -> Result<()>
    where
        O: Write1D<F> + ?Sized,
    {
        let out = out.write_slice_mut()?;
        check_len("out", params.length, out.len())?;
        let offsets = params.table.offsets();
        for (i, o) in out.iter_mut().enumerate() {
            let center = params.center(i);
            let mut sum = F::zero();
            for &offset in offsets {
                sum += params.input[(center + offset) as usize];
            }
            *o = sum.scale(self.norm);
        }
        Ok(())
    }
}

/// Constructor config for [`UniformFilterKernel`].
#[derive(Debug, Clone)]
pub struct UniformFilterConfig {
    /// Footprint; weights are ignored.
    pub kernel: Kernel,
    /// Empty for the default, one entry to broadcast, or one per axis.
    pub boundary: Vec<BoundaryCondition>,
}

/// Uniform filter kernel.
#[derive(Debug, Clone)]
pub struct UniformFilterKernel {
    kernel: Kernel,
    boundary: Vec<BoundaryCondition>,
}

impl KernelLifecycle for UniformFilterKernel {
    type Config = UniformFilterConfig;

    fn try_new(config: Self::Config) -> Result<Self> {
        if config.kernel.is_empty() {
            return Err(Error::EmptyInput { arg: "kernel" });
        }
        Ok(Self {
            kernel: config.kernel,
            boundary: config.boundary,
        })
    }
}

impl ConvolveND for UniformFilterKernel {
    fn run<T: Sample>(&self, input: ArrayViewD<'_, T>) -> Result<ArrayD<T::Flex>> {
        let ndim = input.ndim();
        if ndim == 0 {
            return Err(Error::UnsupportedDimensionality { arg: "in", ndim });
        }
        let mut kernel = self.kernel.clone();
        kernel.expand_dimensionality(ndim)?;
        let boundary = BoundaryCondition::resolve(&self.boundary, ndim)?;
        log::debug!(
            "uniform filter of {} image {:?} over {} pixels",
            T::DATA_TYPE,
            input.shape(),
            kernel.len()
        );
        full(
            input,
            &kernel,
            &boundary,
            &UniformLineFilter::<T::Flex>::new(kernel.len()),
        )
    }
}

/// Mean of the samples of `input` covered by `kernel`, placed at the kernel origin.
///
/// Use [`Kernel::rectangular`] for a box filter.
pub fn uniform_filter(
    input: &Image,
    kernel: &Kernel,
    boundary: &[BoundaryCondition],
) -> Result<Image> {
    if !input.is_forged() {
        return Err(Error::NotAllocated { arg: "in" });
    }
    let filter = UniformFilterKernel::try_new(UniformFilterConfig {
        kernel: kernel.clone(),
        boundary: boundary.to_vec(),
    })?;
    filter.run_image(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use alloc::vec;
    use ndarray::{array, IxDyn};

    #[test]
    fn constant_image_is_unchanged() {
        let input = Image::from(ArrayD::from_elem(IxDyn(&[6, 5]), 7u8));
        for bc in [
            BoundaryCondition::SymmetricMirror,
            BoundaryCondition::Periodic,
            BoundaryCondition::ZeroOrderExtrapolate,
        ] {
            let out = uniform_filter(&input, &Kernel::rectangular(&[3, 5]), &[bc])
                .expect("uniform filter")
                .into_array::<f32>()
                .expect("flex type of u8");
            for &v in out.iter() {
                assert_relative_eq!(v, 7.0, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn box_mean_with_zero_border() {
        let input = Image::from(array![3.0f64, 6.0, 9.0, 12.0].into_dyn());
        let out = uniform_filter(
            &input,
            &Kernel::rectangular(&[3]),
            &[BoundaryCondition::AddZeros],
        )
        .expect("uniform filter")
        .into_array::<f64>()
        .expect("f64 output");
        assert_abs_diff_eq!(out, array![3.0, 6.0, 9.0, 7.0].into_dyn(), epsilon = 1e-12);
    }

    #[test]
    fn lower_dimensional_kernel_is_expanded() {
        let input = Image::from(array![[1.0f64, 2.0, 3.0], [10.0, 20.0, 30.0]].into_dyn());
        let out = uniform_filter(
            &input,
            &Kernel::rectangular(&[2]),
            &[BoundaryCondition::Periodic],
        )
        .expect("uniform filter")
        .into_array::<f64>()
        .expect("f64 output");
        // Origin 1 of the 2-pixel footprint: rows pair with the previous row.
        assert_abs_diff_eq!(
            out,
            array![[5.5, 11.0, 16.5], [5.5, 11.0, 16.5]].into_dyn(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn empty_footprint_is_rejected() {
        let input = Image::from(array![1.0f64].into_dyn());
        let mask = ArrayD::from_elem(IxDyn(&[3]), false);
        assert_eq!(
            uniform_filter(&input, &Kernel::from_mask(mask.view()), &[]).map(|_| ()),
            Err(Error::EmptyInput { arg: "kernel" })
        );
        assert_eq!(
            uniform_filter(&Image::new(), &Kernel::rectangular(&[3]), &[]).map(|_| ()),
            Err(Error::NotAllocated { arg: "in" })
        );
    }
}
