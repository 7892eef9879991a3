use imconv_core::Result;

/// Constructor validation lifecycle shared by the convolution kernels.
///
/// Everything that can be checked without seeing the image is checked here, so a constructed
/// kernel only fails at run time on image-dependent preconditions.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self>;
}

#[cfg(test)]
mod tests {
    use super::KernelLifecycle;
    use crate::linear::{
        FilterSymmetry, OneDimensionalFilter, SeparableConvolutionConfig,
        SeparableConvolutionKernel, UniformFilterConfig, UniformFilterKernel,
    };
    use crate::neighborhood::Kernel;
    use alloc::vec;
    use imconv_core::Error;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn separable_kernel_validates_filters_up_front() {
        let smooth = OneDimensionalFilter::new(vec![0.25, 0.5]).with_symmetry(FilterSymmetry::Even);
        assert!(SeparableConvolutionKernel::try_new(SeparableConvolutionConfig {
            filters: vec![smooth.clone()],
            ..Default::default()
        })
        .is_ok());

        let err = SeparableConvolutionKernel::try_new(SeparableConvolutionConfig::default())
            .expect_err("no filters");
        assert_eq!(err, Error::EmptyInput { arg: "filter" });

        let err = SeparableConvolutionKernel::try_new(SeparableConvolutionConfig {
            filters: vec![smooth.clone(), smooth.with_origin(3)],
            ..Default::default()
        })
        .expect_err("origin past the expanded filter");
        assert_eq!(err, Error::OriginOutOfRange { origin: 3, size: 3 });
    }

    #[test]
    fn uniform_kernel_rejects_an_empty_footprint() {
        let mask = ArrayD::from_elem(IxDyn(&[3, 3]), false);
        let err = UniformFilterKernel::try_new(UniformFilterConfig {
            kernel: Kernel::from_mask(mask.view()),
            boundary: vec![],
        })
        .expect_err("empty footprint");
        assert_eq!(err, Error::EmptyInput { arg: "kernel" });
    }
}
