//! Trait interfaces for the convolution engines.
//!
//! These traits define the trait-first API shape shared by the convolution kernels.

use imconv_core::{Image, Result, Sample, SampleVisitor};
use ndarray::{ArrayD, ArrayViewD};

/// N-D spatial filtering capability.
pub trait ConvolveND {
    /// Filter a typed array; the output has the flex type of the input.
    fn run<T: Sample>(&self, input: ArrayViewD<'_, T>) -> Result<ArrayD<T::Flex>>;

    /// Filter an image of any sample type.
    fn run_image(&self, input: &Image) -> Result<Image>
    where
        Self: Sized,
    {
        input.visit("in", RunOnImage(self))?
    }
}

/// Frequency-domain filtering capability.
///
/// Inputs may arrive in either representation, so there is no typed counterpart.
pub trait FourierConvolveND {
    /// Filter an image of any sample type.
    fn run_image(&self, input: &Image) -> Result<Image>;
}

struct RunOnImage<'a, K>(&'a K);

impl<K: ConvolveND> SampleVisitor for RunOnImage<'_, K> {
    type Output = Result<Image>;

    fn visit<T: Sample>(self, pixels: ArrayViewD<'_, T>) -> Result<Image> {
        self.0.run(pixels).map(Image::from_array)
    }
}
