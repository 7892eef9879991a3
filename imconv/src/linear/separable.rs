//! Separable convolution: one 1-D filter per axis, applied axis by axis.

use alloc::{vec, vec::Vec};

use imconv_core::{Error, FlexSample, Image, Result, Sample};
use ndarray::{ArrayD, ArrayViewD};

use super::filter::{FilterSymmetry, NormalizedFilter, OneDimensionalFilter};
use super::traits::ConvolveND;
use crate::boundary::BoundaryCondition;
use crate::framework::{separable, SeparableLineFilter, SeparableLineParams};
use crate::kernel::{check_len, KernelLifecycle, Write1D};

#[derive(Debug, Clone)]
struct AxisFilter<R> {
    coefficients: Vec<R>,
    origin: usize,
    symmetry: FilterSymmetry,
}

/// Line filter applying one normalized 1-D filter per axis.
///
/// Coefficients are converted once to the real component type of `F`.
#[derive(Debug, Clone)]
pub struct SeparableConvolutionLineFilter<F: FlexSample> {
    axes: Vec<AxisFilter<F::Real>>,
}

impl<F: FlexSample> SeparableConvolutionLineFilter<F> {
    /// Build from one normalized filter per axis.
    pub fn new(filters: &[NormalizedFilter<'_>]) -> Self {
        let axes = filters
            .iter()
            .map(|f| AxisFilter {
                coefficients: f.coefficients().iter().map(|&c| F::coefficient(c)).collect(),
                origin: f.origin(),
                symmetry: f.symmetry(),
            })
            .collect();
        Self { axes }
    }
}

impl<F: FlexSample> SeparableLineFilter<F> for SeparableConvolutionLineFilter<F> {
    fn filter<O>(&self, params: &SeparableLineParams<'_, F>, out: &mut O) -> Result<()>
    where
        O: Write1D<F> + ?Sized,
    {
        let out = out.write_slice_mut()?;
        check_len("out", params.length(), out.len())?;
        let axis = &self.axes[params.axis];
        let c = axis.coefficients.as_slice();
        let input = params.input;
        // Position of output sample 0 in the extended line, shifted by the origin.
        let base = params.border + axis.origin;
        match axis.symmetry {
            FilterSymmetry::General => {
                for (i, o) in out.iter_mut().enumerate() {
                    let mut sum = F::zero();
                    for (j, &cj) in c.iter().enumerate() {
                        sum += input[base + i - j].scale(cj);
                    }
                    *o = sum;
                }
            }
            FilterSymmetry::Even | FilterSymmetry::Odd => {
                let last = c.len() - 1;
                let odd = axis.symmetry == FilterSymmetry::Odd;
                for (i, o) in out.iter_mut().enumerate() {
                    let m = base + i - last;
                    let mut sum = input[m].scale(c[last]);
                    for k in 1..=last {
                        let pair = if odd {
                            input[m + k] - input[m - k]
                        } else {
                            input[m + k] + input[m - k]
                        };
                        sum += pair.scale(c[last - k]);
                    }
                    *o = sum;
                }
            }
            FilterSymmetry::DEven | FilterSymmetry::DOdd => {
                let len = c.len();
                let odd = axis.symmetry == FilterSymmetry::DOdd;
                for (i, o) in out.iter_mut().enumerate() {
                    let r = base + i - (len - 1);
                    let l = r - 1;
                    let mut sum = F::zero();
                    for k in 0..len {
                        let pair = if odd {
                            input[r + k] - input[l - k]
                        } else {
                            input[r + k] + input[l - k]
                        };
                        sum += pair.scale(c[len - 1 - k]);
                    }
                    *o = sum;
                }
            }
        }
        Ok(())
    }
}

/// Constructor config for [`SeparableConvolutionKernel`].
#[derive(Debug, Clone, Default)]
pub struct SeparableConvolutionConfig {
    /// One filter for all axes, or one per axis.
    pub filters: Vec<OneDimensionalFilter>,
    /// Empty for the default, one entry to broadcast, or one per axis.
    pub boundary: Vec<BoundaryCondition>,
    /// Empty to process every axis, or one flag per axis.
    pub process: Vec<bool>,
}

/// Separable convolution kernel.
#[derive(Debug, Clone)]
pub struct SeparableConvolutionKernel {
    filters: Vec<OneDimensionalFilter>,
    boundary: Vec<BoundaryCondition>,
    process: Vec<bool>,
}

/// Per-call resolution of the kernel against an image shape.
struct SeparablePlan<'a> {
    filters: Vec<NormalizedFilter<'a>>,
    process: Vec<bool>,
    border: Vec<usize>,
    boundary: Vec<BoundaryCondition>,
}

impl KernelLifecycle for SeparableConvolutionKernel {
    type Config = SeparableConvolutionConfig;

    fn try_new(config: Self::Config) -> Result<Self> {
        if config.filters.is_empty() {
            return Err(Error::EmptyInput { arg: "filter" });
        }
        for filter in &config.filters {
            filter.normalize()?;
        }
        Ok(Self {
            filters: config.filters,
            boundary: config.boundary,
            process: config.process,
        })
    }
}

impl SeparableConvolutionKernel {
    fn plan(&self, shape: &[usize]) -> Result<SeparablePlan<'_>> {
        let ndim = shape.len();
        if ndim == 0 {
            return Err(Error::UnsupportedDimensionality { arg: "in", ndim });
        }
        let single = self.filters.len() == 1;
        if !single && self.filters.len() != ndim {
            return Err(Error::InvalidArrayLength {
                arg: "filter",
                got: self.filters.len(),
                ndim,
            });
        }
        let normalized = self
            .filters
            .iter()
            .map(OneDimensionalFilter::normalize)
            .collect::<Result<Vec<_>>>()?;
        let filters: Vec<NormalizedFilter<'_>> = if single {
            vec![normalized[0]; ndim]
        } else {
            normalized
        };

        let mut process = match self.process.len() {
            0 => vec![true; ndim],
            n if n == ndim => self.process.clone(),
            n => {
                return Err(Error::InvalidArrayLength {
                    arg: "process",
                    got: n,
                    ndim,
                })
            }
        };
        for (axis, flag) in process.iter_mut().enumerate() {
            let skip = filters[axis].is_meaningless() || (!single && shape[axis] <= 1);
            if skip {
                *flag = false;
            }
        }
        let boundary = BoundaryCondition::resolve(&self.boundary, ndim)?;
        let border = filters.iter().map(NormalizedFilter::border).collect();
        Ok(SeparablePlan {
            filters,
            process,
            border,
            boundary,
        })
    }
}

impl ConvolveND for SeparableConvolutionKernel {
    fn run<T: Sample>(&self, input: ArrayViewD<'_, T>) -> Result<ArrayD<T::Flex>> {
        let plan = self.plan(input.shape())?;
        log::debug!(
            "separable convolution of {} image {:?}: process {:?}, border {:?}",
            T::DATA_TYPE,
            input.shape(),
            plan.process,
            plan.border
        );
        let line_filter = SeparableConvolutionLineFilter::<T::Flex>::new(&plan.filters);
        separable(
            input,
            &plan.process,
            &plan.border,
            &plan.boundary,
            &line_filter,
        )
    }
}

/// Convolve `input` with one 1-D filter per axis.
///
/// `filters` holds a single filter applied along every axis or one filter per axis. `boundary`
/// follows [`BoundaryCondition::resolve`]. `process` is empty to filter along every axis, or one
/// flag per axis. Axes whose filter leaves the data unchanged are skipped, as are singleton axes
/// when one filter per axis is given. The output has the flex type of the input.
pub fn separable_convolution(
    input: &Image,
    filters: &[OneDimensionalFilter],
    boundary: &[BoundaryCondition],
    process: &[bool],
) -> Result<Image> {
    let ndim = input.shape().ok_or(Error::NotAllocated { arg: "in" })?.len();
    if ndim == 0 {
        return Err(Error::UnsupportedDimensionality { arg: "in", ndim });
    }
    if filters.len() != 1 && filters.len() != ndim {
        return Err(Error::InvalidArrayLength {
            arg: "filter",
            got: filters.len(),
            ndim,
        });
    }
    let kernel = SeparableConvolutionKernel::try_new(SeparableConvolutionConfig {
        filters: filters.to_vec(),
        boundary: boundary.to_vec(),
        process: process.to_vec(),
    })?;
    kernel.run_image(input)
}
