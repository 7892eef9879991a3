use alloc::vec::Vec;

use imconv_core::{Error, Result, Sample};
use ndarray::{indices, ArrayD, ArrayViewD, Axis, IxDyn};

use super::separable::extend_array;
use crate::boundary::BoundaryCondition;
use crate::kernel::Write1D;
use crate::neighborhood::{row_major_strides, Kernel, PixelTable};

/// One image line handed to a [`FullLineFilter`].
///
/// `input` is the whole border-extended image flattened in row-major order. Output sample `i`
/// of the line is centered on `input[start + i * stride]`, and every offset in `table` is
/// relative to that position.
#[derive(Debug, Clone, Copy)]
pub struct FullLineParams<'a, F> {
    /// Flattened border-extended image.
    pub input: &'a [F],
    /// Position of the first sample of the line in `input`.
    pub start: usize,
    /// Distance between consecutive samples of the line in `input`.
    pub stride: isize,
    /// Number of samples on the line.
    pub length: usize,
    /// Kernel resolved against the strides of `input`.
    pub table: &'a PixelTable,
}

impl<F> FullLineParams<'_, F> {
    /// Position in `input` of the sample under output `i`.
    #[inline]
    pub fn center(&self, i: usize) -> isize {
        self.start as isize + i as isize * self.stride
    }
}

/// Per-line computation invoked by [`full`].
pub trait FullLineFilter<F>: Sync {
    /// Filter one line, writing exactly `params.length` samples into `out`.
    fn filter<O>(&self, params: &FullLineParams<'_, F>, out: &mut O) -> Result<()>
    where
        O: Write1D<F> + ?Sized;
}

/// Apply `line_filter` over the neighborhood `kernel` at every sample of `input`.
///
/// The kernel must already have the input's dimensionality. The input is converted to its flex
/// type and extended by the kernel's border along each axis; lines run along the last axis.
pub fn full<T, L>(
    input: ArrayViewD<'_, T>,
    kernel: &Kernel,
    boundary: &[BoundaryCondition],
    line_filter: &L,
) -> Result<ArrayD<T::Flex>>
where
    T: Sample,
    L: FullLineFilter<T::Flex>,
{
    let ndim = input.ndim();
    if ndim == 0 {
        return Err(Error::UnsupportedDimensionality { arg: "in", ndim });
    }
    if kernel.ndim() != ndim {
        return Err(Error::DimensionalityMismatch {
            arg: "kernel",
            expected: ndim,
            got: kernel.ndim(),
        });
    }
    if boundary.len() != ndim {
        return Err(Error::InvalidArrayLength {
            arg: "boundary_condition",
            got: boundary.len(),
            ndim,
        });
    }

    let border = kernel.border();
    let extended = extend_array(input.mapv(T::to_flex), &border, boundary);
    let strides = row_major_strides(extended.shape());
    let data: Vec<T::Flex> = extended.iter().copied().collect();
    let table = kernel.pixel_table(&strides);
    log::trace!(
        "full pass: {} kernel pixels, border {:?}, extended shape {:?}",
        table.len(),
        border,
        extended.shape()
    );

    let last = ndim - 1;
    let length = input.len_of(Axis(last));
    let mut output = ArrayD::zeros(input.raw_dim());
    let lines = indices(IxDyn(&input.shape()[..last]));
    for (index, mut dst) in lines.into_iter().zip(output.lanes_mut(Axis(last))) {
        let start = (0..last)
            .map(|axis| (index[axis] + border[axis]) * strides[axis] as usize)
            .sum::<usize>()
            + border[last];
        let params = FullLineParams {
            input: &data,
            start,
            stride: strides[last],
            length,
            table: &table,
        };
        line_filter.filter(&params, &mut dst)?;
    }
    Ok(output)
}
