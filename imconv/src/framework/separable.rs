use alloc::{vec, vec::Vec};

use imconv_core::{Error, FlexSample, Result, Sample};
use ndarray::{ArrayD, ArrayView1, ArrayViewD, Axis, Zip};
use num_traits::Zero;

use crate::boundary::BoundaryCondition;
use crate::kernel::Write1D;

/// One border-extended input line handed to a [`SeparableLineFilter`].
#[derive(Debug, Clone, Copy)]
pub struct SeparableLineParams<'a, F> {
    /// Extended line: `input[border + i]` is sample `i` of the image line.
    pub input: &'a [F],
    /// Number of extended samples on either side.
    pub border: usize,
    /// Axis the line runs along.
    pub axis: usize,
}

impl<F> SeparableLineParams<'_, F> {
    /// Number of image samples on the line.
    pub fn length(&self) -> usize {
        self.input.len().saturating_sub(2 * self.border)
    }
}

/// Per-line computation invoked by [`separable`].
pub trait SeparableLineFilter<F>: Sync {
    /// Filter one line, writing exactly `params.length()` samples into `out`.
    fn filter<O>(&self, params: &SeparableLineParams<'_, F>, out: &mut O) -> Result<()>
    where
        O: Write1D<F> + ?Sized;
}

/// Apply `line_filter` along every axis whose `process` flag is set.
///
/// The input is converted to its flex type first. Axes are visited in increasing order and
/// each pass reads the output of the previous one. `process`, `border` and `boundary` hold one
/// entry per axis.
pub fn separable<T, L>(
    input: ArrayViewD<'_, T>,
    process: &[bool],
    border: &[usize],
    boundary: &[BoundaryCondition],
    line_filter: &L,
) -> Result<ArrayD<T::Flex>>
where
    T: Sample,
    L: SeparableLineFilter<T::Flex>,
{
    let ndim = input.ndim();
    for (arg, got) in [
        ("process", process.len()),
        ("border", border.len()),
        ("boundary_condition", boundary.len()),
    ] {
        if got != ndim {
            return Err(Error::InvalidArrayLength { arg, got, ndim });
        }
    }

    let mut current = input.mapv(T::to_flex);
    let mut line = Vec::new();
    for axis in (0..ndim).filter(|&axis| process[axis]) {
        let length = current.len_of(Axis(axis));
        let mut out_line = vec![<T::Flex as Zero>::zero(); length];
        let mut output = ArrayD::zeros(current.raw_dim());
        let mut status = Ok(());
        Zip::from(current.lanes(Axis(axis)))
            .and(output.lanes_mut(Axis(axis)))
            .for_each(|src, mut dst| {
                if status.is_err() {
                    return;
                }
                boundary[axis].extend_line(src, border[axis], &mut line);
                let params = SeparableLineParams {
                    input: &line,
                    border: border[axis],
                    axis,
                };
                status = line_filter.filter(&params, out_line.as_mut_slice());
                dst.assign(&ArrayView1::from(out_line.as_slice()));
            });
        status?;
        log::trace!(
            "separable pass along axis {axis}: length {length}, border {}",
            border[axis]
        );
        current = output;
    }
    Ok(current)
}

/// Extend `array` by `border[axis]` samples on both sides of every axis.
pub(crate) fn extend_array<F: FlexSample>(
    mut array: ArrayD<F>,
    border: &[usize],
    boundary: &[BoundaryCondition],
) -> ArrayD<F> {
    let mut line = Vec::new();
    for axis in 0..array.ndim() {
        let b = border[axis];
        if b == 0 {
            continue;
        }
        let mut shape = array.shape().to_vec();
        shape[axis] += 2 * b;
        let mut extended = ArrayD::zeros(shape);
        Zip::from(array.lanes(Axis(axis)))
            .and(extended.lanes_mut(Axis(axis)))
            .for_each(|src, mut dst| {
                boundary[axis].extend_line(src, b, &mut line);
                dst.assign(&ArrayView1::from(line.as_slice()));
            });
        array = extended;
    }
    array
}
