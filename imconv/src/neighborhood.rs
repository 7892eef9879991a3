//! Neighborhood kernels and their stride-resolved pixel tables.

use alloc::{vec, vec::Vec};

use imconv_core::{Error, Image, Result, Sample, SampleVisitor};
use itertools::{Itertools, MinMaxResult};
use ndarray::{ArrayViewD, IxDyn};

/// An N-D neighborhood: relative offsets paired with real weights.
///
/// Offsets are relative to the kernel origin, which sits at `size / 2` along every axis of the
/// array the kernel was built from. Pixels are kept in row-major order of that array.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    ndim: usize,
    offsets: Vec<Vec<isize>>,
    weights: Vec<f64>,
    binary: bool,
}

impl Kernel {
    fn from_indexed<I>(shape: &[usize], pixels: I, binary: bool) -> Self
    where
        I: IntoIterator<Item = (IxDyn, f64)>,
    {
        let origin: Vec<isize> = shape.iter().map(|&n| (n / 2) as isize).collect();
        let (offsets, weights) = pixels
            .into_iter()
            .filter(|&(_, w)| w != 0.0)
            .map(|(index, w)| {
                let offset = origin
                    .iter()
                    .enumerate()
                    .map(|(axis, &o)| index[axis] as isize - o)
                    .collect::<Vec<_>>();
                (offset, w)
            })
            .unzip();
        Self {
            ndim: shape.len(),
            offsets,
            weights,
            binary,
        }
    }

    /// Kernel from a weight array; zero weights are dropped.
    pub fn from_weights(weights: ArrayViewD<'_, f64>) -> Self {
        Self::from_indexed(
            weights.shape(),
            weights.indexed_iter().map(|(index, &w)| (index, w)),
            false,
        )
    }

    /// Binary kernel: every set pixel of `mask` with weight 1.
    pub fn from_mask(mask: ArrayViewD<'_, bool>) -> Self {
        Self::from_indexed(
            mask.shape(),
            mask.indexed_iter()
                .map(|(index, &set)| (index, if set { 1.0 } else { 0.0 })),
            true,
        )
    }

    /// Binary kernel covering a full rectangle of the given sizes.
    pub fn rectangular(sizes: &[usize]) -> Self {
        let mask = ndarray::ArrayD::from_elem(IxDyn(sizes), true);
        Self::from_mask(mask.view())
    }

    /// Kernel from a real or binary image.
    ///
    /// Complex images fail with [`Error::DataTypeNotSupported`].
    pub fn try_from_image(image: &Image) -> Result<Self> {
        image.visit("kernel", KernelFromImage)?
    }

    /// Number of pixels with a non-zero weight.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True when no pixel has a non-zero weight.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Dimensionality of the offsets.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// True for kernels built from a binary mask.
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Relative offset of each pixel.
    pub fn offsets(&self) -> &[Vec<isize>] {
        &self.offsets
    }

    /// Weight of each pixel.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Negate every offset, turning a correlation kernel into a convolution kernel.
    pub fn mirror(&mut self) {
        self.offsets
            .iter_mut()
            .flatten()
            .for_each(|offset| *offset = -*offset);
    }

    /// Largest distance reached from the origin along each axis.
    pub fn border(&self) -> Vec<usize> {
        (0..self.ndim)
            .map(|axis| match self.offsets.iter().map(|o| o[axis]).minmax() {
                MinMaxResult::NoElements => 0,
                MinMaxResult::OneElement(o) => o.unsigned_abs(),
                MinMaxResult::MinMax(lo, hi) => lo.unsigned_abs().max(hi.unsigned_abs()),
            })
            .collect()
    }

    /// Append singleton axes until the kernel has `ndim` axes.
    pub fn expand_dimensionality(&mut self, ndim: usize) -> Result<()> {
        if self.ndim > ndim {
            return Err(Error::DimensionalityMismatch {
                arg: "kernel",
                expected: ndim,
                got: self.ndim,
            });
        }
        for offset in &mut self.offsets {
            offset.resize(ndim, 0);
        }
        self.ndim = ndim;
        Ok(())
    }

    /// Resolve the offsets against the strides of a flattened array.
    pub fn pixel_table(&self, strides: &[isize]) -> PixelTable {
        let offsets = self
            .offsets
            .iter()
            .map(|offset| offset.iter().zip(strides).map(|(&o, &s)| o * s).sum())
            .collect();
        PixelTable {
            offsets,
            weights: self.weights.clone(),
        }
    }
}

struct KernelFromImage;

impl SampleVisitor for KernelFromImage {
    type Output = Result<Kernel>;

    fn visit<T: Sample>(self, pixels: ArrayViewD<'_, T>) -> Result<Kernel> {
        if T::DATA_TYPE.is_complex() {
            return Err(Error::DataTypeNotSupported {
                arg: "kernel",
                data_type: T::DATA_TYPE,
            });
        }
        let weights = pixels
            .indexed_iter()
            .map(|(index, v)| (index, v.real_value().unwrap_or(0.0)));
        Ok(Kernel::from_indexed(
            pixels.shape(),
            weights,
            T::DATA_TYPE.is_binary(),
        ))
    }
}

/// Kernel offsets resolved to linear offsets into a flattened array.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelTable {
    offsets: Vec<isize>,
    weights: Vec<f64>,
}

impl PixelTable {
    /// Linear offset of each pixel.
    pub fn offsets(&self) -> &[isize] {
        &self.offsets
    }

    /// Weight of each pixel.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True for a table without pixels.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// `(offset, weight)` pairs in kernel order.
    pub fn iter(&self) -> impl Iterator<Item = (isize, f64)> + '_ {
        self.offsets.iter().copied().zip(self.weights.iter().copied())
    }
}

/// Row-major strides of an array with the given shape.
pub(crate) fn row_major_strides(shape: &[usize]) -> Vec<isize> {
    let mut strides = vec![1isize; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1] as isize;
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, ArrayD};
    use num_complex::Complex;

    #[test]
    fn zero_weights_are_dropped() {
        let w = array![[0.0, 1.0, 0.0], [2.0, 0.0, 3.0]].into_dyn();
        let k = Kernel::from_weights(w.view());
        assert_eq!(k.len(), 3);
        assert_eq!(k.offsets(), &[vec![-1, 0], vec![0, -1], vec![0, 1]]);
        assert_eq!(k.weights(), &[1.0, 2.0, 3.0]);
        assert!(!k.is_binary());
        assert_eq!(k.border(), vec![1, 1]);
    }

    #[test]
    fn mirror_negates_offsets() {
        let w = array![1.0, 2.0, 3.0, 4.0].into_dyn();
        let mut k = Kernel::from_weights(w.view());
        assert_eq!(k.border(), vec![2]);
        k.mirror();
        assert_eq!(k.offsets(), &[vec![2], vec![1], vec![0], vec![-1]]);
        assert_eq!(k.border(), vec![2]);
    }

    #[test]
    fn rectangle_is_binary() {
        let k = Kernel::rectangular(&[3, 1]);
        assert!(k.is_binary());
        assert_eq!(k.len(), 3);
        assert_eq!(k.border(), vec![1, 0]);
    }

    #[test]
    fn expand_adds_singleton_axes() {
        let mut k = Kernel::rectangular(&[3]);
        k.expand_dimensionality(3).expect("more axes are fine");
        assert_eq!(k.ndim(), 3);
        assert_eq!(k.offsets()[0], vec![-1, 0, 0]);
        assert_eq!(
            k.expand_dimensionality(2),
            Err(Error::DimensionalityMismatch {
                arg: "kernel",
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn kernel_from_image_types() {
        let mask = Image::from(array![true, false, true].into_dyn());
        let k = Kernel::try_from_image(&mask).expect("binary kernel");
        assert!(k.is_binary());
        assert_eq!(k.offsets(), &[vec![-1], vec![1]]);

        let ints = Image::from(array![0u8, 5, 0].into_dyn());
        let k = Kernel::try_from_image(&ints).expect("integer kernel");
        assert_eq!((k.len(), k.weights()[0]), (1, 5.0));

        let complex = Image::from(ArrayD::from_elem(IxDyn(&[2]), Complex::new(1.0f64, 0.0)));
        assert!(matches!(
            Kernel::try_from_image(&complex),
            Err(Error::DataTypeNotSupported { arg: "kernel", .. })
        ));
        assert_eq!(
            Kernel::try_from_image(&Image::new()),
            Err(Error::NotAllocated { arg: "kernel" })
        );
    }

    #[test]
    fn pixel_table_uses_strides() {
        let k = Kernel::rectangular(&[3, 3]);
        let strides = row_major_strides(&[5, 7]);
        assert_eq!(strides, vec![7, 1]);
        let table = k.pixel_table(&strides);
        assert_eq!(table.offsets(), &[-8, -7, -6, -1, 0, 1, 6, 7, 8]);
        assert!(table.iter().all(|(_, w)| w == 1.0));
    }
}
