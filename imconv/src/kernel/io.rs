use imconv_core::{Error, Result};
use ndarray::ArrayViewMut1;

/// Adapter trait for the contiguous 1D output a line filter writes into.
///
/// The separable driver hands line filters a scratch slice; the full driver hands them the
/// output lane itself.
pub trait Write1D<T> {
    /// Borrow the underlying output as a mutable contiguous slice.
    fn write_slice_mut(&mut self) -> Result<&mut [T]>;
}

impl<T> Write1D<T> for [T] {
    fn write_slice_mut(&mut self) -> Result<&mut [T]> {
        Ok(self)
    }
}

impl<T> Write1D<T> for ArrayViewMut1<'_, T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T]> {
        self.as_slice_mut()
            .ok_or(Error::NonContiguous { arg: "out" })
    }
}

/// Check that an output buffer has the length a line filter will write.
pub(crate) fn check_len(arg: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::LengthMismatch { arg, expected, got });
    }
    Ok(())
}
