//! Shared kernel substrate.
//!
//! Constructor validation for the convolution kernels and the contiguous 1D output adapter the
//! line filters write into.

mod io;
mod lifecycle;

pub(crate) use io::check_len;
pub use io::*;
pub use lifecycle::*;
