//! Linear filtering engines.
//!
//! Three alternative strategies compute the same convolution: [`separable_convolution`] with one
//! 1-D filter per axis, [`general_convolution`] with an arbitrary N-D kernel, and
//! [`convolve_ft`] through the Fourier domain (feature `std`).

mod filter;
#[cfg(feature = "std")]
mod fourier;
mod general;
mod separable;
mod traits;
mod uniform;

pub use filter::*;
#[cfg(feature = "std")]
pub use fourier::*;
pub use general::*;
pub use separable::*;
pub use traits::*;
pub use uniform::*;
