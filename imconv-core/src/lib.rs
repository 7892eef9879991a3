//! Core types shared by the `imconv` convolution engines.
//!
//! This crate holds the pieces every engine agrees on: the [`Error`] enum, the sample-type
//! machinery ([`DataType`], [`Sample`], [`FlexSample`]) and the runtime-typed [`Image`]
//! container that dispatches to generic code once per call.

#![no_std]
#![deny(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod error;
mod image;
mod sample;

pub use error::*;
pub use image::*;
pub use sample::*;

pub use ndarray;
pub use num_complex;
