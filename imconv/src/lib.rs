//! N-dimensional convolution for [`ndarray`] images.
//!
//! ```
//! use imconv::{separable_convolution, BoundaryCondition, FilterSymmetry, Image, OneDimensionalFilter};
//! use ndarray::{ArrayD, IxDyn};
//!
//! let image = Image::from(ArrayD::from_elem(IxDyn(&[16, 16]), 100u8));
//! let smooth = OneDimensionalFilter::new(vec![0.25, 0.5]).with_symmetry(FilterSymmetry::Even);
//! let out = separable_convolution(&image, &[smooth], &[BoundaryCondition::Periodic], &[]).unwrap();
//! let out = out.into_array::<f32>().unwrap();
//! assert!(out.iter().all(|&v| (v - 100.0).abs() < 1e-3));
//! ```
#![no_std]
#![deny(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod boundary;
pub mod framework;
pub mod kernel;
pub mod linear;
pub mod neighborhood;

pub use boundary::BoundaryCondition;
pub use imconv_core::{DataType, Error, FlexSample, Image, Pixels, Result, Sample, SampleVisitor};
pub use linear::*;
pub use neighborhood::{Kernel, PixelTable};
