use alloc::{string::String, vec::Vec};
use core::{error, fmt};

use crate::DataType;

/// Convenience alias used throughout `imconv`.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised whilst validating or running a convolution.
///
/// Every variant is detected before any numeric work starts, so a failed call never leaves a
/// partially written output behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An image argument has no backing storage.
    NotAllocated {
        /// Name of the unallocated argument.
        arg: &'static str,
    },
    /// The image dimensionality is not supported by the operation.
    UnsupportedDimensionality {
        /// Name of the argument.
        arg: &'static str,
        /// Dimensionality that was received.
        ndim: usize,
    },
    /// A per-axis parameter array has a length that does not fit the dimensionality.
    InvalidArrayLength {
        /// Name of the array argument.
        arg: &'static str,
        /// Length that was received.
        got: usize,
        /// Dimensionality of the image it applies to.
        ndim: usize,
    },
    /// The filter symmetry tag was not recognized.
    InvalidSymmetry {
        /// The tag as given by the caller.
        tag: String,
    },
    /// An explicit filter origin lies outside the expanded filter.
    OriginOutOfRange {
        /// The requested origin.
        origin: usize,
        /// Size of the expanded filter.
        size: usize,
    },
    /// Array sizes are incompatible.
    SizeMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Sizes the argument must fit into.
        expected: Vec<usize>,
        /// Sizes that were received.
        got: Vec<usize>,
    },
    /// Two arrays must share their dimensionality.
    DimensionalityMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Dimensionality required.
        expected: usize,
        /// Dimensionality received.
        got: usize,
    },
    /// The sample type of an argument is not accepted by the operation.
    DataTypeNotSupported {
        /// Name of the argument.
        arg: &'static str,
        /// Offending sample type.
        data_type: DataType,
    },
    /// The boundary condition string was not recognized.
    InvalidBoundaryCondition {
        /// The name as given by the caller.
        name: String,
    },
    /// The frequency representation string was not recognized.
    InvalidRepresentation {
        /// The name as given by the caller.
        name: String,
    },
    /// A required input is empty.
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
    /// Output/input buffer lengths did not match.
    LengthMismatch {
        /// Name of the buffer.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotAllocated { arg } => write!(f, "Image `{arg}` is not allocated."),
            Error::UnsupportedDimensionality { arg, ndim } => {
                write!(f, "Dimensionality {ndim} of `{arg}` is not supported.")
            }
            Error::InvalidArrayLength { arg, got, ndim } => write!(
                f,
                "Array `{arg}` has length {got}, which does not fit dimensionality {ndim}."
            ),
            Error::InvalidSymmetry { tag } => {
                write!(f, "Symmetry string not recognized: `{tag}`.")
            }
            Error::OriginOutOfRange { origin, size } => {
                write!(f, "Origin {origin} outside of filter of size {size}.")
            }
            Error::SizeMismatch { arg, expected, got } => write!(
                f,
                "Sizes of `{arg}` do not fit. Expected at most {expected:?}, got {got:?}."
            ),
            Error::DimensionalityMismatch { arg, expected, got } => write!(
                f,
                "Dimensionality of `{arg}` does not match. Expected {expected}, got {got}."
            ),
            Error::DataTypeNotSupported { arg, data_type } => {
                write!(f, "Data type {data_type} of `{arg}` is not supported.")
            }
            Error::InvalidBoundaryCondition { name } => {
                write!(f, "Boundary condition not recognized: `{name}`.")
            }
            Error::InvalidRepresentation { name } => {
                write!(f, "Representation not recognized: `{name}`.")
            }
            Error::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
            Error::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
            Error::LengthMismatch { arg, expected, got } => write!(
                f,
                "Length mismatch on `{arg}`. Expected {expected}, got {got}."
            ),
        }
    }
}

impl error::Error for Error {}
