//! Traversal drivers.
//!
//! A driver walks every line of an N-D image, prepares a border-extended input buffer and
//! hands it to a line filter. Line filters only describe the per-line computation; they hold
//! read-only data and are `Sync`, so the drivers are free to invoke them for disjoint lines in
//! any order.

mod full;
mod separable;

pub use full::*;
pub use separable::*;
