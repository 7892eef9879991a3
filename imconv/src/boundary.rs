//! Boundary conditions: how samples outside the image are synthesized.

use alloc::{string::ToString, vec, vec::Vec};
use core::str::FromStr;

use imconv_core::{Error, FlexSample, Result};
use ndarray::ArrayView1;

/// Policy for synthesizing samples beyond the edge of an axis.
///
/// Diagrams show the line `a b c d` with its extension on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundaryCondition {
    /// `c b a | a b c d | d c b`
    #[default]
    SymmetricMirror,
    /// `-c -b -a | a b c d | -d -c -b`
    AsymmetricMirror,
    /// `b c d | a b c d | a b c`
    Periodic,
    /// `-b -c -d | a b c d | -a -b -c`
    AsymmetricPeriodic,
    /// `0 0 0 | a b c d | 0 0 0`
    AddZeros,
    /// `a a a | a b c d | d d d`
    ZeroOrderExtrapolate,
}

/// Where an out-of-range index reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Sample { index: usize, negate: bool },
    Zero,
}

impl BoundaryCondition {
    /// Resolve a per-axis boundary array against a dimensionality.
    ///
    /// An empty array selects the default for every axis and a single entry is broadcast; any
    /// other length must equal `ndim`.
    pub fn resolve(boundary: &[BoundaryCondition], ndim: usize) -> Result<Vec<BoundaryCondition>> {
        match boundary.len() {
            0 => Ok(vec![BoundaryCondition::default(); ndim]),
            1 => Ok(vec![boundary[0]; ndim]),
            n if n == ndim => Ok(boundary.to_vec()),
            n => Err(Error::InvalidArrayLength {
                arg: "boundary_condition",
                got: n,
                ndim,
            }),
        }
    }

    /// Parse a list of boundary condition names.
    pub fn parse_array<S: AsRef<str>>(names: &[S]) -> Result<Vec<BoundaryCondition>> {
        names.iter().map(|name| name.as_ref().parse()).collect()
    }

    fn source(self, index: isize, len: usize) -> Source {
        let n = len as isize;
        if (0..n).contains(&index) {
            return Source::Sample {
                index: index as usize,
                negate: false,
            };
        }
        match self {
            BoundaryCondition::SymmetricMirror | BoundaryCondition::AsymmetricMirror => {
                let m = index.rem_euclid(2 * n);
                let reflected = m >= n;
                let index = if reflected { 2 * n - 1 - m } else { m };
                Source::Sample {
                    index: index as usize,
                    negate: reflected && self == BoundaryCondition::AsymmetricMirror,
                }
            }
            BoundaryCondition::Periodic => Source::Sample {
                index: index.rem_euclid(n) as usize,
                negate: false,
            },
            BoundaryCondition::AsymmetricPeriodic => Source::Sample {
                index: index.rem_euclid(n) as usize,
                negate: index.div_euclid(n) % 2 != 0,
            },
            BoundaryCondition::AddZeros => Source::Zero,
            BoundaryCondition::ZeroOrderExtrapolate => Source::Sample {
                index: index.clamp(0, n - 1) as usize,
                negate: false,
            },
        }
    }

    /// Fill `buffer` with `line` extended by `border` samples on either side.
    ///
    /// On return `buffer.len() == line.len() + 2 * border` and `buffer[border + i] == line[i]`.
    /// An empty line extends to zeros.
    pub fn extend_line<F: FlexSample>(
        self,
        line: ArrayView1<'_, F>,
        border: usize,
        buffer: &mut Vec<F>,
    ) {
        let len = line.len();
        buffer.clear();
        buffer.reserve(len + 2 * border);
        if len == 0 {
            buffer.resize(2 * border, F::zero());
            return;
        }
        let b = border as isize;
        for k in -b..(len as isize + b) {
            let value = match self.source(k, len) {
                Source::Sample { index, negate } => {
                    if negate {
                        -line[index]
                    } else {
                        line[index]
                    }
                }
                Source::Zero => F::zero(),
            };
            buffer.push(value);
        }
    }
}

impl FromStr for BoundaryCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "default" | "symmetric mirror" => Ok(BoundaryCondition::SymmetricMirror),
            "asymmetric mirror" => Ok(BoundaryCondition::AsymmetricMirror),
            "periodic" => Ok(BoundaryCondition::Periodic),
            "asym periodic" | "asymmetric periodic" => Ok(BoundaryCondition::AsymmetricPeriodic),
            "add zeros" => Ok(BoundaryCondition::AddZeros),
            "zero order" => Ok(BoundaryCondition::ZeroOrderExtrapolate),
            other => Err(Error::InvalidBoundaryCondition {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn extend(bc: BoundaryCondition, border: usize) -> Vec<f64> {
        let line = array![1.0, 2.0, 3.0, 4.0];
        let mut buffer = Vec::new();
        bc.extend_line(line.view(), border, &mut buffer);
        buffer
    }

    #[test]
    fn extension_per_policy() {
        assert_eq!(
            extend(BoundaryCondition::SymmetricMirror, 3),
            vec![3., 2., 1., 1., 2., 3., 4., 4., 3., 2.]
        );
        assert_eq!(
            extend(BoundaryCondition::AsymmetricMirror, 2),
            vec![-2., -1., 1., 2., 3., 4., -4., -3.]
        );
        assert_eq!(
            extend(BoundaryCondition::Periodic, 3),
            vec![2., 3., 4., 1., 2., 3., 4., 1., 2., 3.]
        );
        assert_eq!(
            extend(BoundaryCondition::AsymmetricPeriodic, 2),
            vec![-3., -4., 1., 2., 3., 4., -1., -2.]
        );
        assert_eq!(
            extend(BoundaryCondition::AddZeros, 2),
            vec![0., 0., 1., 2., 3., 4., 0., 0.]
        );
        assert_eq!(
            extend(BoundaryCondition::ZeroOrderExtrapolate, 2),
            vec![1., 1., 1., 2., 3., 4., 4., 4.]
        );
    }

    #[test]
    fn border_wider_than_line_wraps_repeatedly() {
        let line = array![1.0, 2.0];
        let mut buffer = Vec::new();
        BoundaryCondition::Periodic.extend_line(line.view(), 5, &mut buffer);
        assert_eq!(buffer, vec![2., 1., 2., 1., 2., 1., 2., 1., 2., 1., 2., 1.]);

        BoundaryCondition::SymmetricMirror.extend_line(line.view(), 3, &mut buffer);
        assert_eq!(buffer, vec![2., 2., 1., 1., 2., 2., 1., 1.]);
    }

    #[test]
    fn zero_border_copies_line() {
        assert_eq!(extend(BoundaryCondition::Periodic, 0), vec![1., 2., 3., 4.]);
    }

    #[test]
    fn parse_names() {
        assert_eq!(
            "periodic".parse::<BoundaryCondition>(),
            Ok(BoundaryCondition::Periodic)
        );
        assert_eq!(
            "".parse::<BoundaryCondition>(),
            Ok(BoundaryCondition::SymmetricMirror)
        );
        assert_eq!(
            BoundaryCondition::parse_array(&["add zeros", "zero order"]),
            Ok(vec![
                BoundaryCondition::AddZeros,
                BoundaryCondition::ZeroOrderExtrapolate
            ])
        );
        assert_eq!(
            "wrap".parse::<BoundaryCondition>(),
            Err(Error::InvalidBoundaryCondition {
                name: "wrap".into()
            })
        );
    }

    #[test]
    fn resolve_broadcasts_and_validates() {
        assert_eq!(
            BoundaryCondition::resolve(&[], 2),
            Ok(vec![BoundaryCondition::SymmetricMirror; 2])
        );
        assert_eq!(
            BoundaryCondition::resolve(&[BoundaryCondition::Periodic], 3),
            Ok(vec![BoundaryCondition::Periodic; 3])
        );
        assert_eq!(
            BoundaryCondition::resolve(
                &[BoundaryCondition::Periodic, BoundaryCondition::AddZeros],
                3
            ),
            Err(Error::InvalidArrayLength {
                arg: "boundary_condition",
                got: 2,
                ndim: 3
            })
        );
    }
}
