//! One-dimensional filter descriptions and their normalized form.

use alloc::{string::ToString, vec::Vec};
use core::str::FromStr;

use imconv_core::{Error, Result};

/// Coefficient structure of a one-dimensional filter.
///
/// Symmetric tags store only half of the filter, from the first tap up to the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterSymmetry {
    /// All taps stored explicitly.
    #[default]
    General,
    /// Odd-sized, `c[k] == c[size-1-k]`. The last stored coefficient is the center tap.
    Even,
    /// Odd-sized, `c[k] == -c[size-1-k]`. The last stored coefficient is the center tap.
    Odd,
    /// Even-sized, `c[k] == c[size-1-k]`, no shared center tap.
    DEven,
    /// Even-sized, `c[k] == -c[size-1-k]`, no shared center tap.
    DOdd,
}

impl FromStr for FilterSymmetry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "general" => Ok(FilterSymmetry::General),
            "even" => Ok(FilterSymmetry::Even),
            "odd" => Ok(FilterSymmetry::Odd),
            "d-even" => Ok(FilterSymmetry::DEven),
            "d-odd" => Ok(FilterSymmetry::DOdd),
            other => Err(Error::InvalidSymmetry {
                tag: other.to_string(),
            }),
        }
    }
}

/// Compact description of a one-dimensional filter.
#[derive(Debug, Clone, PartialEq)]
pub struct OneDimensionalFilter {
    /// Stored coefficients; half of the filter for the symmetric tags.
    pub filter: Vec<f64>,
    /// Origin index into the expanded filter; negative selects `size / 2`.
    pub origin: isize,
    /// Coefficient structure.
    pub symmetry: FilterSymmetry,
}

impl Default for OneDimensionalFilter {
    fn default() -> Self {
        Self {
            filter: Vec::new(),
            origin: -1,
            symmetry: FilterSymmetry::General,
        }
    }
}

impl OneDimensionalFilter {
    /// A general filter with automatic origin.
    pub fn new(filter: Vec<f64>) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Set the symmetry tag.
    pub fn with_symmetry(mut self, symmetry: FilterSymmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Set an explicit origin.
    pub fn with_origin(mut self, origin: isize) -> Self {
        self.origin = origin;
        self
    }

    /// Validate and expand into a [`NormalizedFilter`].
    pub fn normalize(&self) -> Result<NormalizedFilter<'_>> {
        NormalizedFilter::try_from_filter(self)
    }
}

/// Validated filter: expanded size and resolved origin.
///
/// The expansion implied by the symmetry tag is never materialized; the inner loops rebuild
/// mirrored taps from [`NormalizedFilter::coefficients`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedFilter<'a> {
    coefficients: &'a [f64],
    size: usize,
    origin: usize,
    symmetry: FilterSymmetry,
}

impl<'a> NormalizedFilter<'a> {
    /// Interpret `filter`, failing with [`Error::OriginOutOfRange`] for an explicit origin
    /// beyond the expanded size.
    pub fn try_from_filter(filter: &'a OneDimensionalFilter) -> Result<Self> {
        let len = filter.filter.len();
        let mut normalized = Self {
            coefficients: &filter.filter,
            size: 0,
            origin: 0,
            symmetry: filter.symmetry,
        };
        if len == 0 {
            return Ok(normalized);
        }
        normalized.size = match filter.symmetry {
            FilterSymmetry::General => len,
            FilterSymmetry::Even | FilterSymmetry::Odd => 2 * len - 1,
            FilterSymmetry::DEven | FilterSymmetry::DOdd => 2 * len,
        };
        normalized.origin = if filter.origin < 0 {
            normalized.size / 2
        } else {
            let origin = filter.origin.unsigned_abs();
            if origin >= normalized.size {
                return Err(Error::OriginOutOfRange {
                    origin,
                    size: normalized.size,
                });
            }
            origin
        };
        Ok(normalized)
    }

    /// Stored (half) coefficients.
    pub fn coefficients(&self) -> &'a [f64] {
        self.coefficients
    }

    /// Expanded filter length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Origin index into the expanded filter.
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Coefficient structure.
    pub fn symmetry(&self) -> FilterSymmetry {
        self.symmetry
    }

    /// True when applying the filter would not change the data.
    pub fn is_meaningless(&self) -> bool {
        self.size == 0 || (self.size == 1 && self.coefficients[0] == 1.0)
    }

    /// Number of extended samples needed on each side of a line.
    pub fn border(&self) -> usize {
        if self.size == 0 {
            return 0;
        }
        self.origin.max(self.size - self.origin - 1)
    }

    /// Offsets, relative to the output position, of the first and last sample read.
    ///
    /// Output sample `i` reads input samples `i + lo ..= i + hi`.
    pub fn tap_reach(&self) -> (isize, isize) {
        if self.size == 0 {
            return (0, 0);
        }
        let origin = self.origin as isize;
        (origin - (self.size as isize - 1), origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const ALL: [FilterSymmetry; 5] = [
        FilterSymmetry::General,
        FilterSymmetry::Even,
        FilterSymmetry::Odd,
        FilterSymmetry::DEven,
        FilterSymmetry::DOdd,
    ];

    #[test]
    fn sizes_follow_symmetry() {
        let coefficients = vec![1.0, 2.0, 3.0];
        let sizes: Vec<usize> = ALL
            .iter()
            .map(|&s| {
                OneDimensionalFilter::new(coefficients.clone())
                    .with_symmetry(s)
                    .normalize()
                    .expect("valid filter")
                    .size()
            })
            .collect();
        assert_eq!(sizes, vec![3, 5, 5, 6, 6]);
    }

    #[test]
    fn automatic_origin_is_half_size() {
        let f = OneDimensionalFilter::new(vec![1.0; 4]).with_symmetry(FilterSymmetry::DEven);
        let n = f.normalize().expect("valid filter");
        assert_eq!((n.size(), n.origin()), (8, 4));

        let f = OneDimensionalFilter::new(vec![1.0; 4]);
        assert_eq!(f.normalize().expect("valid filter").origin(), 2);
    }

    #[test]
    fn origin_bound_for_every_symmetry() {
        for symmetry in ALL {
            let f = OneDimensionalFilter::new(vec![0.25, 0.5]).with_symmetry(symmetry);
            let size = f.normalize().expect("valid filter").size();

            let last = f.clone().with_origin(size as isize - 1);
            assert_eq!(last.normalize().expect("last tap is valid").origin(), size - 1);

            for origin in [size, size + 3] {
                let err = f
                    .clone()
                    .with_origin(origin as isize)
                    .normalize()
                    .expect_err("origin outside filter");
                assert_eq!(err, Error::OriginOutOfRange { origin, size });
            }
        }
    }

    #[test]
    fn empty_filter_is_meaningless() {
        let f = OneDimensionalFilter::new(Vec::new()).with_origin(7);
        let n = f.normalize().expect("empty filter ignores origin");
        assert_eq!(n.size(), 0);
        assert!(n.is_meaningless());
        assert_eq!(n.border(), 0);
    }

    #[test]
    fn unit_filter_is_meaningless() {
        for symmetry in [FilterSymmetry::General, FilterSymmetry::Even, FilterSymmetry::Odd] {
            let f = OneDimensionalFilter::new(vec![1.0]).with_symmetry(symmetry);
            assert!(f.normalize().expect("valid").is_meaningless());
        }
        let f = OneDimensionalFilter::new(vec![2.0]);
        assert!(!f.normalize().expect("valid").is_meaningless());
        let f = OneDimensionalFilter::new(vec![1.0]).with_symmetry(FilterSymmetry::DEven);
        assert!(!f.normalize().expect("valid").is_meaningless());
    }

    #[test]
    fn border_is_the_tap_reach() {
        for symmetry in ALL {
            for len in 1..5usize {
                let f = OneDimensionalFilter::new(vec![1.0; len]).with_symmetry(symmetry);
                let size = f.normalize().expect("valid").size();
                for origin in 0..size {
                    let f = f.clone().with_origin(origin as isize);
                    let n = f.normalize().expect("valid");
                    let (lo, hi) = n.tap_reach();
                    assert_eq!(hi - lo + 1, size as isize);
                    assert_eq!(n.border(), lo.unsigned_abs().max(hi.unsigned_abs()));
                }
            }
        }
    }

    #[test]
    fn parse_symmetry_tags() {
        assert_eq!("d-odd".parse::<FilterSymmetry>(), Ok(FilterSymmetry::DOdd));
        assert_eq!("".parse::<FilterSymmetry>(), Ok(FilterSymmetry::General));
        assert_eq!(
            "symmetric".parse::<FilterSymmetry>(),
            Err(Error::InvalidSymmetry {
                tag: "symmetric".into()
            })
        );
    }
}
