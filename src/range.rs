//! Numeric ranges with an inverted empty state.

/// Inclusive min/max bound over one axis.
///
/// An empty range is encoded inverted (`min > max`), so that
/// [`Range::expand_to_include`] works without a separate "unset" flag:
/// the first finite value collapses the bound onto itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Range {
    /// The empty range: every value expands it, no value is contained.
    pub const EMPTY: Self = Self {
        min: f64::MAX,
        max: -f64::MAX,
    };

    /// Create a new range, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// Check whether the range holds no values.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Span of the range. Negative when empty.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Expand the range to include a value.
    ///
    /// Non-finite values are ignored.
    pub fn expand_to_include(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Union with another range.
    pub fn union(a: Self, b: Self) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_expands_to_single_value() {
        let mut range = Range::EMPTY;
        assert!(range.is_empty());
        range.expand_to_include(4.0);
        assert_eq!(range, Range::new(4.0, 4.0));
        assert!(!range.is_empty());
    }

    #[test]
    fn expand_ignores_non_finite() {
        let mut range = Range::new(0.0, 1.0);
        range.expand_to_include(f64::NAN);
        range.expand_to_include(f64::INFINITY);
        assert_eq!(range, Range::new(0.0, 1.0));
    }

    #[test]
    fn union_of_disjoint_ranges_covers_both() {
        let union = Range::union(Range::new(0.0, 1.0), Range::new(5.0, 9.0));
        assert_eq!(union, Range::new(0.0, 9.0));
    }
}
