//! The closed set of storable value kinds.

/// A value that can live in a chunked array.
///
/// The engine stores exactly two kinds of sample values: numbers
/// (`f64`) and interned strings ([`crate::StringRef`]). Aggregate
/// tracking and constant-run compression only apply to kinds that
/// expose a scalar view.
pub trait Element: Clone {
    /// Scalar used for min/max tracking, or `None` for non-numeric
    /// kinds. Kinds returning `None` never compress and report no
    /// value range.
    fn scalar(&self) -> Option<f64>;

    /// Rebuild an element from a stored constant.
    ///
    /// Returning `Some` here is what makes a kind eligible for
    /// constant-run compression; a compressed chunk materializes its
    /// elements through this.
    fn from_scalar(scalar: f64) -> Option<Self>;

    /// Check whether a sample of this value should be accepted.
    ///
    /// Non-finite numbers are rejected at the ingestion boundary.
    fn is_valid_sample(&self) -> bool {
        match self.scalar() {
            Some(s) => s.is_finite(),
            None => true,
        }
    }
}

impl Element for f64 {
    fn scalar(&self) -> Option<f64> {
        Some(*self)
    }

    fn from_scalar(scalar: f64) -> Option<Self> {
        Some(scalar)
    }
}
