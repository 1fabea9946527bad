//! Piecewise cubic profiles.
//!
//! Elevation, lane offset, and lane width are all authored the same way: a
//! list of records, each starting at some `s` and carrying a cubic in the
//! distance `ds` from that start.  The record in force at `s` is the last one
//! whose start is `<= s`.

/// `a + b·ds + c·ds² + d·ds³`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubicPoly {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CubicPoly {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub const fn constant(a: f64) -> Self {
        Self { a, b: 0.0, c: 0.0, d: 0.0 }
    }

    #[inline]
    pub fn eval(&self, ds: f64) -> f64 {
        self.a + ds * (self.b + ds * (self.c + ds * self.d))
    }

    #[inline]
    pub fn derivative(&self, ds: f64) -> f64 {
        self.b + ds * (2.0 * self.c + ds * 3.0 * self.d)
    }
}

/// One record of a [`CubicProfile`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileEntry {
    pub s: f64,
    pub poly: CubicPoly,
}

/// A piecewise cubic function of `s`.  Empty profiles evaluate to zero, and
/// so does any `s` before the first record.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubicProfile {
    entries: Vec<ProfileEntry>,
}

impl CubicProfile {
    /// Build from records in any order.  Records are sorted by start `s`;
    /// records sharing a start keep their authored order, so the later one
    /// wins.
    pub fn new(mut entries: Vec<ProfileEntry>) -> Self {
        entries.sort_by(|a, b| a.s.total_cmp(&b.s));
        Self { entries }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![ProfileEntry { s: 0.0, poly: CubicPoly::constant(value) }])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    /// Start positions of every record, ascending.
    pub fn breakpoints(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.s)
    }

    fn entry_at(&self, s: f64) -> Option<&ProfileEntry> {
        let idx = self.entries.partition_point(|e| e.s <= s);
        idx.checked_sub(1).map(|i| &self.entries[i])
    }

    pub fn value_at(&self, s: f64) -> f64 {
        self.entry_at(s).map_or(0.0, |e| e.poly.eval(s - e.s))
    }

    pub fn slope_at(&self, s: f64) -> f64 {
        self.entry_at(s).map_or(0.0, |e| e.poly.derivative(s - e.s))
    }
}
