use core::fmt;

/// Allowed item count of a sequence, as an inclusive range. `max == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cardinality {
    pub min: u32,
    pub max: Option<u32>,
}

impl Cardinality {
    pub const fn empty() -> Self {
        Self::from_range(0, Some(0))
    }

    pub const fn zero_or_one() -> Self {
        Self::from_range(0, Some(1))
    }

    pub const fn exactly_one() -> Self {
        Self::from_range(1, Some(1))
    }

    pub const fn zero_or_more() -> Self {
        Self::from_range(0, None)
    }

    pub const fn one_or_more() -> Self {
        Self::from_range(1, None)
    }

    pub const fn from_range(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn allows_empty(&self) -> bool {
        self.min == 0
    }

    pub fn allows_many(&self) -> bool {
        self.max.is_none_or(|m| m > 1)
    }

    pub fn is_empty(&self) -> bool {
        self.max == Some(0)
    }

    pub fn is_exactly_one(&self) -> bool {
        self.min == 1 && self.max == Some(1)
    }

    pub fn matches(&self, count: usize) -> bool {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        count >= self.min && self.max.is_none_or(|m| count <= m)
    }

    /// Every count allowed by `self` is allowed by `other`.
    pub fn is_subset_of(&self, other: &Cardinality) -> bool {
        self.min >= other.min
            && match (self.max, other.max) {
                (_, None) => true,
                (None, Some(_)) => false,
                (Some(a), Some(b)) => a <= b,
            }
    }

    pub fn intersection(&self, other: &Cardinality) -> Option<Cardinality> {
        let min = self.min.max(other.min);
        let max = match (self.max, other.max) {
            (None, m) | (m, None) => m,
            (Some(a), Some(b)) => Some(a.min(b)),
        };
        match max {
            Some(m) if m < min => None,
            _ => Some(Cardinality::from_range(min, max)),
        }
    }

    pub fn intersects(&self, other: &Cardinality) -> bool {
        self.intersection(other).is_some()
    }

    /// Smallest range covering both (used for alternatives).
    pub fn union(&self, other: &Cardinality) -> Cardinality {
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
        Cardinality::from_range(self.min.min(other.min), max)
    }

    /// Cardinality of the concatenation of two sequences.
    pub fn concat(&self, other: &Cardinality) -> Cardinality {
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => a.checked_add(b),
            _ => None,
        };
        Cardinality::from_range(self.min.saturating_add(other.min), max)
    }

    /// Occurrence indicator as written after an item type.
    pub fn indicator(&self) -> &'static str {
        match (self.min, self.max) {
            (0, Some(1)) => "?",
            (0, None) => "*",
            (1, None) => "+",
            _ => "",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (0, Some(0)) => f.write_str("empty"),
            (0, Some(1)) => f.write_str("zero or one"),
            (1, Some(1)) => f.write_str("exactly one"),
            (0, None) => f.write_str("zero or more"),
            (1, None) => f.write_str("one or more"),
            (min, Some(max)) => write!(f, "between {min} and {max}"),
            (min, None) => write!(f, "at least {min}"),
        }
    }
}
