//! Finite integer domains.
//!
//! A [`Domain`] is either a plain interval, which only tracks its bounds, or
//! an enumerated set backed by a bitset, which can also lose interior values.
//! Every mutator reports whether it changed anything and fails with
//! [`Contradiction`] instead of leaving an empty domain behind.

use crate::Contradiction;

/// Set of values a variable may still take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    repr: Repr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    Interval { min: i64, max: i64 },
    Bits(BitSet),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BitSet {
    offset: i64,
    words: Vec<u64>,
    min: i64,
    max: i64,
    size: u64,
}

impl BitSet {
    fn full(min: i64, max: i64) -> Option<Self> {
        let span = usize::try_from(max.checked_sub(min)?).ok()?.checked_add(1)?;
        let mut words = vec![u64::MAX; span.div_ceil(64)];
        let tail = span & 63;
        if tail != 0
            && let Some(last) = words.last_mut()
        {
            *last = mask(tail).wrapping_sub(1);
        }
        Some(Self {
            offset: min,
            words,
            min,
            max,
            size: u64::try_from(span).ok()?,
        })
    }

    fn index(&self, value: i64) -> Option<usize> {
        usize::try_from(value.checked_sub(self.offset)?).ok()
    }

    fn has(&self, value: i64) -> bool {
        self.index(value).is_some_and(|index| {
            self.words
                .get(index >> 6)
                .is_some_and(|word| word & mask(index) != 0)
        })
    }

    fn clear(&mut self, value: i64) -> bool {
        let Some(index) = self.index(value) else {
            return false;
        };
        let Some(word) = self.words.get_mut(index >> 6) else {
            return false;
        };
        let was_set = *word & mask(index) != 0;
        *word &= !mask(index);
        if was_set {
            self.size = self.size.saturating_sub(1);
        }
        was_set
    }

    fn next_from(&self, value: i64) -> Option<i64> {
        (value.max(self.min)..=self.max).find(|&candidate| self.has(candidate))
    }

    fn prev_from(&self, value: i64) -> Option<i64> {
        (self.min..=value.min(self.max))
            .rev()
            .find(|&candidate| self.has(candidate))
    }
}

fn mask(index: usize) -> u64 {
    1_u64 << u32::try_from(index & 63).unwrap_or_default()
}

impl Domain {
    /// Interval domain `[min, max]`, or `None` when it would be empty.
    #[must_use]
    pub const fn interval(min: i64, max: i64) -> Option<Self> {
        if min > max {
            return None;
        }
        Some(Self {
            repr: Repr::Interval { min, max },
        })
    }

    /// Enumerated domain holding every value of `[min, max]`.
    ///
    /// Returns `None` when the range is empty or too wide to enumerate.
    ///
    /// # Examples
    /// ```
    /// use tsptw_cp::Domain;
    ///
    /// let mut domain = Domain::enumerated(0, 4).expect("non-empty");
    /// assert_eq!(domain.remove(2), Ok(true));
    /// assert_eq!(domain.iter().collect::<Vec<_>>(), vec![0, 1, 3, 4]);
    /// ```
    #[must_use]
    pub fn enumerated(min: i64, max: i64) -> Option<Self> {
        BitSet::full(min, max).map(|bits| Self {
            repr: Repr::Bits(bits),
        })
    }

    /// Smallest value.
    #[must_use]
    pub const fn min(&self) -> i64 {
        match &self.repr {
            Repr::Interval { min, .. } => *min,
            Repr::Bits(bits) => bits.min,
        }
    }

    /// Largest value.
    #[must_use]
    pub const fn max(&self) -> i64 {
        match &self.repr {
            Repr::Interval { max, .. } => *max,
            Repr::Bits(bits) => bits.max,
        }
    }

    /// Number of values.
    #[must_use]
    pub const fn size(&self) -> u64 {
        match &self.repr {
            Repr::Interval { min, max } => max.abs_diff(*min).saturating_add(1),
            Repr::Bits(bits) => bits.size,
        }
    }

    /// Whether exactly one value is left.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.min() == self.max()
    }

    /// The remaining value of a fixed domain.
    #[must_use]
    pub const fn value(&self) -> Option<i64> {
        if self.is_fixed() {
            Some(self.min())
        } else {
            None
        }
    }

    /// Whether `value` is still possible.
    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        match &self.repr {
            Repr::Interval { min, max } => *min <= value && value <= *max,
            Repr::Bits(bits) => bits.min <= value && value <= bits.max && bits.has(value),
        }
    }

    /// Values in increasing order.
    #[must_use]
    pub const fn iter(&self) -> DomainIter<'_> {
        DomainIter {
            domain: self,
            cursor: Some(self.min()),
        }
    }

    /// Raise the lower bound to `value`.
    pub fn set_min(&mut self, value: i64) -> Result<bool, Contradiction> {
        if value <= self.min() {
            return Ok(false);
        }
        if value > self.max() {
            return Err(Contradiction);
        }
        match &mut self.repr {
            Repr::Interval { min, .. } => *min = value,
            Repr::Bits(bits) => {
                for dropped in bits.min..value {
                    bits.clear(dropped);
                }
                bits.min = bits.next_from(value).ok_or(Contradiction)?;
            }
        }
        Ok(true)
    }

    /// Lower the upper bound to `value`.
    pub fn set_max(&mut self, value: i64) -> Result<bool, Contradiction> {
        if value >= self.max() {
            return Ok(false);
        }
        if value < self.min() {
            return Err(Contradiction);
        }
        match &mut self.repr {
            Repr::Interval { max, .. } => *max = value,
            Repr::Bits(bits) => {
                for dropped in value.saturating_add(1)..=bits.max {
                    bits.clear(dropped);
                }
                bits.max = bits.prev_from(value).ok_or(Contradiction)?;
            }
        }
        Ok(true)
    }

    /// Reduce the domain to the single `value`.
    pub fn fix(&mut self, value: i64) -> Result<bool, Contradiction> {
        if !self.contains(value) {
            return Err(Contradiction);
        }
        if self.is_fixed() {
            return Ok(false);
        }
        self.set_min(value)?;
        self.set_max(value)?;
        Ok(true)
    }

    /// Remove `value`.
    ///
    /// Interval domains can only lose their bounds; removing an interior
    /// value from one is a no-op reported as `Ok(false)`.
    pub fn remove(&mut self, value: i64) -> Result<bool, Contradiction> {
        if !self.contains(value) {
            return Ok(false);
        }
        if self.is_fixed() {
            return Err(Contradiction);
        }
        match &mut self.repr {
            Repr::Interval { min, max } => {
                if value == *min {
                    *min = value.saturating_add(1);
                } else if value == *max {
                    *max = value.saturating_sub(1);
                } else {
                    return Ok(false);
                }
            }
            Repr::Bits(bits) => {
                bits.clear(value);
                if value == bits.min {
                    bits.min = bits.next_from(value.saturating_add(1)).ok_or(Contradiction)?;
                }
                if value == bits.max {
                    bits.max = bits.prev_from(value.saturating_sub(1)).ok_or(Contradiction)?;
                }
            }
        }
        Ok(true)
    }
}

/// Iterator over the values of a [`Domain`].
#[derive(Debug, Clone)]
pub struct DomainIter<'a> {
    domain: &'a Domain,
    cursor: Option<i64>,
}

impl Iterator for DomainIter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let from = self.cursor?;
        let found = match &self.domain.repr {
            Repr::Interval { max, .. } => (from <= *max).then_some(from),
            Repr::Bits(bits) => bits.next_from(from),
        };
        self.cursor = found.and_then(|value| value.checked_add(1));
        found
    }
}

impl<'a> IntoIterator for &'a Domain {
    type Item = i64;
    type IntoIter = DomainIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
