//! Half-open offset ranges.
//!
//! An [`OffsetRange`] covers `[start, end)` in some sequence of elements
//! (characters, code units, tokens). Empty ranges are valid and describe a
//! position between two elements, which is how pure insertions are expressed.

use std::{
  fmt,
  ops::Range,
};

use serde::{
  Deserialize,
  Serialize,
};

use crate::edit::{
  EditError,
  Result,
};

#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct OffsetRange {
  pub start: usize,
  pub end:   usize,
}

impl OffsetRange {
  /// Creates `[start, end)`.
  ///
  /// # Panics
  ///
  /// Panics if `end < start`. Use [`OffsetRange::try_new`] when the bounds
  /// come from untrusted input.
  #[inline]
  #[must_use]
  pub fn new(start: usize, end: usize) -> Self {
    assert!(start <= end, "invalid range: start {start} is after end {end}");
    Self { start, end }
  }

  pub fn try_new(start: usize, end: usize) -> Result<Self> {
    if end < start {
      return Err(EditError::InvalidRange { start, end });
    }
    Ok(Self { start, end })
  }

  #[inline]
  #[must_use]
  pub const fn empty_at(offset: usize) -> Self {
    Self {
      start: offset,
      end:   offset,
    }
  }

  #[inline]
  #[must_use]
  pub const fn from_start_and_len(start: usize, len: usize) -> Self {
    Self {
      start,
      end: start + len,
    }
  }

  #[inline]
  pub const fn len(&self) -> usize {
    self.end - self.start
  }

  #[inline]
  pub const fn is_empty(&self) -> bool {
    self.start == self.end
  }

  /// Whether `offset` lies inside `[start, end)`.
  #[inline]
  pub const fn contains(&self, offset: usize) -> bool {
    self.start <= offset && offset < self.end
  }

  #[inline]
  pub fn contains_range(&self, other: Self) -> bool {
    self.start <= other.start && other.end <= self.end
  }

  /// Whether the two ranges share at least one element.
  #[inline]
  pub fn intersects(&self, other: Self) -> bool {
    self.start.max(other.start) < self.end.min(other.end)
  }

  /// Like [`OffsetRange::intersects`], but adjacent ranges count as well.
  #[inline]
  pub fn touches(&self, other: Self) -> bool {
    self.start.max(other.start) <= self.end.min(other.end)
  }

  /// Returns the overlap of both ranges, if there is one (possibly empty).
  pub fn intersect(&self, other: Self) -> Option<Self> {
    let start = self.start.max(other.start);
    let end = self.end.min(other.end);
    (start <= end).then_some(Self { start, end })
  }

  /// The smallest range covering both.
  #[must_use]
  pub fn join(&self, other: Self) -> Self {
    Self {
      start: self.start.min(other.start),
      end:   self.end.max(other.end),
    }
  }

  /// Merges `other` into `self`, where `other` must start exactly where
  /// `self` ends.
  ///
  /// # Panics
  ///
  /// Panics if the ranges are not right-touching.
  #[must_use]
  pub fn join_right_touching(&self, other: Self) -> Self {
    assert_eq!(
      self.end, other.start,
      "ranges {self:?} and {other:?} are not right-touching"
    );
    Self {
      start: self.start,
      end:   other.end,
    }
  }

  /// Moves the range by `delta`.
  ///
  /// # Panics
  ///
  /// Panics if the range would start before zero.
  #[must_use]
  pub fn delta(&self, delta: isize) -> Self {
    Self {
      start: shift(self.start, delta),
      end:   shift(self.end, delta),
    }
  }

  /// Returns the elements of `items` covered by this range.
  pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
    &items[self.start..self.end]
  }
}

/// Applies a signed delta to an unsigned offset.
///
/// # Panics
///
/// Panics if the result is negative or overflows; both indicate that the
/// caller's coordinates were inconsistent.
#[inline]
pub(crate) fn shift(offset: usize, delta: isize) -> usize {
  offset
    .checked_add_signed(delta)
    .unwrap_or_else(|| panic!("offset {offset} shifted by {delta} is out of range"))
}

/// Length difference between a new and an old span, as a signed delta.
#[inline]
pub(crate) fn len_delta(new_len: usize, old_len: usize) -> isize {
  new_len as isize - old_len as isize
}

impl fmt::Debug for OffsetRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}, {})", self.start, self.end)
  }
}

impl fmt::Display for OffsetRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

impl From<Range<usize>> for OffsetRange {
  fn from(range: Range<usize>) -> Self {
    Self::new(range.start, range.end)
  }
}

impl TryFrom<(usize, usize)> for OffsetRange {
  type Error = EditError;

  fn try_from((start, end): (usize, usize)) -> Result<Self> {
    Self::try_new(start, end)
  }
}

impl From<OffsetRange> for (usize, usize) {
  fn from(range: OffsetRange) -> Self {
    (range.start, range.end)
  }
}

impl From<OffsetRange> for Range<usize> {
  fn from(range: OffsetRange) -> Self {
    range.start..range.end
  }
}
