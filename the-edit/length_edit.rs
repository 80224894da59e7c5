//! Length-only edits.
//!
//! A [`LengthEdit`] records where a document changed and how long the new
//! content is, without the content itself. It is the shadow of a richer edit
//! and is enough to invert edits, project per-character arrays (token
//! lengths, line metadata) and map offsets.

use std::fmt;

use crate::{
  edit::{
    Edit,
    Replacement,
    ReplacementValue,
  },
  range::{
    OffsetRange,
    shift,
  },
};

pub type LengthReplacement = Replacement<usize>;
pub type LengthEdit = Edit<usize>;

impl ReplacementValue for usize {
  #[inline]
  fn len(&self) -> usize {
    *self
  }

  #[inline]
  fn slice(&self, range: OffsetRange) -> Self {
    debug_assert!(range.end <= *self);
    range.len()
  }

  #[inline]
  fn append(&mut self, other: &Self) {
    *self += other;
  }

  fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "+{self}")
  }
}

impl LengthReplacement {
  #[inline]
  pub fn insert(offset: usize, new_len: usize) -> Self {
    Self::new(OffsetRange::empty_at(offset), new_len)
  }

  #[inline]
  pub fn delete(range: OffsetRange) -> Self {
    Self::new(range, 0)
  }

  #[inline]
  pub fn replace(range: OffsetRange, new_len: usize) -> Self {
    Self::new(range, new_len)
  }
}

impl LengthEdit {
  pub fn insert(offset: usize, new_len: usize) -> Self {
    Self::single(LengthReplacement::insert(offset, new_len))
  }

  pub fn delete(range: OffsetRange) -> Self {
    Self::single(LengthReplacement::delete(range))
  }

  pub fn replace(range: OffsetRange, new_len: usize) -> Self {
    Self::single(LengthReplacement::replace(range, new_len))
  }

  /// Drops the content of `edit`, keeping only ranges and new lengths.
  pub fn from_edit<T: ReplacementValue>(edit: &Edit<T>) -> Self {
    Self::new(
      edit
        .iter()
        .map(|replacement| LengthReplacement::new(replacement.range, replacement.new_len()))
        .collect(),
    )
  }

  /// Returns the edit that undoes this one.
  ///
  /// Each replacement `[start, +old) -> +new` becomes
  /// `[start + offset, +new) -> +old`, where `offset` is the length delta of
  /// all replacements before it.
  #[must_use]
  pub fn inverse(&self) -> Self {
    let mut offset = 0;
    let replacements = self
      .iter()
      .map(|replacement| {
        let start = shift(replacement.range.start, offset);
        offset += replacement.delta();
        LengthReplacement::new(
          OffsetRange::from_start_and_len(start, replacement.new_len()),
          replacement.old_len(),
        )
      })
      .collect();
    Self::new(replacements)
  }
}
