//! Content-bearing edits.
//!
//! A [`TextEdit`] carries the inserted text of every replacement. It can be
//! applied to a [`Utf16Text`], inverted against the document it was made
//! for, and converted to and from the [`TextChange`] batches that leave the
//! process.

use std::fmt;

use crate::{
  edit::{
    Edit,
    Replacement,
    ReplacementValue,
  },
  length_edit::LengthEdit,
  range::{
    OffsetRange,
    shift,
  },
  text::Utf16Text,
  text_change::TextChange,
};

pub type TextReplacement = Replacement<Utf16Text>;
pub type TextEdit = Edit<Utf16Text>;

impl ReplacementValue for Utf16Text {
  #[inline]
  fn len(&self) -> usize {
    Utf16Text::len(self)
  }

  #[inline]
  fn slice(&self, range: OffsetRange) -> Self {
    Utf16Text::slice(self, range)
  }

  #[inline]
  fn append(&mut self, other: &Self) {
    self.push_text(other);
  }

  fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

impl TextReplacement {
  pub fn insert(offset: usize, text: impl Into<Utf16Text>) -> Self {
    Self::new(OffsetRange::empty_at(offset), text.into())
  }

  pub fn delete(range: OffsetRange) -> Self {
    Self::new(range, Utf16Text::new())
  }

  pub fn replace(range: OffsetRange, text: impl Into<Utf16Text>) -> Self {
    Self::new(range, text.into())
  }
}

impl TextEdit {
  pub fn insert(offset: usize, text: impl Into<Utf16Text>) -> Self {
    Self::single(TextReplacement::insert(offset, text))
  }

  pub fn delete(range: OffsetRange) -> Self {
    Self::single(TextReplacement::delete(range))
  }

  pub fn replace(range: OffsetRange, text: impl Into<Utf16Text>) -> Self {
    Self::single(TextReplacement::replace(range, text))
  }

  /// Applies this edit to `text` and returns the new text.
  ///
  /// # Panics
  ///
  /// Panics if a replacement reaches past the end of `text`.
  pub fn apply(&self, text: &Utf16Text) -> Utf16Text {
    let units = text.as_units();
    let mut result = Vec::with_capacity(self.new_len(units.len()));
    let mut pos = 0;
    for replacement in self {
      result.extend_from_slice(&units[pos..replacement.range.start]);
      result.extend_from_slice(replacement.value.as_units());
      pos = replacement.range.end;
    }
    result.extend_from_slice(&units[pos..]);
    Utf16Text::from_units(&result)
  }

  /// Returns the edit that undoes this one. `original` is the text this edit
  /// applies to.
  #[must_use]
  pub fn inverse(&self, original: &Utf16Text) -> Self {
    let mut offset = 0;
    let replacements = self
      .iter()
      .map(|replacement| {
        let start = shift(replacement.range.start, offset);
        offset += replacement.delta();
        TextReplacement::new(
          OffsetRange::from_start_and_len(start, replacement.new_len()),
          original.slice(replacement.range),
        )
      })
      .collect();
    Self::new(replacements)
  }

  pub fn to_length_edit(&self) -> LengthEdit {
    LengthEdit::from_edit(self)
  }

  /// Describes this edit as a batch of [`TextChange`]s, with old positions in
  /// `original` and new positions in the edited text.
  pub fn to_text_changes(&self, original: &Utf16Text) -> Vec<TextChange> {
    let mut offset = 0;
    self
      .iter()
      .map(|replacement| {
        let new_position = shift(replacement.range.start, offset);
        offset += replacement.delta();
        TextChange::new(
          replacement.range.start,
          original.slice(replacement.range),
          new_position,
          replacement.value.clone(),
        )
      })
      .collect()
  }

  /// Rebuilds the edit described by a sorted batch of [`TextChange`]s.
  ///
  /// # Panics
  ///
  /// Panics if the changes overlap or are not sorted by old position.
  pub fn from_text_changes(changes: &[TextChange]) -> Self {
    Self::new(
      changes
        .iter()
        .map(|change| {
          TextReplacement::new(
            OffsetRange::from_start_and_len(change.old_position, change.old_len()),
            change.new_text.clone(),
          )
        })
        .collect(),
    )
  }
}
