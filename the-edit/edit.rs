//! Replacement-based edit algebra.
//!
//! An [`Edit`] is an ordered list of [`Replacement`]s, each replacing a
//! half-open range of the *old* document with a new value. Replacements are
//! sorted by start and never overlap, so every offset of the old document is
//! touched by at most one of them. An edit without replacements is the
//! identity.
//!
//! The payload of a replacement is generic. The crate ships two kinds:
//!
//! - `usize` - only the length of the new content is known
//!   ([`crate::length_edit::LengthEdit`]),
//! - [`crate::text::Utf16Text`] - the new content itself
//!   ([`crate::text_edit::TextEdit`]).
//!
//! Both implement [`ReplacementValue`], which is all the algebra needs to
//! slice, join and measure payloads.
//!
//! # Composition
//!
//! If `a` turns `D0` into `D1` and `b` turns `D1` into `D2`, then
//! `a.compose(&b)` turns `D0` into `D2` directly:
//!
//! ```ignore
//! let composed = a.compose(&b);
//! assert_eq!(composed.apply(&d0), b.apply(&a.apply(&d0)));
//! ```
//!
//! Only the net effect of a composed edit is guaranteed. Touching
//! replacements are joined, so the exact number of replacements may differ
//! from what a naive merge would produce.

use std::{
  collections::VecDeque,
  fmt,
  iter,
};

use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer,
};
use thiserror::Error;

use crate::{
  index_transformer::MonotonousIndexTransformer,
  range::{
    OffsetRange,
    len_delta,
    shift,
  },
};

pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditError {
  #[error("invalid range: start {start} is after end {end}")]
  InvalidRange { start: usize, end: usize },
  #[error("replacement {start}..{end} overlaps previous end {prev_end}")]
  OverlappingReplacement {
    prev_end: usize,
    start:    usize,
    end:      usize,
  },
}

/// Payload carried by a [`Replacement`].
pub trait ReplacementValue: Clone + PartialEq {
  /// Length of the new content.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The part of the new content covered by `range`.
  fn slice(&self, range: OffsetRange) -> Self;

  /// Appends `other`'s new content to this one.
  fn append(&mut self, other: &Self);

  fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Replacement<T> {
  pub range: OffsetRange,
  pub value: T,
}

impl<T: ReplacementValue> Replacement<T> {
  #[inline]
  pub fn new(range: OffsetRange, value: T) -> Self {
    Self { range, value }
  }

  #[inline]
  pub fn old_len(&self) -> usize {
    self.range.len()
  }

  #[inline]
  pub fn new_len(&self) -> usize {
    self.value.len()
  }

  /// How much longer the document gets by applying this replacement.
  #[inline]
  pub fn delta(&self) -> isize {
    len_delta(self.new_len(), self.old_len())
  }

  /// An empty range replaced by nothing.
  #[inline]
  pub fn is_noop(&self) -> bool {
    self.range.is_empty() && self.value.is_empty()
  }

  #[must_use]
  pub fn shifted(&self, delta: isize) -> Self {
    Self {
      range: self.range.delta(delta),
      value: self.value.clone(),
    }
  }

  /// Builds a replacement of `range` whose value is the part of this
  /// replacement's new content covered by `value_range`.
  #[must_use]
  pub fn slice(&self, range: OffsetRange, value_range: OffsetRange) -> Self {
    Self {
      range,
      value: self.value.slice(value_range),
    }
  }

  /// Joins `other` into a single replacement if it starts exactly where this
  /// one ends.
  pub fn try_join_touching(&self, other: &Self) -> Option<Self> {
    if self.range.end != other.range.start {
      return None;
    }
    let mut joined = self.clone();
    joined.join_touching(other);
    Some(joined)
  }

  fn join_touching(&mut self, other: &Self) {
    self.range = self.range.join_right_touching(other.range);
    self.value.append(&other.value);
  }
}

impl<T: ReplacementValue> fmt::Debug for Replacement<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}, +{}) -> ", self.range.start, self.range.len())?;
    self.value.fmt_value(f)
  }
}

impl<T: ReplacementValue> fmt::Display for Replacement<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Edit<T> {
  replacements: Vec<Replacement<T>>,
}

impl<T: ReplacementValue> Default for Edit<T> {
  fn default() -> Self {
    Self::empty()
  }
}

impl<T: ReplacementValue> Edit<T> {
  /// Creates an edit from sorted, non-overlapping replacements.
  ///
  /// # Panics
  ///
  /// Panics if a replacement has a reversed range or overlaps (or precedes)
  /// the one before it. Use [`Edit::try_new`] to get an error instead.
  pub fn new(replacements: Vec<Replacement<T>>) -> Self {
    if let Err(err) = Self::validate(&replacements) {
      panic!("malformed edit: {err}");
    }
    Self { replacements }
  }

  pub fn try_new(replacements: Vec<Replacement<T>>) -> Result<Self> {
    Self::validate(&replacements)?;
    Ok(Self { replacements })
  }

  #[inline]
  pub fn empty() -> Self {
    Self {
      replacements: Vec::new(),
    }
  }

  #[inline]
  pub fn single(replacement: Replacement<T>) -> Self {
    Self {
      replacements: vec![replacement],
    }
  }

  fn validate(replacements: &[Replacement<T>]) -> Result<()> {
    let mut prev_end = 0;
    for replacement in replacements {
      let OffsetRange { start, end } = replacement.range;
      if end < start {
        return Err(EditError::InvalidRange { start, end });
      }
      if start < prev_end {
        return Err(EditError::OverlappingReplacement {
          prev_end,
          start,
          end,
        });
      }
      prev_end = end;
    }
    Ok(())
  }

  #[inline]
  pub fn replacements(&self) -> &[Replacement<T>] {
    &self.replacements
  }

  #[inline]
  pub fn into_replacements(self) -> Vec<Replacement<T>> {
    self.replacements
  }

  #[inline]
  pub fn iter(&self) -> std::slice::Iter<'_, Replacement<T>> {
    self.replacements.iter()
  }

  /// Number of replacements.
  #[inline]
  pub fn len(&self) -> usize {
    self.replacements.len()
  }

  /// Whether this edit has no replacements. A non-empty edit may still be a
  /// no-op; see [`Edit::normalize`].
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.replacements.is_empty()
  }

  /// Length of the document after applying this edit to a document of
  /// `old_len`.
  pub fn new_len(&self, old_len: usize) -> usize {
    let delta = self.replacements.iter().map(Replacement::delta).sum();
    shift(old_len, delta)
  }

  /// The range each replacement's new content occupies in the new document.
  pub fn new_ranges(&self) -> Vec<OffsetRange> {
    let mut delta = 0;
    self
      .replacements
      .iter()
      .map(|replacement| {
        let range =
          OffsetRange::from_start_and_len(shift(replacement.range.start, delta), replacement.new_len());
        delta += replacement.delta();
        range
      })
      .collect()
  }

  /// Drops no-op replacements and joins touching ones.
  #[must_use]
  pub fn normalize(&self) -> Self {
    let mut replacements: Vec<Replacement<T>> = Vec::with_capacity(self.replacements.len());
    for replacement in &self.replacements {
      if replacement.is_noop() {
        continue;
      }
      match replacements.last_mut() {
        Some(last) if last.range.end == replacement.range.start => last.join_touching(replacement),
        _ => replacements.push(replacement.clone()),
      }
    }
    Self { replacements }
  }

  /// Combines two sequential edits.
  ///
  /// `self` turns `D0` into `D1` and `other` turns `D1` into `D2`. The
  /// result turns `D0` into `D2`.
  #[must_use]
  pub fn compose(&self, other: &Self) -> Self {
    let first = self.normalize();
    let second = other.normalize();

    if first.is_empty() {
      return second;
    }
    if second.is_empty() {
      return first;
    }

    let mut queue: VecDeque<Replacement<T>> = first.replacements.into();
    let mut result = Vec::with_capacity(queue.len() + second.replacements.len());
    // Length delta of every replacement of `first` consumed so far. Maps D0
    // offsets after those replacements to D1 offsets.
    let mut delta: isize = 0;

    for current in second.replacements {
      // Everything whose new content ends strictly before `current` passes
      // through untouched.
      while let Some(prev) = queue.front() {
        if shift(prev.range.start, delta) + prev.new_len() >= current.range.start {
          break;
        }
        delta += prev.delta();
        result.extend(queue.pop_front());
      }

      let delta_before = delta;
      let mut first_hit: Option<Replacement<T>> = None;
      let mut last_hit: Option<Replacement<T>> = None;
      while queue
        .front()
        .is_some_and(|prev| shift(prev.range.start, delta) <= current.range.end)
      {
        let Some(prev) = queue.pop_front() else {
          break;
        };
        delta += prev.delta();
        if first_hit.is_none() {
          first_hit = Some(prev);
        } else {
          last_hit = Some(prev);
        }
      }

      let Some(first_hit) = first_hit else {
        result.push(current.shifted(-delta));
        continue;
      };
      let last_hit = last_hit.as_ref().unwrap_or(&first_hit);

      // The part of the first hit's new content before `current` survives.
      let first_out_start = shift(first_hit.range.start, delta_before);
      let (start, mut value) = if current.range.start >= first_out_start {
        let prefix_len = current.range.start - first_out_start;
        let prefix = first_hit.value.slice(OffsetRange::new(0, prefix_len));
        (first_hit.range.start, prefix)
      } else {
        let empty = first_hit.value.slice(OffsetRange::empty_at(0));
        (shift(current.range.start, -delta_before), empty)
      };
      value.append(&current.value);

      // The part of the last hit's new content after `current` survives too.
      // It goes back into the queue as an insertion so that a later
      // replacement of `other` can still reach it.
      let last_out_end = shift(last_hit.range.end, delta);
      if last_out_end > current.range.end {
        let suffix_len = last_out_end - current.range.end;
        let new_len = last_hit.new_len();
        let suffix = last_hit.slice(
          OffsetRange::empty_at(last_hit.range.end),
          OffsetRange::new(new_len - suffix_len, new_len),
        );
        delta -= suffix.delta();
        queue.push_front(suffix);
      }

      let end = shift(current.range.end, -delta);
      result.push(Replacement::new(OffsetRange::new(start, end), value));
    }

    result.extend(queue);

    tracing::trace!(
      replacements = result.len(),
      "composed {} and {} replacements",
      self.replacements.len(),
      other.replacements.len()
    );

    let composed = Self {
      replacements: result,
    }
    .normalize();
    debug_assert!(Self::validate(&composed.replacements).is_ok());
    composed
  }

  /// Left-folds [`Edit::compose`] over `edits`, starting from the identity.
  pub fn compose_all<'a>(edits: impl IntoIterator<Item = &'a Self>) -> Self
  where
    T: 'a,
  {
    edits
      .into_iter()
      .fold(Self::empty(), |composed, edit| composed.compose(edit))
  }

  /// Projects a per-element array across this edit.
  ///
  /// Elements outside every replacement are copied, elements covered by a
  /// replacement are dropped and each replacement contributes `new_len`
  /// copies of `fill`. The result has `self.new_len(source.len())` elements.
  ///
  /// # Panics
  ///
  /// Panics if a replacement reaches past the end of `source`.
  pub fn apply_array<E: Clone>(&self, source: &[E], fill: E) -> Vec<E> {
    let mut result = Vec::with_capacity(self.new_len(source.len()));
    let mut pos = 0;
    for replacement in &self.replacements {
      result.extend_from_slice(&source[pos..replacement.range.start]);
      result.extend(iter::repeat_n(fill.clone(), replacement.new_len()));
      pos = replacement.range.end;
    }
    result.extend_from_slice(&source[pos..]);
    result
  }

  /// Creates a transformer mapping old offsets to new ones. Queries must be
  /// non-decreasing.
  pub fn index_transformer(&self) -> MonotonousIndexTransformer<'_, T> {
    MonotonousIndexTransformer::new(self)
  }
}

impl<'a, T> IntoIterator for &'a Edit<T> {
  type Item = &'a Replacement<T>;
  type IntoIter = std::slice::Iter<'a, Replacement<T>>;

  fn into_iter(self) -> Self::IntoIter {
    self.replacements.iter()
  }
}

impl<T: ReplacementValue> fmt::Debug for Edit<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(&self.replacements).finish()
  }
}

impl<T: Serialize> Serialize for Edit<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    self.replacements.serialize(serializer)
  }
}

impl<'de, T: ReplacementValue + Deserialize<'de>> Deserialize<'de> for Edit<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let replacements = Vec::<Replacement<T>>::deserialize(deserializer)?;
    Self::try_new(replacements).map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    fixtures::{
      EditSeed,
      text_edit_from_seed,
    },
    length_edit::LengthEdit,
    text::Utf16Text,
    text_edit::TextEdit,
  };

  fn text_edit(replacements: &[(usize, usize, &str)]) -> TextEdit {
    Edit::new(
      replacements
        .iter()
        .map(|&(start, end, text)| Replacement::new(OffsetRange::new(start, end), text.into()))
        .collect(),
    )
  }

  #[test]
  fn try_new_rejects_overlap() {
    let err = LengthEdit::try_new(vec![
      Replacement::new(OffsetRange::new(0, 4), 1),
      Replacement::new(OffsetRange::new(3, 5), 1),
    ])
    .unwrap_err();
    assert_eq!(err, EditError::OverlappingReplacement {
      prev_end: 4,
      start:    3,
      end:      5,
    });
  }

  #[test]
  fn try_new_rejects_reversed_range() {
    let err = LengthEdit::try_new(vec![Replacement::new(OffsetRange { start: 4, end: 2 }, 0)])
      .unwrap_err();
    assert_eq!(err, EditError::InvalidRange { start: 4, end: 2 });
  }

  #[test]
  fn try_new_accepts_touching_replacements() {
    assert!(
      LengthEdit::try_new(vec![
        Replacement::new(OffsetRange::new(0, 4), 1),
        Replacement::new(OffsetRange::new(4, 4), 2),
        Replacement::new(OffsetRange::new(4, 6), 0),
      ])
      .is_ok()
    );
  }

  #[test]
  #[should_panic(expected = "malformed edit")]
  fn new_panics_on_decreasing_replacements() {
    let _ = LengthEdit::new(vec![
      Replacement::new(OffsetRange::new(5, 6), 1),
      Replacement::new(OffsetRange::new(1, 2), 1),
    ]);
  }

  #[test]
  fn try_join_touching_requires_adjacency() {
    let left = Replacement::new(OffsetRange::new(1, 3), Utf16Text::from("ab"));
    let right = Replacement::new(OffsetRange::new(3, 4), Utf16Text::from("c"));
    assert_eq!(
      left.try_join_touching(&right),
      Some(Replacement::new(OffsetRange::new(1, 4), Utf16Text::from("abc")))
    );

    let insertion = Replacement::new(OffsetRange::empty_at(3), Utf16Text::from("x"));
    assert_eq!(
      left.try_join_touching(&insertion),
      Some(Replacement::new(OffsetRange::new(1, 3), Utf16Text::from("abx")))
    );

    let apart = Replacement::new(OffsetRange::new(4, 5), Utf16Text::from("d"));
    assert_eq!(left.try_join_touching(&apart), None);
    assert_eq!(right.try_join_touching(&left), None);
  }

  #[test]
  fn into_replacements_keeps_order() {
    let edit = text_edit(&[(0, 1, "a"), (4, 4, "b")]);
    let replacements = edit.clone().into_replacements();
    assert_eq!(replacements.as_slice(), edit.replacements());
    assert_eq!(replacements[1].range, OffsetRange::empty_at(4));
  }

  #[test]
  fn normalize_joins_touching_and_drops_noops() {
    let edit = text_edit(&[(0, 1, "a"), (1, 3, "b"), (5, 5, ""), (6, 6, "c")]);
    assert_eq!(edit.normalize(), text_edit(&[(0, 3, "ab"), (6, 6, "c")]));
  }

  #[test]
  fn new_ranges_are_in_new_coordinates() {
    let edit = text_edit(&[(1, 3, "xyz"), (5, 5, "q"), (8, 10, "")]);
    assert_eq!(edit.new_ranges(), vec![
      OffsetRange::new(1, 4),
      OffsetRange::new(6, 7),
      OffsetRange::new(10, 10),
    ]);
    assert_eq!(edit.new_len(12), 12);
  }

  #[test]
  fn compose_disjoint_edits() {
    let base = Utf16Text::from("hello world");
    let a = text_edit(&[(0, 5, "goodbye")]);
    let b = text_edit(&[(13, 13, "!")]);

    let composed = a.compose(&b);
    assert_eq!(composed, text_edit(&[(0, 5, "goodbye"), (11, 11, "!")]));
    assert_eq!(composed.apply(&base), "goodbye world!");
  }

  #[test]
  fn compose_into_middle_of_previous_insertion() {
    let a = text_edit(&[(1, 2, "XYZ")]);
    let b = text_edit(&[(2, 3, "Q")]);
    assert_eq!(a.compose(&b), text_edit(&[(1, 2, "XQZ")]));
  }

  #[test]
  fn compose_folds_three_way_overlap() {
    // One replacement of the second edit spans three of the first.
    let base = Utf16Text::from("0123456789");
    let a = text_edit(&[(1, 2, "a"), (3, 5, "bb"), (6, 6, "ccc"), (8, 9, "")]);
    let b = text_edit(&[(1, 9, "Z")]);

    let intermediate = a.apply(&base);
    assert_eq!(intermediate, "0a2bb5ccc679");

    let composed = a.compose(&b);
    assert_eq!(composed.apply(&base), b.apply(&intermediate));
    assert_eq!(composed, text_edit(&[(1, 6, "Z"), (8, 9, "")]));
  }

  #[test]
  fn compose_keeps_suffix_reachable() {
    // `b` first cuts into the middle of a's insertion, then touches its tail.
    let base = Utf16Text::from("ab");
    let a = text_edit(&[(1, 1, "12345")]);
    let b = text_edit(&[(2, 3, "x"), (3, 4, "y")]);

    let composed = a.compose(&b);
    assert_eq!(composed.apply(&base), b.apply(&a.apply(&base)));
    assert_eq!(composed.apply(&base), "a1xy45b");
  }

  #[test]
  fn compose_with_empty() {
    let a = text_edit(&[(0, 1, "x")]);
    assert_eq!(a.compose(&TextEdit::empty()), a);
    assert_eq!(TextEdit::empty().compose(&a), a);
  }

  #[test]
  fn compose_all_folds_from_identity() {
    let base = Utf16Text::from("");
    let edits = [
      text_edit(&[(0, 0, "h")]),
      text_edit(&[(1, 1, "e")]),
      text_edit(&[(2, 2, "y")]),
      text_edit(&[(2, 3, "llo")]),
    ];
    let composed = Edit::compose_all(&edits);
    assert_eq!(composed, text_edit(&[(0, 0, "hello")]));
    assert_eq!(composed.apply(&base), "hello");
    assert_eq!(Edit::compose_all(std::iter::empty::<&TextEdit>()), TextEdit::empty());
  }

  #[test]
  fn serde_validates_on_deserialize() {
    let edit = LengthEdit::replace(OffsetRange::new(1, 3), 4);
    let json = serde_json::to_string(&edit).unwrap();
    assert_eq!(json, r#"[{"range":[1,3],"value":4}]"#);
    assert_eq!(serde_json::from_str::<LengthEdit>(&json).unwrap(), edit);

    let overlapping = r#"[{"range":[1,3],"value":4},{"range":[2,5],"value":0}]"#;
    assert!(serde_json::from_str::<LengthEdit>(overlapping).is_err());
    let reversed = r#"[{"range":[3,1],"value":4}]"#;
    assert!(serde_json::from_str::<LengthEdit>(reversed).is_err());
  }

  quickcheck::quickcheck! {
    fn compose_matches_sequential_application(
      text: String,
      first: Vec<EditSeed>,
      second: Vec<EditSeed>
    ) -> bool {
      let base = Utf16Text::from(text.as_str());
      let a = text_edit_from_seed(base.len(), &first);
      let intermediate = a.apply(&base);
      let b = text_edit_from_seed(intermediate.len(), &second);

      a.compose(&b).apply(&base) == b.apply(&intermediate)
    }

    fn compose_is_associative(
      text: String,
      first: Vec<EditSeed>,
      second: Vec<EditSeed>,
      third: Vec<EditSeed>
    ) -> bool {
      let base = Utf16Text::from(text.as_str());
      let a = text_edit_from_seed(base.len(), &first);
      let d1 = a.apply(&base);
      let b = text_edit_from_seed(d1.len(), &second);
      let d2 = b.apply(&d1);
      let c = text_edit_from_seed(d2.len(), &third);

      let left = a.compose(&b).compose(&c);
      let right = a.compose(&b.compose(&c));
      left.apply(&base) == right.apply(&base)
    }

    fn apply_array_length_law(len: u8, seed: Vec<EditSeed>) -> bool {
      let source: Vec<usize> = (0..len as usize).collect();
      let edit = LengthEdit::from_edit(&text_edit_from_seed(source.len(), &seed));
      edit.apply_array(&source, usize::MAX).len() == edit.new_len(source.len())
    }
  }
}
