//! Mapping offsets across edits.
//!
//! Decorations, tokens and cursors are stored as offsets into the old
//! document. After an edit they either move by the length delta of every
//! replacement before them, or disappear because a replacement covered them.
//!
//! Queries usually arrive in increasing order (a sorted decoration list, a
//! token stream), so the transformers here keep a cursor into the
//! replacement list and never walk back. A non-monotonic query sequence
//! needs a fresh transformer.
//!
//! ```ignore
//! let mut transformer = edit.index_transformer();
//! for token in &mut tokens {
//!   match transformer.transform(token.start).index() {
//!     Some(start) => token.start = start,
//!     None => token.invalidate(),
//!   }
//! }
//! ```

use std::fmt;

use crate::{
  edit::{
    Edit,
    ReplacementValue,
  },
  range::shift,
};

/// Where an old offset ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformedIndex {
  /// Before every replacement; the offset is unchanged.
  Untouched(usize),
  /// After at least one replacement; the offset moved by their length delta.
  Shifted(usize),
  /// Inside a replaced range. There is no corresponding new offset.
  Destroyed,
}

impl TransformedIndex {
  #[inline]
  pub fn index(self) -> Option<usize> {
    match self {
      TransformedIndex::Untouched(index) | TransformedIndex::Shifted(index) => Some(index),
      TransformedIndex::Destroyed => None,
    }
  }

  #[inline]
  pub fn is_destroyed(self) -> bool {
    matches!(self, TransformedIndex::Destroyed)
  }
}

pub trait IndexTransformer {
  /// Maps `index` from the old document to the new one.
  ///
  /// Successive calls on the same transformer must pass non-decreasing
  /// indices.
  fn transform(&mut self, index: usize) -> TransformedIndex;
}

/// Maps offsets across a single edit.
#[derive(Clone)]
pub struct MonotonousIndexTransformer<'a, T> {
  edit:       &'a Edit<T>,
  /// First replacement that does not end at or before the last query.
  idx:        usize,
  /// Length delta of the replacements before `idx`.
  offset:     isize,
  last_index: Option<usize>,
}

impl<'a, T: ReplacementValue> MonotonousIndexTransformer<'a, T> {
  pub fn new(edit: &'a Edit<T>) -> Self {
    Self {
      edit,
      idx: 0,
      offset: 0,
      last_index: None,
    }
  }
}

impl<T: ReplacementValue> fmt::Debug for MonotonousIndexTransformer<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MonotonousIndexTransformer")
      .field("replacements", &self.edit.len())
      .field("idx", &self.idx)
      .field("offset", &self.offset)
      .finish()
  }
}

impl<T: ReplacementValue> IndexTransformer for MonotonousIndexTransformer<'_, T> {
  fn transform(&mut self, index: usize) -> TransformedIndex {
    debug_assert!(
      self.last_index.is_none_or(|last| last <= index),
      "index transformer queried out of order: {index} after {:?}",
      self.last_index
    );
    self.last_index = Some(index);

    let replacements = self.edit.replacements();
    while let Some(replacement) = replacements.get(self.idx) {
      if replacement.range.end > index {
        break;
      }
      self.offset += replacement.delta();
      self.idx += 1;
    }

    if replacements
      .get(self.idx)
      .is_some_and(|replacement| replacement.range.start <= index)
    {
      return TransformedIndex::Destroyed;
    }

    if self.idx == 0 {
      TransformedIndex::Untouched(index)
    } else {
      TransformedIndex::Shifted(shift(index, self.offset))
    }
  }
}

/// Maps offsets across a chain of edits, one stage per edit.
///
/// This answers offset queries without composing the edits first. Stage `i`
/// maps from the output of stage `i - 1`, and a destroyed offset stays
/// destroyed.
#[derive(Default)]
pub struct CombinedIndexTransformer<'a> {
  stages: Vec<Box<dyn IndexTransformer + 'a>>,
}

impl<'a> CombinedIndexTransformer<'a> {
  pub fn new() -> Self {
    Self { stages: Vec::new() }
  }

  /// One stage per edit, applied in iteration order.
  pub fn from_many<T: ReplacementValue + 'a>(edits: impl IntoIterator<Item = &'a Edit<T>>) -> Self {
    let mut combined = Self::new();
    for edit in edits {
      combined.push(MonotonousIndexTransformer::new(edit));
    }
    combined
  }

  /// Appends a stage that runs after every existing one.
  pub fn push(&mut self, stage: impl IndexTransformer + 'a) {
    self.stages.push(Box::new(stage));
  }

  #[must_use]
  pub fn with_stage(mut self, stage: impl IndexTransformer + 'a) -> Self {
    self.push(stage);
    self
  }

  pub fn len(&self) -> usize {
    self.stages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }
}

impl IndexTransformer for CombinedIndexTransformer<'_> {
  fn transform(&mut self, index: usize) -> TransformedIndex {
    let mut result = TransformedIndex::Untouched(index);
    for stage in &mut self.stages {
      let Some(current) = result.index() else {
        break;
      };
      result = match (result, stage.transform(current)) {
        (_, TransformedIndex::Destroyed) => TransformedIndex::Destroyed,
        (TransformedIndex::Untouched(_), next) => next,
        (_, next) => TransformedIndex::Shifted(next.index().unwrap_or(current)),
      };
    }
    result
  }
}
