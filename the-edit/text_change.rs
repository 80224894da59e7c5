//! Concrete text changes.
//!
//! A [`TextChange`] records one replacement with both its old and its new
//! content, positioned in both coordinate systems: `old_position` in the
//! document before the batch, `new_position` in the document after it.
//! Having both texts makes a change self-inverting, which is what undo
//! stacks and cross-process consumers need.

use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};

use crate::text::Utf16Text;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextChange {
  pub old_position: usize,
  pub old_text:     Utf16Text,
  pub new_position: usize,
  pub new_text:     Utf16Text,
}

impl TextChange {
  pub fn new(
    old_position: usize,
    old_text: impl Into<Utf16Text>,
    new_position: usize,
    new_text: impl Into<Utf16Text>,
  ) -> Self {
    Self {
      old_position,
      old_text: old_text.into(),
      new_position,
      new_text: new_text.into(),
    }
  }

  #[inline]
  pub fn old_len(&self) -> usize {
    self.old_text.len()
  }

  #[inline]
  pub fn old_end(&self) -> usize {
    self.old_position + self.old_len()
  }

  #[inline]
  pub fn new_len(&self) -> usize {
    self.new_text.len()
  }

  #[inline]
  pub fn new_end(&self) -> usize {
    self.new_position + self.new_len()
  }

  /// A change that leaves the text as it was.
  #[inline]
  pub fn is_noop(&self) -> bool {
    self.old_text == self.new_text
  }

  /// The change that undoes this one.
  #[must_use]
  pub fn inverted(&self) -> Self {
    Self {
      old_position: self.new_position,
      old_text:     self.new_text.clone(),
      new_position: self.old_position,
      new_text:     self.old_text.clone(),
    }
  }
}

impl fmt::Display for TextChange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.old_text.is_empty() {
      write!(f, "(insert@{} {:?})", self.old_position, self.new_text)
    } else if self.new_text.is_empty() {
      write!(f, "(delete@{} {:?})", self.old_position, self.old_text)
    } else {
      write!(
        f,
        "(replace@{} {:?} with {:?})",
        self.old_position, self.old_text, self.new_text
      )
    }
  }
}

/// Applies a batch to the text it was recorded against.
///
/// Changes are replayed from the highest old position down, so earlier
/// changes never see offsets shifted by later ones.
///
/// # Panics
///
/// Panics if a change reaches past the end of `text`.
pub fn replay_forward(text: &Utf16Text, changes: &[TextChange]) -> Utf16Text {
  let mut text = text.clone();
  for change in changes.iter().rev() {
    text.splice(change.old_position..change.old_end(), &change.new_text);
  }
  text
}

/// Undoes a batch on the text it produced.
///
/// # Panics
///
/// Panics if a change reaches past the end of `text`.
pub fn replay_backward(text: &Utf16Text, changes: &[TextChange]) -> Utf16Text {
  let mut text = text.clone();
  for change in changes.iter().rev() {
    text.splice(change.new_position..change.new_end(), &change.old_text);
  }
  text
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::fixtures::changes;

  #[test]
  fn lengths_and_ends() {
    let change = TextChange::new(3, "abc", 5, "𝄞");
    assert_eq!(change.old_len(), 3);
    assert_eq!(change.old_end(), 6);
    assert_eq!(change.new_len(), 2);
    assert_eq!(change.new_end(), 7);
  }

  #[test]
  fn display() {
    assert_eq!(
      TextChange::new(1, "", 1, "x").to_string(),
      r#"(insert@1 "x")"#
    );
    assert_eq!(
      TextChange::new(1, "ab", 1, "").to_string(),
      r#"(delete@1 "ab")"#
    );
    assert_eq!(
      TextChange::new(1, "ab", 1, "c").to_string(),
      r#"(replace@1 "ab" with "c")"#
    );
  }

  #[test]
  fn replay_both_directions() {
    let original = Utf16Text::from("abcdefghij");
    let batch = changes("abcdefghij", &[(0, 3, "qh"), (5, 5, "1"), (8, 10, "X")]);

    let edited = replay_forward(&original, &batch);
    assert_eq!(edited, "qhde1fghX");
    assert_eq!(replay_backward(&edited, &batch), original);
  }

  #[test]
  fn inverted_swaps_sides() {
    let change = TextChange::new(2, "ab", 4, "xyz");
    assert_eq!(change.inverted(), TextChange::new(4, "xyz", 2, "ab"));
    assert_eq!(change.inverted().inverted(), change);
  }
}
