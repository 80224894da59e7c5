//! UTF-16 code-unit text.
//!
//! Text payloads are measured and sliced in UTF-16 code units so that offsets
//! line up with the editor's buffer coordinates and so that unpaired
//! surrogates survive slicing, composition and the wire format unchanged. A
//! Rust `String` cannot hold an unpaired surrogate, so the payload keeps the
//! raw code units and only decodes on demand.

use std::{
  fmt,
  ops::Range,
};

use serde::{
  Deserialize,
  Serialize,
};
use smallvec::SmallVec;

use crate::range::OffsetRange;

/// Most keystroke payloads are a handful of code units.
const INLINE_UNITS: usize = 8;

#[derive(Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Utf16Text {
  units: SmallVec<[u16; INLINE_UNITS]>,
}

impl Utf16Text {
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_units(units: &[u16]) -> Self {
    Self {
      units: SmallVec::from_slice(units),
    }
  }

  #[inline]
  pub fn as_units(&self) -> &[u16] {
    &self.units
  }

  /// Length in code units.
  #[inline]
  pub fn len(&self) -> usize {
    self.units.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.units.is_empty()
  }

  /// Copies the code units in `range`.
  ///
  /// # Panics
  ///
  /// Panics if `range` extends past the end of the text.
  #[must_use]
  pub fn slice(&self, range: impl Into<OffsetRange>) -> Self {
    let range: OffsetRange = range.into();
    Self::from_units(range.slice(&self.units))
  }

  /// Splits the text at `offset`, returning the prefix and the suffix.
  pub fn split_at(&self, offset: usize) -> (Self, Self) {
    let (head, tail) = self.units.split_at(offset);
    (Self::from_units(head), Self::from_units(tail))
  }

  pub fn push_text(&mut self, other: &Self) {
    self.units.extend_from_slice(&other.units);
  }

  /// Replaces the code units in `range` with `replacement`.
  pub fn splice(&mut self, range: impl Into<OffsetRange>, replacement: &Self) {
    let range: OffsetRange = range.into();
    let range: Range<usize> = range.into();
    self
      .units
      .insert_many(range.end, replacement.units.iter().copied());
    self.units.drain(range);
  }

  /// Decodes the text, replacing unpaired surrogates with `U+FFFD`.
  pub fn to_string_lossy(&self) -> String {
    String::from_utf16_lossy(&self.units)
  }

  /// Decodes the text, failing on unpaired surrogates.
  pub fn to_string_checked(&self) -> Option<String> {
    String::from_utf16(&self.units).ok()
  }
}

impl From<&str> for Utf16Text {
  fn from(text: &str) -> Self {
    Self {
      units: text.encode_utf16().collect(),
    }
  }
}

impl From<String> for Utf16Text {
  fn from(text: String) -> Self {
    Self::from(text.as_str())
  }
}

impl From<&[u16]> for Utf16Text {
  fn from(units: &[u16]) -> Self {
    Self::from_units(units)
  }
}

impl FromIterator<u16> for Utf16Text {
  fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
    Self {
      units: iter.into_iter().collect(),
    }
  }
}

impl PartialEq<str> for Utf16Text {
  fn eq(&self, other: &str) -> bool {
    self.units.iter().copied().eq(other.encode_utf16())
  }
}

impl PartialEq<&str> for Utf16Text {
  fn eq(&self, other: &&str) -> bool {
    self == *other
  }
}

impl fmt::Debug for Utf16Text {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.to_string_checked() {
      Some(text) => fmt::Debug::fmt(&text, f),
      None => write!(f, "{:04x?}", self.units.as_slice()),
    }
  }
}

impl fmt::Display for Utf16Text {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_string_lossy())
  }
}
