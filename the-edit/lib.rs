//! Edit algebra for incremental editor updates.
//!
//! The editor records every modification as a list of range replacements.
//! This crate represents those lists, combines and inverts them, maps
//! offsets of interest (cursors, decorations, tokens) across them, and
//! compresses consecutive change batches so undo history and incremental
//! re-tokenization stay bounded no matter how many keystrokes went in.
//!
//! - [`range`]: half-open [`OffsetRange`]s.
//! - [`edit`]: the generic [`Edit`] / [`Replacement`] algebra.
//! - [`length_edit`]: [`LengthEdit`], edits that only know new lengths.
//! - [`text_edit`]: [`TextEdit`], edits that carry the new text.
//! - [`text_change`]: [`TextChange`] batches with old and new text.
//! - [`wire`]: the binary form of [`TextChange`] batches.
//! - [`compress`]: merging two consecutive batches into one.
//! - [`index_transformer`]: mapping old offsets to new ones.
//!
//! All lengths and offsets of text are in UTF-16 code units. The crate never
//! touches a live document; it only sees the replacements and text slices
//! handed to it.

pub mod compress;
pub mod edit;
pub mod index_transformer;
pub mod length_edit;
pub mod range;
pub mod text;
pub mod text_change;
pub mod text_edit;
pub mod wire;

#[cfg(test)]
mod fixtures;

pub use compress::compress_consecutive_text_changes;
pub use edit::{
  Edit,
  EditError,
  Replacement,
  ReplacementValue,
};
pub use index_transformer::{
  CombinedIndexTransformer,
  IndexTransformer,
  MonotonousIndexTransformer,
  TransformedIndex,
};
pub use length_edit::{
  LengthEdit,
  LengthReplacement,
};
pub use range::OffsetRange;
pub use text::Utf16Text;
pub use text_change::{
  TextChange,
  replay_backward,
  replay_forward,
};
pub use text_edit::{
  TextEdit,
  TextReplacement,
};
pub use wire::{
  ByteOrder,
  WireError,
  WireFormat,
  decode_batch,
  encode_batch,
};
