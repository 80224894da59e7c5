//! Compression of consecutive [`TextChange`] batches.
//!
//! Every keystroke produces a batch. Keeping them all would make undo stacks
//! and incremental re-tokenization grow with the number of keystrokes, so
//! consecutive batches are merged into one batch describing the same net
//! change.
//!
//! `first` turns `D0` into `D1` and `second` turns `D1` into `D2`. Both are
//! sorted and non-overlapping. The walk keeps one cursor into each batch:
//!
//! - `first` changes live in `D0` (old side) and `D1` (new side),
//! - `second` changes live in `D1` (old side) and `D2` (new side).
//!
//! `D1` is the shared coordinate system. A change of `first` that ends before
//! the current change of `second` starts is emitted with its new position
//! moved into `D2`; a change of `second` that ends before the current change
//! of `first` starts is emitted with its old position moved back into `D0`.
//! Where the two meet, the change that starts earlier is split at the
//! meeting point and the overlapping parts are merged into one change whose
//! old text comes from `first` and whose new text comes from `second`.

use crate::{
  range::{
    len_delta,
    shift,
  },
  text::Utf16Text,
  text_change::TextChange,
};

/// Merges two consecutive batches into one minimal batch.
///
/// Replaying the result forward over `D0` yields `D2`, and replaying it
/// backward over `D2` yields `D0`. The inputs are not validated.
pub fn compress_consecutive_text_changes(
  first: &[TextChange],
  second: &[TextChange],
) -> Vec<TextChange> {
  if first.is_empty() || second.is_empty() {
    let only = if first.is_empty() { second } else { first };
    return remove_noops(join_touching(only.to_vec()));
  }

  let compressed = Compressor::new(first, second).compress();
  tracing::trace!(
    first = first.len(),
    second = second.len(),
    compressed = compressed.len(),
    "compressed consecutive text changes"
  );
  compressed
}

struct Compressor<'a> {
  first:        std::slice::Iter<'a, TextChange>,
  second:       std::slice::Iter<'a, TextChange>,
  result:       Vec<TextChange>,
  /// Length delta of the `first` changes emitted so far (`D0` -> `D1`).
  first_delta:  isize,
  /// Length delta of the `second` changes emitted so far (`D1` -> `D2`).
  second_delta: isize,
}

impl<'a> Compressor<'a> {
  fn new(first: &'a [TextChange], second: &'a [TextChange]) -> Self {
    Self {
      first:        first.iter(),
      second:       second.iter(),
      result:       Vec::with_capacity(first.len() + second.len()),
      first_delta:  0,
      second_delta: 0,
    }
  }

  fn compress(mut self) -> Vec<TextChange> {
    let mut prev = self.first.next().cloned();
    let mut curr = self.second.next().cloned();

    loop {
      let (p, c) = match (prev, curr) {
        (None, None) => break,
        (Some(p), None) => {
          self.accept_first(p);
          prev = self.first.next().cloned();
          curr = None;
          continue;
        },
        (None, Some(c)) => {
          self.accept_second(c);
          prev = None;
          curr = self.second.next().cloned();
          continue;
        },
        (Some(p), Some(c)) => (p, c),
      };

      // Both sides are compared in D1: `p.new_*` and `c.old_*`.
      if c.old_end() <= p.new_position {
        self.accept_second(c);
        prev = Some(p);
        curr = self.second.next().cloned();
        continue;
      }
      if p.new_end() <= c.old_position {
        self.accept_first(p);
        prev = self.first.next().cloned();
        curr = Some(c);
        continue;
      }
      if c.old_position < p.new_position {
        let (head, tail) = split_second(&c, p.new_position - c.old_position);
        self.accept_second(head);
        prev = Some(p);
        curr = Some(tail);
        continue;
      }
      if p.new_position < c.old_position {
        let (head, tail) = split_first(&p, c.old_position - p.new_position);
        self.accept_first(head);
        prev = Some(tail);
        curr = Some(c);
        continue;
      }

      // Both start at the same D1 offset: merge the overlapping parts.
      let (merge_prev, merge_curr);
      if c.old_end() == p.new_end() {
        merge_prev = p;
        merge_curr = c;
        prev = self.first.next().cloned();
        curr = self.second.next().cloned();
      } else if c.old_end() < p.new_end() {
        let (head, tail) = split_first(&p, c.old_len());
        merge_prev = head;
        merge_curr = c;
        prev = Some(tail);
        curr = self.second.next().cloned();
      } else {
        let (head, tail) = split_second(&c, p.new_len());
        merge_prev = p;
        merge_curr = head;
        prev = self.first.next().cloned();
        curr = Some(tail);
      }

      self.first_delta += len_delta(merge_prev.new_len(), merge_prev.old_len());
      self.second_delta += len_delta(merge_curr.new_len(), merge_curr.old_len());
      self.result.push(TextChange {
        old_position: merge_prev.old_position,
        old_text:     merge_prev.old_text,
        new_position: merge_curr.new_position,
        new_text:     merge_curr.new_text,
      });
    }

    remove_noops(join_touching(self.result))
  }

  /// Emits a change of `first`, moving its new position into D2.
  fn accept_first(&mut self, change: TextChange) {
    self.first_delta += len_delta(change.new_len(), change.old_len());
    self.result.push(TextChange {
      new_position: shift(change.new_position, self.second_delta),
      ..change
    });
  }

  /// Emits a change of `second`, moving its old position back into D0.
  fn accept_second(&mut self, change: TextChange) {
    self.second_delta += len_delta(change.new_len(), change.old_len());
    self.result.push(TextChange {
      old_position: shift(change.old_position, -self.first_delta),
      ..change
    });
  }
}

/// Splits a change of `first` after `offset` units of its new text. The tail
/// is a pure insertion at the end of the old range.
fn split_first(change: &TextChange, offset: usize) -> (TextChange, TextChange) {
  let (head_text, tail_text) = change.new_text.split_at(offset);
  let head = TextChange {
    old_position: change.old_position,
    old_text:     change.old_text.clone(),
    new_position: change.new_position,
    new_text:     head_text,
  };
  let tail = TextChange {
    old_position: change.old_end(),
    old_text:     Utf16Text::new(),
    new_position: change.new_position + offset,
    new_text:     tail_text,
  };
  (head, tail)
}

/// Splits a change of `second` after `offset` units of its old text. The
/// tail is a pure deletion at the end of the new range.
fn split_second(change: &TextChange, offset: usize) -> (TextChange, TextChange) {
  let (head_text, tail_text) = change.old_text.split_at(offset);
  let head = TextChange {
    old_position: change.old_position,
    old_text:     head_text,
    new_position: change.new_position,
    new_text:     change.new_text.clone(),
  };
  let tail = TextChange {
    old_position: change.old_position + offset,
    old_text:     tail_text,
    new_position: change.new_end(),
    new_text:     Utf16Text::new(),
  };
  (head, tail)
}

fn join_touching(changes: Vec<TextChange>) -> Vec<TextChange> {
  let mut joined: Vec<TextChange> = Vec::with_capacity(changes.len());
  for change in changes {
    match joined.last_mut() {
      Some(last) if last.old_end() == change.old_position => {
        last.old_text.push_text(&change.old_text);
        last.new_text.push_text(&change.new_text);
      },
      _ => joined.push(change),
    }
  }
  joined
}

fn remove_noops(mut changes: Vec<TextChange>) -> Vec<TextChange> {
  changes.retain(|change| !change.is_noop());
  changes
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    fixtures::{
      EditSeed,
      changes,
      text_edit_from_seed,
    },
    text_change::{
      replay_backward,
      replay_forward,
    },
  };

  fn assert_equivalent(text: &str, first: &[TextChange], second: &[TextChange]) -> Vec<TextChange> {
    let d0 = Utf16Text::from(text);
    let d1 = replay_forward(&d0, first);
    let d2 = replay_forward(&d1, second);

    let compressed = compress_consecutive_text_changes(first, second);
    assert_eq!(replay_forward(&d0, &compressed), d2, "forward: {compressed:?}");
    assert_eq!(replay_backward(&d2, &compressed), d0, "backward: {compressed:?}");
    compressed
  }

  #[test]
  fn typing_two_characters() {
    let first = changes("", &[(0, 0, "h")]);
    let second = changes("h", &[(1, 1, "e")]);

    let compressed = assert_equivalent("", &first, &second);
    assert_eq!(compressed, vec![TextChange::new(0, "", 0, "he")]);
  }

  #[test]
  fn interleaved_batches() {
    let first = changes("abcdefghij", &[(0, 3, "qh"), (5, 5, "1"), (8, 10, "X")]);
    // D1 = "qhde1fghX"
    let second = changes("qhde1fghX", &[(1, 1, "Z"), (3, 6, "Y")]);

    let compressed = assert_equivalent("abcdefghij", &first, &second);
    // D2 = "qZhdYghX"
    assert_eq!(compressed, vec![
      TextChange::new(0, "abc", 0, "qZh"),
      TextChange::new(4, "ef", 4, "Y"),
      TextChange::new(8, "ij", 7, "X"),
    ]);
  }

  #[test]
  fn second_batch_undoes_first() {
    let first = changes("abc", &[(1, 2, "xyz")]);
    let second = changes("axyzc", &[(1, 4, "b")]);

    let compressed = assert_equivalent("abc", &first, &second);
    assert!(compressed.is_empty(), "{compressed:?}");
  }

  #[test]
  fn deletion_spanning_several_changes() {
    let first = changes("0123456789", &[(1, 2, "a"), (4, 4, "bb"), (7, 9, "")]);
    // D1 = "0a23bb4569"
    let second = changes("0a23bb4569", &[(0, 9, "")]);

    let compressed = assert_equivalent("0123456789", &first, &second);
    assert_eq!(compressed, vec![TextChange::new(0, "012345678", 0, "")]);
  }

  #[test]
  fn disjoint_batches_pass_through() {
    let first = changes("abcdef", &[(0, 1, "A")]);
    let second = changes("Abcdef", &[(4, 5, "E")]);

    let compressed = assert_equivalent("abcdef", &first, &second);
    assert_eq!(compressed, vec![
      TextChange::new(0, "a", 0, "A"),
      TextChange::new(4, "e", 4, "E"),
    ]);
  }

  #[test]
  fn empty_inputs() {
    let batch = changes("abc", &[(1, 2, "x")]);
    assert_eq!(compress_consecutive_text_changes(&batch, &[]), batch);
    assert_eq!(compress_consecutive_text_changes(&[], &batch), batch);
    assert!(compress_consecutive_text_changes(&[], &[]).is_empty());
  }

  #[test]
  fn single_batch_is_still_minimized() {
    let batch = vec![
      TextChange::new(0, "ab", 0, "x"),
      TextChange::new(2, "cd", 1, "y"),
      TextChange::new(5, "f", 3, "f"),
    ];
    let expected = vec![TextChange::new(0, "abcd", 0, "xy")];
    assert_eq!(compress_consecutive_text_changes(&batch, &[]), expected);
    assert_eq!(compress_consecutive_text_changes(&[], &batch), expected);
  }

  quickcheck::quickcheck! {
    fn compression_is_equivalent(
      text: String,
      first_seed: Vec<EditSeed>,
      second_seed: Vec<EditSeed>
    ) -> bool {
      let d0 = Utf16Text::from(text.as_str());
      let first_edit = text_edit_from_seed(d0.len(), &first_seed);
      let first = first_edit.to_text_changes(&d0);
      let d1 = first_edit.apply(&d0);
      let second_edit = text_edit_from_seed(d1.len(), &second_seed);
      let second = second_edit.to_text_changes(&d1);
      let d2 = second_edit.apply(&d1);

      let compressed = compress_consecutive_text_changes(&first, &second);
      replay_forward(&d0, &compressed) == d2 && replay_backward(&d2, &compressed) == d0
    }
  }
}
