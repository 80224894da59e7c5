use crate::{
  edit::{
    Edit,
    Replacement,
  },
  range::OffsetRange,
  text::Utf16Text,
  text_change::TextChange,
  text_edit::TextEdit,
};

/// `(gap, delete, insert)`: skip `gap % 4` units, replace the next
/// `delete % 4` units with `insert`.
pub(crate) type EditSeed = (u8, u8, String);

/// Builds a valid edit over a document of `len` code units from arbitrary
/// quickcheck input.
pub(crate) fn text_edit_from_seed(len: usize, seed: &[EditSeed]) -> TextEdit {
  let mut pos = 0;
  let mut replacements = Vec::with_capacity(seed.len());
  for (gap, delete, insert) in seed {
    let start = pos + *gap as usize % 4;
    if start > len {
      break;
    }
    let end = (start + *delete as usize % 4).min(len);
    replacements.push(Replacement::new(
      OffsetRange::new(start, end),
      Utf16Text::from(insert.as_str()),
    ));
    pos = end;
  }
  Edit::new(replacements)
}

/// Builds a batch of changes from `(start, end, text)` triples on `text`.
pub(crate) fn changes(text: &str, replacements: &[(usize, usize, &str)]) -> Vec<TextChange> {
  let edit = TextEdit::new(
    replacements
      .iter()
      .map(|&(start, end, insert)| Replacement::new(OffsetRange::new(start, end), insert.into()))
      .collect(),
  );
  edit.to_text_changes(&Utf16Text::from(text))
}
