use the_edit::{
  OffsetRange,
  Replacement,
  TextEdit,
  Utf16Text,
};

const MAX_INITIAL_UNITS: usize = 4 * 1024;
const MAX_OPS: usize = 64;
const MAX_INSERT_UNITS: usize = 32;

#[derive(Debug, Clone)]
pub struct EditOp {
  pub gap:    u16,
  pub delete: u16,
  pub insert: Vec<u16>,
}

pub struct Scenario {
  pub initial: Utf16Text,
  pub first:   Vec<EditOp>,
  pub second:  Vec<EditOp>,
}

pub fn scenario_from_bytes(data: &[u8]) -> Scenario {
  let mut cursor = ByteCursor::new(data);
  let initial_len = cursor.next_usize(MAX_INITIAL_UNITS);
  let initial = cursor.next_units(initial_len);
  let first = decode_ops(&mut cursor);
  let second = decode_ops(&mut cursor);

  Scenario {
    initial,
    first,
    second,
  }
}

/// Turns ops into a valid edit over a document of `len` code units. Offsets
/// are clamped so that every op lands inside the document.
pub fn edit_from_ops(len: usize, ops: &[EditOp]) -> TextEdit {
  let mut pos = 0;
  let mut replacements = Vec::with_capacity(ops.len());
  for op in ops {
    let room = len - pos;
    let start = pos + (op.gap as usize) % (room + 1);
    let delete = (op.delete as usize) % (len - start + 1);
    let end = start + delete;
    replacements.push(Replacement::new(
      OffsetRange::new(start, end),
      Utf16Text::from_units(&op.insert),
    ));
    pos = end;
  }
  TextEdit::new(replacements)
}

fn decode_ops(cursor: &mut ByteCursor<'_>) -> Vec<EditOp> {
  let op_count = cursor.next_usize(MAX_OPS);
  let mut ops = Vec::with_capacity(op_count);
  for _ in 0..op_count {
    let gap = cursor.next_u16();
    let delete = cursor.next_u16();
    let insert_len = cursor.next_usize(MAX_INSERT_UNITS);
    let insert = cursor.next_units(insert_len).as_units().to_vec();
    ops.push(EditOp {
      gap,
      delete,
      insert,
    });
  }
  ops
}

struct ByteCursor<'a> {
  data: &'a [u8],
  pos:  usize,
}

impl<'a> ByteCursor<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }

  fn next_u8(&mut self) -> u8 {
    let value = self.data.get(self.pos).copied().unwrap_or(0);
    self.pos = self.pos.saturating_add(1);
    value
  }

  fn next_u16(&mut self) -> u16 {
    let lo = self.next_u8() as u16;
    let hi = self.next_u8() as u16;
    lo | (hi << 8)
  }

  fn next_usize(&mut self, max: usize) -> usize {
    if max == 0 {
      return 0;
    }
    (self.next_u16() as usize) % (max + 1)
  }

  /// Reads up to `len` code units, stopping early at the end of the input.
  /// Lone surrogates are kept.
  fn next_units(&mut self, len: usize) -> Utf16Text {
    let available = self.data.len().saturating_sub(self.pos) / 2;
    (0..len.min(available)).map(|_| self.next_u16()).collect()
  }
}
