//! Binary form of [`TextChange`] batches.
//!
//! Batches move between the editor and its workers as plain bytes. The
//! layout is fixed-width so that both ends can size buffers up front.
//!
//! # Record
//!
//! ```text
//! old_position u32
//! old_len      u32   (in code units)
//! new_position u32
//! new_len      u32   (in code units)
//! old_text     old_len x u16
//! new_text     new_len x u16
//! ```
//!
//! Text is stored as raw UTF-16 code units, so unpaired surrogates survive a
//! round trip.
//!
//! # Batch
//!
//! ```text
//! version    u8    (currently 1)
//! byte_order u8    (0 = little endian, 1 = big endian)
//! count      u32
//! records    count x record
//! ```
//!
//! All integers use the byte order named in the header. A reader configured
//! for a different byte order or version rejects the batch instead of
//! guessing.

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::{
  text::Utf16Text,
  text_change::TextChange,
};

pub type Result<T> = std::result::Result<T, WireError>;

pub const WIRE_VERSION: u8 = 1;

const RECORD_HEADER_SIZE: usize = 4 * 4;
const BATCH_HEADER_SIZE: usize = 1 + 1 + 4;
const UNIT_SIZE: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireError {
  #[error("unexpected end of buffer: needed {needed} bytes, {available} available")]
  UnexpectedEof { needed: usize, available: usize },
  #[error("buffer too small: needed {needed} bytes, {available} available")]
  BufferTooSmall { needed: usize, available: usize },
  #[error("unsupported wire format version {0}")]
  UnsupportedVersion(u8),
  #[error("unknown byte order marker {0}")]
  InvalidByteOrder(u8),
  #[error("byte order mismatch: expected {expected:?}, found {found:?}")]
  ByteOrderMismatch {
    expected: ByteOrder,
    found:    ByteOrder,
  },
  #[error("value {0} does not fit in a 32-bit field")]
  LengthOverflow(usize),
  #[error("{0} trailing bytes after the last record")]
  TrailingBytes(usize),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
  #[default]
  Little,
  Big,
}

impl ByteOrder {
  fn marker(self) -> u8 {
    match self {
      ByteOrder::Little => 0,
      ByteOrder::Big => 1,
    }
  }

  fn from_marker(marker: u8) -> Result<Self> {
    match marker {
      0 => Ok(ByteOrder::Little),
      1 => Ok(ByteOrder::Big),
      other => Err(WireError::InvalidByteOrder(other)),
    }
  }

  fn u16_to_bytes(self, value: u16) -> [u8; 2] {
    match self {
      ByteOrder::Little => value.to_le_bytes(),
      ByteOrder::Big => value.to_be_bytes(),
    }
  }

  fn u16_from_bytes(self, bytes: [u8; 2]) -> u16 {
    match self {
      ByteOrder::Little => u16::from_le_bytes(bytes),
      ByteOrder::Big => u16::from_be_bytes(bytes),
    }
  }

  fn u32_to_bytes(self, value: u32) -> [u8; 4] {
    match self {
      ByteOrder::Little => value.to_le_bytes(),
      ByteOrder::Big => value.to_be_bytes(),
    }
  }

  fn u32_from_bytes(self, bytes: [u8; 4]) -> u32 {
    match self {
      ByteOrder::Little => u32::from_le_bytes(bytes),
      ByteOrder::Big => u32::from_be_bytes(bytes),
    }
  }
}

/// Settings both ends of a channel must agree on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFormat {
  pub byte_order: ByteOrder,
}

impl WireFormat {
  pub fn new(byte_order: ByteOrder) -> Self {
    Self { byte_order }
  }
}

struct Writer<'a> {
  buffer:     &'a mut [u8],
  pos:        usize,
  byte_order: ByteOrder,
}

impl Writer<'_> {
  fn put(&mut self, bytes: &[u8]) {
    self.buffer[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
    self.pos += bytes.len();
  }

  fn put_u8(&mut self, value: u8) {
    self.put(&[value]);
  }

  fn put_u32(&mut self, value: u32) {
    let bytes = self.byte_order.u32_to_bytes(value);
    self.put(&bytes);
  }

  fn put_text(&mut self, text: &Utf16Text) {
    for &unit in text.as_units() {
      let bytes = self.byte_order.u16_to_bytes(unit);
      self.put(&bytes);
    }
  }
}

struct Reader<'a> {
  buffer:     &'a [u8],
  pos:        usize,
  byte_order: ByteOrder,
}

impl<'a> Reader<'a> {
  fn remaining(&self) -> usize {
    self.buffer.len().saturating_sub(self.pos)
  }

  fn take(&mut self, needed: usize) -> Result<&'a [u8]> {
    let available = self.remaining();
    if needed > available {
      return Err(WireError::UnexpectedEof { needed, available });
    }
    let bytes = &self.buffer[self.pos..self.pos + needed];
    self.pos += needed;
    Ok(bytes)
  }

  fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
    let mut array = [0; N];
    array.copy_from_slice(self.take(N)?);
    Ok(array)
  }

  fn u8(&mut self) -> Result<u8> {
    let [value] = self.take_array()?;
    Ok(value)
  }

  fn u32(&mut self) -> Result<usize> {
    let bytes = self.take_array()?;
    Ok(self.byte_order.u32_from_bytes(bytes) as usize)
  }

  fn text(&mut self, units: usize) -> Result<Utf16Text> {
    let needed = units
      .checked_mul(UNIT_SIZE)
      .ok_or(WireError::LengthOverflow(units))?;
    let byte_order = self.byte_order;
    Ok(
      self
        .take(needed)?
        .chunks_exact(UNIT_SIZE)
        .map(|pair| byte_order.u16_from_bytes([pair[0], pair[1]]))
        .collect(),
    )
  }
}

fn to_u32(value: usize) -> Result<u32> {
  u32::try_from(value).map_err(|_| WireError::LengthOverflow(value))
}

impl TextChange {
  /// Exact number of bytes [`TextChange::write`] produces.
  pub fn write_size(&self) -> usize {
    RECORD_HEADER_SIZE + UNIT_SIZE * (self.old_len() + self.new_len())
  }

  /// Writes this change at `offset` in little-endian order and returns the
  /// number of bytes written.
  pub fn write(&self, buffer: &mut [u8], offset: usize) -> Result<usize> {
    self.write_with(WireFormat::default(), buffer, offset)
  }

  pub fn write_with(&self, format: WireFormat, buffer: &mut [u8], offset: usize) -> Result<usize> {
    let needed = self.write_size();
    let available = buffer.len().saturating_sub(offset);
    if needed > available {
      return Err(WireError::BufferTooSmall { needed, available });
    }

    let header = [
      to_u32(self.old_position)?,
      to_u32(self.old_len())?,
      to_u32(self.new_position)?,
      to_u32(self.new_len())?,
    ];
    let mut writer = Writer {
      buffer,
      pos: offset,
      byte_order: format.byte_order,
    };
    for field in header {
      writer.put_u32(field);
    }
    writer.put_text(&self.old_text);
    writer.put_text(&self.new_text);

    debug_assert_eq!(writer.pos - offset, needed);
    Ok(needed)
  }

  /// Reads little-endian changes from `offset` to the end of `buffer`,
  /// appends them to `out` and returns the number of bytes consumed.
  ///
  /// Nothing is appended when any record is truncated.
  pub fn read(buffer: &[u8], offset: usize, out: &mut Vec<TextChange>) -> Result<usize> {
    Self::read_with(WireFormat::default(), buffer, offset, out)
  }

  pub fn read_with(
    format: WireFormat,
    buffer: &[u8],
    offset: usize,
    out: &mut Vec<TextChange>,
  ) -> Result<usize> {
    let mut reader = Reader {
      buffer,
      pos: offset,
      byte_order: format.byte_order,
    };
    let mut changes = Vec::new();
    loop {
      changes.push(read_record(&mut reader)?);
      if reader.remaining() == 0 {
        break;
      }
    }
    out.append(&mut changes);
    Ok(reader.pos - offset)
  }
}

fn read_record(reader: &mut Reader<'_>) -> Result<TextChange> {
  let old_position = reader.u32()?;
  let old_len = reader.u32()?;
  let new_position = reader.u32()?;
  let new_len = reader.u32()?;
  let old_text = reader.text(old_len)?;
  let new_text = reader.text(new_len)?;
  Ok(TextChange {
    old_position,
    old_text,
    new_position,
    new_text,
  })
}

/// Size of the batch [`encode_batch`] produces for `changes`.
pub fn batch_size(changes: &[TextChange]) -> usize {
  BATCH_HEADER_SIZE + changes.iter().map(TextChange::write_size).sum::<usize>()
}

/// Serializes a batch with a version and byte-order header.
pub fn encode_batch(changes: &[TextChange], format: WireFormat) -> Result<Vec<u8>> {
  let mut buffer = vec![0; batch_size(changes)];
  let count = to_u32(changes.len())?;

  let mut writer = Writer {
    buffer:     &mut buffer,
    pos:        0,
    byte_order: format.byte_order,
  };
  writer.put_u8(WIRE_VERSION);
  writer.put_u8(format.byte_order.marker());
  writer.put_u32(count);
  let mut pos = writer.pos;

  for change in changes {
    pos += change.write_with(format, &mut buffer, pos)?;
  }
  debug_assert_eq!(pos, buffer.len());

  Ok(buffer)
}

/// Deserializes a whole batch produced by [`encode_batch`].
///
/// The buffer must contain exactly one batch: truncation, trailing bytes, an
/// unknown version and a byte order other than the one `format` names are
/// all errors.
pub fn decode_batch(buffer: &[u8], format: WireFormat) -> Result<Vec<TextChange>> {
  decode_batch_inner(buffer, format).inspect_err(|err| {
    tracing::debug!(len = buffer.len(), "rejected text change batch: {err}");
  })
}

fn decode_batch_inner(buffer: &[u8], format: WireFormat) -> Result<Vec<TextChange>> {
  let mut reader = Reader {
    buffer,
    pos: 0,
    byte_order: format.byte_order,
  };

  let version = reader.u8()?;
  if version != WIRE_VERSION {
    return Err(WireError::UnsupportedVersion(version));
  }
  let found = ByteOrder::from_marker(reader.u8()?)?;
  if found != format.byte_order {
    return Err(WireError::ByteOrderMismatch {
      expected: format.byte_order,
      found,
    });
  }

  let count = reader.u32()?;
  // Never trust `count` for the allocation; every record needs a header.
  let mut changes = Vec::with_capacity(count.min(reader.remaining() / RECORD_HEADER_SIZE));
  for _ in 0..count {
    changes.push(read_record(&mut reader)?);
  }

  match reader.remaining() {
    0 => Ok(changes),
    trailing => Err(WireError::TrailingBytes(trailing)),
  }
}
