#![no_main]

use libfuzzer_sys::fuzz_target;
use the_edit::{
  ByteOrder,
  WireFormat,
  decode_batch,
  encode_batch,
};

fuzz_target!(|data: &[u8]| {
  for byte_order in [ByteOrder::Little, ByteOrder::Big] {
    let format = WireFormat::new(byte_order);
    let Ok(changes) = decode_batch(data, format) else {
      continue;
    };
    // Decoding accepts exactly one encoding per batch.
    let encoded = encode_batch(&changes, format).expect("decoded batch re-encodes");
    assert_eq!(encoded, data);
  }
});
