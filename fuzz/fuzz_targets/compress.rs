#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use the_edit::{
  compress_consecutive_text_changes,
  replay_backward,
  replay_forward,
};

use crate::common::{
  edit_from_ops,
  scenario_from_bytes,
};

fuzz_target!(|data: &[u8]| {
  let scenario = scenario_from_bytes(data);
  let d0 = scenario.initial;
  let first_edit = edit_from_ops(d0.len(), &scenario.first);
  let d1 = first_edit.apply(&d0);
  let second_edit = edit_from_ops(d1.len(), &scenario.second);
  let d2 = second_edit.apply(&d1);

  let first = first_edit.to_text_changes(&d0);
  let second = second_edit.to_text_changes(&d1);
  let compressed = compress_consecutive_text_changes(&first, &second);

  assert_eq!(replay_forward(&d0, &compressed), d2);
  assert_eq!(replay_backward(&d2, &compressed), d0);
  assert!(compressed.iter().all(|change| !change.is_noop()));
});
