#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use the_edit::{
  IndexTransformer,
  LengthEdit,
};

use crate::common::{
  edit_from_ops,
  scenario_from_bytes,
};

fuzz_target!(|data: &[u8]| {
  let scenario = scenario_from_bytes(data);
  let d0 = scenario.initial;
  let first = edit_from_ops(d0.len(), &scenario.first);
  let d1 = first.apply(&d0);
  let second = edit_from_ops(d1.len(), &scenario.second);
  let d2 = second.apply(&d1);

  let composed = first.compose(&second);
  assert_eq!(composed.apply(&d0), d2);
  assert_eq!(composed.inverse(&d0).apply(&d2), d0);
  assert_eq!(composed.new_len(d0.len()), d2.len());

  let lengths = LengthEdit::from_edit(&first).compose(&LengthEdit::from_edit(&second));
  assert_eq!(lengths, LengthEdit::from_edit(&composed));

  let mut transformer = lengths.index_transformer();
  let mut last = 0;
  for index in 0..=d0.len() {
    if let Some(mapped) = transformer.transform(index).index() {
      assert!(mapped >= last && mapped <= d2.len());
      last = mapped;
    }
  }
});
