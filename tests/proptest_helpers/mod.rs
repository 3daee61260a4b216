#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use rust_dm::ModuleMatrix;
use rust_dm::decoder::placement::Placement;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Config for the pixel-level tests, which run the full pipeline per case
pub fn render_config() -> ProptestConfig {
    let mut config = proptest_config();
    config.cases = config.cases.min(12);
    config
}

pub fn arb_payload(max_len: usize) -> BoxedStrategy<Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..=max_len).boxed()
}

pub fn arb_printable(max_len: usize) -> BoxedStrategy<Vec<u8>> {
    proptest::string::string_regex(&format!("[ -~]{{1,{max_len}}}"))
        .expect("valid printable regex")
        .prop_map(String::into_bytes)
        .boxed()
}

/// XOR `mask` into codeword `index` of a placed symbol
pub fn corrupt_codeword(matrix: &mut ModuleMatrix, index: usize, mask: u8) {
    let placement = Placement::for_size(matrix.size());
    for (bit, &(row, col)) in placement.codewords()[index].iter().enumerate() {
        if mask & (0x80 >> bit) != 0 {
            matrix.toggle(row, col);
        }
    }
}
