use proptest::prelude::*;
use rust_dm::encoder::{RenderOptions, encode, render};
use rust_dm::{MatrixDecoder, Polarity, SymbolShape, scan};

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn matrix_roundtrip_preserves_bytes(data in proptest_helpers::arb_payload(40)) {
        let matrix = encode(&data, SymbolShape::Square).expect("encode");
        let payload = MatrixDecoder::decode(&matrix).expect("decode");
        prop_assert_eq!(&payload.bytes, &data);
        prop_assert_eq!(payload.symbol, matrix.size());
        prop_assert_eq!(payload.corrected_codewords, 0);
        prop_assert_eq!(payload.gs1, data.first() == Some(&0x1D));
    }

    #[test]
    fn errors_within_capacity_are_corrected(
        data in proptest_helpers::arb_payload(20),
        picks in proptest::collection::vec((any::<prop::sample::Index>(), 1u8..=255), 0..=16),
    ) {
        let clean = encode(&data, SymbolShape::Square).expect("encode");
        let size = clean.size();
        prop_assume!(size.blocks() == 1);

        let mut matrix = clean.clone();
        let mut hit = Vec::new();
        for (index, mask) in picks.iter().take(size.correction_capacity()) {
            let codeword = index.index(size.total_codewords());
            if !hit.contains(&codeword) {
                hit.push(codeword);
                proptest_helpers::corrupt_codeword(&mut matrix, codeword, *mask);
            }
        }

        let payload = MatrixDecoder::decode(&matrix).expect("correctable");
        prop_assert_eq!(&payload.bytes, &data);
        prop_assert_eq!(payload.corrected_codewords, hit.len());
    }
}

proptest! {
    #![proptest_config(proptest_helpers::render_config())]

    #[test]
    fn both_polarities_decode_identically(data in proptest_helpers::arb_printable(24)) {
        let matrix = encode(&data, SymbolShape::Square).expect("encode");
        let options = RenderOptions::default();

        let light = scan(&render(&matrix, &options.with_polarity(Polarity::DarkOnLight)).expect("render"));
        let dark = scan(&render(&matrix, &options.with_polarity(Polarity::LightOnDark)).expect("render"));

        let a = light.outcome.payload().expect("dark-on-light decodes");
        let b = dark.outcome.payload().expect("light-on-dark decodes");
        prop_assert_eq!(&a.bytes, &data);
        prop_assert_eq!(&a.bytes, &b.bytes);
        prop_assert_eq!(a.symbol, b.symbol);
        prop_assert_eq!(a.display(), b.display());
    }
}
