use proptest::prelude::*;
use textcoding::compression::{
    analyze, arithmetic, huffman_code, huffman_encode, lz78, lzw, CodewordSet, FrequencyTable,
    HuffmanBuilder, ProbabilityTable, TieBreak,
};

fn policy() -> impl Strategy<Value = TieBreak> {
    prop_oneof![Just(TieBreak::Classic), Just(TieBreak::MinimizeReorder)]
}

fn counts(weights: &[usize]) -> FrequencyTable {
    let symbols = ('a'..='z').zip(weights.iter().copied());
    FrequencyTable::from_counts(symbols).unwrap()
}

proptest! {
    #[test]
    fn test_huffman_code_is_complete_prefix_code(
        weights in prop::collection::vec(1usize..50, 2..20),
        policy in policy(),
    ) {
        let tree = huffman_code(&counts(&weights), policy).unwrap();
        let table = tree.code_table();
        prop_assert_eq!(table.len(), weights.len());

        let report = analyze(&table.codewords()).unwrap();
        prop_assert!(report.is_prefix_free);
        prop_assert!(report.kraft_sum.is_one());
        prop_assert!(report.is_uniquely_decodable);
    }

    #[test]
    fn test_huffman_policies_are_equally_optimal(
        weights in prop::collection::vec(1usize..50, 2..20),
    ) {
        let freq = counts(&weights);
        let total: usize = weights.iter().sum();
        let cost = |policy| {
            let table = huffman_code(&freq, policy).unwrap().code_table();
            table
                .entries()
                .iter()
                .map(|e| e.weight * e.code.len())
                .sum::<usize>()
        };
        let classic = cost(TieBreak::Classic);
        prop_assert_eq!(classic, cost(TieBreak::MinimizeReorder));
        // Never worse than a fixed-length code.
        let fixed = usize::BITS - (weights.len() - 1).leading_zeros();
        prop_assert!(classic <= total * fixed as usize);
    }

    #[test]
    fn test_huffman_builder_is_reproducible(
        weights in prop::collection::vec(1usize..10, 2..12),
        policy in policy(),
    ) {
        let freq = counts(&weights);
        let mut first = HuffmanBuilder::new(&freq, policy).unwrap();
        let mut second = HuffmanBuilder::new(&freq, policy).unwrap();
        first.run_to_completion();
        while second.step() {}
        prop_assert_eq!(first.merges(), second.merges());
        prop_assert_eq!(first.code_table().unwrap(), second.code_table().unwrap());
        prop_assert_eq!(first.merges().len(), weights.len() - 1);
    }

    #[test]
    fn test_huffman_roundtrip(input in "[a-e ]{1,200}", policy in policy()) {
        let (bits, tree) = huffman_encode(&input, policy).unwrap();
        prop_assert_eq!(tree.decode(&bits).unwrap(), input);
    }

    #[test]
    fn test_lzw_roundtrip_classic(input in "[A-Z ]{0,300}") {
        let alphabet = lzw::Alphabet::classic();
        let codes = lzw::compress(&input, &alphabet).unwrap();
        prop_assert!(codes.len() <= input.len());
        prop_assert_eq!(lzw::decompress(&codes, &alphabet).unwrap(), input);
    }

    #[test]
    fn test_lzw_roundtrip_discovered(input in "\\PC{1,200}") {
        let alphabet = lzw::Alphabet::discover(&input).unwrap();
        let codes = lzw::compress(&input, &alphabet).unwrap();
        prop_assert_eq!(lzw::decompress(&codes, &alphabet).unwrap(), input);
    }

    #[test]
    fn test_lzw_repeated_symbol_compresses(len in 4usize..500) {
        let input = "A".repeat(len);
        let codes = lzw::compress(&input, &lzw::Alphabet::classic()).unwrap();
        prop_assert!(codes.len() < len);
    }

    #[test]
    fn test_lz78_roundtrip(input in "\\PC{0,300}") {
        let tokens = lz78::compress(&input);
        prop_assert_eq!(lz78::decompress(&tokens).unwrap(), input);
    }

    #[test]
    fn test_lz78_text_form_roundtrip(input in "[a-z_ ),(<]{0,200}") {
        let text = lz78::Tokens(lz78::compress(&input)).to_string();
        let parsed: lz78::Tokens = text.parse().unwrap();
        prop_assert_eq!(lz78::decompress(&parsed.0).unwrap(), input);
    }

    #[test]
    fn test_lz78_classic_roundtrip(input in "[A-Z ]{0,200}") {
        let tokens = lz78::compress_classic(&input);
        prop_assert!(tokens.iter().all(|t| t.symbol != Some(' ')));
        prop_assert_eq!(lz78::decompress_classic(&tokens).unwrap(), input);
    }

    #[test]
    fn test_step_traces_agree_with_codecs(input in "[A-Z ]{1,120}") {
        let alphabet = lzw::Alphabet::classic();
        let (codes, steps) = lzw::compress_steps(&input, &alphabet).unwrap();
        prop_assert_eq!(&codes, &lzw::compress(&input, &alphabet).unwrap());
        let emitted: Vec<u32> = steps.iter().filter_map(|s| s.emitted).collect();
        prop_assert_eq!(&emitted, &codes);
        let (text, rows) = lzw::decompress_steps(&codes, &alphabet).unwrap();
        prop_assert_eq!(&text, &input);
        prop_assert_eq!(rows.len(), codes.len());

        let (tokens, steps) = lz78::compress_steps(&input);
        prop_assert_eq!(&tokens, &lz78::compress(&input));
        let emitted: Vec<lz78::Token> = steps.iter().filter_map(|s| s.emitted).collect();
        prop_assert_eq!(&emitted, &tokens);
        let (text, rows) = lz78::decompress_steps(&tokens).unwrap();
        prop_assert_eq!(&text, &input);
        let joined: String = rows.iter().map(|r| r.output.as_str()).collect();
        prop_assert_eq!(joined, input);
    }

    #[test]
    fn test_arithmetic_roundtrip(
        weights in prop::collection::vec(1u32..=10, 4),
        message in prop::collection::vec(0usize..4, 1..9),
    ) {
        let total: u32 = weights.iter().sum();
        let symbols = ['A', 'B', 'C', 'D'];
        let table = ProbabilityTable::new(
            symbols
                .iter()
                .zip(&weights)
                .map(|(&s, &w)| (s, f64::from(w) / f64::from(total))),
        )
        .unwrap();
        let input: String = message.iter().map(|&i| symbols[i]).collect();

        let interval = arithmetic::encode(&input, &table).unwrap();
        let value = arithmetic::encode_value(&input, &table).unwrap();
        prop_assert!(interval.contains(value));
        let steps = arithmetic::decode_steps(value, &table, Some(message.len())).unwrap();
        prop_assert!(steps.iter().all(|step| step.after.contains(value)));
        prop_assert_eq!(
            arithmetic::decode(value, &table, Some(message.len())).unwrap(),
            input
        );
    }

    #[test]
    fn test_uniquely_decodable_codes_satisfy_mcmillan(
        words in prop::collection::vec("[01]{1,6}", 1..8),
    ) {
        let code = CodewordSet::new(words).unwrap();
        let report = analyze(&code).unwrap();
        if report.is_prefix_free {
            prop_assert!(report.is_uniquely_decodable);
        }
        if report.is_uniquely_decodable {
            prop_assert!(!report.kraft_sum.exceeds_one());
        }
        if report.kraft_sum.exceeds_one() {
            prop_assert!(!report.is_uniquely_decodable);
        }
    }
}

#[test]
fn test_analyzer_reference_codes() {
    let prefix: CodewordSet = "0,10,110,111".parse().unwrap();
    let report = analyze(&prefix).unwrap();
    assert!(report.is_prefix_free);
    assert!(report.kraft_sum.is_one());
    assert!(report.is_uniquely_decodable);

    let suffix: CodewordSet = "0,01,011".parse().unwrap();
    let report = analyze(&suffix).unwrap();
    assert!(!report.is_prefix_free);
    assert!(report.is_uniquely_decodable);

    let ambiguous: CodewordSet = "0,01,10".parse().unwrap();
    assert!(!analyze(&ambiguous).unwrap().is_uniquely_decodable);
}

#[test]
fn test_arithmetic_reference_message() {
    let table: ProbabilityTable = "A:0.2,B:0.3,C:0.5".parse().unwrap();
    let interval = arithmetic::encode("AB", &table).unwrap();
    assert!(interval.low >= 0.04 - 1e-12 && interval.high <= 0.1 + 1e-12);
    let value = arithmetic::encode_value("AB", &table).unwrap();
    assert_eq!(arithmetic::decode(value, &table, Some(2)).unwrap(), "AB");
}
