//! Property tests for the layered pattern engine

use std::collections::BTreeSet;

use proptest::prelude::*;

use oie_core::{LayeredSequence, Span};
use oie_pattern::encoder::CODE_WIDTH;
use oie_pattern::{Encoder, LayeredPattern, Symbol};

const WORDS: &[&str] = &["the", "a", "cat", "dog", "sat", "ran"];
const TAGS: &[&str] = &["DT", "NN", "VBD", "JJ"];

const PIECES: &[&str] = &[
    "the_word",
    "cat_word",
    "NN_pos",
    "DT_pos",
    ".",
    "NN_pos +",
    "JJ_pos *",
    "( DT_pos | JJ_pos )",
    "[ cat_word dog_word ]",
    "VBD_pos ?",
];

fn sequence_strategy() -> impl Strategy<Value = LayeredSequence> {
    proptest::collection::vec((0..WORDS.len(), 0..TAGS.len()), 0..16).prop_map(|positions| {
        let words: Vec<&str> = positions.iter().map(|&(w, _)| WORDS[w]).collect();
        let tags: Vec<&str> = positions.iter().map(|&(_, t)| TAGS[t]).collect();
        LayeredSequence::new(positions.len())
            .with_layer("word", words)
            .unwrap()
            .with_layer("pos", tags)
            .unwrap()
    })
}

fn pattern_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(0..PIECES.len(), 1..5)
        .prop_map(|picks| picks.iter().map(|&i| PIECES[i]).collect::<Vec<_>>().join(" "))
}

fn alphabets_strategy() -> impl Strategy<Value = Vec<BTreeSet<String>>> {
    proptest::collection::vec(proptest::collection::btree_set("[a-e]{1,2}", 0..5), 1..4)
}

proptest! {
    #[test]
    fn prop_encoded_length_and_match_bounds(
        seq in sequence_strategy(),
        source in pattern_strategy(),
    ) {
        let pattern = LayeredPattern::compile(&source).unwrap();
        let encoded = pattern.encode_sequence(&seq).unwrap();
        prop_assert_eq!(encoded.chars().count(), seq.len());
        prop_assert_eq!(encoded.len(), seq.len() * CODE_WIDTH);

        let mut previous_end = 0;
        for span in pattern.matcher(&seq).unwrap() {
            prop_assert!(span.start <= span.end);
            prop_assert!(span.end <= seq.len());
            prop_assert!(span.start >= previous_end);
            previous_end = span.end;
        }
    }

    #[test]
    fn prop_single_literal_matches_exact_positions(
        seq in sequence_strategy(),
        word in 0..WORDS.len(),
    ) {
        let pattern = LayeredPattern::compile(&format!("{}_word", WORDS[word])).unwrap();
        let found: Vec<Span> = pattern.matcher(&seq).unwrap().collect();
        let expected: Vec<Span> = (0..seq.len())
            .filter(|&i| seq.get("word", i).unwrap() == WORDS[word])
            .map(|i| Span::new(i, i + 1))
            .collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn prop_encode_class_partitions_table(alphabets in alphabets_strategy()) {
        let encoder = Encoder::new(alphabets.clone()).unwrap();
        let radices: Vec<usize> = alphabets.iter().map(|a| a.len() + 1).collect();
        prop_assert_eq!(encoder.size(), radices.iter().product::<usize>());

        for (layer, radix) in radices.iter().enumerate() {
            let mut union = BTreeSet::new();
            for symbol in encoder.alphabet(layer).unwrap() {
                let class = encoder.encode_class(layer, symbol).unwrap();
                prop_assert_eq!(class.len(), encoder.size() / radix);
                for code in class {
                    // Classes of one layer are disjoint
                    prop_assert!(union.insert(code));
                }
            }
            prop_assert_eq!(union.len(), encoder.size());
        }
    }

    #[test]
    fn prop_unknown_folding(
        alphabets in alphabets_strategy(),
        values in proptest::collection::vec("[a-f]{1,2}", 4),
    ) {
        let encoder = Encoder::new(alphabets.clone()).unwrap();
        let tuple: Vec<&str> = values[..alphabets.len()].iter().map(String::as_str).collect();

        let symbols: Vec<Symbol> = tuple
            .iter()
            .zip(&alphabets)
            .map(|(value, alphabet)| {
                if alphabet.contains(*value) {
                    Symbol::literal(*value)
                } else {
                    Symbol::Unknown
                }
            })
            .collect();

        let code = encoder.encode(&tuple).unwrap();
        prop_assert_eq!(code, encoder.encode(&tuple).unwrap());
        prop_assert_eq!(code, encoder.encode_symbols(&symbols).unwrap());

        let decoded: Vec<Symbol> = encoder.decode(code).unwrap().into_iter().cloned().collect();
        prop_assert_eq!(decoded, symbols);
    }
}

#[test]
fn capacity_boundary_at_default_limit() {
    // 15 literals + UNKNOWN = 16 per layer, 16^4 = 65536
    let layer: Vec<String> = (0..15).map(|i| format!("t{i}")).collect();
    let layers = vec![layer.clone(), layer.clone(), layer.clone(), layer.clone()];
    assert_eq!(Encoder::new(layers.clone()).unwrap().size(), 65_536);

    let mut over = layers;
    over[3].push("t15".to_string());
    assert!(Encoder::new(over).is_err());
}

#[test]
fn compiled_pattern_is_shared_across_threads() {
    let pattern = LayeredPattern::compile("DT_pos NN_pos").unwrap();
    let seq = LayeredSequence::new(2)
        .with_layer("word", ["the", "cat"])
        .unwrap()
        .with_layer("pos", ["DT", "NN"])
        .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let mut matcher = pattern.matcher(&seq).unwrap();
                assert!(matcher.find());
                assert_eq!(matcher.range(), Some(Span::new(0, 2)));
            });
        }
    });
}
