//! End-to-end pipeline tests: corpus file → vocabulary → training →
//! beam-search decoding.

use std::io::Write;

use augur::data::corpus::Corpus;
use augur::inference::beam::{decode, DecodeConfig};
use augur::inference::oracle::{FrequencyOracle, RnnOracle};
use augur::model::rnn::CharRnnConfig;
use augur::model::vocab::Vocabulary;
use augur::training::supervised::{train, TrainConfig};

use burn::backend::{Autodiff, NdArray};

type B = Autodiff<NdArray>;

#[test]
fn trained_pipeline_decodes_ranked_continuations() {
    let device = Default::default();
    let corpus = Corpus::from_text("the cat sat on the mat and the cat ran");
    let vocab = Vocabulary::from_text(corpus.text());

    let model = CharRnnConfig::new(vocab.size())
        .with_d_hidden(16)
        .init::<B>(&device);
    let train_config = TrainConfig {
        epochs: 2,
        window: 4,
        stride: 2,
        batch_size: 16,
        ..TrainConfig::default()
    };
    let (model, results) = train(model, &corpus, &vocab, &train_config, &device).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.avg_loss.is_finite()));

    let oracle = RnnOracle::new(model, device);
    let config = DecodeConfig {
        beam_width: 4,
        horizon: 6,
    };
    let ranked = decode("the ", &config, &vocab, &oracle).unwrap();

    assert_eq!(ranked.len(), 4);
    for c in &ranked {
        assert!(c.text.starts_with("the "));
        assert_eq!(c.text.chars().count(), 4 + 6);
        assert!(c.log_probability <= 0.0);
    }
    for pair in ranked.windows(2) {
        assert!(pair[0].log_probability >= pair[1].log_probability);
    }

    // Same model, same seed: byte-identical results.
    let again = decode("the ", &config, &vocab, &oracle).unwrap();
    assert_eq!(ranked, again);
}

#[test]
fn baseline_pipeline_matches_worked_example() {
    let vocab = Vocabulary::from_symbols(['a', 'b', 'c', 'd', 'e']);
    let oracle = FrequencyOracle::from_distribution(vec![0.5, 0.3, 0.1, 0.05, 0.05]);
    let config = DecodeConfig {
        beam_width: 2,
        horizon: 2,
    };
    let ranked = decode("ab", &config, &vocab, &oracle).unwrap();
    let sequences: Vec<&str> = ranked.iter().map(|c| c.text.as_str()).collect();
    insta::assert_snapshot!(sequences.join(","), @"abaa,abab");
}

#[test]
fn corpus_file_roundtrip_and_alphabet() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(file, "the cat sat on the mat").expect("write");

    let corpus = Corpus::load(file.path()).expect("load");
    let vocab = Vocabulary::from_text(corpus.text());
    let alphabet: String = vocab.symbols().iter().collect();
    assert_eq!(alphabet, " acehmnost");
}

#[test]
fn horizon_zero_is_identity_through_the_pipeline() {
    let corpus = Corpus::from_text("abcabc");
    let vocab = Vocabulary::from_text(corpus.text());
    let oracle = FrequencyOracle::from_corpus(&corpus, &vocab);
    let config = DecodeConfig {
        beam_width: 3,
        horizon: 0,
    };
    let ranked = decode("abc", &config, &vocab, &oracle).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].text, "abc");
    assert_eq!(ranked[0].log_probability, 0.0);
}
