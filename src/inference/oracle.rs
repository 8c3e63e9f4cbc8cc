//! The prediction oracle contract and the oracles shipped with the crate.
//!
//! The decoder only sees `Oracle::predict`: a batch of encoded sequences
//! in, one probability distribution per sequence out, same order. The
//! oracle is passed into `decode` as a capability, so models, baselines,
//! and test stubs are interchangeable.

use burn::prelude::*;

use crate::data::corpus::Corpus;
use crate::data::encoding::EncodedSequence;
use crate::model::rnn::CharRnn;
use crate::model::vocab::Vocabulary;

/// Length-V probability vector over the vocabulary.
pub type Distribution = Vec<f32>;

/// Next-symbol probability source.
///
/// Contract: one distribution per input sequence, in input order, each of
/// length V with non-negative finite entries summing to 1 within float
/// tolerance. All sequences in a batch share one (non-zero) length; the
/// decoder guarantees this, and implementations may batch rectangularly
/// because of it. The decoder validates replies and aborts the decode on
/// a violation.
pub trait Oracle {
    fn predict(&self, batch: &[EncodedSequence]) -> Vec<Distribution>;
}

// ─── Frequency Oracle ─────────────────────────────────────────────

/// Context-free unigram baseline: answers the same distribution for every
/// sequence. Useful for decoding without a trained model and as a
/// deterministic stub in tests and benchmarks.
pub struct FrequencyOracle {
    distribution: Distribution,
}

impl FrequencyOracle {
    /// Baseline from the unigram frequencies of a corpus.
    pub fn from_corpus(corpus: &Corpus, vocab: &Vocabulary) -> Self {
        Self {
            distribution: corpus.frequencies(vocab),
        }
    }

    /// Baseline from an explicit distribution.
    pub fn from_distribution(distribution: Distribution) -> Self {
        Self { distribution }
    }

    /// The distribution answered for every query.
    pub fn distribution(&self) -> &[f32] {
        &self.distribution
    }
}

impl Oracle for FrequencyOracle {
    fn predict(&self, batch: &[EncodedSequence]) -> Vec<Distribution> {
        batch.iter().map(|_| self.distribution.clone()).collect()
    }
}

// ─── RNN Oracle ───────────────────────────────────────────────────

/// Oracle backed by a trained `CharRnn`.
///
/// Builds one `[batch, seq, V]` tensor per call, runs the model once for
/// the whole frontier, and softmaxes the final step of each row on the
/// CPU. One forward pass per decode iteration regardless of frontier
/// size.
pub struct RnnOracle<B: Backend> {
    model: CharRnn<B>,
    device: B::Device,
}

impl<B: Backend> RnnOracle<B> {
    pub fn new(model: CharRnn<B>, device: B::Device) -> Self {
        Self { model, device }
    }
}

impl<B: Backend> Oracle for RnnOracle<B> {
    fn predict(&self, batch: &[EncodedSequence]) -> Vec<Distribution> {
        if batch.is_empty() {
            return Vec::new();
        }
        let v = batch[0].width();
        let seq = batch[0].len();

        let mut data = Vec::with_capacity(batch.len() * seq * v);
        for encoded in batch {
            data.extend(encoded.flatten());
        }
        let input = Tensor::<B, 3>::from_data(
            TensorData::new(data, [batch.len(), seq, v]),
            &self.device,
        );

        // [batch, seq, V] logits; keep only the final step per row.
        let logits = self.model.forward(input);
        let last = logits
            .slice([0..batch.len(), seq - 1..seq, 0..v])
            .squeeze_dim::<2>(1);
        let flat: Vec<f32> = last.into_data().to_vec().unwrap();

        flat.chunks(v).map(softmax_row).collect()
    }
}

/// Numerically stable softmax over one logit row.
fn softmax_row(logits: &[f32]) -> Distribution {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

// ─── Tests ────────────────────────────────────────────────────────
