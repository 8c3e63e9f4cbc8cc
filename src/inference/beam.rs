//! Beam search over a next-symbol probability oracle.
//!
//! Maintains a bounded frontier of candidate continuations ranked by
//! cumulative log-probability. Each iteration batches the whole frontier
//! into one oracle call, expands every beam to its top candidates without
//! replacement, then prunes the combined pool back to the beam width.
//! Runs for a fixed horizon and returns the final frontier ranked.

use crate::data::encoding::EncodedSequence;
use crate::inference::oracle::Oracle;
use crate::inference::DecodeError;
use crate::model::vocab::Vocabulary;

// ─── Configuration ────────────────────────────────────────────────

/// Beam search parameters.
pub struct DecodeConfig {
    /// Number of beams kept after each pruning step.
    pub beam_width: usize,
    /// Number of symbols to extend the seed by.
    pub horizon: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            beam_width: 8,
            horizon: 32,
        }
    }
}

// ─── Beam ─────────────────────────────────────────────────────────

/// A single candidate continuation.
///
/// Immutable once created: extension produces a new beam, so a parent's
/// symbols and encoded prefix are never mutated under its children.
#[derive(Debug, Clone)]
pub struct Beam {
    log_probability: f32,
    symbols: Vec<char>,
    encoded: EncodedSequence,
}

impl Beam {
    /// Seed beam: the given sequence with probability 1 (log-prob 0).
    pub fn seed(symbols: Vec<char>, encoded: EncodedSequence) -> Self {
        Self {
            log_probability: 0.0,
            symbols,
            encoded,
        }
    }

    /// New beam extending this one by a single symbol.
    ///
    /// `probability` is the oracle's probability for the symbol; its log
    /// is added to the cumulative score. `ln(0)` is negative infinity,
    /// which ranks last rather than erroring.
    #[must_use]
    pub fn extend(&self, symbol: char, index: usize, probability: f32) -> Self {
        let mut symbols = self.symbols.clone();
        symbols.push(symbol);
        Self {
            log_probability: self.log_probability + probability.ln(),
            symbols,
            encoded: self.encoded.extended(index),
        }
    }

    /// Cumulative log-probability of the sequence.
    pub fn log_probability(&self) -> f32 {
        self.log_probability
    }

    /// The decoded sequence so far (seed included).
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Encoded form of the sequence, kept in sync with `symbols`.
    pub fn encoded(&self) -> &EncodedSequence {
        &self.encoded
    }
}

// ─── BeamSet ──────────────────────────────────────────────────────

/// The search frontier: a bounded set of beams.
#[derive(Debug)]
pub struct BeamSet {
    beams: Vec<Beam>,
}

impl BeamSet {
    /// Frontier holding a single seed beam.
    pub fn with_seed(seed: Beam) -> Self {
        Self { beams: vec![seed] }
    }

    fn from_candidates(beams: Vec<Beam>) -> Self {
        Self { beams }
    }

    /// The current beams, best first after a prune.
    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    /// Number of beams in the frontier.
    pub fn len(&self) -> usize {
        self.beams.len()
    }

    /// Whether the frontier is empty.
    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    /// Sort descending by log-probability and keep the top `width`.
    ///
    /// The sort is stable, so beams with exactly equal scores keep their
    /// generation order: lower parent beam index first, then lower symbol
    /// rank within that parent. This is the tie-break rule.
    pub fn prune(&mut self, width: usize) {
        self.beams.sort_by(|a, b| {
            b.log_probability
                .partial_cmp(&a.log_probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.beams.truncate(width);
    }
}

// ─── Result ───────────────────────────────────────────────────────

/// One ranked decode result: the full sequence (seed included) and its
/// cumulative log-probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Continuation {
    pub text: String,
    pub log_probability: f32,
}

// ─── Decoder ──────────────────────────────────────────────────────

/// Decode the most probable continuations of `seed`.
///
/// Encodes the seed via the vocabulary, then runs exactly
/// `config.horizon` iterations of expand-and-prune, querying the oracle
/// once per iteration with the whole frontier batched. Returns the final
/// frontier as continuations sorted descending by log-probability.
///
/// `horizon == 0` returns the seed itself with score 0. Fails before the
/// first oracle call on a zero beam width, an empty seed, or a seed
/// symbol outside the vocabulary; fails mid-decode if the oracle violates
/// its output contract.
pub fn decode<O: Oracle + ?Sized>(
    seed: &str,
    config: &DecodeConfig,
    vocab: &Vocabulary,
    oracle: &O,
) -> Result<Vec<Continuation>, DecodeError> {
    if config.beam_width == 0 {
        return Err(DecodeError::Configuration(
            "beam width must be at least 1".to_string(),
        ));
    }
    if seed.is_empty() {
        return Err(DecodeError::Configuration(
            "seed sequence must not be empty".to_string(),
        ));
    }

    let symbols: Vec<char> = seed.chars().collect();
    let mut indices = Vec::with_capacity(symbols.len());
    for (position, &symbol) in symbols.iter().enumerate() {
        match vocab.index_of(symbol) {
            Some(idx) => indices.push(idx),
            None => return Err(DecodeError::UnknownSymbol { symbol, position }),
        }
    }

    let v = vocab.size();
    let encoded = EncodedSequence::from_indices(&indices, v);
    let mut frontier = BeamSet::with_seed(Beam::seed(symbols, encoded));

    // Per-beam expansion count. Capping at V keeps the inner loop from
    // re-selecting zeroed entries when the width exceeds the alphabet.
    let per_beam = config.beam_width.min(v);

    for _ in 0..config.horizon {
        let batch: Vec<EncodedSequence> = frontier
            .beams()
            .iter()
            .map(|b| b.encoded().clone())
            .collect();
        let distributions = oracle.predict(&batch);
        validate_batch(&distributions, batch.len(), v)?;

        let mut candidates = Vec::with_capacity(frontier.len() * per_beam);
        for (beam, distribution) in frontier.beams().iter().zip(&distributions) {
            let mut working = distribution.clone();
            for _ in 0..per_beam {
                let index = argmax(&working);
                let symbol = match vocab.symbol_at(index) {
                    Some(s) => s,
                    None => {
                        return Err(DecodeError::InvalidIndex {
                            index,
                            vocab_size: v,
                        })
                    }
                };
                candidates.push(beam.extend(symbol, index, working[index]));
                working[index] = 0.0;
            }
        }

        frontier = BeamSet::from_candidates(candidates);
        frontier.prune(config.beam_width);
    }

    Ok(frontier
        .beams()
        .iter()
        .map(|beam| Continuation {
            text: beam.symbols().iter().collect(),
            log_probability: beam.log_probability(),
        })
        .collect())
}

/// Index of the maximum value; ties go to the lowest index.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    let mut best_value = values[0];
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > best_value {
            best = i;
            best_value = value;
        }
    }
    best
}

/// Check an oracle reply against the prediction contract.
fn validate_batch(
    distributions: &[Vec<f32>],
    requested: usize,
    v: usize,
) -> Result<(), DecodeError> {
    if distributions.len() != requested {
        return Err(DecodeError::InvalidDistribution {
            beam: distributions.len(),
            reason: format!(
                "oracle returned {} distributions for a batch of {}",
                distributions.len(),
                requested
            ),
        });
    }
    for (beam, distribution) in distributions.iter().enumerate() {
        if distribution.len() != v {
            return Err(DecodeError::InvalidDistribution {
                beam,
                reason: format!(
                    "distribution has {} entries, vocabulary has {}",
                    distribution.len(),
                    v
                ),
            });
        }
        for (i, &p) in distribution.iter().enumerate() {
            if !p.is_finite() {
                return Err(DecodeError::InvalidDistribution {
                    beam,
                    reason: format!("non-finite probability {} at index {}", p, i),
                });
            }
            if p < 0.0 {
                return Err(DecodeError::InvalidDistribution {
                    beam,
                    reason: format!("negative probability {} at index {}", p, i),
                });
            }
        }
    }
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────
