//! Beam-search inference: the decoder core, the oracle contract, and
//! parallel decoding of independent seeds.
//!
//! # Public API
//!
//! ```ignore
//! use augur::{decode, DecodeConfig, FrequencyOracle, Vocabulary};
//! let results = decode("ab", &DecodeConfig::default(), &vocab, &oracle)?;
//! ```

pub mod beam;
pub mod oracle;

use rayon::prelude::*;

use crate::model::vocab::Vocabulary;
use beam::{decode, Continuation, DecodeConfig};
use oracle::Oracle;

// ─── Errors ───────────────────────────────────────────────────────

/// Why a decode call was aborted.
///
/// Every variant is fatal to the call that raised it; there are no
/// partial results. A zero probability is not an error (its log is
/// negative infinity, which simply ranks last).
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Rejected configuration: zero beam width or an empty seed.
    Configuration(String),
    /// A seed symbol is not in the vocabulary. `position` is the char
    /// offset within the seed.
    UnknownSymbol { symbol: char, position: usize },
    /// A symbol index fell outside `[0, V)`.
    InvalidIndex { index: usize, vocab_size: usize },
    /// The oracle violated its output contract for the given beam:
    /// wrong batch size, wrong distribution length, or a negative or
    /// non-finite entry. Not retried; the oracle is assumed
    /// deterministic.
    InvalidDistribution { beam: usize, reason: String },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(reason) => write!(f, "invalid configuration: {}", reason),
            Self::UnknownSymbol { symbol, position } => write!(
                f,
                "symbol '{}' at seed position {} is not in the vocabulary",
                symbol.escape_default(),
                position
            ),
            Self::InvalidIndex { index, vocab_size } => write!(
                f,
                "symbol index {} outside vocabulary of size {}",
                index, vocab_size
            ),
            Self::InvalidDistribution { beam, reason } => {
                write!(f, "oracle broke the prediction contract (beam {}): {}", beam, reason)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

// ─── Parallel decoding ────────────────────────────────────────────

/// Decode several independent seeds in parallel.
///
/// Each seed gets its own frontier, so the calls share nothing but the
/// vocabulary and the oracle; results come back in input order, one slot
/// per seed. A failing seed does not disturb the others.
pub fn decode_many<O: Oracle + Sync + ?Sized>(
    seeds: &[String],
    config: &DecodeConfig,
    vocab: &Vocabulary,
    oracle: &O,
) -> Vec<Result<Vec<Continuation>, DecodeError>> {
    seeds
        .par_iter()
        .map(|seed| decode(seed, config, vocab, oracle))
        .collect()
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use oracle::FrequencyOracle;

    #[test]
    fn decode_many_preserves_input_order() {
        let vocab = Vocabulary::from_symbols(['a', 'b', 'c']);
        let oracle = FrequencyOracle::from_distribution(vec![0.5, 0.3, 0.2]);
        let config = DecodeConfig {
            beam_width: 2,
            horizon: 2,
        };
        let seeds = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let results = decode_many(&seeds, &config, &vocab, &oracle);

        assert_eq!(results.len(), 3);
        for (seed, result) in seeds.iter().zip(&results) {
            let ranked = result.as_ref().unwrap();
            assert!(ranked[0].text.starts_with(seed.as_str()));
        }
    }

    #[test]
    fn failing_seed_does_not_disturb_others() {
        let vocab = Vocabulary::from_symbols(['a', 'b']);
        let oracle = FrequencyOracle::from_distribution(vec![0.6, 0.4]);
        let config = DecodeConfig {
            beam_width: 2,
            horizon: 1,
        };
        let seeds = vec!["a".to_string(), "z".to_string(), "b".to_string()];
        let results = decode_many(&seeds, &config, &vocab, &oracle);

        assert!(results[0].is_ok());
        assert!(matches!(
            &results[1],
            Err(DecodeError::UnknownSymbol { symbol: 'z', position: 0 })
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn parallel_matches_sequential() {
        let vocab = Vocabulary::from_symbols(['a', 'b', 'c']);
        let oracle = FrequencyOracle::from_distribution(vec![0.5, 0.3, 0.2]);
        let config = DecodeConfig {
            beam_width: 3,
            horizon: 3,
        };
        let seeds = vec!["ab".to_string(), "ca".to_string()];
        let parallel = decode_many(&seeds, &config, &vocab, &oracle);
        for (seed, result) in seeds.iter().zip(parallel) {
            let sequential = decode(seed, &config, &vocab, &oracle).unwrap();
            assert_eq!(result.unwrap(), sequential);
        }
    }

    #[test]
    fn error_messages_carry_context() {
        let unknown = DecodeError::UnknownSymbol {
            symbol: 'q',
            position: 3,
        };
        let text = unknown.to_string();
        assert!(text.contains('q') && text.contains('3'), "was: {}", text);

        let invalid = DecodeError::InvalidDistribution {
            beam: 2,
            reason: "distribution has 4 entries, vocabulary has 5".to_string(),
        };
        let text = invalid.to_string();
        assert!(text.contains("beam 2") && text.contains("4 entries"), "was: {}", text);
    }
}
