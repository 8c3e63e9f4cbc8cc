pub mod data;
pub mod diagnostic;
pub mod inference;
pub mod model;
pub mod report;
pub mod training;

// Re-exports — the decode pipeline under `augur::X`
pub use data::corpus::Corpus;
pub use data::encoding::{one_hot, EncodedSequence};
pub use inference::beam::{decode, Beam, BeamSet, Continuation, DecodeConfig};
pub use inference::oracle::{Distribution, FrequencyOracle, Oracle, RnnOracle};
pub use inference::{decode_many, DecodeError};
pub use model::rnn::{CharRnn, CharRnnConfig};
pub use model::vocab::Vocabulary;
pub use training::supervised::{train, TrainConfig};
