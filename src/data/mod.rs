//! Corpus handling and the one-hot encoding the oracle consumes.

pub mod corpus;
pub mod encoding;
