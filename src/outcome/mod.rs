//! Outcome extraction from Automate session logs.
//!
//! Each log line is tokenized into at most one [`tokenizer::LogEvent`]; a
//! small state machine pairs navigation requests with the outcome the test
//! script reports afterwards.

pub mod extractor;
pub mod machine;
pub mod tokenizer;
pub mod useragent;

pub use extractor::OutcomeExtractor;
