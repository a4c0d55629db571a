//! Trigram word prediction with frequency-ranked spelling correction.
//!
//! # Overview
//!
//! A training run counts unigrams, bigrams and trigrams over a tokenized
//! corpus and writes them as log-probabilities to a line-based model file.
//! At typing time the model is loaded once and asked for the most likely
//! next words given up to two words of context and a typed prefix. When the
//! prefix matches nothing, edit-distance candidates are offered instead.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Training Text  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Tokenizer      │ ← Words and punctuation marks (corpus.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CountAggregator │ ← Unigram/bigram/trigram counts (trigram.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Model File     │ ← Line-based log-probabilities (model_io.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  WordPredictor  │ ← Context fallback + prefix filter (predictor.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Spelling        │ ← Edit-distance candidates on a miss (spelling.rs)
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - `vocabulary`: word ↔ id index
//! - `trigram`: streaming n-gram counts
//! - `model_io`: model file writer and parser
//! - `predictor`: next-word recommendations
//! - `spelling`: spelling correction
//! - `corpus`: tokenization and corpus helpers
//! - `session`: keystroke-driven typing state machine
//! - `evaluation`: keystroke savings and correction accuracy
//! - `config`: persisted user settings

pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod model_io;
pub mod predictor;
pub mod session;
pub mod spelling;
pub mod trigram;
pub mod vocabulary;

pub use config::Config;
pub use error::{ModelError, ModelResult};
pub use model_io::LanguageModel;
pub use predictor::{Context, WordPredictor};
pub use trigram::{CountAggregator, NgramCounts};
pub use vocabulary::{Vocabulary, WordId};
