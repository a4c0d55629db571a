//! Trigram counting over a token stream.
//!
//! The [`CountAggregator`] consumes one token at a time, in corpus order, and
//! keeps a two-token history so that every token updates:
//! - its unigram count,
//! - the bigram count `(w-1, w)` once one token has been seen,
//! - the trigram count `(w-2, w-1, w)` once two tokens have been seen.
//!
//! Counts are sparse: a pair or triple only exists once it has been observed.
//! There is no smoothing; unseen continuations simply never reach the model
//! file.
//!
//! # Usage
//!
//! ```rust
//! use wordpredict::trigram::CountAggregator;
//!
//! let mut aggregator = CountAggregator::new();
//! aggregator.ingest_all(["the", "cat", "sat", "."]);
//! let counts = aggregator.finalize();
//! assert_eq!(counts.unigram_count_of("cat"), 1);
//! ```

use crate::vocabulary::{Vocabulary, WordId};
use ahash::AHashMap;
use std::collections::hash_map::Entry;

/// Counts of the words observed after one context, in first-observed order.
#[derive(Debug, Clone, Default)]
pub struct Continuations {
    order: Vec<WordId>,
    counts: AHashMap<WordId, u64>,
}

impl Continuations {
    fn bump(&mut self, word: WordId) {
        match self.counts.entry(word) {
            Entry::Occupied(mut entry) => *entry.get_mut() += 1,
            Entry::Vacant(entry) => {
                entry.insert(1);
                self.order.push(word);
            }
        }
    }

    pub fn get(&self, word: WordId) -> Option<u64> {
        self.counts.get(&word).copied()
    }

    /// Iterate `(word, count)` in the order the continuations were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (WordId, u64)> + '_ {
        self.order.iter().map(|id| (*id, self.counts[id]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Incremental unigram, bigram and trigram counter.
pub struct CountAggregator {
    vocabulary: Vocabulary,
    /// Unigram counts indexed by word id.
    unigram_counts: Vec<u64>,
    /// w-1 → continuations.
    bigram_counts: AHashMap<WordId, Continuations>,
    /// (w-2, w-1) → continuations.
    trigram_counts: AHashMap<(WordId, WordId), Continuations>,
    total_words: u64,
    /// Id of the previous token.
    last: Option<WordId>,
    /// Id of the token two positions back.
    second_last: Option<WordId>,
}

impl Default for CountAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl CountAggregator {
    pub fn new() -> Self {
        Self {
            vocabulary: Vocabulary::new(),
            unigram_counts: Vec::new(),
            bigram_counts: AHashMap::new(),
            trigram_counts: AHashMap::new(),
            total_words: 0,
            last: None,
            second_last: None,
        }
    }

    /// Process one token of the training corpus.
    ///
    /// Tokens that are empty or contain whitespace cannot be written to the
    /// model file and are skipped without touching the history window.
    pub fn ingest(&mut self, token: &str) {
        if token.is_empty() || token.chars().any(char::is_whitespace) {
            log::debug!("skipping unencodable token {token:?}");
            return;
        }

        self.total_words += 1;

        let (id, inserted) = self.vocabulary.get_or_insert(token);
        if inserted {
            self.unigram_counts.push(1);
        } else {
            self.unigram_counts[id as usize] += 1;
        }

        // Only the training path creates count entries; readers use `get`.
        if let Some(prev) = self.last {
            self.bigram_counts.entry(prev).or_default().bump(id);

            if let Some(prev_prev) = self.second_last {
                self.trigram_counts
                    .entry((prev_prev, prev))
                    .or_default()
                    .bump(id);
            }
        }

        self.second_last = self.last;
        self.last = Some(id);
    }

    /// Process a whole token stream in order.
    pub fn ingest_all<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.ingest(token.as_ref());
        }
    }

    /// Number of tokens counted so far.
    pub fn total_words(&self) -> u64 {
        self.total_words
    }

    /// Freeze the counts for serialization.
    pub fn finalize(self) -> NgramCounts {
        log::info!(
            "Counted {} tokens, {} unique words, {} bigram contexts, {} trigram contexts",
            self.total_words,
            self.vocabulary.len(),
            self.bigram_counts.len(),
            self.trigram_counts.len()
        );

        NgramCounts {
            vocabulary: self.vocabulary,
            unigram_counts: self.unigram_counts,
            bigram_counts: self.bigram_counts,
            trigram_counts: self.trigram_counts,
            total_words: self.total_words,
        }
    }
}

/// Final, immutable counts of a training run.
#[derive(Debug, Clone)]
pub struct NgramCounts {
    vocabulary: Vocabulary,
    unigram_counts: Vec<u64>,
    bigram_counts: AHashMap<WordId, Continuations>,
    trigram_counts: AHashMap<(WordId, WordId), Continuations>,
    total_words: u64,
}

impl NgramCounts {
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn total_words(&self) -> u64 {
        self.total_words
    }

    pub fn unigram_count(&self, id: WordId) -> u64 {
        self.unigram_counts.get(id as usize).copied().unwrap_or(0)
    }

    pub fn unigram_count_of(&self, word: &str) -> u64 {
        self.vocabulary
            .id(word)
            .map_or(0, |id| self.unigram_count(id))
    }

    pub fn bigrams(&self, first: WordId) -> Option<&Continuations> {
        self.bigram_counts.get(&first)
    }

    pub fn trigrams(&self, first: WordId, second: WordId) -> Option<&Continuations> {
        self.trigram_counts.get(&(first, second))
    }

    /// Count of the pair `first second`, looked up by word.
    pub fn bigram_count_of(&self, first: &str, second: &str) -> u64 {
        let (Some(a), Some(b)) = (self.vocabulary.id(first), self.vocabulary.id(second)) else {
            return 0;
        };
        self.bigrams(a).and_then(|c| c.get(b)).unwrap_or(0)
    }

    /// Count of the triple `first second third`, looked up by word.
    pub fn trigram_count_of(&self, first: &str, second: &str, third: &str) -> u64 {
        let ids = (
            self.vocabulary.id(first),
            self.vocabulary.id(second),
            self.vocabulary.id(third),
        );
        let (Some(a), Some(b), Some(c)) = ids else {
            return 0;
        };
        self.trigrams(a, b).and_then(|t| t.get(c)).unwrap_or(0)
    }

    /// `ln(count(w1, w2) / count(w1))`, or `None` if the pair was never seen.
    pub fn bigram_log_prob(&self, first: WordId, second: WordId) -> Option<f64> {
        let count = self.bigrams(first)?.get(second)?;
        Some((count as f64 / self.unigram_count(first) as f64).ln())
    }

    /// `ln(count(w1, w2, w3) / count(w1, w2))`, or `None` if never seen.
    pub fn trigram_log_prob(&self, first: WordId, second: WordId, third: WordId) -> Option<f64> {
        let count = self.trigrams(first, second)?.get(third)?;
        let pair = self.bigrams(first)?.get(second)?;
        Some((count as f64 / pair as f64).ln())
    }
}
