//! Next-word recommendation over a loaded model.
//!
//! # Fallback Chain
//!
//! Candidates are gathered until the recommendation window is full:
//! - continuations of the two previous words (trigram table),
//! - continuations of the previous word (bigram table),
//! - every vocabulary word by unigram count.
//!
//! Each stage is sorted by log-probability (or count), keeps only words that
//! start with the typed prefix, and skips words an earlier stage already
//! produced. Later stages are not consulted once the window is full. When no
//! word matches at all and the prefix is purely alphabetic, the typed text
//! is treated as a misspelling and handed to the [`SpellingCorrector`].

use crate::config::Config;
use crate::error::ModelResult;
use crate::model_io::{self, LanguageModel};
use crate::spelling::SpellingCorrector;
use crate::vocabulary::WordId;
use std::path::Path;

/// The words preceding the one being predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context<'a> {
    /// Start of input.
    None,
    /// One preceding word.
    One(&'a str),
    /// Two preceding words, oldest first.
    Two { two_back: &'a str, prev: &'a str },
}

impl<'a> Context<'a> {
    /// Context from the last two entries of `words`.
    pub fn from_history(words: &'a [String]) -> Self {
        match words {
            [] => Self::None,
            [prev] => Self::One(prev.as_str()),
            [.., two_back, prev] => Self::Two {
                two_back: two_back.as_str(),
                prev: prev.as_str(),
            },
        }
    }

    /// Like [`Context::from_history`], but an empty history predicts the
    /// word after `sentence_start`, unless that is empty too.
    pub fn with_sentence_start(words: &'a [String], sentence_start: &'a str) -> Self {
        match words {
            [] if !sentence_start.is_empty() => Self::One(sentence_start),
            words => Self::from_history(words),
        }
    }

    /// The word immediately preceding the prediction, if any.
    pub fn prev(&self) -> Option<&'a str> {
        match *self {
            Self::None => None,
            Self::One(prev) | Self::Two { prev, .. } => Some(prev),
        }
    }
}

/// Recommends words from a trigram model.
pub struct WordPredictor {
    model: LanguageModel,
    corrector: SpellingCorrector,
    window: usize,
}

impl WordPredictor {
    /// Build a predictor, sorting every continuation list by descending
    /// log-probability. Ties keep their file order.
    pub fn new(mut model: LanguageModel, window: usize, max_edit_distance: u32) -> Self {
        let tables = model
            .bigram_probs
            .values_mut()
            .chain(model.trigram_probs.values_mut());
        for continuations in tables {
            continuations.sort_by(|a, b| b.1.total_cmp(&a.1));
        }

        Self {
            model,
            corrector: SpellingCorrector::new(max_edit_distance),
            window,
        }
    }

    pub fn with_config(model: LanguageModel, config: &Config) -> Self {
        Self::new(model, config.recommendation_window, config.max_edit_distance)
    }

    /// Read the model at `path` and build a predictor from it.
    pub fn load(path: &Path, config: &Config) -> ModelResult<Self> {
        let model = model_io::read_model(path)?;
        log::info!(
            "Model has {} words from {} tokens",
            model.vocabulary().len(),
            model.total_words()
        );
        Ok(Self::with_config(model, config))
    }

    pub fn model(&self) -> &LanguageModel {
        &self.model
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn unigram_count_of(&self, word: &str) -> u64 {
        self.model
            .vocabulary
            .id(word)
            .map_or(0, |id| self.model.unigram_count(id))
    }

    /// Up to `window` distinct words for `context` that start with `prefix`.
    ///
    /// Falls back to spelling corrections of `prefix` when nothing matches.
    pub fn recommend(&self, context: &Context<'_>, prefix: &str) -> Vec<String> {
        let vocabulary = &self.model.vocabulary;
        let mut picked = Vec::with_capacity(self.window);

        if let Context::Two { two_back, prev } = *context {
            if let (Some(first), Some(second)) = (vocabulary.id(two_back), vocabulary.id(prev)) {
                if let Some(continuations) = self.model.trigram_continuations(first, second) {
                    self.take_matches(&mut picked, continuations.iter().map(|(id, _)| *id), prefix);
                }
            }
        }

        if picked.len() < self.window {
            let continuations = context
                .prev()
                .and_then(|prev| vocabulary.id(prev))
                .and_then(|prev| self.model.bigram_continuations(prev));
            if let Some(continuations) = continuations {
                self.take_matches(&mut picked, continuations.iter().map(|(id, _)| *id), prefix);
            }
        }

        if picked.len() < self.window {
            self.take_matches(&mut picked, self.unigram_ranking(prefix).into_iter(), prefix);
        }

        if picked.is_empty() && is_correctable(prefix) {
            log::debug!("no word starts with {prefix:?}, trying spelling correction");
            return self.correct(prefix);
        }

        picked
            .into_iter()
            .filter_map(|id| vocabulary.word(id).map(str::to_string))
            .collect()
    }

    /// Up to `window` vocabulary words within edit distance of `word`.
    pub fn correct(&self, word: &str) -> Vec<String> {
        self.corrector.correct(
            word,
            &self.model.vocabulary,
            &self.model.unigram_counts,
            self.window,
        )
    }

    /// Record that the user typed or chose `word` in this session.
    ///
    /// Known words get their unigram count bumped; new words join the
    /// vocabulary with a count of one. Nothing is written back to disk.
    pub fn confirm_word(&mut self, word: &str) {
        if word.is_empty() || word.chars().any(char::is_whitespace) {
            return;
        }
        let (id, inserted) = self.model.vocabulary.get_or_insert(word);
        if inserted {
            log::debug!("adding {word:?} to the session vocabulary");
            self.model.unigram_counts.push(1);
        } else {
            self.model.unigram_counts[id as usize] += 1;
        }
    }

    fn take_matches(
        &self,
        picked: &mut Vec<WordId>,
        candidates: impl Iterator<Item = WordId>,
        prefix: &str,
    ) {
        for id in candidates {
            if picked.len() >= self.window {
                break;
            }
            if picked.contains(&id) {
                continue;
            }
            let matches = self
                .model
                .vocabulary
                .word(id)
                .is_some_and(|word| word.starts_with(prefix));
            if matches {
                picked.push(id);
            }
        }
    }

    /// Ids of words starting with `prefix`, most frequent first, ties by id.
    fn unigram_ranking(&self, prefix: &str) -> Vec<WordId> {
        let mut ranked: Vec<(WordId, u64)> = self
            .model
            .vocabulary
            .iter()
            .filter(|(_, word)| word.starts_with(prefix))
            .map(|(id, _)| (id, self.model.unigram_count(id)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().map(|(id, _)| id).collect()
    }
}

/// Only purely alphabetic input is treated as a possible misspelling.
fn is_correctable(prefix: &str) -> bool {
    !prefix.is_empty() && prefix.chars().all(char::is_alphabetic)
}
