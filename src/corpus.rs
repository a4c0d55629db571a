//! Corpus loading and tokenization.
//!
//! Training text is read whole, split into tokens by a [`Tokenize`]
//! implementation and fed to a [`CountAggregator`] in order. Casing is kept
//! and punctuation marks become tokens of their own, so sentence ends (`.`,
//! `?`, `!`) take part in the n-gram counts.

use crate::error::{ModelError, ModelResult};
use crate::trigram::{CountAggregator, NgramCounts};
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Words (with inner apostrophes or hyphens), numbers, or a single
/// punctuation character.
const WORD_AND_PUNCT_PATTERN: &str = r"[\w]+(?:['’-][\w]+)*|[^\w\s]";

/// Splits text into an ordered token sequence.
pub trait Tokenize {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Regex-driven tokenizer; every match is one token.
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    pattern: Regex,
}

impl RegexTokenizer {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Words, numbers and single punctuation marks.
    pub fn word_and_punct() -> Self {
        Self::new(WORD_AND_PUNCT_PATTERN).expect("built-in token pattern is valid")
    }
}

impl Default for RegexTokenizer {
    fn default() -> Self {
        Self::word_and_punct()
    }
}

impl Tokenize for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Read the whole file at `path` as UTF-8 text.
pub fn read_text(path: &Path) -> ModelResult<String> {
    fs::read_to_string(path).map_err(|e| ModelError::from_open(e, path))
}

/// Count every token of `text`.
pub fn train_from_text(text: &str, tokenizer: &impl Tokenize) -> NgramCounts {
    let tokens = tokenizer.tokenize(text);
    log::info!("Tokenized corpus into {} tokens", tokens.len());

    let mut aggregator = CountAggregator::new();
    aggregator.ingest_all(&tokens);
    aggregator.finalize()
}

/// Count every token of the corpus file at `path`.
pub fn train_from_file(path: &Path, tokenizer: &impl Tokenize) -> ModelResult<NgramCounts> {
    let text = read_text(path)?;
    log::info!("Read {} bytes of training text from {}", text.len(), path.display());
    Ok(train_from_text(&text, tokenizer))
}

/// Strip the label column (`ham`/`spam` and a tab) from an SMS collection line.
pub fn cleanse_sms_line(line: &str) -> &str {
    match line.split_once('\t') {
        Some((_, message)) => message.trim(),
        None => line.trim(),
    }
}

/// Rewrite an SMS collection file as one message per line.
///
/// Returns the number of messages written.
pub fn cleanse_sms(input: &Path, output: &Path) -> ModelResult<usize> {
    let reader = BufReader::new(File::open(input).map_err(|e| ModelError::from_open(e, input))?);
    let mut writer =
        BufWriter::new(File::create(output).map_err(|e| ModelError::from_open(e, output))?);

    let mut written = 0;
    for line in reader.lines() {
        let line = line?;
        writeln!(writer, "{}", cleanse_sms_line(&line))?;
        written += 1;
    }
    writer.flush()?;

    log::info!("Wrote {written} messages to {}", output.display());
    Ok(written)
}
