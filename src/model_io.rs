//! Reading and writing the line-based model file.
//!
//! # File Format
//!
//! ```text
//! <unique_words> <total_words>
//! <id> <word> <unigram_count>          one line per word, in id order
//! <id1> <id2> <log_prob>               bigram block
//! -2
//! <id1> <id2> <id3> <log_prob>         trigram block
//! -1
//! ```
//!
//! Bigram lines hold `ln(count(w1 w2) / count(w1))` and trigram lines hold
//! `ln(count(w1 w2 w3) / count(w1 w2))`, both printed with exactly 15
//! decimals. Files produced by other tools that use the same format compare
//! equal byte for byte.

use crate::error::{ModelError, ModelResult};
use crate::trigram::NgramCounts;
use crate::vocabulary::{Vocabulary, WordId};
use ahash::AHashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Marks the end of the bigram block.
pub const END_OF_BIGRAMS: &str = "-2";
/// Marks the end of the trigram block.
pub const END_OF_FILE: &str = "-1";

/// Render the counts as model file lines, without line terminators.
pub fn to_lines(counts: &NgramCounts) -> Vec<String> {
    let vocabulary = counts.vocabulary();
    let mut rows = Vec::with_capacity(vocabulary.len() + 2);
    let mut bigram_rows = Vec::new();
    let mut trigram_rows = Vec::new();

    rows.push(format!("{} {}", vocabulary.len(), counts.total_words()));

    for (id, word) in vocabulary.iter() {
        let frequency = counts.unigram_count(id);
        rows.push(format!("{id} {word} {frequency}"));

        let Some(successors) = counts.bigrams(id) else {
            continue;
        };
        for (second, pair_count) in successors.iter() {
            let p = (pair_count as f64 / frequency as f64).ln();
            bigram_rows.push(format!("{id} {second} {p:.15}"));

            if let Some(continuations) = counts.trigrams(id, second) {
                for (third, triple_count) in continuations.iter() {
                    let p = (triple_count as f64 / pair_count as f64).ln();
                    trigram_rows.push(format!("{id} {second} {third} {p:.15}"));
                }
            }
        }
    }

    rows.append(&mut bigram_rows);
    rows.push(END_OF_BIGRAMS.to_string());
    rows.append(&mut trigram_rows);
    rows.push(END_OF_FILE.to_string());
    rows
}

/// Write the model to any writer, one line per row.
pub fn write_lines<W: Write>(counts: &NgramCounts, mut writer: W) -> io::Result<()> {
    for row in to_lines(counts) {
        writeln!(writer, "{row}")?;
    }
    writer.flush()
}

/// Write the model to `path`, replacing any existing file.
pub fn write_model(counts: &NgramCounts, path: &Path) -> ModelResult<()> {
    let file = File::create(path).map_err(|e| ModelError::from_open(e, path))?;
    write_lines(counts, BufWriter::new(file))?;
    log::info!("Wrote model to {}", path.display());
    Ok(())
}

/// A parsed model: vocabulary, unigram counts and log-probability tables.
///
/// Continuation lists keep the order of the lines in the file.
#[derive(Debug, Clone)]
pub struct LanguageModel {
    pub(crate) vocabulary: Vocabulary,
    pub(crate) unigram_counts: Vec<u64>,
    pub(crate) total_words: u64,
    pub(crate) bigram_probs: AHashMap<WordId, Vec<(WordId, f64)>>,
    pub(crate) trigram_probs: AHashMap<(WordId, WordId), Vec<(WordId, f64)>>,
}

impl LanguageModel {
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn total_words(&self) -> u64 {
        self.total_words
    }

    pub fn unigram_count(&self, id: WordId) -> u64 {
        self.unigram_counts.get(id as usize).copied().unwrap_or(0)
    }

    pub fn bigram_continuations(&self, first: WordId) -> Option<&[(WordId, f64)]> {
        self.bigram_probs.get(&first).map(Vec::as_slice)
    }

    pub fn trigram_continuations(&self, first: WordId, second: WordId) -> Option<&[(WordId, f64)]> {
        self.trigram_probs.get(&(first, second)).map(Vec::as_slice)
    }

    pub fn bigram_log_prob(&self, first: WordId, second: WordId) -> Option<f64> {
        lookup(self.bigram_continuations(first)?, second)
    }

    pub fn trigram_log_prob(&self, first: WordId, second: WordId, third: WordId) -> Option<f64> {
        lookup(self.trigram_continuations(first, second)?, third)
    }
}

fn lookup(continuations: &[(WordId, f64)], word: WordId) -> Option<f64> {
    continuations
        .iter()
        .find(|(id, _)| *id == word)
        .map(|(_, p)| *p)
}

/// Parse model lines held in memory.
pub fn parse_lines<I, S>(lines: I) -> ModelResult<LanguageModel>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parse(lines.into_iter().map(|line| Ok(line.into())))
}

/// Parse a model from a buffered reader.
pub fn parse_reader<R: BufRead>(reader: R) -> ModelResult<LanguageModel> {
    parse(reader.lines())
}

/// Read and parse the model file at `path`.
///
/// The file is closed before this returns, whether parsing succeeded or not.
pub fn read_model(path: &Path) -> ModelResult<LanguageModel> {
    let file = File::open(path).map_err(|e| ModelError::from_open(e, path))?;
    let model = parse_reader(BufReader::new(file))?;
    log::info!("Loaded model from {}", path.display());
    Ok(model)
}

/// Line source that tracks 1-based line numbers for error reports.
struct Lines<I> {
    inner: I,
    number: usize,
}

impl<I: Iterator<Item = io::Result<String>>> Lines<I> {
    fn next_line(&mut self) -> ModelResult<Option<String>> {
        match self.inner.next() {
            None => Ok(None),
            Some(line) => {
                self.number += 1;
                Ok(Some(line?))
            }
        }
    }
}

fn parse<I>(lines: I) -> ModelResult<LanguageModel>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut lines = Lines {
        inner: lines,
        number: 0,
    };

    let header = lines
        .next_line()?
        .ok_or_else(|| ModelError::malformed(1, "missing header"))?;
    let (unique_words, total_words) = match fields(&header)[..] {
        [unique, total] => (
            parse_number::<usize>(unique, lines.number, "unique word count")?,
            parse_number::<u64>(total, lines.number, "total word count")?,
        ),
        _ => {
            return Err(ModelError::malformed(
                lines.number,
                "header must be `<unique_words> <total_words>`",
            ))
        }
    };

    let mut vocabulary = Vocabulary::new();
    // The header is untrusted; grow as lines arrive.
    let mut unigram_counts = Vec::new();
    for expected in 0..unique_words {
        let Some(line) = lines.next_line()? else {
            return Err(ModelError::malformed(
                lines.number + 1,
                format!("expected {unique_words} unigram lines, found {expected}"),
            ));
        };
        let number = lines.number;
        let [id, word, count] = fields(&line)[..] else {
            return Err(ModelError::malformed(
                number,
                "unigram line must be `<id> <word> <count>`",
            ));
        };
        if parse_number::<usize>(id, number, "word id")? != expected {
            return Err(ModelError::malformed(
                number,
                format!("word id {id} out of sequence, expected {expected}"),
            ));
        }
        let count = parse_number::<u64>(count, number, "unigram count")?;
        if count == 0 {
            return Err(ModelError::malformed(number, "unigram count must be positive"));
        }
        if !vocabulary.get_or_insert(word).1 {
            return Err(ModelError::malformed(number, format!("duplicate word {word:?}")));
        }
        unigram_counts.push(count);
    }

    let mut bigram_probs: AHashMap<WordId, Vec<(WordId, f64)>> = AHashMap::new();
    loop {
        let Some(line) = lines.next_line()? else {
            return Err(ModelError::malformed(
                lines.number + 1,
                format!("missing `{END_OF_BIGRAMS}` sentinel"),
            ));
        };
        let number = lines.number;
        match fields(&line)[..] {
            [END_OF_BIGRAMS] => break,
            [END_OF_FILE] => {
                return Err(ModelError::malformed(
                    number,
                    format!("missing `{END_OF_BIGRAMS}` sentinel before `{END_OF_FILE}`"),
                ))
            }
            [first, second, p] => {
                let first = resolve_id(first, number, unique_words)?;
                let second = resolve_id(second, number, unique_words)?;
                let p = parse_log_prob(p, number)?;
                // Parsing is the only writer of the probability tables.
                bigram_probs.entry(first).or_default().push((second, p));
            }
            _ => {
                return Err(ModelError::malformed(
                    number,
                    "bigram line must be `<id1> <id2> <log_prob>`",
                ))
            }
        }
    }

    let mut trigram_probs: AHashMap<(WordId, WordId), Vec<(WordId, f64)>> = AHashMap::new();
    loop {
        let Some(line) = lines.next_line()? else {
            return Err(ModelError::malformed(
                lines.number + 1,
                format!("missing `{END_OF_FILE}` sentinel"),
            ));
        };
        let number = lines.number;
        match fields(&line)[..] {
            [END_OF_FILE] => break,
            [first, second, third, p] => {
                let first = resolve_id(first, number, unique_words)?;
                let second = resolve_id(second, number, unique_words)?;
                let third = resolve_id(third, number, unique_words)?;
                let p = parse_log_prob(p, number)?;
                trigram_probs
                    .entry((first, second))
                    .or_default()
                    .push((third, p));
            }
            _ => {
                return Err(ModelError::malformed(
                    number,
                    "trigram line must be `<id1> <id2> <id3> <log_prob>`",
                ))
            }
        }
    }

    log::debug!(
        "Parsed {} words, {} bigram contexts, {} trigram contexts",
        vocabulary.len(),
        bigram_probs.len(),
        trigram_probs.len()
    );

    Ok(LanguageModel {
        vocabulary,
        unigram_counts,
        total_words,
        bigram_probs,
        trigram_probs,
    })
}

fn fields(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

fn parse_number<T: std::str::FromStr>(field: &str, line: usize, what: &str) -> ModelResult<T> {
    field
        .parse()
        .map_err(|_| ModelError::malformed(line, format!("invalid {what}: {field:?}")))
}

fn parse_log_prob(field: &str, line: usize) -> ModelResult<f64> {
    let p: f64 = parse_number(field, line, "log probability")?;
    if !p.is_finite() {
        return Err(ModelError::malformed(line, format!("non-finite log probability {field}")));
    }
    Ok(p)
}

fn resolve_id(field: &str, line: usize, unique_words: usize) -> ModelResult<WordId> {
    let id: i64 = parse_number(field, line, "word id")?;
    if id < 0 || id as usize >= unique_words {
        return Err(ModelError::UnknownWordReference { line, id });
    }
    Ok(id as WordId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigram::CountAggregator;

    const SENTENCES: [&str; 8] = ["the", "cat", "sat", ".", "the", "dog", "sat", "."];

    fn sentence_counts() -> NgramCounts {
        let mut aggregator = CountAggregator::new();
        aggregator.ingest_all(SENTENCES);
        aggregator.finalize()
    }

    #[test]
    fn test_emitted_lines() {
        let lines = to_lines(&sentence_counts());
        let expected = vec![
            "5 8",
            "0 the 2",
            "1 cat 1",
            "2 sat 2",
            "3 . 2",
            "4 dog 1",
            "0 1 -0.693147180559945",
            "0 4 -0.693147180559945",
            "1 2 0.000000000000000",
            "2 3 0.000000000000000",
            "3 0 -0.693147180559945",
            "4 2 0.000000000000000",
            "-2",
            "0 1 2 0.000000000000000",
            "0 4 2 0.000000000000000",
            "1 2 3 0.000000000000000",
            "2 3 0 -0.693147180559945",
            "3 0 4 0.000000000000000",
            "4 2 3 0.000000000000000",
            "-1",
        ];
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_round_trip_matches_counts() {
        let counts = sentence_counts();
        let model = parse_lines(to_lines(&counts)).unwrap();

        assert_eq!(model.vocabulary(), counts.vocabulary());
        assert_eq!(model.total_words(), 8);
        for (id, _) in counts.vocabulary().iter() {
            assert_eq!(model.unigram_count(id), counts.unigram_count(id));
            for (second, _) in counts.bigrams(id).into_iter().flat_map(|c| c.iter()) {
                let direct = counts.bigram_log_prob(id, second).unwrap();
                let parsed = model.bigram_log_prob(id, second).unwrap();
                assert!((direct - parsed).abs() <= 1e-12);

                for (third, _) in counts.trigrams(id, second).into_iter().flat_map(|c| c.iter()) {
                    let direct = counts.trigram_log_prob(id, second, third).unwrap();
                    let parsed = model.trigram_log_prob(id, second, third).unwrap();
                    assert!((direct - parsed).abs() <= 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_log_probs_are_valid() {
        let mut aggregator = CountAggregator::new();
        aggregator.ingest_all("a b a c a b b a c c a".split(' '));
        let lines = to_lines(&aggregator.finalize());
        let model = parse_lines(lines).unwrap();

        let all = model
            .bigram_probs
            .values()
            .chain(model.trigram_probs.values())
            .flatten();
        for (_, p) in all {
            assert!(p.is_finite());
            assert!(*p <= 0.0);
        }
    }

    #[test]
    fn test_short_unigram_block() {
        let err = parse_lines(["5 20", "0 a 4", "1 b 4", "-2", "-1"]).unwrap_err();
        assert!(matches!(err, ModelError::MalformedModel { .. }), "{err}");
    }

    #[test]
    fn test_bad_header() {
        let err = parse_lines(["five 20"]).unwrap_err();
        assert!(matches!(err, ModelError::MalformedModel { line: 1, .. }));

        let err = parse_lines(Vec::<String>::new()).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_header_larger_than_file() {
        let err = parse_lines(["18446744073709551615 0", "0 a 1", "-2", "-1"]).unwrap_err();
        assert!(err.is_malformed());

        let err = parse_lines(["1000000000000 0", "0 a 1"]).unwrap_err();
        assert!(matches!(err, ModelError::MalformedModel { line: 3, .. }));
    }

    #[test]
    fn test_unknown_word_reference() {
        let err = parse_lines(["2 3", "0 a 2", "1 b 1", "0 7 -0.5", "-2", "-1"]).unwrap_err();
        assert!(matches!(err, ModelError::UnknownWordReference { line: 4, id: 7 }));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_missing_sentinels() {
        let err = parse_lines(["1 1", "0 a 1"]).unwrap_err();
        assert!(matches!(err, ModelError::MalformedModel { line: 3, .. }));

        let err = parse_lines(["1 1", "0 a 1", "-1"]).unwrap_err();
        assert!(err.is_malformed());

        let err = parse_lines(["1 1", "0 a 1", "-2", "0 0 0 -0.1"]).unwrap_err();
        assert!(matches!(err, ModelError::MalformedModel { line: 5, .. }));
    }

    #[test]
    fn test_duplicate_word() {
        let err = parse_lines(["2 2", "0 a 1", "1 a 1", "-2", "-1"]).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_empty_model() {
        let model = parse_lines(["0 0", "-2", "-1"]).unwrap();
        assert!(model.vocabulary().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = read_model(Path::new("/nonexistent/wordpredict/model.txt")).unwrap_err();
        assert!(matches!(err, ModelError::ModelFileNotFound { .. }));
    }
}
