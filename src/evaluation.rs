//! Offline measurements of prediction and correction quality.
//!
//! - [`keystroke_savings`] replays a test text through the predictor and
//!   counts how many keystrokes a user would have needed.
//! - [`spelling_accuracy`] checks corrections against a misspelling list.

use crate::predictor::{Context, WordPredictor};

/// Keystrokes needed to type a text with and without recommendations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeystrokeReport {
    pub tokens: u64,
    /// Every character plus one separator per token.
    pub total_keystrokes: u64,
    pub user_keystrokes: u64,
}

impl KeystrokeReport {
    /// Share of the full keystrokes the user still had to make, in percent.
    pub fn user_percentage(&self) -> f64 {
        if self.total_keystrokes == 0 {
            return 0.0;
        }
        100.0 * self.user_keystrokes as f64 / self.total_keystrokes as f64
    }

    pub fn saved_keystrokes(&self) -> u64 {
        self.total_keystrokes.saturating_sub(self.user_keystrokes)
    }
}

/// Replay `tokens` as if typed by a user who always picks a recommendation
/// as soon as the intended word is offered.
///
/// Choosing a recommendation costs one keystroke. Words never offered are
/// typed in full followed by a space. Each token is confirmed afterwards,
/// so later recommendations see the updated session counts.
pub fn keystroke_savings<S: AsRef<str>>(
    predictor: &mut WordPredictor,
    tokens: &[S],
    sentence_start: &str,
) -> KeystrokeReport {
    let mut report = KeystrokeReport::default();
    let mut history: Vec<String> = Vec::with_capacity(3);

    for token in tokens {
        let token = token.as_ref();
        if token.trim().is_empty() {
            continue;
        }

        report.tokens += 1;
        report.total_keystrokes += token.chars().count() as u64 + 1;

        let context = Context::with_sentence_start(&history, sentence_start);
        report.user_keystrokes += typing_cost(predictor, &context, token);

        predictor.confirm_word(token);
        history.push(token.to_string());
        if history.len() > 2 {
            history.remove(0);
        }

        if report.tokens % 100 == 0 {
            log::info!(
                "{} tokens: {} of {} keystrokes ({:.2}%)",
                report.tokens,
                report.user_keystrokes,
                report.total_keystrokes,
                report.user_percentage()
            );
        }
    }

    report
}

fn typing_cost(predictor: &WordPredictor, context: &Context<'_>, token: &str) -> u64 {
    let offered = |prefix: &str| predictor.recommend(context, prefix).iter().any(|w| w == token);

    if offered("") {
        return 1;
    }

    let mut prefix = String::new();
    let mut typed = 0;
    for c in token.chars() {
        prefix.push(c);
        typed += 1;
        if offered(&prefix) {
            return typed + 1;
        }
    }

    // Typed in full, then a space.
    typed + 1
}

/// A misspelling and the word it was meant to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MisspellingCase {
    pub expected: String,
    pub misspelled: String,
}

/// Parse a misspelling list: a `$word` line names the intended word and the
/// lines that follow are misspellings of it.
pub fn parse_misspellings(text: &str) -> Vec<MisspellingCase> {
    let mut cases = Vec::new();
    let mut expected: Option<&str> = None;

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(word) = line.strip_prefix('$') {
            expected = Some(word);
            continue;
        }
        match expected {
            Some(word) => cases.push(MisspellingCase {
                expected: word.to_string(),
                misspelled: line.to_string(),
            }),
            None => log::warn!("line {}: misspelling {line:?} has no `$word` header", number + 1),
        }
    }

    cases
}

/// How many misspellings had the intended word among their corrections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellingReport {
    pub total: u64,
    pub corrected: u64,
}

impl SpellingReport {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.corrected as f64 / self.total as f64
    }
}

pub fn spelling_accuracy(predictor: &WordPredictor, cases: &[MisspellingCase]) -> SpellingReport {
    let mut report = SpellingReport::default();

    for case in cases {
        report.total += 1;
        if predictor.correct(&case.misspelled).contains(&case.expected) {
            report.corrected += 1;
        }

        if report.total % 100 == 0 {
            log::info!(
                "{} misspellings checked, {} corrected",
                report.total,
                report.corrected
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_io::{parse_lines, to_lines};
    use crate::trigram::CountAggregator;

    fn predictor_from<'a>(tokens: impl IntoIterator<Item = &'a str>) -> WordPredictor {
        let mut aggregator = CountAggregator::new();
        aggregator.ingest_all(tokens);
        WordPredictor::new(parse_lines(to_lines(&aggregator.finalize())).unwrap(), 3, 2)
    }

    #[test]
    fn test_known_sentence_costs_one_key_per_word() {
        let mut predictor = predictor_from("the cat sat . the dog sat .".split(' '));
        let report = keystroke_savings(&mut predictor, &["the", "cat", "sat", "."], ".");

        assert_eq!(report.tokens, 4);
        assert_eq!(report.total_keystrokes, 14);
        assert_eq!(report.user_keystrokes, 4);
        assert_eq!(report.saved_keystrokes(), 10);
    }

    #[test]
    fn test_word_offered_after_first_letter() {
        let mut predictor = predictor_from("the cat sat . the dog sat .".split(' '));
        let report = keystroke_savings(&mut predictor, &["dog"], ".");

        // "dog" is not among the empty-prefix suggestions; "d" then choose.
        assert_eq!(report.total_keystrokes, 4);
        assert_eq!(report.user_keystrokes, 2);
        assert_eq!(report.user_percentage(), 50.0);
    }

    #[test]
    fn test_unknown_word_is_typed_in_full() {
        let mut predictor = predictor_from("the cat sat . the dog sat .".split(' '));
        let report = keystroke_savings(&mut predictor, &["zzz", " "], ".");

        assert_eq!(report.tokens, 1);
        assert_eq!(report.total_keystrokes, 4);
        assert_eq!(report.user_keystrokes, 4);
        assert_eq!(report.user_percentage(), 100.0);
        assert_eq!(predictor.unigram_count_of("zzz"), 1);
    }

    #[test]
    fn test_parse_misspellings() {
        let cases = parse_misspellings("orphan\n$word\nwrod\n\n$ward\n wardd \n");
        assert_eq!(
            cases,
            vec![
                MisspellingCase {
                    expected: "word".to_string(),
                    misspelled: "wrod".to_string()
                },
                MisspellingCase {
                    expected: "ward".to_string(),
                    misspelled: "wardd".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_spelling_accuracy() {
        let tokens = std::iter::repeat("word")
            .take(10)
            .chain(std::iter::repeat("ward").take(5));
        let predictor = predictor_from(tokens);
        let cases = parse_misspellings("$word\nwrod\nwodr\n$ward\nwardd\nxxxxxxx\n");

        let report = spelling_accuracy(&predictor, &cases);
        assert_eq!(report, SpellingReport { total: 4, corrected: 3 });
        assert_eq!(report.percentage(), 75.0);
    }
}
