//! Word tracking and suggestion refresh for an interactive typing session.

use crate::config::Config;
use crate::predictor::{Context, WordPredictor};

/// Tokens printed without a space before them.
const ATTACHED_PUNCTUATION: [&str; 4] = [".", ",", "!", "?"];

/// One user input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Letter(char),
    Backspace,
    /// Pick the n-th suggestion, 1-based.
    Choose(usize),
    /// Finish the typed word.
    Space,
    /// Discard the typed word.
    Reset,
    Quit,
}

impl Key {
    /// Parse one console input line: `quit`, `reset`, `back`, `N-` to choose
    /// a suggestion, an empty line or a single whitespace character to finish
    /// the word, or a single character.
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "quit" => return Some(Self::Quit),
            "reset" => return Some(Self::Reset),
            "back" => return Some(Self::Backspace),
            "" | " " => return Some(Self::Space),
            _ => {}
        }

        if let Some(number) = input.strip_suffix('-') {
            if let Ok(n) = number.parse::<usize>() {
                return Some(Self::Choose(n));
            }
        }

        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_whitespace() => Some(Self::Space),
            (Some(c), None) => Some(Self::Letter(c)),
            _ => None,
        }
    }
}

/// What a key press did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The partial word changed, or the key had no effect.
    Typing,
    /// A word was appended to the text.
    Confirmed(String),
    /// The partial word was discarded.
    Reset,
    /// The session is over.
    Quit,
}

/// The typing state machine.
pub struct TypingSession {
    predictor: WordPredictor,
    sentence_start: String,
    words: Vec<String>,
    current_word: String,
    suggestions: Vec<String>,
    finished: bool,
}

impl TypingSession {
    pub fn new(predictor: WordPredictor, sentence_start: impl Into<String>) -> Self {
        let mut session = Self {
            predictor,
            sentence_start: sentence_start.into(),
            words: Vec::new(),
            current_word: String::new(),
            suggestions: Vec::new(),
            finished: false,
        };
        session.refresh();
        session
    }

    pub fn with_config(predictor: WordPredictor, config: &Config) -> Self {
        Self::new(predictor, config.sentence_start_token.clone())
    }

    pub fn handle_key(&mut self, key: Key) -> SessionEvent {
        if self.finished {
            return SessionEvent::Quit;
        }

        match key {
            Key::Letter(c) if c.is_whitespace() => self.finish_word(),
            Key::Letter(c) => {
                self.current_word.push(c);
                self.refresh();
                SessionEvent::Typing
            }
            Key::Backspace => {
                if self.current_word.pop().is_some() {
                    self.refresh();
                }
                SessionEvent::Typing
            }
            Key::Choose(n) => {
                let chosen = n.checked_sub(1).and_then(|i| self.suggestions.get(i)).cloned();
                match chosen {
                    Some(word) => self.confirm(word),
                    None => SessionEvent::Typing,
                }
            }
            Key::Space => self.finish_word(),
            Key::Reset => {
                self.current_word.clear();
                self.refresh();
                SessionEvent::Reset
            }
            Key::Quit => {
                self.finished = true;
                SessionEvent::Quit
            }
        }
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn predictor(&self) -> &WordPredictor {
        &self.predictor
    }

    /// Start over with an empty text. Session counts are kept.
    pub fn restart(&mut self) {
        self.words.clear();
        self.current_word.clear();
        self.finished = false;
        self.refresh();
    }

    /// The confirmed text followed by the partial word and a cursor.
    pub fn render(&self) -> String {
        let mut text = String::new();
        for word in &self.words {
            if ATTACHED_PUNCTUATION.contains(&word.as_str()) {
                text.truncate(text.trim_end().len());
            }
            text.push_str(word);
            text.push(' ');
        }
        text.push_str(&self.current_word);
        text.push('_');
        text
    }

    fn context(&self) -> Context<'_> {
        Context::with_sentence_start(&self.words, &self.sentence_start)
    }

    fn finish_word(&mut self) -> SessionEvent {
        if self.current_word.is_empty() {
            return SessionEvent::Typing;
        }
        let word = std::mem::take(&mut self.current_word);
        self.confirm(word)
    }

    fn confirm(&mut self, word: String) -> SessionEvent {
        self.predictor.confirm_word(&word);
        self.words.push(word.clone());
        self.current_word.clear();
        self.refresh();
        SessionEvent::Confirmed(word)
    }

    fn refresh(&mut self) {
        let suggestions = self.predictor.recommend(&self.context(), &self.current_word);
        self.suggestions = suggestions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_io::{parse_lines, to_lines};
    use crate::trigram::CountAggregator;

    fn session() -> TypingSession {
        let mut aggregator = CountAggregator::new();
        aggregator.ingest_all("the cat sat . the dog sat . the cat ran .".split(' '));
        let model = parse_lines(to_lines(&aggregator.finalize())).unwrap();
        TypingSession::new(WordPredictor::new(model, 3, 2), ".")
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(Key::parse("quit"), Some(Key::Quit));
        assert_eq!(Key::parse("reset"), Some(Key::Reset));
        assert_eq!(Key::parse("back"), Some(Key::Backspace));
        assert_eq!(Key::parse(" "), Some(Key::Space));
        assert_eq!(Key::parse("\t"), Some(Key::Space));
        assert_eq!(Key::parse("2-"), Some(Key::Choose(2)));
        assert_eq!(Key::parse("k"), Some(Key::Letter('k')));
        assert_eq!(Key::parse("é"), Some(Key::Letter('é')));
        assert_eq!(Key::parse("-"), Some(Key::Letter('-')));
        assert_eq!(Key::parse("hello"), None);
    }

    #[test]
    fn test_sentence_start_context() {
        let session = session();
        // "." is followed by "the" in the corpus.
        assert_eq!(session.suggestions()[0], "the");
    }

    #[test]
    fn test_choose_suggestion() {
        let mut session = session();
        assert_eq!(
            session.handle_key(Key::Choose(1)),
            SessionEvent::Confirmed("the".to_string())
        );
        assert_eq!(session.suggestions(), ["cat", "dog", "the"]);
        assert_eq!(session.predictor().unigram_count_of("the"), 4);
    }

    #[test]
    fn test_invalid_choice_is_ignored() {
        let mut session = session();
        assert_eq!(session.handle_key(Key::Choose(0)), SessionEvent::Typing);
        assert_eq!(session.handle_key(Key::Choose(9)), SessionEvent::Typing);
        assert!(session.words().is_empty());
    }

    #[test]
    fn test_typing_filters_suggestions() {
        let mut session = session();
        session.handle_key(Key::Choose(1));
        session.handle_key(Key::Letter('d'));
        assert_eq!(session.suggestions(), ["dog"]);
        session.handle_key(Key::Backspace);
        assert_eq!(session.current_word(), "");
        assert_eq!(session.suggestions(), ["cat", "dog", "the"]);
    }

    #[test]
    fn test_space_adds_new_word() {
        let mut session = session();
        for c in "fox".chars() {
            session.handle_key(Key::Letter(c));
        }
        assert_eq!(
            session.handle_key(Key::Space),
            SessionEvent::Confirmed("fox".to_string())
        );
        assert_eq!(session.predictor().unigram_count_of("fox"), 1);
        assert_eq!(session.handle_key(Key::Space), SessionEvent::Typing);
        assert_eq!(session.words(), ["fox"]);
    }

    #[test]
    fn test_whitespace_letter_finishes_word() {
        let mut session = session();
        for c in "fox".chars() {
            session.handle_key(Key::Letter(c));
        }
        assert_eq!(
            session.handle_key(Key::Letter('\t')),
            SessionEvent::Confirmed("fox".to_string())
        );
        assert_eq!(session.handle_key(Key::Letter('\n')), SessionEvent::Typing);
        assert_eq!(session.words(), ["fox"]);
        assert_eq!(session.current_word(), "");
        assert_eq!(session.predictor().unigram_count_of("fox"), 1);
    }

    #[test]
    fn test_misspelling_suggests_corrections() {
        let mut session = session();
        for c in "dgo".chars() {
            session.handle_key(Key::Letter(c));
        }
        assert_eq!(session.suggestions()[0], "dog");
    }

    #[test]
    fn test_reset_and_quit() {
        let mut session = session();
        session.handle_key(Key::Letter('c'));
        assert_eq!(session.handle_key(Key::Reset), SessionEvent::Reset);
        assert_eq!(session.current_word(), "");
        assert_eq!(session.handle_key(Key::Quit), SessionEvent::Quit);
        assert!(session.is_finished());
        assert_eq!(session.handle_key(Key::Letter('a')), SessionEvent::Quit);

        session.restart();
        assert!(!session.is_finished());
    }

    #[test]
    fn test_render() {
        let mut session = session();
        for key in [Key::Choose(1), Key::Choose(1), Key::Letter('s'), Key::Space] {
            session.handle_key(key);
        }
        session.handle_key(Key::Letter('.'));
        session.handle_key(Key::Space);
        session.handle_key(Key::Letter('t'));
        assert_eq!(session.render(), "the cat s. t_");
    }
}
