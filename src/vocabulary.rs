//! Bidirectional word ↔ id mapping.
//!
//! Ids are dense (`0..len`) and handed out in first-seen order. Once a word
//! has an id it keeps it for the lifetime of the index.

use ahash::AHashMap;

/// Identifier of a vocabulary word.
pub type WordId = u32;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    /// id → word.
    words: Vec<String>,
    /// word → id.
    index: AHashMap<String, WordId>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the id of `word`, assigning the next free id if it is new.
    ///
    /// Returns the id and whether the word was inserted. This is the only
    /// way to grow the index; lookups through [`Vocabulary::id`] never
    /// create entries.
    pub fn get_or_insert(&mut self, word: &str) -> (WordId, bool) {
        if let Some(&id) = self.index.get(word) {
            return (id, false);
        }
        let id = self.words.len() as WordId;
        self.words.push(word.to_string());
        self.index.insert(word.to_string(), id);
        (id, true)
    }

    pub fn id(&self, word: &str) -> Option<WordId> {
        self.index.get(word).copied()
    }

    pub fn word(&self, id: WordId) -> Option<&str> {
        self.words.get(id as usize).map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate `(id, word)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (WordId, &str)> + '_ {
        self.words
            .iter()
            .enumerate()
            .map(|(id, word)| (id as WordId, word.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense_and_stable() {
        let mut vocab = Vocabulary::new();
        assert_eq!(vocab.get_or_insert("the"), (0, true));
        assert_eq!(vocab.get_or_insert("cat"), (1, true));
        assert_eq!(vocab.get_or_insert("the"), (0, false));
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.word(1), Some("cat"));
        assert_eq!(vocab.id("cat"), Some(1));
        assert_eq!(vocab.word(2), None);
    }

    #[test]
    fn test_lookup_does_not_insert() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.id("missing"), None);
        assert!(vocab.is_empty());
    }

    #[test]
    fn test_iter_in_id_order() {
        let mut vocab = Vocabulary::new();
        for word in ["b", "a", "c", "a"] {
            vocab.get_or_insert(word);
        }
        let words: Vec<_> = vocab.iter().map(|(_, w)| w).collect();
        assert_eq!(words, vec!["b", "a", "c"]);
    }
}
