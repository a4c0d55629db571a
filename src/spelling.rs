// spelling.rs - Edit-distance spelling correction ranked by corpus frequency
// Candidates are every vocabulary word reachable with up to two edits.

use crate::vocabulary::{Vocabulary, WordId};
use ahash::AHashSet;

/// Largest supported edit distance; the neighborhood grows by roughly
/// `54 * len` strings per level.
pub const MAX_EDIT_DISTANCE: u32 = 2;

pub struct SpellingCorrector {
    max_edit_distance: u32,
}

impl Default for SpellingCorrector {
    fn default() -> Self {
        Self::new(MAX_EDIT_DISTANCE)
    }
}

impl SpellingCorrector {
    pub fn new(max_edit_distance: u32) -> Self {
        if max_edit_distance > MAX_EDIT_DISTANCE {
            log::warn!(
                "max edit distance {max_edit_distance} is not supported, using {MAX_EDIT_DISTANCE}"
            );
        }
        Self {
            max_edit_distance: max_edit_distance.min(MAX_EDIT_DISTANCE),
        }
    }

    pub fn max_edit_distance(&self) -> u32 {
        self.max_edit_distance
    }

    /// Suggest up to `window` vocabulary words close to `word`.
    ///
    /// Suggestions are ordered by unigram count, highest first. Equal counts
    /// fall back to id order. Returns an empty list if nothing is in range.
    pub fn correct(
        &self,
        word: &str,
        vocabulary: &Vocabulary,
        unigram_counts: &[u64],
        window: usize,
    ) -> Vec<String> {
        let mut ranked: Vec<(WordId, u64)> = self
            .known_candidates(word, vocabulary)
            .into_iter()
            .map(|id| (id, unigram_counts.get(id as usize).copied().unwrap_or(0)))
            .collect();

        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(window);

        ranked
            .into_iter()
            .filter_map(|(id, _)| vocabulary.word(id).map(str::to_string))
            .collect()
    }

    /// Ids of all vocabulary words within the edit distance of `word`.
    pub fn known_candidates(&self, word: &str, vocabulary: &Vocabulary) -> AHashSet<WordId> {
        let mut known = AHashSet::new();
        if let Some(id) = vocabulary.id(word) {
            known.insert(id);
        }

        let mut frontier = AHashSet::new();
        frontier.insert(word.to_string());

        for depth in 1..=self.max_edit_distance {
            // The outermost level is only checked, never stored.
            let last = depth == self.max_edit_distance;
            let mut next = AHashSet::new();

            for current in &frontier {
                for_each_edit(current, |candidate| {
                    if let Some(id) = vocabulary.id(&candidate) {
                        known.insert(id);
                    }
                    if !last {
                        next.insert(candidate);
                    }
                });
            }

            frontier = next;
        }

        known
    }
}

/// All strings one edit away from `word`.
pub fn edits1(word: &str) -> AHashSet<String> {
    let mut edits = AHashSet::new();
    for_each_edit(word, |candidate| {
        edits.insert(candidate);
    });
    edits
}

/// Visit every deletion, adjacent transposition, substitution and insertion
/// of `word` over `a..=z`. The same string may be visited more than once.
fn for_each_edit(word: &str, mut visit: impl FnMut(String)) {
    let chars: Vec<char> = word.chars().collect();

    for i in 0..=chars.len() {
        let (left, right) = chars.split_at(i);

        if let Some((_, rest)) = right.split_first() {
            visit(left.iter().chain(rest).collect());

            if !rest.is_empty() {
                visit(
                    left.iter()
                        .chain([&right[1], &right[0]])
                        .chain(&right[2..])
                        .collect(),
                );
            }

            for c in 'a'..='z' {
                visit(left.iter().chain(std::iter::once(&c)).chain(rest).collect());
            }
        }

        for c in 'a'..='z' {
            visit(left.iter().chain(std::iter::once(&c)).chain(right).collect());
        }
    }
}
