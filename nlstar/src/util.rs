use std::collections::HashSet;
use std::rc::Rc;

use crate::row::Word;

#[inline]
pub fn alphabet_equal(a: &[Rc<str>], b: &[Rc<str>]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let set1 = a.iter().collect::<HashSet<_>>();
    let set2 = b.iter().collect::<HashSet<_>>();
    set1 == set2
}

/// Renders a word as a human-readable label: `ε` for the empty word, its symbols
/// joined with `·` otherwise. Used by both [`crate::dfa::build_pta`] and
/// [`crate::learner::NLStar`] to name states after the prefix they represent.
pub fn word_label(word: &Word) -> String {
    if word.is_empty() {
        "ε".to_string()
    } else {
        word.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join("·")
    }
}
