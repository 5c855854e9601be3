//! The observation table NL* fills in while it narrows in on a hypothesis.
//!
//! An `ObservationTable` tracks three sets of words over a fixed alphabet — the
//! *upper* prefixes `S` (candidate state representatives), the *lower* prefixes `R`
//! (their one-symbol extensions, `S·Σ \ S`), and the *suffixes* `E` (the experiments
//! used to tell rows apart) — plus a membership-query cache `T : S∪R·E → bool`. A
//! [`crate::row::Row`] is simply the restriction of `T` to one prefix across all of
//! `E`, and [`ObservationTable::is_closed`]/[`ObservationTable::is_consistent`] are the
//! two invariants NL*'s main loop restores whenever a membership or equivalence query
//! breaks them.
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::oracle::Oracle;
use crate::row::{word_concat, Row, Word};

#[derive(Debug, Clone)]
pub struct ObservationTable {
    alphabet: Rc<[Rc<str>]>,
    suffixes: IndexSet<Word>,
    upper: IndexSet<Word>,
    lower: IndexSet<Word>,
    cache: HashMap<Word, bool>,
}

impl ObservationTable {
    pub fn new(alphabet: Rc<[Rc<str>]>) -> Self {
        let mut suffixes = IndexSet::new();
        suffixes.insert(Word::new());
        let mut upper = IndexSet::new();
        upper.insert(Word::new());

        let mut table = Self {
            alphabet,
            suffixes,
            upper,
            lower: IndexSet::new(),
            cache: HashMap::new(),
        };
        table.update_meta_data();
        table
    }

    /// Fills in every cell the current `S`, `R` and `E` sets require, querying the
    /// oracle for any word not already cached.
    pub fn initialize(&mut self, oracle: &impl Oracle) {
        self.fill(oracle);
    }

    fn fill(&mut self, oracle: &impl Oracle) {
        let words: Vec<Word> = self
            .upper
            .iter()
            .chain(self.lower.iter())
            .flat_map(|prefix| {
                self.suffixes
                    .iter()
                    .map(move |suffix| word_concat(prefix, suffix))
            })
            .filter(|word| !self.cache.contains_key(word))
            .collect();
        for word in words {
            let answer = oracle.membership(&word);
            self.cache.insert(word, answer);
        }
    }

    /// Recomputes `R = S·Σ \ S` from the current `S`. Must be called (followed by
    /// [`ObservationTable::initialize`]) whenever `S` grows.
    pub fn update_meta_data(&mut self) {
        self.lower = self
            .upper
            .iter()
            .flat_map(|prefix| {
                self.alphabet
                    .iter()
                    .map(move |symbol| word_concat(prefix, std::slice::from_ref(symbol)))
            })
            .filter(|word| !self.upper.contains(word))
            .collect();
    }

    pub fn alphabet(&self) -> &Rc<[Rc<str>]> {
        &self.alphabet
    }

    pub fn suffixes(&self) -> &IndexSet<Word> {
        &self.suffixes
    }

    pub fn upper(&self) -> &IndexSet<Word> {
        &self.upper
    }

    pub fn lower(&self) -> &IndexSet<Word> {
        &self.lower
    }

    /// The row of `prefix`: one boolean per suffix in `E`'s insertion order. Panics if
    /// the table hasn't been filled for `prefix` against every current suffix — that
    /// would be an internal invariant violation, not a user error.
    pub fn row(&self, prefix: &Word) -> Row {
        Row::new(
            self.suffixes
                .iter()
                .map(|suffix| {
                    let word = word_concat(prefix, suffix);
                    *self
                        .cache
                        .get(&word)
                        .unwrap_or_else(|| panic!("missing membership cache entry for {word:?}"))
                })
                .collect(),
        )
    }

    /// All prefixes currently in `S ∪ R`, in `S` first then `R` order.
    pub fn all_prefixes(&self) -> impl Iterator<Item = &Word> {
        self.upper.iter().chain(self.lower.iter())
    }

    /// A row is *prime* if it cannot be expressed as the join of other rows (drawn
    /// from `S ∪ R`) that are strictly smaller than it. Prime rows become the states
    /// of the conjectured NFA; composed rows are realized as a union of prime states.
    pub fn is_prime(&self, prefix: &Word) -> bool {
        let row = self.row(prefix);
        let width = row.len();
        let smaller_rows: Vec<Row> = self
            .all_prefixes()
            .map(|p| self.row(p))
            .filter(|r| r.le(&row) && r != &row)
            .collect();
        Row::join_all(width, smaller_rows.iter()) != row
    }

    /// Returns the first lower prefix whose row cannot be written as the join of the
    /// upper rows below it — i.e. the table is missing a representative for it in `S`.
    pub fn is_closed(&self) -> Option<&Word> {
        self.lower.iter().find(|prefix| {
            let row = self.row(prefix);
            let width = row.len();
            let covering: Vec<Row> = self
                .upper
                .iter()
                .map(|u| self.row(u))
                .filter(|r| r.le(&row))
                .collect();
            Row::join_all(width, covering.iter()) != row
        })
    }

    /// Moves `prefix` (assumed to be in `R`) into `S`, then recomputes `R`. Callers
    /// must re-[`initialize`](ObservationTable::initialize) afterwards to fill the
    /// newly required cells.
    pub fn promote(&mut self, prefix: Word) {
        self.upper.insert(prefix);
        self.update_meta_data();
    }

    /// Checks the generalized (RFSA) consistency condition: for any two upper
    /// prefixes `u1`, `u2` with `row(u1) ≤ row(u2)`, and for every symbol `a`,
    /// `row(u1·a) ≤ row(u2·a)` must hold too. Returns a new suffix to add (`a` followed
    /// by the distinguishing suffix) the first time this fails.
    pub fn is_consistent(&self) -> Option<Word> {
        let upper: Vec<&Word> = self.upper.iter().collect();
        for (i, &u1) in upper.iter().enumerate() {
            let row1 = self.row(u1);
            for &u2 in upper.iter().skip(i + 1) {
                let row2 = self.row(u2);
                let (smaller, larger) = if row1.le(&row2) {
                    (u1, u2)
                } else if row2.le(&row1) {
                    (u2, u1)
                } else {
                    continue;
                };
                for symbol in self.alphabet.iter() {
                    let ext_smaller = word_concat(smaller, std::slice::from_ref(symbol));
                    let ext_larger = word_concat(larger, std::slice::from_ref(symbol));
                    let row_smaller = self.row(&ext_smaller);
                    let row_larger = self.row(&ext_larger);
                    if !row_smaller.le(&row_larger) {
                        for (idx, suffix) in self.suffixes.iter().enumerate() {
                            if row_smaller.columns()[idx] && !row_larger.columns()[idx] {
                                return Some(word_concat(
                                    std::slice::from_ref(symbol),
                                    suffix,
                                ));
                            }
                        }
                    }
                }
            }
        }
        None
    }

    /// Adds a new suffix to `E`. Callers must re-[`initialize`] afterwards.
    pub fn add_suffix(&mut self, suffix: Word) {
        self.suffixes.insert(suffix);
    }

    /// Absorbs a counterexample using the "all suffixes" strategy: every suffix of
    /// `counterexample` (including the empty suffix and the whole word) is added to
    /// `E`, whether or not it was already present. Callers must re-[`initialize`]
    /// afterwards.
    pub fn add_counterexample(&mut self, counterexample: &Word) {
        for start in 0..=counterexample.len() {
            self.suffixes.insert(counterexample[start..].to_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::SamplingOracle;

    fn word(s: &str) -> Word {
        s.chars().map(|c| Rc::from(c.to_string())).collect()
    }

    fn alphabet() -> Rc<[Rc<str>]> {
        Rc::from(vec![Rc::from("a"), Rc::from("b")])
    }

    #[test]
    fn fresh_table_has_empty_suffix_and_prefix() {
        let table = ObservationTable::new(alphabet());
        assert!(table.suffixes().contains(&Word::new()));
        assert!(table.upper().contains(&Word::new()));
    }

    #[test]
    fn closedness_detects_an_unrepresented_lower_row() {
        let oracle = SamplingOracle::new(alphabet(), vec![word("a")], vec![word(""), word("b")], false);
        let mut table = ObservationTable::new(alphabet());
        table.initialize(&oracle);
        // row("a") = [true], which is not the join of row("") = [false]: not closed.
        assert!(table.is_closed().is_some());
    }

    #[test]
    fn promoting_the_unclosed_row_closes_the_table() {
        let oracle = SamplingOracle::new(alphabet(), vec![word("a")], vec![word(""), word("b")], false);
        let mut table = ObservationTable::new(alphabet());
        table.initialize(&oracle);
        let unclosed = table.is_closed().unwrap().clone();
        table.promote(unclosed);
        table.initialize(&oracle);
        assert!(table.is_closed().is_none());
    }

    #[test]
    fn counterexample_absorption_adds_every_suffix() {
        let mut table = ObservationTable::new(alphabet());
        table.add_counterexample(&word("aba"));
        for suffix in [word("aba"), word("ba"), word("a"), word("")] {
            assert!(table.suffixes().contains(&suffix));
        }
    }

    #[test]
    fn counterexample_absorption_is_idempotent() {
        let mut table = ObservationTable::new(alphabet());
        table.add_counterexample(&word("aba"));
        let suffixes_after_first: Vec<Word> = table.suffixes().iter().cloned().collect();
        table.add_counterexample(&word("aba"));
        let suffixes_after_second: Vec<Word> = table.suffixes().iter().cloned().collect();
        assert_eq!(suffixes_after_first, suffixes_after_second);
    }

    #[test]
    fn table_growth_is_monotone_across_mutations() {
        let oracle = SamplingOracle::new(alphabet(), vec![word("a")], vec![word(""), word("b")], false);
        let mut table = ObservationTable::new(alphabet());
        table.initialize(&oracle);
        let suffix_count_before = table.suffixes().len();
        let upper_count_before = table.upper().len();

        table.add_counterexample(&word("ab"));
        table.initialize(&oracle);

        assert!(table.suffixes().len() >= suffix_count_before);
        assert!(table.upper().len() >= upper_count_before);
    }
}
