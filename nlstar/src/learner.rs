//! The NL* learning loop: alternately repair the observation table (closedness,
//! consistency), conjecture an NFA from its prime rows, and ask the oracle whether
//! that conjecture is right.
use std::rc::Rc;

use tracing::debug;

use crate::error::{AlphabetError, LearnError};
use crate::nfa::{Nfa, NfaState};
use crate::obs_table::ObservationTable;
use crate::oracle::Oracle;
use crate::row::{Row, Word};
use crate::util::word_label;

/// Drives [`ObservationTable`] to a closed, consistent state and turns its prime rows
/// into an NFA conjecture, repeating against an [`Oracle`]'s counterexamples until the
/// conjecture is accepted.
pub struct NLStar<O: Oracle> {
    oracle: O,
    table: ObservationTable,
}

impl<O: Oracle> NLStar<O> {
    pub fn new(oracle: O) -> Self {
        let table = ObservationTable::new(oracle.alphabet().clone());
        Self { oracle, table }
    }

    /// Runs the learning loop to completion, returning the accepted NFA conjecture.
    ///
    /// The only way this fails is if the oracle itself is inconsistent (answers
    /// membership and equivalence queries about different languages), which surfaces
    /// as the learner cycling on the same counterexample; see
    /// [`LearnError::OracleInconsistent`].
    pub fn learn(mut self) -> Result<Nfa, LearnError> {
        self.table.initialize(&self.oracle);
        let mut previous_counterexample: Option<Word> = None;
        loop {
            self.fix_table();
            let hypothesis = self.build_hypothesis();
            match self.oracle.equivalence(&hypothesis) {
                Ok(()) => {
                    debug!(states = hypothesis.states().len(), "hypothesis accepted");
                    return Ok(hypothesis);
                }
                Err(counterexample) => {
                    debug!(?counterexample, "hypothesis rejected");
                    self.validate_alphabet(&counterexample)?;
                    if previous_counterexample.as_ref() == Some(&counterexample) {
                        return Err(LearnError::OracleInconsistent(counterexample));
                    }
                    self.table.add_counterexample(&counterexample);
                    self.table.initialize(&self.oracle);
                    previous_counterexample = Some(counterexample);
                }
            }
        }
    }

    /// Checks that every symbol of `word` is part of this learner's alphabet, failing
    /// with [`AlphabetError::UnknownSymbol`] (wrapped in [`LearnError::Alphabet`]) the
    /// first time the oracle hands back a counterexample using a symbol it has no
    /// business using.
    fn validate_alphabet(&self, word: &Word) -> Result<(), LearnError> {
        for symbol in word {
            if !self.table.alphabet().contains(symbol) {
                return Err(AlphabetError::UnknownSymbol(symbol.clone()).into());
            }
        }
        Ok(())
    }

    fn fix_table(&mut self) {
        loop {
            if let Some(unclosed) = self.table.is_closed().cloned() {
                debug!(?unclosed, "closing table");
                self.table.promote(unclosed);
                self.table.initialize(&self.oracle);
                continue;
            }
            if let Some(new_suffix) = self.table.is_consistent() {
                debug!(?new_suffix, "restoring consistency");
                self.table.add_suffix(new_suffix);
                self.table.initialize(&self.oracle);
                continue;
            }
            break;
        }
    }

    /// Builds the conjectured NFA from the table's current prime rows. Only prefixes
    /// in `S` are used as state representatives: closedness guarantees every `R` row
    /// decomposes into a join of `S` rows, so `S` alone already carries every
    /// behavior the hypothesis needs.
    fn build_hypothesis(&self) -> Nfa {
        let alphabet = self.table.alphabet().clone();
        let epsilon_column = self
            .table
            .suffixes()
            .get_index_of(&Word::new())
            .expect("the empty suffix is always present");

        let mut representatives: Vec<(Word, Row)> = Vec::new();
        for prefix in self.table.upper() {
            if !self.table.is_prime(prefix) {
                continue;
            }
            let row = self.table.row(prefix);
            if !representatives.iter().any(|(_, r)| r == &row) {
                representatives.push((prefix.clone(), row));
            }
        }

        let row_of_empty = self.table.row(&Word::new());
        let states: Vec<NfaState> = representatives
            .iter()
            .map(|(prefix, row)| {
                let transitions = alphabet
                    .iter()
                    .map(|symbol| {
                        let mut extended = prefix.clone();
                        extended.push(symbol.clone());
                        let target_row = self.table.row(&extended);
                        representatives
                            .iter()
                            .enumerate()
                            .filter(|(_, (_, candidate))| candidate.le(&target_row))
                            .map(|(j, _)| j)
                            .collect()
                    })
                    .collect();
                NfaState {
                    name: Rc::from(word_label(prefix)),
                    initial: row.le(&row_of_empty),
                    accepting: row.columns()[epsilon_column],
                    epsilon_transitions: Vec::new(),
                    transitions,
                }
            })
            .collect();

        let initial_states: Vec<usize> = states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.initial)
            .map(|(idx, _)| idx)
            .collect();

        Nfa::from_parts(alphabet, states, initial_states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AlphabetError;
    use crate::oracle::{Oracle, SamplingOracle};

    fn word(s: &str) -> Word {
        s.chars().map(|c| Rc::from(c.to_string())).collect()
    }

    fn alphabet() -> Rc<[Rc<str>]> {
        Rc::from(vec![Rc::from("a")])
    }

    /// An oracle that always answers membership truthfully for `a*` but rejects every
    /// hypothesis with a counterexample containing a symbol outside its alphabet.
    struct MisbehavingOracle {
        alphabet: Rc<[Rc<str>]>,
    }

    impl Oracle for MisbehavingOracle {
        fn alphabet(&self) -> &Rc<[Rc<str>]> {
            &self.alphabet
        }

        fn membership(&self, _word: &Word) -> bool {
            true
        }

        fn equivalence(&self, _hypothesis: &Nfa) -> Result<(), Word> {
            Err(word("c"))
        }
    }

    #[test]
    fn learn_rejects_counterexample_outside_the_alphabet() {
        let learner = NLStar::new(MisbehavingOracle { alphabet: alphabet() });
        let err = learner.learn().unwrap_err();
        assert!(matches!(
            err,
            LearnError::Alphabet(AlphabetError::UnknownSymbol(sym)) if &*sym == "c"
        ));
    }

    #[test]
    fn learn_succeeds_on_well_behaved_oracle() {
        let oracle = SamplingOracle::new(alphabet(), vec![word(""), word("aa")], vec![word("a")], false);
        let nfa = NLStar::new(oracle).learn().unwrap();
        assert!(nfa.accepts(&[]));
        assert!(!nfa.accepts(&["a"]));
    }
}
