use std::collections::HashSet;
use std::rc::Rc;

use crate::nfa::Nfa;
use crate::row::Word;

/// A minimally adequate teacher: the external collaborator NL* queries while it
/// refines its observation table.
///
/// An `Oracle` answers two kinds of questions about a fixed target language:
/// *membership* ("is this word in the language?") and *equivalence* ("does this
/// hypothesis recognize exactly the language? if not, give me a counterexample").
/// `learner::NLStar` never inspects the target language directly — it only ever goes
/// through this trait, so any implementation (a sampled corpus, a reference automaton,
/// a human typing into a terminal) can drive the same learning loop.
pub trait Oracle {
    fn alphabet(&self) -> &Rc<[Rc<str>]>;

    /// Answers whether `word` is in the target language.
    fn membership(&self, word: &Word) -> bool;

    /// Checks whether `hypothesis` recognizes exactly the target language. Returns
    /// `Err` with a counterexample word when it does not.
    fn equivalence(&self, hypothesis: &Nfa) -> Result<(), Word>;
}

/// A reference [`Oracle`] backed by a finite sample of positive and negative example
/// strings.
///
/// Membership on a word outside the sample falls back to `default_membership`.
/// Equivalence is checked by scanning the sample for the first string the hypothesis
/// misclassifies; an oracle built from an empty sample always reports equivalence,
/// since it has nothing left to disagree with the hypothesis about.
#[derive(Debug, Clone)]
pub struct SamplingOracle {
    alphabet: Rc<[Rc<str>]>,
    positives: HashSet<Word>,
    negatives: HashSet<Word>,
    default_membership: bool,
}

impl SamplingOracle {
    pub fn new(
        alphabet: Rc<[Rc<str>]>,
        positives: Vec<Word>,
        negatives: Vec<Word>,
        default_membership: bool,
    ) -> Self {
        Self {
            alphabet,
            positives: positives.into_iter().collect(),
            negatives: negatives.into_iter().collect(),
            default_membership,
        }
    }

    fn word_as_refs(word: &Word) -> Vec<&str> {
        word.iter().map(|s| s as &str).collect()
    }
}

impl Oracle for SamplingOracle {
    fn alphabet(&self) -> &Rc<[Rc<str>]> {
        &self.alphabet
    }

    fn membership(&self, word: &Word) -> bool {
        if self.positives.contains(word) {
            true
        } else if self.negatives.contains(word) {
            false
        } else {
            self.default_membership
        }
    }

    fn equivalence(&self, hypothesis: &Nfa) -> Result<(), Word> {
        for positive in &self.positives {
            if !hypothesis.accepts(&Self::word_as_refs(positive)) {
                return Err(positive.clone());
            }
        }
        for negative in &self.negatives {
            if hypothesis.accepts(&Self::word_as_refs(negative)) {
                return Err(negative.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Word {
        s.chars().map(|c| Rc::from(c.to_string())).collect()
    }

    fn alphabet() -> Rc<[Rc<str>]> {
        Rc::from(vec![Rc::from("a"), Rc::from("b")])
    }

    #[test]
    fn membership_falls_back_to_default_outside_sample() {
        let oracle = SamplingOracle::new(alphabet(), vec![word("a")], vec![word("b")], false);
        assert!(oracle.membership(&word("a")));
        assert!(!oracle.membership(&word("b")));
        assert!(!oracle.membership(&word("ab")));
    }

    #[test]
    fn empty_sample_always_reports_equivalence() {
        let oracle = SamplingOracle::new(alphabet(), vec![], vec![], false);
        let alphabet_nfa: Rc<[Rc<str>]> = alphabet();
        let states = vec![crate::nfa::NfaState {
            name: Rc::from("q0"),
            initial: true,
            accepting: false,
            epsilon_transitions: vec![],
            transitions: vec![vec![0], vec![0]],
        }];
        let nfa = Nfa::from_parts(alphabet_nfa, states, vec![0]);
        assert!(oracle.equivalence(&nfa).is_ok());
    }
}
