//! # Deterministic Finite Automaton
//!
//! A [Dfa] here is *partial*: not every state needs a transition defined for every
//! alphabet symbol, and a state's classification is one of [Classification::Accept],
//! [Classification::Reject] or [Classification::Unknown] rather than a plain boolean.
//! This is what makes a [Dfa] a faithful representation of a prefix-tree acceptor
//! ([build_pta]) built from a finite sample, where most strings are simply never
//! observed.
//!
//! ## Operations
//! * [Checking word acceptance](Dfa::accepts) and [step-by-step evaluation](Dfa::evaluator)
//! * [Converting a DFA to a NFA](Dfa::to_nfa) (every DFA is trivially a single-start-state NFA)
//! * [Identifying and removing unreachable states](Dfa::remove_unreachable_states)
//! * [Minimizing a DFA](Dfa::minimize) by pruning unreachable states (this is *not*
//!   Hopcroft-style equivalence minimization — merging non-distinguishable states is
//!   out of scope here, since the structures this crate builds are conjectures, not
//!   canonical automata)
//! * [Building a prefix-tree acceptor](build_pta) from a sample of positive and negative strings
//! * [Growing a DFA one transition at a time](Dfa::add_transition) and
//!   [finding an incoming transition](Dfa::find_predecessor)
use crate::error::AlphabetError;
use crate::nfa::{Nfa, NfaState};
use crate::row::Word;
use crate::state::State;
use crate::table::Table;
use crate::util::word_label;
use std::collections::HashSet;
use std::rc::Rc;

pub mod eval;
pub use eval::DfaEvaluator;

/// The classification of a DFA state: whether strings reaching it are known to be in
/// the target language, known not to be, or simply unobserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Accept,
    Reject,
    Unknown,
}

/// A partial deterministic finite automaton: an *alphabet*, a *set of states*, one of
/// which is the *initial state*, each state carrying a [Classification], and a
/// *partial* transition function from each state upon seeing each element of the
/// alphabet to at most one state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dfa {
    pub(crate) alphabet: Rc<[Rc<str>]>,
    pub(crate) states: Vec<DfaState>,
    pub(crate) initial_state: usize,
}

/// A state of a [Dfa]: its name, whether it is initial, its [Classification], and its
/// (partial) transition for each element of the alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfaState {
    pub(crate) name: Rc<str>,
    pub(crate) initial: bool,
    pub(crate) classification: Classification,
    pub(crate) transitions: Vec<Option<usize>>,
}

impl DfaState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn is_accepting(&self) -> bool {
        self.classification == Classification::Accept
    }

    /// Gets the (partial) transitions of this state, one per alphabet element in the
    /// alphabet's ordering.
    pub fn transitions(&self) -> &[Option<usize>] {
        self.transitions.as_slice()
    }
}

impl From<DfaState> for NfaState {
    fn from(value: DfaState) -> Self {
        let DfaState {
            name,
            initial,
            classification,
            transitions,
        } = value;
        NfaState {
            name,
            initial,
            accepting: classification == Classification::Accept,
            epsilon_transitions: vec![],
            transitions: transitions
                .into_iter()
                .map(|t| t.into_iter().collect())
                .collect(),
        }
    }
}

impl From<Dfa> for Nfa {
    fn from(value: Dfa) -> Self {
        value.to_nfa()
    }
}

impl Dfa {
    /// Builds a DFA with a single, `Unknown`-classified start state and no transitions.
    /// Transitions and classifications are filled in afterwards via
    /// [`Dfa::add_transition`].
    pub fn new(alphabet: Rc<[Rc<str>]>, start: State) -> Self {
        let transitions = vec![None; alphabet.len()];
        let states = vec![DfaState {
            name: Rc::from(start.label()),
            initial: true,
            classification: Classification::Unknown,
            transitions,
        }];
        Dfa {
            alphabet,
            states,
            initial_state: 0,
        }
    }

    fn symbol_index(&self, a: &str) -> Result<usize, AlphabetError> {
        self.alphabet
            .iter()
            .position(|s| s.as_ref() == a)
            .ok_or_else(|| AlphabetError::UnknownSymbol(Rc::from(a)))
    }

    fn state_index_or_insert(&mut self, state: &State) -> usize {
        if let Some(idx) = self.states.iter().position(|s| s.name.as_ref() == state.label()) {
            return idx;
        }
        self.states.push(DfaState {
            name: Rc::from(state.label()),
            initial: false,
            classification: Classification::Unknown,
            transitions: vec![None; self.alphabet.len()],
        });
        self.states.len() - 1
    }

    /// Adds the transition `delta(q1, a) = q2`, inserting either state if not already
    /// present. Fails with [`AlphabetError::UnknownSymbol`] if `a` is not part of this
    /// DFA's alphabet.
    pub fn add_transition(&mut self, q1: &State, q2: &State, a: &str) -> Result<(), AlphabetError> {
        let symbol = self.symbol_index(a)?;
        let from = self.state_index_or_insert(q1);
        let to = self.state_index_or_insert(q2);
        self.states[from].transitions[symbol] = Some(to);
        Ok(())
    }

    /// Finds a state `r` and a symbol `a` such that `delta(r, a) = q`, scanning states
    /// and symbols in their stored order. Returns `None` if `q` has no predecessor
    /// (including if `q` is not a state of this DFA at all).
    pub fn find_predecessor(&self, q: &State) -> Option<(State, Rc<str>)> {
        let target = self.states.iter().position(|s| s.name.as_ref() == q.label())?;
        for state in &self.states {
            for (idx, transition) in state.transitions.iter().enumerate() {
                if *transition == Some(target) {
                    return Some((State::new(state.name.clone()), self.alphabet[idx].clone()));
                }
            }
        }
        None
    }

    /// Minimizes this DFA by removing all states unreachable from the initial state.
    ///
    /// Unlike classical DFA minimization, this does not merge non-distinguishable
    /// states: the conjectures this crate works with are not assumed canonical, and
    /// reachability is the only invariant callers rely on.
    pub fn minimize(&mut self) {
        self.remove_unreachable_states();
    }

    /// Removes the unreachable states of this automaton, leaving only states actually
    /// reachable from the initial state.
    pub fn remove_unreachable_states(&mut self) {
        let states = self.unreachable_state_idx().into_iter().collect();
        self.remove_states(states);
    }

    pub fn unreachable_states(&self) -> Vec<&DfaState> {
        self.unreachable_state_idx()
            .into_iter()
            .map(|idx| &self.states[idx])
            .collect()
    }

    pub fn unreachable_state_idx(&self) -> HashSet<usize> {
        let reachables = self.reachable_state_idx();
        (0..self.states.len())
            .filter(|x| !reachables.contains(x))
            .collect()
    }

    pub fn reachable_states(&self) -> Vec<&DfaState> {
        self.reachable_state_idx()
            .into_iter()
            .map(|idx| &self.states[idx])
            .collect()
    }

    /// Finds the reachable states by their indices, starting the walk at this DFA's
    /// actual initial state (never a hardcoded root).
    pub fn reachable_state_idx(&self) -> HashSet<usize> {
        let mut reachables = HashSet::from([self.initial_state]);
        let mut new_states = reachables.clone();
        while !new_states.is_empty() {
            new_states = new_states
                .drain()
                .flat_map(|state| self.states[state].transitions.iter().copied().flatten())
                .filter(|&state| reachables.insert(state))
                .collect();
        }
        reachables
    }

    fn remap_transitions(&mut self, mapper: impl Fn(usize) -> Option<usize>) {
        self.states.iter_mut().for_each(|state| {
            state.transitions.iter_mut().for_each(|trans| {
                if let Some(t) = trans {
                    *trans = mapper(*t).or(Some(*t));
                }
            })
        })
    }

    /// Removes the states with the given indices, remapping the transitions of the
    /// remaining states. The initial state can never be removed.
    fn remove_states(&mut self, mut to_remove: Vec<usize>) {
        let mut old_state_idx = (0..self.states.len()).collect::<Vec<_>>();

        to_remove.sort_unstable();
        to_remove.dedup();
        match to_remove.binary_search(&self.initial_state) {
            Err(less_than) => self.initial_state -= less_than,
            Ok(_) => panic!("cannot remove initial state"),
        }

        to_remove.iter().rev().for_each(|&idx| {
            self.states.remove(idx);
            old_state_idx.remove(idx);
        });

        let map = |idx| old_state_idx.binary_search(&idx).ok();
        self.remap_transitions(map);
    }

    /// Converts this DFA to a NFA with the same single start state and no
    /// ε-transitions. Every DFA is trivially a NFA.
    pub fn to_nfa(self) -> Nfa {
        let Dfa {
            alphabet,
            states,
            initial_state,
        } = self;
        let states = states.into_iter().map(|s| s.into()).collect();
        Nfa {
            alphabet,
            states,
            initial_states: vec![initial_state],
        }
    }

    /// Parses `string`, returning the state reached (the last state on a defined
    /// transition path, if the string drives the evaluator off the defined transitions)
    /// together with whether that state is accepting.
    pub fn parse(&self, string: &[&str]) -> (State, bool) {
        let mut eval = self.evaluator();
        eval.step_multiple(string);
        let accepting = eval.is_accepting();
        let idx = eval.current_state_idx().unwrap_or(self.initial_state);
        (State::new(self.states[idx].name.clone()), accepting)
    }

    /// Checks whether this automaton accepts the given string. A string that drives
    /// the evaluator off the defined transitions, or lands on an `Unknown`/`Reject`
    /// state, is not accepted.
    pub fn accepts(&self, string: &[&str]) -> bool {
        self.parse(string).1
    }

    pub fn evaluator(&self) -> DfaEvaluator<'_> {
        self.into()
    }

    /// Renders this DFA as a table suitable for printing: one row per state, `*`/`!`
    /// marking accepting/rejecting states and `→` the initial state, `-` standing in
    /// for an undefined transition.
    pub fn to_table(&self) -> String {
        let mut table = Table::default();

        let mut header = vec!["", "", ""];
        header.extend(self.alphabet.iter().map(|s| s as &str));
        table.push_row(header);

        for state in &self.states {
            let mut row = vec![
                if state.initial { "→" } else { "" },
                match state.classification {
                    Classification::Accept => "*",
                    Classification::Reject => "!",
                    Classification::Unknown => "",
                },
                &state.name,
            ];
            for t in &state.transitions {
                row.push(match t {
                    Some(idx) => &self.states[*idx].name,
                    None => "-",
                });
            }
            table.push_row(row);
        }
        table.to_string(" ")
    }

    pub fn alphabet(&self) -> &[Rc<str>] {
        &self.alphabet
    }

    pub fn states(&self) -> &[DfaState] {
        self.states.as_slice()
    }

    pub fn initial_state(&self) -> &DfaState {
        &self.states[self.initial_state]
    }

    pub fn initial_state_index(&self) -> usize {
        self.initial_state
    }
}

/// Builds a prefix-tree acceptor from a sample of positive and negative example
/// strings: one state per distinct prefix occurring in the sample (the empty word
/// always included as the root/initial state), a state classified `Accept` iff it is
/// exactly a positive example, `Reject` iff it is exactly a negative example, and
/// `Unknown` otherwise. The transition from a prefix `p` on symbol `a` is defined iff
/// `p·a` is itself a prefix occurring in the sample.
pub fn build_pta(alphabet: Rc<[Rc<str>]>, positives: &[Word], negatives: &[Word]) -> Dfa {
    let mut prefixes: indexmap::IndexSet<Word> = indexmap::IndexSet::new();
    prefixes.insert(Vec::new());
    for word in positives.iter().chain(negatives.iter()) {
        for len in 1..=word.len() {
            prefixes.insert(word[..len].to_vec());
        }
    }

    let positive_set: HashSet<&Word> = positives.iter().collect();
    let negative_set: HashSet<&Word> = negatives.iter().collect();

    let states = prefixes
        .iter()
        .enumerate()
        .map(|(idx, prefix)| {
            let classification = if positive_set.contains(prefix) {
                Classification::Accept
            } else if negative_set.contains(prefix) {
                Classification::Reject
            } else {
                Classification::Unknown
            };
            let transitions = alphabet
                .iter()
                .map(|symbol| {
                    let mut extended = prefix.clone();
                    extended.push(symbol.clone());
                    prefixes.get_index_of(&extended)
                })
                .collect();
            DfaState {
                name: Rc::from(word_label(prefix)),
                initial: idx == 0,
                classification,
                transitions,
            }
        })
        .collect();

    Dfa {
        alphabet,
        states,
        initial_state: 0,
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
    fn pta_classifies_exact_samples() {
        let positives = vec![word("a"), word("ab")];
        let negatives = vec![word("b")];
        let dfa = build_pta(alphabet(), &positives, &negatives);
        assert!(dfa.accepts(&["a"]));
        assert!(dfa.accepts(&["a", "b"]));
        assert!(!dfa.accepts(&["b"]));
    }

    #[test]
    fn pta_root_is_initial_and_unknown_by_default() {
        let dfa = build_pta(alphabet(), &[], &[]);
        assert_eq!(dfa.states.len(), 1);
        assert_eq!(
            dfa.initial_state().classification(),
            Classification::Unknown
        );
    }

    #[test]
    fn minimize_keeps_only_reachable_states_from_real_root() {
        let positives = vec![word("aa")];
        let negatives = vec![word("b")];
        let mut dfa = build_pta(alphabet(), &positives, &negatives);
        let before = dfa.states.len();
        dfa.minimize();
        // every state in a PTA is reachable from the root by construction
        assert_eq!(dfa.states.len(), before);
        assert!(dfa.accepts(&["a", "a"]));
    }

    #[test]
    fn add_transition_grows_states_and_rejects_unknown_symbols() {
        let mut dfa = Dfa::new(alphabet(), State::new("q0"));
        dfa.add_transition(&State::new("q0"), &State::new("q1"), "a").unwrap();
        assert_eq!(dfa.states.len(), 2);
        assert!(matches!(
            dfa.add_transition(&State::new("q0"), &State::new("q1"), "c"),
            Err(AlphabetError::UnknownSymbol(sym)) if &*sym == "c"
        ));
    }

    #[test]
    fn parse_reports_state_and_acceptance() {
        let mut dfa = Dfa::new(alphabet(), State::new("q0"));
        dfa.add_transition(&State::new("q0"), &State::new("q1"), "a").unwrap();
        dfa.states[1].classification = Classification::Accept;
        let (state, accepted) = dfa.parse(&["a"]);
        assert_eq!(state.label(), "q1");
        assert!(accepted);

        let (stuck_state, stuck_accepted) = dfa.parse(&["a", "b"]);
        assert_eq!(stuck_state.label(), "q1");
        assert!(!stuck_accepted);
    }

    #[test]
    fn find_predecessor_locates_the_incoming_transition() {
        let mut dfa = Dfa::new(alphabet(), State::new("q0"));
        dfa.add_transition(&State::new("q0"), &State::new("q1"), "a").unwrap();
        let (pred, symbol) = dfa.find_predecessor(&State::new("q1")).unwrap();
        assert_eq!(pred.label(), "q0");
        assert_eq!(&*symbol, "a");
        assert!(dfa.find_predecessor(&State::new("q0")).is_none());
    }
}
