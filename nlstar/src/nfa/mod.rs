//! # Nondeterministic Finite Automaton, with multiple start states
//!
//! The [Nfa] struct here generalizes the textbook definition by allowing more than one
//! start state (`S ⊆ Q`, non-empty): this is exactly the shape of NL*'s conjectures,
//! whose start states are the prime rows among the upper part of the observation
//! table.
//!
//! ## Operations
//! * [Checking word acceptance](Nfa::parse) by an explicit backtracking search over the
//!   NFA's transition relation (not a closure-set evaluation)
//! * [Converting the NFA to a DFA](Nfa::to_dfa) via lazy, BFS-driven subset construction
//! * Finding the [ε-closure](Nfa::closure) of a state
//! * [Identifying and removing unreachable states](Nfa::remove_unreachable_states)
//! * [Checking language equivalence](Nfa::equivalent_to) between two NFAs
//! * [Growing a NFA one transition at a time](Nfa::add_transition), including
//!   ε-transitions
use crate::dfa::{Dfa, DfaState};
use crate::error::AlphabetError;
use crate::state::State;
use crate::table::Table;
use crate::util::alphabet_equal;
pub use eval::NfaEvaluator;
use std::collections::{HashMap, HashSet};
use std::mem;
use std::rc::Rc;

pub mod eval;

/// A non-deterministic finite automaton over a shared alphabet, with a non-empty set
/// of start states and optional ε-transitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nfa {
    pub(crate) alphabet: Rc<[Rc<str>]>,
    pub(crate) states: Vec<NfaState>,
    pub(crate) initial_states: Vec<usize>,
}

/// A state of a [Nfa]: its name, whether it is one of the start states, whether it is
/// accepting, its ε-transitions, and its transitions for each element of the alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NfaState {
    pub(crate) name: Rc<str>,
    pub(crate) initial: bool,
    pub(crate) accepting: bool,
    pub(crate) epsilon_transitions: Vec<usize>,
    pub(crate) transitions: Vec<Vec<usize>>,
}

impl NfaState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn transitions(&self) -> &[Vec<usize>] {
        self.transitions.as_slice()
    }

    pub fn epsilon_transitions(&self) -> &[usize] {
        self.epsilon_transitions.as_slice()
    }
}

impl Nfa {
    /// Builds an empty NFA over `alphabet`, with no states and no start states.
    /// States are added on demand by [`Nfa::add_transition`], [`Nfa::add_start_state`]
    /// and [`Nfa::add_accepting_state`].
    pub fn new(alphabet: Rc<[Rc<str>]>) -> Self {
        Nfa {
            alphabet,
            states: Vec::new(),
            initial_states: Vec::new(),
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
        self.states.push(NfaState {
            name: Rc::from(state.label()),
            initial: false,
            accepting: false,
            epsilon_transitions: Vec::new(),
            transitions: vec![Vec::new(); self.alphabet.len()],
        });
        self.states.len() - 1
    }

    /// Adds the transition `delta(q1, a) = q2`, inserting either state if not already
    /// present. `a` may be the empty string to add an ε-transition; any other symbol
    /// must be part of this NFA's alphabet, or this fails with
    /// [`AlphabetError::UnknownSymbol`].
    pub fn add_transition(&mut self, q1: &State, q2: &State, a: &str) -> Result<(), AlphabetError> {
        if a.is_empty() {
            let from = self.state_index_or_insert(q1);
            let to = self.state_index_or_insert(q2);
            if !self.states[from].epsilon_transitions.contains(&to) {
                self.states[from].epsilon_transitions.push(to);
            }
            return Ok(());
        }
        let symbol = self.symbol_index(a)?;
        let from = self.state_index_or_insert(q1);
        let to = self.state_index_or_insert(q2);
        if !self.states[from].transitions[symbol].contains(&to) {
            self.states[from].transitions[symbol].push(to);
        }
        Ok(())
    }

    /// Marks `state` as a start state, inserting it if not already present.
    pub fn add_start_state(&mut self, state: &State) {
        let idx = self.state_index_or_insert(state);
        self.states[idx].initial = true;
        if !self.initial_states.contains(&idx) {
            self.initial_states.push(idx);
        }
    }

    /// Marks `state` as accepting, inserting it if not already present.
    pub fn add_accepting_state(&mut self, state: &State) {
        let idx = self.state_index_or_insert(state);
        self.states[idx].accepting = true;
    }

    /// Builds a [Nfa] directly from its parts. Used by the learner to materialize a
    /// hypothesis from an observation table; `initial_states` must be non-empty.
    pub(crate) fn from_parts(
        alphabet: Rc<[Rc<str>]>,
        states: Vec<NfaState>,
        initial_states: Vec<usize>,
    ) -> Self {
        debug_assert!(!initial_states.is_empty(), "NFA must have a start state");
        Nfa {
            alphabet,
            states,
            initial_states,
        }
    }

    fn remap_transitions(&mut self, mapper: impl Fn(usize) -> Option<usize>) {
        self.states.iter_mut().for_each(|state| {
            state.transitions.iter_mut().for_each(|table| {
                table
                    .iter_mut()
                    .for_each(|trans| *trans = mapper(*trans).unwrap_or(*trans))
            });
            state
                .epsilon_transitions
                .iter_mut()
                .for_each(|trans| *trans = mapper(*trans).unwrap_or(*trans));
        })
    }

    /// Removes the states with the given indices, remapping the transitions and start
    /// states of the remaining states. No state in `to_remove` may be a start state.
    fn remove_states(&mut self, mut to_remove: Vec<usize>) {
        let mut old_state_idx = (0..self.states.len()).collect::<Vec<_>>();

        to_remove.sort_unstable();
        to_remove.dedup();
        assert!(
            self.initial_states
                .iter()
                .all(|s| to_remove.binary_search(s).is_err()),
            "cannot remove a start state"
        );

        to_remove.iter().rev().for_each(|&idx| {
            self.states.remove(idx);
            old_state_idx.remove(idx);
        });

        let map = |idx| old_state_idx.binary_search(&idx).ok();
        self.remap_transitions(map);
        self.initial_states = self
            .initial_states
            .iter()
            .map(|&s| map(s).expect("start state must survive removal"))
            .collect();
    }

    /// Removes the unreachable states of this NFA: all states that cannot be reached
    /// from any start state via any input, including ε-moves.
    pub fn remove_unreachable_states(&mut self) {
        let states = self.unreachable_state_idx().into_iter().collect();
        self.remove_states(states);
    }

    pub fn unreachable_states(&self) -> Vec<&NfaState> {
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

    /// Finds all states reachable from any start state, by index.
    pub fn reachable_state_idx(&self) -> HashSet<usize> {
        let mut reachables: HashSet<usize> = self.initial_states.iter().copied().collect();
        let mut new_states = reachables.clone();
        while !new_states.is_empty() {
            new_states = new_states
                .drain()
                .flat_map(|state| {
                    self.states[state]
                        .transitions
                        .iter()
                        .flatten()
                        .copied()
                        .chain(self.closure(state).unwrap())
                })
                .filter(|&state| reachables.insert(state))
                .collect();
        }
        reachables
    }

    /// Parses `word`, using an explicit work-stack search: each frame is a `(state,
    /// position)` pair, ε-moves push a new frame without advancing the position, and
    /// ordinary moves both advance the position and follow a transition. This mirrors
    /// how acceptance is decided by hand on paper, rather than precomputing the
    /// reachable subset at every position.
    ///
    /// Returns the accepting state and `true` if some run accepts `word`; otherwise
    /// returns one of its start states (arbitrarily, the first) and `false`.
    pub fn parse(&self, word: &[&str]) -> (State, bool) {
        let symbol_index: HashMap<&str, usize> = self
            .alphabet
            .iter()
            .enumerate()
            .map(|(idx, s)| (s as &str, idx))
            .collect();

        let mut stack: Vec<(usize, usize)> =
            self.initial_states.iter().map(|&s| (s, 0)).collect();
        let mut seen = HashSet::new();

        while let Some((state, pos)) = stack.pop() {
            if !seen.insert((state, pos)) {
                continue;
            }
            if pos == word.len() && self.states[state].accepting {
                return (State::new(self.states[state].name.clone()), true);
            }
            for &eps in &self.states[state].epsilon_transitions {
                stack.push((eps, pos));
            }
            if pos < word.len() {
                if let Some(&idx) = symbol_index.get(word[pos]) {
                    for &next in &self.states[state].transitions[idx] {
                        stack.push((next, pos + 1));
                    }
                }
            }
        }
        match self.initial_states.first() {
            Some(&fallback) => (State::new(self.states[fallback].name.clone()), false),
            None => (State::new("∅"), false),
        }
    }

    /// Equivalent to [`Nfa::parse`], kept for symmetry with [`Dfa::accepts`].
    pub fn accepts(&self, word: &[&str]) -> bool {
        self.parse(word).1
    }

    pub fn has_epsilon_moves(&self) -> bool {
        self.states
            .iter()
            .any(|state| !state.epsilon_transitions.is_empty())
    }

    pub fn evaluator(&self) -> NfaEvaluator<'_> {
        self.into()
    }

    /// The ε-closure of a state: the set of states reachable from it using only
    /// ε-transitions (including itself).
    pub fn closure(&self, start: usize) -> Option<HashSet<usize>> {
        if start >= self.states.len() {
            return None;
        }
        let mut all = HashSet::new();
        all.insert(start);
        let mut new = vec![start];
        while !new.is_empty() {
            let old_new = mem::take(&mut new);
            for state in old_new {
                for &eps_target in &self.states[state].epsilon_transitions {
                    if all.insert(eps_target) {
                        new.push(eps_target)
                    }
                }
            }
        }
        Some(all)
    }

    /// Converts this NFA to a DFA by a lazy, BFS-driven subset construction: only
    /// subsets actually reachable from the (ε-closed) set of start states are ever
    /// materialized, so this never enumerates the full `2^|Q|` powerset up front.
    /// The resulting DFA's states are named sequentially from 0, with 0 always the
    /// initial state.
    pub fn to_dfa(&self) -> Dfa {
        let mut gen = 0usize..;
        let mut map = HashMap::new();
        let mut accepting = HashSet::new();
        let mut to_explore = vec![self.evaluator()];
        let mut transitions: HashMap<Vec<usize>, Vec<usize>> = HashMap::new();

        {
            let key = Self::set_to_vec(to_explore[0].current_states_idx());
            let n = gen.next().unwrap();
            map.insert(key, n);
            if to_explore[0].is_accepting() {
                accepting.insert(n);
            }
        }

        while let Some(eval) = to_explore.pop() {
            let mut tr = Vec::with_capacity(self.alphabet.len());
            for new_evaluator in eval.step_all() {
                let is_accepting = new_evaluator.is_accepting();
                let key = Self::set_to_vec(new_evaluator.current_states_idx());
                if !map.contains_key(&key) {
                    to_explore.push(new_evaluator);
                }
                let x = *map.entry(key).or_insert_with(|| gen.next().unwrap());
                tr.push(x);
                if is_accepting {
                    accepting.insert(x);
                }
            }
            transitions.insert(Self::set_to_vec(eval.current_states_idx()), tr);
        }

        let mut sorted_keys = map.iter().collect::<Vec<_>>();
        sorted_keys.sort_by_key(|(_, &n)| n);

        let states = sorted_keys
            .into_iter()
            .map(|(key, &n)| DfaState {
                name: Rc::from(n.to_string()),
                initial: n == 0,
                classification: if accepting.contains(&n) {
                    crate::dfa::Classification::Accept
                } else {
                    crate::dfa::Classification::Reject
                },
                transitions: transitions
                    .remove(key)
                    .unwrap()
                    .into_iter()
                    .map(Some)
                    .collect(),
            })
            .collect();

        Dfa {
            alphabet: self.alphabet.clone(),
            states,
            initial_state: 0,
        }
    }

    /// Generates a table of this NFA suitable for printing: `→` marks every start
    /// state, `*` accepting states.
    pub fn to_table(&self) -> String {
        let mut table = Table::default();

        let mut header = vec!["", "", "", "ε"];
        header.extend(self.alphabet.iter().map(|s| s as &str));
        table.push_row(header);

        let trans_strings = self
            .states
            .iter()
            .map(|state| {
                std::iter::once(&state.epsilon_transitions)
                    .chain(&state.transitions)
                    .map(|trans| {
                        let s = trans
                            .iter()
                            .map(|c| self.states[*c].name.clone())
                            .collect::<Vec<_>>()
                            .join(" ");
                        format!("{{{s}}}")
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        for (idx, state) in self.states.iter().enumerate() {
            let mut row = vec![
                if state.initial { "→" } else { "" },
                if state.accepting { "*" } else { "" },
                &state.name,
            ];
            row.extend(trans_strings[idx].iter().map(|s| s as &str));
            table.push_row(row);
        }
        table.to_string(" ")
    }

    /// Checks if this NFA is equivalent to another NFA, that is, whether they accept
    /// the same language over the same alphabet.
    pub fn equivalent_to(&self, other: &Nfa) -> bool {
        if !alphabet_equal(&self.alphabet, &other.alphabet) {
            return false;
        }

        let mut evaluators_to_explore = vec![(self.evaluator(), other.evaluator())];
        let mut explored_states = HashSet::new();
        explored_states.insert((
            Self::set_to_vec(evaluators_to_explore[0].0.current_states_idx()),
            Self::set_to_vec(evaluators_to_explore[0].1.current_states_idx()),
        ));

        while let Some((s1, s2)) = evaluators_to_explore.pop() {
            if s1.is_accepting() != s2.is_accepting() {
                return false;
            }
            for elem in self.alphabet.iter() {
                let mut d1 = s1.clone();
                d1.step(elem);
                let mut d2 = s2.clone();
                d2.step(elem);
                if explored_states.insert((
                    Self::set_to_vec(d1.current_states_idx()),
                    Self::set_to_vec(d2.current_states_idx()),
                )) {
                    evaluators_to_explore.push((d1, d2));
                }
            }
        }
        true
    }

    fn set_to_vec<T: Clone + Ord>(set: &HashSet<T>) -> Vec<T> {
        let mut vec = set.iter().cloned().collect::<Vec<_>>();
        vec.sort();
        vec
    }

    pub fn alphabet(&self) -> &[Rc<str>] {
        &self.alphabet
    }

    pub fn states(&self) -> &[NfaState] {
        self.states.as_slice()
    }

    /// Gets the start states of this NFA.
    pub fn initial_states(&self) -> &[usize] {
        &self.initial_states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Accepts strings ending in "ab".
    fn sample_nfa() -> Nfa {
        let alphabet: Rc<[Rc<str>]> = Rc::from(vec![Rc::from("a"), Rc::from("b")]);
        let states = vec![
            NfaState {
                name: Rc::from("s0"),
                initial: true,
                accepting: false,
                epsilon_transitions: vec![],
                transitions: vec![vec![1], vec![0]],
            },
            NfaState {
                name: Rc::from("s1"),
                initial: false,
                accepting: true,
                epsilon_transitions: vec![],
                transitions: vec![vec![1], vec![0]],
            },
        ];
        Nfa::from_parts(alphabet, states, vec![0])
    }

    #[test]
    fn parse_accepts_strings_ending_in_ab() {
        let nfa = sample_nfa();
        assert!(nfa.parse(&["a", "b"]).1);
        assert!(nfa.parse(&["b", "a", "b"]).1);
        assert!(!nfa.parse(&["a"]).1);
        assert!(!nfa.parse(&["b"]).1);
        assert_eq!(nfa.parse(&["a", "b"]).0.label(), "s1");
    }

    #[test]
    fn to_dfa_preserves_language() {
        let nfa = sample_nfa();
        let dfa = nfa.to_dfa();
        assert!(dfa.accepts(&["a", "b"]));
        assert!(!dfa.accepts(&["a"]));
        assert!(dfa.accepts(&["b", "a", "b"]));
    }

    #[test]
    fn multiple_start_states_union_their_languages() {
        let alphabet: Rc<[Rc<str>]> = Rc::from(vec![Rc::from("a")]);
        let states = vec![
            NfaState {
                name: Rc::from("only_empty"),
                initial: true,
                accepting: true,
                epsilon_transitions: vec![],
                transitions: vec![vec![]],
            },
            NfaState {
                name: Rc::from("only_a"),
                initial: true,
                accepting: false,
                epsilon_transitions: vec![],
                transitions: vec![vec![2]],
            },
            NfaState {
                name: Rc::from("after_a"),
                initial: false,
                accepting: true,
                epsilon_transitions: vec![],
                transitions: vec![vec![]],
            },
        ];
        let nfa = Nfa::from_parts(alphabet, states, vec![0, 1]);
        assert!(nfa.parse(&[]).1);
        assert!(nfa.parse(&["a"]).1);
        assert!(!nfa.parse(&["a", "a"]).1);
    }

    #[test]
    fn add_transition_inserts_states_and_allows_epsilon() {
        let alphabet: Rc<[Rc<str>]> = Rc::from(vec![Rc::from("a")]);
        let mut nfa = Nfa::new(alphabet);
        nfa.add_start_state(&State::new("q0"));
        nfa.add_transition(&State::new("q0"), &State::new("q1"), "").unwrap();
        nfa.add_transition(&State::new("q1"), &State::new("q2"), "a").unwrap();
        nfa.add_accepting_state(&State::new("q2"));

        assert_eq!(nfa.states().len(), 3);
        assert!(nfa.accepts(&["a"]));
        assert!(matches!(
            nfa.add_transition(&State::new("q0"), &State::new("q1"), "b"),
            Err(AlphabetError::UnknownSymbol(sym)) if &*sym == "b"
        ));
    }
}
