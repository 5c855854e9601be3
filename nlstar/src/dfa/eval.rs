use crate::dfa::{Classification, Dfa, DfaState};
use std::collections::HashMap;
use std::iter;

/// Tracks the current state of a [`Dfa`] while a string is fed to it symbol by symbol.
///
/// Because a [`Dfa`]'s transition function is partial, stepping on a symbol for which
/// the current state has no transition leaves the evaluator "stuck": further steps are
/// no-ops and [`DfaEvaluator::is_accepting`] reports `false` from then on.
#[derive(Debug, Clone)]
pub struct DfaEvaluator<'a> {
    dfa: &'a Dfa,
    rev_map: HashMap<&'a str, usize>,
    current_state: Option<usize>,
    stuck: bool,
}

impl<'a> DfaEvaluator<'a> {
    /// `false` once the evaluator has been driven off a defined transition, even if
    /// the state it got stuck at happens to be classified `Accept` — that
    /// classification described a shorter prefix, not the string actually fed in.
    pub fn is_accepting(&self) -> bool {
        !self.stuck
            && self
                .current_state()
                .map_or(false, |s| s.classification() == Classification::Accept)
    }

    pub fn current_state(&self) -> Option<&DfaState> {
        self.current_state.map(|idx| &self.dfa.states[idx])
    }

    pub fn current_state_idx(&self) -> Option<usize> {
        self.current_state
    }

    pub fn step_all(&self) -> Vec<DfaEvaluator<'a>> {
        iter::repeat(self.clone())
            .zip(self.dfa.alphabet())
            .map(|(mut eval, elem)| {
                eval.step(elem);
                eval
            })
            .collect()
    }

    /// Feeds one symbol to the evaluator, returning the new current state (or `None` if
    /// the symbol is outside the alphabet or there is no transition defined). Once this
    /// has returned `None`, the evaluator is permanently stuck: [`DfaEvaluator::is_accepting`]
    /// reports `false` from then on, regardless of which state it's sitting on.
    pub fn step(&mut self, elem: &str) -> Option<&DfaState> {
        let current = self.current_state?;
        let idx = match self.rev_map.get(elem) {
            Some(&idx) => idx,
            None => {
                self.stuck = true;
                return None;
            }
        };
        match self.dfa.states[current].transitions[idx] {
            Some(next) => {
                self.current_state = Some(next);
                Some(&self.dfa.states[next])
            }
            None => {
                self.stuck = true;
                None
            }
        }
    }

    pub fn step_multiple(&mut self, elems: &[&str]) -> Option<&DfaState> {
        for e in elems {
            self.step(e)?;
        }
        self.current_state.map(|s| &self.dfa.states[s])
    }
}

impl<'a> From<&'a Dfa> for DfaEvaluator<'a> {
    fn from(value: &'a Dfa) -> Self {
        let map = value
            .alphabet
            .iter()
            .enumerate()
            .map(|(idx, c)| (c as &str, idx))
            .collect();
        Self {
            dfa: value,
            rev_map: map,
            current_state: Some(value.initial_state),
            stuck: false,
        }
    }
}
