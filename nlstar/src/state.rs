use std::fmt;
use std::rc::Rc;

/// A label-identified automaton state.
///
/// Two `State`s with the same label are interchangeable: equality, ordering and
/// hashing are all defined purely in terms of the label, never object identity.
#[derive(Debug, Clone, Eq)]
pub struct State {
    label: Rc<str>,
}

impl State {
    pub fn new(label: impl Into<Rc<str>>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl std::hash::Hash for State {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.label.hash(state);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl From<&str> for State {
    fn from(value: &str) -> Self {
        State::new(value)
    }
}

impl From<String> for State {
    fn from(value: String) -> Self {
        State::new(value)
    }
}
