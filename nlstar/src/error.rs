use std::rc::Rc;
use thiserror::Error;

use crate::row::Word;

/// Raised whenever a symbol outside the declared alphabet is used.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum AlphabetError {
    #[error("symbol {0:?} is not part of the alphabet")]
    UnknownSymbol(Rc<str>),
    #[error("alphabet must not be empty")]
    EmptyAlphabet,
}

/// Failure modes of a single [`crate::learner::NLStar::learn`] run.
#[derive(Debug, Error)]
pub enum LearnError {
    #[error(transparent)]
    Alphabet(#[from] AlphabetError),
    /// The equivalence oracle returned a counterexample whose classification contradicts
    /// the current hypothesis in a way that absorption could not resolve after retrying.
    #[error("oracle returned an inconsistent counterexample {0:?}")]
    OracleInconsistent(Word),
    /// An internal invariant of the observation table was violated; this signals a bug
    /// in the table-fixing routine rather than a problem with the oracle.
    #[error("observation table invariant violated: {0}")]
    TableInvariantViolation(String),
}
