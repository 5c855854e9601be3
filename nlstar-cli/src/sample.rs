use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use nlstar::nfa::Nfa;
use nlstar::row::Word;

use crate::error::CliError;

fn read_lines(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| CliError::File(path.to_path_buf(), e))
}

/// Reads one word per line, symbols separated by whitespace. A blank line is the
/// empty word.
pub fn read_words(path: &Path) -> Result<Vec<Word>, CliError> {
    let contents = read_lines(path)?;
    Ok(contents
        .lines()
        .map(|line| line.split_whitespace().map(Rc::from).collect())
        .collect())
}

pub fn explicit_alphabet(symbols: Vec<String>) -> Rc<[Rc<str>]> {
    symbols.into_iter().map(|s| Rc::from(s.as_str())).collect()
}

/// Infers the alphabet as the sorted set of every symbol appearing in either sample.
pub fn infer_alphabet(positives: &[Word], negatives: &[Word]) -> Rc<[Rc<str>]> {
    let symbols: BTreeSet<&str> = positives
        .iter()
        .chain(negatives.iter())
        .flat_map(|word| word.iter().map(|s| s.as_ref()))
        .collect();
    symbols.into_iter().map(Rc::from).collect()
}

/// Classifies every line of `path` with the learned automaton, in the style of a test
/// runner: one `[ OK ]`/`[FAIL]` line per input, then a pass count.
pub fn run_test_file(nfa: &Nfa, path: &Path) -> Result<(), CliError> {
    let contents = read_lines(path)?;
    let mut passed = 0;
    let mut total = 0;
    for line in contents.lines() {
        total += 1;
        let word: Vec<&str> = line.split_whitespace().collect();
        let accepted = nfa.accepts(&word);
        if accepted {
            passed += 1;
        }
        let status = if accepted { "[ OK ]" } else { "[FAIL]" };
        println!("{status} {line}");
    }
    println!("{passed}/{total} lines accepted in {}", path.display());
    Ok(())
}
