mod error;
mod sample;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::CliError;
use nlstar::learner::NLStar;
use nlstar::oracle::SamplingOracle;

/// Learn a residual finite-state automaton from positive and negative example strings.
#[derive(Debug, Parser)]
#[command(name = "nlstar", version, about)]
struct Args {
    /// File of accepted strings, one per line, symbols separated by whitespace.
    #[arg(long)]
    positive: PathBuf,

    /// File of rejected strings, one per line, symbols separated by whitespace.
    #[arg(long)]
    negative: PathBuf,

    /// Alphabet symbols, comma-separated. Inferred from the sample files if omitted.
    #[arg(long, value_delimiter = ',')]
    alphabet: Option<Vec<String>>,

    /// Additional file of strings to classify with the learned automaton, one per line.
    #[arg(long)]
    test: Option<PathBuf>,

    /// Disable progress logging.
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if !args.quiet {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let positives = sample::read_words(&args.positive)?;
    let negatives = sample::read_words(&args.negative)?;

    let alphabet = match args.alphabet {
        Some(symbols) => sample::explicit_alphabet(symbols),
        None => sample::infer_alphabet(&positives, &negatives),
    };

    info!(
        positives = positives.len(),
        negatives = negatives.len(),
        alphabet_size = alphabet.len(),
        "sample loaded"
    );

    let oracle = SamplingOracle::new(alphabet, positives, negatives, false);
    let nfa = NLStar::new(oracle).learn()?;

    println!("{}", nfa.to_table());

    if let Some(test_file) = &args.test {
        sample::run_test_file(&nfa, test_file)?;
    }

    Ok(())
}
