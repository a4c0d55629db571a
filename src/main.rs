//! wordpredict - train trigram models and type with word recommendations.
//!
//! # Commands
//!
//! - `train`: count a training text and write the model file
//! - `predict`: interactive typing with live recommendations
//! - `keystrokes`: how many keystrokes recommendations save on a test text
//! - `spell-eval`: correction accuracy over a misspelling list
//! - `cleanse-sms`: turn the SMS spam collection into one message per line
//!
//! Settings not given on the command line come from the `confy` config file.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use wordpredict::corpus::{self, RegexTokenizer, Tokenize};
use wordpredict::evaluation;
use wordpredict::model_io;
use wordpredict::session::{Key, SessionEvent, TypingSession};
use wordpredict::{Config, WordPredictor};

mod logging;

use logging::LogArgs;

#[derive(Parser, Debug)]
#[command(name = "wordpredict")]
#[command(about = "Trigram word prediction and spelling correction")]
#[command(version)]
struct Args {
    #[command(flatten)]
    logging: LogArgs,

    /// Number of words to recommend
    #[arg(long, global = true)]
    window: Option<usize>,

    /// Maximum edit distance for spelling corrections (0-2)
    #[arg(long, global = true)]
    max_edit_distance: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a language model from a training text
    Train {
        /// File from which to build the language model
        #[arg(short, long)]
        file: PathBuf,

        /// File in which to store the language model (stdout if omitted)
        #[arg(short, long)]
        destination: Option<PathBuf>,
    },

    /// Type freely and see recommended words with each keystroke
    Predict {
        /// Language model file
        #[arg(short = 'f', long)]
        model: Option<PathBuf>,
    },

    /// Count the keystrokes recommendations would save on a test text
    Keystrokes {
        /// Text to replay
        #[arg(short = 's', long)]
        test_file: PathBuf,

        /// Language model file
        #[arg(short = 'f', long)]
        model: Option<PathBuf>,
    },

    /// Measure spelling correction accuracy on a misspelling list
    SpellEval {
        /// `$word` headers followed by misspellings, one per line
        #[arg(short = 'm', long)]
        misspellings: PathBuf,

        /// Language model file
        #[arg(short = 'f', long)]
        model: Option<PathBuf>,
    },

    /// Strip labels from the SMS spam collection
    CleanseSms {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    args.logging.setup_logging(2)?;

    let mut config = Config::load()?;

    // Persist defaults so users get a concrete config file on first run.
    if let Err(err) = config.save() {
        log::warn!("Failed to persist config defaults: {err}");
    }

    if let Some(window) = args.window {
        config.recommendation_window = window;
    }
    if let Some(distance) = args.max_edit_distance {
        config.max_edit_distance = distance;
    }

    match args.command {
        Command::Train { file, destination } => {
            let counts = corpus::train_from_file(&file, &RegexTokenizer::default())?;
            match destination {
                Some(path) => model_io::write_model(&counts, &path)?,
                None => model_io::write_lines(&counts, io::stdout().lock())?,
            }
        }
        Command::Predict { model } => {
            let path = model.unwrap_or_else(|| config.resolved_model_path());
            let predictor = WordPredictor::load(&path, &config)?;
            let mut session = TypingSession::with_config(predictor, &config);
            run_session(&mut session)?;
        }
        Command::Keystrokes { test_file, model } => {
            let path = model.unwrap_or_else(|| config.resolved_model_path());
            let mut predictor = WordPredictor::load(&path, &config)?;
            let text = corpus::read_text(&test_file)?;
            let tokens = RegexTokenizer::default().tokenize(&text);
            println!("Number of words/tokens in test file {}", tokens.len());

            let report = evaluation::keystroke_savings(
                &mut predictor,
                tokens.as_slice(),
                &config.sentence_start_token,
            );
            println!(
                "Total words in test file {} - Total keystrokes in test file {}, user had to type {}",
                report.tokens, report.total_keystrokes, report.user_keystrokes
            );
            println!(
                "User had to make {:.2} percent of the keystrokes.",
                report.user_percentage()
            );
        }
        Command::SpellEval {
            misspellings,
            model,
        } => {
            let path = model.unwrap_or_else(|| config.resolved_model_path());
            let predictor = WordPredictor::load(&path, &config)?;
            let cases = evaluation::parse_misspellings(&corpus::read_text(&misspellings)?);

            let report = evaluation::spelling_accuracy(&predictor, &cases);
            println!("total: {}", report.total);
            println!("corrected: {}", report.corrected);
            println!("relative: {:.2}", report.percentage());
        }
        Command::CleanseSms { input, output } => {
            let written = corpus::cleanse_sms(&input, &output)?;
            println!("Wrote {written} messages to {}", output.display());
        }
    }

    Ok(())
}

/// Drive a typing session from stdin, one key per line.
fn run_session(session: &mut TypingSession) -> io::Result<()> {
    println!("Welcome to the Word Prediction Program.");
    println!("Enter one character per line, `N-` to choose recommendation N,");
    println!("an empty line to finish a word, `back`, `reset` or `quit`.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!();
        println!("{}", session.render());
        for (i, word) in session.suggestions().iter().enumerate() {
            println!("{} - {}", i + 1, word);
        }
        print!("Enter a character (or choose a recommended word): ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match Key::parse(line.trim_end_matches('\r')) {
            Some(key) => {
                if session.handle_key(key) == SessionEvent::Quit {
                    break;
                }
            }
            None => println!(
                "\nPlease input a character. You can also type `quit` to quit, `reset` to reset \
                 the word or an empty line to finish typing your word."
            ),
        }
    }

    println!("\nExiting type.");
    Ok(())
}
