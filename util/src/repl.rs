use rustyline::{error::ReadlineError, Editor};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error<E> {
    #[error(transparent)]
    Readline(ReadlineError),
    #[error("Eval failed: {0:?}")]
    EvalError(E),
}

pub trait Repl {
    type Error: std::fmt::Debug;
    const HISTORY: Option<&'static str> = None;
    const PROMPT: &'static str = ">> ";
    fn evaluate(&mut self, input: String) -> Result<(), Self::Error>;
}

/// Joins lines ending with `\` into one input.
#[derive(Default, Debug)]
pub struct Continuation {
    pending: Option<String>,
}

impl Continuation {
    /// Returns the complete input once `line` does not continue it.
    pub fn feed(&mut self, mut line: String) -> Option<String> {
        let continues = line.ends_with('\\');
        if continues {
            line.pop();
            line.push('\n');
        }
        let input = match self.pending.take() {
            Some(mut pending) => {
                pending.push_str(&line);
                pending
            }
            None => line,
        };
        if continues {
            self.pending = Some(input);
            None
        } else {
            Some(input)
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

pub fn start_repl<R: Repl>(mut repl: R) -> Result<(), Error<R::Error>> {
    let mut editor = Editor::<()>::new();
    if let Some(history) = R::HISTORY {
        if let Err(e) = editor.load_history(history) {
            tracing::debug!("no history loaded from {history}: {e}");
        }
    }
    let mut continuation = Continuation::default();
    loop {
        let prompt = if continuation.is_pending() {
            ".. "
        } else {
            R::PROMPT
        };
        match editor.readline(prompt) {
            Ok(line) => {
                let Some(input) = continuation.feed(line) else {
                    continue;
                };
                editor.add_history_entry(input.as_str());
                repl.evaluate(input).map_err(Error::EvalError)?;
                if let Some(history) = R::HISTORY {
                    editor.save_history(history).map_err(Error::Readline)?;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Bye!");
                break Ok(());
            }
            Err(e) => break Err(Error::Readline(e)),
        }
    }
}
