//! Yes/no confirmation read from a single input line.

use crate::error::{Result, ShuffleError};
use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Decline,
}

/// Maps one answer line to a decision. Anything unrecognised declines.
pub fn parse_answer(line: &str) -> Decision {
    match line.trim() {
        "Yes" | "yes" | "y" | "Y" | "YES" => Decision::Proceed,
        "No" | "no" | "n" | "N" | "NO" => Decision::Decline,
        _ => Decision::Decline,
    }
}

pub trait Confirm {
    fn confirm(&mut self, message: &str) -> Result<Decision>;
}

/// Prompts on `output` and reads exactly one line from `input`; EOF declines.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, message: &str) -> Result<Decision> {
        write_prompt(&mut self.output, message)?;
        read_answer(&mut self.input).map_err(|e| ShuffleError::io("<stdin>", e))
    }
}

/// Reads one line as raw bytes. EOF and input that is not UTF-8 both decline.
pub fn read_answer(input: &mut impl BufRead) -> io::Result<Decision> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(Decision::Decline);
    }
    match String::from_utf8(buf) {
        Ok(line) => Ok(parse_answer(&line)),
        Err(_) => Ok(Decision::Decline),
    }
}

/// Runs `read` on a helper thread and waits at most `timeout` for its answer.
/// A missed deadline declines; the helper is left blocked and dies with the process.
pub fn answer_within<F>(timeout: Duration, read: F) -> Result<Decision>
where
    F: FnOnce() -> io::Result<Decision> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(read());
    });
    match rx.recv_timeout(timeout) {
        Ok(answer) => answer.map_err(|e| ShuffleError::io("<stdin>", e)),
        Err(_) => {
            warn!(?timeout, "no answer before timeout, declining");
            Ok(Decision::Decline)
        }
    }
}

/// Reads the answer from the process stdin, optionally giving up after `timeout`.
#[derive(Debug, Clone, Default)]
pub struct StdinPrompt {
    timeout: Option<Duration>,
}

impl StdinPrompt {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl Confirm for StdinPrompt {
    fn confirm(&mut self, message: &str) -> Result<Decision> {
        let Some(timeout) = self.timeout else {
            return LinePrompt::new(io::stdin().lock(), io::stdout()).confirm(message);
        };
        write_prompt(&mut io::stdout(), message)?;
        answer_within(timeout, || read_answer(&mut io::stdin().lock()))
    }
}

/// Skips the question entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _message: &str) -> Result<Decision> {
        Ok(Decision::Proceed)
    }
}

fn write_prompt(out: &mut impl Write, message: &str) -> Result<()> {
    write!(out, "{message} >")
        .and_then(|_| out.flush())
        .map_err(|e| ShuffleError::io("<stdout>", e))
}
