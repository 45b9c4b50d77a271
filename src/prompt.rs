//! Operator prompts.
//!
//! `Prompter` is the blocking line-reading facility the resolver talks to.
//! `ask_choice` renders a numbered menu and re-asks until the answer is one of
//! the listed ordinals. The loop ends early when the input stream closes or
//! when the configured attempt bound is reached.

use crate::error::DeployError;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Blocking prompt facility.
pub trait Prompter {
    /// Show `message` and wait for one line of input.
    ///
    /// Returns `Ok(None)` once the input stream is closed.
    fn read_line(&mut self, message: &str) -> io::Result<Option<String>>;
}

/// Prompt over a reader/writer pair (stdin/stdout in the binary).
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompt<R, W> {
    fn read_line(&mut self, message: &str) -> io::Result<Option<String>> {
        self.output.write_all(message.as_bytes())?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// How many invalid answers an ask loop tolerates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    /// A bound of zero is treated as unbounded.
    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: (max_attempts > 0).then_some(max_attempts),
        }
    }
}

/// Render labels as a 1-based numbered list, one entry per line.
pub fn numbered_menu<S: AsRef<str>>(labels: &[S]) -> String {
    let mut menu = String::new();
    for (idx, label) in labels.iter().enumerate() {
        menu.push_str(&format!("\n{}. {}", idx + 1, label.as_ref()));
    }
    menu
}

/// Ask until the operator picks one of `labels`; returns its 0-based index.
///
/// `labels` must not be empty. Answers are trimmed and case-folded before
/// being compared with the ordinal strings `"1"..="N"`.
pub fn ask_choice<S: AsRef<str>>(
    prompter: &mut dyn Prompter,
    question: &str,
    labels: &[S],
    policy: RetryPolicy,
) -> Result<usize, DeployError> {
    let message = format!("{question}{}\n", numbered_menu(labels));
    let authorized: Vec<String> = (1..=labels.len()).map(|n| n.to_string()).collect();
    let mut attempts = 0u32;
    loop {
        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return Err(DeployError::PromptAttemptsExhausted(max));
            }
        }
        attempts += 1;
        let answer = prompter
            .read_line(&message)
            .map_err(DeployError::Console)?
            .ok_or(DeployError::PromptClosed)?;
        let answer = answer.trim().to_lowercase();
        if let Some(pos) = authorized.iter().position(|valid| *valid == answer) {
            return Ok(pos);
        }
        debug!(answer = %answer, attempts, "rejected prompt answer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn menu_is_one_based() {
        assert_eq!(
            numbered_menu(&["* (All)", "a.json", "b.json"]),
            "\n1. * (All)\n2. a.json\n3. b.json"
        );
        assert_eq!(numbered_menu::<&str>(&[]), "");
    }

    #[test]
    fn reasks_until_valid_ordinal() {
        let input = Cursor::new("0\nfoo\n4\n 2 \n");
        let mut prompt = ConsolePrompt::new(input, Vec::<u8>::new());
        let choice = ask_choice(&mut prompt, "Pick?", &["x", "y", "z"], RetryPolicy::unbounded());
        assert_eq!(choice.unwrap(), 1);
        let shown = String::from_utf8(prompt.into_output()).unwrap();
        assert_eq!(shown.matches("Pick?\n1. x\n2. y\n3. z\n").count(), 4);
    }

    #[test]
    fn closed_input_cancels() {
        let mut prompt = ConsolePrompt::new(Cursor::new("nope\n"), Vec::<u8>::new());
        let err = ask_choice(&mut prompt, "Pick?", &["x"], RetryPolicy::unbounded()).unwrap_err();
        assert!(matches!(err, DeployError::PromptClosed));
    }

    #[test]
    fn bound_limits_attempts() {
        let mut prompt = ConsolePrompt::new(Cursor::new("9\n9\n9\n1\n"), Vec::<u8>::new());
        let err = ask_choice(&mut prompt, "Pick?", &["x"], RetryPolicy::bounded(3)).unwrap_err();
        assert!(matches!(err, DeployError::PromptAttemptsExhausted(3)));
    }

    #[test]
    fn zero_bound_means_unbounded() {
        assert_eq!(RetryPolicy::bounded(0), RetryPolicy::unbounded());
        let mut prompt = ConsolePrompt::new(Cursor::new("a\nb\nc\n1\r\n"), Vec::<u8>::new());
        assert_eq!(
            ask_choice(&mut prompt, "Pick?", &["x"], RetryPolicy::bounded(0)).unwrap(),
            0
        );
    }
}
