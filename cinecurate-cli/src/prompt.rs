//! Console I/O behind a trait so the menu can be driven from scripts.

use std::collections::VecDeque;

use anyhow::{Result, anyhow};
use dialoguer::console::Term;
use dialoguer::{Confirm, Input};

pub trait Prompter {
    /// Read one line of free text. Empty answers are allowed.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Ask a yes/no question. Defaults to "no".
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    fn println(&mut self, line: &str);
}

/// Interactive prompts on stderr via `dialoguer`; output on stdout.
#[derive(Debug)]
pub struct TerminalPrompter {
    term: Term,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text_on(&self.term)?;
        Ok(answer.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact_on(&self.term)?)
    }

    fn println(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Replays canned answers and records everything printed.
///
/// `confirm` consumes an answer too: `y` or `yes` (any case) is a yes.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    output: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// All printed lines joined with newlines.
    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted answer for prompt {prompt:?}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        Ok(self.next_answer(prompt)?.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.next_answer(prompt)?.trim().to_lowercase();
        Ok(matches!(answer.as_str(), "y" | "yes"))
    }

    fn println(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}
