use anyhow::{bail, Context, Result};
use askgrok_core::Interaction;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::io::Write;
use std::process::Command;
use std::time::Duration;

/// Terminal side of a command: line input through rustyline, long
/// questions through `$EDITOR`, a spinner while the request is in flight.
pub struct CliInteraction {
    editor: RefCell<DefaultEditor>,
    spinner: RefCell<Option<ProgressBar>>,
    question: RefCell<Option<String>>,
    assume_yes: bool,
}

impl CliInteraction {
    pub fn new(question: Option<String>, assume_yes: bool) -> Result<Self> {
        Ok(Self {
            editor: RefCell::new(DefaultEditor::new()?),
            spinner: RefCell::new(None),
            question: RefCell::new(question),
            assume_yes,
        })
    }

    /// `None` on Ctrl-C or end of input.
    fn read_line(&self, prompt: &str) -> Result<Option<String>> {
        match self.editor.borrow_mut().readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn question_from_editor(&self) -> Result<Option<String>> {
        let editor = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".to_string());

        let mut file = tempfile::Builder::new()
            .prefix("askgrok-question-")
            .suffix(".md")
            .tempfile()
            .context("Failed to create question file")?;
        file.flush()?;

        let status = Command::new(&editor)
            .arg(file.path())
            .status()
            .with_context(|| format!("Failed to launch editor '{editor}'"))?;
        if !status.success() {
            bail!("Editor '{editor}' exited with {status}");
        }

        let question = std::fs::read_to_string(file.path())
            .context("Failed to read question file")?;
        Ok(Some(question))
    }
}

impl Interaction for CliInteraction {
    fn api_key(&self) -> Result<Option<String>> {
        print_system("No xAI API key configured. It will be saved to your global settings.");
        self.read_line("xAI API key: ")
    }

    fn question(&self, use_editor: bool) -> Result<Option<String>> {
        if let Some(question) = self.question.borrow_mut().take() {
            return Ok(Some(question));
        }
        if use_editor {
            return self.question_from_editor();
        }
        self.read_line("\x1b[35mQuestion:\x1b[0m ")
    }

    fn confirm(&self, title: &str, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }

        println!("\x1b[1;36m=== {title} ===\x1b[0m");
        println!("{prompt}");
        println!("\x1b[1;36m{}\x1b[0m", "=".repeat(title.len() + 8));

        let answer = self.read_line("Send? [y/N] ")?.unwrap_or_default();
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    fn info(&self, message: &str) {
        print_system(message);
    }

    fn error(&self, message: &str) {
        print_error(message);
    }

    fn progress_started(&self, title: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(title.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.borrow_mut() = Some(spinner);
    }

    fn progress_finished(&self) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish_and_clear();
        }
    }
}

pub fn print_system(msg: &str) {
    println!("\x1b[33m[System]\x1b[0m {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m[Error]\x1b[0m {msg}");
}
