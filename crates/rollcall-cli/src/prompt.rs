//! Terminal implementations of [`Prompter`].

use std::cell::RefCell;
use std::io::{BufRead, IsTerminal, Write};

use dialoguer::{Confirm, Input, Password};
use rollcall_directory::Secret;
use rollcall_provisioner::{Prompter, ProvisionerError};

/// Checks if both stdin and stdout are connected to a terminal.
pub fn is_interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

fn input_error(e: dialoguer::Error) -> ProvisionerError {
    ProvisionerError::Input(e.to_string())
}

/// Interactive prompts with masked password entry.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn ask(&self, question: &str) -> Result<String, ProvisionerError> {
        Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)
    }

    fn ask_secret(&self, question: &str) -> Result<Secret, ProvisionerError> {
        Password::new()
            .with_prompt(question)
            .allow_empty_password(true)
            .interact()
            .map(Secret::new)
            .map_err(input_error)
    }

    fn confirm(&self, question: &str, default: bool) -> Result<bool, ProvisionerError> {
        Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(input_error)
    }

    fn tell(&self, message: &str) {
        println!("{message}");
    }
}

/// Line-oriented prompts for piped input. Questions and output go to
/// `output`; each answer is one line of `input`.
///
/// Secrets are read the same way as any other answer; there is no echo to
/// suppress on a pipe.
pub struct LinePrompter<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn read_line(&self, question: &str) -> Result<String, ProvisionerError> {
        {
            let mut out = self.output.borrow_mut();
            write!(out, "{question}: ")
                .and_then(|()| out.flush())
                .map_err(|e| ProvisionerError::Input(e.to_string()))?;
        }

        let mut line = String::new();
        let read = self
            .input
            .borrow_mut()
            .read_line(&mut line)
            .map_err(|e| ProvisionerError::Input(e.to_string()))?;
        if read == 0 {
            return Err(ProvisionerError::Input(format!(
                "input closed while waiting for '{question}'"
            )));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&self, question: &str) -> Result<String, ProvisionerError> {
        self.read_line(question)
    }

    fn ask_secret(&self, question: &str) -> Result<Secret, ProvisionerError> {
        self.read_line(question).map(Secret::new)
    }

    fn tell(&self, message: &str) {
        let _ = writeln!(self.output.borrow_mut(), "{message}");
    }
}
