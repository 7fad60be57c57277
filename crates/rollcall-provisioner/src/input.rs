//! Operator input seam.
//!
//! Every blocking question the workflow asks goes through [`Prompter`], so
//! the planner and intake steps can be driven by a terminal or by a script.

use rollcall_directory::Secret;

use crate::error::ProvisionerError;

pub trait Prompter {
    /// Ask a free-text question. The raw answer may be empty.
    fn ask(&self, question: &str) -> Result<String, ProvisionerError>;

    /// Ask for a credential without echoing it.
    fn ask_secret(&self, question: &str) -> Result<Secret, ProvisionerError>;

    /// Yes/no question. A blank answer takes `default`, which is shown in the
    /// prompt as `[Y/n]` or `[y/N]`.
    fn confirm(&self, question: &str, default: bool) -> Result<bool, ProvisionerError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.ask(&format!("{question} {hint}"))?;
            match parse_yes_no(&answer, default) {
                Some(value) => return Ok(value),
                None => self.tell("Please answer 'y' or 'n'."),
            }
        }
    }

    /// Show a line of output to the operator.
    fn tell(&self, message: &str);
}

/// `None` when the answer is neither blank nor a recognisable yes/no.
pub fn parse_yes_no(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Ask until `validate` accepts the trimmed answer; rejections are shown to
/// the operator and the question is repeated.
pub fn ask_validated<F>(
    prompter: &dyn Prompter,
    question: &str,
    validate: F,
) -> Result<String, ProvisionerError>
where
    F: Fn(&str) -> Result<(), String>,
{
    loop {
        let answer = prompter.ask(question)?.trim().to_string();
        match validate(&answer) {
            Ok(()) => return Ok(answer),
            Err(msg) => prompter.tell(&msg),
        }
    }
}

/// `None` for a blank answer.
pub fn ask_optional(
    prompter: &dyn Prompter,
    question: &str,
) -> Result<Option<String>, ProvisionerError> {
    let answer = prompter.ask(question)?;
    let trimmed = answer.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}
