use std::io::Cursor;

use rollcall_cli::prompt::LinePrompter;
use rollcall_provisioner::{Prompter, ProvisionerError, plan};

#[test]
fn reads_one_answer_per_line() {
    let prompter = LinePrompter::new(Cursor::new("Ada\r\n\nLovelace\n"), Vec::new());
    assert_eq!(prompter.ask("Given name").unwrap(), "Ada");
    assert_eq!(prompter.ask("Display name").unwrap(), "");
    assert_eq!(prompter.ask("Surname").unwrap(), "Lovelace");
}

#[test]
fn closed_input_is_an_error() {
    let prompter = LinePrompter::new(Cursor::new(""), Vec::new());
    let err = prompter.ask("Given name").unwrap_err();
    assert!(matches!(err, ProvisionerError::Input(_)));
}

#[test]
fn confirm_uses_default_hint() {
    let prompter = LinePrompter::new(Cursor::new("\nmaybe\nn\n"), Vec::new());
    assert!(prompter.confirm("Continue?", true).unwrap());
    assert!(!prompter.confirm("Continue?", true).unwrap());

    let output = String::from_utf8(prompter.into_output()).unwrap();
    assert!(output.contains("Continue? [Y/n]: "));
    assert!(output.contains("Please answer 'y' or 'n'.\n"));
}

#[test]
fn drives_the_batch_planner() {
    let prompter = LinePrompter::new(Cursor::new("zero\n2\ny\nStaff\n\n"), Vec::new());
    let batch = plan(&prompter).unwrap();
    assert_eq!(batch.count, 2);

    let output = String::from_utf8(prompter.into_output()).unwrap();
    assert!(output.contains("'zero' is not a whole number."));
}
