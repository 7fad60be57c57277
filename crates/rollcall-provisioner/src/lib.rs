//! rollcall-provisioner
//!
//! Interactive batch provisioning of directory users and group memberships.
//! Works against any [`rollcall_directory::Directory`] and any [`Prompter`].
//!
//! Public API:
//! - `PermissionProbe::check()` — prove create/link rights with disposable objects
//! - `plan()` — batch size and group assignment mode
//! - `UserIntake::collect()` — attributes for one user, ending in a confirmation
//! - `Provisioner::provision()` — duplicate check → create → link groups
//! - `BatchRunner::run()` — intake + provision for every index, then a summary
//! - `run_session()` — convenience: probe → plan → run

pub mod credential;
pub mod draft;
pub mod error;
pub mod input;
pub mod intake;
pub mod outcome;
pub mod planner;
pub mod probe;
pub mod provision;
pub mod runner;

pub use crate::credential::{Credential, PasswordPolicy, generate_password};
pub use crate::draft::PrincipalDraft;
pub use crate::error::{ProvisionerError, format_err_chain};
pub use crate::input::Prompter;
pub use crate::intake::{IntakeDecision, UserIntake};
pub use crate::outcome::{
    BatchReport, BatchSummary, GroupLink, LinkStatus, ProvisionOutcome, ProvisionStatus,
};
pub use crate::planner::{BatchPlan, GroupAssignmentPlan, plan};
pub use crate::probe::{PermissionCheckResult, PermissionProbe, ProbeStep, StepStatus};
pub use crate::provision::Provisioner;
pub use crate::runner::BatchRunner;

use rollcall_directory::Directory;

/// Knobs for [`run_session`].
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub policy: PasswordPolicy,
    /// Where probe objects are created. `None` uses the domain's default
    /// user container.
    pub probe_container: Option<String>,
}

/// Full session: permission check → batch plan → batch run.
///
/// A failed permission check is reported to the operator and returned as
/// [`ProvisionerError::PermissionDenied`] before anything is planned or
/// written.
pub async fn run_session(
    directory: &dyn Directory,
    prompter: &dyn Prompter,
    options: SessionOptions,
) -> Result<BatchReport, ProvisionerError> {
    let runner = BatchRunner::new(directory, prompter, options.policy)?;

    prompter.tell("Checking directory permissions...");
    let check = PermissionProbe::new(directory)
        .with_container(options.probe_container)
        .with_policy(options.policy)
        .check()
        .await;

    for step in check.steps.iter().filter(|s| s.status == StepStatus::Failed) {
        if let Some(detail) = &step.detail {
            tracing::debug!(step = %step.name, detail = %detail, "probe step failed");
            if step.name.starts_with("delete_") {
                prompter.tell(&format!("Warning: {detail}"));
            }
        }
    }

    if !check.passed {
        let cause = check
            .cause
            .unwrap_or_else(|| "permission check failed".to_string());
        prompter.tell(&format!("Permission check failed: {cause}"));
        return Err(ProvisionerError::PermissionDenied(cause));
    }
    prompter.tell("Permission check passed.");

    let batch = planner::plan(prompter)?;
    runner.run(&batch).await
}
