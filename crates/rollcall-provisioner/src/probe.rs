//! Permission self-check with disposable probe objects.
//!
//! Before any batch work, the bound identity has to prove it can read users,
//! create a user, create a group, and link the two. The probe does exactly
//! that inside a known-safe container, using names with a random 128-bit
//! suffix, and deletes what it created before returning.
//!
//! | Step | Directory call |
//! |------|----------------|
//! | `read_directory` | `sample_users(1)` (and `domain_defaults` when no container is configured) |
//! | `create_probe_user` | `create_user` (disabled, random password) |
//! | `create_probe_group` | `create_group` (global scope) |
//! | `add_probe_member` | `add_member` |
//! | `delete_probe_group` / `delete_probe_user` | `delete_object`, best-effort |
//!
//! Cleanup failures are recorded in the step log but never change the
//! verdict.

use std::future::Future;

use rollcall_directory::{AttributeSet, Directory, DirectoryError, GroupScope, NewUser, ObjectRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credential::{PasswordPolicy, generate_password};
use crate::error::format_err_chain;

// ── Public types ─────────────────────────────────────────────────────────────

/// Outcome of [`PermissionProbe::check`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCheckResult {
    pub passed: bool,
    /// Human-readable reason for a failed check.
    pub cause: Option<String>,
    pub steps: Vec<ProbeStep>,
    /// sAMAccountName used for the probe user.
    pub probe_user: String,
    /// Name used for the probe group.
    pub probe_group: String,
}

/// A single step of the probe, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeStep {
    pub name: String,
    pub status: StepStatus,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    InProgress,
    Succeeded,
    Failed,
}

/// Generated names for one probe run.
#[derive(Debug, Clone)]
struct ProbeNames {
    user_cn: String,
    /// AD caps sAMAccountName at 20 characters.
    user_sam: String,
    group: String,
}

impl ProbeNames {
    fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            user_cn: format!("rollcall-probe-user-{suffix}"),
            user_sam: format!("rcp-{}", &suffix[..16]),
            group: format!("rollcall-probe-group-{suffix}"),
        }
    }
}

// ── Probe ────────────────────────────────────────────────────────────────────

pub struct PermissionProbe<'a> {
    directory: &'a dyn Directory,
    container: Option<String>,
    policy: PasswordPolicy,
}

impl<'a> PermissionProbe<'a> {
    pub fn new(directory: &'a dyn Directory) -> Self {
        Self {
            directory,
            container: None,
            policy: PasswordPolicy::default(),
        }
    }

    /// Create probe objects here instead of the domain's default user
    /// container.
    pub fn with_container(mut self, container: Option<String>) -> Self {
        self.container = container;
        self
    }

    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full probe. Never leaves probe objects behind that it was
    /// able to delete, and never returns an error: any failure becomes a
    /// failed result with a cause.
    pub async fn check(&self) -> PermissionCheckResult {
        let names = ProbeNames::generate();
        let mut steps = Vec::with_capacity(6);
        let mut created = Created::default();

        let verdict = self.exercise(&names, &mut steps, &mut created).await;

        // ── Cleanup: group first, then user ──────────────────────────────
        if let Some(group) = &created.group {
            self.cleanup(&mut steps, "delete_probe_group", group).await;
        }
        if let Some(user) = &created.user {
            self.cleanup(&mut steps, "delete_probe_user", user).await;
        }

        let (passed, cause) = match verdict {
            Ok(()) => (true, None),
            Err(cause) => (false, Some(cause)),
        };

        if passed {
            tracing::info!("permission check passed");
        } else {
            tracing::warn!(cause = ?cause, "permission check failed");
        }

        PermissionCheckResult {
            passed,
            cause,
            steps,
            probe_user: names.user_sam,
            probe_group: names.group,
        }
    }

    async fn exercise(
        &self,
        names: &ProbeNames,
        steps: &mut Vec<ProbeStep>,
        created: &mut Created,
    ) -> Result<(), String> {
        // ── Step 1: baseline read ────────────────────────────────────────
        let container = run_step(steps, "read_directory", "could not read the directory", async {
            self.directory.sample_users(1).await?;
            match &self.container {
                Some(container) => Ok(container.clone()),
                None => Ok(self.directory.domain_defaults().await?.default_user_container),
            }
        })
        .await?;

        // ── Step 2: disabled test user ───────────────────────────────────
        let password = generate_password(&self.policy).map_err(|e| e.to_string())?;
        let user = NewUser {
            common_name: names.user_cn.clone(),
            container: container.clone(),
            attributes: AttributeSet::from([
                ("sAMAccountName".to_string(), names.user_sam.clone()),
                ("displayName".to_string(), names.user_cn.clone()),
                (
                    "description".to_string(),
                    "Temporary rollcall permission probe".to_string(),
                ),
            ]),
            must_change_password: false,
        };
        let user_ref = run_step(
            steps,
            "create_probe_user",
            &format!("could not create a test user in {container}"),
            self.directory.create_user(&user, &password, false),
        )
        .await?;
        created.user = Some(user_ref.clone());

        // ── Step 3: temporary global group ───────────────────────────────
        let group_ref = run_step(
            steps,
            "create_probe_group",
            &format!("could not create a test group in {container}"),
            self.directory
                .create_group(&names.group, GroupScope::Global, &container),
        )
        .await?;
        created.group = Some(group_ref.clone());

        // ── Step 4: membership link ──────────────────────────────────────
        run_step(
            steps,
            "add_probe_member",
            "could not add a member to a group",
            self.directory.add_member(&group_ref, &user_ref),
        )
        .await?;

        Ok(())
    }

    async fn cleanup(&self, steps: &mut Vec<ProbeStep>, name: &str, object: &ObjectRef) {
        push_step(steps, name, StepStatus::InProgress, None);
        match self.directory.delete_object(object).await {
            Ok(()) => set_step_status(steps, name, StepStatus::Succeeded, None),
            Err(e) => {
                tracing::warn!(dn = %object, error = %e, "failed to delete probe object");
                set_step_status(
                    steps,
                    name,
                    StepStatus::Failed,
                    Some(format!(
                        "Could not delete {object}; remove it manually. Error: {}",
                        format_err_chain(&e)
                    )),
                );
            }
        }
    }
}

#[derive(Default)]
struct Created {
    user: Option<ObjectRef>,
    group: Option<ObjectRef>,
}

// ── Step tracking helpers ────────────────────────────────────────────────────

async fn run_step<T>(
    steps: &mut Vec<ProbeStep>,
    name: &str,
    failure: &str,
    fut: impl Future<Output = Result<T, DirectoryError>>,
) -> Result<T, String> {
    push_step(steps, name, StepStatus::InProgress, None);
    match fut.await {
        Ok(value) => {
            set_step_status(steps, name, StepStatus::Succeeded, None);
            Ok(value)
        }
        Err(e) => {
            let detail = format_err_chain(&e);
            set_step_status(steps, name, StepStatus::Failed, Some(detail.clone()));
            Err(format!("{failure}: {detail}"))
        }
    }
}

fn push_step(steps: &mut Vec<ProbeStep>, name: &str, status: StepStatus, detail: Option<String>) {
    steps.push(ProbeStep {
        name: name.to_string(),
        status,
        detail,
    });
}

fn set_step_status(
    steps: &mut [ProbeStep],
    name: &str,
    status: StepStatus,
    detail: Option<String>,
) {
    if let Some(step) = steps.iter_mut().rfind(|s| s.name == name) {
        step.status = status;
        step.detail = detail;
    }
}
