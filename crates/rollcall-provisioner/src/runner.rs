use rollcall_directory::Directory;

use crate::credential::PasswordPolicy;
use crate::draft::PrincipalDraft;
use crate::error::ProvisionerError;
use crate::input::Prompter;
use crate::intake::{IntakeDecision, UserIntake};
use crate::outcome::{BatchReport, BatchSummary, ProvisionOutcome, ProvisionStatus};
use crate::planner::BatchPlan;
use crate::provision::Provisioner;

/// Drives intake and provisioning over every index of a planned batch.
pub struct BatchRunner<'a> {
    directory: &'a dyn Directory,
    prompter: &'a dyn Prompter,
    policy: PasswordPolicy,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        directory: &'a dyn Directory,
        prompter: &'a dyn Prompter,
        policy: PasswordPolicy,
    ) -> Result<Self, ProvisionerError> {
        policy.validate()?;
        Ok(Self {
            directory,
            prompter,
            policy,
        })
    }

    /// Walk indices `1..=plan.count` in order. Every index yields exactly
    /// one outcome; per-user failures are recorded, not returned.
    ///
    /// Only environment failures end the run early: unreadable domain
    /// defaults before the first user, or an input provider that stops
    /// answering.
    pub async fn run(&self, plan: &BatchPlan) -> Result<BatchReport, ProvisionerError> {
        let started_at = jiff::Timestamp::now();
        let defaults = self.directory.domain_defaults().await?;
        tracing::debug!(
            container = %defaults.default_user_container,
            dns_name = %defaults.dns_name,
            "resolved domain defaults"
        );

        let intake = UserIntake::new(self.prompter, &defaults, self.policy);
        let provisioner = Provisioner::new(self.directory);
        let mut outcomes = Vec::new();

        for index in 1..=plan.count {
            let outcome = match intake.collect(index, &plan.groups)? {
                IntakeDecision::Declined(draft) => {
                    self.prompter
                        .tell(&format!("Skipped {}.", draft.sam_account_name));
                    ProvisionOutcome::skipped_by_operator(&draft)
                }
                IntakeDecision::Confirmed(draft) => {
                    let outcome = provisioner.provision(&draft).await;
                    self.announce(&draft, &outcome);
                    outcome
                }
            };
            tracing::info!(index, status = ?outcome.status, "user finished");
            outcomes.push(outcome);
        }

        let summary = BatchSummary::from_outcomes(&outcomes, started_at, jiff::Timestamp::now());
        self.prompter.tell(&format!("\n{summary}"));

        let attention: Vec<String> = outcomes
            .iter()
            .filter(|o| o.status != ProvisionStatus::Created)
            .map(ProvisionOutcome::describe)
            .collect();
        if !attention.is_empty() {
            self.prompter.tell("Needs attention:");
            for line in &attention {
                self.prompter.tell(&format!("  {line}"));
            }
        }

        Ok(BatchReport { outcomes, summary })
    }

    /// Immediate per-user feedback. A generated password is shown here and
    /// nowhere else, and only once the account actually exists.
    fn announce(&self, draft: &PrincipalDraft, outcome: &ProvisionOutcome) {
        let p = self.prompter;
        match (&outcome.status, &outcome.object) {
            (ProvisionStatus::Created | ProvisionStatus::PartiallyLinked, Some(dn)) => {
                p.tell(&format!("Created {dn}"));
                if draft.credential.is_generated() {
                    p.tell(&format!(
                        "Initial password for {}: {}",
                        draft.sam_account_name,
                        draft.credential.secret().expose()
                    ));
                }
                if outcome.status == ProvisionStatus::PartiallyLinked {
                    p.tell(&outcome.describe());
                }
            }
            _ => p.tell(&outcome.describe()),
        }
    }
}
