use rollcall_directory::DomainDefaults;

use crate::credential::{Credential, PasswordPolicy, generate_password};
use crate::draft::PrincipalDraft;
use crate::error::ProvisionerError;
use crate::input::{Prompter, ask_optional, ask_validated};
use crate::planner::{GroupAssignmentPlan, collect_groups};

/// Characters AD refuses in a sAMAccountName.
const INVALID_SAM_CHARS: &[char] = &[
    '"', '/', '\\', '[', ']', ':', ';', '|', '=', ',', '+', '*', '?', '<', '>', '@',
];
const MAX_SAM_LEN: usize = 20;

/// What the operator decided at the confirmation step.
#[derive(Debug)]
pub enum IntakeDecision {
    Confirmed(PrincipalDraft),
    Declined(PrincipalDraft),
}

/// Per-user attribute collection.
///
/// Domain defaults are resolved once by the caller and reused for every
/// user in the batch.
pub struct UserIntake<'a> {
    prompter: &'a dyn Prompter,
    defaults: &'a DomainDefaults,
    policy: PasswordPolicy,
}

impl<'a> UserIntake<'a> {
    pub fn new(
        prompter: &'a dyn Prompter,
        defaults: &'a DomainDefaults,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            prompter,
            defaults,
            policy,
        }
    }

    pub fn collect(
        &self,
        index: usize,
        plan: &GroupAssignmentPlan,
    ) -> Result<IntakeDecision, ProvisionerError> {
        let p = self.prompter;
        p.tell(&format!("\n── User {index} ──"));

        let given_name = ask_validated(p, "Given name", |s| required(s, "Given name"))?;
        let surname = ask_validated(p, "Surname", |s| required(s, "Surname"))?;

        let default_display = format!("{given_name} {surname}");
        let display_name = ask_optional(p, &format!("Display name [{default_display}]"))?
            .unwrap_or(default_display);

        let sam_account_name =
            ask_validated(p, "Logon name (sAMAccountName)", validate_sam_account_name)?;

        let user_principal_name = if self.defaults.dns_name.is_empty() {
            ask_validated(p, "User principal name", |s| {
                required(s, "User principal name")
            })?
        } else {
            let default_upn = format!("{sam_account_name}@{}", self.defaults.dns_name);
            ask_optional(p, &format!("User principal name [{default_upn}]"))?
                .unwrap_or(default_upn)
        };

        let title = ask_optional(p, "Title")?;
        let department = ask_optional(p, "Department")?;
        let office = ask_optional(p, "Office")?;
        let description = ask_optional(p, "Description")?;

        let container = ask_optional(
            p,
            &format!("OU path [{}]", self.defaults.default_user_container),
        )?
        .unwrap_or_else(|| self.defaults.default_user_container.clone());

        let credential = if p.confirm("Generate a random password?", true)? {
            Credential::Generated(generate_password(&self.policy)?)
        } else {
            Credential::Supplied(self.ask_password()?)
        };

        let enabled = p.confirm("Enable the account now?", true)?;
        let must_change_password = p.confirm("Require a password change at next logon?", true)?;

        let groups = match plan {
            GroupAssignmentPlan::SharedAcrossBatch { groups } => groups.clone(),
            GroupAssignmentPlan::PerUser => {
                p.tell("Enter the groups for this user, one per line. Leave blank to finish.");
                collect_groups(p)?
            }
        };

        let draft = PrincipalDraft {
            index,
            given_name,
            surname,
            display_name,
            sam_account_name,
            user_principal_name,
            title,
            department,
            office,
            description,
            container,
            credential,
            enabled,
            must_change_password,
            groups,
        };

        p.tell(&draft.summary());
        if p.confirm("Create this user?", true)? {
            Ok(IntakeDecision::Confirmed(draft))
        } else {
            tracing::info!(
                index,
                sam_account_name = %draft.sam_account_name,
                "user declined by operator"
            );
            Ok(IntakeDecision::Declined(draft))
        }
    }

    fn ask_password(&self) -> Result<rollcall_directory::Secret, ProvisionerError> {
        loop {
            let secret = self.prompter.ask_secret("Password")?;
            if secret.is_empty() {
                self.prompter.tell("The password cannot be empty.");
                continue;
            }
            if !self.policy.is_satisfied_by(secret.expose()) {
                self.prompter.tell(&format!(
                    "Warning: this password is weaker than the generated-password policy \
                     ({} characters, {} character classes). The directory may reject it.",
                    self.policy.length, self.policy.min_classes
                ));
            }
            return Ok(secret);
        }
    }
}

fn required(value: &str, field: &str) -> Result<(), String> {
    if value.is_empty() {
        Err(format!("{field} is required."))
    } else {
        Ok(())
    }
}

/// AD logon name rules: 1–20 characters, no reserved characters, no trailing
/// period.
pub fn validate_sam_account_name(value: &str) -> Result<(), String> {
    required(value, "Logon name")?;
    if value.chars().count() > MAX_SAM_LEN {
        return Err(format!(
            "Logon name must be at most {MAX_SAM_LEN} characters."
        ));
    }
    if let Some(c) = value.chars().find(|c| INVALID_SAM_CHARS.contains(c)) {
        return Err(format!("Logon name may not contain '{c}'."));
    }
    if value.ends_with('.') {
        return Err("Logon name may not end with a period.".to_string());
    }
    Ok(())
}
