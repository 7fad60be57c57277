use std::fmt::Write as _;

use rollcall_directory::{AttributeSet, GroupIdentifier, NewUser};

use crate::credential::Credential;

/// Attributes collected for one user before anything is written.
///
/// Built fresh by intake for each index and handed to exactly one
/// provisioning call.
#[derive(Debug, Clone)]
pub struct PrincipalDraft {
    /// 1-based position in the batch.
    pub index: usize,
    pub given_name: String,
    pub surname: String,
    /// Never empty; defaults to `"<given name> <surname>"`.
    pub display_name: String,
    /// Duplicate-detection key.
    pub sam_account_name: String,
    pub user_principal_name: String,
    pub title: Option<String>,
    pub department: Option<String>,
    pub office: Option<String>,
    pub description: Option<String>,
    /// DN of the OU or container the user is created in.
    pub container: String,
    pub credential: Credential,
    pub enabled: bool,
    pub must_change_password: bool,
    pub groups: Vec<GroupIdentifier>,
}

impl PrincipalDraft {
    /// LDAP attributes for the creation request. Absent or blank fields are
    /// left out entirely rather than written as empty strings.
    pub fn attributes(&self) -> AttributeSet {
        let fields: [(&str, Option<&str>); 9] = [
            ("sAMAccountName", Some(self.sam_account_name.as_str())),
            ("givenName", Some(self.given_name.as_str())),
            ("sn", Some(self.surname.as_str())),
            ("displayName", Some(self.display_name.as_str())),
            ("userPrincipalName", Some(self.user_principal_name.as_str())),
            ("title", self.title.as_deref()),
            ("department", self.department.as_deref()),
            ("physicalDeliveryOfficeName", self.office.as_deref()),
            ("description", self.description.as_deref()),
        ];

        fields
            .into_iter()
            .filter_map(|(name, value)| {
                let value = value?.trim();
                (!value.is_empty()).then(|| (name.to_string(), value.to_string()))
            })
            .collect()
    }

    pub fn new_user(&self) -> NewUser {
        NewUser {
            common_name: self.display_name.clone(),
            container: self.container.clone(),
            attributes: self.attributes(),
            must_change_password: self.must_change_password,
        }
    }

    /// Multi-line rendering shown to the operator before confirmation.
    /// The password itself is never included.
    pub fn summary(&self) -> String {
        let optional = |v: &Option<String>| v.clone().unwrap_or_else(|| "(none)".to_string());
        let groups = if self.groups.is_empty() {
            "(none)".to_string()
        } else {
            self.groups
                .iter()
                .map(GroupIdentifier::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let rows = [
            ("Given name", self.given_name.clone()),
            ("Surname", self.surname.clone()),
            ("Display name", self.display_name.clone()),
            ("sAMAccountName", self.sam_account_name.clone()),
            ("UPN", self.user_principal_name.clone()),
            ("Title", optional(&self.title)),
            ("Department", optional(&self.department)),
            ("Office", optional(&self.office)),
            ("Description", optional(&self.description)),
            ("Location", self.container.clone()),
            ("Password", self.credential.label().to_string()),
            ("Enabled", yes_no(self.enabled)),
            ("Change at logon", yes_no(self.must_change_password)),
            ("Groups", groups),
        ];

        let mut out = format!("User {}:\n", self.index);
        for (label, value) in rows {
            let _ = writeln!(out, "  {label:<16} {value}");
        }
        out
    }
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
