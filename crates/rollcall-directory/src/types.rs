use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Distinguished name of an object in the directory.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(String);

impl ObjectRef {
    pub fn new(dn: impl Into<String>) -> Self {
        Self(dn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A group as the operator typed it: a name, a sAMAccountName, or a full DN.
///
/// Which of the three it is gets decided by the gateway at lookup time.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupIdentifier(String);

impl GroupIdentifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Domain-wide facts resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDefaults {
    /// Container new users land in when no OU is given,
    /// e.g. `CN=Users,DC=corp,DC=example,DC=com`.
    pub default_user_container: String,
    /// Root naming context, e.g. `DC=corp,DC=example,DC=com`.
    pub naming_context: String,
    /// DNS form of the domain, e.g. `corp.example.com`.
    pub dns_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub dn: ObjectRef,
    pub sam_account_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryGroup {
    pub dn: ObjectRef,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupScope {
    DomainLocal,
    Global,
    Universal,
}

/// LDAP attribute name → value. Only attributes with a value are present;
/// an absent key means "do not write this attribute".
pub type AttributeSet = BTreeMap<String, String>;

/// Everything needed for a single user creation request.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Relative name of the new entry (`CN=<common_name>`).
    pub common_name: String,
    /// DN of the OU or container the user is created in.
    pub container: String,
    pub attributes: AttributeSet,
    /// Force a password change at first logon (`pwdLastSet = 0`).
    pub must_change_password: bool,
}
