use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error("insufficient access rights: {0}")]
    InsufficientAccess(String),

    #[error("rejected by directory: {0}")]
    Rejected(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("LDAP operation failed with code {code}: {message}")]
    Operation { code: u32, message: String },

    #[error(transparent)]
    Ldap(#[from] ldap3::LdapError),
}

impl DirectoryError {
    /// Map a non-zero LDAP result code to the matching variant.
    ///
    /// `context` names the operation and target, e.g. `add CN=Ada,...`.
    pub fn from_result_code(code: u32, text: &str, context: &str) -> Self {
        let detail = if text.is_empty() {
            context.to_string()
        } else {
            format!("{context}: {text}")
        };
        match code {
            32 => Self::NotFound(detail),
            50 => Self::InsufficientAccess(detail),
            68 => Self::AlreadyExists(detail),
            19 | 53 => Self::Rejected(detail),
            _ => Self::Operation {
                code,
                message: detail,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
