use rollcall_directory::DirectoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionerError {
    #[error("permission check failed: {0}")]
    PermissionDenied(String),

    #[error("invalid password policy: {0}")]
    InvalidPolicy(String),

    #[error("input error: {0}")]
    Input(String),

    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),
}

/// Walk the full error chain and join all causes into one string.
///
/// LDAP errors often carry the useful detail (server diagnostic text) one
/// or two levels down the source chain.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
