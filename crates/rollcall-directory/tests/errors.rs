use rollcall_directory::{DirectoryError, Secret};

#[test]
fn result_codes_map_to_variants() {
    assert!(matches!(
        DirectoryError::from_result_code(68, "", "add CN=x"),
        DirectoryError::AlreadyExists(_)
    ));
    assert!(matches!(
        DirectoryError::from_result_code(32, "", "read CN=x"),
        DirectoryError::NotFound(_)
    ));
    assert!(matches!(
        DirectoryError::from_result_code(50, "", "add CN=x"),
        DirectoryError::InsufficientAccess(_)
    ));
    assert!(matches!(
        DirectoryError::from_result_code(53, "", "add CN=x"),
        DirectoryError::Rejected(_)
    ));
    assert!(matches!(
        DirectoryError::from_result_code(1, "", "add CN=x"),
        DirectoryError::Operation { code: 1, .. }
    ));
}

#[test]
fn result_code_message_includes_server_text() {
    let err = DirectoryError::from_result_code(19, "0000052D: password policy", "add CN=x");
    assert_eq!(
        err.to_string(),
        "rejected by directory: add CN=x: 0000052D: password policy"
    );
}

#[test]
fn secret_debug_is_redacted() {
    let secret = Secret::new("hunter2");
    assert_eq!(format!("{secret:?}"), "Secret([REDACTED])");
    assert_eq!(secret.expose(), "hunter2");
    assert!(!secret.is_empty());
}
