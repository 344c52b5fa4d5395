use jsg_core::errors::{codes, ErrorInfo, JsgError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("algorithm", "bfs")
        .with_context("key", "threads")
}

#[test]
fn config_error_surface() {
    let err = JsgError::Config(sample_info(codes::TANDEM_LENGTH_MISMATCH, "lengths differ"));
    assert_eq!(err.code(), codes::TANDEM_LENGTH_MISMATCH);
    assert!(err.info().context.contains_key("algorithm"));
}

#[test]
fn display_includes_code_context_and_hint() {
    let err = JsgError::Script(
        sample_info(codes::INVALID_SEPARATOR, "invalid separator").with_hint("use a column name"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("script error: invalid separator"));
    assert!(rendered.contains("code: invalid-separator"));
    assert!(rendered.contains("algorithm=bfs, key=threads"));
    assert!(rendered.ends_with("hint: use a column name"));
}

#[test]
fn with_context_preserves_family() {
    let err = JsgError::config(codes::MISSING_PARAMETER_VALUES, "missing")
        .with_context("key", "graphs");
    assert!(matches!(err, JsgError::Config(_)));
    assert_eq!(err.info().context.get("key").map(String::as_str), Some("graphs"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = JsgError::Io(ErrorInfo::new("script-create", "denied"));
    let value = serde_json::to_value(&err).expect("serialize");
    assert_eq!(value["family"], "Io");
    assert_eq!(value["detail"]["code"], "script-create");
}
