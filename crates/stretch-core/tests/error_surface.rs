use stretch_core::errors::{ErrorInfo, SamplerError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("walkers", 3)
        .with_context("reason", "example")
}

#[test]
fn config_error_surface() {
    let err = SamplerError::Config(sample_info("odd-walkers", "walker count must be even"));
    assert_eq!(err.info().code, "odd-walkers");
    assert_eq!(err.info().context.get("walkers").map(String::as_str), Some("3"));
}

#[test]
fn worker_error_surface() {
    let err = SamplerError::Worker(sample_info("worker-panic", "density panicked"));
    assert_eq!(err.info().code, "worker-panic");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = SamplerError::Config(
        ErrorInfo::new("shape-mismatch", "bad initial positions")
            .with_context("expected", "4x2")
            .with_hint("pass one row per walker"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("config error: bad initial positions (code: shape-mismatch)"));
    assert!(rendered.contains("expected=4x2"));
    assert!(rendered.contains("hint: pass one row per walker"));
}

#[test]
fn errors_roundtrip_through_json() {
    let err = SamplerError::serde("export-write", "disk full");
    let json = serde_json::to_string(&err).unwrap();
    assert!(json.contains("\"family\":\"Serde\""));
    let restored: SamplerError = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, err);
}
