//! Installing the global subscriber is process-wide, so this lives in its
//! own test binary and is the only test in it.

use sillage_telemetry::{LogFormat, LoggingConfig, TelemetryError, build_sha, init_logging};

#[test]
fn second_install_fails_and_first_sha_sticks() {
    let first = LoggingConfig {
        level: "info",
        format: LogFormat::Pretty,
        build_sha: "abc123",
    };
    assert!(init_logging(&first).is_ok());
    let second = LoggingConfig {
        build_sha: "def456",
        ..first
    };
    assert!(matches!(
        init_logging(&second),
        Err(TelemetryError::SubscriberInstall { .. })
    ));
    assert_eq!(build_sha(), "abc123");
}
