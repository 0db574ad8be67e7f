/// Smoke tests to verify the binary runs without panicking
use std::process::Command;

#[test]
fn binary_shows_help() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("termeq"), "Help output should mention termeq");
    assert!(stdout.contains("--list-devices"), "Help output should list --list-devices");
}

#[test]
fn binary_shows_version() {
    let output = Command::new("cargo")
        .args(["run", "--", "--version"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn channel_zero_fails_gracefully() {
    let output = Command::new("cargo")
        .args(["run", "--", "0"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(!output.status.success(), "Channel 0 should return error status");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked at"), "Channel 0 should not cause panic");
}

#[test]
fn unknown_flag_fails_gracefully() {
    let output = Command::new("cargo")
        .args(["run", "--", "--no-such-flag"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(!output.status.success(), "Unknown flag should return error status");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked at"), "Unknown flag should not cause panic");
}
