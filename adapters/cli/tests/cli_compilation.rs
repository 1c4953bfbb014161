use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "wave-defence"])
        .status()
        .expect("failed to invoke cargo check for wave-defence CLI binary");

    assert!(status.success(), "cargo check --bin wave-defence should succeed");
}

#[test]
fn cli_runs_a_short_headless_match() {
    let output = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args([
            "run",
            "--quiet",
            "--bin",
            "wave-defence",
            "--",
            "--players",
            "2",
            "--duration",
            "20",
        ])
        .output()
        .expect("failed to invoke the wave-defence CLI binary");

    assert!(output.status.success(), "headless match should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("player 1"), "summary lists player 1: {stdout}");
    assert!(stdout.contains("player 2"), "summary lists player 2: {stdout}");
}
