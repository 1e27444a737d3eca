//! Terminal front-end behavior of the `run` subcommand.

use std::process::Command;

#[test]
fn test_failed_run_is_reported_once() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let output_dir = dir.path().join("out");

    let output = Command::new(env!("CARGO_BIN_EXE_benthic_scan"))
        .arg("run")
        .arg("--input")
        .arg(dir.path().join("missing"))
        .arg("--output")
        .arg(&output_dir)
        .env_remove("RUST_LOG")
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Input folder not found").count(), 1, "{}", stderr);
    assert!(stderr.contains("❌"), "{}", stderr);
    assert!(!stderr.contains("Error: "), "{}", stderr);
    assert!(!output_dir.exists());
    Ok(())
}

#[test]
fn test_rejects_out_of_range_settings() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    for (flag, value) in [("--confidence", "1.5"), ("--stride", "0"), ("--stride", "31")] {
        let output = Command::new(env!("CARGO_BIN_EXE_benthic_scan"))
            .args(["run", "--input"])
            .arg(dir.path())
            .arg("--output")
            .arg(dir.path().join("out"))
            .args([flag, value])
            .output()?;
        assert!(!output.status.success(), "{} {} was accepted", flag, value);
    }
    Ok(())
}
