use std::process::Command;

fn gridfire(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_gridfire"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch gridfire");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn scripted_quit_stops_the_run_and_reports_diagnostics() {
    let (success, stdout, _) = gridfire(&[
        "--headless",
        "--width",
        "40",
        "--height",
        "12",
        "--script",
        "spawn . shoot warp quit",
    ]);

    assert!(success, "gridfire should exit cleanly");
    assert!(stdout.contains("state: quit"), "{stdout}");
    assert!(stdout.contains("ticks: 4"), "{stdout}");
    assert!(stdout.contains("unknown command `warp` at tick 3"), "{stdout}");
}

#[test]
fn tick_limit_bounds_the_run() {
    let (success, stdout, _) = gridfire(&["--headless", "--ticks", "5"]);

    assert!(success);
    assert!(stdout.contains("state: play"), "{stdout}");
    assert!(stdout.contains("ticks: 5"), "{stdout}");
}

#[test]
fn missing_config_file_fails_with_context() {
    let (success, _, stderr) = gridfire(&[
        "--headless",
        "--config",
        "/nonexistent/gridfire.toml",
    ]);

    assert!(!success);
    assert!(stderr.contains("failed to read config file"), "{stderr}");
}
