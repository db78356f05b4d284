use std::{env, fs, process::Command};

fn grand_chase() -> Command {
    Command::new(env!("CARGO_BIN_EXE_grand-chase"))
}

#[test]
fn help_lists_the_configuration_flags() {
    let output = grand_chase()
        .arg("--help")
        .output()
        .expect("failed to run grand-chase --help");

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--config", "--seed", "--fps", "--log-file", "--replay-after-final-win"] {
        assert!(help.contains(flag), "help output should mention {flag}");
    }
}

#[test]
fn inconsistent_configuration_is_reported_before_the_game_starts() {
    let path = env::temp_dir().join(format!("grand-chase-invalid-{}.toml", std::process::id()));
    fs::write(&path, "initial_delay_ms = 100\nmin_delay_ms = 300\n").expect("write config");

    let output = grand_chase()
        .arg("--config")
        .arg(&path)
        .output()
        .expect("failed to run grand-chase");
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configuration rejected"), "stderr: {stderr}");
}
