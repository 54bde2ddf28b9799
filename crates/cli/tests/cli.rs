use assert_cmd::Command;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("bookstore-cli").unwrap();
    cmd.env_remove("BOOKSTORE_ENV")
        .env_remove("BOOKSTORE_SERVER__PORT")
        .env("BOOKSTORE_CONFIG_DIR", env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = cli().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for subcommand in ["serve", "seed", "config"] {
        assert!(stdout.contains(subcommand), "missing {} in:\n{}", subcommand, stdout);
    }
}

#[test]
fn config_reflects_environment_overrides() {
    let output = cli()
        .arg("config")
        .env("BOOKSTORE_ENV", "staging")
        .env("BOOKSTORE_SERVER__PORT", "4100")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Staging"), "{}", stdout);
    assert!(stdout.contains("4100"), "{}", stdout);
    assert!(stdout.contains("bookstore"), "{}", stdout);
}

#[test]
fn unknown_environment_fails() {
    let output = cli().arg("config").env("BOOKSTORE_ENV", "moon").output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported environment"), "{}", stderr);
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    cli().assert().failure();
}
