extern crate tempfile;

use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

const CONFIG: &str = r#"
[general]
properties-files = ["repo-auth.properties"]
env-prefix = "REPO_AUTH_CLI_TEST_"

[repositories]
myRepo = "http://localhost"

[[manual]]
name = "Maven2"
url = "http://localhost:3000"
"#;

fn project(properties: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("repo-auth.toml"), CONFIG).unwrap();
    fs::write(dir.path().join("repo-auth.properties"), properties).unwrap();
    dir
}

fn repo_auth(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_repo-auth"))
        .arg("-c")
        .arg(dir.path().join("repo-auth.toml"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn print_repos_succeeds_with_every_credential() {
    let dir = project("myRepoUsername=user\nmyRepoPassword=pass\n");

    let output = repo_auth(&dir, &["print-repos"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "Repo: Maven2, URL: http://localhost:3000\nRepo: myRepo, URL: http://localhost\n"
    );
}

#[test]
fn missing_username_exits_with_an_error() {
    let dir = project("myRepoPassword=some_pass\n");

    let output = repo_auth(&dir, &["printRepos"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(
        stderr.contains(
            "Error: \"myRepoUsername\" is not available. Please define it in the properties file"
        ),
        "{}",
        stderr
    );
}

#[test]
fn command_line_properties_fill_in_missing_credentials() {
    let dir = project("myRepoPassword=some_pass\n");

    let output = repo_auth(&dir, &["-P", "myRepoUsername=user", "print-repos"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Repo: myRepo, URL: http://localhost"));
}

#[test]
fn example_config_is_printed() {
    let dir = project("");

    let output = repo_auth(&dir, &["--example-config"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[[repo]]"));
    assert!(stdout.contains("Https\\:Repo.example.comReleasesUsername"));
}
