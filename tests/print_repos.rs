extern crate repo_auth;
extern crate tempfile;

use std::fs;
use std::path::Path;

use repo_auth::errors::MissingCredential;
use repo_auth::{Config, Driver, Task};
use tempfile::TempDir;

const CONFIG_HEADER: &str = r#"
[general]
properties-files = ["repo-auth.properties"]
env-prefix = "REPO_AUTH_INTEGRATION_TEST_"
"#;

fn project(config: &str, properties: Option<&str>) -> TempDir {
    let dir = TempDir::new().unwrap();

    let config = format!("{}\n{}", CONFIG_HEADER, config);
    fs::write(dir.path().join("repo-auth.toml"), config).unwrap();

    if let Some(props) = properties {
        fs::write(dir.path().join("repo-auth.properties"), props).unwrap();
    }

    dir
}

fn driver(dir: &Path) -> Driver {
    let cfg = Config::from_file(dir.join("repo-auth.toml")).unwrap();
    Driver::with_config(cfg, dir)
}

fn print_repos(driver: &Driver) -> String {
    let mut buffer = Vec::new();
    driver.run(Task::default(), &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[test]
fn configured_repositories_are_printed() {
    let dir = project(
        "[repositories]\nmyRepo = \"http://localhost\"\n",
        Some("myRepoUsername=user\nmyRepoPassword=pass\n"),
    );

    let got = print_repos(&driver(dir.path()));

    assert!(got.contains("Repo: myRepo, URL: http://localhost"));
}

#[test]
fn missing_username_aborts_before_anything_is_printed() {
    let dir = project(
        "[[manual]]\nname = \"Maven2\"\nurl = \"http://localhost:3000\"\n\n\
         [repositories]\nmyRepo = \"http://localhost\"\n",
        Some("myRepoPassword=some_pass\n"),
    );
    let mut buffer = Vec::new();

    let err = driver(dir.path())
        .run(Task::default(), &mut buffer)
        .unwrap_err();

    assert!(buffer.is_empty());
    let missing = err.downcast_ref::<MissingCredential>().unwrap();
    assert_eq!(missing.key, "myRepoUsername");
    assert!(err.to_string().contains("\"myRepoUsername\" is not available"));
}

#[test]
fn nothing_declared_still_runs() {
    let dir = project("", None);

    let got = print_repos(&driver(dir.path()));

    assert_eq!(got, "");
}

#[test]
fn manual_repositories_come_before_resolved_ones() {
    let dir = project(
        r#"
[repositories]
myRepo = "http://localhost"

[[manual]]
name = "Maven2"
url = "http://localhost:3000"
"#,
        Some("myRepoUsername=user\nmyRepoPassword=pass\n"),
    );

    let got = print_repos(&driver(dir.path()));

    assert_eq!(
        got,
        "Repo: Maven2, URL: http://localhost:3000\nRepo: myRepo, URL: http://localhost\n"
    );
}

#[test]
fn command_line_properties_take_precedence() {
    let dir = project(
        "[repositories]\nmyRepo = \"http://localhost\"\n",
        Some("myRepoUsername=\nmyRepoPassword=pass\n"),
    );
    let driver = driver(dir.path()).with_property_overrides(vec![("myRepoUsername", "cli-user")]);

    let repos = driver.configure().unwrap();

    let creds = repos.get("myRepo").unwrap().credentials.as_ref().unwrap();
    assert_eq!(creds.username, "cli-user");
    assert_eq!(creds.password.reveal(), "pass");
}

#[test]
fn derived_ids_are_printed() {
    let dir = project(
        "[[repo]]\nurl = \"http://example.com/foo/bar\"\n",
        Some("Http\\:Example.comFooBarUsername=user\nHttp\\:Example.comFooBarPassword=pass\n"),
    );

    let got = print_repos(&driver(dir.path()));

    assert_eq!(
        got,
        "Repo: Http:Example.comFooBar, URL: http://example.com/foo/bar\n"
    );
}

#[test]
fn json_listing_marks_authenticated_repositories() {
    let dir = project(
        "[repositories]\nmyRepo = \"http://localhost\"\n\n[[manual]]\nname = \"Maven2\"\nurl = \"http://localhost:3000\"\n",
        Some("myRepoUsername=user\nmyRepoPassword=hunter2\n"),
    );
    let mut buffer = Vec::new();

    driver(dir.path())
        .run(Task::PrintRepos { json: true }, &mut buffer)
        .unwrap();

    let got = String::from_utf8(buffer).unwrap();
    assert!(got.contains("\"authenticated\": true"));
    assert!(got.contains("\"authenticated\": false"));
    assert!(!got.contains("hunter2"));
}
