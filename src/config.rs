use std::fs;
use std::path::{Path, PathBuf};

use failure::{Error, ResultExt};
use toml::value::{Table, Value};

use crate::declaration::{Declarations, RepositoryDeclaration};
use crate::errors::InvalidConfig;
use crate::properties::DEFAULT_ENV_PREFIX;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: General,
    /// Repositories declared as an ordered `{id -> url}` table.
    #[serde(default, skip_serializing_if = "Table::is_empty")]
    pub repositories: Table,
    /// Repositories declared one at a time, optionally without an id.
    #[serde(default, rename = "repo", skip_serializing_if = "Vec::is_empty")]
    pub repos: Vec<RepoEntry>,
    /// Repositories the host registers as-is, without any credentials.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manual: Vec<ManualRepository>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct General {
    /// Properties files to read credentials from, highest precedence first.
    ///
    /// Relative paths are resolved against the directory containing the
    /// config file, and files which don't exist are skipped.
    #[serde(default)]
    pub properties_files: Vec<String>,
    /// The prefix used when looking up properties as environment variables.
    #[serde(default = "default_env_prefix")]
    pub env_prefix: String,
}

impl Default for General {
    fn default() -> General {
        General {
            properties_files: Vec::new(),
            env_prefix: default_env_prefix(),
        }
    }
}

fn default_env_prefix() -> String {
    String::from(DEFAULT_ENV_PREFIX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
}

impl RepoEntry {
    fn to_declaration(&self) -> RepositoryDeclaration {
        match self.id {
            Some(ref id) => RepositoryDeclaration::new(id.as_str(), self.url.as_str()),
            None => RepositoryDeclaration::from_url(self.url.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManualRepository {
    pub name: String,
    pub url: String,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());

        let contents = fs::read_to_string(path)
            .with_context(|_| format!("Unable to read \"{}\"", path.display()))?;

        Config::parse(&contents)
    }

    pub fn parse(src: &str) -> Result<Config, Error> {
        let cfg = toml::from_str(src).context("Invalid TOML")?;
        Ok(cfg)
    }

    /// Every declared repository, table entries first and then the
    /// individual `[[repo]]` entries, each in the order they appear.
    pub fn declarations(&self) -> Result<Declarations, Error> {
        let mut builder = Declarations::builder();

        for (id, value) in &self.repositories {
            let url = match *value {
                Value::String(ref url) => url.clone(),
                ref other => {
                    let msg = format!(
                        "The URL for \"{}\" should be a string, found {}",
                        id,
                        other.type_str()
                    );
                    return Err(InvalidConfig(msg).into());
                }
            };

            builder = builder.repo_with_id(id.as_str(), url);
        }

        for entry in &self.repos {
            builder = builder.declaration(entry.to_declaration());
        }

        builder.build()
    }

    /// The properties files to read, with `~` and environment variables
    /// expanded and relative paths resolved against `base_dir`.
    pub fn properties_files(&self, base_dir: &Path) -> Result<Vec<PathBuf>, Error> {
        let mut files = Vec::new();

        for raw in &self.general.properties_files {
            let expanded = shellexpand::full(raw)
                .with_context(|_| format!("Unable to expand \"{}\"", raw))?;
            let path = Path::new(&*expanded);

            if path.is_absolute() {
                files.push(path.to_path_buf());
            } else {
                files.push(base_dir.join(path));
            }
        }

        Ok(files)
    }

    pub fn example() -> Config {
        let mut repositories = Table::new();
        repositories.insert(
            String::from("myRepo"),
            Value::String(String::from("http://localhost")),
        );

        Config {
            general: General {
                properties_files: vec![
                    String::from("repo-auth.properties"),
                    String::from("~/.repo-auth/repo-auth.properties"),
                ],
                ..Default::default()
            },
            repositories,
            repos: vec![
                RepoEntry {
                    id: None,
                    url: String::from("https://repo.example.com/releases"),
                },
                RepoEntry {
                    id: Some(String::from("snapshots")),
                    url: String::from("https://repo.example.com/snapshots"),
                },
            ],
            manual: vec![ManualRepository {
                name: String::from("Maven2"),
                url: String::from("http://localhost:3000"),
            }],
        }
    }

    pub fn as_toml(&self) -> Result<String, Error> {
        let toml = toml::to_string_pretty(self).context("Unable to serialize the config")?;
        Ok(toml)
    }

    /// [`Config::example()`] as TOML, with a note on derived ids just before
    /// the first `[[repo]]` entry.
    pub fn example_toml() -> Result<String, Error> {
        let toml = Config::example().as_toml()?;
        let mut annotated = String::with_capacity(toml.len() + DERIVED_ID_NOTE.len());
        let mut noted = false;

        for line in toml.lines() {
            if !noted && line.trim() == "[[repo]]" {
                annotated.push_str(DERIVED_ID_NOTE);
                noted = true;
            }
            annotated.push_str(line);
            annotated.push('\n');
        }

        Ok(annotated)
    }
}

/// Derived ids usually contain a `:`, which is a key/value separator in
/// properties files.
const DERIVED_ID_NOTE: &str = "\
# A [[repo]] without an `id` derives one from its URL, so
# \"https://repo.example.com/releases\" becomes \"Https:Repo.example.comReleases\".
# Escape the `:` when writing its credentials in a properties file:
#   Https\\:Repo.example.comReleasesUsername=...
#   Https\\:Repo.example.comReleasesPassword=...
";
