use std::io::Write;
use std::path::PathBuf;

use failure::{Error, ResultExt};

use crate::config::Config;
use crate::properties::{Environment, Layered, Properties};
use crate::registry::{self, RemoteRepository, RepositoryList, RepositorySink};
use crate::resolver;

/// Something the user asked to run once every repository is registered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Task {
    /// List every registered repository.
    PrintRepos { json: bool },
}

impl Default for Task {
    fn default() -> Task {
        Task::PrintRepos { json: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    config: Config,
    base_dir: PathBuf,
    overrides: Properties,
}

impl Driver {
    /// Create a new `Driver`, resolving relative paths in the config against
    /// `base_dir`.
    pub fn with_config<P: Into<PathBuf>>(config: Config, base_dir: P) -> Driver {
        Driver {
            config,
            base_dir: base_dir.into(),
            overrides: Properties::new(),
        }
    }

    /// Properties which take precedence over every other source (e.g. the
    /// ones passed on the command line).
    pub fn with_property_overrides<I, K, V>(mut self, overrides: I) -> Driver
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in overrides {
            self.overrides.set(key, value);
        }
        self
    }

    pub fn run<W: Write>(&self, task: Task, writer: &mut W) -> Result<(), Error> {
        let repos = self.configure()?;
        self.execute(task, &repos, writer)
    }

    /// Register every repository, failing before anything is registered if
    /// a credential is missing.
    pub fn configure(&self) -> Result<RepositoryList, Error> {
        let declarations = self.config.declarations()?;
        info!("Found {} declared repositories", declarations.len());

        let properties = self.property_source()?;
        let registrations = resolver::resolve(&declarations, &properties)?;

        let mut repos = RepositoryList::new();

        for manual in &self.config.manual {
            repos.add_repository(RemoteRepository::anonymous(
                manual.name.as_str(),
                manual.url.as_str(),
            ))?;
        }

        repos.register_all(registrations)?;

        Ok(repos)
    }

    fn execute<W: Write>(
        &self,
        task: Task,
        repos: &RepositoryList,
        writer: &mut W,
    ) -> Result<(), Error> {
        debug!("Running {:?}", task);

        match task {
            Task::PrintRepos { json: false } => registry::print_repos(repos, writer),
            Task::PrintRepos { json: true } => registry::print_repos_json(repos, writer),
        }
    }

    fn property_source(&self) -> Result<Layered, Error> {
        let mut layers = Layered::new();
        layers.push(self.overrides.clone());
        layers.push(Environment::with_prefix(
            self.config.general.env_prefix.as_str(),
        ));

        for path in self.config.properties_files(&self.base_dir)? {
            if !path.exists() {
                debug!("Skipping {} because it doesn't exist", path.display());
                continue;
            }

            let props = Properties::from_file(&path)
                .context("Unable to load the properties file")?;
            debug!("Loaded {} properties from {}", props.len(), path.display());
            layers.push(props);
        }

        Ok(layers)
    }
}
