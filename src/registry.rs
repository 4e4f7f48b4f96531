//! The host's list of remote repositories.

use std::fmt::{self, Debug, Formatter};
use std::io::Write;
use std::slice;

use failure::{Error, ResultExt};
use sec::Secret;

use crate::resolver::RepositoryRegistration;

/// Credentials attached to a [`RemoteRepository`].
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"...")
            .finish()
    }
}

/// A remote repository known to the host.
#[derive(Debug)]
pub struct RemoteRepository {
    pub name: String,
    pub url: String,
    pub credentials: Option<Credentials>,
}

impl RemoteRepository {
    /// A repository which doesn't need any credentials.
    pub fn anonymous<N, U>(name: N, url: U) -> RemoteRepository
    where
        N: Into<String>,
        U: Into<String>,
    {
        RemoteRepository {
            name: name.into(),
            url: url.into(),
            credentials: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }
}

impl From<RepositoryRegistration> for RemoteRepository {
    fn from(other: RepositoryRegistration) -> RemoteRepository {
        RemoteRepository {
            name: other.id,
            url: other.url,
            credentials: Some(Credentials {
                username: other.username,
                password: other.password,
            }),
        }
    }
}

/// Something which remote repositories can be registered with.
pub trait RepositorySink {
    fn add_repository(&mut self, repo: RemoteRepository) -> Result<(), Error>;
}

/// An ordered, in-memory list of registered repositories.
#[derive(Debug, Default)]
pub struct RepositoryList {
    repos: Vec<RemoteRepository>,
}

impl RepositoryList {
    pub fn new() -> RepositoryList {
        RepositoryList::default()
    }

    /// Register every resolved repository, in order.
    pub fn register_all<I>(&mut self, registrations: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = RepositoryRegistration>,
    {
        for registration in registrations {
            let name = registration.id.clone();
            self.add_repository(registration.into())
                .with_context(|_| format!("Unable to register \"{}\"", name))?;
        }

        Ok(())
    }

    pub fn iter(&self) -> slice::Iter<RemoteRepository> {
        self.repos.iter()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RemoteRepository> {
        self.repos.iter().find(|r| r.name == name)
    }
}

impl RepositorySink for RepositoryList {
    fn add_repository(&mut self, repo: RemoteRepository) -> Result<(), Error> {
        info!(
            "Registering {} ({}){}",
            repo.name,
            repo.url,
            if repo.is_authenticated() { " with credentials" } else { "" }
        );

        self.repos.push(repo);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RepositoryList {
    type Item = &'a RemoteRepository;
    type IntoIter = slice::Iter<'a, RemoteRepository>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Print every repository as `Repo: <name>, URL: <url>`, in registration
/// order.
pub fn print_repos<'a, I, W>(repos: I, writer: &mut W) -> Result<(), Error>
where
    I: IntoIterator<Item = &'a RemoteRepository>,
    W: Write,
{
    for repo in repos {
        writeln!(writer, "Repo: {}, URL: {}", repo.name, repo.url)?;
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct RepoSummary<'a> {
    name: &'a str,
    url: &'a str,
    authenticated: bool,
}

/// Print the repositories as a JSON array. Credentials are never included.
pub fn print_repos_json<'a, I, W>(repos: I, writer: &mut W) -> Result<(), Error>
where
    I: IntoIterator<Item = &'a RemoteRepository>,
    W: Write,
{
    let summaries: Vec<RepoSummary> = repos
        .into_iter()
        .map(|r| RepoSummary {
            name: &r.name,
            url: &r.url,
            authenticated: r.is_authenticated(),
        })
        .collect();

    serde_json::to_writer_pretty(&mut *writer, &summaries)?;
    writeln!(writer)?;

    Ok(())
}
