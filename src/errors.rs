//! The errors encountered in this crate.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// A repository was declared but one of its credential properties is absent
/// or empty.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(
    display = "\"{}\" is not available. Please define it in the properties file",
    key
)]
pub struct MissingCredential {
    /// The exact property key which needs to be defined.
    pub key: String,
}

impl MissingCredential {
    pub fn new<S: Into<String>>(key: S) -> MissingCredential {
        MissingCredential { key: key.into() }
    }
}

/// The same repository id was declared more than once.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "The repository \"{}\" is declared more than once", id)]
pub struct DuplicateRepository {
    pub id: String,
}

/// A declaration which can never be registered (e.g. an empty id).
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "Invalid repository declaration for \"{}\": {}", url, reason)]
pub struct InvalidDeclaration {
    pub url: String,
    pub reason: String,
}

/// The configuration file was well-formed TOML, but didn't make sense.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "Invalid config: {}", _0)]
pub struct InvalidConfig(pub String);

/// A properties file couldn't be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidProperties {
    pub file: PathBuf,
    pub line: usize,
    pub msg: String,
}

impl Display for InvalidProperties {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file.display(), self.line, self.msg)
    }
}

impl failure::Fail for InvalidProperties {}
