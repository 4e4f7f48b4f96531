//! Declaring which repositories should be registered.

use std::collections::HashSet;
use std::slice;
use std::vec;

use failure::Error;

use crate::errors::{DuplicateRepository, InvalidDeclaration};

/// A single `(id, url)` pair describing a repository to register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDeclaration {
    pub id: String,
    pub url: String,
}

impl RepositoryDeclaration {
    /// Declare a repository with an explicit id. The URL is never consulted.
    pub fn new<I, U>(id: I, url: U) -> RepositoryDeclaration
    where
        I: Into<String>,
        U: Into<String>,
    {
        RepositoryDeclaration {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Declare a repository, deriving its id from the URL.
    pub fn from_url<U: Into<String>>(url: U) -> RepositoryDeclaration {
        let url = url.into();
        let id = derive_id(&url);

        RepositoryDeclaration { id, url }
    }

    /// The property holding this repository's username.
    pub fn username_key(&self) -> String {
        format!("{}Username", self.id)
    }

    /// The property holding this repository's password.
    pub fn password_key(&self) -> String {
        format!("{}Password", self.id)
    }
}

/// Derive a repository id from its URL.
///
/// The URL is split on `/`, the first character of each segment is
/// title-cased (if it was lower-case), and the segments are concatenated.
///
/// ```rust
/// assert_eq!(
///     repo_auth::derive_id("http://example.com/foo/bar"),
///     "Http:Example.comFooBar"
/// );
/// ```
pub fn derive_id(url: &str) -> String {
    url.split('/').map(capitalize).collect()
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();

    match chars.next() {
        Some(first) if first.is_lowercase() => {
            let mut capitalized = titlecase(first);
            capitalized.extend(chars);
            capitalized
        }
        _ => segment.to_string(),
    }
}

/// The full title-case mapping of a character (e.g. `ß` becomes `Ss`),
/// falling back to its upper-case mapping when it has no title-case form.
fn titlecase(c: char) -> String {
    let mapped: String = unicode_case_mapping::to_titlecase(c)
        .iter()
        .take_while(|&&code| code != 0)
        .filter_map(|&code| std::char::from_u32(code))
        .collect();

    if mapped.is_empty() {
        c.to_uppercase().collect()
    } else {
        mapped
    }
}

/// An immutable, ordered list of repository declarations.
///
/// Ids are guaranteed to be unique and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    items: Vec<RepositoryDeclaration>,
}

impl Declarations {
    pub fn builder() -> DeclarationsBuilder {
        DeclarationsBuilder::default()
    }

    pub fn iter(&self) -> slice::Iter<RepositoryDeclaration> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[RepositoryDeclaration] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a Declarations {
    type Item = &'a RepositoryDeclaration;
    type IntoIter = slice::Iter<'a, RepositoryDeclaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Declarations {
    type Item = RepositoryDeclaration;
    type IntoIter = vec::IntoIter<RepositoryDeclaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Collects declarations in the order they are made, checking them all when
/// the final [`Declarations`] is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclarationsBuilder {
    items: Vec<RepositoryDeclaration>,
}

impl DeclarationsBuilder {
    /// Declare a repository with an id derived from its URL.
    pub fn repo<U: Into<String>>(mut self, url: U) -> Self {
        self.items.push(RepositoryDeclaration::from_url(url));
        self
    }

    /// Declare a repository with an explicit id.
    pub fn repo_with_id<I, U>(mut self, id: I, url: U) -> Self
    where
        I: Into<String>,
        U: Into<String>,
    {
        self.items.push(RepositoryDeclaration::new(id, url));
        self
    }

    /// Declare several repositories at once from an ordered `{id -> url}`
    /// table.
    pub fn table<T, I, U>(mut self, table: T) -> Self
    where
        T: IntoIterator<Item = (I, U)>,
        I: Into<String>,
        U: Into<String>,
    {
        self.items.extend(
            table
                .into_iter()
                .map(|(id, url)| RepositoryDeclaration::new(id, url)),
        );
        self
    }

    pub fn declaration(mut self, decl: RepositoryDeclaration) -> Self {
        self.items.push(decl);
        self
    }

    /// Check every declaration, rejecting empty and duplicate ids.
    pub fn build(self) -> Result<Declarations, Error> {
        let mut seen = HashSet::new();

        for decl in &self.items {
            if decl.id.is_empty() {
                return Err(InvalidDeclaration {
                    url: decl.url.clone(),
                    reason: String::from("the repository id is empty"),
                }
                .into());
            }

            if !seen.insert(decl.id.as_str()) {
                return Err(DuplicateRepository {
                    id: decl.id.clone(),
                }
                .into());
            }
        }

        Ok(Declarations { items: self.items })
    }
}
