use std::fmt::{self, Debug, Formatter};

use sec::Secret;

use crate::declaration::RepositoryDeclaration;
use crate::errors::MissingCredential;
use crate::properties::PropertySource;

/// A repository with its credentials fully resolved, ready to be registered.
pub struct RepositoryRegistration {
    pub id: String,
    pub url: String,
    pub username: String,
    pub password: Secret<String>,
}

impl Debug for RepositoryRegistration {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("RepositoryRegistration")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("username", &self.username)
            .finish()
    }
}

/// Resolve the credentials for every declared repository.
///
/// Credentials are read from `source` under the `<id>Username` and
/// `<id>Password` keys. Declarations are processed in order and resolution
/// stops at the first missing (or empty) property, in which case no
/// registrations are returned at all.
pub fn resolve<'a, D, S>(
    declarations: D,
    source: &S,
) -> Result<Vec<RepositoryRegistration>, MissingCredential>
where
    D: IntoIterator<Item = &'a RepositoryDeclaration>,
    S: PropertySource + ?Sized,
{
    let mut registrations = Vec::new();

    for decl in declarations {
        trace!("Resolving credentials for {} ({})", decl.id, decl.url);

        let username = required_property(source, decl.username_key())?;
        let password = required_property(source, decl.password_key())?;

        registrations.push(RepositoryRegistration {
            id: decl.id.clone(),
            url: decl.url.clone(),
            username,
            password: Secret::new(password),
        });
    }

    debug!("Resolved credentials for {} repositories", registrations.len());
    Ok(registrations)
}

fn required_property<S>(source: &S, key: String) -> Result<String, MissingCredential>
where
    S: PropertySource + ?Sized,
{
    match source.property(&key) {
        Some(ref value) if value.is_empty() => {
            debug!("The \"{}\" property is empty", key);
            Err(MissingCredential { key })
        }
        Some(value) => Ok(value),
        None => Err(MissingCredential { key }),
    }
}
