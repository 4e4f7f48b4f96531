//! Register authenticated remote artifact repositories.
//!
//! Repositories are declared as an ordered list of `(id, url)` pairs. The
//! credentials for each one are looked up from a [`PropertySource`] under
//! the keys `<id>Username` and `<id>Password`, and the fully resolved
//! [`RepositoryRegistration`]s are handed to a [`RepositorySink`].
//!
//! ```rust
//! use repo_auth::{resolve, Declarations};
//! use std::collections::HashMap;
//!
//! let declarations = Declarations::builder()
//!     .repo_with_id("myRepo", "http://localhost")
//!     .build()
//!     .unwrap();
//!
//! let mut props = HashMap::new();
//! props.insert(String::from("myRepoUsername"), String::from("user"));
//! props.insert(String::from("myRepoPassword"), String::from("pass"));
//!
//! let registrations = resolve(&declarations, &props).unwrap();
//! assert_eq!(registrations.len(), 1);
//! assert_eq!(registrations[0].username, "user");
//! ```

extern crate failure;
#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate log;
extern crate sec;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate shellexpand;
extern crate toml;
extern crate unicode_case_mapping;

pub mod config;
pub mod declaration;
mod driver;
pub mod errors;
pub mod properties;
pub mod registry;
mod resolver;

pub use crate::config::Config;
pub use crate::declaration::{derive_id, Declarations, DeclarationsBuilder, RepositoryDeclaration};
pub use crate::driver::{Driver, Task};
pub use crate::errors::MissingCredential;
pub use crate::properties::{Environment, Layered, Properties, PropertySource};
pub use crate::registry::{print_repos, RemoteRepository, RepositoryList, RepositorySink};
pub use crate::resolver::{resolve, RepositoryRegistration};
