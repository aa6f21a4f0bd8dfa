//! Directory-service integration (LDAP).
//!
//! - [`DirectoryApi`]: the remote operations, implemented by [`LdapDirectory`]
//! - [`DirectoryGroupSync`]: converges or removes one group, comparing
//!   description and members attribute by attribute

pub mod api;
pub mod client;
pub mod error;
pub mod escape;
pub mod schema;
pub mod sync;

pub use api::{Attribute, DirectoryApi, DirectoryEntry, SearchRequest, SearchScope};
pub use client::LdapDirectory;
pub use error::{DirectoryError, GroupSyncError};
pub use schema::{DirectorySchema, GroupSearch, NAME_PLACEHOLDER};
pub use sync::{same_members, DirectoryGroupSync, GroupOutcome};
