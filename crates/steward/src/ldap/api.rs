//! The directory operations the controller relies on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::DirectoryError;

/// Search scope relative to the search base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchScope {
    #[serde(rename = "base")]
    Base,
    #[default]
    #[serde(rename = "single")]
    SingleLevel,
    #[serde(rename = "sub")]
    Subtree,
}

impl From<SearchScope> for ldap3::Scope {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::Base => ldap3::Scope::Base,
            SearchScope::SingleLevel => ldap3::Scope::OneLevel,
            SearchScope::Subtree => ldap3::Scope::Subtree,
        }
    }
}

/// A fully-formed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base: String,
    pub scope: SearchScope,
    pub filter: String,
    pub attributes: Vec<String>,
}

/// A search result entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attributes: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.attributes.insert(name.into(), values);
        self
    }

    /// All values of `name`. Attribute names match case-insensitively.
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// The first value of `name`, or an empty string.
    pub fn first(&self, name: &str) -> &str {
        self.values(name).first().map(String::as_str).unwrap_or("")
    }
}

/// One attribute with all of its values.
pub type Attribute = (String, Vec<String>);

/// Directory operations. Each call is a self-contained bind/operate/unbind.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<DirectoryEntry>, DirectoryError>;

    async fn add(&self, dn: &str, attributes: &[Attribute]) -> Result<(), DirectoryError>;

    /// Replaces every listed attribute with the given values.
    async fn modify(&self, dn: &str, replacements: &[Attribute]) -> Result<(), DirectoryError>;

    async fn delete(&self, dn: &str) -> Result<(), DirectoryError>;
}
