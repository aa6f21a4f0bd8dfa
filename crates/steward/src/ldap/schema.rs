//! Fixed attribute names and search settings of the group integration.

use serde::{Deserialize, Serialize};

use super::api::{SearchRequest, SearchScope};
use super::escape::{escape_dn_value, escape_filter_value};

/// Placeholder in the search filter template replaced by the group name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Object class and attribute names used for managed groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySchema {
    #[serde(default = "default_object_class")]
    pub object_class: String,

    #[serde(default = "default_description_attribute")]
    pub description_attribute: String,

    #[serde(default = "default_member_attribute")]
    pub member_attribute: String,
}

fn default_object_class() -> String {
    "groupOfUniqueNames".to_string()
}

fn default_description_attribute() -> String {
    "description".to_string()
}

fn default_member_attribute() -> String {
    "uniqueMember".to_string()
}

impl Default for DirectorySchema {
    fn default() -> Self {
        Self {
            object_class: default_object_class(),
            description_attribute: default_description_attribute(),
            member_attribute: default_member_attribute(),
        }
    }
}

/// Where and how groups are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSearch {
    pub base: String,
    pub scope: SearchScope,
    /// Filter template containing [`NAME_PLACEHOLDER`].
    pub filter: String,
    /// RDN attribute of group entries, e.g. `cn`.
    pub name_property: String,
    /// Attributes requested by the search. Empty means the schema's
    /// description and member attributes.
    pub attributes: Vec<String>,
}

impl GroupSearch {
    /// DN of the group called `name`.
    pub fn group_dn(&self, name: &str) -> String {
        format!(
            "{}={},{}",
            self.name_property,
            escape_dn_value(name),
            self.base
        )
    }

    /// The search that finds the group called `name`.
    pub fn request(&self, name: &str, schema: &DirectorySchema) -> SearchRequest {
        let attributes = if self.attributes.is_empty() {
            vec![
                schema.description_attribute.clone(),
                schema.member_attribute.clone(),
            ]
        } else {
            self.attributes.clone()
        };

        SearchRequest {
            base: self.base.clone(),
            scope: self.scope,
            filter: self
                .filter
                .replace(NAME_PLACEHOLDER, &escape_filter_value(name)),
            attributes,
        }
    }
}
