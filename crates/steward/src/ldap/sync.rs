//! Create/update/delete of a single directory group.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::api::{Attribute, DirectoryApi, DirectoryEntry};
use super::error::{GroupSyncError, Result};
use super::schema::{DirectorySchema, GroupSearch};

/// Result of converging one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOutcome {
    pub distinguished_name: String,
    pub changed: bool,
}

/// Converges one directory group at a time.
#[derive(Clone)]
pub struct DirectoryGroupSync {
    api: Arc<dyn DirectoryApi>,
    search: GroupSearch,
    schema: DirectorySchema,
}

impl DirectoryGroupSync {
    pub fn new(api: Arc<dyn DirectoryApi>, search: GroupSearch, schema: DirectorySchema) -> Self {
        Self {
            api,
            search,
            schema,
        }
    }

    /// DN of the group called `name`.
    pub fn group_dn(&self, name: &str) -> String {
        self.search.group_dn(name)
    }

    /// Finds the group called `name`; more than one match is an error.
    pub async fn find(&self, name: &str) -> Result<Option<DirectoryEntry>> {
        let request = self.search.request(name, &self.schema);
        let mut entries =
            self.api
                .search(&request)
                .await
                .map_err(|source| GroupSyncError::Search {
                    group: name.to_string(),
                    source,
                })?;

        match entries.len() {
            0 => Ok(None),
            1 => Ok(entries.pop()),
            count => Err(GroupSyncError::Ambiguous {
                group: name.to_string(),
                count,
            }),
        }
    }

    /// Creates the group or brings its description and members in line.
    pub async fn reconcile_group(
        &self,
        name: &str,
        comment: &str,
        subjects: &[String],
    ) -> Result<GroupOutcome> {
        let dn = self.group_dn(name);

        let Some(entry) = self.find(name).await? else {
            let attributes = self.new_entry(comment, subjects);
            self.api
                .add(&dn, &attributes)
                .await
                .map_err(|source| GroupSyncError::Create {
                    dn: dn.clone(),
                    source,
                })?;

            info!(group = name, dn = %dn, members = subjects.len(), "Created group");
            return Ok(GroupOutcome {
                distinguished_name: dn,
                changed: true,
            });
        };

        let description = entry.first(&self.schema.description_attribute);
        let members = entry.values(&self.schema.member_attribute);
        if description == comment && same_members(members, subjects) {
            debug!(group = name, dn = %dn, "Group up to date");
            return Ok(GroupOutcome {
                distinguished_name: dn,
                changed: false,
            });
        }

        let replacements = self.replacements(comment, subjects);
        self.api
            .modify(&dn, &replacements)
            .await
            .map_err(|source| GroupSyncError::Modify {
                dn: dn.clone(),
                source,
            })?;

        info!(group = name, dn = %dn, members = subjects.len(), "Updated group");
        Ok(GroupOutcome {
            distinguished_name: dn,
            changed: true,
        })
    }

    /// Deletes the group called `name`.
    ///
    /// A missing group is reported as [`GroupSyncError::GroupNotFound`].
    pub async fn delete_group(&self, name: &str) -> Result<()> {
        let dn = self.group_dn(name);

        if self.find(name).await?.is_none() {
            return Err(GroupSyncError::GroupNotFound {
                group: name.to_string(),
            });
        }

        self.api
            .delete(&dn)
            .await
            .map_err(|source| GroupSyncError::Delete {
                dn: dn.clone(),
                source,
            })?;

        info!(group = name, dn = %dn, "Deleted group");
        Ok(())
    }

    /// Attributes of a new group. Directory strings cannot be empty, so an
    /// empty comment leaves the description out.
    fn new_entry(&self, comment: &str, subjects: &[String]) -> Vec<Attribute> {
        let mut attributes = vec![(
            "objectClass".to_string(),
            vec![self.schema.object_class.clone()],
        )];
        if !comment.is_empty() {
            attributes.push((
                self.schema.description_attribute.clone(),
                vec![comment.to_string()],
            ));
        }
        attributes.push((self.schema.member_attribute.clone(), subjects.to_vec()));
        attributes
    }

    /// Replacements for an existing group. An empty comment clears the
    /// description with an empty value set.
    fn replacements(&self, comment: &str, subjects: &[String]) -> Vec<Attribute> {
        vec![
            (self.schema.description_attribute.clone(), description_values(comment)),
            (self.schema.member_attribute.clone(), subjects.to_vec()),
        ]
    }
}

fn description_values(comment: &str) -> Vec<String> {
    if comment.is_empty() {
        Vec::new()
    } else {
        vec![comment.to_string()]
    }
}

/// Compares member lists as case-insensitive, unordered sets.
pub fn same_members(current: &[String], declared: &[String]) -> bool {
    normalize(current) == normalize(declared)
}

fn normalize(members: &[String]) -> BTreeSet<String> {
    members.iter().map(|m| m.to_lowercase()).collect()
}
