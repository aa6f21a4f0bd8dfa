//! LDAPv3 implementation of [`DirectoryApi`].

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Mod, SearchEntry};
use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashSet;
use std::time::Duration;

use super::api::{Attribute, DirectoryApi, DirectoryEntry, SearchRequest};
use super::error::DirectoryError;

/// Directory client that opens a fresh, bound connection for every call.
pub struct LdapDirectory {
    url: String,
    bind_dn: String,
    bind_password: SecretString,
    connect_timeout: Duration,
}

impl LdapDirectory {
    pub fn new(
        url: impl Into<String>,
        bind_dn: impl Into<String>,
        bind_password: SecretString,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            bind_dn: bind_dn.into(),
            bind_password,
            connect_timeout,
        }
    }

    async fn bind(&self) -> Result<Ldap, DirectoryError> {
        debug!("Connecting to LDAP server at {}", self.url);
        let settings = LdapConnSettings::new().set_conn_timeout(self.connect_timeout);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.url).await?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection driver error: {}", e);
            }
        });

        let result = ldap
            .simple_bind(&self.bind_dn, self.bind_password.expose_secret())
            .await?;
        if result.rc != 0 {
            self.unbind(ldap).await;
            return Err(DirectoryError::BindFailed {
                bind_dn: self.bind_dn.clone(),
                message: format!("code {}: {}", result.rc, result.text),
            });
        }

        Ok(ldap)
    }

    async fn unbind(&self, mut ldap: Ldap) {
        if let Err(e) = ldap.unbind().await {
            debug!("LDAP unbind failed: {}", e);
        }
    }
}

fn value_set(values: &[String]) -> HashSet<&str> {
    values.iter().map(String::as_str).collect()
}

#[async_trait]
impl DirectoryApi for LdapDirectory {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let mut ldap = self.bind().await?;
        debug!(
            "Searching '{}' with filter '{}'",
            request.base, request.filter
        );

        let outcome = ldap
            .search(
                &request.base,
                request.scope.into(),
                &request.filter,
                &request.attributes,
            )
            .await
            .and_then(|result| result.success());
        self.unbind(ldap).await;

        let (entries, _) = outcome.map_err(DirectoryError::from_ldap)?;
        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|entry| DirectoryEntry {
                dn: entry.dn,
                attributes: entry.attrs.into_iter().collect(),
            })
            .collect())
    }

    async fn add(&self, dn: &str, attributes: &[Attribute]) -> Result<(), DirectoryError> {
        let mut ldap = self.bind().await?;
        debug!("Adding entry '{}'", dn);

        let attrs: Vec<(&str, HashSet<&str>)> = attributes
            .iter()
            .map(|(name, values)| (name.as_str(), value_set(values)))
            .collect();
        let outcome = ldap.add(dn, attrs).await.and_then(|r| r.success());
        self.unbind(ldap).await;

        outcome.map_err(DirectoryError::from_ldap)?;
        Ok(())
    }

    async fn modify(&self, dn: &str, replacements: &[Attribute]) -> Result<(), DirectoryError> {
        let mut ldap = self.bind().await?;
        debug!("Modifying entry '{}'", dn);

        let mods: Vec<Mod<&str>> = replacements
            .iter()
            .map(|(name, values)| Mod::Replace(name.as_str(), value_set(values)))
            .collect();
        let outcome = ldap.modify(dn, mods).await.and_then(|r| r.success());
        self.unbind(ldap).await;

        outcome.map_err(DirectoryError::from_ldap)?;
        Ok(())
    }

    async fn delete(&self, dn: &str) -> Result<(), DirectoryError> {
        let mut ldap = self.bind().await?;
        debug!("Deleting entry '{}'", dn);

        let outcome = ldap.delete(dn).await.and_then(|r| r.success());
        self.unbind(ldap).await;

        outcome.map_err(DirectoryError::from_ldap)?;
        Ok(())
    }
}

impl std::fmt::Debug for LdapDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDirectory")
            .field("url", &self.url)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &"[REDACTED]")
            .finish()
    }
}
