//! # Domain Catalog
//!
//! The static lookup table of career domains and the role records listed
//! under each. The catalog is built once at start-up and handed to the table
//! builder by reference; nothing here is a process-wide singleton, so tests
//! can construct alternate catalogs freely.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The catalog shipped with the binary.
const BUILTIN_CATALOG_JSON: &str = include_str!("../../data/catalog.json");

/// One job-role entry under a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    /// Name of the owning domain. Always equal to the catalog key.
    pub domain_label: String,
    pub role_title: String,
    pub challenge: String,
    pub skills: String,
    pub companies: String,
}

/// A domain with its ordered role records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEntry {
    pub name: String,
    /// Visible label in the table's domain column.
    pub display_name: String,
    pub roles: Vec<RoleRecord>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("domain name must not be empty")]
    EmptyName,
    #[error("domain '{0}' is defined more than once")]
    DuplicateDomain(String),
    #[error("role '{role}' is labeled '{label}' but listed under domain '{domain}'")]
    LabelMismatch {
        domain: String,
        role: String,
        label: String,
    },
}

/// Serialized catalog layout. Role records omit the domain label; it is
/// filled in from the owning domain.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    domains: Vec<DomainFileEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainFileEntry {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    roles: Vec<RoleFileEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleFileEntry {
    role_title: String,
    #[serde(default)]
    challenge: String,
    #[serde(default)]
    skills: String,
    #[serde(default)]
    companies: String,
}

/// Read-only mapping from domain name to its ordered role records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainCatalog {
    domains: Vec<DomainEntry>,
    index: HashMap<String, usize>,
}

impl DomainCatalog {
    /// Build a catalog from explicit entries, checking that every role's
    /// `domain_label` matches its domain and that names are unique.
    pub fn new(domains: Vec<DomainEntry>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(domains.len());
        for (i, entry) in domains.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if index.insert(entry.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateDomain(entry.name.clone()));
            }
            if let Some(role) = entry.roles.iter().find(|r| r.domain_label != entry.name) {
                return Err(CatalogError::LabelMismatch {
                    domain: entry.name.clone(),
                    role: role.role_title.clone(),
                    label: role.domain_label.clone(),
                });
            }
        }
        Ok(Self { domains, index })
    }

    /// Parse a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, crate::CareerDocError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let domains = file
            .domains
            .into_iter()
            .map(|d| {
                let roles = d
                    .roles
                    .into_iter()
                    .map(|r| RoleRecord {
                        domain_label: d.name.clone(),
                        role_title: r.role_title,
                        challenge: r.challenge,
                        skills: r.skills,
                        companies: r.companies,
                    })
                    .collect();
                DomainEntry {
                    display_name: d.display_name.unwrap_or_else(|| d.name.clone()),
                    name: d.name,
                    roles,
                }
            })
            .collect();
        Ok(Self::new(domains)?)
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, crate::CareerDocError> {
        Self::from_json(BUILTIN_CATALOG_JSON)
    }

    /// Role records for a domain, in catalog order.
    pub fn get(&self, domain: &str) -> Option<&[RoleRecord]> {
        self.entry(domain).map(|e| e.roles.as_slice())
    }

    pub fn entry(&self, domain: &str) -> Option<&DomainEntry> {
        self.index.get(domain).map(|&i| &self.domains[i])
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.index.contains_key(domain)
    }

    /// Visible label for a domain, falling back to the name itself.
    pub fn display_name<'a>(&'a self, domain: &'a str) -> &'a str {
        self.entry(domain)
            .map(|e| e.display_name.as_str())
            .unwrap_or(domain)
    }

    /// Domain names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(|d| d.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainEntry> {
        self.domains.iter()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
