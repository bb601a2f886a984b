//! # Domain Table Builder
//!
//! Turns an ordered domain selection into the flat row list of the career
//! prescription table, plus the number of rows each domain occupies. The
//! renderer uses that count as the vertical span of the domain's label cell.
//!
//! Rows are domain-major: selection order first, then the catalog's own role
//! order, which is curated (primary role before secondary) and never
//! re-sorted.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::model::{DomainCatalog, RoleRecord};

/// How to treat a selected domain that the catalog does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DomainValidation {
    /// Skip it and log a warning.
    #[default]
    Lenient,
    /// Reject the whole selection.
    Strict,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("unknown domain '{0}'")]
    UnknownDomain(String),
}

/// Rows of the career table and the span of each domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableAssembly {
    pub rows: Vec<RoleRecord>,
    pub span_map: BTreeMap<String, usize>,
}

impl TableAssembly {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row span of a domain's label cell. Domains that contributed nothing
    /// report 0.
    pub fn span(&self, domain: &str) -> usize {
        self.span_map.get(domain).copied().unwrap_or(0)
    }
}

/// Build the table with lenient handling of unknown domains.
pub fn build(selected_domains: &[String], catalog: &DomainCatalog) -> TableAssembly {
    let mut assembly = TableAssembly::default();
    for domain in selected_domains {
        if assembly.span_map.contains_key(domain) {
            warn!(domain = %domain, "domain selected more than once, keeping first occurrence");
            continue;
        }
        match catalog.get(domain) {
            Some(records) => {
                assembly.span_map.insert(domain.clone(), records.len());
                assembly.rows.extend_from_slice(records);
            }
            None => {
                warn!(domain = %domain, "selected domain is not in the catalog, skipping");
            }
        }
    }
    assembly
}

/// Build the table, rejecting unknown domains when `mode` is strict.
pub fn build_checked(
    selected_domains: &[String],
    catalog: &DomainCatalog,
    mode: DomainValidation,
) -> Result<TableAssembly, BuildError> {
    if mode == DomainValidation::Strict {
        if let Some(unknown) = selected_domains.iter().find(|d| !catalog.contains(d)) {
            return Err(BuildError::UnknownDomain(unknown.clone()));
        }
    }
    Ok(build(selected_domains, catalog))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> DomainCatalog {
        DomainCatalog::builtin().unwrap()
    }

    fn sel(domains: &[&str]) -> Vec<String> {
        domains.iter().map(|d| d.to_string()).collect()
    }

    fn titles(assembly: &TableAssembly) -> Vec<&str> {
        assembly.rows.iter().map(|r| r.role_title.as_str()).collect()
    }

    fn assert_invariants(assembly: &TableAssembly) {
        let total: usize = assembly.span_map.values().sum();
        assert_eq!(total, assembly.rows.len());

        // Each domain's rows form one contiguous block.
        let mut seen: Vec<&str> = Vec::new();
        for row in &assembly.rows {
            if seen.last() != Some(&row.domain_label.as_str()) {
                assert!(
                    !seen.contains(&row.domain_label.as_str()),
                    "rows for {} are interleaved",
                    row.domain_label
                );
                seen.push(&row.domain_label);
            }
        }
    }

    #[test]
    fn single_domain() {
        let a = build(&sel(&["Finance"]), &catalog());
        assert_eq!(
            titles(&a),
            vec!["Financial Data Analyst", "Risk & Financial Planning Analyst"]
        );
        assert_eq!(a.span_map, BTreeMap::from([("Finance".to_string(), 2)]));
        assert_invariants(&a);
    }

    #[test]
    fn two_domains_keep_selection_order() {
        let a = build(&sel(&["Finance", "Healthcare"]), &catalog());
        assert_eq!(a.rows.len(), 4);
        assert_eq!(a.rows[0].domain_label, "Finance");
        assert_eq!(a.rows[1].domain_label, "Finance");
        assert_eq!(a.rows[2].domain_label, "Healthcare");
        assert_eq!(a.rows[3].domain_label, "Healthcare");
        assert_eq!(a.span("Finance"), 2);
        assert_eq!(a.span("Healthcare"), 2);
        assert_invariants(&a);

        let reversed = build(&sel(&["Healthcare", "Finance"]), &catalog());
        assert_eq!(reversed.rows.len(), 4);
        assert_eq!(reversed.rows[0].domain_label, "Healthcare");
        assert_eq!(reversed.span_map, a.span_map);
    }

    #[test]
    fn single_role_domain_has_span_one() {
        let a = build(&sel(&["Supply Chain"]), &catalog());
        assert_eq!(titles(&a), vec!["Supply Chain Data Analyst"]);
        assert_eq!(a.span_map, BTreeMap::from([("Supply Chain".to_string(), 1)]));
    }

    #[test]
    fn unknown_domain_is_silently_omitted() {
        // Lenient mode: an unknown name contributes no rows and no span entry,
        // and does not fail.
        let a = build(&sel(&["NotARealDomain"]), &catalog());
        assert!(a.rows.is_empty());
        assert!(a.span_map.is_empty());

        let mixed = build(&sel(&["Retail", "NotARealDomain", "Finance"]), &catalog());
        assert_eq!(mixed.rows.len(), 3);
        assert_eq!(mixed.span_map.len(), 2);
        assert_invariants(&mixed);
    }

    #[test]
    fn empty_selection_gives_empty_assembly() {
        let a = build(&[], &catalog());
        assert!(a.is_empty());
        assert!(a.span_map.is_empty());
    }

    #[test]
    fn building_is_deterministic() {
        let d = sel(&["E-Commerce", "Automobile", "Cyber Security"]);
        assert_eq!(build(&d, &catalog()), build(&d, &catalog()));
    }

    #[test]
    fn row_count_matches_catalog_for_every_pair() {
        let catalog = catalog();
        let names: Vec<String> = catalog.names().map(str::to_string).collect();
        for a in &names {
            for b in &names {
                if a == b {
                    continue;
                }
                let selection = vec![a.clone(), b.clone()];
                let assembly = build(&selection, &catalog);
                let expected = catalog.get(a).unwrap().len() + catalog.get(b).unwrap().len();
                assert_eq!(assembly.rows.len(), expected);
                assert_invariants(&assembly);
            }
        }
    }

    #[test]
    fn repeated_domain_keeps_first_occurrence() {
        let a = build(&sel(&["Finance", "Retail", "Finance"]), &catalog());
        assert_eq!(a.rows.len(), 3);
        assert_eq!(a.span("Finance"), 2);
        assert_invariants(&a);
    }

    #[test]
    fn strict_mode_rejects_unknown_domains() {
        let err = build_checked(&sel(&["Finance", "Fnance"]), &catalog(), DomainValidation::Strict)
            .unwrap_err();
        assert_eq!(err, BuildError::UnknownDomain("Fnance".to_string()));

        let lenient =
            build_checked(&sel(&["Finance", "Fnance"]), &catalog(), DomainValidation::Lenient)
                .unwrap();
        assert_eq!(lenient.rows.len(), 2);
    }

    #[test]
    fn alternate_catalog_can_be_injected() {
        let catalog = DomainCatalog::from_json(
            r#"{"domains":[{"name":"Energy","roles":[
                {"roleTitle":"Grid Analyst"},{"roleTitle":"Trading Analyst"},{"roleTitle":"ESG Analyst"}]}]}"#,
        )
        .unwrap();
        let a = build(&sel(&["Energy", "Finance"]), &catalog);
        assert_eq!(a.span("Energy"), 3);
        assert_eq!(a.span("Finance"), 0);
        assert_eq!(a.rows.len(), 3);
    }
}
