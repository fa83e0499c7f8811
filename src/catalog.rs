//! Demo account catalog and metric glossary
//!
//! Accounts arrive fully formed from an upstream data source; this crate
//! ships a hand-authored fixture set (three accounts, twenty observations
//! each) embedded at compile time. Sessions clone accounts out of the
//! catalog, so override mutations never leak back into it.

use crate::error::{KairosError, Result};
use crate::types::Account;
use serde::Deserialize;
use std::collections::BTreeMap;

const FIXTURE_JSON: &str = include_str!("../fixtures/accounts.json");

#[derive(Debug, Deserialize)]
struct FixtureFile {
    glossary: BTreeMap<String, String>,
    accounts: Vec<Account>,
}

/// Read-only catalog of accounts plus the metric definition glossary
#[derive(Debug, Clone)]
pub struct AccountCatalog {
    glossary: BTreeMap<String, String>,
    accounts: Vec<Account>,
}

impl AccountCatalog {
    /// Load the embedded demo fixture set
    pub fn embedded() -> Result<Self> {
        Self::from_json(FIXTURE_JSON)
    }

    /// Load a catalog from a JSON file on disk (same shape as the embedded
    /// set); supports swapping in a custom account set without rebuilding
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a catalog from a JSON document (same shape as the embedded set)
    pub fn from_json(json: &str) -> Result<Self> {
        let file: FixtureFile = serde_json::from_str(json)?;
        Ok(Self {
            glossary: file.glossary,
            accounts: file.accounts,
        })
    }

    /// Build a catalog from already-constructed accounts (used in tests)
    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        Self {
            glossary: BTreeMap::new(),
            accounts,
        }
    }

    /// All accounts, in catalog order
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Look up an account by id
    pub fn get(&self, id: &str) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| KairosError::NotFound(id.to_string()))
    }

    /// Definition text for a metric display name, if the glossary has one
    pub fn metric_definition(&self, metric: &str) -> Option<&str> {
        self.glossary.get(metric).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QuestionId, RelevanceTier};

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = AccountCatalog::embedded().unwrap();
        assert_eq!(catalog.accounts().len(), 3);
        for account in catalog.accounts() {
            assert_eq!(account.observations.len(), 20);
            for q in QuestionId::CATALOG {
                assert!(account.briefs.contains_key(&q), "missing {} brief", q);
            }
        }
    }

    #[test]
    fn test_unknown_account_is_not_found() {
        let catalog = AccountCatalog::embedded().unwrap();
        let err = catalog.get("summit").unwrap_err();
        assert!(matches!(err, KairosError::NotFound(_)));
    }

    #[test]
    fn test_signal_and_insight_key_sets_match() {
        let catalog = AccountCatalog::embedded().unwrap();
        for account in catalog.accounts() {
            for obs in &account.observations {
                let signal_keys: Vec<_> = obs.signals.keys().collect();
                let insight_keys: Vec<_> = obs.insights.keys().collect();
                assert_eq!(signal_keys, insight_keys, "{}: {}", account.id, obs.metric);
            }
        }
    }

    #[test]
    fn test_metric_names_unique_and_in_glossary() {
        let catalog = AccountCatalog::embedded().unwrap();
        for account in catalog.accounts() {
            let mut seen = std::collections::BTreeSet::new();
            for obs in &account.observations {
                assert!(seen.insert(&obs.metric), "duplicate metric {}", obs.metric);
                assert!(
                    catalog.metric_definition(&obs.metric).is_some(),
                    "no glossary entry for {}",
                    obs.metric
                );
            }
        }
    }

    #[test]
    fn test_from_path_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("accounts.json");
        std::fs::write(&path, FIXTURE_JSON).unwrap();

        let catalog = AccountCatalog::from_path(&path).unwrap();
        assert_eq!(catalog.accounts().len(), 3);
        assert!(catalog.get("pinnacle").is_ok());
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AccountCatalog::from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, KairosError::Io(_)));
    }

    #[test]
    fn test_pinnacle_churn_tiers() {
        let catalog = AccountCatalog::embedded().unwrap();
        let pinnacle = catalog.get("pinnacle").unwrap();
        let high = pinnacle
            .observations
            .iter()
            .filter(|o| o.signals.get(&QuestionId::Churn) == Some(&RelevanceTier::High))
            .count();
        assert_eq!(high, 8);
    }
}
