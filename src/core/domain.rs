use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_BORROWER_AGE: i64 = 18;
pub const DEFAULT_LENDING_CITY: &str = "Montreuil";

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}

// Configuration abstracts config options for the lending branch
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub min_borrower_age: i64,
    pub lending_city: String,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            min_borrower_age: DEFAULT_MIN_BORROWER_AGE,
            lending_city: DEFAULT_LENDING_CITY.to_string(),
        }
    }

    // from_env overrides defaults with LENDING_BRANCH, LENDING_MIN_BORROWER_AGE
    // and LENDING_CITY when they are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String> {
        let branch = lookup("LENDING_BRANCH").unwrap_or_else(|| "main".to_string());
        let mut config = Configuration::new(branch.as_str());
        if let Some(age) = lookup("LENDING_MIN_BORROWER_AGE").and_then(|s| s.trim().parse::<i64>().ok()) {
            config.min_borrower_age = age;
        }
        if let Some(city) = lookup("LENDING_CITY") {
            if !city.trim().is_empty() {
                config.lending_city = city.trim().to_string();
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::domain::Configuration;

    #[tokio::test]
    async fn test_should_build_config() {
        let config = Configuration::new("test");
        assert_eq!("test", config.branch_id.as_str());
        assert_eq!(18, config.min_borrower_age);
        assert_eq!("Montreuil", config.lending_city.as_str());
    }

    #[tokio::test]
    async fn test_should_override_config_from_lookup() {
        let vars = HashMap::from([
            ("LENDING_BRANCH", "east"),
            ("LENDING_MIN_BORROWER_AGE", " 21 "),
            ("LENDING_CITY", "Vincennes"),
        ]);
        let config = Configuration::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!("east", config.branch_id.as_str());
        assert_eq!(21, config.min_borrower_age);
        assert_eq!("Vincennes", config.lending_city.as_str());
    }

    #[tokio::test]
    async fn test_should_ignore_malformed_overrides() {
        let vars = HashMap::from([
            ("LENDING_MIN_BORROWER_AGE", "adult"),
            ("LENDING_CITY", "  "),
        ]);
        let config = Configuration::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!("main", config.branch_id.as_str());
        assert_eq!(18, config.min_borrower_age);
        assert_eq!("Montreuil", config.lending_city.as_str());
    }
}
