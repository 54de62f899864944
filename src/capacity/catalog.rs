//! Upgrade reference table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{CapacityError, Upgrade};

/// Static table of upgrade definitions keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Upgrade>", into = "Vec<Upgrade>")]
pub struct UpgradeCatalog {
    upgrades: BTreeMap<String, Upgrade>,
}

impl UpgradeCatalog {
    /// Build a catalog, rejecting duplicate names
    pub fn from_upgrades(upgrades: Vec<Upgrade>) -> Result<Self, CapacityError> {
        let mut table = BTreeMap::new();
        for upgrade in upgrades {
            if table.contains_key(&upgrade.name) {
                return Err(CapacityError::DuplicateCatalogEntry(upgrade.name));
            }
            table.insert(upgrade.name.clone(), upgrade);
        }
        Ok(Self { upgrades: table })
    }

    pub fn get(&self, name: &str) -> Option<&Upgrade> {
        self.upgrades.get(name)
    }

    /// Look up an upgrade, failing with `UnknownUpgrade`
    pub fn require(&self, name: &str) -> Result<&Upgrade, CapacityError> {
        self.get(name)
            .ok_or_else(|| CapacityError::UnknownUpgrade(name.to_string()))
    }

    /// All upgrades of a category, in name order
    pub fn by_category(&self, category: &str) -> Vec<&Upgrade> {
        self.upgrades
            .values()
            .filter(|u| u.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Distinct categories, sorted
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.upgrades.values().map(|u| u.category.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    pub fn iter(&self) -> impl Iterator<Item = &Upgrade> {
        self.upgrades.values()
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }
}

impl TryFrom<Vec<Upgrade>> for UpgradeCatalog {
    type Error = CapacityError;

    fn try_from(upgrades: Vec<Upgrade>) -> Result<Self, Self::Error> {
        Self::from_upgrades(upgrades)
    }
}

impl From<UpgradeCatalog> for Vec<Upgrade> {
    fn from(catalog: UpgradeCatalog) -> Self {
        catalog.upgrades.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UpgradeCatalog {
        UpgradeCatalog::from_upgrades(vec![
            Upgrade::new("Prospecting Array 1", 500, 4000, "Mining"),
            Upgrade::new("Major Threat 1", 600, 5000, "Ratting"),
            Upgrade::new("Power Monitoring Division 1", -200, 2500, "Capacity"),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let catalog = sample();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.require("Major Threat 1").unwrap().power, 600);
        assert_eq!(
            catalog.require("Nope").unwrap_err(),
            CapacityError::UnknownUpgrade("Nope".to_string())
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = UpgradeCatalog::from_upgrades(vec![
            Upgrade::new("A", 1, 1, "Mining"),
            Upgrade::new("A", 2, 2, "Mining"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            CapacityError::DuplicateCatalogEntry("A".to_string())
        );
    }

    #[test]
    fn test_by_category_is_case_insensitive() {
        let catalog = sample();
        let mining = catalog.by_category("mining");
        assert_eq!(mining.len(), 1);
        assert_eq!(mining[0].name, "Prospecting Array 1");
        assert_eq!(catalog.categories(), vec!["Capacity", "Mining", "Ratting"]);
    }

    #[test]
    fn test_yaml_list_parsing() {
        let yaml = r#"
- name: "Prospecting Array 1"
  power: 500
  workforce: 4000
  category: Mining
- name: "Power Monitoring Division 3"
  power: -1000
  workforce: 4500
  category: Capacity
  description: "Adds power"
"#;
        let catalog: UpgradeCatalog = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("Power Monitoring Division 3").unwrap().power, -1000);

        let duplicate = "- {name: A, power: 1, workforce: 1, category: X}\n- {name: A, power: 1, workforce: 1, category: X}\n";
        assert!(serde_yaml::from_str::<UpgradeCatalog>(duplicate).is_err());
    }
}
