use crate::capacity::UpgradeCatalog;
use crate::config::PlanConfig;
use crate::region::RegionSpec;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::{info, warn};
use std::fs::File;
use std::path::Path;

/// Load and parse planning configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<PlanConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration {}", config_path.display()))?;
    let config: PlanConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration {}", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Load region data (systems, gates, standing bridges) from a YAML file
pub fn load_region(region_path: &Path) -> Result<RegionSpec> {
    info!("Loading region from: {:?}", region_path);

    let file = File::open(region_path)
        .wrap_err_with(|| format!("Failed to open region file {}", region_path.display()))?;
    let spec: RegionSpec = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse region file {}", region_path.display()))?;

    if spec.systems.is_empty() {
        return Err(eyre!("Region file {} contains no systems", region_path.display()));
    }
    if spec.gates.is_empty() && spec.systems.len() > 1 {
        warn!("Region {} has no gates; every system is isolated", region_path.display());
    }

    info!(
        "Loaded {} systems, {} gates, {} bridges",
        spec.systems.len(),
        spec.gates.len(),
        spec.bridges.len()
    );
    Ok(spec)
}

/// Load the upgrade reference table from a YAML list
pub fn load_catalog(catalog_path: &Path) -> Result<UpgradeCatalog> {
    info!("Loading upgrade catalog from: {:?}", catalog_path);

    let file = File::open(catalog_path)
        .wrap_err_with(|| format!("Failed to open upgrade catalog {}", catalog_path.display()))?;
    let catalog: UpgradeCatalog = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse upgrade catalog {}", catalog_path.display()))?;

    info!(
        "Loaded {} upgrades in {} categories",
        catalog.len(),
        catalog.categories().len()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_region() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
name: Test
systems:
  - name: A
    constellation: C1
    security: -0.2
    position: {{x: 0.0, y: 0.0, z: 0.0}}
    power: 2500
    workforce: 18000
  - name: B
    constellation: C1
    security: -0.4
    position: {{x: 9.461e15, y: 0.0, z: 0.0}}
    has_ice: true
gates:
  - [A, B]
"#
        )
        .unwrap();

        let spec = load_region(file.path()).unwrap();
        assert_eq!(spec.systems.len(), 2);
        assert!(spec.systems[1].has_ice);
        assert_eq!(spec.systems[1].power, 0);
        assert_eq!(spec.gates, vec![("A".to_string(), "B".to_string())]);
    }

    #[test]
    fn test_load_region_without_systems_fails() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "systems: []\n").unwrap();
        assert!(load_region(file.path()).is_err());
    }

    #[test]
    fn test_load_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
- name: "Prospecting Array 1"
  power: 500
  workforce: 4000
  category: Mining
- name: "Power Monitoring Division 1"
  power: -200
  workforce: 2500
  category: Capacity
"#
        )
        .unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.categories(), vec!["Capacity", "Mining"]);
    }

    #[test]
    fn test_load_config_validates() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "distribution:\n  band_min: 4\n  band_max: 1\n").unwrap();
        assert!(load_config(file.path()).is_err());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "general:\n  staging: A\n").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.general.staging.as_deref(), Some("A"));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Path::new("/nonexistent/plan.yaml")).is_err());
    }
}
