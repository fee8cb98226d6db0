use super::defaults::category_for;
use super::error::ConfigError;
use super::overrides::OverrideManager;
use super::types::PricingConfig;
use crate::billing::{ModuleDefinition, PricingSnapshot, PricingType, TierTable};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<PricingConfig, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut config: PricingConfig = toml::from_str(&content)?;
        config.normalize()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Get the configuration directory (~/.config/tiercalc/)
    pub fn get_config_dir() -> PathBuf {
        if let Some(dir) = dirs::config_dir() {
            dir.join("tiercalc")
        } else {
            PathBuf::from(".tiercalc")
        }
    }
}

impl PricingConfig {
    /// Load configuration from `TIERCALC_CONFIG` or the default location
    pub fn load() -> Result<PricingConfig, ConfigError> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            debug!("No configuration at {}, using defaults", config_path.display());
            let mut config = PricingConfig::default();
            config.apply_env_overrides();
            return Ok(config);
        }

        debug!("Loading configuration from {}", config_path.display());
        ConfigLoader::load_from_path(config_path)
    }

    /// Get the config file path (~/.config/tiercalc/pricing.toml)
    pub fn get_config_path() -> PathBuf {
        match std::env::var("TIERCALC_CONFIG") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => ConfigLoader::get_config_dir().join("pricing.toml"),
        }
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Create the default configuration file if it does not exist yet
    pub fn init() -> Result<(), ConfigError> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            PricingConfig::default().save_to(&config_path)?;
            println!("Created config at {}", config_path.display());
        } else {
            println!("Config already exists at {}", config_path.display());
        }

        Ok(())
    }

    /// Trim names, rejecting blank and duplicate ones
    fn normalize(&mut self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for module in &mut self.modules {
            let trimmed = module.name.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid("Module with blank name".to_string()));
            }
            if !seen.insert(trimmed.to_string()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate module name: {}",
                    trimmed
                )));
            }
            module.name = trimmed.to_string();
        }

        for entry in &mut self.tiers {
            entry.module = entry.module.trim().to_string();
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(currency) = std::env::var("TIERCALC_CURRENCY") {
            if !currency.trim().is_empty() {
                self.currency = currency.trim().to_string();
            }
        }
    }

    /// Validate configuration, returning data-quality warnings on success
    pub fn check(&self) -> Result<Vec<String>, ConfigError> {
        if self.modules.is_empty() {
            return Err(ConfigError::Invalid("No modules configured".to_string()));
        }

        let mut warnings = Vec::new();

        // Validate module names are unique
        let mut seen = HashSet::new();
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err(ConfigError::Invalid("Module with blank name".to_string()));
            }
            if !seen.insert(module.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate module name: {}",
                    module.name
                )));
            }
            if let PricingType::Unknown(raw) = &module.pricing_type {
                return Err(ConfigError::Invalid(format!(
                    "Module '{}' has unknown pricing type '{}'",
                    module.name, raw
                )));
            }
        }

        for entry in &self.tiers {
            if !seen.contains(entry.module.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Tier row refers to unknown module: {}",
                    entry.module
                )));
            }
        }

        let grouped = self.tier_rows();
        for module in &self.modules {
            let rows = grouped.get(&module.name).map(Vec::as_slice).unwrap_or(&[]);
            match module.pricing_type {
                PricingType::Tiered => {
                    let table =
                        TierTable::build(rows).map_err(|source| ConfigError::Pricing {
                            module: module.name.clone(),
                            source,
                        })?;
                    if table.is_empty() {
                        warnings.push(format!(
                            "Tiered module '{}' has no tier rows and will cost nothing",
                            module.name
                        ));
                    }
                    if table.duplicate_sentinels() > 0 {
                        warnings.push(format!(
                            "Tiered module '{}' has {} extra open-ended rows; the first one is used",
                            module.name,
                            table.duplicate_sentinels()
                        ));
                    }
                }
                _ => {
                    if !rows.is_empty() {
                        warnings.push(format!(
                            "Tier rows for non-tiered module '{}' are ignored",
                            module.name
                        ));
                    }
                }
            }
        }

        for name in self.usage.keys() {
            if !seen.contains(name.as_str()) {
                warnings.push(format!("Usage given for unknown module '{}'", name));
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(warnings)
    }

    /// Look up a module that must be priced with `expected`
    pub fn module_with_type(
        &self,
        name: &str,
        expected: &PricingType,
    ) -> Result<&ModuleDefinition, ConfigError> {
        match self.module(name) {
            Some(module) if &module.pricing_type == expected => Ok(module),
            Some(_) => Err(ConfigError::Invalid(format!(
                "Module '{}' does not use {} pricing",
                name, expected
            ))),
            None => Err(ConfigError::Invalid(format!("Unknown module '{}'", name))),
        }
    }

    /// Print configuration as TOML
    pub fn print(&self) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        println!("{}", content);
        Ok(())
    }

    /// Freeze the configuration, with admin overrides applied, for one computation
    pub fn snapshot(&self, overrides: Option<&OverrideManager>) -> PricingSnapshot {
        let mut tiers = self.tier_rows();

        let modules = self
            .modules
            .iter()
            .map(|module| {
                let mut module = module.clone();
                if module.category.is_none() {
                    module.category = Some(category_for(&module.name).to_string());
                }

                if let Some(price_override) = overrides.and_then(|o| o.get(&module.name)) {
                    if let Some(price) = price_override.flat_unit_price {
                        module.flat_unit_price = Some(price);
                    }
                    if let Some(rows) = &price_override.tiers {
                        tiers.insert(module.name.clone(), rows.clone());
                    }
                }

                module
            })
            .collect();

        if let Some(overrides) = overrides {
            for name in overrides.module_names() {
                if self.module(&name).is_none() {
                    warn!("Ignoring override for unknown module '{}'", name);
                }
            }
        }

        PricingSnapshot {
            modules,
            tiers,
            currency: self.currency.clone(),
        }
    }
}
