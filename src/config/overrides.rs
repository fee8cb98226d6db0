use super::loader::ConfigLoader;
use crate::billing::{RawTierRow, TierTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Admin price override for one module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceOverride {
    /// Replaces the module's flat unit price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_unit_price: Option<f64>,
    /// Replaces the module's tier rows wholesale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<RawTierRow>>,
    /// Override source ("manual", "cli", ...)
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl PriceOverride {
    pub fn new(source: String, notes: Option<String>) -> Self {
        Self {
            flat_unit_price: None,
            tiers: None,
            source,
            created_at: Utc::now(),
            notes,
        }
    }
}

#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("Flat price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
    #[error("Invalid assignment '{0}', expected MODULE=VALUE")]
    InvalidAssignment(String),
    #[error("Invalid tier rows: {0}")]
    InvalidTiers(#[from] crate::billing::PricingError),
    #[error("Failed to access overrides file: {0}")]
    FileAccess(#[from] std::io::Error),
    #[error("Overrides file is corrupted: {0}")]
    CorruptedConfig(String),
}

impl From<serde_json::Error> for OverrideError {
    fn from(error: serde_json::Error) -> Self {
        OverrideError::CorruptedConfig(format!("JSON error: {}", error))
    }
}

/// Persists per-module admin overrides as JSON
pub struct OverrideManager {
    config_path: PathBuf,
    overrides: BTreeMap<String, PriceOverride>,
    /// Set when the file on disk could not be read; blocks writes over it
    load_failure: Option<String>,
}

impl OverrideManager {
    /// Create a manager backed by the default overrides file
    pub fn new() -> Self {
        Self::with_path(ConfigLoader::get_config_dir().join("overrides.json"))
    }

    /// Create a manager with a custom file path
    pub fn with_path(config_path: PathBuf) -> Self {
        Self {
            config_path,
            overrides: BTreeMap::new(),
            load_failure: None,
        }
    }

    /// Load overrides from file; a missing or empty file means no overrides.
    ///
    /// After a failed load the manager refuses to write, so existing entries
    /// are never replaced by a partial set.
    pub fn load(&mut self) -> Result<(), OverrideError> {
        self.load_failure = None;
        if !self.config_path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            self.load_failure = Some(e.to_string());
            OverrideError::FileAccess(e)
        })?;
        if content.trim().is_empty() {
            return Ok(());
        }

        self.overrides = serde_json::from_str(&content).map_err(|e| {
            let message = format!("JSON parsing failed: {}", e);
            self.load_failure = Some(message.clone());
            OverrideError::CorruptedConfig(message)
        })?;
        debug!(
            "Loaded {} overrides from {}",
            self.overrides.len(),
            self.config_path.display()
        );

        Ok(())
    }

    pub fn save(&self) -> Result<(), OverrideError> {
        if let Some(failure) = &self.load_failure {
            return Err(OverrideError::CorruptedConfig(format!(
                "refusing to overwrite {}: {}",
                self.config_path.display(),
                failure
            )));
        }

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.overrides)?;
        fs::write(&self.config_path, content)?;

        Ok(())
    }

    pub fn set_flat_price(
        &mut self,
        module: &str,
        price: f64,
        source: String,
        notes: Option<String>,
    ) -> Result<(), OverrideError> {
        if !price.is_finite() || price < 0.0 {
            return Err(OverrideError::InvalidPrice(price));
        }
        self.ensure_writable()?;

        let entry = self.entry(module, source, notes);
        entry.flat_unit_price = Some(price);
        self.save()
    }

    /// Replace a module's tier rows. Rows must build into a valid table.
    pub fn set_tiers(
        &mut self,
        module: &str,
        rows: Vec<RawTierRow>,
        source: String,
        notes: Option<String>,
    ) -> Result<(), OverrideError> {
        TierTable::build(&rows)?;
        self.ensure_writable()?;

        let entry = self.entry(module, source, notes);
        entry.tiers = Some(rows);
        self.save()
    }

    fn ensure_writable(&self) -> Result<(), OverrideError> {
        match &self.load_failure {
            Some(failure) => Err(OverrideError::CorruptedConfig(failure.clone())),
            None => Ok(()),
        }
    }

    fn entry(&mut self, module: &str, source: String, notes: Option<String>) -> &mut PriceOverride {
        let entry = self
            .overrides
            .entry(module.trim().to_string())
            .or_insert_with(|| PriceOverride::new(source.clone(), notes.clone()));
        entry.source = source;
        entry.created_at = Utc::now();
        if notes.is_some() {
            entry.notes = notes;
        }
        entry
    }

    pub fn get(&self, module: &str) -> Option<&PriceOverride> {
        self.overrides.get(module)
    }

    /// Remove a module's override; returns whether one existed
    pub fn clear(&mut self, module: &str) -> Result<bool, OverrideError> {
        self.ensure_writable()?;
        let removed = self.overrides.remove(module.trim()).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    pub fn module_names(&self) -> Vec<String> {
        self.overrides.keys().cloned().collect()
    }

    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

impl Default for OverrideManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a `MODULE=VALUE` assignment as given on the command line
pub fn parse_assignment(input: &str) -> Result<(String, f64), OverrideError> {
    let (module, value) = input
        .rsplit_once('=')
        .ok_or_else(|| OverrideError::InvalidAssignment(input.to_string()))?;

    let module = module.trim();
    if module.is_empty() {
        return Err(OverrideError::InvalidAssignment(input.to_string()));
    }

    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| OverrideError::InvalidAssignment(input.to_string()))?;

    Ok((module.to_string(), value))
}

/// Parse a `MODULE=THRESHOLD:PRICE,...` tier assignment
pub fn parse_tier_assignment(input: &str) -> Result<(String, Vec<RawTierRow>), OverrideError> {
    let invalid = || OverrideError::InvalidAssignment(input.to_string());

    let (module, rows) = input.rsplit_once('=').ok_or_else(invalid)?;
    let module = module.trim();
    if module.is_empty() {
        return Err(invalid());
    }

    let rows = rows
        .split(',')
        .map(|row| {
            let (threshold, price) = row.rsplit_once(':').ok_or_else(invalid)?;
            Ok(RawTierRow::new(threshold.trim(), price.trim()))
        })
        .collect::<Result<Vec<_>, OverrideError>>()?;

    Ok((module.to_string(), rows))
}
