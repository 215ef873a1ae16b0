//! Pricing calibration settings.
//!
//! The settings file carries the five constants every pricing run is
//! calibrated with: price segment bounds, distance segment bounds, the
//! reference distance unit, the price charged per unit and the first-band
//! deviation. A run builds them once, validates them, and shares them
//! read-only with every downstream stage.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Price segment upper bounds, strictly increasing.
    pub prices: Vec<f64>,
    /// Distance segment upper bounds in meters, strictly increasing.
    pub distances: Vec<f64>,
    /// Reference distance unit in meters.
    pub default_unit: f64,
    /// Price per reference unit of distance.
    pub default_unit_price: f64,
    /// Discount applied in the nearest distance band, in (0, 1).
    pub deviation: f64,
}

/// Per-invocation replacements for individual settings values.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub prices: Option<Vec<f64>>,
    pub distances: Option<Vec<f64>>,
    pub default_unit: Option<f64>,
    pub default_unit_price: Option<f64>,
    pub deviation: Option<f64>,
}

impl SettingsOverrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_none()
            && self.distances.is_none()
            && self.default_unit.is_none()
            && self.default_unit_price.is_none()
            && self.deviation.is_none()
    }
}

impl PricingSettings {
    /// Check every invariant the ratio table and competitor bands rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_bounds("prices", &self.prices)?;
        validate_bounds("distances", &self.distances)?;

        if !self.default_unit.is_finite() || self.default_unit <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "default_unit must be a positive number, got {}",
                self.default_unit
            )));
        }

        if !self.default_unit_price.is_finite() || self.default_unit_price < 0.0 {
            return Err(ConfigError::Validation(format!(
                "default_unit_price must be a non-negative number, got {}",
                self.default_unit_price
            )));
        }

        if !(self.deviation > 0.0 && self.deviation < 1.0) {
            return Err(ConfigError::Validation(format!(
                "deviation must lie strictly between 0 and 1, got {}",
                self.deviation
            )));
        }

        Ok(())
    }

    /// Apply `overrides` on top of these settings and re-validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the merged settings are invalid.
    pub fn with_overrides(mut self, overrides: &SettingsOverrides) -> Result<Self, ConfigError> {
        if let Some(prices) = &overrides.prices {
            self.prices.clone_from(prices);
        }
        if let Some(distances) = &overrides.distances {
            self.distances.clone_from(distances);
        }
        if let Some(unit) = overrides.default_unit {
            self.default_unit = unit;
        }
        if let Some(unit_price) = overrides.default_unit_price {
            self.default_unit_price = unit_price;
        }
        if let Some(deviation) = overrides.deviation {
            self.deviation = deviation;
        }
        self.validate()?;
        Ok(self)
    }

    /// The farthest configured distance bound, in meters.
    #[must_use]
    pub fn max_distance(&self) -> Option<f64> {
        self.distances.last().copied()
    }
}

/// Load and validate pricing settings from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_settings(path: &Path) -> Result<PricingSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SettingsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_settings(&content)
}

/// Parse and validate pricing settings from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text does not parse or fails validation.
pub fn parse_settings(yaml: &str) -> Result<PricingSettings, ConfigError> {
    let settings: PricingSettings = serde_yaml::from_str(yaml)?;
    settings.validate()?;
    Ok(settings)
}

fn validate_bounds(name: &str, bounds: &[f64]) -> Result<(), ConfigError> {
    if bounds.is_empty() {
        return Err(ConfigError::Validation(format!("{name} must not be empty")));
    }

    if let Some(bad) = bounds.iter().find(|b| !b.is_finite() || **b <= 0.0) {
        return Err(ConfigError::Validation(format!(
            "{name} must contain only positive numbers, got {bad}"
        )));
    }

    if let Some(pair) = bounds.windows(2).find(|w| w[1] <= w[0]) {
        return Err(ConfigError::Validation(format!(
            "{name} must be strictly increasing ({} is followed by {})",
            pair[0], pair[1]
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
