// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::error::{ConfigError, ConfigResult, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Tunables for axis resolution and pivoting.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How many leading rows are inspected by the content-based time test.
    pub time_sample_limit: usize,
    /// Share of inspected values that must parse as a month for a column to
    /// count as time-like. The required count is rounded up.
    pub time_match_ratio: f64,
    /// Fractional digits kept when formatting numbers for display.
    pub max_fraction_digits: usize,
    /// Value written into a wide row when a metric cannot be normalized.
    pub pivot_missing_metric: f64,
    /// Largest categorical domain for which a pie chart is recommended.
    pub pie_max_slices: usize,
}
impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            time_sample_limit: 15,
            time_match_ratio: 0.6,
            max_fraction_digits: 2,
            pivot_missing_metric: 0.0,
            pie_max_slices: 8,
        }
    }
}
impl ResolverConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.time_sample_limit == 0 {
            return Err(invalid("time_sample_limit", self.time_sample_limit));
        }
        if !(self.time_match_ratio > 0.0 && self.time_match_ratio <= 1.0) {
            return Err(invalid("time_match_ratio", self.time_match_ratio));
        }
        if self.max_fraction_digits > 10 {
            return Err(invalid("max_fraction_digits", self.max_fraction_digits));
        }
        if !self.pivot_missing_metric.is_finite() {
            return Err(invalid("pivot_missing_metric", self.pivot_missing_metric));
        }
        Ok(())
    }
    /// Demands more evidence before treating a column as time-like.
    pub fn strict() -> Self {
        Self {
            time_sample_limit: 30,
            time_match_ratio: 0.8,
            ..Default::default()
        }
    }
    pub fn lenient() -> Self {
        Self {
            time_sample_limit: 10,
            time_match_ratio: 0.5,
            pie_max_slices: 12,
            ..Default::default()
        }
    }
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileError {
                path: path.display().to_string(),
                source,
            })?;
        let config = Self::from_toml_str(&source)?;
        info!(path = %path.display(), "ResolverConfig: loaded configuration file");
        Ok(config)
    }
}
fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AxialError;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(ResolverConfig::default().validate().is_ok());
        assert!(ResolverConfig::strict().validate().is_ok());
        assert!(ResolverConfig::lenient().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ResolverConfig::from_toml_str("time_match_ratio = 0.75\n").unwrap();
        assert_eq!(config.time_match_ratio, 0.75);
        assert_eq!(config.time_sample_limit, 15);
        assert_eq!(config.max_fraction_digits, 2);
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        let err = ResolverConfig::from_toml_str("time_match_ratio = 1.5\n").unwrap_err();
        match err {
            AxialError::Config(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "time_match_ratio");
            }
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "time_sample_limit = 5").unwrap();
        writeln!(file, "pie_max_slices = 3").unwrap();
        let config = ResolverConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.time_sample_limit, 5);
        assert_eq!(config.pie_max_slices, 3);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ResolverConfig::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
