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

//! Errors for the configuration and I/O layer around the engine.
//!
//! Resolution, pivoting and ordering never fail; unresolvable input is
//! reported through `None` roles and [`crate::ResolutionStatus`].

use thiserror::Error;
#[derive(Error, Debug)]
pub enum AxialError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] SerialisationError),
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid resolver configuration: {field} = {value}")]
    InvalidValue { field: String, value: String },
    #[error("Failed to parse TOML configuration: {source}")]
    TomlParseError {
        #[from]
        source: toml::de::Error,
    },
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
#[derive(Error, Debug)]
pub enum SerialisationError {
    #[error("JSON serialisation failed: {source}")]
    JsonSerialisationError {
        #[from]
        source: serde_json::Error,
    },
    #[error("Query response is not a JSON object with a 'results' array: {reason}")]
    MalformedResponse { reason: String },
}
pub type Result<T> = std::result::Result<T, AxialError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
impl From<serde_json::Error> for AxialError {
    fn from(err: serde_json::Error) -> Self {
        AxialError::Serialisation(SerialisationError::JsonSerialisationError { source: err })
    }
}
impl From<toml::de::Error> for AxialError {
    fn from(err: toml::de::Error) -> Self {
        AxialError::Config(ConfigError::TomlParseError { source: err })
    }
}
impl AxialError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AxialError::Config(ConfigError::InvalidValue { .. })
                | AxialError::Serialisation(SerialisationError::MalformedResponse { .. })
        )
    }
    pub fn category(&self) -> &'static str {
        match self {
            AxialError::Config(_) => "Configuration",
            AxialError::Serialisation(_) => "Serialisation",
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            AxialError::Config(ConfigError::ConfigFileError { path, .. }) => {
                format!("Unable to load resolver configuration from '{path}'. Check the path and permissions.")
            }
            AxialError::Serialisation(SerialisationError::MalformedResponse { .. }) => {
                "The backend response could not be read as a table of results.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
