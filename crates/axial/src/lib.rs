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

//! Interprets schema-less query results for charting.
//!
//! Given the rows of an ad-hoc query, the crate infers which column is the
//! x-axis, which (if any) splits the data into series and which holds the
//! metric, then reshapes and orders the rows for a renderer.

pub mod classifier;
pub mod config;
pub mod error;
pub mod normalize;
pub mod ordering;
pub mod pivot;
pub mod plan;
pub mod record;
pub mod resolver;

pub use classifier::{classify, ColumnProfile, KeywordFamily};
pub use config::ResolverConfig;
pub use error::{AxialError, ConfigError, Result, SerialisationError};
pub use normalize::{format_number, is_time_like_column, month_index, normalize_number};
pub use ordering::{order_axis_values, sort_rows_by_axis};
pub use pivot::{pivot, PivotTable};
pub use plan::{build_plan, ChartKind, ChartPlan};
pub use record::{QueryResponse, Record};
pub use resolver::{
    resolve, resolve_with_overrides, AxisOverrides, AxisResolution, ColumnRole, ResolutionStatus,
};

/// Engine facade carrying one validated [`ResolverConfig`].
#[derive(Debug, Clone, Default)]
pub struct Axial {
    config: ResolverConfig,
}
impl Axial {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
    pub fn from_toml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Ok(Self {
            config: ResolverConfig::from_toml_file(path)?,
        })
    }
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
    pub fn profile(&self, rows: &[Record]) -> Vec<ColumnProfile> {
        rows.first().map(classify).unwrap_or_default()
    }
    pub fn resolve(&self, rows: &[Record]) -> AxisResolution {
        resolver::resolve_with_config(rows, &self.config)
    }
    pub fn resolve_with_overrides(
        &self,
        rows: &[Record],
        overrides: &AxisOverrides,
    ) -> AxisResolution {
        resolver::resolve_with_overrides(rows, overrides, &self.config)
    }
    pub fn pivot(
        &self,
        rows: &[Record],
        x_key: &str,
        series_key: &str,
        metric_key: &str,
    ) -> PivotTable {
        pivot::pivot_with_config(rows, x_key, series_key, metric_key, &self.config)
    }
    pub fn is_time_like(&self, rows: &[Record], column: &str) -> bool {
        let samples = record::column_samples(rows, column, self.config.time_sample_limit);
        is_time_like_column(column, &samples, &self.config)
    }
    pub fn plan(&self, rows: &[Record], overrides: &AxisOverrides) -> ChartPlan {
        build_plan(rows, overrides, &self.config)
    }
    pub fn plan_response(&self, response: &QueryResponse, overrides: &AxisOverrides) -> ChartPlan {
        self.plan(&response.results, overrides)
    }
    pub fn plan_json(&self, body: &str, overrides: &AxisOverrides) -> Result<ChartPlan> {
        let response = QueryResponse::from_json(body)?;
        Ok(self.plan_response(&response, overrides))
    }
}
