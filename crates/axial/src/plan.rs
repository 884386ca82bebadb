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

use crate::config::ResolverConfig;
use crate::normalize::{format_number_with_precision, is_time_like_column};
use crate::ordering::sort_rows_by_axis;
use crate::pivot::pivot_rows;
use crate::record::{column_samples, field, value_label, Record};
use crate::resolver::{resolve_with_overrides, AxisOverrides, AxisResolution, ResolutionStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}
impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
        };
        f.write_str(name)
    }
}

/// Everything the rendering layer needs for one result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPlan {
    pub resolution: AxisResolution,
    pub x_time_like: bool,
    /// Wide rows when multi-series, otherwise the input rows in axis order.
    pub data: Vec<Record>,
    /// Series labels of the pivot; empty when `data` is flat.
    pub series: Vec<String>,
    pub recommended_kinds: Vec<ChartKind>,
    #[serde(skip, default = "default_fraction_digits")]
    fraction_digits: usize,
}
fn default_fraction_digits() -> usize {
    ResolverConfig::default().max_fraction_digits
}
impl ChartPlan {
    pub fn status(&self) -> ResolutionStatus {
        self.resolution.status()
    }
    pub fn is_chartable(&self) -> bool {
        self.resolution.is_resolved() && !self.data.is_empty()
    }
    /// X-axis values of `data`, formatted for display.
    pub fn axis_labels(&self) -> Vec<String> {
        let Some(x_key) = self.resolution.x_axis.as_deref() else {
            return Vec::new();
        };
        self.data
            .iter()
            .map(|row| {
                let value = field(row, x_key);
                if value.is_number() && !self.x_time_like {
                    format_number_with_precision(value, self.fraction_digits)
                } else {
                    value_label(value)
                }
            })
            .collect()
    }
    pub fn summary(&self) -> String {
        match self.status() {
            ResolutionStatus::Empty => "empty result set".to_string(),
            ResolutionStatus::Unresolved => "cannot chart this result".to_string(),
            ResolutionStatus::Resolved => {
                let kind = self
                    .recommended_kinds
                    .first()
                    .map_or_else(|| "bar".to_string(), ChartKind::to_string);
                let metric = self.resolution.metric.as_deref().unwrap_or_default();
                let x_axis = self.resolution.x_axis.as_deref().unwrap_or_default();
                let mut text = format!("{kind} chart of {metric} by {x_axis}");
                if !self.series.is_empty() {
                    if let Some(series) = self.resolution.series.as_deref() {
                        text.push_str(&format!(
                            " split by {series} ({} points, {} series)",
                            self.data.len(),
                            self.series.len()
                        ));
                        return text;
                    }
                }
                text.push_str(&format!(" ({} points)", self.data.len()));
                text
            }
        }
    }
}

/// Runs resolution, then either pivots or orders the flat rows.
pub fn build_plan(rows: &[Record], overrides: &AxisOverrides, config: &ResolverConfig) -> ChartPlan {
    let resolution = resolve_with_overrides(rows, overrides, config);
    let fraction_digits = config.max_fraction_digits;
    let (Some(x_key), Some(metric_key), true) = (
        resolution.x_axis.clone(),
        resolution.metric.clone(),
        resolution.is_resolved(),
    ) else {
        debug!(status = ?resolution.status, "ChartPlan: nothing to chart");
        return ChartPlan {
            resolution,
            fraction_digits,
            ..Default::default()
        };
    };
    let x_time_like = is_time_like_column(
        &x_key,
        &column_samples(rows, &x_key, config.time_sample_limit),
        config,
    );
    // A series that coincides with an overridden key is charted flat.
    let (data, series) = match resolution.series.as_deref() {
        Some(series_key)
            if resolution.is_multi_series && series_key != x_key && series_key != metric_key =>
        {
            let table = pivot_rows(rows, &x_key, series_key, &metric_key, x_time_like, config);
            (table.data, table.series)
        }
        _ => (sort_rows_by_axis(rows, &x_key, x_time_like), Vec::new()),
    };
    let recommended_kinds = recommend_kinds(!series.is_empty(), x_time_like, &data, &x_key, config);
    debug!(
        x_axis = %x_key,
        metric = %metric_key,
        x_time_like,
        rows = data.len(),
        kinds = ?recommended_kinds,
        "ChartPlan: built"
    );
    ChartPlan {
        resolution,
        x_time_like,
        data,
        series,
        recommended_kinds,
        fraction_digits,
    }
}

fn recommend_kinds(
    pivoted: bool,
    x_time_like: bool,
    data: &[Record],
    x_key: &str,
    config: &ResolverConfig,
) -> Vec<ChartKind> {
    if x_time_like {
        return vec![ChartKind::Line, ChartKind::Bar];
    }
    let distinct = data
        .iter()
        .map(|row| value_label(field(row, x_key)))
        .collect::<HashSet<_>>()
        .len();
    if !pivoted && distinct <= config.pie_max_slices {
        vec![ChartKind::Bar, ChartKind::Pie]
    } else {
        vec![ChartKind::Bar]
    }
}
