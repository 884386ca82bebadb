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

//! Chooses the x-axis, series and metric columns of a result set.
//!
//! Selection is a fixed precedence policy over the classifier output of the
//! first record. Each call is independent; nothing is remembered between
//! result sets.

use crate::classifier::{classify, ColumnProfile};
use crate::config::ResolverConfig;
use crate::normalize::{is_time_like_column, normalize_number};
use crate::record::{column_samples, field, Record};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    XAxis,
    Series,
    Metric,
    Unused,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// The result set had no rows.
    #[default]
    Empty,
    /// Rows were present but no x-axis or no metric could be chosen.
    Unresolved,
    Resolved,
}

/// Role assignment for one result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisResolution {
    pub x_axis: Option<String>,
    pub series: Option<String>,
    pub metric: Option<String>,
    pub is_multi_series: bool,
    pub status: ResolutionStatus,
}
impl AxisResolution {
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn status(&self) -> ResolutionStatus {
        self.status
    }
    pub fn is_resolved(&self) -> bool {
        self.status == ResolutionStatus::Resolved
    }
    pub fn role_of(&self, column: &str) -> ColumnRole {
        let is = |slot: &Option<String>| slot.as_deref() == Some(column);
        if is(&self.x_axis) {
            ColumnRole::XAxis
        } else if is(&self.series) {
            ColumnRole::Series
        } else if is(&self.metric) {
            ColumnRole::Metric
        } else {
            ColumnRole::Unused
        }
    }
}

/// Caller-supplied keys that replace the inferred x-axis or metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOverrides {
    pub x_key: Option<String>,
    pub y_key: Option<String>,
}
impl AxisOverrides {
    pub fn is_empty(&self) -> bool {
        self.x_key.is_none() && self.y_key.is_none()
    }
}

pub fn resolve(rows: &[Record]) -> AxisResolution {
    resolve_with_config(rows, &ResolverConfig::default())
}

pub fn resolve_with_config(rows: &[Record], config: &ResolverConfig) -> AxisResolution {
    let Some(sample) = rows.first() else {
        return AxisResolution::empty();
    };
    let profiles = classify(sample);
    let mut x_axis = pick_x_axis(&profiles);
    let mut series = x_axis.and_then(|x| pick_series(&profiles, x));
    let metric = pick_metric(&profiles);

    if let (Some(x), Some(s)) = (x_axis, series) {
        let x_time_like = is_time_like_column(
            &x.name,
            &column_samples(rows, &x.name, config.time_sample_limit),
            config,
        );
        if should_swap(x, s, x_time_like) {
            debug!(x_axis = %s.name, series = %x.name, "AxisResolver: geography column promoted to x-axis");
            x_axis = Some(s);
            series = Some(x);
        }
    }

    let is_multi_series = match (x_axis, series, metric) {
        (Some(x), Some(s), Some(m)) => {
            x.name != s.name && normalize_number(field(sample, &m.name)).is_finite()
        }
        _ => false,
    };
    let resolution = finish(
        x_axis.map(|p| p.name.clone()),
        series.map(|p| p.name.clone()),
        metric.map(|p| p.name.clone()),
        is_multi_series,
    );
    debug!(
        x_axis = ?resolution.x_axis,
        series = ?resolution.series,
        metric = ?resolution.metric,
        is_multi_series,
        status = ?resolution.status,
        "AxisResolver: resolved roles"
    );
    resolution
}

/// Resolves, then applies explicit keys. The series and the multi-series
/// decision are the ones resolution produced. An empty result set stays
/// [`ResolutionStatus::Empty`] whatever keys are supplied.
pub fn resolve_with_overrides(
    rows: &[Record],
    overrides: &AxisOverrides,
    config: &ResolverConfig,
) -> AxisResolution {
    let resolved = resolve_with_config(rows, config);
    if overrides.is_empty() || rows.is_empty() {
        return resolved;
    }
    let x_axis = overrides.x_key.clone().or(resolved.x_axis);
    let metric = overrides.y_key.clone().or(resolved.metric);
    debug!(
        ?x_axis,
        series = ?resolved.series,
        ?metric,
        is_multi_series = resolved.is_multi_series,
        "AxisResolver: applied overrides"
    );
    finish(x_axis, resolved.series, metric, resolved.is_multi_series)
}

fn finish(
    x_axis: Option<String>,
    series: Option<String>,
    metric: Option<String>,
    is_multi_series: bool,
) -> AxisResolution {
    let status = if x_axis.is_some() && metric.is_some() {
        ResolutionStatus::Resolved
    } else {
        ResolutionStatus::Unresolved
    };
    AxisResolution {
        x_axis,
        series,
        metric,
        is_multi_series,
        status,
    }
}

fn pick_x_axis(profiles: &[ColumnProfile]) -> Option<&ColumnProfile> {
    profiles
        .iter()
        .find(|p| p.is_time_keyed())
        .or_else(|| profiles.iter().find(|p| p.is_geography()))
        .or_else(|| profiles.iter().find(|p| !p.numeric && p.time_named))
        .or_else(|| profiles.iter().find(|p| !p.numeric))
}

/// Product beats geography here, while geography beats product for the
/// x-axis.
fn pick_series<'a>(profiles: &'a [ColumnProfile], x: &ColumnProfile) -> Option<&'a ColumnProfile> {
    let candidates = || profiles.iter().filter(|p| !p.numeric && p.name != x.name);
    candidates()
        .find(|p| p.is_product())
        .or_else(|| candidates().find(|p| p.is_geography()))
        .or_else(|| candidates().next())
}

/// Lowest metric rank wins, ties going to column order. Any numeric column
/// qualifies, including one already chosen as the x-axis.
fn pick_metric(profiles: &[ColumnProfile]) -> Option<&ColumnProfile> {
    let numeric = || profiles.iter().filter(|p| p.numeric);
    numeric()
        .filter_map(|p| p.metric_rank().map(|rank| (rank, p)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, p)| p)
        .or_else(|| numeric().next())
}

/// True when the x-axis is neither time-like nor geographic and the series
/// is geographic.
pub fn should_swap(x: &ColumnProfile, series: &ColumnProfile, x_time_like: bool) -> bool {
    !x_time_like && !x.is_geography() && series.is_geography()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify_column;
    use serde_json::json;

    fn rows(values: serde_json::Value) -> Vec<Record> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn empty_result_set_is_empty_status() {
        let resolution = resolve(&[]);
        assert_eq!(resolution, AxisResolution::empty());
        assert_eq!(resolution.status(), ResolutionStatus::Empty);
        assert!(!resolution.is_multi_series);
    }

    #[test]
    fn time_keyword_wins_x_axis_even_when_numeric() {
        let resolution = resolve(&rows(json!([{"year": 2024, "city": "Ipoh", "sales": 3}])));
        assert_eq!(resolution.x_axis.as_deref(), Some("year"));
        assert_eq!(resolution.series.as_deref(), Some("city"));
        assert_eq!(resolution.metric.as_deref(), Some("sales"));
        assert!(resolution.is_multi_series);
    }

    #[test]
    fn metric_priority_beats_column_order() {
        let resolution = resolve(&rows(json!([{"label": "a", "qty": 3, "revenue": 9.5}])));
        assert_eq!(resolution.metric.as_deref(), Some("revenue"));
    }

    #[test]
    fn metric_falls_back_to_first_numeric() {
        let resolution = resolve(&rows(json!([{"label": "a", "score": 3, "other": 4}])));
        assert_eq!(resolution.metric.as_deref(), Some("score"));
        assert_eq!(resolution.role_of("other"), ColumnRole::Unused);
    }

    #[test]
    fn numeric_time_axis_can_also_be_the_metric() {
        let resolution = resolve(&rows(json!([{"year": 2024, "amount": 5}])));
        assert_eq!(resolution.x_axis.as_deref(), Some("year"));
        assert_eq!(resolution.metric.as_deref(), Some("year"));
        assert_eq!(resolution.series, None);
        assert!(!resolution.is_multi_series);
        assert!(resolution.is_resolved());
    }

    #[test]
    fn series_prefers_product_over_geography() {
        let resolution = resolve(&rows(json!([{
            "month": "Jan 2024",
            "region": "North",
            "product_category": "Shoes",
            "revenue": 10
        }])));
        assert_eq!(resolution.x_axis.as_deref(), Some("month"));
        assert_eq!(resolution.series.as_deref(), Some("product_category"));
    }

    #[test]
    fn all_text_columns_are_unresolved() {
        let resolution = resolve(&rows(json!([{"name": "a", "kind": "b"}])));
        assert_eq!(resolution.x_axis.as_deref(), Some("name"));
        assert_eq!(resolution.metric, None);
        assert_eq!(resolution.status(), ResolutionStatus::Unresolved);
        assert!(!resolution.is_multi_series);
    }

    #[test]
    fn swap_rule_promotes_geography() {
        let category = classify_column("category", false);
        let region = classify_column("region", false);
        assert!(should_swap(&category, &region, false));
        assert!(!should_swap(&category, &region, true));
        assert!(!should_swap(&region, &category, false));
    }

    #[test]
    fn overrides_keep_resolved_series_detection() {
        let data = rows(json!([{"month": "Jan 2024", "region": "N", "revenue": 10, "cost": "n/a"}]));
        let config = ResolverConfig::default();
        let overridden = resolve_with_overrides(
            &data,
            &AxisOverrides {
                x_key: None,
                y_key: Some("cost".to_string()),
            },
            &config,
        );
        assert_eq!(overridden.x_axis.as_deref(), Some("month"));
        assert_eq!(overridden.metric.as_deref(), Some("cost"));
        assert_eq!(overridden.series.as_deref(), Some("region"));
        assert!(overridden.is_multi_series);

        let overridden = resolve_with_overrides(
            &data,
            &AxisOverrides {
                x_key: Some("region".to_string()),
                y_key: None,
            },
            &config,
        );
        assert_eq!(overridden.x_axis.as_deref(), Some("region"));
        assert_eq!(overridden.series.as_deref(), Some("region"));
        assert_eq!(overridden.metric.as_deref(), Some("revenue"));
        assert!(overridden.is_multi_series);
    }

    #[test]
    fn overrides_on_empty_rows_stay_empty() {
        let overridden = resolve_with_overrides(
            &[],
            &AxisOverrides {
                x_key: Some("month".to_string()),
                y_key: Some("revenue".to_string()),
            },
            &ResolverConfig::default(),
        );
        assert_eq!(overridden, AxisResolution::empty());
        assert_eq!(overridden.status(), ResolutionStatus::Empty);
    }
}
