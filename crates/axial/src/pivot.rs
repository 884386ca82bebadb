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

//! Long-to-wide reshaping for multi-series charts.
//!
//! Each input row carries one (x, series, metric) triple; each output row
//! carries one x value and one field per series value seen with it. Series
//! values never observed for an x are left out rather than zero-filled.
//! A repeated (x, series) pair overwrites the earlier value.
// TODO: decide whether repeated (x, series) pairs should sum instead of
// overwrite once the backend guarantees grouped results.

use crate::config::ResolverConfig;
use crate::normalize::{is_time_like_column, normalize_number};
use crate::ordering::sort_labels;
use crate::record::{column_samples, field, value_label, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    /// Wide rows in axis order.
    pub data: Vec<Record>,
    /// Distinct series values in first-seen order.
    pub series: Vec<String>,
}
impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub fn pivot(rows: &[Record], x_key: &str, series_key: &str, metric_key: &str) -> PivotTable {
    pivot_with_config(rows, x_key, series_key, metric_key, &ResolverConfig::default())
}

pub fn pivot_with_config(
    rows: &[Record],
    x_key: &str,
    series_key: &str,
    metric_key: &str,
    config: &ResolverConfig,
) -> PivotTable {
    let time_like = is_time_like_column(
        x_key,
        &column_samples(rows, x_key, config.time_sample_limit),
        config,
    );
    pivot_rows(rows, x_key, series_key, metric_key, time_like, config)
}

pub(crate) fn pivot_rows(
    rows: &[Record],
    x_key: &str,
    series_key: &str,
    metric_key: &str,
    time_like: bool,
    config: &ResolverConfig,
) -> PivotTable {
    let mut order: Vec<String> = Vec::new();
    let mut wide: HashMap<String, Record> = HashMap::new();
    let mut series: Vec<String> = Vec::new();
    let mut seen_series: HashSet<String> = HashSet::new();

    for row in rows {
        let x_value = field(row, x_key);
        let x_label = value_label(x_value);
        let series_label = value_label(field(row, series_key));
        let metric = metric_value(field(row, metric_key), config.pivot_missing_metric);

        if seen_series.insert(series_label.clone()) {
            series.push(series_label.clone());
        }
        let entry = wide.entry(x_label.clone()).or_insert_with(|| {
            order.push(x_label);
            let mut record = Record::new();
            record.insert(x_key.to_string(), x_value.clone());
            record
        });
        entry.insert(series_label, metric);
    }

    sort_labels(&mut order, time_like);
    let data: Vec<Record> = order
        .iter()
        .filter_map(|label| wide.remove(label))
        .collect();
    debug!(
        rows = rows.len(),
        wide_rows = data.len(),
        series = series.len(),
        time_like,
        "Pivot: reshaped long rows"
    );
    PivotTable { data, series }
}

/// Numeric cells keep their JSON number; anything else is normalized and
/// replaced by `missing` when it holds no finite number.
fn metric_value(raw: &Value, missing: f64) -> Value {
    if let Value::Number(n) = raw {
        if n.as_f64().is_some_and(f64::is_finite) {
            return raw.clone();
        }
    }
    let number = normalize_number(raw);
    number_value(if number.is_finite() { number } else { missing })
}

fn number_value(number: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if number.fract() == 0.0 && number.abs() < MAX_EXACT {
        Value::from(number as i64)
    } else {
        serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}
