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

use crate::normalize::{is_time_keyword, normalize_number};
use crate::record::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Metric keywords, highest priority first.
pub const METRIC_KEYWORDS: [&str; 10] = [
    "revenue_rm",
    "revenue",
    "total_amount",
    "price",
    "sales",
    "total",
    "total_sales",
    "quantity",
    "qty",
    "count",
];
const GEOGRAPHY_KEYWORDS: [&str; 6] = [
    "region",
    "branch",
    "branch_name",
    "city",
    "country",
    "location",
];
const PRODUCT_KEYWORDS: [&str; 5] = [
    "product_category",
    "category",
    "product",
    "model",
    "product_name",
];
const LOOSE_TIME_KEYWORDS: [&str; 8] = [
    "month", "date", "period", "quarter", "year", "time", "day", "week",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordFamily {
    Time,
    Geography,
    Product,
    /// Position of the matched keyword in [`METRIC_KEYWORDS`].
    Metric(usize),
}

/// Name-based matchers scanned in order. Metric entries follow the priority
/// list, so the first metric hit is also the best one.
static FAMILY_RULES: Lazy<Vec<(Regex, KeywordFamily)>> = Lazy::new(|| {
    let mut rules = vec![
        (any_of(&GEOGRAPHY_KEYWORDS), KeywordFamily::Geography),
        (any_of(&PRODUCT_KEYWORDS), KeywordFamily::Product),
    ];
    rules.extend(
        METRIC_KEYWORDS
            .iter()
            .enumerate()
            .map(|(rank, keyword)| (any_of(&[*keyword]), KeywordFamily::Metric(rank))),
    );
    rules
});
static LOOSE_TIME_RE: Lazy<Regex> = Lazy::new(|| any_of(&LOOSE_TIME_KEYWORDS));

fn any_of(keywords: &[&str]) -> Regex {
    let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
    Regex::new(&format!("(?i)(?:{})", alternatives.join("|"))).expect("keyword pattern is valid")
}

/// What the classifier learned about one column from the sample record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    /// The sample value normalizes to a finite number.
    pub numeric: bool,
    /// Loose name heuristic (`created_time`, `weekday`, ...).
    pub time_named: bool,
    pub families: Vec<KeywordFamily>,
}
impl ColumnProfile {
    pub fn is_time_keyed(&self) -> bool {
        self.families.contains(&KeywordFamily::Time)
    }
    pub fn is_geography(&self) -> bool {
        self.families.contains(&KeywordFamily::Geography)
    }
    pub fn is_product(&self) -> bool {
        self.families.contains(&KeywordFamily::Product)
    }
    pub fn metric_rank(&self) -> Option<usize> {
        self.families.iter().find_map(|family| match family {
            KeywordFamily::Metric(rank) => Some(*rank),
            _ => None,
        })
    }
}

/// Profiles every column of `sample`, in column order.
pub fn classify(sample: &Record) -> Vec<ColumnProfile> {
    sample
        .iter()
        .map(|(name, value)| classify_column(name, normalize_number(value).is_finite()))
        .collect()
}

pub fn classify_column(name: &str, numeric: bool) -> ColumnProfile {
    let mut families = Vec::new();
    if is_time_keyword(name) {
        families.push(KeywordFamily::Time);
    }
    let mut has_metric = false;
    for (pattern, family) in FAMILY_RULES.iter() {
        let is_metric = matches!(family, KeywordFamily::Metric(_));
        if is_metric && has_metric {
            continue;
        }
        if pattern.is_match(name) {
            families.push(*family);
            has_metric |= is_metric;
        }
    }
    let profile = ColumnProfile {
        name: name.to_string(),
        numeric,
        time_named: LOOSE_TIME_RE.is_match(name),
        families,
    };
    trace!(column = %profile.name, numeric, families = ?profile.families, "Classifier: profiled column");
    profile
}
