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

use crate::normalize::month_index;
use crate::record::{field_label, Record};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Text comparison used for non-time axis values: case-insensitive first,
/// lowercase before uppercase on case-only ties.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Months in index order, then everything else by [`compare_labels`].
pub fn compare_chronological(a: &str, b: &str) -> Ordering {
    compare_keyed(&(month_index(a), a), &(month_index(b), b))
}

fn compare_keyed(a: &(Option<i64>, &str), b: &(Option<i64>, &str)) -> Ordering {
    match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_labels(a.1, b.1),
    }
}

/// Distinct axis values in display order. Duplicates keep their first
/// position and equal keys keep first-seen order.
pub fn order_axis_values<I, S>(values: I, time_like: bool) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut distinct: Vec<String> = values
        .into_iter()
        .filter(|value| seen.insert(value.as_ref().to_string()))
        .map(|value| value.as_ref().to_string())
        .collect();
    sort_labels(&mut distinct, time_like);
    distinct
}

/// Stable sort of `labels` under the ordering policy.
pub(crate) fn sort_labels(labels: &mut [String], time_like: bool) {
    if time_like {
        let mut keyed: Vec<(Option<i64>, String)> = labels
            .iter_mut()
            .map(|label| (month_index(label), std::mem::take(label)))
            .collect();
        keyed.sort_by(|a, b| compare_keyed(&(a.0, a.1.as_str()), &(b.0, b.1.as_str())));
        for (slot, (_, label)) in labels.iter_mut().zip(keyed) {
            *slot = label;
        }
    } else {
        labels.sort_by(|a, b| compare_labels(a, b));
    }
}

/// Flat rows reordered by their `x_key` label under the ordering policy.
pub fn sort_rows_by_axis(rows: &[Record], x_key: &str, time_like: bool) -> Vec<Record> {
    let mut keyed: Vec<(Option<i64>, String, &Record)> = rows
        .iter()
        .map(|row| {
            let label = field_label(row, x_key);
            let index = if time_like { month_index(&label) } else { None };
            (index, label, row)
        })
        .collect();
    keyed.sort_by(|a, b| compare_keyed(&(a.0, a.1.as_str()), &(b.0, b.1.as_str())));
    keyed.into_iter().map(|(_, _, row)| row.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn months_sort_chronologically() {
        let ordered = order_axis_values(["Feb 2024", "Jan 2024", "Mar 2024"], true);
        assert_eq!(ordered, vec!["Jan 2024", "Feb 2024", "Mar 2024"]);
    }

    #[test]
    fn mixed_shapes_share_one_timeline() {
        let ordered = order_axis_values(["2024-03", "Dec 2023", "02/2024", "January 2024"], true);
        assert_eq!(ordered, vec!["Dec 2023", "January 2024", "02/2024", "2024-03"]);
    }

    #[test]
    fn non_time_values_trail_lexically() {
        let ordered = order_axis_values(["Unknown", "Feb 2024", "other", "Jan 2024"], true);
        assert_eq!(ordered, vec!["Jan 2024", "Feb 2024", "other", "Unknown"]);
    }

    #[test]
    fn equal_months_keep_first_seen_order() {
        let ordered = order_axis_values(["2024-01", "Jan 2024", "01/2024"], true);
        assert_eq!(ordered, vec!["2024-01", "Jan 2024", "01/2024"]);
    }

    #[test]
    fn lexical_when_not_time_like() {
        let ordered = order_axis_values(["b", "Feb 2024", "a", "B", "a"], false);
        assert_eq!(ordered, vec!["a", "b", "B", "Feb 2024"]);
    }

    #[test]
    fn labels_with_punctuation_and_accents_sort_by_lowercase_bytes() {
        let ordered = order_axis_values(
            ["beta", "Émile", "alpha_1", "Alpha-2", "ALPHA", "alpha", "(none)"],
            false,
        );
        assert_eq!(
            ordered,
            vec!["(none)", "alpha", "ALPHA", "Alpha-2", "alpha_1", "beta", "Émile"]
        );
        assert_eq!(compare_labels("alpha", "ALPHA"), Ordering::Less);
        assert_eq!(compare_labels("a.b", "a-b"), Ordering::Greater);
    }

    #[test]
    fn rows_follow_axis_order() {
        let rows: Vec<Record> = [
            json!({"month": "Mar 2024", "v": 3}),
            json!({"month": "Jan 2024", "v": 1}),
            json!({"month": "Feb 2024", "v": 2}),
        ]
        .iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
        let sorted = sort_rows_by_axis(&rows, "month", true);
        let values: Vec<i64> = sorted.iter().map(|r| r["v"].as_i64().unwrap()).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
