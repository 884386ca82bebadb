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

//! Canonical numeric and temporal values for loosely typed result cells.
//!
//! Numbers normalize to `f64`, with `NaN` marking text that holds no number.
//! Month-like text normalizes to a linear month index `year * 12 + offset`
//! so that "Jan 2024", "2024-01" and "01/2024" compare equal; `None` marks
//! text that is not time-like and sorts after every index.

use crate::config::ResolverConfig;
use crate::record::value_label;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static NON_NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9,.\-]").expect("non-numeric pattern is valid"));
static LEADING_FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)").expect("float pattern is valid"));
static TIME_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|_)(?:month|date|period|quarter|year)s?(?:_|$)")
        .expect("time keyword pattern is valid")
});

static ABBREVIATED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][a-z]{2})\s+(\d{4})$").expect("pattern is valid"));
static FULL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)\s+(\d{4})$").expect("pattern is valid"));
static YEAR_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("pattern is valid"));
static MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{4})$").expect("pattern is valid"));
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").expect("pattern is valid"));

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

type MonthMatcher = fn(&str) -> Option<i64>;

/// Tried in order; the first shape that matches decides the index.
const MONTH_MATCHERS: [MonthMatcher; 5] = [
    abbreviated_month_year,
    full_month_year,
    year_dash_month,
    month_slash_year,
    bare_year,
];

/// Converts a cell into a number, tolerating currency symbols, percent signs,
/// grouping commas and surrounding text. Returns `NaN` when nothing numeric
/// remains.
pub fn normalize_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_numeric_text(s),
        other => parse_numeric_text(&other.to_string()),
    }
}

fn parse_numeric_text(text: &str) -> f64 {
    let cleaned = NON_NUMERIC_RE.replace_all(text, "");
    let cleaned = cleaned.trim().replace(',', "");
    let parsed = LEADING_FLOAT_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN);
    if parsed.is_finite() {
        parsed
    } else {
        f64::NAN
    }
}

/// Display form of a cell: en-US grouping and at most two fractional digits.
/// Cells that hold no number are shown as their literal text.
pub fn format_number(value: &Value) -> String {
    format_number_with_precision(value, ResolverConfig::default().max_fraction_digits)
}

pub fn format_number_with_precision(value: &Value, max_fraction_digits: usize) -> String {
    let number = normalize_number(value);
    if !number.is_finite() {
        return value_label(value);
    }
    let fixed = format!("{number:.max_fraction_digits$}");
    let (integer_part, fraction_part) = match fixed.split_once('.') {
        Some((int, frac)) => (int, frac.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };
    let digits = integer_part.trim_start_matches('-');
    let is_zero = digits.bytes().all(|b| b == b'0') && fraction_part.is_empty();
    let mut out = String::with_capacity(fixed.len() + digits.len() / 3);
    if integer_part.starts_with('-') && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(digits));
    if !fraction_part.is_empty() {
        out.push('.');
        out.push_str(fraction_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Linear month ordinal of `text`, or `None` when the text is not one of the
/// supported shapes: `Jan 2024`, `January 2024`, `2024-01`, `01/2024`, `2024`.
pub fn month_index(text: &str) -> Option<i64> {
    let text = text.trim();
    MONTH_MATCHERS.iter().find_map(|matcher| matcher(text))
}

/// [`month_index`] over a cell. Numbers are read through their text so a
/// numeric `2024` is the year 2024.
pub fn value_month_index(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => month_index(s),
        Value::Number(n) => month_index(&n.to_string()),
        _ => None,
    }
}

/// Whether `name` carries a time keyword as a whole `_`-separated token.
pub fn is_time_keyword(name: &str) -> bool {
    TIME_KEYWORD_RE.is_match(name)
}

/// A column is time-like when its name says so or when enough of its leading
/// values parse as months.
pub fn is_time_like_column(name: &str, samples: &[&Value], config: &ResolverConfig) -> bool {
    if is_time_keyword(name) {
        return true;
    }
    let inspected = &samples[..samples.len().min(config.time_sample_limit)];
    if inspected.is_empty() {
        return false;
    }
    let required = (config.time_match_ratio * inspected.len() as f64).ceil() as usize;
    let parsed = inspected
        .iter()
        .filter(|value| value_month_index(value).is_some())
        .count();
    parsed >= required.max(1)
}

fn linear_month(year: &str, month: usize) -> Option<i64> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let year: i64 = year.parse().ok()?;
    Some(year * 12 + month as i64 - 1)
}

fn abbreviated_month_year(text: &str) -> Option<i64> {
    let caps = ABBREVIATED_RE.captures(text)?;
    let month = MONTH_ABBREVIATIONS.iter().position(|m| *m == &caps[1])?;
    linear_month(&caps[2], month + 1)
}

fn full_month_year(text: &str) -> Option<i64> {
    let caps = FULL_NAME_RE.captures(text)?;
    let name = caps[1].to_lowercase();
    let month = MONTH_NAMES.iter().position(|m| *m == name)?;
    linear_month(&caps[2], month + 1)
}

fn year_dash_month(text: &str) -> Option<i64> {
    let caps = YEAR_MONTH_RE.captures(text)?;
    linear_month(&caps[1], caps[2].parse().ok()?)
}

fn month_slash_year(text: &str) -> Option<i64> {
    let caps = MONTH_YEAR_RE.captures(text)?;
    linear_month(&caps[2], caps[1].parse().ok()?)
}

fn bare_year(text: &str) -> Option<i64> {
    let caps = YEAR_RE.captures(text)?;
    linear_month(&caps[1], 1)
}
