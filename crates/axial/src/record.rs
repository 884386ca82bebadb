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

use crate::error::{Result, SerialisationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One flat result row. Key order is the column order reported by the backend.
pub type Record = Map<String, Value>;

pub(crate) static NULL: Value = Value::Null;

/// Body returned by the query backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub sql: String,
    #[serde(default)]
    pub results: Vec<Record>,
}
impl QueryResponse {
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        if value.get("results").is_some_and(|results| !results.is_array()) {
            return Err(SerialisationError::MalformedResponse {
                reason: "'results' is not an array".to_string(),
            }
            .into());
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Text used to group and order a value: strings verbatim, everything else
/// through its JSON form (`null`, `true`, `42`).
pub fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Label of `key` in `record`; an absent key reads as `null`.
pub fn field_label(record: &Record, key: &str) -> String {
    value_label(field(record, key))
}

pub(crate) fn field<'a>(record: &'a Record, key: &str) -> &'a Value {
    record.get(key).unwrap_or(&NULL)
}

/// Column names of the first record, which is authoritative for the set.
pub fn column_names(rows: &[Record]) -> Vec<&str> {
    rows.first()
        .map(|sample| sample.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Values of `column` in the first `limit` rows.
pub fn column_samples<'a>(rows: &'a [Record], column: &str, limit: usize) -> Vec<&'a Value> {
    rows.iter().take(limit).map(|row| field(row, column)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_mirror_json_text() {
        assert_eq!(value_label(&json!("North")), "North");
        assert_eq!(value_label(&json!(10)), "10");
        assert_eq!(value_label(&json!(null)), "null");
        assert_eq!(value_label(&json!(true)), "true");
    }

    #[test]
    fn response_keeps_column_order() {
        let response = QueryResponse::from_json(
            r#"{"sql":"select 1","results":[{"zeta":1,"alpha":"a","mid":2}]}"#,
        )
        .unwrap();
        assert_eq!(column_names(&response.results), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn response_without_results_is_empty() {
        let response = QueryResponse::from_json(r#"{"sql":"select 1"}"#).unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn non_array_results_are_rejected() {
        let err = QueryResponse::from_json(r#"{"results":"nope"}"#).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn missing_field_reads_as_null() {
        let row = json!({"a": 1}).as_object().cloned().unwrap();
        assert_eq!(field_label(&row, "b"), "null");
        assert_eq!(column_samples(&[row], "b", 15), vec![&Value::Null]);
    }
}
