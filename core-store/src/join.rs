//! Member ordering for the sorted join read.
//!
//! Kept engine-independent so every `KvStore` implementation orders members
//! the same way.

use crate::{expand_pattern, Result, StoreError};
use chrono::DateTime;
use serde_json::Value;

/// Reorder `members` by their sort values (one per member, same order).
///
/// Values holding a JSON scalar are compared by what they decode to: alpha
/// mode compares string content, numeric mode maps booleans to 0/1 and
/// RFC 3339 timestamps to epoch milliseconds. The sort is stable, and
/// numeric mode treats an absent, empty or `null` value as `0`.
pub(crate) fn sort_by_values(
    members: Vec<String>,
    values: Vec<Option<Vec<u8>>>,
    pattern: &str,
    alpha: bool,
) -> Result<Vec<String>> {
    if alpha {
        let mut keyed: Vec<(Vec<u8>, String)> = values
            .into_iter()
            .map(text_key)
            .zip(members)
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        return Ok(keyed.into_iter().map(|(_, member)| member).collect());
    }

    let mut keyed = Vec::with_capacity(members.len());
    for (member, value) in members.into_iter().zip(values) {
        match numeric_key(value.as_deref()) {
            Some(number) => keyed.push((number, member)),
            None => {
                return Err(StoreError::NonNumericSortValue {
                    key: expand_pattern(pattern, &member),
                    value: String::from_utf8_lossy(value.as_deref().unwrap_or_default())
                        .into_owned(),
                })
            }
        }
    }
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, member)| member).collect())
}

/// Apply direction, then `offset` and `limit`.
pub(crate) fn window(
    mut members: Vec<String>,
    descending: bool,
    offset: usize,
    limit: Option<usize>,
) -> Vec<String> {
    if descending {
        members.reverse();
    }
    let selected = members.into_iter().skip(offset);
    match limit {
        Some(limit) => selected.take(limit).collect(),
        None => selected.collect(),
    }
}

fn text_key(value: Option<Vec<u8>>) -> Vec<u8> {
    let bytes = value.unwrap_or_default();
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::String(text)) => text.into_bytes(),
        _ => bytes,
    }
}

fn numeric_key(value: Option<&[u8]>) -> Option<f64> {
    let Some(bytes) = value else {
        return Some(0.0);
    };
    let text = std::str::from_utf8(bytes).ok()?.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) => Some(0.0),
        Ok(Value::Bool(flag)) => Some(if flag { 1.0 } else { 0.0 }),
        Ok(Value::Number(number)) => number.as_f64(),
        Ok(Value::String(inner)) => parse_scalar_text(inner.trim()),
        Ok(_) => None,
        Err(_) => parse_scalar_text(text),
    }
}

fn parse_scalar_text(text: &str) -> Option<f64> {
    if let Ok(number) = text.parse::<f64>() {
        return Some(number);
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|timestamp| timestamp.timestamp_millis() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn values(raw: &[Option<&str>]) -> Vec<Option<Vec<u8>>> {
        raw.iter().map(|v| v.map(|s| s.as_bytes().to_vec())).collect()
    }

    #[test]
    fn test_alpha_sort_compares_string_content() {
        let sorted = sort_by_values(
            members(&["p1", "p2", "p3"]),
            values(&[Some("\"Road Trip\""), Some("\"Chill\""), Some("\"Workout\"")]),
            "playlist:*:Name",
            true,
        )
        .unwrap();
        assert_eq!(sorted, members(&["p2", "p1", "p3"]));
    }

    #[test]
    fn test_alpha_sort_places_prefix_first() {
        let sorted = sort_by_values(
            members(&["trip", "bang", "road"]),
            values(&[Some("\"Road Trip\""), Some("\"Road!\""), Some("\"Road\"")]),
            "playlist:*:Name",
            true,
        )
        .unwrap();
        assert_eq!(sorted, members(&["road", "trip", "bang"]));
    }

    #[test]
    fn test_alpha_sort_ignores_escapes() {
        // "A\"B" decodes to A"B, which sorts before AB ('"' < 'B')
        let sorted = sort_by_values(
            members(&["plain", "quoted", "slash"]),
            values(&[Some("\"AB\""), Some(r#""A\"B""#), Some(r#""A\\""#)]),
            "playlist:*:Name",
            true,
        )
        .unwrap();
        assert_eq!(sorted, members(&["quoted", "plain", "slash"]));
    }

    #[test]
    fn test_alpha_sort_keeps_raw_text_and_absent_first() {
        let sorted = sort_by_values(
            members(&["a", "b", "c"]),
            values(&[Some("zeta"), None, Some("alpha")]),
            "t:*:F",
            true,
        )
        .unwrap();
        assert_eq!(sorted, members(&["b", "c", "a"]));
    }

    #[test]
    fn test_numeric_sort_maps_booleans() {
        let sorted = sort_by_values(
            members(&["on", "off", "unset"]),
            values(&[Some("true"), Some("false"), None]),
            "album:*:Starred",
            false,
        )
        .unwrap();
        assert_eq!(sorted, members(&["off", "unset", "on"]));
    }

    #[test]
    fn test_numeric_sort_maps_timestamps_to_millis() {
        let sorted = sort_by_values(
            members(&["late", "epoch", "early"]),
            values(&[
                Some("\"2016-03-01T10:00:00Z\""),
                Some("\"1970-01-01T00:00:00Z\""),
                Some("\"2016-03-01T09:59:59.500+00:00\""),
            ]),
            "album:*:CreatedAt",
            false,
        )
        .unwrap();
        assert_eq!(sorted, members(&["epoch", "early", "late"]));
    }

    #[test]
    fn test_numeric_sort_accepts_quoted_and_null_numbers() {
        let sorted = sort_by_values(
            members(&["a", "b", "c"]),
            values(&[Some("\"12\""), Some("null"), Some("3.5")]),
            "t:*:F",
            false,
        )
        .unwrap();
        assert_eq!(sorted, members(&["b", "c", "a"]));
    }

    #[test]
    fn test_numeric_sort_treats_absent_as_zero() {
        let sorted = sort_by_values(
            members(&["a", "b", "c"]),
            values(&[Some("10"), None, Some("-3")]),
            "mediafile:*:TrackNumber",
            false,
        )
        .unwrap();
        assert_eq!(sorted, members(&["c", "b", "a"]));
    }

    #[test]
    fn test_numeric_sort_is_stable_for_ties() {
        let sorted = sort_by_values(
            members(&["a", "b", "c"]),
            values(&[Some("1"), Some("1"), Some("0")]),
            "t:*:F",
            false,
        )
        .unwrap();
        assert_eq!(sorted, members(&["c", "a", "b"]));
    }

    #[test]
    fn test_numeric_sort_rejects_text() {
        let result = sort_by_values(
            members(&["a"]),
            values(&[Some("\"abc\"")]),
            "album:*:Name",
            false,
        );
        match result {
            Err(StoreError::NonNumericSortValue { key, value }) => {
                assert_eq!(key, "album:a:Name");
                assert_eq!(value, "\"abc\"");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_window_applies_direction_before_offset() {
        let selected = window(members(&["a", "b", "c", "d"]), true, 1, Some(2));
        assert_eq!(selected, members(&["c", "b"]));
    }

    #[test]
    fn test_window_unbounded() {
        let selected = window(members(&["a", "b", "c"]), false, 1, None);
        assert_eq!(selected, members(&["b", "c"]));
    }

    #[test]
    fn test_window_offset_past_end() {
        assert!(window(members(&["a"]), false, 5, None).is_empty());
    }
}
