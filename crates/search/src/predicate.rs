//! Filter predicate construction.
//!
//! Turns a mapping of field name to scalar value into a structured filter
//! expression the search backend can evaluate. Values are embedded in
//! single quotes, so any quote inside a value must be doubled before
//! embedding; otherwise the predicate is malformed and user input could
//! alter its structure.

use std::collections::BTreeMap;

/// Build a filter predicate from a field→value mapping.
///
/// Empty and whitespace-only values are dropped. Each retained pair emits
/// a `field eq 'value'` equality clause with single quotes in the value
/// doubled; clauses are joined with ` and `.
///
/// Returns `None` when no clause remains. Callers must treat `None` as
/// "no filtering", never as "match nothing".
pub fn build_predicate(filters: &BTreeMap<String, String>) -> Option<String> {
    let clauses: Vec<String> = filters
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(field, value)| format!("{} eq '{}'", field, value.replace('\'', "''")))
        .collect();

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" and "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_map_yields_none() {
        assert_eq!(build_predicate(&BTreeMap::new()), None);
    }

    #[test]
    fn test_blank_values_are_dropped() {
        let f = filters(&[("author", ""), ("category", "   ")]);
        assert_eq!(build_predicate(&f), None);
    }

    #[test]
    fn test_single_clause() {
        let f = filters(&[("category", "billing")]);
        assert_eq!(
            build_predicate(&f),
            Some("category eq 'billing'".to_string())
        );
    }

    #[test]
    fn test_clauses_joined_with_and() {
        let f = filters(&[("author", "Jane Doe"), ("category", "billing")]);
        assert_eq!(
            build_predicate(&f),
            Some("author eq 'Jane Doe' and category eq 'billing'".to_string())
        );
    }

    #[test]
    fn test_quotes_are_doubled() {
        let f = filters(&[("author", "O'Brien")]);
        assert_eq!(build_predicate(&f), Some("author eq 'O''Brien'".to_string()));
    }

    #[test]
    fn test_no_unescaped_quote_survives() {
        let f = filters(&[("author", "a'b'c")]);
        let predicate = build_predicate(&f).unwrap();

        // Strip the delimiting quotes; every interior quote must be doubled.
        let value = predicate
            .strip_prefix("author eq '")
            .and_then(|s| s.strip_suffix('\''))
            .unwrap();
        assert_eq!(value, "a''b''c");
        assert!(!value.replace("''", "").contains('\''));
    }

    #[test]
    fn test_mixed_blank_and_real_values() {
        let f = filters(&[("author", ""), ("category", "returns")]);
        assert_eq!(
            build_predicate(&f),
            Some("category eq 'returns'".to_string())
        );
    }
}
