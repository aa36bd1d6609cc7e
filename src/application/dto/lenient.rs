//! Lenient field parsing for user-entered and third-party numbers
//!
//! Form fields arrive as numbers, numeric strings, or junk. Junk never
//! fails the request: it becomes `None` and the caller substitutes its
//! configured default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Leading-integer parse: optional sign followed by digits, rest ignored
///
/// `"12"` → 12, `" -3 hp"` → -3, `"abc"` → None.
pub fn parse_int(raw: &str) -> Option<i32> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().unwrap_or(i64::MAX);
    Some(saturate(sign.saturating_mul(magnitude)))
}

/// A parsed value, with zero and junk both replaced by `default`
///
/// Used for fields where zero is never meaningful (max HP, armor class).
pub fn nonzero_or(value: Option<i32>, default: i32) -> i32 {
    value.filter(|v| *v != 0).unwrap_or(default)
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn value_to_int(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(saturate)
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i32)),
        Value::String(s) => parse_int(s),
        _ => None,
    }
}

/// `deserialize_with` helper: number or numeric string, else `None`
pub fn int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_int))
}

/// Armor class as published by catalogs: a number, or a list whose first
/// entry is a number or an object with a `value` field
pub fn armor_class<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(entries)) => entries.first().and_then(|first| match first {
            Value::Object(map) => map.get("value").and_then(value_to_int),
            other => value_to_int(other),
        }),
        Some(other) => value_to_int(&other),
        None => None,
    })
}

/// Free text; numbers are rendered, other shapes dropped
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "int")]
        max_hp: Option<i32>,
        #[serde(default, deserialize_with = "armor_class")]
        armor_class: Option<i32>,
    }

    #[test]
    fn test_parse_int_like_a_form_field() {
        assert_eq!(parse_int("12"), Some(12));
        assert_eq!(parse_int("  -3 hp"), Some(-3));
        assert_eq!(parse_int("+4"), Some(4));
        assert_eq!(parse_int("7.9"), Some(7));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("99999999999999999999"), Some(i32::MAX));
    }

    #[test]
    fn test_nonzero_or_default() {
        assert_eq!(nonzero_or(Some(0), 10), 10);
        assert_eq!(nonzero_or(None, 10), 10);
        assert_eq!(nonzero_or(Some(-4), 10), -4);
        assert_eq!(nonzero_or(Some(15), 10), 15);
    }

    #[test]
    fn test_junk_becomes_none() {
        let form: Form = serde_json::from_str(r#"{"max_hp": "lots", "armor_class": true}"#)
            .expect("junk should not fail");
        assert_eq!(form.max_hp, None);
        assert_eq!(form.armor_class, None);

        let form: Form = serde_json::from_str("{}").expect("missing fields are fine");
        assert_eq!(form.max_hp, None);
    }

    #[test]
    fn test_numbers_and_strings_accepted() {
        let form: Form = serde_json::from_str(r#"{"max_hp": "27", "armor_class": 14}"#)
            .expect("valid");
        assert_eq!(form.max_hp, Some(27));
        assert_eq!(form.armor_class, Some(14));

        let form: Form = serde_json::from_str(r#"{"max_hp": 8.6}"#).expect("valid");
        assert_eq!(form.max_hp, Some(8));
    }

    #[test]
    fn test_catalog_armor_class_shapes() {
        let form: Form =
            serde_json::from_str(r#"{"armor_class": [{"type": "natural", "value": 17}]}"#)
                .expect("valid");
        assert_eq!(form.armor_class, Some(17));

        let form: Form = serde_json::from_str(r#"{"armor_class": [12]}"#).expect("valid");
        assert_eq!(form.armor_class, Some(12));

        let form: Form = serde_json::from_str(r#"{"armor_class": []}"#).expect("valid");
        assert_eq!(form.armor_class, None);
    }
}
