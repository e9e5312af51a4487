//! Schema-driven coercion of positional arguments.

use serde_json::{Map, Number, Value};

use crate::domain::{FieldType, Schema, ValidationError};

use super::context::AgentInput;

/// Numeric parse used for `number` fields. `None` when the text is not a
/// finite number.
fn parse_number(raw: &str) -> Option<Value> {
    let parsed: f64 = raw.trim().parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    if parsed.fract() == 0.0 && parsed.abs() < i64::MAX as f64 {
        return Some(Value::from(parsed as i64));
    }
    Number::from_f64(parsed).map(Value::Number)
}

fn coerce_one(
    field: &str,
    field_type: &FieldType,
    raw: &str,
    strict_numbers: bool,
) -> Result<Value, ValidationError> {
    Ok(match field_type {
        FieldType::String => Value::String(raw.to_string()),
        FieldType::Number => match parse_number(raw) {
            Some(number) => number,
            None if strict_numbers => {
                return Err(ValidationError::InvalidNumber {
                    field: field.to_string(),
                    value: raw.to_string(),
                })
            }
            None => Value::from(0),
        },
        FieldType::Boolean => Value::Bool(raw.eq_ignore_ascii_case("true")),
        FieldType::Array => Value::Array(
            raw.split(',')
                .map(|item| Value::String(item.trim().to_string()))
                .collect(),
        ),
        FieldType::Object | FieldType::Other(_) => Value::String(raw.to_string()),
    })
}

/// Map positional `args` onto `schema` fields in insertion order.
///
/// One argument per field. Missing optional fields are left out of the
/// record; a missing required field fails the whole coercion. Surplus
/// arguments are ignored. Unparsable numbers become `0` unless
/// `strict_numbers` is set.
pub fn coerce_arguments(
    schema: &Schema,
    args: &[String],
    strict_numbers: bool,
) -> Result<AgentInput, ValidationError> {
    let mut fields = Map::new();

    for (index, (name, spec)) in schema.iter().enumerate() {
        match args.get(index) {
            Some(raw) => {
                let value = coerce_one(name, &spec.field_type, raw, strict_numbers)?;
                fields.insert(name.to_string(), value);
            }
            None if spec.required => {
                return Err(ValidationError::MissingParameter {
                    field: name.to_string(),
                })
            }
            None => {}
        }
    }

    if args.len() > schema.len() {
        tracing::debug!(
            extra = args.len() - schema.len(),
            "ignoring positional arguments beyond the input schema"
        );
    }

    Ok(AgentInput::from_map(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldSpec;
    use serde_json::json;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn schema() -> Schema {
        Schema::new()
            .with_field("query", FieldSpec::required(FieldType::String))
            .with_field("count", FieldSpec::required(FieldType::Number))
            .with_field("verbose", FieldSpec::optional(FieldType::Boolean))
            .with_field("tags", FieldSpec::optional(FieldType::Array))
            .with_field("extra", FieldSpec::optional(FieldType::Object))
    }

    #[test]
    fn test_coerces_each_type() {
        let input = coerce_arguments(
            &schema(),
            &args(&["AAPL", "12.5", "TRUE", " a, b ,c", "{\"k\":1}"]),
            false,
        )
        .unwrap();

        assert_eq!(
            input.to_value(),
            json!({
                "query": "AAPL",
                "count": 12.5,
                "verbose": true,
                "tags": ["a", "b", "c"],
                "extra": "{\"k\":1}",
            })
        );
    }

    #[test]
    fn test_integral_numbers_stay_integers() {
        let input = coerce_arguments(&schema(), &args(&["q", " 42 "]), false).unwrap();
        assert_eq!(input.get("count"), Some(&json!(42)));
    }

    #[test]
    fn test_unparsable_number_defaults_to_zero() {
        let schema = Schema::new().with_field("count", FieldSpec::required(FieldType::Number));
        for raw in ["abc", "", "NaN", "inf"] {
            let input = coerce_arguments(&schema, &args(&[raw]), false).unwrap();
            assert_eq!(input.get("count"), Some(&json!(0)), "input {raw:?}");
        }
    }

    #[test]
    fn test_strict_numbers_fail_fast() {
        let schema = Schema::new().with_field("count", FieldSpec::required(FieldType::Number));
        let err = coerce_arguments(&schema, &args(&["abc"]), true).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidNumber {
                field: "count".to_string(),
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_boolean_is_exact_true_only() {
        let schema = Schema::new().with_field("flag", FieldSpec::required(FieldType::Boolean));
        for (raw, expected) in [("true", true), ("True", true), ("yes", false), ("1", false)] {
            let input = coerce_arguments(&schema, &args(&[raw]), false).unwrap();
            assert_eq!(input.bool("flag"), Some(expected), "input {raw:?}");
        }
    }

    #[test]
    fn test_missing_required_fails() {
        let err = coerce_arguments(&schema(), &args(&["only-query"]), false).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingParameter {
                field: "count".to_string()
            }
        );
    }

    #[test]
    fn test_missing_optional_is_omitted() {
        let input = coerce_arguments(&schema(), &args(&["q", "1"]), false).unwrap();
        assert!(!input.contains("verbose"));
        assert!(!input.contains("tags"));
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn test_unknown_type_passes_through_as_string() {
        let schema = Schema::new().with_field(
            "when",
            FieldSpec::required(FieldType::Other("date".to_string())),
        );
        let input = coerce_arguments(&schema, &args(&["2026-10-19"]), false).unwrap();
        assert_eq!(input.str("when"), Some("2026-10-19"));
    }

    #[test]
    fn test_empty_schema_ignores_arguments() {
        let input = coerce_arguments(&Schema::new(), &args(&["x", "y"]), false).unwrap();
        assert!(input.is_empty());
    }
}
