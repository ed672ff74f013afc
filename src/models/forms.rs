//! Coercion helpers shared by the media and library forms.
//!
//! Clients send numbers either as JSON numbers or as strings (HTML form
//! fields posted through a JSON shim), and blank strings mean "unset".

use serde_json::Value;

use crate::domain::FieldError;

const NOT_AN_INTEGER: &str = "Enter a whole number.";
const NOT_A_NUMBER: &str = "Enter a number.";

/// Reads an optional integer field.
pub fn optional_integer(field: &str, value: Option<&Value>) -> Result<Option<i32>, FieldError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| FieldError::new(field, NOT_AN_INTEGER)),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<i32>()
                .map(Some)
                .map_err(|_| FieldError::new(field, NOT_AN_INTEGER))
        }
        Some(_) => Err(FieldError::new(field, NOT_AN_INTEGER)),
    }
}

/// Reads an optional decimal field.
pub fn optional_decimal(field: &str, value: Option<&Value>) -> Result<Option<f64>, FieldError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| FieldError::new(field, NOT_A_NUMBER)),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| FieldError::new(field, NOT_A_NUMBER))
        }
        Some(_) => Err(FieldError::new(field, NOT_A_NUMBER)),
    }
}

/// Trims free text; blank becomes `None`.
#[must_use]
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_accept_numbers_and_numeric_strings() {
        assert_eq!(optional_integer("year", Some(&json!(1999))).unwrap(), Some(1999));
        assert_eq!(optional_integer("year", Some(&json!(" 2024 "))).unwrap(), Some(2024));
        assert_eq!(optional_integer("year", Some(&json!(""))).unwrap(), None);
        assert_eq!(optional_integer("year", None).unwrap(), None);
    }

    #[test]
    fn integers_reject_fractions_and_garbage() {
        let err = optional_integer("seasons", Some(&json!(1.5))).unwrap_err();
        assert_eq!(err.field, "seasons");
        assert!(optional_integer("seasons", Some(&json!("two"))).is_err());
        assert!(optional_integer("seasons", Some(&json!(true))).is_err());
        assert!(optional_integer("seasons", Some(&json!(i64::MAX))).is_err());
    }

    #[test]
    fn decimals_accept_strings() {
        assert_eq!(optional_decimal("rate", Some(&json!("4.25"))).unwrap(), Some(4.25));
        assert_eq!(optional_decimal("rate", Some(&json!(3))).unwrap(), Some(3.0));
        assert!(optional_decimal("rate", Some(&json!("NaN"))).is_err());
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(optional_text(Some("  hi ")), Some("hi".to_string()));
        assert_eq!(optional_text(Some("   ")), None);
    }
}
