pub mod company;
pub mod job;
pub mod user;

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use validator::{Validate, ValidationErrors};

use crate::services::ServiceError;

pub use company::{Company, CompanyCreate, CompanyDetail, CompanyFilters, CompanyJob, CompanySummary, CompanyUpdate};
pub use job::{Job, JobCreate, JobFilters, JobSummary, JobUpdate};
pub use user::{Login, User, UserCreate, UserSummary, UserUpdate};

/// A request body with a fixed set of accepted fields.
///
/// `FIELDS` doubles as the projection whitelist and as the order validation
/// messages are reported in. `NOT_NULL` lists optional fields that may be
/// omitted but not sent as `null`, since `null` deserializes to `None` and
/// would otherwise pass validation.
pub trait Payload: Validate + DeserializeOwned {
    const FIELDS: &'static [&'static str];
    const NOT_NULL: &'static [&'static str] = &[];

    fn from_json(body: &Value) -> Result<Self, ServiceError> {
        if !body.is_object() {
            return Err(ServiceError::Validation(vec!["request body must be a JSON object".to_string()]));
        }
        let nulls: Vec<String> = Self::NOT_NULL
            .iter()
            .filter(|field| body.get(**field).is_some_and(Value::is_null))
            .map(|field| format!("{} must not be null", field))
            .collect();
        if !nulls.is_empty() {
            return Err(ServiceError::Validation(nulls));
        }
        let payload: Self = serde_json::from_value(body.clone())
            .map_err(|e| ServiceError::Validation(vec![e.to_string()]))?;
        payload
            .validate()
            .map_err(|errors| ServiceError::Validation(validation_messages(&errors, Self::FIELDS)))?;
        Ok(payload)
    }
}

/// Flatten validator output into one message per failed check, in `fields` order
pub fn validation_messages(errors: &ValidationErrors, fields: &[&str]) -> Vec<String> {
    let field_errors = errors.field_errors();
    let mut messages = Vec::new();
    for field in fields {
        for (name, errs) in field_errors.iter() {
            if AsRef::<str>::as_ref(name) != *field {
                continue;
            }
            for e in errs.iter() {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                messages.push(message);
            }
        }
    }
    messages
}

/// Read an optional numeric query parameter. Query strings arrive as text, so
/// numeric strings are accepted; anything else is a validation error.
pub(crate) fn numeric_param(params: &Map<String, Value>, key: &str) -> Result<Option<Number>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(Value::String(s)) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Some(Number::from(i)));
            }
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Some)
                .ok_or_else(|| format!("{} must be a number", key))
        }
        Some(_) => Err(format!("{} must be a number", key)),
    }
}

pub(crate) fn text_param(params: &Map<String, Value>, key: &str) -> Option<String> {
    match params.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn numeric_params_accept_numeric_text() {
        let p = params(json!({ "min": "10", "max": " 2.5 ", "n": 7 }));
        assert_eq!(numeric_param(&p, "min").unwrap(), Some(Number::from(10)));
        assert_eq!(numeric_param(&p, "max").unwrap().and_then(|n| n.as_f64()), Some(2.5));
        assert_eq!(numeric_param(&p, "n").unwrap(), Some(Number::from(7)));
        assert_eq!(numeric_param(&p, "absent").unwrap(), None);
    }

    #[test]
    fn numeric_params_reject_text() {
        let p = params(json!({ "min_employees": "ten" }));
        assert_eq!(
            numeric_param(&p, "min_employees").unwrap_err(),
            "min_employees must be a number"
        );
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        let err = CompanyCreate::from_json(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
