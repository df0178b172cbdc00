use chrono::{Datelike, Utc};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

pub fn validate_required(value: &String) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("is_required");
        error.message = Some(std::borrow::Cow::from("is required"));
        Err(error)
    } else {
        Ok(())
    }
}

pub fn validate_not_future_year(year: i32) -> Result<(), ValidationError> {
    let current = Utc::now().year();
    if year > current {
        let mut error = ValidationError::new("future_year");
        error.message = Some(std::borrow::Cow::from(format!("cannot be after {}", current)));
        Err(error)
    } else {
        Ok(())
    }
}

/// `license_plate` -> `licensePlate`, so messages name fields the way clients send them.
pub fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Flattens validator errors into `"<path> <message>"` lines, sorted for stable output.
pub fn flatten_validation_errors(errors: &ValidationErrors, prefix: &str) -> Vec<String> {
    let mut messages = Vec::new();
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            camel_case(field)
        } else {
            format!("{}.{}", prefix, camel_case(field))
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("is invalid ({})", err.code));
                    messages.push(format!("{} {}", path, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                messages.extend(flatten_validation_errors(inner, &path));
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    messages.extend(flatten_validation_errors(inner, &format!("{}[{}]", path, index)));
                }
            }
        }
    }
    messages.sort();
    messages
}
