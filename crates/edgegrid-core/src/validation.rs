//! Request validation helpers.
//!
//! Requests derive [`validator::Validate`]; this module turns failures into
//! [`Error::StructValidation`] with a stable, field-sorted message and hosts
//! the custom validators shared by the service crates.

use crate::error::{Error, Result};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Message used for missing required values.
pub const BLANK: &str = "cannot be blank";

/// Validate a request before it is dispatched.
///
/// # Errors
///
/// Returns [`Error::StructValidation`] listing every invalid field.
pub fn validate<T>(request: &T) -> Result<()>
where
    T: Validate,
{
    request.validate().map_err(Error::from)
}

/// Render validation errors as `field: message; field: message`.
#[must_use]
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors.iter().map(message).collect();
            format!("{field}: {}", messages.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

fn message(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map_or_else(|| error.code.to_string(), ToString::to_string)
}

/// Reject empty strings.
///
/// # Errors
///
/// Returns a `required` validation error when `value` is empty.
pub fn required(value: &str) -> std::result::Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed(BLANK)));
    }
    Ok(())
}

/// Reject values outside an allowed set. Empty values are reported as blank.
///
/// # Errors
///
/// Returns a `required` or `one_of` validation error.
pub fn one_of(value: &str, allowed: &[&str]) -> std::result::Result<(), ValidationError> {
    required(value)?;
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ValidationError::new("one_of").with_message(Cow::Owned(format!(
        "must be one of: {}",
        allowed.join(", ")
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(custom(function = "required"))]
        name: String,
        #[validate(range(min = 1, message = "cannot be blank"))]
        version: i64,
        #[validate(length(min = 1, message = "cannot be blank"))]
        emails: Vec<String>,
    }

    #[test]
    fn valid_request_passes() {
        let sample = Sample {
            name: "inc_1".into(),
            version: 1,
            emails: vec!["a@example.com".into()],
        };
        assert!(validate(&sample).is_ok());
    }

    #[test]
    fn every_missing_field_is_reported_sorted() {
        let sample = Sample {
            name: String::new(),
            version: 0,
            emails: vec![],
        };
        let err = validate(&sample).unwrap_err();
        assert_eq!(
            err,
            Error::StructValidation(
                "emails: cannot be blank; name: cannot be blank; version: cannot be blank"
                    .to_string()
            )
        );
    }

    #[test]
    fn one_of_checks_membership() {
        let allowed = ["hostname", "propertyName"];
        assert!(one_of("hostname", &allowed).is_ok());

        let err = one_of("cpcode", &allowed).unwrap_err();
        assert_eq!(err.code, "one_of");
        assert_eq!(
            err.message.as_deref(),
            Some("must be one of: hostname, propertyName")
        );

        let err = one_of("", &allowed).unwrap_err();
        assert_eq!(err.code, "required");
    }
}
