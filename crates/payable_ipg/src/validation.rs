//! Format validations for gateway request fields.

use error_stack::report;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{CustomResult, ValidationError};

/// Checks the gateway amount form, a base-10 string with exactly two
/// fraction digits. `field_name` tags the raised error.
pub fn validate_amount_format(
    field_name: &'static str,
    amount: &str,
) -> CustomResult<(), ValidationError> {
    #[deny(clippy::invalid_regex)]
    static AMOUNT_REGEX: Lazy<Option<Regex>> = Lazy::new(|| match Regex::new(r"^\d+\.\d{2}$") {
        Ok(regex) => Some(regex),
        Err(_error) => None,
    });
    let amount_regex = match AMOUNT_REGEX.as_ref() {
        Some(regex) => Ok(regex),
        None => Err(report!(ValidationError::InvalidValue {
            message: "Invalid regex expression".into(),
        })),
    }?;

    if !amount_regex.is_match(amount) {
        return Err(report!(ValidationError::IncorrectValueProvided {
            field_name
        }));
    }

    Ok(())
}

/// Checks the three-letter uppercase currency code form.
pub fn validate_currency_code(currency: &str) -> CustomResult<(), ValidationError> {
    #[deny(clippy::invalid_regex)]
    static CURRENCY_REGEX: Lazy<Option<Regex>> = Lazy::new(|| match Regex::new(r"^[A-Z]{3}$") {
        Ok(regex) => Some(regex),
        Err(_error) => None,
    });
    let currency_regex = match CURRENCY_REGEX.as_ref() {
        Some(regex) => Ok(regex),
        None => Err(report!(ValidationError::InvalidValue {
            message: "Invalid regex expression".into(),
        })),
    }?;

    if !currency_regex.is_match(currency) {
        return Err(report!(ValidationError::IncorrectValueProvided {
            field_name: "currencyCode"
        }));
    }

    Ok(())
}

/// Performs a simple validation against the provided email address.
pub fn validate_email(email: &str) -> CustomResult<(), ValidationError> {
    #[deny(clippy::invalid_regex)]
    static EMAIL_REGEX: Lazy<Option<Regex>> = Lazy::new(|| {
        match Regex::new(
            r"^(?i)[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)*$",
        ) {
            Ok(regex) => Some(regex),
            Err(_error) => None,
        }
    });
    let email_regex = match EMAIL_REGEX.as_ref() {
        Some(regex) => Ok(regex),
        None => Err(report!(ValidationError::InvalidValue {
            message: "Invalid regex expression".into(),
        })),
    }?;

    const EMAIL_MAX_LENGTH: usize = 319;
    if email.is_empty() || email.chars().count() > EMAIL_MAX_LENGTH {
        return Err(report!(ValidationError::InvalidValue {
            message: "Email must not be empty or greater than 319 characters".into(),
        }));
    }

    if !email_regex.is_match(email) {
        return Err(report!(ValidationError::InvalidValue {
            message: "Invalid email address format".into(),
        }));
    }

    Ok(())
}

/// Rejects an empty required text field.
pub fn required_text(field_name: &'static str, value: &str) -> CustomResult<(), ValidationError> {
    if value.is_empty() {
        return Err(report!(ValidationError::MissingRequiredField {
            field_name
        }));
    }
    Ok(())
}
