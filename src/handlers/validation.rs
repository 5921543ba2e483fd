use std::collections::HashMap;

use crate::error::ApiError;

/// Collects per-field messages and turns them into a single 400 response.
/// Only the first problem reported for a field is kept.
#[derive(Debug, Default)]
pub struct Validator {
    errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors
                .entry(field.to_string())
                .or_insert_with(|| message.into());
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, format!("{} is required", field))
    }

    /// Character count within `min..=max`
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.chars().count();
        self.check(
            (min..=max).contains(&len),
            field,
            format!("{} must be between {} and {} characters", field, min, max),
        )
    }

    pub fn max_length(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        self.check(
            value.chars().count() <= max,
            field,
            format!("{} must be at most {} characters", field, max),
        )
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(is_email(value), field, format!("{} must be a valid email address", field))
    }

    pub fn non_negative(&mut self, field: &str, value: Option<i32>) -> &mut Self {
        self.check(
            value.map_or(true, |v| v >= 0),
            field,
            format!("{} must not be negative", field),
        )
    }

    pub fn positive_id(&mut self, field: &str, value: i64) -> &mut Self {
        self.check(value > 0, field, format!("{} is required", field))
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(ApiError::validation_error(
            "Validation failed",
            Some(std::mem::take(&mut self.errors)),
        ))
    }
}

/// `local@domain.tld` with no whitespace
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
