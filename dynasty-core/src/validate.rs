//! Field-level validation run before every persist.
//!
//! Each writable type implements [`Validate`]; the check collects every failing
//! field instead of stopping at the first one so API callers can fix a whole
//! form at once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{FieldError, ValidationErrors};

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("valid hex color pattern"));

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Accumulates field failures for one value.
#[derive(Debug, Default)]
pub struct Checker {
    errors: ValidationErrors,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>, value: impl Serialize) -> &mut Self {
        self.errors.push(FieldError::new(field, message, value));
        self
    }

    /// Required string: non-empty once trimmed and at most `max` characters.
    pub fn required(&mut self, field: &str, label: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            return self.fail(field, format!("{label} is required"), value);
        }
        self.max_len(field, label, value, max)
    }

    pub fn max_len(&mut self, field: &str, label: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().chars().count() > max {
            self.fail(field, format!("{label} cannot exceed {max} characters"), value);
        }
        self
    }

    pub fn range<T>(&mut self, field: &str, label: &str, value: T, min: T, max: T) -> &mut Self
    where
        T: PartialOrd + Copy + std::fmt::Display + Serialize,
    {
        if value < min {
            self.fail(field, format!("{label} must be at least {min}"), value);
        } else if value > max {
            self.fail(field, format!("{label} cannot exceed {max}"), value);
        }
        self
    }

    pub fn hex_color(&mut self, field: &str, value: &str) -> &mut Self {
        if !HEX_COLOR.is_match(value) {
            self.fail(field, "Colors must be valid hex color codes (e.g., #FF0000)", value);
        }
        self
    }

    pub fn merge(&mut self, prefix: &str, result: Result<(), ValidationErrors>) -> &mut Self {
        if let Err(nested) = result {
            for mut err in nested.0 {
                err.field = format!("{prefix}.{}", err.field);
                self.errors.push(err);
            }
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        self.errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failure() {
        let mut check = Checker::new();
        check
            .required("name", "Name", "   ", 10)
            .max_len("city", "City", "abcdefghijk", 10)
            .range("year", "Year", 1800, 1900, 2100);

        let errors = check.finish().unwrap_err();
        assert_eq!(errors.0.len(), 3);
        assert_eq!(errors.0[0].message, "Name is required");
        assert_eq!(errors.0[1].message, "City cannot exceed 10 characters");
        assert_eq!(errors.0[2].message, "Year must be at least 1900");
    }

    #[test]
    fn accepts_short_and_long_hex_colors() {
        let mut check = Checker::new();
        check.hex_color("colors[0]", "#FFF").hex_color("colors[1]", "#9e1b32");
        assert!(check.finish().is_ok());

        let mut check = Checker::new();
        check.hex_color("colors[0]", "red").hex_color("colors[1]", "#12345");
        assert_eq!(check.finish().unwrap_err().0.len(), 2);
    }

    #[test]
    fn nested_failures_are_prefixed() {
        let inner = ValidationErrors::single("week", "Week cannot exceed 15", 16);
        let mut check = Checker::new();
        check.merge("games[2]", Err(inner));

        let errors = check.finish().unwrap_err();
        assert_eq!(errors.0[0].field, "games[2].week");
    }
}
