//! Declared-header validation for generated binders.
//!
//! The generator emits one `&[HeaderSpec]` constant per method (service
//! headers merged with method overrides, sorted by name) and calls
//! [`validate_headers`] before touching the body. All violations are
//! collected so a single response names every problem.

use http::HeaderMap;

use super::error::{FieldViolation, ValidationError};

/// Declared wire type of a header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderKind {
    /// Free-form string (the default).
    #[default]
    String,
    /// Integral number.
    Integer,
    /// Floating-point number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Comma-separated list; every element must be non-empty.
    Array,
}

/// Declared format constraint of a string header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFormatKind {
    /// RFC 4122 UUID (`8-4-4-4-12` hex digits).
    Uuid,
    /// `local@domain` address.
    Email,
    /// RFC 3339 date-time.
    DateTime,
    /// RFC 3339 full-date (`2025-01-15`).
    Date,
    /// RFC 3339 partial-time (`09:30:00`, optional fraction).
    Time,
}

/// One declared header, as emitted into generated binding code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSpec {
    /// Header name as sent on the wire.
    pub name: &'static str,
    /// Declared wire type.
    pub kind: HeaderKind,
    /// Format constraint for string headers.
    pub format: Option<HeaderFormatKind>,
    /// Reject requests that omit the header.
    pub required: bool,
    /// Log usage; the header still validates.
    pub deprecated: bool,
}

/// Validate request headers against the merged declarations.
///
/// Checks run in spec order (the generator sorts by name), collecting every
/// violation: required presence, type parse, then format. Deprecated headers
/// that are present are logged via `tracing::warn!`.
///
/// # Errors
///
/// Returns a [`ValidationError`] with one violation per failed check; the
/// binder answers it with HTTP 400.
pub fn validate_headers(headers: &HeaderMap, specs: &[HeaderSpec]) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    for spec in specs {
        let value = headers.get(spec.name).and_then(|v| v.to_str().ok());

        let Some(value) = value else {
            if spec.required {
                violations.push(FieldViolation::new(
                    spec.name,
                    format!("required header '{}' is missing", spec.name),
                ));
            }
            continue;
        };

        if spec.deprecated {
            tracing::warn!(header = spec.name, "deprecated header used");
        }

        if let Some(violation) = check_kind(spec, value) {
            violations.push(violation);
            continue;
        }
        if let Some(violation) = check_format(spec, value) {
            violations.push(violation);
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(violations))
    }
}

fn check_kind(spec: &HeaderSpec, value: &str) -> Option<FieldViolation> {
    let ok = match spec.kind {
        HeaderKind::String => true,
        HeaderKind::Integer => value.parse::<i64>().is_ok(),
        HeaderKind::Number => value.parse::<f64>().is_ok(),
        HeaderKind::Boolean => matches!(value, "true" | "false"),
        HeaderKind::Array => !value.split(',').any(|e| e.trim().is_empty()),
    };
    if ok {
        None
    } else {
        let expected = match spec.kind {
            HeaderKind::String => "a string",
            HeaderKind::Integer => "an integer",
            HeaderKind::Number => "a number",
            HeaderKind::Boolean => "'true' or 'false'",
            HeaderKind::Array => "a comma-separated list with no empty elements",
        };
        Some(FieldViolation::new(
            spec.name,
            format!("header '{}' must be {expected}, got '{value}'", spec.name),
        ))
    }
}

fn check_format(spec: &HeaderSpec, value: &str) -> Option<FieldViolation> {
    let format = spec.format?;
    let (ok, name) = match format {
        HeaderFormatKind::Uuid => (is_uuid(value), "UUID"),
        HeaderFormatKind::Email => (is_email(value), "email address"),
        HeaderFormatKind::DateTime => (is_date_time(value), "RFC 3339 date-time"),
        HeaderFormatKind::Date => (is_date(value), "date (YYYY-MM-DD)"),
        HeaderFormatKind::Time => (is_time(value), "time (HH:MM:SS)"),
    };
    if ok {
        None
    } else {
        Some(FieldViolation::new(
            spec.name,
            format!(
                "header '{}' must be a valid {name}, got '{value}'",
                spec.name,
            ),
        ))
    }
}

/// `8-4-4-4-12` lowercase/uppercase hex groups.
pub(crate) fn is_uuid_str(value: &str) -> bool {
    is_uuid(value)
}

/// See [`is_email`]; shared with the body-rule checks.
pub(crate) fn is_email_str(value: &str) -> bool {
    is_email(value)
}

fn is_uuid(value: &str) -> bool {
    let groups: Vec<&str> = value.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8usize, 4, 4, 4, 12])
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

/// One `@`, non-empty local part, dotted domain. Deliberately shallow — the
/// full grammar belongs to the handler, not the binder.
fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.contains(char::is_whitespace)
}

#[cfg(feature = "serde")]
fn is_date_time(value: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

#[cfg(not(feature = "serde"))]
fn is_date_time(value: &str) -> bool {
    // Shape check without chrono: date 'T' time with zone suffix.
    value.len() >= 20 && value.as_bytes().get(10) == Some(&b'T') && is_date(&value[..10])
}

#[cfg(feature = "serde")]
fn is_date(value: &str) -> bool {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(not(feature = "serde"))]
fn is_date(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    parts.len() == 3
        && parts
            .iter()
            .zip([4usize, 2, 2])
            .all(|(p, len)| p.len() == len && p.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(feature = "serde")]
fn is_time(value: &str) -> bool {
    chrono::NaiveTime::parse_from_str(value, "%H:%M:%S%.f").is_ok()
}

#[cfg(not(feature = "serde"))]
fn is_time(value: &str) -> bool {
    let parts: Vec<&str> = value.splitn(3, ':').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty())
}
