//! Field-rule checks for generated body validation.
//!
//! The generator emits one `validate_*` function per request message,
//! translating `rules` annotations into calls here. Violations accumulate so
//! one response names every failed check; the binder answers HTTP 400.
//!
//! Regex patterns are compiled once per process into a shared cache, so the
//! compiled machines are built with guaranteed-once semantics and reused
//! across requests and threads.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use super::error::FieldViolation;

/// Check string length bounds.
pub fn check_len(
    field: &str,
    value: &str,
    min: Option<u64>,
    max: Option<u64>,
    out: &mut Vec<FieldViolation>,
) {
    let len = value.chars().count() as u64;
    if let Some(min) = min {
        if len < min {
            out.push(FieldViolation::new(
                field,
                format!("must be at least {min} characters, got {len}"),
            ));
        }
    }
    if let Some(max) = max {
        if len > max {
            out.push(FieldViolation::new(
                field,
                format!("must be at most {max} characters, got {len}"),
            ));
        }
    }
}

/// Check a regex pattern, compiling it once per process.
///
/// Compiled patterns live in a process-wide cache; an invalid pattern never
/// matches and is reported once via `tracing::error!` rather than per
/// request.
pub fn check_pattern(field: &str, value: &str, pattern: &str, out: &mut Vec<FieldViolation>) {
    static PATTERNS: OnceLock<Mutex<HashMap<String, Option<regex::Regex>>>> = OnceLock::new();

    let cache = PATTERNS.get_or_init(Mutex::default);
    let mut cache = cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let compiled = cache
        .entry(pattern.to_string())
        .or_insert_with(|| match regex::Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!(pattern, error = %e, "invalid validation pattern");
                None
            }
        });
    if let Some(re) = compiled {
        if !re.is_match(value) {
            out.push(FieldViolation::new(
                field,
                format!("must match pattern '{pattern}'"),
            ));
        }
    }
}

/// Check membership in a declared value set.
pub fn check_in(field: &str, value: &str, allowed: &[&str], out: &mut Vec<FieldViolation>) {
    if !allowed.contains(&value) {
        out.push(FieldViolation::new(
            field,
            format!("must be one of [{}]", allowed.join(", ")),
        ));
    }
}

/// Check a well-known string format (`email`, `uuid`, `uri`).
pub fn check_well_known(
    field: &str,
    value: &str,
    format: &str,
    out: &mut Vec<FieldViolation>,
) {
    let ok = match format {
        "email" => super::headers::is_email_str(value),
        "uuid" => super::headers::is_uuid_str(value),
        "uri" => is_uri(value),
        _ => true,
    };
    if !ok {
        out.push(FieldViolation::new(
            field,
            format!("must be a valid {format}"),
        ));
    }
}

/// Check numeric bounds. Each bound is `(value, inclusive)`.
#[allow(clippy::float_cmp)]
pub fn check_range(
    field: &str,
    value: f64,
    lower: Option<(f64, bool)>,
    upper: Option<(f64, bool)>,
    out: &mut Vec<FieldViolation>,
) {
    if let Some((bound, inclusive)) = lower {
        let ok = if inclusive { value >= bound } else { value > bound };
        if !ok {
            let op = if inclusive { ">=" } else { ">" };
            out.push(FieldViolation::new(field, format!("must be {op} {bound}")));
        }
    }
    if let Some((bound, inclusive)) = upper {
        let ok = if inclusive { value <= bound } else { value < bound };
        if !ok {
            let op = if inclusive { "<=" } else { "<" };
            out.push(FieldViolation::new(field, format!("must be {op} {bound}")));
        }
    }
}

/// Check repeated-field cardinality bounds.
pub fn check_items(
    field: &str,
    len: usize,
    min: Option<u64>,
    max: Option<u64>,
    out: &mut Vec<FieldViolation>,
) {
    let len = len as u64;
    if let Some(min) = min {
        if len < min {
            out.push(FieldViolation::new(
                field,
                format!("must have at least {min} items, got {len}"),
            ));
        }
    }
    if let Some(max) = max {
        if len > max {
            out.push(FieldViolation::new(
                field,
                format!("must have at most {max} items, got {len}"),
            ));
        }
    }
}

/// Check presence of a required message field.
pub fn check_required<T>(field: &str, value: &Option<T>, out: &mut Vec<FieldViolation>) {
    if value.is_none() {
        out.push(FieldViolation::new(field, "is required"));
    }
}

/// Scheme-and-authority shape check; full URI grammar belongs to the handler.
fn is_uri(value: &str) -> bool {
    match value.split_once("://") {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && !rest.is_empty()
        }
        None => false,
    }
}
