//! Typed path-variable and query-parameter binding.
//!
//! Parse failures surface as [`ValidationError`] so the binder answers them
//! with HTTP 400 and a violation naming the offending variable or parameter.

use std::collections::HashMap;
use std::str::FromStr;

use super::error::ValidationError;

/// Join a base path and a method path, normalizing each to a single leading
/// slash with no duplicate or trailing slashes. Both empty yields `/`.
///
/// Generated registration code routes under
/// `join_path(&base_override_or_default, method_path)`, matching the path
/// the route was derived with at generation time.
#[must_use]
pub fn join_path(base: &str, method: &str) -> String {
    let base = normalize(base);
    let method = normalize(method);
    if method == "/" {
        return base;
    }
    if base == "/" {
        return method;
    }
    format!("{base}{method}")
}

fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    out.push('/');
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}

/// Parse a path variable into its typed field.
///
/// # Errors
///
/// Returns a single-violation [`ValidationError`] naming the variable when
/// the substring does not parse as `T`.
pub fn parse_path_var<T>(name: &str, raw: &str) -> Result<T, ValidationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| {
        ValidationError::single(name, format!("invalid path variable '{name}': {e}"))
    })
}

/// Decoded query string: last occurrence wins per key, order otherwise
/// irrelevant because parameters are looked up by name.
#[derive(Debug, Default, Clone)]
pub struct QueryMap(HashMap<String, String>);

impl QueryMap {
    /// Decode a raw query string (without the leading `?`). `None` and `""`
    /// both mean no parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the query string is not valid
    /// percent-encoded form data.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            return Ok(Self::default());
        };
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw).map_err(|e| {
            ValidationError::single("query", format!("malformed query string: {e}"))
        })?;
        Ok(Self(pairs.into_iter().collect()))
    }

    /// Raw value for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Parse parameter `name` into its typed field.
    ///
    /// Returns `Ok(None)` when the parameter is absent and not required —
    /// the generated binder leaves the field at its proto zero value.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a required parameter is missing or
    /// a present value does not parse as `T`.
    pub fn typed<T>(&self, name: &str, required: bool) -> Result<Option<T>, ValidationError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(raw) => raw.parse().map(Some).map_err(|e: T::Err| {
                ValidationError::single(
                    name,
                    format!("invalid query parameter '{name}': {e}"),
                )
            }),
            None if required => Err(ValidationError::single(
                name,
                format!("required query parameter '{name}' is missing"),
            )),
            None => Ok(None),
        }
    }
}
