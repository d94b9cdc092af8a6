//! Name conversions shared by the emitters.

/// Convert `CamelCase` to `snake_case` (matches prost-build output for
/// method and field names).
pub(crate) fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_uppercase() {
            if !result.is_empty() {
                // Insert underscore before uppercase when:
                // - preceded by lowercase (e.g., "List|U" → "list_u")
                // - preceded by uppercase followed by lowercase (e.g., "OA|u" → "o_au")
                let next_is_lower = chars.peek().is_some_and(|n| n.is_lowercase());
                let prev_is_lower = result.chars().last().is_some_and(char::is_lowercase);
                if prev_is_lower || next_is_lower {
                    result.push('_');
                }
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert `snake_case` (or `SCREAMING_SNAKE`) to `PascalCase`.
pub(crate) fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = true;
    for c in s.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

/// Convert `snake_case` to `camelCase` (TypeScript identifiers).
pub(crate) fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => pascal,
    }
}

/// Identifier for a declared header: strip a leading `X-`, split on `-`,
/// join in `snake_case`. `X-Api-Key` → `api_key`, so the generated helpers
/// are `with_api_key` (Rust) and `withApiKey` (TypeScript).
pub(crate) fn header_ident(name: &str) -> String {
    let stripped = name.strip_prefix("X-").or_else(|| name.strip_prefix("x-")).unwrap_or(name);
    stripped
        .split('-')
        .filter(|s| !s.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Rust enum variant for a proto enum value, prost-style: the enum name
/// prefix is stripped when present, the rest is `PascalCase`.
/// (`OrderStatus`, `ORDER_STATUS_OPEN`) → `Open`.
pub(crate) fn enum_variant_name(enum_name: &str, value_name: &str) -> String {
    let prefix = format!("{}_", to_snake_case(enum_name).to_ascii_uppercase());
    let stripped = value_name.strip_prefix(&prefix).unwrap_or(value_name);
    // A stripped name must still be a valid identifier; numbers can't lead.
    let candidate = to_pascal_case(stripped);
    if candidate.chars().next().is_some_and(char::is_numeric) {
        to_pascal_case(value_name)
    } else {
        candidate
    }
}

/// Escape a string for embedding in a generated double-quoted literal.
pub(crate) fn str_lit(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape a Rust keyword collision the way prost does (`type` → `r#type`).
pub(crate) fn rust_field_ident(name: &str) -> String {
    const KEYWORDS: &[&str] = &[
        "as", "async", "await", "box", "break", "const", "continue", "crate", "dyn", "else",
        "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
        "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait",
        "true", "type", "unsafe", "use", "where", "while", "yield",
    ];
    if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}
