//! Deterministic names derived from identifiers.

use ironwire_common::constants::ARTIFACT_EXTENSION;
use ironwire_common::types::Identifier;

/// Factory method name of `id`.
///
/// Path separators become `__`, so `app::Service` maps to `app__Service`.
/// Any other run of punctuation becomes a single `_`.
#[must_use]
pub fn factory_name(id: &Identifier) -> String {
    let mut name = String::with_capacity(id.as_str().len());
    let mut chars = id.as_str().chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_alphanumeric() || c == '_' {
            name.push(c);
        } else if c == ':' && chars.peek() == Some(&':') {
            let _ = chars.next();
            name.push_str("__");
        } else {
            name.push('_');
            while chars.peek().is_some_and(|n| !n.is_ascii_alphanumeric() && *n != '_' && *n != ':') {
                let _ = chars.next();
            }
        }
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Name of the container struct: the last path segment of its identifier.
#[must_use]
pub fn type_name(id: &Identifier) -> &str {
    id.as_str().rsplit("::").next().unwrap_or(id.as_str())
}

/// File name of the auxiliary artifact holding a factory body.
#[must_use]
pub fn artifact_file(factory: &str) -> String {
    format!("{factory}.{ARTIFACT_EXTENSION}")
}
