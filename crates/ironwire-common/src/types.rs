//! Domain primitive types used across the ironwire workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Globally unique name of a constructible type.
///
/// In emitted code an identifier is a Rust type path such as
/// `app::repository::UserRepository`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Creates a new identifier from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lifecycle of a constructed instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Built once per container and cached.
    #[default]
    Singleton,
    /// Built fresh on every retrieval.
    Prototype,
}

impl Scope {
    /// Returns `true` for [`Scope::Singleton`].
    #[must_use]
    pub const fn is_singleton(self) -> bool {
        matches!(self, Self::Singleton)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => write!(f, "singleton"),
            Self::Prototype => write!(f, "prototype"),
        }
    }
}

/// A configuration value bound to a parameter or field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// Absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    String(String),
    /// Ordered list of values.
    List(Vec<Literal>),
}

impl Literal {
    /// Renders the literal as a Rust expression.
    #[must_use]
    pub fn to_rust(&self) -> String {
        match self {
            Self::Null => "None".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Float(x) if x.is_nan() => "f64::NAN".to_owned(),
            Self::Float(x) if x.is_infinite() && x.is_sign_positive() => "f64::INFINITY".to_owned(),
            Self::Float(x) if x.is_infinite() => "f64::NEG_INFINITY".to_owned(),
            Self::Float(x) if x.fract() == 0.0 => format!("{x:.1}"),
            Self::Float(x) => x.to_string(),
            Self::String(s) => format!("{s:?}"),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(Self::to_rust).collect();
                format!("vec![{}]", rendered.join(", "))
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rust())
    }
}
