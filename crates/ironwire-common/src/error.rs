//! Unified error types for the ironwire workspace.
//!
//! Every error is fatal to the resolution or compilation pass that raised it.
//! Variants carry the offending identifier, consumer and member names so the
//! message can be surfaced to the operator verbatim.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Kind of class member an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A constructor parameter.
    Parameter,
    /// An injectable field.
    Field,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter => write!(f, "constructor parameter"),
            Self::Field => write!(f, "field"),
        }
    }
}

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum IronwireError {
    /// A requested entry point is not declared.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A parameter or field has neither an override nor a concrete type.
    #[error("cannot inject {member_kind} \"{member}\" of \"{class}\": {reason}")]
    UnresolvableType {
        /// Class declaring the member.
        class: String,
        /// Whether the member is a parameter or a field.
        member_kind: MemberKind,
        /// Member name.
        member: String,
        /// Why no type could be determined.
        reason: String,
    },

    /// Overrides name members that do not exist on the target type.
    #[error("invalid {member_kind} override(s) for \"{class}\": {}", names.join(", "))]
    InvalidOverride {
        /// Class the overrides were declared for.
        class: String,
        /// Whether the overrides target parameters or fields.
        member_kind: MemberKind,
        /// The unmatched override names, sorted.
        names: Vec<String>,
    },

    /// An injection marker or override targets a static field.
    #[error("field \"{field}\" of \"{class}\" is static and cannot be injected")]
    StaticInjection {
        /// Class declaring the field.
        class: String,
        /// Field name.
        field: String,
    },

    /// A context-dependent identifier was requested without a usable binding.
    #[error(
        "\"{id}\" is context dependent and has no binding for {} and no default",
        consumer.as_deref().map_or_else(|| "direct retrieval".to_owned(), |c| format!("consumer \"{c}\""))
    )]
    ContextDependentLookup {
        /// The context-dependent identifier.
        id: String,
        /// Consumer that requested it, or `None` for direct retrieval.
        consumer: Option<String>,
    },

    /// The metadata provider could not introspect an identifier.
    #[error("cannot introspect \"{id}\": {message}")]
    Introspection {
        /// Identifier that failed to load.
        id: String,
        /// Provider-specific description.
        message: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML deserialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, IronwireError>;
