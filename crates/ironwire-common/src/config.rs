//! Configuration model for a container compilation.
//!
//! The model is deserialized from YAML or JSON. Every section except
//! `entry_points` has a default, so a minimal configuration is:
//!
//! ```yaml
//! entry_points:
//!   - class: app::Service
//! hints:
//!   app::RepositoryInterface:
//!     class: app::InMemoryRepository
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::Result;
use crate::types::{Identifier, Literal, Scope};

/// Root configuration of a container compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// The generated container type.
    pub container: ContainerConfig,
    /// Which injection styles are enabled.
    pub injection: InjectionConfig,
    /// Types exposed as public retrieval methods, in declared order.
    pub entry_points: Vec<EntryPointConfig>,
    /// Exact-identifier hints.
    pub hints: BTreeMap<Identifier, HintConfig>,
    /// Pattern hints, tried in declared order after exact hints.
    pub wildcard_hints: Vec<WildcardHintConfig>,
    /// Autoload policy.
    pub autoload: AutoloadConfig,
    /// File-based placement policy.
    pub file_based: FileBasedConfig,
    /// Artifact naming.
    pub output: OutputConfig,
}

impl CompilerConfig {
    /// Parses a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn from_yaml(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

/// The generated container type and the interfaces it satisfies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Identifier of the container itself; the struct is named after its last segment.
    pub name: Identifier,
    /// Interfaces bound to the container instance.
    pub interfaces: Vec<Identifier>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: Identifier::new(constants::DEFAULT_CONTAINER_NAME),
            interfaces: Vec::new(),
        }
    }
}

/// Which injection styles the resolver applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Resolve constructor parameters.
    pub constructor: bool,
    /// Resolve fields marked for injection.
    pub fields: bool,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            constructor: true,
            fields: false,
        }
    }
}

/// A value bound to a constructor parameter or field by configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    /// A Rust path emitted verbatim, e.g. `crate::settings::DATABASE_URL`.
    Reference {
        /// The referenced path.
        reference: String,
    },
    /// A literal value.
    Value(Literal),
}

/// What an entry point declaration covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryPointTarget {
    /// A single identifier.
    Class {
        /// The exposed identifier.
        class: Identifier,
    },
    /// Every identifier known to the metadata provider under a path prefix.
    Namespace {
        /// Path prefix such as `app::controller`.
        namespace: String,
        /// Include nested modules.
        #[serde(default = "default_true")]
        recursive: bool,
        /// Skip identifiers the metadata provider reports as abstract.
        #[serde(default = "default_true")]
        only_concrete: bool,
    },
}

/// An entry point declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPointConfig {
    /// What the declaration covers.
    #[serde(flatten)]
    pub target: EntryPointTarget,
    /// Place the definitions reached from this entry point in separate files.
    #[serde(default)]
    pub file_based: bool,
    /// Emit an autoload proxy for the covered identifiers.
    #[serde(default)]
    pub autoload: bool,
    /// Constructor parameter overrides for the covered identifiers.
    #[serde(default)]
    pub parameters: BTreeMap<String, OverrideValue>,
    /// Field overrides for the covered identifiers.
    #[serde(default)]
    pub fields: BTreeMap<String, OverrideValue>,
}

impl EntryPointConfig {
    /// Shorthand for a plain class entry point.
    #[must_use]
    pub fn class(id: impl Into<Identifier>) -> Self {
        Self {
            target: EntryPointTarget::Class { class: id.into() },
            file_based: false,
            autoload: false,
            parameters: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }
}

/// A hint declared for one exact identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HintConfig {
    /// Choose the implementation per consumer.
    Context {
        /// The per-consumer table.
        context: ContextHintConfig,
    },
    /// Bind the identifier to a class.
    Class {
        /// The implementing class.
        class: Identifier,
        /// Lifecycle of the implementation.
        #[serde(default)]
        scope: Scope,
        /// Constructor parameter overrides of the implementation.
        #[serde(default)]
        parameters: BTreeMap<String, OverrideValue>,
        /// Field overrides of the implementation.
        #[serde(default)]
        fields: BTreeMap<String, OverrideValue>,
    },
    /// Keep the identifier's own class but change its scope or overrides.
    Scope {
        /// Lifecycle of the class.
        #[serde(default)]
        scope: Scope,
        /// Constructor parameter overrides.
        #[serde(default)]
        parameters: BTreeMap<String, OverrideValue>,
        /// Field overrides.
        #[serde(default)]
        fields: BTreeMap<String, OverrideValue>,
    },
}

/// Per-consumer bindings of a context-dependent identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextHintConfig {
    /// Class used when the consumer has no entry in `consumers`.
    #[serde(default)]
    pub default: Option<Identifier>,
    /// Consumer identifier to implementing class.
    #[serde(default)]
    pub consumers: BTreeMap<Identifier, Identifier>,
    /// Lifecycle of every implementation.
    #[serde(default)]
    pub scope: Scope,
}

/// A pattern hint, e.g. `app::*RepositoryInterface` to `app::Mysql*Repository`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildcardHintConfig {
    /// Pattern matched against requested identifiers.
    pub source: String,
    /// Pattern the captured placeholders are substituted into.
    pub target: String,
    /// Lifecycle of the implementations.
    #[serde(default)]
    pub scope: Scope,
}

/// Autoload policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoloadConfig {
    /// Emit autoload proxies for every entry point.
    pub enabled: bool,
    /// Identifiers never wrapped, and never file-based.
    pub excluded: Vec<Identifier>,
    /// Classes whose source units every proxy activates first.
    pub always_autoload: Vec<Identifier>,
}

/// File-based placement policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBasedConfig {
    /// Place every definition in a separate file.
    pub enabled: bool,
    /// Directory of the auxiliary artifacts, relative to the main artifact.
    pub directory: String,
    /// Identifiers always emitted inline.
    pub excluded: Vec<Identifier>,
}

impl Default for FileBasedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: constants::DEFAULT_DEFINITION_DIRECTORY.to_owned(),
            excluded: Vec::new(),
        }
    }
}

/// Artifact naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name of the main artifact.
    pub container_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            container_file: constants::DEFAULT_CONTAINER_FILE.to_owned(),
        }
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_uses_defaults() {
        let config = CompilerConfig::from_yaml("entry_points:\n  - class: app::Service\n")
            .expect("parse");
        assert_eq!(config.entry_points.len(), 1);
        assert_eq!(
            config.entry_points[0].target,
            EntryPointTarget::Class {
                class: Identifier::new("app::Service")
            }
        );
        assert!(config.injection.constructor);
        assert!(!config.injection.fields);
        assert_eq!(config.container.name.as_str(), "Container");
        assert_eq!(config.file_based.directory, "definitions");
        assert_eq!(config.output.container_file, "container.rs");
    }

    #[test]
    fn hint_variants_are_distinguished() {
        let yaml = r"
hints:
  app::RepositoryInterface:
    class: app::InMemoryRepository
  app::Request:
    scope: prototype
  app::LoggerInterface:
    context:
      default: app::FileLogger
      consumers:
        app::Service: app::NullLogger
";
        let config = CompilerConfig::from_yaml(yaml).expect("parse");
        assert!(matches!(
            config.hints.get(&Identifier::new("app::RepositoryInterface")),
            Some(HintConfig::Class { scope: Scope::Singleton, .. })
        ));
        assert!(matches!(
            config.hints.get(&Identifier::new("app::Request")),
            Some(HintConfig::Scope { scope: Scope::Prototype, .. })
        ));
        let Some(HintConfig::Context { context }) =
            config.hints.get(&Identifier::new("app::LoggerInterface"))
        else {
            panic!("expected context hint");
        };
        assert_eq!(context.default, Some(Identifier::new("app::FileLogger")));
        assert_eq!(context.consumers.len(), 1);
    }

    #[test]
    fn overrides_parse_values_and_references() {
        let yaml = r#"
entry_points:
  - class: app::Mailer
    parameters:
      host: "smtp.local"
      port: 25
      transport: { reference: "crate::settings::TRANSPORT" }
"#;
        let config = CompilerConfig::from_yaml(yaml).expect("parse");
        let params = &config.entry_points[0].parameters;
        assert_eq!(
            params.get("host"),
            Some(&OverrideValue::Value(Literal::String("smtp.local".into())))
        );
        assert_eq!(params.get("port"), Some(&OverrideValue::Value(Literal::Integer(25))));
        assert_eq!(
            params.get("transport"),
            Some(&OverrideValue::Reference {
                reference: "crate::settings::TRANSPORT".into()
            })
        );
    }

    #[test]
    fn namespace_entry_point_defaults() {
        let config =
            CompilerConfig::from_json(r#"{"entry_points":[{"namespace":"app::controller","file_based":true}]}"#)
                .expect("parse");
        let entry = &config.entry_points[0];
        assert!(entry.file_based);
        assert_eq!(
            entry.target,
            EntryPointTarget::Namespace {
                namespace: "app::controller".into(),
                recursive: true,
                only_concrete: true,
            }
        );
    }
}
