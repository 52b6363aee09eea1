//! Introspection interface queried by the resolver.
//!
//! The resolver never inspects source text itself. A [`MetadataProvider`]
//! reports constructor parameters and injectable fields per identifier; how it
//! obtains them (static analysis, derive output, a hand-written map) is its
//! own concern. [`StaticMetadata`] is a map-backed provider loaded from YAML or
//! JSON.

use std::collections::BTreeMap;

use ironwire_common::error::{IronwireError, Result};
use ironwire_common::types::{Identifier, Literal};
use serde::{Deserialize, Serialize};

/// A constructor parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterMetadata {
    /// Parameter name.
    pub name: String,
    /// Injectable type, or `None` if no concrete type could be determined.
    #[serde(rename = "type", default)]
    pub ty: Option<Identifier>,
    /// Whether the parameter has a default value.
    #[serde(default)]
    pub optional: bool,
    /// Default value of an optional parameter.
    #[serde(default)]
    pub default: Option<Literal>,
}

impl ParameterMetadata {
    /// A required parameter of type `ty`.
    #[must_use]
    pub fn typed(name: impl Into<String>, ty: impl Into<Identifier>) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty.into()),
            optional: false,
            default: None,
        }
    }
}

/// A field of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Field name.
    pub name: String,
    /// Injectable type, or `None` if no concrete type could be determined.
    #[serde(rename = "type", default)]
    pub ty: Option<Identifier>,
    /// Static (type-level) field.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Marked for injection.
    #[serde(default)]
    pub inject: bool,
}

/// Source of constructor and field metadata.
pub trait MetadataProvider {
    /// Constructor parameters of `id`, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`IronwireError::Introspection`] if `id` cannot be introspected.
    fn constructor_parameters(&self, id: &Identifier) -> Result<Vec<ParameterMetadata>>;

    /// Fields of `id`, injectable or not.
    ///
    /// # Errors
    ///
    /// Returns [`IronwireError::Introspection`] if `id` cannot be introspected.
    fn injectable_fields(&self, id: &Identifier) -> Result<Vec<FieldMetadata>>;

    /// Source unit `id` lives in, used by autoload activation.
    ///
    /// # Errors
    ///
    /// Returns [`IronwireError::Introspection`] if `id` cannot be introspected.
    fn source_unit(&self, _id: &Identifier) -> Result<Option<String>> {
        Ok(None)
    }

    /// Every identifier the provider knows, used to expand namespace entry points.
    fn identifiers(&self) -> Vec<Identifier> {
        Vec::new()
    }

    /// Whether `id` can be constructed directly.
    fn is_concrete(&self, _id: &Identifier) -> bool {
        true
    }
}

/// Whether a type can be constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// A concrete type with a constructor.
    #[default]
    Struct,
    /// An interface; needs a hint to be built.
    Trait,
}

/// Metadata of one type in a [`StaticMetadata`] map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeMetadata {
    /// Concrete or abstract.
    pub kind: TypeKind,
    /// Source unit of the type.
    pub source: Option<String>,
    /// Constructor parameters in declaration order.
    pub constructor: Vec<ParameterMetadata>,
    /// Fields.
    pub fields: Vec<FieldMetadata>,
}

/// A metadata provider backed by an explicit map.
///
/// ```yaml
/// app::Service:
///   source: src/service.rs
///   constructor:
///     - name: repo
///       type: app::RepositoryInterface
/// app::RepositoryInterface:
///   kind: trait
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticMetadata {
    types: BTreeMap<Identifier, TypeMetadata>,
}

impl StaticMetadata {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the metadata of `id`.
    #[must_use]
    pub fn with_type(mut self, id: impl Into<Identifier>, metadata: TypeMetadata) -> Self {
        let _ = self.types.insert(id.into(), metadata);
        self
    }

    /// Parses a map from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid metadata map.
    pub fn from_yaml(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Parses a map from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid metadata map.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Number of described types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type is described.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn lookup(&self, id: &Identifier) -> Result<&TypeMetadata> {
        self.types.get(id).ok_or_else(|| IronwireError::Introspection {
            id: id.to_string(),
            message: "type is not described by the metadata map".into(),
        })
    }

    fn lookup_concrete(&self, id: &Identifier) -> Result<&TypeMetadata> {
        let metadata = self.lookup(id)?;
        if metadata.kind == TypeKind::Trait {
            return Err(IronwireError::Introspection {
                id: id.to_string(),
                message: "type is a trait and no hint binds it to an implementation".into(),
            });
        }
        Ok(metadata)
    }
}

impl MetadataProvider for StaticMetadata {
    fn constructor_parameters(&self, id: &Identifier) -> Result<Vec<ParameterMetadata>> {
        Ok(self.lookup_concrete(id)?.constructor.clone())
    }

    fn injectable_fields(&self, id: &Identifier) -> Result<Vec<FieldMetadata>> {
        Ok(self.lookup_concrete(id)?.fields.clone())
    }

    fn source_unit(&self, id: &Identifier) -> Result<Option<String>> {
        Ok(self.lookup(id)?.source.clone())
    }

    fn identifiers(&self) -> Vec<Identifier> {
        self.types.keys().cloned().collect()
    }

    fn is_concrete(&self, id: &Identifier) -> bool {
        self.types
            .get(id)
            .is_some_and(|metadata| metadata.kind == TypeKind::Struct)
    }
}
