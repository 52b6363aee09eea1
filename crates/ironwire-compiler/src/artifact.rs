//! Generated text artifacts.

use std::collections::BTreeMap;

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name, relative to the output directory.
    pub filename: String,
    /// File content.
    pub source: String,
}

/// The main container source plus every auxiliary definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledContainer {
    /// The container source.
    pub main: Artifact,
    /// Auxiliary artifacts keyed by path relative to the output directory.
    pub auxiliary: BTreeMap<String, String>,
}

impl CompiledContainer {
    /// Every artifact as `(relative path, source)`, main artifact first.
    pub fn artifacts(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((self.main.filename.as_str(), self.main.source.as_str())).chain(
            self.auxiliary
                .iter()
                .map(|(path, source)| (path.as_str(), source.as_str())),
        )
    }

    /// Number of artifacts, main included.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.auxiliary.len()
    }

    /// Always `false`: a compiled container has at least its main artifact.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}
