//! Autoload and placement exclusion policy.

use std::collections::BTreeSet;

use ironwire_common::config::{AutoloadConfig, FileBasedConfig};
use ironwire_common::types::Identifier;

/// Which entry points get an autoload proxy and which identifiers stay inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoloadPolicy {
    enabled: bool,
    excluded: BTreeSet<Identifier>,
    inline_only: BTreeSet<Identifier>,
    always_autoload: Vec<Identifier>,
}

impl AutoloadPolicy {
    /// Builds the policy from the autoload and file-based sections.
    #[must_use]
    pub fn from_config(autoload: &AutoloadConfig, file_based: &FileBasedConfig) -> Self {
        let excluded: BTreeSet<Identifier> = autoload.excluded.iter().cloned().collect();
        let inline_only = excluded
            .iter()
            .chain(file_based.excluded.iter())
            .cloned()
            .collect();
        Self {
            enabled: autoload.enabled,
            excluded,
            inline_only,
            always_autoload: autoload.always_autoload.clone(),
        }
    }

    /// Whether `id` must never be placed in a separate file.
    #[must_use]
    pub fn is_excluded_from_file_placement(&self, id: &Identifier) -> bool {
        self.inline_only.contains(id)
    }

    /// Whether the entry point `id` gets a proxy, given its own declaration flag.
    #[must_use]
    pub fn wraps(&self, id: &Identifier, declared: bool) -> bool {
        (self.enabled || declared) && !self.excluded.contains(id)
    }

    /// Classes activated by every proxy regardless of reachability.
    #[must_use]
    pub fn always_autoloaded(&self) -> &[Identifier] {
        &self.always_autoload
    }
}
