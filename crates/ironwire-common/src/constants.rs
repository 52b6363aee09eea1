//! System-wide constants and defaults.

/// Application name used in CLI output and generated headers.
pub const APP_NAME: &str = "ironwire";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "iwc";

/// Default configuration file looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "ironwire.yaml";

/// Default metadata file looked up by the CLI.
pub const DEFAULT_METADATA_FILE: &str = "ironwire.metadata.yaml";

/// Default name of the generated container type.
pub const DEFAULT_CONTAINER_NAME: &str = "Container";

/// Default file name of the main generated artifact.
pub const DEFAULT_CONTAINER_FILE: &str = "container.rs";

/// Default directory (relative to the main artifact) for file-based definitions.
pub const DEFAULT_DEFINITION_DIRECTORY: &str = "definitions";

/// Extension of every generated artifact.
pub const ARTIFACT_EXTENSION: &str = "rs";

/// Suffix of the factory holding the real body behind an autoload proxy.
pub const AUTOLOADED_FACTORY_SUFFIX: &str = "__autoloaded";

/// Placeholder character in wildcard hint patterns.
pub const WILDCARD: char = '*';
