//! CLI-level errors.

use zimsync::{CatalogError, ConfigError, ManagerError};

/// Errors surfaced to the terminal with a non-zero exit code.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be located or loaded.
    Config(ConfigError),

    /// An update run failed outright.
    Manager(ManagerError),

    /// A catalog search failed.
    Catalog(CatalogError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{}", e),
            Self::Manager(e) => write!(f, "{}", e),
            Self::Catalog(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Manager(e) => Some(e),
            Self::Catalog(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ManagerError> for CliError {
    fn from(e: ManagerError) -> Self {
        Self::Manager(e)
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}
