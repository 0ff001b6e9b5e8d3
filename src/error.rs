//! Error types for class definition, instantiation and discovery.

use crate::types::{ContainerId, WidgetId};

/// Errors surfaced by the registry, container arena and discovery scan.
///
/// Self-registration attempts in the child mutators are not errors: they are
/// rejected with a failure boolean by design.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// Instantiation named a class that was never defined.
    #[error("widget class not found: {0}")]
    ClassNotFound(String),

    /// A class definition extends a class that was never defined.
    #[error("base class not found: {0}")]
    BaseClassNotFound(String),

    /// Operation against a container handle that is not (or no longer) in the arena.
    #[error("{0} does not exist")]
    ContainerNotFound(ContainerId),

    /// Containers host at most one widget; the binding is exclusive.
    #[error("container already hosts widget #{0}")]
    ContainerOccupied(WidgetId),

    /// The declarative options attribute parsed to something other than a JSON object.
    #[error("options attribute on {0} is not a JSON object")]
    OptionsNotObject(ContainerId),

    /// The declarative options attribute is not valid JSON.
    #[error("invalid options JSON: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, WidgetError>;
