//! Core types - Identifiers, event context, argument normalization.
//!
//! Shared by every module:
//! - [`WidgetId`] / [`ContainerId`] - handles into the widget tree and container arena
//! - [`EventKind`] / [`EventContext`] - propagation metadata passed to handlers
//! - [`EventArgs`] - normalized ordered argument list
//! - [`Options`] / [`Value`] - JSON-shaped instance options

use std::rc::Rc;

use crate::widget::Widget;

/// JSON value type used for options, defaults and event arguments.
pub type Value = serde_json::Value;

/// Instance options: a JSON object supplied at construction.
pub type Options = serde_json::Map<String, Value>;

/// Unique widget instance identifier.
///
/// Issued by [`crate::registry::next_id`]: strictly increasing from 1,
/// never reused for the lifetime of the process.
pub type WidgetId = u64;

/// Opaque handle to a container in the arena.
///
/// Containers are the visual-hosting substrate: each may host at most one
/// widget instance, and announce messages bubble up the container chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub(crate) u64);

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

// =============================================================================
// Announce Protocol
// =============================================================================

/// Substrate event a new widget bubbles so the nearest enclosing host adopts it.
pub(crate) const CREATED: &str = "_create";

/// Substrate event a dying widget bubbles so its parent detaches it.
pub(crate) const REMOVED: &str = "_destroy";

// =============================================================================
// Event Context
// =============================================================================

/// Which propagation primitive delivered an event to a handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Downward fan-out through the subtree.
    Broadcast,
    /// Upward walk along the ancestor chain.
    Emit,
    /// Local-only dispatch.
    Trigger,
}

/// Metadata handed to every handler ahead of the event arguments.
#[derive(Clone)]
pub struct EventContext {
    /// The widget that initiated the propagation.
    pub target: Rc<Widget>,
    /// How the event reached this handler.
    pub kind: EventKind,
}

impl EventContext {
    pub(crate) fn new(target: Rc<Widget>, kind: EventKind) -> Self {
        Self { target, kind }
    }
}

impl std::fmt::Debug for EventContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventContext")
            .field("target", &self.target.id())
            .field("kind", &self.kind)
            .finish()
    }
}

// =============================================================================
// Event Arguments
// =============================================================================

/// Ordered event arguments.
///
/// Handlers always receive a sequence: a single non-array value is wrapped
/// in a one-element list, an array value is spliced into its elements.
#[derive(Clone, Debug, Default)]
pub struct EventArgs(Vec<Value>);

impl EventArgs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Value>> for EventArgs {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl From<Value> for EventArgs {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(values) => Self(values),
            other => Self(vec![other]),
        }
    }
}

impl From<()> for EventArgs {
    fn from(_: ()) -> Self {
        Self::new()
    }
}

impl<const N: usize> From<[Value; N]> for EventArgs {
    fn from(values: [Value; N]) -> Self {
        Self(values.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
