//! Widget classes - named definitions with single inheritance.
//!
//! A class is a named record of an optional base class, a method table and a
//! default-field table. Inheritance is resolved at definition time: the
//! registry flattens the base chain into one combined table per class, so
//! instance dispatch never walks a chain.
//!
//! Methods are event handlers looked up by naming convention: an event
//! `"refresh"` dispatches to the method `"on_refresh"`.
//!
//! # Example
//!
//! ```ignore
//! use arbor_widgets::{registry, ClassSpec};
//! use serde_json::json;
//!
//! registry::define("Panel", ClassSpec::new()
//!     .default_value("collapsed", json!(false))
//!     .on("toggle", |widget, _ctx, _args| {
//!         let collapsed = widget.field("collapsed")?.as_bool()?;
//!         widget.set_field("collapsed", json!(!collapsed));
//!         Some(json!(!collapsed))
//!     }))?;
//!
//! registry::define("SidePanel", ClassSpec::new().extends("Panel"))?;
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use crate::types::{EventContext, Value};
use crate::widget::Widget;

/// Event handler stored in a class method table.
///
/// Receives the widget the handler runs on, the propagation context and the
/// normalized arguments. Returning `Some(..)` is the "consumed" signal that
/// short-circuits broadcast and emit traversal; `None` lets propagation
/// continue.
pub type Handler = Rc<dyn Fn(&Rc<Widget>, &EventContext, &[Value]) -> Option<Value>>;

/// Prefix joining an event name to its handler method name.
pub(crate) const HANDLER_PREFIX: &str = "on_";

// =============================================================================
// Class Specification (builder)
// =============================================================================

/// A class definition under construction, passed to [`crate::registry::define`].
///
/// Function-valued members become methods, shared across all instances and
/// overridable by subclasses. Non-function members become shared defaults,
/// copied onto each new instance at construction so siblings never alias a
/// mutable value.
#[derive(Default)]
pub struct ClassSpec {
    pub(crate) base: Option<String>,
    pub(crate) methods: HashMap<String, Handler>,
    pub(crate) defaults: HashMap<String, Value>,
}

impl ClassSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inherit from a previously defined class.
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Add a method under its full name (e.g. `"on_refresh"`).
    pub fn method<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Rc<Widget>, &EventContext, &[Value]) -> Option<Value> + 'static,
    {
        self.methods.insert(name.into(), Rc::new(handler));
        self
    }

    /// Add a handler for the named event (stores `on_{event}`).
    pub fn on<F>(self, event: &str, handler: F) -> Self
    where
        F: Fn(&Rc<Widget>, &EventContext, &[Value]) -> Option<Value> + 'static,
    {
        let name = format!("{HANDLER_PREFIX}{event}");
        self.method(name, handler)
    }

    /// Add a shared default, shallow-copied onto each instance at construction.
    pub fn default_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(key.into(), value);
        self
    }
}

// =============================================================================
// Registered Class (flattened)
// =============================================================================

/// A registered class with its base chain already flattened in.
///
/// Cloning is cheap: handlers are reference-counted.
#[derive(Clone)]
pub struct ClassDef {
    name: String,
    base: Option<String>,
    methods: HashMap<String, Handler>,
    defaults: HashMap<String, Value>,
}

impl ClassDef {
    pub(crate) fn new(
        name: String,
        base: Option<String>,
        methods: HashMap<String, Handler>,
        defaults: HashMap<String, Value>,
    ) -> Self {
        Self { name, base, methods, defaults }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the direct base class, if any.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Look up a method by its full name (e.g. `"on_refresh"`).
    ///
    /// This is the escape hatch for explicit shadowed-method calls: a
    /// subclass handler can fetch an ancestor's version and invoke it.
    pub fn method(&self, name: &str) -> Option<Handler> {
        self.methods.get(name).cloned()
    }

    /// Look up the handler for the named event (`on_{event}`).
    pub fn handler_for(&self, event: &str) -> Option<Handler> {
        self.methods.get(&format!("{HANDLER_PREFIX}{event}")).cloned()
    }

    pub fn method_names(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    pub(crate) fn methods(&self) -> &HashMap<String, Handler> {
        &self.methods
    }

    pub(crate) fn defaults(&self) -> &HashMap<String, Value> {
        &self.defaults
    }

    /// Merge this (base) class's tables under `spec`'s own members.
    pub(crate) fn flatten_into(&self, spec: &ClassSpec) -> (HashMap<String, Handler>, HashMap<String, Value>) {
        let mut methods = self.methods.clone();
        let mut defaults = self.defaults.clone();
        methods.extend(spec.methods.iter().map(|(k, v)| (k.clone(), v.clone())));
        defaults.extend(spec.defaults.iter().map(|(k, v)| (k.clone(), v.clone())));
        (methods, defaults)
    }
}

impl std::fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("defaults", &self.defaults)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
