//! # arbor-widgets
//!
//! Minimal hierarchical widget framework: named component classes with
//! single inheritance, instances bound 1:1 to opaque containers, and
//! bidirectional event propagation over the implicitly-formed widget tree.
//!
//! ## Architecture
//!
//! The tree is never declared; it assembles itself. Each new widget bubbles
//! an announce message up the container chain and the nearest enclosing
//! widget adopts it:
//!
//! ```text
//! define class ─► create on container ─► announce bubbles up ─► parent adopts
//! ```
//!
//! Events then travel along that tree:
//! - `broadcast` - depth-first downward fan-out, per-branch short-circuit
//! - `emit` - upward walk to the nearest intercepting ancestor, optionally
//!   promoted to a whole-tree broadcast at the root
//! - `trigger` - local-only dispatch, the terminal primitive of the other two
//!
//! Everything is single-threaded and synchronous: state lives in
//! `thread_local!` tables and propagation is plain recursion bounded by tree
//! depth.
//!
//! ## Modules
//!
//! - [`types`] - Core types (ids, event context, argument normalization)
//! - [`class`] - Class definitions and flattened inheritance
//! - [`registry`] - Class table, id issuance, instance factory
//! - [`widget`] - The widget tree and event router
//! - [`container`] - Opaque container substrate (hierarchy, attributes, pub/sub)
//! - [`discover`] - Declarative auto-discovery from container attributes
//!
//! ## Example
//!
//! ```ignore
//! use arbor_widgets::{container, registry, ClassSpec};
//! use serde_json::json;
//!
//! registry::define("App", ClassSpec::new())?;
//! registry::define("Button", ClassSpec::new()
//!     .on("click", |_w, ctx, _args| {
//!         println!("clicked by #{}", ctx.target.id());
//!         Some(json!(true))
//!     }))?;
//!
//! let window = container::create_root();
//! let slot = container::create_child(window)?;
//!
//! let app = registry::create("App", window)?;
//! let button = registry::create("Button", slot)?;
//! assert_eq!(button.parent().unwrap().id(), app.id());
//!
//! app.broadcast("click", ());
//! ```

pub mod class;
pub mod container;
pub mod discover;
pub mod error;
pub mod registry;
pub mod types;
pub mod widget;

// Re-export commonly used items
pub use class::{ClassDef, ClassSpec, Handler};
pub use error::{Result, WidgetError};
pub use types::{ContainerId, EventArgs, EventContext, EventKind, Options, Value, WidgetId};
pub use widget::Widget;

pub use discover::{discover_all, OPTIONS_ATTR, WIDGET_ATTR};
