//! Widget instances - the component tree and event router.
//!
//! Every instance is bound 1:1 to a container and registers itself as a child
//! of the nearest enclosing widget, found by bubbling an announce message up
//! the container chain (no static nesting knowledge anywhere).
//!
//! Three propagation primitives:
//! - [`Widget::broadcast`] - depth-first downward fan-out with per-branch
//!   short-circuit
//! - [`Widget::emit`] - upward walk to the nearest intercepting ancestor;
//!   [`Widget::emit_up`] promotes to a whole-tree broadcast once the root is
//!   reached
//! - [`Widget::trigger`] - local-only dispatch, the terminal primitive the
//!   other two rely on
//!
//! All propagation is plain synchronous recursion, bounded by tree depth.
//! A handler returning `Some(..)` is the advisory stop signal: it halts the
//! branch that produced it, never sibling branches.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::class::{ClassDef, Handler, HANDLER_PREFIX};
use crate::container;
use crate::registry;
use crate::types::{
    ContainerId, EventArgs, EventContext, EventKind, Options, Value, WidgetId, CREATED, REMOVED,
};

/// A live widget instance.
///
/// Owned by its container binding and by its parent's children map. The
/// parent link is a weak back-reference; children are the owned collection.
pub struct Widget {
    /// Self-reference, set at construction. Lets `&self` methods hand out
    /// shareable handles (event targets, parent back-references).
    this: Weak<Widget>,
    id: WidgetId,
    class_name: String,
    container: ContainerId,
    /// Scopes this instance's container subscriptions so nested widgets on
    /// the same chain do not cross-fire: `"{class}-{id}"`.
    event_namespace: String,
    options: Options,
    handlers: HashMap<String, Handler>,
    fields: RefCell<HashMap<String, Value>>,
    parent: RefCell<Weak<Widget>>,
    children: RefCell<HashMap<WidgetId, Rc<Widget>>>,
}

impl Widget {
    pub(crate) fn instantiate(
        class: &ClassDef,
        id: WidgetId,
        container: ContainerId,
        options: Options,
    ) -> Rc<Widget> {
        Rc::new_cyclic(|this| Widget {
            this: this.clone(),
            id,
            class_name: class.name().to_string(),
            container,
            event_namespace: format!("{}-{}", class.name(), id),
            options,
            handlers: class.methods().clone(),
            // Per-instance copy of the shared defaults: siblings never alias.
            fields: RefCell::new(class.defaults().clone()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(HashMap::new()),
        })
    }

    fn rc(&self) -> Rc<Widget> {
        self.this.upgrade().expect("self-reference is live for the instance lifetime")
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn event_namespace(&self) -> &str {
        &self.event_namespace
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Single option lookup.
    pub fn option(&self, key: &str) -> Option<Value> {
        self.options.get(key).cloned()
    }

    /// The enclosing widget, if the announce handshake attached one.
    ///
    /// Note: after this widget has been detached by its parent the link may
    /// be stale; `delete_child` does not clear it.
    pub fn parent(&self) -> Option<Rc<Widget>> {
        self.parent.borrow().upgrade()
    }

    pub fn child(&self, id: WidgetId) -> Option<Rc<Widget>> {
        self.children.borrow().get(&id).cloned()
    }

    pub fn has_child(&self, id: WidgetId) -> bool {
        self.children.borrow().contains_key(&id)
    }

    /// Ids of the current children. Iteration order is unspecified.
    pub fn child_ids(&self) -> Vec<WidgetId> {
        self.children.borrow().keys().copied().collect()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Read an instance field (initialized from the class's shared defaults).
    pub fn field(&self, key: &str) -> Option<Value> {
        self.fields.borrow().get(key).cloned()
    }

    pub fn set_field(&self, key: impl Into<String>, value: Value) {
        self.fields.borrow_mut().insert(key.into(), value);
    }

    /// Fetch the named class's flattened definition for explicit
    /// shadowed-method calls.
    pub fn super_class(&self, class_name: &str) -> Option<ClassDef> {
        registry::resolve(class_name)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Join the component tree.
    ///
    /// Subscribes the two announce handlers on the own container (guarded so
    /// a widget never adopts itself), then bubbles the created announce so
    /// the nearest enclosing widget captures this instance as a child.
    pub(crate) fn mount(&self) {
        let host = self.this.clone();
        container::subscribe(self.container, CREATED, &self.event_namespace, move |announced| {
            host.upgrade().is_some_and(|host| host.add_child(announced))
        });

        let host = self.this.clone();
        container::subscribe(self.container, REMOVED, &self.event_namespace, move |announced| {
            host.upgrade().is_some_and(|host| host.delete_child(announced))
        });

        container::bubble(self.container, CREATED, &self.rc());
        log::debug!("created {} #{} on {}", self.class_name, self.id, self.container);
    }

    /// Leave the component tree.
    ///
    /// Fires the local `destroy` handler, then bubbles the leave announce so
    /// the parent detaches this instance from its children map. Invoked
    /// automatically when the bound container is removed.
    pub fn destroy(&self) {
        self.trigger("destroy", ());
        container::bubble(self.container, REMOVED, &self.rc());
        log::debug!("destroy: {} #{}", self.class_name, self.id);
    }

    // =========================================================================
    // Child Registry
    // =========================================================================

    /// Register `child` in the children map and set its parent back-reference.
    ///
    /// Normally driven by the announce handshake. Returns `false` without
    /// mutating anything if `child` is this widget itself.
    pub fn add_child(&self, child: &Rc<Widget>) -> bool {
        if child.id == self.id {
            return false;
        }
        *child.parent.borrow_mut() = self.this.clone();
        self.children.borrow_mut().insert(child.id, child.clone());
        true
    }

    /// Remove `child` from the children map.
    ///
    /// The child's parent back-reference is left as-is; the child is on its
    /// way out. Returns `false` only for a self-removal attempt (removal of
    /// an id that was never a child still reports `true`).
    pub fn delete_child(&self, child: &Rc<Widget>) -> bool {
        if child.id == self.id {
            return false;
        }
        self.children.borrow_mut().remove(&child.id);
        true
    }

    // =========================================================================
    // Propagation
    // =========================================================================

    /// Local-only dispatch of the `on_{event}` handler.
    ///
    /// Returns whatever the handler returned; `Some(..)` is the consumed
    /// signal broadcast and emit use to short-circuit.
    pub fn trigger(&self, event: &str, args: impl Into<EventArgs>) -> Option<Value> {
        let args = args.into();
        self.dispatch_local(event, EventKind::Trigger, &self.rc(), &args)
    }

    /// Depth-first downward fan-out through the subtree.
    ///
    /// Every child is visited to completion before the next starts. Each
    /// descendant whose handler returns a value stops traversal of its own
    /// subtree; siblings are unaffected. Returns the collected values as an
    /// array (no positional correspondence to children), or `None` if no
    /// handler produced one.
    pub fn broadcast(&self, event: &str, args: impl Into<EventArgs>) -> Option<Value> {
        let args = args.into();
        self.broadcast_inner(event, &args, None)
    }

    /// [`Widget::broadcast`] with an explicit initiating target: the local
    /// handler runs first and may consume the whole subtree.
    pub fn broadcast_from(
        &self,
        event: &str,
        args: impl Into<EventArgs>,
        target: &Rc<Widget>,
    ) -> Option<Value> {
        let args = args.into();
        self.broadcast_inner(event, &args, Some(target))
    }

    fn broadcast_inner(
        &self,
        event: &str,
        args: &EventArgs,
        target: Option<&Rc<Widget>>,
    ) -> Option<Value> {
        if let Some(target) = target {
            if let Some(stop) = self.dispatch_local(event, EventKind::Broadcast, target, args) {
                return Some(stop);
            }
        }

        // Snapshot so handlers may mutate the map mid-traversal.
        let children: Vec<Rc<Widget>> = self.children.borrow().values().cloned().collect();
        let target = target.cloned().unwrap_or_else(|| self.rc());

        let mut results = Vec::new();
        for child in children {
            if let Some(value) = child.broadcast_inner(event, args, Some(&target)) {
                results.push(value);
            }
        }

        if results.is_empty() {
            None
        } else {
            Some(Value::Array(results))
        }
    }

    /// Walk strictly upward until an ancestor's handler consumes the event.
    ///
    /// Returns the consuming handler's value, or `None` once the root is
    /// passed without interception.
    pub fn emit(&self, event: &str, args: impl Into<EventArgs>) -> Option<Value> {
        let args = args.into();
        self.emit_inner(event, &args, false, None)
    }

    /// Upward walk that, on reaching the root uninterrupted, fans out to the
    /// entire tree via broadcast. Every widget's handler runs at most once.
    pub fn emit_up(&self, event: &str, args: impl Into<EventArgs>) -> Option<Value> {
        let args = args.into();
        self.emit_inner(event, &args, true, None)
    }

    fn emit_inner(
        &self,
        event: &str,
        args: &EventArgs,
        up: bool,
        target: Option<&Rc<Widget>>,
    ) -> Option<Value> {
        if !up {
            if let Some(target) = target {
                if let Some(stop) = self.dispatch_local(event, EventKind::Emit, target, args) {
                    return Some(stop);
                }
            }
        }

        if let Some(parent) = self.parent() {
            let target = target.cloned().unwrap_or_else(|| self.rc());
            return parent.emit_inner(event, args, up, Some(&target));
        }

        if up {
            // Reached the root: notify everyone in the tree, starting here.
            let target = target.cloned().unwrap_or_else(|| self.rc());
            return self.broadcast_inner(event, args, Some(&target));
        }

        None
    }

    fn dispatch_local(
        &self,
        event: &str,
        kind: EventKind,
        target: &Rc<Widget>,
        args: &EventArgs,
    ) -> Option<Value> {
        let handler = self.handlers.get(&format!("{HANDLER_PREFIX}{event}"))?.clone();
        let ctx = EventContext::new(target.clone(), kind);
        handler(&self.rc(), &ctx, args.values())
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("class", &self.class_name)
            .field("container", &self.container)
            .field("children", &self.child_ids())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
