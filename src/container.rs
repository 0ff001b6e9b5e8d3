//! Container arena - the opaque visual-hosting substrate.
//!
//! Containers form their own hierarchy and carry the messaging the widget
//! tree is built on:
//! - at most one bound widget per container (exclusive, with back-reference)
//! - string attributes (the declarative markup surface used by discovery)
//! - namespaced event subscriptions with upward [`bubble`] routing: the
//!   first subscriber that reports the message handled stops propagation
//!
//! Removing a container is the bulk-teardown hook: every widget bound inside
//! the removed subtree gets `destroy()` invoked before anything is detached,
//! so leave announces still find their subscribers.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Result, WidgetError};
use crate::types::ContainerId;
use crate::widget::Widget;

struct Subscription {
    event: String,
    namespace: String,
    callback: Rc<dyn Fn(&Rc<Widget>) -> bool>,
}

#[derive(Default)]
struct ContainerNode {
    parent: Option<ContainerId>,
    children: Vec<ContainerId>,
    widget: Option<Rc<Widget>>,
    attrs: HashMap<String, String>,
    subscriptions: Vec<Subscription>,
}

thread_local! {
    static CONTAINERS: RefCell<HashMap<ContainerId, ContainerNode>> = RefCell::new(HashMap::new());

    /// Top-level containers in creation order (discovery scans from here).
    static ROOTS: RefCell<Vec<ContainerId>> = RefCell::new(Vec::new());

    static NEXT_CONTAINER: Cell<u64> = const { Cell::new(0) };
}

fn fresh_id() -> ContainerId {
    NEXT_CONTAINER.with(|next| {
        let id = next.get() + 1;
        next.set(id);
        ContainerId(id)
    })
}

// =============================================================================
// Construction
// =============================================================================

/// Create a top-level container.
pub fn create_root() -> ContainerId {
    let id = fresh_id();
    CONTAINERS.with(|c| {
        c.borrow_mut().insert(id, ContainerNode::default());
    });
    ROOTS.with(|roots| roots.borrow_mut().push(id));
    id
}

/// Create a container nested under `parent`.
pub fn create_child(parent: ContainerId) -> Result<ContainerId> {
    let id = fresh_id();
    CONTAINERS.with(|c| {
        let mut map = c.borrow_mut();
        let node = map.get_mut(&parent).ok_or(WidgetError::ContainerNotFound(parent))?;
        node.children.push(id);
        map.insert(
            id,
            ContainerNode {
                parent: Some(parent),
                ..ContainerNode::default()
            },
        );
        Ok(id)
    })
}

// =============================================================================
// Lookups
// =============================================================================

pub fn exists(id: ContainerId) -> bool {
    CONTAINERS.with(|c| c.borrow().contains_key(&id))
}

pub fn parent_of(id: ContainerId) -> Option<ContainerId> {
    CONTAINERS.with(|c| c.borrow().get(&id).and_then(|node| node.parent))
}

/// Direct child containers, in creation order.
pub fn child_containers(id: ContainerId) -> Vec<ContainerId> {
    CONTAINERS.with(|c| {
        c.borrow().get(&id).map(|node| node.children.clone()).unwrap_or_default()
    })
}

/// Top-level containers, in creation order.
pub fn roots() -> Vec<ContainerId> {
    ROOTS.with(|roots| roots.borrow().clone())
}

pub fn container_count() -> usize {
    CONTAINERS.with(|c| c.borrow().len())
}

/// The widget bound to `id`, if any.
pub fn widget_at(id: ContainerId) -> Option<Rc<Widget>> {
    CONTAINERS.with(|c| c.borrow().get(&id).and_then(|node| node.widget.clone()))
}

// =============================================================================
// Attributes
// =============================================================================

/// Set a markup attribute on a container.
pub fn set_attr(id: ContainerId, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
    CONTAINERS.with(|c| {
        let mut map = c.borrow_mut();
        let node = map.get_mut(&id).ok_or(WidgetError::ContainerNotFound(id))?;
        node.attrs.insert(key.into(), value.into());
        Ok(())
    })
}

/// Read a markup attribute.
pub fn attr(id: ContainerId, key: &str) -> Option<String> {
    CONTAINERS.with(|c| {
        c.borrow().get(&id).and_then(|node| node.attrs.get(key).cloned())
    })
}

// =============================================================================
// Widget Binding
// =============================================================================

/// Bind `widget` to the container. Callers check occupancy first.
pub(crate) fn bind(id: ContainerId, widget: &Rc<Widget>) {
    CONTAINERS.with(|c| {
        if let Some(node) = c.borrow_mut().get_mut(&id) {
            node.widget = Some(widget.clone());
        }
    });
}

// =============================================================================
// Pub/Sub Routing
// =============================================================================

/// Subscribe a namespaced handler for `event` on a container.
///
/// The callback returns `true` when it handled the message, which stops any
/// in-flight bubble at this container.
pub(crate) fn subscribe(
    id: ContainerId,
    event: &str,
    namespace: &str,
    callback: impl Fn(&Rc<Widget>) -> bool + 'static,
) {
    CONTAINERS.with(|c| {
        if let Some(node) = c.borrow_mut().get_mut(&id) {
            node.subscriptions.push(Subscription {
                event: event.to_string(),
                namespace: namespace.to_string(),
                callback: Rc::new(callback),
            });
        }
    });
}

/// Drop every subscription on a container registered under `namespace`.
pub fn unsubscribe(id: ContainerId, namespace: &str) {
    CONTAINERS.with(|c| {
        if let Some(node) = c.borrow_mut().get_mut(&id) {
            node.subscriptions.retain(|sub| sub.namespace != namespace);
        }
    });
}

/// Route `event` from `origin` up through the container chain.
///
/// Subscribers on the origin container run first (this is how the announce
/// self-guard works: the announcing widget's own handler declines, and the
/// message travels on to the nearest enclosing host). Returns `true` if any
/// subscriber handled the message.
pub(crate) fn bubble(origin: ContainerId, event: &str, payload: &Rc<Widget>) -> bool {
    let mut cursor = Some(origin);
    while let Some(id) = cursor {
        // Snapshot the matching callbacks so handlers are free to touch the
        // arena while they run.
        let (callbacks, parent) = CONTAINERS.with(|c| {
            let map = c.borrow();
            match map.get(&id) {
                Some(node) => (
                    node.subscriptions
                        .iter()
                        .filter(|sub| sub.event == event)
                        .map(|sub| sub.callback.clone())
                        .collect::<Vec<_>>(),
                    node.parent,
                ),
                None => (Vec::new(), None),
            }
        });

        for callback in callbacks {
            if callback(payload) {
                return true;
            }
        }
        cursor = parent;
    }
    false
}

// =============================================================================
// Bulk Teardown
// =============================================================================

/// Remove a container and everything nested inside it.
///
/// Bound widgets are destroyed first, parent before child, while all
/// subscriptions are still in place; only then are the nodes dropped and the
/// subtree detached. Removing an unknown id is a no-op.
pub fn remove(id: ContainerId) {
    if !exists(id) {
        return;
    }

    let subtree = collect_subtree(id);

    for container in &subtree {
        if let Some(widget) = widget_at(*container) {
            widget.destroy();
        }
    }

    CONTAINERS.with(|c| {
        let mut map = c.borrow_mut();
        let parent = map.get(&id).and_then(|node| node.parent);
        if let Some(parent) = parent {
            if let Some(node) = map.get_mut(&parent) {
                node.children.retain(|&child| child != id);
            }
        }
        for container in &subtree {
            map.remove(container);
        }
    });
    ROOTS.with(|roots| roots.borrow_mut().retain(|&root| root != id));

    log::trace!("removed {} containers under {}", subtree.len(), id);
}

/// Preorder walk of the container subtree rooted at `id`.
fn collect_subtree(id: ContainerId) -> Vec<ContainerId> {
    let mut out = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        out.push(current);
        let children = child_containers(current);
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }
    out
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Clear the whole arena.
pub fn reset_containers() {
    CONTAINERS.with(|c| c.borrow_mut().clear());
    ROOTS.with(|roots| roots.borrow_mut().clear());
    NEXT_CONTAINER.with(|next| next.set(0));
}

// =============================================================================
// Tests
// =============================================================================
