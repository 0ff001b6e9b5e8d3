//! Class registry - named widget classes and the instance factory.
//!
//! Process-wide (thread-local) state, initialized on first use and
//! read-mostly afterwards:
//! - class table: name -> flattened [`ClassDef`]
//! - instance id counter, strictly increasing from 1, never reused
//!
//! Inheritance is resolved here at definition time: defining a class that
//! `extends` a base merges the base's already-flattened method and default
//! tables under the new class's own members, so lookup never walks a chain.
//!
//! Redefining an existing name silently overwrites it. That is accepted
//! behavior, not a protection gap being papered over; see DESIGN.md.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::class::{ClassDef, ClassSpec};
use crate::container;
use crate::error::{Result, WidgetError};
use crate::types::{ContainerId, Options, WidgetId};
use crate::widget::Widget;

thread_local! {
    static CLASSES: RefCell<HashMap<String, ClassDef>> = RefCell::new(HashMap::new());

    static NEXT_ID: Cell<WidgetId> = const { Cell::new(0) };
}

// =============================================================================
// Definition
// =============================================================================

/// Define (or redefine) a widget class.
///
/// Fails only when `spec` extends a class that has not been defined yet.
pub fn define(name: impl Into<String>, spec: ClassSpec) -> Result<()> {
    let name = name.into();

    let (methods, defaults) = match spec.base.as_deref() {
        Some(base_name) => {
            let base = resolve(base_name)
                .ok_or_else(|| WidgetError::BaseClassNotFound(base_name.to_string()))?;
            base.flatten_into(&spec)
        }
        None => (spec.methods.clone(), spec.defaults.clone()),
    };

    let def = ClassDef::new(name.clone(), spec.base.clone(), methods, defaults);
    let previous = CLASSES.with(|classes| classes.borrow_mut().insert(name.clone(), def));
    if previous.is_some() {
        log::debug!("class {name} redefined");
    } else {
        log::debug!("class {name} defined");
    }
    Ok(())
}

/// Look up a class by name.
///
/// A missing class is the caller's error; instantiation paths surface it as
/// [`WidgetError::ClassNotFound`].
pub fn resolve(name: &str) -> Option<ClassDef> {
    CLASSES.with(|classes| classes.borrow().get(name).cloned())
}

pub fn is_defined(name: &str) -> bool {
    CLASSES.with(|classes| classes.borrow().contains_key(name))
}

pub fn class_count() -> usize {
    CLASSES.with(|classes| classes.borrow().len())
}

// =============================================================================
// Instance Ids
// =============================================================================

/// Issue a fresh instance id. Strictly increasing, first value 1, never
/// reset during the process lifetime (tests excepted).
pub fn next_id() -> WidgetId {
    NEXT_ID.with(|next| {
        let id = next.get() + 1;
        next.set(id);
        id
    })
}

// =============================================================================
// Instance Factory
// =============================================================================

/// Instantiate `name` bound to `container` with empty options.
pub fn create(name: &str, container: ContainerId) -> Result<Rc<Widget>> {
    create_with(name, container, Options::new())
}

/// Instantiate `name` bound to `container`.
///
/// Runs the full creation lifecycle: resolve the class, verify the exclusive
/// container binding, copy defaults onto the instance, join the tree via the
/// announce handshake, then fire the `create` lifecycle handler.
pub fn create_with(name: &str, container: ContainerId, options: Options) -> Result<Rc<Widget>> {
    let class = resolve(name).ok_or_else(|| WidgetError::ClassNotFound(name.to_string()))?;

    if !container::exists(container) {
        return Err(WidgetError::ContainerNotFound(container));
    }
    if let Some(existing) = container::widget_at(container) {
        return Err(WidgetError::ContainerOccupied(existing.id()));
    }

    let widget = Widget::instantiate(&class, next_id(), container, options);
    container::bind(container, &widget);
    widget.mount();
    widget.trigger("create", ());
    Ok(widget)
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Clear the class table and restart the id counter.
pub fn reset_registry() {
    CLASSES.with(|classes| classes.borrow_mut().clear());
    NEXT_ID.with(|next| next.set(0));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::class::ClassSpec;
    use crate::container;

    fn setup() {
        reset_registry();
        container::reset_containers();
    }

    #[test]
    fn test_define_and_resolve() {
        setup();
        assert!(resolve("Panel").is_none());

        define("Panel", ClassSpec::new().default_value("open", json!(true))).unwrap();
        assert!(is_defined("Panel"));
        assert_eq!(class_count(), 1);

        let def = resolve("Panel").unwrap();
        assert_eq!(def.name(), "Panel");
        assert_eq!(def.base(), None);
    }

    #[test]
    fn test_define_with_unknown_base() {
        setup();
        let result = define("Derived", ClassSpec::new().extends("Ghost"));
        assert!(matches!(result, Err(WidgetError::BaseClassNotFound(name)) if name == "Ghost"));
        assert!(!is_defined("Derived"));
    }

    #[test]
    fn test_redefinition_overwrites() {
        setup();
        define("Panel", ClassSpec::new().default_value("open", json!(true))).unwrap();
        define("Panel", ClassSpec::new().default_value("open", json!(false))).unwrap();

        assert_eq!(class_count(), 1);
        let c = container::create_root();
        let w = create("Panel", c).unwrap();
        assert_eq!(w.field("open"), Some(json!(false)));
    }

    #[test]
    fn test_inheritance_fallback() {
        setup();
        define(
            "Base",
            ClassSpec::new()
                .on("describe", |_w, _ctx, _args| Some(json!("base")))
                .default_value("depth", json!(1)),
        )
        .unwrap();
        define("Derived", ClassSpec::new().extends("Base").default_value("depth", json!(2))).unwrap();

        let base_def = resolve("Base").unwrap();
        let derived_def = resolve("Derived").unwrap();
        assert_eq!(derived_def.base(), Some("Base"));

        // Non-overridden method resolves to the very same handler.
        let inherited = derived_def.method("on_describe").unwrap();
        let original = base_def.method("on_describe").unwrap();
        assert!(Rc::ptr_eq(&inherited, &original));

        // Own defaults shadow inherited ones.
        let c = container::create_root();
        let w = create("Derived", c).unwrap();
        assert_eq!(w.field("depth"), Some(json!(2)));
        assert_eq!(w.trigger("describe", ()), Some(json!("base")));
    }

    #[test]
    fn test_grandchild_inherits_through_chain() {
        setup();
        define("A", ClassSpec::new().on("m", |_w, _ctx, _args| Some(json!("A::m")))).unwrap();
        define("B", ClassSpec::new().extends("A")).unwrap();
        define("C", ClassSpec::new().extends("B")).unwrap();

        let a = resolve("A").unwrap().method("on_m").unwrap();
        let c = resolve("C").unwrap().method("on_m").unwrap();
        assert!(Rc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_next_id_strictly_increasing() {
        setup();
        let ids: Vec<_> = (0..100).map(|_| next_id()).collect();
        assert_eq!(ids[0], 1);
        assert!(ids.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn test_create_assigns_fresh_ids() {
        setup();
        define("Node", ClassSpec::new()).unwrap();
        let w1 = create("Node", container::create_root()).unwrap();
        let w2 = create("Node", container::create_root()).unwrap();
        assert!(w2.id() > w1.id());
        assert_eq!(w1.class_name(), "Node");
        assert_eq!(w1.event_namespace(), format!("Node-{}", w1.id()));
    }

    #[test]
    fn test_create_unregistered_class() {
        setup();
        let c = container::create_root();
        assert!(matches!(
            create("Ghost", c),
            Err(WidgetError::ClassNotFound(name)) if name == "Ghost"
        ));
    }

    #[test]
    fn test_create_on_dead_container() {
        setup();
        define("Node", ClassSpec::new()).unwrap();
        let c = container::create_root();
        container::remove(c);
        assert!(matches!(create("Node", c), Err(WidgetError::ContainerNotFound(_))));
    }

    #[test]
    fn test_container_binding_is_exclusive() {
        setup();
        define("Node", ClassSpec::new()).unwrap();
        let c = container::create_root();
        let first = create("Node", c).unwrap();
        assert_eq!(container::widget_at(c).unwrap().id(), first.id());

        assert!(matches!(
            create("Node", c),
            Err(WidgetError::ContainerOccupied(id)) if id == first.id()
        ));
    }

    #[test]
    fn test_create_with_options() {
        setup();
        define("Node", ClassSpec::new()).unwrap();
        let c = container::create_root();

        let mut options = Options::new();
        options.insert("title".into(), json!("hello"));
        let w = create_with("Node", c, options).unwrap();

        assert_eq!(w.option("title"), Some(json!("hello")));
        assert_eq!(w.option("missing"), None);
    }

    #[test]
    fn test_create_fires_lifecycle_handler() {
        setup();
        define(
            "Hooked",
            ClassSpec::new()
                .default_value("ready", json!(false))
                .on("create", |w, _ctx, _args| {
                    w.set_field("ready", json!(true));
                    None
                }),
        )
        .unwrap();

        let w = create("Hooked", container::create_root()).unwrap();
        assert_eq!(w.field("ready"), Some(json!(true)));
    }

    #[test]
    fn test_reset_registry() {
        setup();
        define("Node", ClassSpec::new()).unwrap();
        next_id();

        reset_registry();
        assert_eq!(class_count(), 0);
        assert_eq!(next_id(), 1);
    }
}
