//! End-to-end scenario over the public API: declarative markup is discovered,
//! the tree assembles itself, events route both ways, and container removal
//! tears everything down.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use arbor_widgets::{container, discover, registry, ClassSpec, EventKind, WidgetId};

fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
    registry::reset_registry();
    container::reset_containers();
}

#[test]
fn declarative_app_lifecycle() {
    setup();

    let selections: Rc<RefCell<Vec<(WidgetId, String)>>> = Rc::new(RefCell::new(Vec::new()));

    registry::define(
        "App",
        ClassSpec::new().on("select", {
            let selections = selections.clone();
            move |_w, ctx, args| {
                let label = args[0].as_str().unwrap_or_default().to_string();
                selections.borrow_mut().push((ctx.target.id(), label));
                Some(json!("accepted"))
            }
        }),
    )
    .unwrap();

    registry::define(
        "Menu",
        ClassSpec::new().default_value("open", json!(false)).on("toggle", |w, _ctx, _args| {
            let open = w.field("open").and_then(|v| v.as_bool()).unwrap_or(false);
            w.set_field("open", json!(!open));
            None
        }),
    )
    .unwrap();

    registry::define("MenuItem", ClassSpec::new().extends("Menu")).unwrap();

    // Markup: app > menu > two items.
    let window = container::create_root();
    let menu_slot = container::create_child(window).unwrap();
    let item_a = container::create_child(menu_slot).unwrap();
    let item_b = container::create_child(menu_slot).unwrap();

    container::set_attr(window, discover::WIDGET_ATTR, "App").unwrap();
    container::set_attr(menu_slot, discover::WIDGET_ATTR, "Menu").unwrap();
    container::set_attr(menu_slot, discover::OPTIONS_ATTR, r#"{"align": "left"}"#).unwrap();
    container::set_attr(item_a, discover::WIDGET_ATTR, "MenuItem").unwrap();
    container::set_attr(item_b, discover::WIDGET_ATTR, "MenuItem").unwrap();

    let created = discover::discover_all().unwrap();
    assert_eq!(created.len(), 4);

    let app = container::widget_at(window).unwrap();
    let menu = container::widget_at(menu_slot).unwrap();
    let a = container::widget_at(item_a).unwrap();
    let b = container::widget_at(item_b).unwrap();

    // Tree assembled through the announce handshake alone.
    assert_eq!(menu.parent().unwrap().id(), app.id());
    assert_eq!(a.parent().unwrap().id(), menu.id());
    assert_eq!(b.parent().unwrap().id(), menu.id());
    assert_eq!(menu.child_count(), 2);
    assert_eq!(menu.option("align"), Some(json!("left")));

    // Upward: an item's selection is intercepted by the app.
    let result = a.emit("select", json!("file.open"));
    assert_eq!(result, Some(json!("accepted")));
    assert_eq!(&*selections.borrow(), &[(a.id(), "file.open".to_string())]);

    // Downward: a broadcast toggle reaches menu and both items, inherited
    // handler included.
    app.broadcast("toggle", ());
    assert_eq!(menu.field("open"), Some(json!(true)));
    assert_eq!(a.field("open"), Some(json!(true)));
    assert_eq!(b.field("open"), Some(json!(true)));

    // Instance state never aliases between siblings.
    a.set_field("open", json!(false));
    assert_eq!(b.field("open"), Some(json!(true)));

    // Bulk teardown: removing the menu slot destroys menu and items and
    // detaches them from the app.
    container::remove(menu_slot);
    assert_eq!(app.child_count(), 0);
    assert!(container::widget_at(window).is_some());
    assert!(!container::exists(menu_slot));

    // The app itself is untouched and still routes events.
    assert_eq!(app.trigger("select", json!("quit")), Some(json!("accepted")));
}

#[test]
fn emit_up_notifies_whole_tree_once() {
    setup();

    let hits: Rc<RefCell<Vec<WidgetId>>> = Rc::new(RefCell::new(Vec::new()));
    registry::define(
        "Node",
        ClassSpec::new().on("sync", {
            let hits = hits.clone();
            move |w, ctx, _args| {
                assert_eq!(ctx.kind, EventKind::Broadcast);
                hits.borrow_mut().push(w.id());
                None
            }
        }),
    )
    .unwrap();

    let root_c = container::create_root();
    let left_c = container::create_child(root_c).unwrap();
    let right_c = container::create_child(root_c).unwrap();
    let leaf_c = container::create_child(left_c).unwrap();

    let root = registry::create("Node", root_c).unwrap();
    let left = registry::create("Node", left_c).unwrap();
    let right = registry::create("Node", right_c).unwrap();
    let leaf = registry::create("Node", leaf_c).unwrap();

    leaf.emit_up("sync", ());

    let mut hits = hits.borrow_mut();
    hits.sort_unstable();
    let mut expected = vec![root.id(), left.id(), right.id(), leaf.id()];
    expected.sort_unstable();
    assert_eq!(*hits, expected);
}
