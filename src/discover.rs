//! Declarative auto-discovery of widgets from container attributes.
//!
//! Containers tagged with the [`WIDGET_ATTR`] attribute are instantiated on
//! scan, with [`OPTIONS_ATTR`] optionally carrying a JSON object of options.
//! The host environment decides when to scan (typically once the container
//! hierarchy is fully built, the page-ready moment).

use std::rc::Rc;

use crate::container;
use crate::error::{Result, WidgetError};
use crate::registry;
use crate::types::{ContainerId, Options, Value};
use crate::widget::Widget;

/// Attribute naming the widget class to instantiate on a container.
pub const WIDGET_ATTR: &str = "data-widget";

/// Attribute holding a JSON object of instance options.
pub const OPTIONS_ATTR: &str = "data-options";

/// Scan every container and instantiate all declared widgets.
///
/// Containers are visited in tree order (roots in creation order, then
/// depth-first), so enclosing widgets exist before the widgets nested inside
/// them announce themselves. Containers that already host a widget are
/// skipped, which makes the scan re-runnable after new containers appear.
///
/// Returns the created widgets. Fails on the first unregistered class or
/// malformed options attribute.
pub fn discover_all() -> Result<Vec<Rc<Widget>>> {
    let mut created = Vec::new();
    for root in container::roots() {
        discover_under(root, &mut created)?;
    }
    log::debug!("discovery instantiated {} widgets", created.len());
    Ok(created)
}

/// Scan a single container subtree.
pub fn discover(root: ContainerId) -> Result<Vec<Rc<Widget>>> {
    let mut created = Vec::new();
    discover_under(root, &mut created)?;
    Ok(created)
}

fn discover_under(id: ContainerId, created: &mut Vec<Rc<Widget>>) -> Result<()> {
    if let Some(class) = container::attr(id, WIDGET_ATTR) {
        if container::widget_at(id).is_none() {
            let options = parse_options(id)?;
            created.push(registry::create_with(&class, id, options)?);
        }
    }
    for child in container::child_containers(id) {
        discover_under(child, created)?;
    }
    Ok(())
}

fn parse_options(id: ContainerId) -> Result<Options> {
    match container::attr(id, OPTIONS_ATTR) {
        None => Ok(Options::new()),
        Some(raw) => match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(WidgetError::OptionsNotObject(id)),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
