//! Property values and the attribute projector.
//!
//! Drivers describe an element's properties as an ordered [`Props`] mapping.
//! When the host finalizes a node, [`apply_props`] turns those properties into
//! attributes and, for string or numeric `children`, a text child.

use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;
use indexmap::IndexMap;

use crate::error::Result;
use crate::style::{StyleMap, markup_for_styles};
use crate::tree::{NodeHandle, SsrTree};

/// Ordered property name → value mapping.
pub type Props = IndexMap<String, PropValue>;

/// An event handler. Only meaningful on the client; never serialized.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn()>);

impl EventHandler {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler")
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(CompactString),
    Number(f64),
    Bool(bool),
    Null,
    Style(StyleMap),
    Handler(EventHandler),
}

impl PropValue {
    /// Text a string or number `children` property turns into.
    pub fn as_text(&self) -> Option<CompactString> {
        match self {
            PropValue::Str(s) => Some(s.clone()),
            PropValue::Number(n) => Some(format_number(*n).into()),
            _ => None,
        }
    }

    /// String form used when a property becomes an attribute.
    pub fn to_attribute_value(&self) -> CompactString {
        match self {
            PropValue::Str(s) => s.clone(),
            PropValue::Number(n) => format_number(*n).into(),
            PropValue::Bool(b) => CompactString::from(if *b { "true" } else { "false" }),
            PropValue::Null => CompactString::from("null"),
            PropValue::Style(styles) => markup_for_styles(styles).unwrap_or_default().into(),
            PropValue::Handler(_) => CompactString::default(),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.into())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s.into())
    }
}

impl From<CompactString> for PropValue {
    fn from(s: CompactString) -> Self {
        PropValue::Str(s)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Number(n.into())
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<StyleMap> for PropValue {
    fn from(styles: StyleMap) -> Self {
        PropValue::Style(styles)
    }
}

impl From<EventHandler> for PropValue {
    fn from(handler: EventHandler) -> Self {
        PropValue::Handler(handler)
    }
}

/// Format a number the way a client-side renderer stringifies it:
/// `3`, `1.5`, `NaN`, `Infinity`, `1e+21`, `1e-7`.
///
/// Magnitudes at or above `1e21` or below `1e-6` use exponent form.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_owned()
    } else if n == 0.0 {
        // covers -0.0
        "0".to_owned()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let exp = format!("{n:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        }
    } else {
        n.to_string()
    }
}

/// Event handler props (`onClick`, `ONMOUSEOVER`, ...) are client-side only.
pub fn is_event_listener(name: &str) -> bool {
    name.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("on"))
}

/// Whether the host sets an element's text itself, instead of the driver
/// mounting the children.
pub fn should_set_text_content(tag: &str, props: &Props) -> bool {
    tag == "textarea"
        || matches!(
            props.get("children"),
            Some(PropValue::Str(_) | PropValue::Number(_))
        )
}

/// Project properties onto a freshly created element, in order.
///
/// - `children` (string or number) → text child
/// - `className` → `class`, whatever the value
/// - `style` (mapping) → serialized `style`
/// - event listeners and handler values → dropped
/// - everything else → attribute, verbatim
///
/// A style mapping that serializes to nothing (empty, or only `Null` entries)
/// sets no `style` attribute.
pub fn apply_props(tree: &mut SsrTree, node: NodeHandle, props: &Props) -> Result<()> {
    for (name, value) in props {
        match (name.as_str(), value) {
            ("children", value) => {
                if let Some(text) = value.as_text() {
                    let child = tree.create_text(text);
                    tree.append_child(node, child)?;
                }
            }
            ("className", value) => tree.set_attribute(node, "class", value.to_attribute_value())?,
            ("style", PropValue::Style(styles)) => {
                if let Some(style) = markup_for_styles(styles) {
                    tree.set_attribute(node, "style", style)?;
                }
            }
            (_, PropValue::Handler(_)) => {}
            (name, _) if is_event_listener(name) => {}
            (name, value) => tree.set_attribute(node, name, value.to_attribute_value())?,
        }
    }
    Ok(())
}
