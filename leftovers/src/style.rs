//! Inline style serialization.
//!
//! A style mapping such as `{ backgroundColor: "red", marginTop: 4 }` becomes
//! `background-color:red;margin-top:4px`, the same text a client-side renderer
//! produces for the `style` attribute.

use indexmap::IndexMap;

use crate::props::format_number;

/// One value of a style mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Str(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Str(s.to_owned())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Str(s)
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        StyleValue::Number(n.into())
    }
}

impl From<bool> for StyleValue {
    fn from(b: bool) -> Self {
        StyleValue::Bool(b)
    }
}

/// Ordered CSS property name → value mapping, names in camelCase.
pub type StyleMap = IndexMap<String, StyleValue>;

/// CSS properties that take plain numbers.
const UNITLESS_PROPERTIES: &[&str] = &[
    "animationIterationCount",
    "borderImageOutset",
    "borderImageSlice",
    "borderImageWidth",
    "boxFlex",
    "boxFlexGroup",
    "boxOrdinalGroup",
    "columnCount",
    "columns",
    "flex",
    "flexGrow",
    "flexPositive",
    "flexShrink",
    "flexNegative",
    "flexOrder",
    "gridRow",
    "gridRowEnd",
    "gridRowSpan",
    "gridRowStart",
    "gridColumn",
    "gridColumnEnd",
    "gridColumnSpan",
    "gridColumnStart",
    "fontWeight",
    "lineClamp",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "tabSize",
    "widows",
    "zIndex",
    "zoom",
    // SVG-related properties
    "fillOpacity",
    "floodOpacity",
    "stopOpacity",
    "strokeDasharray",
    "strokeDashoffset",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
];

const VENDOR_PREFIXES: &[&str] = &["Webkit", "ms", "Moz", "O"];

/// Check if a property takes unitless numbers, vendor-prefixed forms included.
fn is_unitless(name: &str) -> bool {
    if UNITLESS_PROPERTIES.contains(&name) {
        return true;
    }
    VENDOR_PREFIXES.iter().any(|prefix| {
        let Some(rest) = name.strip_prefix(prefix) else {
            return false;
        };
        let mut chars = rest.chars();
        match chars.next() {
            Some(first) if first.is_ascii_uppercase() => {
                let unprefixed = format!("{}{}", first.to_ascii_lowercase(), chars.as_str());
                UNITLESS_PROPERTIES.contains(&unprefixed.as_str())
            }
            _ => false,
        }
    })
}

/// `backgroundColor` → `background-color`, `msTransition` → `-ms-transition`.
pub fn hyphenate_style_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    if out.starts_with("ms-") {
        out.insert(0, '-');
    }
    out
}

fn style_value(name: &str, value: &StyleValue, is_custom_property: bool) -> String {
    match value {
        StyleValue::Null | StyleValue::Bool(_) => String::new(),
        StyleValue::Number(n) if !is_custom_property && *n != 0.0 && !is_unitless(name) => {
            format!("{}px", format_number(*n))
        }
        StyleValue::Number(n) => format_number(*n),
        StyleValue::Str(s) => s.trim().to_owned(),
    }
}

/// Serialize a style mapping to `prop:value;prop:value`.
///
/// Returns `None` when nothing is left to emit.
pub fn markup_for_styles(styles: &StyleMap) -> Option<String> {
    let mut serialized = String::new();
    let mut delimiter = "";
    for (name, value) in styles {
        if matches!(value, StyleValue::Null) {
            continue;
        }
        let is_custom_property = name.starts_with("--");
        serialized.push_str(delimiter);
        if is_custom_property {
            serialized.push_str(name);
        } else {
            serialized.push_str(&hyphenate_style_name(name));
        }
        serialized.push(':');
        serialized.push_str(&style_value(name, value, is_custom_property));
        delimiter = ";";
    }
    (!serialized.is_empty()).then_some(serialized)
}
