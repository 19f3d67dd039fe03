//! Typed attribute tree and scalar coercion.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::element::Element;

/// A coerced attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Returns the integer value, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string value, if this stayed a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            // Integral floats keep a decimal point so they re-coerce as floats
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Coerce a raw attribute string into a typed [`Value`].
///
/// Rules are tried in order and the first match wins:
///
/// 1. `-?\d+\.\d+` becomes a float
/// 2. `-?\d+` becomes an integer
/// 3. `true` and `false` become booleans
/// 4. anything else stays a string, unmodified
///
/// Coercion never fails. An integer too large for `i64` stays a string.
///
/// # Examples
///
/// ```
/// use nextbus::xml::{Value, coerce};
///
/// assert_eq!(coerce("42"), Value::Int(42));
/// assert_eq!(coerce("-122.4"), Value::Float(-122.4));
/// assert_eq!(coerce("true"), Value::Bool(true));
/// assert_eq!(coerce("12ab"), Value::Str("12ab".to_string()));
/// ```
pub fn coerce(raw: &str) -> Value {
    if is_decimal(raw)
        && let Ok(f) = raw.parse::<f64>()
    {
        return Value::Float(f);
    }

    if is_integer(raw)
        && let Ok(i) = raw.parse::<i64>()
    {
        return Value::Int(i);
    }

    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Str(raw.to_string()),
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn unsigned(s: &str) -> &str {
    s.strip_prefix('-').unwrap_or(s)
}

fn is_integer(s: &str) -> bool {
    all_digits(unsigned(s))
}

fn is_decimal(s: &str) -> bool {
    match unsigned(s).split_once('.') {
        Some((whole, frac)) => all_digits(whole) && all_digits(frac),
        None => false,
    }
}

/// A normalized XML element with typed attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub tag: String,
    pub attributes: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    /// Look up an attribute.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Look up an attribute and render it back to a string.
    ///
    /// Coerced values are rendered in their canonical form, so `"007"`
    /// comes back as `"7"`.
    pub fn attr_string(&self, name: &str) -> Option<String> {
        self.attr(name).map(Value::to_string)
    }

    /// Look up a numeric attribute as a float.
    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(Value::as_f64)
    }

    /// Children with the given tag, in document order.
    pub fn children_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }
}

/// Project an [`Element`] tree into a [`Node`] tree.
pub fn normalize(element: &Element) -> Node {
    Node {
        tag: element.tag.clone(),
        attributes: element
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), coerce(v)))
            .collect(),
        children: element.children.iter().map(normalize).collect(),
        text: element.text.clone().filter(|t| !t.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    #[test]
    fn coercion_table() {
        assert_eq!(coerce("42"), Value::Int(42));
        assert_eq!(coerce("42.0"), Value::Float(42.0));
        assert_eq!(coerce("-3"), Value::Int(-3));
        assert_eq!(coerce("true"), Value::Bool(true));
        assert_eq!(coerce("false"), Value::Bool(false));
        assert_eq!(coerce("abc"), Value::Str("abc".into()));
        assert_eq!(coerce(""), Value::Str(String::new()));
        assert_eq!(coerce("12ab"), Value::Str("12ab".into()));
    }

    #[test]
    fn near_misses_stay_strings() {
        for raw in ["1.", ".5", "-", "--", "+1", "1e5", "1.2.3", "TRUE", "True", " 1", "1 "] {
            assert_eq!(coerce(raw), Value::Str(raw.to_string()), "input {raw:?}");
        }
    }

    #[test]
    fn leading_zeros_and_negative_zero() {
        assert_eq!(coerce("007"), Value::Int(7));
        assert_eq!(coerce("-0"), Value::Int(0));
        assert_eq!(coerce("00.50"), Value::Float(0.5));

        let Value::Float(f) = coerce("-0.0") else {
            panic!("expected float");
        };
        assert!(f == 0.0 && f.is_sign_negative());
    }

    #[test]
    fn integer_overflow_stays_string() {
        let raw = "99999999999999999999";
        assert_eq!(coerce(raw), Value::Str(raw.to_string()));
        assert_eq!(coerce("-9223372036854775808"), Value::Int(i64::MIN));
    }

    #[test]
    fn display_renders_canonical_forms() {
        assert_eq!(Value::Int(22).to_string(), "22");
        assert_eq!(Value::Float(42.0).to_string(), "42.0");
        assert_eq!(Value::Float(37.7).to_string(), "37.7");
        assert_eq!(Value::Float(-122.4).to_string(), "-122.4");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Str("N".into()).to_string(), "N");
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(3.5).as_i64(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Str("x".into()).as_str(), Some("x"));
        assert_eq!(Value::Int(1).as_str(), None);
    }

    #[test]
    fn normalize_coerces_attributes_and_keeps_shape() {
        let root = parse_document(
            r#"<body><route tag="N" title="N-Judah"><stop tag="5205" lat="37.7" lon="-122.4"/><direction tag="N__I_F00" useForUI="true"><stop tag="5205"/></direction></route></body>"#,
        )
        .unwrap();
        let node = normalize(&root);

        assert_eq!(node.tag, "body");
        assert_eq!(node.node_count(), root.element_count());

        let route = &node.children[0];
        assert_eq!(route.attr("tag"), Some(&Value::Str("N".into())));

        let stop = &route.children[0];
        assert_eq!(stop.attr("tag"), Some(&Value::Int(5205)));
        assert_eq!(stop.attr_f64("lat"), Some(37.7));
        assert_eq!(stop.attr_f64("lon"), Some(-122.4));
        assert_eq!(stop.attr_string("tag").as_deref(), Some("5205"));
        assert!(stop.children.is_empty());

        let direction = &route.children[1];
        assert_eq!(direction.attr("useForUI"), Some(&Value::Bool(true)));
        assert_eq!(route.children_tagged("direction").count(), 1);
        assert_eq!(route.children_tagged("stop").count(), 1);
    }

    #[test]
    fn normalize_keeps_text_uncoerced() {
        let node = normalize(&parse_document("<stop tag=\"S1\">42</stop>").unwrap());
        assert_eq!(node.text.as_deref(), Some("42"));
    }

    #[test]
    fn empty_text_is_dropped() {
        let element = Element::new("a").with_text("");
        assert_eq!(normalize(&element).text, None);
    }

    #[test]
    fn serializes_scalars_untagged() {
        let node = normalize(
            &Element::new("vehicle")
                .with_attribute("id", "1432")
                .with_attribute("lat", "37.75")
                .with_attribute("predictable", "true")
                .with_attribute("dirTag", "N__O"),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tag": "vehicle",
                "attributes": {
                    "dirTag": "N__O",
                    "id": 1432,
                    "lat": 37.75,
                    "predictable": true
                }
            })
        );
    }
}
