//! Element descriptors - Pure data construction.
//!
//! Two ways to build descriptors:
//! - [`create_element`] takes a flat config (where `key` and `ref` are
//!   picked out) plus positional children, like a JSX call.
//! - [`host`] / [`component`] return an [`ElementBuilder`].
//!
//! Positional children collapse into `props.children`: zero children leave
//! the field out, one child is stored unwrapped, more become a list.
//!
//! # Example
//!
//! ```
//! use spark_reconciler::element::host;
//!
//! let list = host("ul")
//!     .child(host("li").key("a").child("first"))
//!     .child(host("li").key("b").child("second"))
//!     .build();
//! assert_eq!(list.element_type.name(), "ul");
//! ```

use crate::types::{AttrValue, Child, Component, Element, ElementType, Key, Props};

/// Config entry holding the element's key.
pub const KEY_PROP: &str = "key";
/// Config entry holding the element's ref.
pub const REF_PROP: &str = "ref";

/// Build an element from a flat config and positional children.
pub fn create_element(
    element_type: impl Into<ElementType>,
    config: Props,
    children: Vec<Child>,
) -> Element {
    let mut key = None;
    let mut ref_name = None;
    let mut props = Props::new();

    for (name, value) in config.attrs {
        match name.as_str() {
            KEY_PROP => key = Some(Key::from(value.to_string())),
            REF_PROP => ref_name = Some(value.to_string()),
            _ => {
                props.attrs.insert(name, value);
            }
        }
    }
    props.children = collapse_children(children).map(Box::new).or(config.children);

    Element {
        element_type: element_type.into(),
        key,
        props,
        ref_name,
    }
}

fn collapse_children(mut children: Vec<Child>) -> Option<Child> {
    match children.len() {
        0 => None,
        1 => children.pop(),
        _ => Some(Child::List(children)),
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Fluent element builder.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    element_type: ElementType,
    key: Option<Key>,
    ref_name: Option<String>,
    attrs: Props,
    children: Vec<Child>,
}

/// Start a host container element.
pub fn host(tag: &str) -> ElementBuilder {
    ElementBuilder::new(ElementType::host(tag))
}

/// Start a component element.
pub fn component(component: &Component) -> ElementBuilder {
    ElementBuilder::new(ElementType::Component(component.clone()))
}

impl ElementBuilder {
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            key: None,
            ref_name: None,
            attrs: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn ref_name(mut self, name: impl Into<String>) -> Self {
        self.ref_name = Some(name.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs = self.attrs.with(name, value);
        self
    }

    /// Append one positional child.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several positional children.
    pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Element {
        let mut props = self.attrs;
        props.children = collapse_children(self.children).map(Box::new);
        Element {
            element_type: self.element_type,
            key: self.key,
            props,
            ref_name: self.ref_name,
        }
    }
}

impl From<ElementBuilder> for Element {
    fn from(value: ElementBuilder) -> Self {
        value.build()
    }
}

impl From<ElementBuilder> for Child {
    fn from(value: ElementBuilder) -> Self {
        Child::Element(value.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element_extracts_key_and_ref() {
        let config = Props::new()
            .with("key", 5)
            .with("ref", "input")
            .with("id", "name");
        let el = create_element("input", config, vec![]);

        assert_eq!(el.key, Some(Key::from("5")));
        assert_eq!(el.ref_name.as_deref(), Some("input"));
        assert_eq!(el.props.get("id").and_then(AttrValue::as_str), Some("name"));
        assert!(el.props.get("key").is_none());
        assert!(el.props.children.is_none());
    }

    #[test]
    fn test_single_child_is_unwrapped() {
        let el = create_element("p", Props::new(), vec!["hello".into()]);
        assert_eq!(el.props.children.as_deref(), Some(&Child::Text("hello".into())));
    }

    #[test]
    fn test_many_children_become_list() {
        let el = host("p").child("a").child("b").build();
        assert_eq!(
            el.props.children.as_deref(),
            Some(&Child::List(vec![Child::Text("a".into()), Child::Text("b".into())]))
        );
    }

    #[test]
    fn test_nested_elements_keep_their_children() {
        let el = host("ul").child(host("li").key("a").child("first")).build();
        let Some(Child::Element(li)) = el.props.children.as_deref() else {
            panic!("expected a single element child");
        };
        assert_eq!(li.key, Some(Key::from("a")));
        assert_eq!(li.props.children.as_deref(), Some(&Child::Text("first".into())));
    }

    #[test]
    fn test_component_element() {
        let c = Component::new("Counter", |_, _| Ok(Child::Empty));
        let el = component(&c).key(1).build();
        assert_eq!(el.element_type, ElementType::Component(c));
        assert_eq!(el.key, Some(Key::from(1)));
    }
}
