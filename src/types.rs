//! Core types for spark-reconciler.
//!
//! These types define the foundation that everything builds on. Element
//! descriptors describe *what* the UI should look like; work nodes (see
//! [`crate::engine`]) track *how* the host tree gets there.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::reconciler::Hooks;

// =============================================================================
// Key
// =============================================================================

/// Stable identity of an element among its siblings.
///
/// Keys are always stored as strings; numeric keys are stringified on the way
/// in, so `Key::from(1)` and `Key::from("1")` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Rc<str>);

impl Key {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(Rc::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(Rc::from(value))
    }
}

macro_rules! key_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Key {
            fn from(value: $t) -> Self {
                Self(Rc::from(value.to_string()))
            }
        })*
    };
}

key_from_int!(i32, i64, u32, u64, usize);

// =============================================================================
// Props
// =============================================================================

/// A single non-children prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl AttrValue {
    /// String view of the value, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// Name of the attribute text nodes keep their content under.
pub const TEXT_CONTENT: &str = "content";

/// Input configuration of an element or work node.
///
/// Positional children live in `children`, never in `attrs`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    pub attrs: BTreeMap<String, AttrValue>,
    pub children: Option<Box<Child>>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Props of a text node.
    pub fn text(content: impl Into<String>) -> Self {
        let mut props = Self::default();
        props
            .attrs
            .insert(TEXT_CONTENT.to_string(), AttrValue::Str(content.into()));
        props
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// Text content, for props built with [`Props::text`].
    pub fn content(&self) -> Option<&str> {
        self.attrs.get(TEXT_CONTENT).and_then(AttrValue::as_str)
    }
}

// =============================================================================
// Element Type
// =============================================================================

/// Render function of a stateful component.
pub type RenderFn = dyn Fn(&mut Hooks, &Props) -> Result<Child>;

/// A stateful component: a named render function.
///
/// Identity is pointer identity of the render function, so two `Component`s
/// compare equal only when cloned from the same value.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new<F>(name: &str, render: F) -> Self
    where
        F: Fn(&mut Hooks, &Props) -> Result<Child> + 'static,
    {
        Self {
            name: Rc::from(name),
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, hooks: &mut Hooks, props: &Props) -> Result<Child> {
        (self.render)(hooks, props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

/// Type identifier of an element, used for reuse-compatibility checks.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    /// Host container element, identified by tag name.
    Host(Rc<str>),
    /// Stateful component.
    Component(Component),
}

impl ElementType {
    pub fn host(tag: &str) -> Self {
        ElementType::Host(Rc::from(tag))
    }

    /// Human-readable name for logs.
    pub fn name(&self) -> &str {
        match self {
            ElementType::Host(tag) => tag,
            ElementType::Component(c) => c.name(),
        }
    }
}

impl From<Component> for ElementType {
    fn from(value: Component) -> Self {
        ElementType::Component(value)
    }
}

impl From<&str> for ElementType {
    fn from(value: &str) -> Self {
        ElementType::host(value)
    }
}

// =============================================================================
// Element / Child
// =============================================================================

/// An element descriptor: pure data describing one piece of UI.
///
/// The `Child::Element` variant is the marker that tells descriptors apart
/// from primitive children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub element_type: ElementType,
    pub key: Option<Key>,
    pub props: Props,
    pub ref_name: Option<String>,
}

/// Anything that can appear in a children position.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Child {
    Element(Element),
    /// Primitive text-like value (strings, numbers).
    Text(String),
    /// Ordered sequence of children.
    List(Vec<Child>),
    /// null / boolean / absent: renders nothing.
    #[default]
    Empty,
}

impl Child {
    pub fn is_empty(&self) -> bool {
        matches!(self, Child::Empty)
    }
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Child::Element(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<bool> for Child {
    fn from(_: bool) -> Self {
        Child::Empty
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Empty
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(value: Vec<T>) -> Self {
        Child::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Child::Empty, Into::into)
    }
}

// =============================================================================
// Work Tag
// =============================================================================

/// Kind of a work node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkTag {
    Root,
    HostContainerElement,
    HostTextElement,
    StatefulComponent,
}

impl WorkTag {
    /// Kinds that own a host instance.
    #[inline]
    pub const fn is_host(self) -> bool {
        matches!(self, WorkTag::HostContainerElement | WorkTag::HostTextElement)
    }
}

// =============================================================================
// Effect Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Host mutations a node (or its subtree) needs at commit time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u8 {
        const NONE = 0;
        const PLACEMENT = 1 << 0;
        const UPDATE = 1 << 1;
        const CHILD_DELETION = 1 << 2;

        /// Everything the commit walker acts on.
        const MUTATION_MASK = Self::PLACEMENT.bits()
            | Self::UPDATE.bits()
            | Self::CHILD_DELETION.bits();
    }
}
