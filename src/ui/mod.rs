//! Host UI abstraction.
//!
//! Controllers never query the page by text; they mutate a tree of elements
//! keyed by stable [`ElementId`]s that are resolved once at start-up (see
//! [`handles`]). Every mutator reports whether the element existed so callers
//! can degrade gracefully when a region is absent.

pub mod handles;
pub mod ids;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use handles::CheckoutHandles;

/// Stable identifier of a UI element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Observable state of a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub visible: bool,
    pub enabled: bool,
    pub text: String,
    pub value: String,
    pub classes: BTreeSet<String>,
    pub styles: BTreeMap<String, String>,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            visible: true,
            enabled: true,
            text: String::new(),
            value: String::new(),
            classes: BTreeSet::new(),
            styles: BTreeMap::new(),
        }
    }
}

impl Element {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }
}

/// Mutable UI tree shared by the controllers.
pub trait UiTree: Send + Sync {
    fn contains(&self, id: &ElementId) -> bool;

    /// Snapshot of an element's current state.
    fn element(&self, id: &ElementId) -> Option<Element>;

    fn set_visible(&self, id: &ElementId, visible: bool) -> bool;

    fn set_enabled(&self, id: &ElementId, enabled: bool) -> bool;

    fn set_text(&self, id: &ElementId, text: &str) -> bool;

    fn set_value(&self, id: &ElementId, value: &str) -> bool;

    fn add_class(&self, id: &ElementId, class: &str) -> bool;

    fn remove_class(&self, id: &ElementId, class: &str) -> bool;

    fn set_style(&self, id: &ElementId, property: &str, value: &str) -> bool;

    /// Inserts (or replaces) an element.
    fn append(&self, id: ElementId, element: Element);

    fn remove(&self, id: &ElementId) -> bool;

    fn text(&self, id: &ElementId) -> Option<String> {
        self.element(id).map(|element| element.text)
    }
}

/// In-memory [`UiTree`] used by the terminal front end and the tests.
#[derive(Debug, Default)]
pub struct MemoryUi {
    elements: RwLock<BTreeMap<ElementId, Element>>,
}

impl MemoryUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elements<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = (ElementId, Element)>,
    {
        Self {
            elements: RwLock::new(elements.into_iter().collect()),
        }
    }

    /// Elements carrying `class`, in identifier order.
    pub fn find_by_class(&self, class: &str) -> Vec<(ElementId, Element)> {
        self.read()
            .iter()
            .filter(|(_, element)| element.has_class(class))
            .map(|(id, element)| (id.clone(), element.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<ElementId, Element>> {
        self.elements
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<ElementId, Element>> {
        self.elements
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update(&self, id: &ElementId, apply: impl FnOnce(&mut Element)) -> bool {
        match self.write().get_mut(id) {
            Some(element) => {
                apply(element);
                true
            }
            None => false,
        }
    }
}

impl UiTree for MemoryUi {
    fn contains(&self, id: &ElementId) -> bool {
        self.read().contains_key(id)
    }

    fn element(&self, id: &ElementId) -> Option<Element> {
        self.read().get(id).cloned()
    }

    fn set_visible(&self, id: &ElementId, visible: bool) -> bool {
        self.update(id, |element| element.visible = visible)
    }

    fn set_enabled(&self, id: &ElementId, enabled: bool) -> bool {
        self.update(id, |element| element.enabled = enabled)
    }

    fn set_text(&self, id: &ElementId, text: &str) -> bool {
        self.update(id, |element| element.text = text.to_string())
    }

    fn set_value(&self, id: &ElementId, value: &str) -> bool {
        self.update(id, |element| element.value = value.to_string())
    }

    fn add_class(&self, id: &ElementId, class: &str) -> bool {
        self.update(id, |element| {
            element.classes.insert(class.to_string());
        })
    }

    fn remove_class(&self, id: &ElementId, class: &str) -> bool {
        self.update(id, |element| {
            element.classes.remove(class);
        })
    }

    fn set_style(&self, id: &ElementId, property: &str, value: &str) -> bool {
        self.update(id, |element| {
            element
                .styles
                .insert(property.to_string(), value.to_string());
        })
    }

    fn append(&self, id: ElementId, element: Element) {
        self.write().insert(id, element);
    }

    fn remove(&self, id: &ElementId) -> bool {
        self.write().remove(id).is_some()
    }
}
