//! Result model: completion sets, items and positions

use crate::host::EditorHost;
use crate::marshal::{Marshalled, ITEM_FIELDS, SET_FIELDS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// Cursor coordinate owned by the host
///
/// The hints layer never validates or adjusts positions; it only carries them
/// between providers and the host.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Host element a menu row is drawn into
pub trait RenderTarget {
    /// Append text content to the row
    fn push_text(&mut self, text: &str);

    /// Add a CSS-style class name to the row
    fn add_class(&mut self, class_name: &str);
}

/// Custom row rendering for an item
pub type Renderer = Arc<dyn Fn(&mut dyn RenderTarget, &Item) + Send + Sync>;

/// Custom insertion for an item: `(editor, item, from, to)`
pub type Applier = Arc<dyn Fn(&dyn EditorHost, &Item, Position, Position) + Send + Sync>;

/// A single completion candidate
///
/// `from`/`to` override the owning set's range for this item only. An `applier`
/// replaces the host's default insertion when the item is picked, and a
/// `renderer` replaces the host's default row rendering.
#[derive(Clone)]
pub struct Item {
    pub text: String,
    pub display_text: Option<String>,
    pub class_name: Option<String>,
    pub from: Option<Position>,
    pub to: Option<Position>,
    pub renderer: Option<Renderer>,
    pub applier: Option<Applier>,
    /// Keys the hints layer does not interpret, forwarded to the host as-is
    pub extra: BTreeMap<String, Value>,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            display_text: None,
            class_name: None,
            from: None,
            to: None,
            renderer: None,
            applier: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_display_text(mut self, display_text: impl Into<String>) -> Self {
        self.display_text = Some(display_text.into());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_range(mut self, from: Position, to: Position) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn with_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&mut dyn RenderTarget, &Item) + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn with_applier<F>(mut self, applier: F) -> Self
    where
        F: Fn(&dyn EditorHost, &Item, Position, Position) + Send + Sync + 'static,
    {
        self.applier = Some(Arc::new(applier));
        self
    }

    /// Attach a pass-through key; names of bag fields are ignored
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        insert_extra(&mut self.extra, &ITEM_FIELDS, key.into(), value.into());
        self
    }
}

// Callbacks have no meaningful equality; only the data fields are compared.
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.display_text == other.display_text
            && self.class_name == other.class_name
            && self.from == other.from
            && self.to == other.to
            && self.extra == other.extra
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("text", &self.text)
            .field("display_text", &self.display_text)
            .field("class_name", &self.class_name)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("renderer", &self.renderer.is_some())
            .field("applier", &self.applier.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}

/// An entry in a completion set: bare text or a full item
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Text(String),
    Item(Arc<Item>),
}

impl Candidate {
    /// Text that would be inserted for this candidate
    pub fn text(&self) -> &str {
        match self {
            Candidate::Text(text) => text,
            Candidate::Item(item) => &item.text,
        }
    }
}

impl From<&str> for Candidate {
    fn from(text: &str) -> Self {
        Candidate::Text(text.to_string())
    }
}

impl From<String> for Candidate {
    fn from(text: String) -> Self {
        Candidate::Text(text)
    }
}

impl From<Item> for Candidate {
    fn from(item: Item) -> Self {
        Candidate::Item(Arc::new(item))
    }
}

impl From<Arc<Item>> for Candidate {
    fn from(item: Arc<Item>) -> Self {
        Candidate::Item(item)
    }
}

/// The full result of one completion request
///
/// A set is built fresh for every trigger. Its host-facing bag is computed on
/// first use and cached here, so subscriptions keyed on the bag stay valid for
/// as long as the set lives.
pub struct CompletionSet {
    pub items: Vec<Candidate>,
    pub from: Position,
    pub to: Position,
    /// Keys the hints layer does not interpret, forwarded to the host as-is
    pub extra: BTreeMap<String, Value>,
    pub(crate) marshalled: OnceLock<Marshalled>,
}

impl CompletionSet {
    pub fn new<I, C>(items: I, from: Position, to: Position) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            from,
            to,
            extra: BTreeMap::new(),
            marshalled: OnceLock::new(),
        }
    }

    /// Attach a pass-through key; names of bag fields are ignored
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        insert_extra(&mut self.extra, &SET_FIELDS, key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the host-facing bag has already been built
    pub fn is_marshalled(&self) -> bool {
        self.marshalled.get().is_some()
    }
}

impl fmt::Debug for CompletionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSet")
            .field("items", &self.items)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("extra", &self.extra)
            .field("marshalled", &self.is_marshalled())
            .finish()
    }
}

fn insert_extra(
    extra: &mut BTreeMap<String, Value>,
    reserved: &[&str],
    key: String,
    value: Value,
) {
    if reserved.contains(&key.as_str()) {
        warn!(key = %key, "Ignoring pass-through key that names a bag field");
        return;
    }
    extra.insert(key, value);
}
