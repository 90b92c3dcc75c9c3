//! Conversion between the result model and the host's bag form
//!
//! The host speaks in generic bags: `{list, from, to}` for a set and
//! `{text, displayText?, className?, from?, to?, hint?, render?}` for an item.
//! `hint` and `render` are trampolines back into provider code, never data, so
//! they are skipped when a bag is serialized.
//!
//! Marshalling is memoized on the originating [`CompletionSet`]: the host keys
//! event subscriptions on the bag's identity, so the same `Arc` must come back
//! every time. Next to the cached bag sits an identity side-table mapping each
//! item bag to the [`Item`] it was built from. That table is an in-process cache
//! for recovering callbacks on `pick`/`select`; it is not a wire format.

use crate::host::EditorHost;
use crate::types::{Candidate, CompletionSet, Item, Position, RenderTarget};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Keys a set's bag uses itself; never taken from pass-through data
pub const SET_FIELDS: [&str; 3] = ["list", "from", "to"];

/// Keys an item's bag uses itself; never taken from pass-through data
pub const ITEM_FIELDS: [&str; 7] = [
    "text",
    "displayText",
    "className",
    "from",
    "to",
    "hint",
    "render",
];

/// Position as the host represents it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BagPosition {
    pub line: u32,
    pub ch: u32,
}

impl BagPosition {
    pub fn new(line: u32, ch: u32) -> Self {
        Self { line, ch }
    }
}

impl From<Position> for BagPosition {
    fn from(pos: Position) -> Self {
        BagPosition {
            line: pos.line,
            ch: pos.column,
        }
    }
}

impl From<BagPosition> for Position {
    fn from(pos: BagPosition) -> Self {
        Position::new(pos.line, pos.ch)
    }
}

/// Invoked by the host on pick with the boundary-form range
pub type HintTrampoline = Arc<dyn Fn(&dyn EditorHost, BagPosition, BagPosition) + Send + Sync>;

/// Invoked by the host to draw one menu row
pub type RenderTrampoline = Arc<dyn Fn(&mut dyn RenderTarget) + Send + Sync>;

/// Host-facing form of an [`Item`]
///
/// Optional fields are omitted from the serialized form when absent.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBag {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<BagPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<BagPosition>,
    #[serde(skip)]
    pub hint: Option<HintTrampoline>,
    #[serde(skip)]
    pub render: Option<RenderTrampoline>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ItemBag {
    /// Structural decode back to an [`Item`]; callbacks are not rebuilt
    pub fn decode(&self) -> Item {
        let mut item = Item::new(self.text.clone());
        item.display_text = self.display_text.clone();
        item.class_name = self.class_name.clone();
        item.from = self.from.map(Position::from);
        item.to = self.to.map(Position::from);
        item.extra = self.extra.clone();
        item
    }
}

impl fmt::Debug for ItemBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemBag")
            .field("text", &self.text)
            .field("display_text", &self.display_text)
            .field("class_name", &self.class_name)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("hint", &self.hint.is_some())
            .field("render", &self.render.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}

/// One element of a bag's `list`: plain text or an item bag
#[derive(Debug, Clone)]
pub enum BagEntry {
    Text(String),
    Item(Arc<ItemBag>),
}

impl BagEntry {
    pub fn text(&self) -> &str {
        match self {
            BagEntry::Text(text) => text,
            BagEntry::Item(bag) => &bag.text,
        }
    }

    pub fn as_item(&self) -> Option<&Arc<ItemBag>> {
        match self {
            BagEntry::Item(bag) => Some(bag),
            BagEntry::Text(_) => None,
        }
    }

    /// Structural decode; text entries become a minimal [`Item`]
    pub fn decode(&self) -> Item {
        match self {
            BagEntry::Text(text) => Item::new(text.clone()),
            BagEntry::Item(bag) => bag.decode(),
        }
    }
}

impl PartialEq<&str> for BagEntry {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, BagEntry::Text(text) if text == other)
    }
}

impl Serialize for BagEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BagEntry::Text(text) => serializer.serialize_str(text),
            BagEntry::Item(bag) => bag.as_ref().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for BagEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Item(ItemBag),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => BagEntry::Text(text),
            Repr::Item(bag) => BagEntry::Item(Arc::new(bag)),
        })
    }
}

/// Host-facing form of a [`CompletionSet`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintBag {
    pub list: Vec<BagEntry>,
    pub from: BagPosition,
    pub to: BagPosition,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl HintBag {
    /// Range an entry replaces: its own when given, else the bag's
    pub fn range_for(&self, entry: &BagEntry) -> (BagPosition, BagPosition) {
        match entry {
            BagEntry::Item(bag) => (bag.from.unwrap_or(self.from), bag.to.unwrap_or(self.to)),
            BagEntry::Text(_) => (self.from, self.to),
        }
    }
}

/// Cached bag plus the identity side-table for its item entries
pub(crate) struct Marshalled {
    bag: Arc<HintBag>,
    origins: HashMap<usize, Arc<Item>>,
}

fn identity(bag: &Arc<ItemBag>) -> usize {
    Arc::as_ptr(bag) as usize
}

impl CompletionSet {
    /// Host-facing bag for this set, built on first call and cached afterwards
    pub fn marshal(&self) -> Arc<HintBag> {
        Arc::clone(&self.marshalled.get_or_init(|| build(self)).bag)
    }

    /// The item an entry of this set's bag was built from, if any
    pub fn origin_of(&self, entry: &Arc<ItemBag>) -> Option<Arc<Item>> {
        self.marshalled
            .get()
            .and_then(|m| m.origins.get(&identity(entry)))
            .cloned()
    }

    /// Decode an entry reported by the host, preferring the original item
    pub fn resolve_entry(&self, entry: &BagEntry) -> Arc<Item> {
        match entry {
            BagEntry::Item(bag) => self
                .origin_of(bag)
                .unwrap_or_else(|| Arc::new(bag.decode())),
            BagEntry::Text(text) => Arc::new(Item::new(text.clone())),
        }
    }
}

fn build(set: &CompletionSet) -> Marshalled {
    let mut origins = HashMap::new();
    let list = set
        .items
        .iter()
        .map(|candidate| match candidate {
            Candidate::Text(text) => BagEntry::Text(text.clone()),
            Candidate::Item(item) => {
                let bag = Arc::new(item_bag(item));
                origins.insert(identity(&bag), Arc::clone(item));
                BagEntry::Item(bag)
            }
        })
        .collect::<Vec<_>>();

    debug!(entries = list.len(), rich = origins.len(), "Marshalled completion set");

    Marshalled {
        bag: Arc::new(HintBag {
            list,
            from: set.from.into(),
            to: set.to.into(),
            extra: pass_through(&set.extra, &SET_FIELDS),
        }),
        origins,
    }
}

fn item_bag(item: &Arc<Item>) -> ItemBag {
    let hint = item.applier.as_ref().map(|applier| {
        let applier = Arc::clone(applier);
        let origin = Arc::clone(item);
        let trampoline: HintTrampoline =
            Arc::new(move |editor: &dyn EditorHost, from: BagPosition, to: BagPosition| {
                applier(editor, &origin, from.into(), to.into())
            });
        trampoline
    });

    let render = item.renderer.as_ref().map(|renderer| {
        let renderer = Arc::clone(renderer);
        let origin = Arc::clone(item);
        let trampoline: RenderTrampoline =
            Arc::new(move |target: &mut dyn RenderTarget| renderer(target, &origin));
        trampoline
    });

    ItemBag {
        text: item.text.clone(),
        display_text: item.display_text.clone(),
        class_name: item.class_name.clone(),
        from: item.from.map(BagPosition::from),
        to: item.to.map(BagPosition::from),
        hint,
        render,
        extra: pass_through(&item.extra, &ITEM_FIELDS),
    }
}

// Flattened next to the named fields, so a colliding key would shadow one of them.
fn pass_through(extra: &BTreeMap<String, Value>, reserved: &[&str]) -> BTreeMap<String, Value> {
    extra
        .iter()
        .filter(|(key, _)| {
            let clash = reserved.contains(&key.as_str());
            if clash {
                warn!(key = %key, "Dropping pass-through key that names a bag field");
            }
            !clash
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn range() -> (Position, Position) {
        (Position::new(0, 0), Position::new(0, 3))
    }

    #[test]
    fn test_plain_text_marshalling() {
        let (from, to) = range();
        let set = CompletionSet::new(["foo", "for", "function"], from, to);
        let bag = set.marshal();

        assert_eq!(bag.list.len(), 3);
        assert_eq!(bag.list[0], "foo");
        assert_eq!(bag.from, BagPosition::new(0, 0));
        assert_eq!(bag.to, BagPosition::new(0, 3));
        assert_eq!(
            serde_json::to_value(bag.as_ref()).unwrap(),
            json!({
                "list": ["foo", "for", "function"],
                "from": {"line": 0, "ch": 0},
                "to": {"line": 0, "ch": 3}
            })
        );
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let (from, to) = range();
        let set = CompletionSet::new([Item::new("push").with_class_name("method")], from, to);
        let value = serde_json::to_value(set.marshal().as_ref()).unwrap();

        assert_eq!(value["list"][0], json!({"text": "push", "className": "method"}));
        assert!(value["list"][0].get("displayText").is_none());
        assert!(value["list"][0].get("from").is_none());
    }

    #[test]
    fn test_populated_fields_are_present() {
        let (from, to) = range();
        let item = Item::new("push")
            .with_display_text("push(value)")
            .with_range(Position::new(1, 2), Position::new(1, 5))
            .with_extra("kind", "method");
        let set = CompletionSet::new([item], from, to);
        let value = serde_json::to_value(set.marshal().as_ref()).unwrap();

        assert_eq!(
            value["list"][0],
            json!({
                "text": "push",
                "displayText": "push(value)",
                "from": {"line": 1, "ch": 2},
                "to": {"line": 1, "ch": 5},
                "kind": "method"
            })
        );
    }

    #[test]
    fn test_pass_through_cannot_shadow_set_fields() {
        let (from, to) = range();
        let set = CompletionSet::new(["a", "b"], from, to)
            .with_extra("list", 5)
            .with_extra("completeSingle", false);
        assert!(!set.extra.contains_key("list"));

        let value = serde_json::to_value(set.marshal().as_ref()).unwrap();
        assert_eq!(value["list"], json!(["a", "b"]));
        assert_eq!(value["completeSingle"], json!(false));
    }

    #[test]
    fn test_pass_through_cannot_shadow_item_fields() {
        let (from, to) = range();
        let item = Item::new("push")
            .with_extra("text", "pop")
            .with_extra("className", 3)
            .with_extra("detail", "Vec::push");
        let set = CompletionSet::new([item], from, to);
        let value = serde_json::to_value(set.marshal().as_ref()).unwrap();

        assert_eq!(value["list"][0], json!({"text": "push", "detail": "Vec::push"}));
    }

    #[test]
    fn test_directly_inserted_field_names_are_stripped() {
        let (from, to) = range();
        let mut set = CompletionSet::new(["a"], from, to);
        set.extra.insert("from".to_string(), json!("start"));
        set.extra.insert("origin".to_string(), json!("lsp"));

        let bag = set.marshal();
        assert_eq!(bag.from, BagPosition::new(0, 0));
        assert!(!bag.extra.contains_key("from"));
        assert_eq!(bag.extra["origin"], json!("lsp"));
        assert_eq!(
            serde_json::to_value(bag.as_ref()).unwrap()["from"],
            json!({"line": 0, "ch": 0})
        );
    }

    #[test]
    fn test_marshal_is_memoized() {
        let (from, to) = range();
        let set = CompletionSet::new(["a"], from, to);
        let first = set.marshal();
        let second = set.marshal();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(set.is_marshalled());
    }

    #[test]
    fn test_trampolines_installed_only_when_supplied() {
        let (from, to) = range();
        let set = CompletionSet::new(
            vec![
                Candidate::from(Item::new("plain")),
                Candidate::from(Item::new("custom").with_renderer(|target, item| {
                    target.push_text(&item.text.to_uppercase())
                })),
            ],
            from,
            to,
        );
        let bag = set.marshal();

        let plain = bag.list[0].as_item().unwrap();
        let custom = bag.list[1].as_item().unwrap();
        assert!(plain.hint.is_none() && plain.render.is_none());
        assert!(custom.hint.is_none() && custom.render.is_some());
    }

    #[test]
    fn test_origin_lookup_by_identity() {
        let (from, to) = range();
        let original = Arc::new(Item::new("insert").with_applier(|_, _, _, _| {}));
        let set = CompletionSet::new([Arc::clone(&original)], from, to);
        let bag = set.marshal();
        let entry = bag.list[0].as_item().unwrap();

        let origin = set.origin_of(entry).unwrap();
        assert!(Arc::ptr_eq(&origin, &original));

        // An equal bag that the set did not produce has no origin
        let stranger = Arc::new(entry.as_ref().clone());
        assert!(set.origin_of(&stranger).is_none());
        assert_eq!(set.resolve_entry(&BagEntry::Item(stranger)).text, "insert");
    }

    #[test]
    fn test_decode_from_host_json() {
        let bag: HintBag = serde_json::from_value(json!({
            "list": ["one", {"text": "two", "className": "kw", "from": {"line": 3, "ch": 1}}],
            "from": {"line": 3, "ch": 0},
            "to": {"line": 3, "ch": 2}
        }))
        .unwrap();

        assert_eq!(bag.list[0].decode(), Item::new("one"));
        let two = bag.list[1].decode();
        assert_eq!(two.class_name.as_deref(), Some("kw"));
        assert_eq!(two.from, Some(Position::new(3, 1)));
        assert_eq!(two.to, None);
        assert_eq!(
            bag.range_for(&bag.list[1]),
            (BagPosition::new(3, 1), BagPosition::new(3, 2))
        );
    }
}
