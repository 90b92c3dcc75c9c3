//! Option resolution for completion triggers
//!
//! Options are a flat bag of JSON values. Three boolean keys are understood by
//! the hints layer itself; every other key passes through untouched to the
//! provider or the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Pick the single candidate without showing a popup
pub const COMPLETE_SINGLE: &str = "completeSingle";
/// Align the popup with the start of the word being completed
pub const ALIGN_WITH_WORD: &str = "alignWithWord";
/// Close the popup when the editor loses focus
pub const CLOSE_ON_UNFOCUS: &str = "closeOnUnfocus";

/// Read-only view over a flat key/value option bag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HintOptions {
    values: BTreeMap<String, Value>,
}

impl HintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in defaults for every recognized key
    pub fn builtin() -> Self {
        Self::new()
            .with(COMPLETE_SINGLE, true)
            .with(ALIGN_WITH_WORD, true)
            .with(CLOSE_ON_UNFOCUS, true)
    }

    /// Set a key, replacing any previous value
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Layer `over` on top of `self`; keys in `over` win.
    ///
    /// A null in `over` counts as absent and does not hide the lower value.
    pub fn merged(&self, over: &HintOptions) -> HintOptions {
        let mut values = self.values.clone();
        for (key, value) in &over.values {
            if !value.is_null() {
                values.insert(key.clone(), value.clone());
            }
        }
        HintOptions { values }
    }

    /// See [`bool_option`]
    pub fn bool_option(&self, name: &str, default: bool) -> Value {
        bool_option(self, name, default)
    }

    /// See [`raw_option`]
    pub fn raw_option(&self, name: &str) -> Option<&Value> {
        raw_option(self, name)
    }

    pub fn complete_single(&self) -> bool {
        self.flag(COMPLETE_SINGLE)
    }

    pub fn align_with_word(&self) -> bool {
        self.flag(ALIGN_WITH_WORD)
    }

    pub fn close_on_unfocus(&self) -> bool {
        self.flag(CLOSE_ON_UNFOCUS)
    }

    // Recognized flags all default to true; non-boolean values read as the default.
    fn flag(&self, name: &str) -> bool {
        self.bool_option(name, true).as_bool().unwrap_or(true)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for HintOptions {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        HintOptions {
            values: iter.into_iter().collect(),
        }
    }
}

/// Returns `bag[name]` when present and not null, otherwise `default`.
///
/// Non-boolean values come back verbatim; nothing is coerced.
pub fn bool_option(bag: &HintOptions, name: &str, default: bool) -> Value {
    match bag.values.get(name) {
        Some(value) if !value.is_null() => value.clone(),
        _ => Value::Bool(default),
    }
}

/// Returns the stored value verbatim, or `None` when the key is absent
pub fn raw_option<'a>(bag: &'a HintOptions, name: &str) -> Option<&'a Value> {
    bag.values.get(name)
}
