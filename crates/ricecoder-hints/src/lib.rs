//! RiceCoder Hints
//!
//! Coordinates code-completion hints between a host editor widget and
//! pluggable, mode-specific completion providers.
//!
//! # Architecture
//!
//! 1. **Provider Registry**: providers are registered per language mode, either
//!    synchronous or asynchronous ([`Provider`])
//! 2. **Option Resolution**: built-in defaults, configured per-mode defaults and
//!    call-site options are layered into one [`HintOptions`] bag
//! 3. **Dispatch**: the [`CompletionDispatcher`] runs the provider for the mode
//!    under the cursor and normalizes both execution styles into the host's
//!    calling convention
//! 4. **Marshalling**: results ([`CompletionSet`]) are converted once into the
//!    host's bag form ([`HintBag`]) and cached on the set
//! 5. **Events**: [`PopupEvents`] decodes the host's raw popup events back into
//!    typed payloads
//!
//! # Host Integration
//!
//! The editor widget is abstracted behind [`EditorHost`]. The first provider
//! registered through a [`Hints`] context installs the dispatcher on the host as
//! its `autocomplete` command and `hint` helper.
//!
//! # Example
//!
//! ```ignore
//! use ricecoder_hints::*;
//! use std::sync::Arc;
//!
//! let hints = Hints::new(host.clone());
//!
//! hints.register_provider("javascript", |_editor, _options| {
//!     Ok(Some(Arc::new(CompletionSet::new(
//!         ["foo", "for", "function"],
//!         Position::new(0, 0),
//!         Position::new(0, 3),
//!     ))))
//! });
//!
//! hints.register_provider_async("sql", |_editor, _options| async move {
//!     let tables = fetch_tables().await.map_err(HintError::provider)?;
//!     Ok(Some(Arc::new(CompletionSet::new(tables, from, to))))
//! });
//! ```
//!
//! # Error Handling
//!
//! Synchronous provider errors propagate to the trigger caller. Asynchronous
//! provider errors are delivered to the host as "no completions".

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod host;
pub mod marshal;
pub mod options;
pub mod popup;
pub mod provider;
pub mod types;

pub use config::{ConfigFormat, ConfigLoader, HintsConfig};
pub use context::Hints;
pub use dispatcher::CompletionDispatcher;
pub use error::{HintError, HintResult};
pub use events::{PopupEvents, Subscription};
pub use host::{
    AutocompleteCommand, Delivery, EditorHost, HintHelper, HintResponse, PopupEventKind,
    RawEventHandler, RawPopupEvent, RowElement, SubscriptionId, AUTOCOMPLETE_COMMAND,
    HINT_HELPER,
};
pub use marshal::{
    BagEntry, BagPosition, HintBag, HintTrampoline, ItemBag, RenderTrampoline, ITEM_FIELDS,
    SET_FIELDS,
};
pub use options::{
    bool_option, raw_option, HintOptions, ALIGN_WITH_WORD, CLOSE_ON_UNFOCUS, COMPLETE_SINGLE,
};
pub use popup::{apply_pick, render_entry, PopupEventRouter};
pub use provider::{
    AsyncHintFn, HintFuture, HintOutcome, HintSource, Provider, ProviderRegistry, SyncHintFn,
};
pub use types::{Applier, Candidate, CompletionSet, Item, Position, RenderTarget, Renderer};
