//! Typed popup lifecycle events
//!
//! The host raises raw events against a bag's identity. [`PopupEvents`]
//! subscribes on behalf of a [`CompletionSet`] and decodes `pick`/`select`
//! payloads back to the originating [`Item`], callbacks included, through the
//! set's identity side-table.
//!
//! Subscribing marshals the set if that has not happened yet, so handlers can
//! be attached before or after the popup is first shown. Handlers never keep
//! the set alive; once the set and its bag are dropped the host's route for
//! them is dead.

use crate::host::{EditorHost, PopupEventKind, RawPopupEvent, RowElement, SubscriptionId};
use crate::marshal::BagEntry;
use crate::types::{CompletionSet, Item};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Handle to one typed subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub kind: PopupEventKind,
}

/// Event hub over one host
#[derive(Clone)]
pub struct PopupEvents {
    host: Arc<dyn EditorHost>,
}

impl PopupEvents {
    pub fn new(host: Arc<dyn EditorHost>) -> Self {
        Self { host }
    }

    /// Popup was rendered
    pub fn on_shown<F>(&self, set: &Arc<CompletionSet>, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(set, PopupEventKind::Shown, move |event| {
            if matches!(event, RawPopupEvent::Shown) {
                handler()
            }
        })
    }

    /// Popup was dismissed
    pub fn on_close<F>(&self, set: &Arc<CompletionSet>, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(set, PopupEventKind::Close, move |event| {
            if matches!(event, RawPopupEvent::Close) {
                handler()
            }
        })
    }

    /// Host refreshed the candidate list
    pub fn on_update<F>(&self, set: &Arc<CompletionSet>, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(set, PopupEventKind::Update, move |event| {
            if matches!(event, RawPopupEvent::Update) {
                handler()
            }
        })
    }

    /// An item was chosen
    pub fn on_pick<F>(&self, set: &Arc<CompletionSet>, handler: F) -> Subscription
    where
        F: Fn(Arc<Item>) + Send + Sync + 'static,
    {
        let origin = Arc::downgrade(set);
        self.subscribe(set, PopupEventKind::Pick, move |event| {
            if let RawPopupEvent::Pick(entry) = event {
                handler(resolve(&origin, entry))
            }
        })
    }

    /// The highlighted item changed; `RowElement` is the row drawn for it
    pub fn on_select<F>(&self, set: &Arc<CompletionSet>, handler: F) -> Subscription
    where
        F: Fn(Arc<Item>, RowElement) + Send + Sync + 'static,
    {
        let origin = Arc::downgrade(set);
        self.subscribe(set, PopupEventKind::Select, move |event| {
            if let RawPopupEvent::Select(entry, row) = event {
                handler(resolve(&origin, entry), *row)
            }
        })
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.host.off(subscription.id);
    }

    fn subscribe<H>(
        &self,
        set: &Arc<CompletionSet>,
        kind: PopupEventKind,
        handler: H,
    ) -> Subscription
    where
        H: Fn(&RawPopupEvent) + Send + Sync + 'static,
    {
        let bag = set.marshal();
        let id = self.host.on(&bag, kind, Arc::new(handler));
        debug!(event = %kind, id = id.0, "Subscribed to popup event");
        Subscription { id, kind }
    }
}

// Handlers only hold the set weakly, so a route dies with its popup.
fn resolve(origin: &Weak<CompletionSet>, entry: &BagEntry) -> Arc<Item> {
    match origin.upgrade() {
        Some(set) => set.resolve_entry(entry),
        None => Arc::new(entry.decode()),
    }
}
