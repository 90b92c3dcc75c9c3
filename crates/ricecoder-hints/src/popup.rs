//! Host-side popup plumbing
//!
//! Hosts drive the popup themselves, but a few behaviors have to honor the
//! bag's trampolines exactly: picking must call `hint` instead of the default
//! insertion, and drawing a row must call `render` instead of the default row.
//! [`PopupEventRouter`] is a ready-made subscription table a host can embed to
//! implement [`EditorHost::on`]/[`EditorHost::off`] and raise events.

use crate::host::{EditorHost, PopupEventKind, RawEventHandler, RawPopupEvent, SubscriptionId};
use crate::marshal::{BagEntry, HintBag};
use crate::types::RenderTarget;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Apply a picked entry
///
/// Uses the entry's `hint` trampoline when it has one; otherwise replaces the
/// effective range with the entry's text through the host's default insertion.
pub fn apply_pick(editor: &dyn EditorHost, bag: &HintBag, entry: &BagEntry) {
    let (from, to) = bag.range_for(entry);

    if let Some(hint) = entry.as_item().and_then(|item| item.hint.as_ref()) {
        hint(editor, from, to);
        return;
    }

    editor.replace_range(entry.text(), from.into(), to.into());
}

/// Draw one menu row for `entry`
pub fn render_entry(entry: &BagEntry, target: &mut dyn RenderTarget) {
    match entry {
        BagEntry::Text(text) => target.push_text(text),
        BagEntry::Item(item) => {
            if let Some(render) = &item.render {
                render(target);
                return;
            }
            if let Some(class_name) = &item.class_name {
                target.add_class(class_name);
            }
            target.push_text(item.display_text.as_deref().unwrap_or(&item.text));
        }
    }
}

struct Route {
    id: SubscriptionId,
    target: Weak<HintBag>,
    kind: PopupEventKind,
    handler: RawEventHandler,
}

/// Subscription table keyed by bag identity and event kind
#[derive(Default)]
pub struct PopupEventRouter {
    next_id: AtomicU64,
    routes: Mutex<Vec<Route>>,
}

impl PopupEventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        target: &Arc<HintBag>,
        kind: PopupEventKind,
        handler: RawEventHandler,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.routes.lock().push(Route {
            id,
            target: Arc::downgrade(target),
            kind,
            handler,
        });
        id
    }

    /// Remove a subscription; returns false for unknown ids
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut routes = self.routes.lock();
        let before = routes.len();
        routes.retain(|route| route.id != id);
        routes.len() != before
    }

    /// Drop every subscription attached to `target`
    pub fn release(&self, target: &Arc<HintBag>) {
        self.routes
            .lock()
            .retain(|route| !std::ptr::eq(route.target.as_ptr(), Arc::as_ptr(target)));
    }

    /// Raise `event` against `target`; returns how many handlers ran
    ///
    /// Handlers run outside the table lock, so they may subscribe or
    /// unsubscribe while being called.
    pub fn emit(&self, target: &Arc<HintBag>, event: RawPopupEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<RawEventHandler> = {
            let mut routes = self.routes.lock();
            routes.retain(|route| route.target.strong_count() > 0);
            routes
                .iter()
                .filter(|route| {
                    route.kind == kind && std::ptr::eq(route.target.as_ptr(), Arc::as_ptr(target))
                })
                .map(|route| Arc::clone(&route.handler))
                .collect()
        };

        debug!(event = %kind, handlers = handlers.len(), "Emitting popup event");
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    pub fn len(&self) -> usize {
        self.routes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.lock().is_empty()
    }
}
