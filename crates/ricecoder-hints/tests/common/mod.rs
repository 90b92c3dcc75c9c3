//! Shared test host for integration tests
#![allow(dead_code)]

use ricecoder_hints::{
    AutocompleteCommand, EditorHost, HintBag, HintHelper, HintOptions, HintResponse, HintResult,
    PopupEventKind, PopupEventRouter, Position, Provider, RawEventHandler, RawPopupEvent,
    SubscriptionId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// In-memory editor host recording everything the hints layer asks of it
#[derive(Default)]
pub struct MockHost {
    pub cursor: Mutex<Position>,
    pub mode: Mutex<Option<String>>,
    pub automatic: Mutex<Option<Provider>>,
    pub shown: Mutex<Vec<Arc<HintBag>>>,
    pub replaced: Mutex<Vec<(String, Position, Position)>>,
    pub commands: Mutex<HashMap<String, AutocompleteCommand>>,
    pub helpers: Mutex<HashMap<String, HintHelper>>,
    pub command_registrations: Mutex<usize>,
    pub router: PopupEventRouter,
}

impl MockHost {
    pub fn new(mode: &str, cursor: Position) -> Arc<Self> {
        let host = Self::default();
        *host.mode.lock().unwrap() = Some(mode.to_string());
        *host.cursor.lock().unwrap() = cursor;
        Arc::new(host)
    }

    pub fn set_mode(&self, mode: Option<&str>) {
        *self.mode.lock().unwrap() = mode.map(str::to_string);
    }

    pub fn set_automatic(&self, provider: Provider) {
        *self.automatic.lock().unwrap() = Some(provider);
    }

    /// Invoke the installed `autocomplete` command the way a keybinding would
    pub fn run_autocomplete(self: &Arc<Self>, options: HintOptions) -> HintResult<()> {
        let command = self
            .commands
            .lock()
            .unwrap()
            .get("autocomplete")
            .cloned()
            .expect("autocomplete command installed");
        let editor: Arc<dyn EditorHost> = self.clone();
        command(editor, options)
    }

    /// Invoke the installed `hint` helper; deferred deliveries land on the channel
    pub fn run_hint(
        self: &Arc<Self>,
        options: HintOptions,
    ) -> (
        HintResult<HintResponse>,
        mpsc::UnboundedReceiver<Option<Arc<HintBag>>>,
    ) {
        let helper = self
            .helpers
            .lock()
            .unwrap()
            .get("hint")
            .cloned()
            .expect("hint helper installed");
        let (tx, rx) = mpsc::unbounded_channel();
        let editor: Arc<dyn EditorHost> = self.clone();
        let response = helper(
            editor,
            options,
            Box::new(move |bag| {
                let _ = tx.send(bag);
            }),
        );
        (response, rx)
    }

    pub fn emit(&self, bag: &Arc<HintBag>, event: RawPopupEvent) -> usize {
        self.router.emit(bag, event)
    }

    pub fn shown_count(&self) -> usize {
        self.shown.lock().unwrap().len()
    }

    pub fn last_shown(&self) -> Option<Arc<HintBag>> {
        self.shown.lock().unwrap().last().cloned()
    }
}

impl EditorHost for MockHost {
    fn cursor_position(&self) -> Position {
        *self.cursor.lock().unwrap()
    }

    fn mode_at(&self, _pos: Position) -> Option<String> {
        self.mode.lock().unwrap().clone()
    }

    fn automatic_provider(&self) -> Option<Provider> {
        self.automatic.lock().unwrap().clone()
    }

    fn show_completion_popup(&self, bag: Arc<HintBag>) {
        self.shown.lock().unwrap().push(bag);
    }

    fn replace_range(&self, text: &str, from: Position, to: Position) {
        self.replaced
            .lock()
            .unwrap()
            .push((text.to_string(), from, to));
    }

    fn on(
        &self,
        target: &Arc<HintBag>,
        kind: PopupEventKind,
        handler: RawEventHandler,
    ) -> SubscriptionId {
        self.router.subscribe(target, kind, handler)
    }

    fn off(&self, id: SubscriptionId) {
        self.router.unsubscribe(id);
    }

    fn register_command(&self, name: &str, command: AutocompleteCommand) {
        *self.command_registrations.lock().unwrap() += 1;
        self.commands
            .lock()
            .unwrap()
            .insert(name.to_string(), command);
    }

    fn register_helper(&self, kind: &str, helper: HintHelper) {
        self.helpers.lock().unwrap().insert(kind.to_string(), helper);
    }
}

/// Install a test subscriber once; repeated calls are harmless
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
