//! Application-level entry point
//!
//! [`Hints`] is built once at application start and owns the provider registry
//! for one host. The first provider registration installs the dispatcher on the
//! host as its `autocomplete` command and `hint` helper; later registrations
//! only update the registry.

use crate::config::HintsConfig;
use crate::dispatcher::CompletionDispatcher;
use crate::events::PopupEvents;
use crate::host::{
    AutocompleteCommand, Delivery, EditorHost, HintHelper, AUTOCOMPLETE_COMMAND, HINT_HELPER,
};
use crate::options::HintOptions;
use crate::provider::{HintOutcome, Provider, ProviderRegistry};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Hints context bound to one editor host
pub struct Hints {
    host: Arc<dyn EditorHost>,
    registry: Arc<ProviderRegistry>,
    dispatcher: Arc<CompletionDispatcher>,
    wired: AtomicBool,
}

impl Hints {
    pub fn new(host: Arc<dyn EditorHost>) -> Self {
        Self::with_config(host, HintsConfig::default())
    }

    pub fn with_config(host: Arc<dyn EditorHost>, config: HintsConfig) -> Self {
        let registry = Arc::new(ProviderRegistry::new());
        let dispatcher = Arc::new(CompletionDispatcher::new(
            Arc::clone(&registry),
            Arc::new(config),
        ));

        Self {
            host,
            registry,
            dispatcher,
            wired: AtomicBool::new(false),
        }
    }

    /// Register a synchronous provider for `mode`
    pub fn register_provider<F>(&self, mode: impl Into<String>, hint: F)
    where
        F: Fn(Arc<dyn EditorHost>, &HintOptions) -> HintOutcome + Send + Sync + 'static,
    {
        self.register(mode, Provider::sync(hint));
    }

    /// Register an asynchronous provider for `mode`
    pub fn register_provider_async<F, Fut>(&self, mode: impl Into<String>, hint: F)
    where
        F: Fn(Arc<dyn EditorHost>, HintOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HintOutcome> + Send + 'static,
    {
        self.register(mode, Provider::from_async(hint));
    }

    /// Store `provider` under `mode`, replacing any previous one
    pub fn register(&self, mode: impl Into<String>, provider: Provider) {
        self.registry.register(mode, provider);
        self.ensure_wired();
    }

    pub fn resolve(&self, mode: &str) -> Option<Provider> {
        self.registry.resolve(mode)
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<CompletionDispatcher> {
        &self.dispatcher
    }

    /// Event hub bound to this context's host
    pub fn events(&self) -> PopupEvents {
        PopupEvents::new(Arc::clone(&self.host))
    }

    /// Whether the dispatcher has been installed on the host
    pub fn is_wired(&self) -> bool {
        self.wired.load(Ordering::Acquire)
    }

    fn ensure_wired(&self) {
        if self.wired.swap(true, Ordering::AcqRel) {
            return;
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        let command: AutocompleteCommand =
            Arc::new(move |editor: Arc<dyn EditorHost>, options: HintOptions| {
                dispatcher.autocomplete(editor, options)
            });

        let dispatcher = Arc::clone(&self.dispatcher);
        let helper: HintHelper = Arc::new(
            move |editor: Arc<dyn EditorHost>, options: HintOptions, deliver: Delivery| {
                dispatcher.trigger(editor, options, deliver)
            },
        );

        self.host.register_command(AUTOCOMPLETE_COMMAND, command);
        self.host.register_helper(HINT_HELPER, helper);
        info!(
            command = AUTOCOMPLETE_COMMAND,
            helper = HINT_HELPER,
            "Installed hint dispatcher on host"
        );
    }
}
