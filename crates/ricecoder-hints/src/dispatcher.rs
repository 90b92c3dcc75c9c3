//! Completion dispatch
//!
//! The dispatcher is what the host actually calls on a trigger. It finds the
//! provider for the mode under the cursor, resolves options, runs the provider
//! and hands the marshalled result back in the host's calling convention:
//!
//! - **Sync** providers run inline; the bag comes back in
//!   [`HintResponse::Ready`]. Provider errors propagate to the caller.
//! - **Async** providers return at once with [`HintResponse::Deferred`]; the
//!   bag (or `None`) reaches the host later through its [`Delivery`] callback.
//!   A failed deferred result is delivered as `None`, since the host has no
//!   channel for asynchronous errors.
//!
//! Every trigger is independent. Nothing cancels an in-flight async provider
//! when a newer trigger starts; both deliveries reach the host and the host
//! decides what stays on screen.

use crate::config::HintsConfig;
use crate::error::{HintError, HintResult};
use crate::host::{Delivery, EditorHost, HintResponse};
use crate::options::HintOptions;
use crate::provider::{Provider, ProviderRegistry};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// Resolves and runs the provider for a completion trigger
pub struct CompletionDispatcher {
    registry: Arc<ProviderRegistry>,
    config: Arc<HintsConfig>,
}

impl CompletionDispatcher {
    pub fn new(registry: Arc<ProviderRegistry>, config: Arc<HintsConfig>) -> Self {
        Self { registry, config }
    }

    /// Effective options: built-in < configured mode defaults < call site
    pub fn resolve_options(&self, mode: Option<&str>, call_site: &HintOptions) -> HintOptions {
        HintOptions::builtin()
            .merged(&self.config.defaults_for(mode))
            .merged(call_site)
    }

    /// Provider for the cursor's mode, else the host's automatic provider
    fn resolve_provider(&self, editor: &dyn EditorHost, mode: Option<&str>) -> Option<Provider> {
        if let Some(provider) = mode.and_then(|mode| self.registry.resolve(mode)) {
            return Some(provider);
        }

        debug!(mode = ?mode, "No registered hint provider, using host fallback");
        editor.automatic_provider()
    }

    /// Run one completion trigger in the host's raw calling convention
    ///
    /// `deliver` is only ever called for asynchronous providers, exactly once
    /// per trigger: with the settled result, or with `None` when the result
    /// can never arrive.
    ///
    /// # Errors
    ///
    /// Returns the provider's own error when a synchronous provider fails, and
    /// [`HintError::RuntimeUnavailable`] when an asynchronous provider is
    /// triggered outside a tokio runtime. `deliver` has already received
    /// `None` by then and the provider was not invoked.
    pub fn trigger(
        &self,
        editor: Arc<dyn EditorHost>,
        call_site: HintOptions,
        deliver: Delivery,
    ) -> HintResult<HintResponse> {
        let position = editor.cursor_position();
        let mode = editor.mode_at(position);

        let Some(provider) = self.resolve_provider(editor.as_ref(), mode.as_deref()) else {
            debug!(mode = ?mode, "No hint provider available");
            return Ok(HintResponse::Ready(None));
        };

        let options = self.resolve_options(mode.as_deref(), &call_site);

        match provider {
            Provider::Sync(hint) => {
                let set = hint(editor, &options)?;
                debug!(
                    mode = ?mode,
                    candidates = set.as_ref().map_or(0, |set| set.len()),
                    "Sync provider returned"
                );
                Ok(HintResponse::Ready(set.map(|set| set.marshal())))
            }
            Provider::Async(hint) => {
                let Ok(runtime) = Handle::try_current() else {
                    // The host still gets its one delivery
                    debug!(mode = ?mode, "No runtime for async provider");
                    deliver(None);
                    return Err(HintError::RuntimeUnavailable);
                };
                let pending = hint(editor, options);

                runtime.spawn(async move {
                    let bag = match pending.await {
                        Ok(set) => set.map(|set| set.marshal()),
                        Err(e) => {
                            // Surfaced to the host as "no completions"
                            debug!(error = %e, "Async provider failed");
                            None
                        }
                    };
                    debug!(delivered = bag.is_some(), "Delivering deferred hints");
                    deliver(bag);
                });

                debug!(mode = ?mode, "Async provider pending");
                Ok(HintResponse::Deferred)
            }
        }
    }

    /// Run a trigger and show whatever it produces, now or once it settles
    pub fn autocomplete(
        &self,
        editor: Arc<dyn EditorHost>,
        call_site: HintOptions,
    ) -> HintResult<()> {
        let host = Arc::clone(&editor);
        let deliver: Delivery = Box::new(move |bag| {
            if let Some(bag) = bag {
                host.show_completion_popup(bag);
            }
        });

        let response = self.trigger(Arc::clone(&editor), call_site, deliver)?;
        if let HintResponse::Ready(Some(bag)) = response {
            editor.show_completion_popup(bag);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ALIGN_WITH_WORD, CLOSE_ON_UNFOCUS, COMPLETE_SINGLE};
    use serde_json::json;

    fn dispatcher_with(config: HintsConfig) -> CompletionDispatcher {
        CompletionDispatcher::new(Arc::new(ProviderRegistry::new()), Arc::new(config))
    }

    #[test]
    fn test_builtin_defaults_apply() {
        let dispatcher = dispatcher_with(HintsConfig::new());
        let options = dispatcher.resolve_options(None, &HintOptions::new());

        assert!(options.complete_single());
        assert!(options.align_with_word());
        assert!(options.close_on_unfocus());
    }

    #[test]
    fn test_call_site_beats_configured_defaults() {
        let config = HintsConfig::new().with_mode(
            "sql",
            HintOptions::new()
                .with(COMPLETE_SINGLE, false)
                .with(ALIGN_WITH_WORD, false)
                .with("tables", json!(["users"])),
        );
        let dispatcher = dispatcher_with(config);
        let call_site = HintOptions::new().with(ALIGN_WITH_WORD, true);

        let options = dispatcher.resolve_options(Some("sql"), &call_site);
        assert!(!options.complete_single());
        assert!(options.align_with_word());
        assert!(options.close_on_unfocus());
        assert_eq!(options.raw_option("tables"), Some(&json!(["users"])));
    }

    #[test]
    fn test_configured_defaults_scoped_to_mode() {
        let config =
            HintsConfig::new().with_mode("sql", HintOptions::new().with(CLOSE_ON_UNFOCUS, false));
        let dispatcher = dispatcher_with(config);
        let call_site = HintOptions::new();

        assert!(!dispatcher.resolve_options(Some("sql"), &call_site).close_on_unfocus());
        assert!(dispatcher.resolve_options(Some("css"), &call_site).close_on_unfocus());
    }
}
