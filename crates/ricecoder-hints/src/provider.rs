//! Completion providers and the mode-keyed registry
//!
//! A provider is either synchronous (returns its result inline) or
//! asynchronous (returns a future the dispatcher drives later). The dispatcher
//! branches on the [`Provider`] tag; nothing is inferred from the callable.
//!
//! # Example
//!
//! ```ignore
//! use ricecoder_hints::{CompletionSet, Position, Provider, ProviderRegistry};
//! use std::sync::Arc;
//!
//! let registry = ProviderRegistry::new();
//! registry.register(
//!     "javascript",
//!     Provider::sync(|_editor, _options| {
//!         Ok(Some(Arc::new(CompletionSet::new(
//!             ["foo", "for", "function"],
//!             Position::new(0, 0),
//!             Position::new(0, 3),
//!         ))))
//!     }),
//! );
//!
//! assert!(registry.resolve("javascript").is_some());
//! ```

use crate::error::HintResult;
use crate::host::EditorHost;
use crate::options::HintOptions;
use crate::types::CompletionSet;
use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// What a provider produces; `None` means no completions
pub type HintOutcome = HintResult<Option<Arc<CompletionSet>>>;

/// Deferred result of an asynchronous provider
pub type HintFuture = BoxFuture<'static, HintOutcome>;

pub type SyncHintFn = Arc<dyn Fn(Arc<dyn EditorHost>, &HintOptions) -> HintOutcome + Send + Sync>;

pub type AsyncHintFn = Arc<dyn Fn(Arc<dyn EditorHost>, HintOptions) -> HintFuture + Send + Sync>;

/// Trait form of an asynchronous provider
///
/// Handy when a provider carries state of its own (an index, a client handle).
/// Wrap it with [`Provider::from_source`] to register it.
#[async_trait]
pub trait HintSource: Send + Sync {
    /// Compute completions for the editor's current cursor context
    async fn hints(&self, editor: Arc<dyn EditorHost>, options: HintOptions) -> HintOutcome;
}

/// A completion provider, tagged by execution style
#[derive(Clone)]
pub enum Provider {
    Sync(SyncHintFn),
    Async(AsyncHintFn),
}

impl Provider {
    pub fn sync<F>(hint: F) -> Self
    where
        F: Fn(Arc<dyn EditorHost>, &HintOptions) -> HintOutcome + Send + Sync + 'static,
    {
        Provider::Sync(Arc::new(hint))
    }

    pub fn from_async<F, Fut>(hint: F) -> Self
    where
        F: Fn(Arc<dyn EditorHost>, HintOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HintOutcome> + Send + 'static,
    {
        Provider::Async(Arc::new(
            move |editor: Arc<dyn EditorHost>, options: HintOptions| -> HintFuture {
                Box::pin(hint(editor, options))
            },
        ))
    }

    pub fn from_source(source: Arc<dyn HintSource>) -> Self {
        Provider::Async(Arc::new(
            move |editor: Arc<dyn EditorHost>, options: HintOptions| -> HintFuture {
                let source = Arc::clone(&source);
                Box::pin(async move { source.hints(editor, options).await })
            },
        ))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Provider::Async(_))
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Sync(_) => f.write_str("Provider::Sync"),
            Provider::Async(_) => f.write_str("Provider::Async"),
        }
    }
}

/// Mode-keyed table of providers
///
/// Registering under an existing mode replaces the previous provider. There is
/// no unregister operation.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `provider` under `mode`, replacing any previous entry
    pub fn register(&self, mode: impl Into<String>, provider: Provider) {
        let mode = mode.into();
        let replaced = self
            .providers
            .write()
            .insert(mode.clone(), provider)
            .is_some();
        debug!(mode = %mode, replaced, "Registered hint provider");
    }

    /// The provider registered for `mode`, if any
    pub fn resolve(&self, mode: &str) -> Option<Provider> {
        self.providers.read().get(mode).cloned()
    }

    /// All modes with a registered provider
    pub fn modes(&self) -> Vec<String> {
        let mut modes: Vec<String> = self.providers.read().keys().cloned().collect();
        modes.sort();
        modes
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("modes", &self.modes())
            .finish()
    }
}
