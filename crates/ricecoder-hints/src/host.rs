//! Interface to the host editor widget
//!
//! The hints layer never touches the text buffer, the popup UI or keybindings
//! itself. Everything it needs from the editor goes through [`EditorHost`], and
//! everything the editor calls back into is one of the callable shapes below.

use crate::error::HintResult;
use crate::marshal::{BagEntry, HintBag};
use crate::options::HintOptions;
use crate::provider::Provider;
use crate::types::Position;
use std::fmt;
use std::sync::Arc;

/// Name of the command the hints layer installs on the host
pub const AUTOCOMPLETE_COMMAND: &str = "autocomplete";

/// Helper kind under which the dispatcher is installed on the host
pub const HINT_HELPER: &str = "hint";

/// Host callback receiving a deferred result; `None` means no completions
pub type Delivery = Box<dyn FnOnce(Option<Arc<HintBag>>) + Send>;

/// Installed as the host's `autocomplete` command; shows whatever it finds
pub type AutocompleteCommand =
    Arc<dyn Fn(Arc<dyn EditorHost>, HintOptions) -> HintResult<()> + Send + Sync>;

/// Installed as the host's `hint` helper; raw calling convention
pub type HintHelper = Arc<
    dyn Fn(Arc<dyn EditorHost>, HintOptions, Delivery) -> HintResult<HintResponse> + Send + Sync,
>;

/// What a trigger returns to the host at call time
#[derive(Debug, Clone)]
pub enum HintResponse {
    /// Computed inline; `None` means no completions
    Ready(Option<Arc<HintBag>>),
    /// The result will arrive through the delivery callback
    Deferred,
}

impl HintResponse {
    pub fn is_deferred(&self) -> bool {
        matches!(self, HintResponse::Deferred)
    }

    /// The immediate bag, if one was produced inline
    pub fn into_ready(self) -> Option<Arc<HintBag>> {
        match self {
            HintResponse::Ready(bag) => bag,
            HintResponse::Deferred => None,
        }
    }
}

/// Popup lifecycle events the host emits against a bag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupEventKind {
    Shown,
    Close,
    Pick,
    Update,
    Select,
}

impl PopupEventKind {
    pub const ALL: [PopupEventKind; 5] = [
        PopupEventKind::Shown,
        PopupEventKind::Close,
        PopupEventKind::Pick,
        PopupEventKind::Update,
        PopupEventKind::Select,
    ];

    /// Event name as the host spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            PopupEventKind::Shown => "shown",
            PopupEventKind::Close => "close",
            PopupEventKind::Pick => "pick",
            PopupEventKind::Update => "update",
            PopupEventKind::Select => "select",
        }
    }
}

impl fmt::Display for PopupEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host reference to the element a menu row is drawn into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowElement(pub u64);

/// Raw event payload as the host reports it
#[derive(Debug, Clone)]
pub enum RawPopupEvent {
    Shown,
    Close,
    Pick(BagEntry),
    Update,
    Select(BagEntry, RowElement),
}

impl RawPopupEvent {
    pub fn kind(&self) -> PopupEventKind {
        match self {
            RawPopupEvent::Shown => PopupEventKind::Shown,
            RawPopupEvent::Close => PopupEventKind::Close,
            RawPopupEvent::Pick(_) => PopupEventKind::Pick,
            RawPopupEvent::Update => PopupEventKind::Update,
            RawPopupEvent::Select(..) => PopupEventKind::Select,
        }
    }
}

/// Handler the host calls for a raw popup event
pub type RawEventHandler = Arc<dyn Fn(&RawPopupEvent) + Send + Sync>;

/// Host-issued identifier of one event subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Capabilities the hints layer consumes from the editor widget
pub trait EditorHost: Send + Sync {
    /// Current cursor position
    fn cursor_position(&self) -> Position;

    /// Language mode in effect at `pos`, if the host knows one
    fn mode_at(&self, pos: Position) -> Option<String>;

    /// The host's own fallback provider, used when no mode provider matches
    fn automatic_provider(&self) -> Option<Provider>;

    /// Render the popup for `bag`, driving navigation and emitting events against it
    fn show_completion_popup(&self, bag: Arc<HintBag>);

    /// Default insertion: replace `from..to` with `text`
    fn replace_range(&self, text: &str, from: Position, to: Position);

    /// Subscribe to a popup event raised against `target`
    fn on(
        &self,
        target: &Arc<HintBag>,
        kind: PopupEventKind,
        handler: RawEventHandler,
    ) -> SubscriptionId;

    /// Drop a subscription; unknown ids are ignored
    fn off(&self, id: SubscriptionId);

    fn register_command(&self, name: &str, command: AutocompleteCommand);

    fn register_helper(&self, kind: &str, helper: HintHelper);
}
