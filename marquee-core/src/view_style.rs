use marquee_model::ViewStyle;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

static GLOBAL_VIEW_STYLE: Lazy<ViewStyleState> =
    Lazy::new(ViewStyleState::default);

/// The process-wide view style slot.
pub fn global() -> &'static ViewStyleState {
    &GLOBAL_VIEW_STYLE
}

/// Shared, observable view style. Clones refer to the same slot.
#[derive(Debug, Clone)]
pub struct ViewStyleState {
    sender: Arc<watch::Sender<ViewStyle>>,
}

impl Default for ViewStyleState {
    fn default() -> Self {
        Self::new(ViewStyle::default())
    }
}

impl ViewStyleState {
    pub fn new(initial: ViewStyle) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn get(&self) -> ViewStyle {
        *self.sender.borrow()
    }

    /// Returns whether the style changed.
    pub fn set(&self, style: ViewStyle) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == style {
                return false;
            }
            *current = style;
            true
        });
        if changed {
            debug!(%style, "view style changed");
        }
        changed
    }

    pub fn toggle(&self) -> ViewStyle {
        let next = self.get().toggled();
        self.set(next);
        next
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewStyle> {
        self.sender.subscribe()
    }
}
