use crate::layout::{FloatRect, TreePath};

/// A dockable content unit.
///
/// A panel is identified by its key, a stable string unique across the
/// application. The key is the join between a live panel and its persisted
/// record; titles and geometry are display state and are overwritten from
/// the record on load.
#[derive(Debug, Clone)]
pub struct Panel {
    key: String,
    title: String,
    closed: bool,
    floating: bool,
    minimized: bool,
    tabbed: bool,
    ignore_store: bool,
    floating_rect: Option<FloatRect>,
    prev_floating_rect: Option<FloatRect>,
    last_location: Option<TreePath>,
}

impl Panel {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            closed: false,
            floating: false,
            minimized: false,
            tabbed: false,
            ignore_store: false,
            floating_rect: None,
            prev_floating_rect: None,
            last_location: None,
        }
    }

    /// Excludes this panel from persistence entirely; it will not appear in
    /// stored layouts and does not round-trip.
    pub fn with_ignore_store(mut self) -> Self {
        self.ignore_store = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn floating(&self) -> bool {
        self.floating
    }

    pub fn minimized(&self) -> bool {
        self.minimized
    }

    pub fn tabbed(&self) -> bool {
        self.tabbed
    }

    pub fn ignore_store(&self) -> bool {
        self.ignore_store
    }

    pub fn set_minimized(&mut self, minimized: bool) {
        self.minimized = minimized;
    }

    pub fn floating_rect(&self) -> Option<FloatRect> {
        self.floating_rect
    }

    pub fn set_floating_rect(&mut self, rect: Option<FloatRect>) {
        self.floating_rect = rect;
    }

    /// The panel's path in the tree after the most recent structural
    /// mutation that included it. Kept as a hint for the UI layer; stale
    /// once the panel leaves the tree.
    pub fn last_location(&self) -> Option<&TreePath> {
        self.last_location.as_ref()
    }

    pub(crate) fn set_last_location(&mut self, path: Option<TreePath>) {
        self.last_location = path;
    }

    pub(crate) fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    pub(crate) fn set_tabbed(&mut self, tabbed: bool) {
        self.tabbed = tabbed;
    }

    /// Toggles the floating flag, remembering the floating rectangle across
    /// unfloat/refloat cycles.
    pub(crate) fn set_floating(&mut self, floating: bool) {
        if self.floating == floating {
            return;
        }
        self.floating = floating;
        if floating {
            if self.floating_rect.is_none() {
                self.floating_rect = self.prev_floating_rect.take();
            }
        } else {
            self.prev_floating_rect = self.floating_rect.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_panel_starts_docked_state_clean() {
        let panel = Panel::new("explorer", "Explorer");
        assert_eq!(panel.key(), "explorer");
        assert_eq!(panel.title(), "Explorer");
        assert!(!panel.closed());
        assert!(!panel.floating());
        assert!(!panel.tabbed());
        assert!(!panel.ignore_store());
        assert!(panel.floating_rect().is_none());
    }

    #[test]
    fn floating_rect_survives_unfloat_refloat() {
        let mut panel = Panel::new("log", "Log");
        let rect = FloatRect::new(100.0, 50.0, 400.0, 300.0);
        panel.set_floating(true);
        panel.set_floating_rect(Some(rect));

        panel.set_floating(false);
        assert!(panel.floating_rect().is_none());

        panel.set_floating(true);
        assert_eq!(panel.floating_rect(), Some(rect));
    }

    #[test]
    fn set_floating_is_idempotent() {
        let mut panel = Panel::new("log", "Log");
        panel.set_floating(true);
        panel.set_floating_rect(Some(FloatRect::new(1.0, 2.0, 3.0, 4.0)));
        panel.set_floating(true);
        assert!(panel.floating_rect().is_some());
    }

    #[test]
    fn with_ignore_store_flags_the_panel() {
        let panel = Panel::new("scratch", "Scratch").with_ignore_store();
        assert!(panel.ignore_store());
    }
}
