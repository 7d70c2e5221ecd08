use std::collections::{BTreeMap, BTreeSet};

use ratatui::layout::Direction;

use crate::error::DockError;
use crate::layout::tree::{self, LayoutNode, SplitNode, TabNode, TreePath};
use crate::layout::DockPosition;
use crate::panel::Panel;

/// The dock surface: owns the layout tree, every panel registered with it,
/// and the set of undocked (floating or closed) panels.
///
/// A panel key is never simultaneously in the tree and in the undocked set;
/// every mutating operation here re-establishes that, along with the tree's
/// structural invariants, before returning.
#[derive(Debug, Default)]
pub struct DockArea {
    pub(crate) panels: BTreeMap<String, Panel>,
    pub(crate) root: Option<LayoutNode>,
    pub(crate) undocked: BTreeSet<String>,
    exclusive: bool,
}

impl DockArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a panel with this surface. New panels start in the
    /// undocked set until docked. Re-registering a key replaces the stored
    /// panel state.
    pub fn add_panel(&mut self, panel: Panel) {
        let key = panel.key().to_owned();
        self.panels.insert(key.clone(), panel);
        if !self.root.as_ref().is_some_and(|r| r.contains_leaf(&key)) {
            self.undocked.insert(key);
        }
    }

    pub fn panel(&self, key: &str) -> Option<&Panel> {
        self.panels.get(key)
    }

    pub fn panel_mut(&mut self, key: &str) -> Option<&mut Panel> {
        self.panels.get_mut(key)
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.values()
    }

    pub fn root(&self) -> Option<&LayoutNode> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Whether this surface accepts and offers only its own panels.
    pub fn exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn set_exclusive(&mut self, exclusive: bool) {
        self.exclusive = exclusive;
    }

    /// Keys of panels currently in the tree, in pre-order.
    pub fn docked_keys(&self) -> Vec<String> {
        self.root
            .as_ref()
            .map(LayoutNode::leaf_keys)
            .unwrap_or_default()
    }

    pub fn undocked_keys(&self) -> Vec<String> {
        self.undocked.iter().cloned().collect()
    }

    pub fn is_docked(&self, key: &str) -> bool {
        self.root.as_ref().is_some_and(|r| r.contains_leaf(key))
    }

    /// Docks a panel at `position` relative to the whole layout.
    pub fn dock_root(&mut self, key: &str, position: DockPosition) -> Result<(), DockError> {
        self.dock(key, position, None)
    }

    /// Docks a registered panel at `position` relative to `sibling`.
    ///
    /// An absent sibling targets the layout as a whole. A sibling key that
    /// is no longer in the tree falls back to docking at the right edge of
    /// the layout; that recovery is deliberate and silent (logged at debug
    /// level), not an error. A panel that is already docked is moved.
    pub fn dock(
        &mut self,
        key: &str,
        position: DockPosition,
        sibling: Option<&str>,
    ) -> Result<(), DockError> {
        if !self.panels.contains_key(key) {
            return Err(DockError::UnknownPanel(key.to_owned()));
        }
        self.undocked.remove(key);
        if let Some(panel) = self.panels.get_mut(key) {
            panel.set_floating(false);
            panel.set_closed(false);
        }
        if self.root.as_ref().is_some_and(|r| r.contains_leaf(key)) {
            self.remove_from_tree(key);
        }

        let Some(root) = self.root.as_ref() else {
            self.root = Some(LayoutNode::Split(SplitNode::with_children(
                Direction::Horizontal,
                vec![LayoutNode::leaf(key)],
            )));
            self.sync_tree_state();
            tracing::debug!(key, "docked first panel");
            return Ok(());
        };

        let mut position = position;
        let target = match sibling {
            Some(sib) => match root.path_to_leaf(sib) {
                Some(path) => Some(path),
                None => {
                    tracing::debug!(
                        key,
                        sibling = sib,
                        "sibling not in tree, docking at right edge"
                    );
                    position = DockPosition::Right;
                    None
                }
            },
            None => None,
        };

        match (target, position.direction()) {
            (Some(path), Some(dir)) => {
                self.dock_side(key, dir, position.inserts_before(), &path)
            }
            (Some(path), None) => self.dock_center(key, &path),
            (None, Some(dir)) => self.dock_side_root(key, dir, position.inserts_before()),
            (None, None) => self.dock_center_root(key),
        }

        self.sync_tree_state();
        tracing::debug!(key, position = ?position, "docked panel");
        Ok(())
    }

    /// Detaches a panel from the tree into the undocked set. A second call
    /// for an already-undocked panel is a no-op.
    pub fn undock(&mut self, key: &str) -> Result<(), DockError> {
        if !self.panels.contains_key(key) {
            return Err(DockError::UnknownPanel(key.to_owned()));
        }
        if self.undocked.contains(key) {
            return Ok(());
        }
        self.undocked.insert(key.to_owned());
        self.remove_from_tree(key);
        if let Some(panel) = self.panels.get_mut(key) {
            panel.set_tabbed(false);
        }
        self.sync_tree_state();
        tracing::debug!(key, "undocked panel");
        Ok(())
    }

    /// Drops a panel from the undocked set without touching the tree, for
    /// panels destroyed while floating or closed. Docked panels are left
    /// alone.
    pub fn remove(&mut self, key: &str) {
        if self.undocked.remove(key) {
            self.panels.remove(key);
            tracing::debug!(key, "removed panel");
        }
    }

    /// Undocks the panel and marks it floating, restoring its remembered
    /// floating rectangle if it has one.
    pub fn float(&mut self, key: &str) -> Result<(), DockError> {
        self.undock(key)?;
        if let Some(panel) = self.panels.get_mut(key) {
            panel.set_floating(true);
            panel.set_closed(false);
        }
        Ok(())
    }

    pub fn unfloat(&mut self, key: &str) -> Result<(), DockError> {
        let Some(panel) = self.panels.get_mut(key) else {
            return Err(DockError::UnknownPanel(key.to_owned()));
        };
        panel.set_floating(false);
        Ok(())
    }

    /// Undocks the panel and marks it closed. Closed panels stay registered
    /// so a later load can revive them by key.
    pub fn close(&mut self, key: &str) -> Result<(), DockError> {
        self.undock(key)?;
        if let Some(panel) = self.panels.get_mut(key) {
            panel.set_floating(false);
            panel.set_closed(true);
        }
        Ok(())
    }

    /// Moves a panel from another surface and docks it here. Rejected when
    /// either surface is exclusive; exclusivity is the only coupling
    /// between surfaces.
    pub fn dock_from(
        &mut self,
        source: &mut DockArea,
        key: &str,
        position: DockPosition,
        sibling: Option<&str>,
    ) -> Result<(), DockError> {
        if self.exclusive || source.exclusive {
            return Err(DockError::ExclusiveSurface);
        }
        let Some(mut panel) = source.panels.remove(key) else {
            return Err(DockError::UnknownPanel(key.to_owned()));
        };
        source.undocked.remove(key);
        source.remove_from_tree(key);
        source.sync_tree_state();
        panel.set_floating(false);
        self.panels.insert(key.to_owned(), panel);
        self.undocked.insert(key.to_owned());
        tracing::debug!(key, "transferred panel between surfaces");
        self.dock(key, position, sibling)
    }

    fn remove_from_tree(&mut self, key: &str) {
        if self.root.as_ref().and_then(LayoutNode::leaf_key) == Some(key) {
            self.root = None;
            return;
        }
        let Some(root) = self.root.as_mut() else {
            return;
        };
        let Some(path) = root.path_to_leaf(key) else {
            return;
        };
        if let Some((index, parent_path)) = path.split_last()
            && let Some(parent) = root.node_at_mut(parent_path)
        {
            parent.remove_child(*index);
        }
        tree::normalize(&mut self.root);
    }

    fn dock_side(&mut self, key: &str, dir: Direction, before: bool, sib_path: &[usize]) {
        let Some((index, parent_path)) = sib_path.split_last() else {
            self.dock_side_root(key, dir, before);
            return;
        };
        let parent_is_tab = matches!(
            self.root.as_ref().and_then(|r| r.node_at(parent_path)),
            Some(LayoutNode::Tab(_))
        );
        if parent_is_tab {
            // a tabbed sibling positions the whole tab group
            self.dock_beside_container(key, parent_path, dir, before);
            return;
        }
        let Some(root) = self.root.as_mut() else {
            return;
        };
        let Some(LayoutNode::Split(split)) = root.node_at_mut(parent_path) else {
            return;
        };
        if split.direction == dir {
            let at = if before { *index } else { *index + 1 };
            split.insert_child(at, LayoutNode::leaf(key));
        } else if split.children.len() > 1 {
            // wrap the sibling in a split of the requested direction
            let Some(slot) = split.children.get_mut(*index) else {
                return;
            };
            let sibling = std::mem::replace(slot, LayoutNode::leaf(String::new()));
            let mut wrapper = SplitNode::with_children(dir, vec![sibling]);
            wrapper.insert_child(usize::from(!before), LayoutNode::leaf(key));
            *slot = LayoutNode::Split(wrapper);
        } else {
            split.direction = dir;
            let at = if before { *index } else { *index + 1 };
            split.insert_child(at, LayoutNode::leaf(key));
        }
    }

    /// Docks beside the container at `unit_path`, treating the container as
    /// the positioned unit (used when the sibling sits inside a tab group).
    fn dock_beside_container(&mut self, key: &str, unit_path: &[usize], dir: Direction, before: bool) {
        let Some((unit_index, parent_path)) = unit_path.split_last() else {
            self.wrap_root(key, dir, before);
            return;
        };
        let Some(root) = self.root.as_mut() else {
            return;
        };
        let Some(LayoutNode::Split(split)) = root.node_at_mut(parent_path) else {
            return;
        };
        if split.direction == dir {
            let at = if before { *unit_index } else { *unit_index + 1 };
            split.insert_child(at, LayoutNode::leaf(key));
        } else if split.children.len() > 1 {
            let Some(slot) = split.children.get_mut(*unit_index) else {
                return;
            };
            let unit = std::mem::replace(slot, LayoutNode::leaf(String::new()));
            let mut wrapper = SplitNode::with_children(dir, vec![unit]);
            wrapper.insert_child(usize::from(!before), LayoutNode::leaf(key));
            *slot = LayoutNode::Split(wrapper);
        } else {
            split.direction = dir;
            let at = if before { *unit_index } else { *unit_index + 1 };
            split.insert_child(at, LayoutNode::leaf(key));
        }
    }

    fn dock_side_root(&mut self, key: &str, dir: Direction, before: bool) {
        if let Some(LayoutNode::Split(split)) = self.root.as_mut() {
            if split.direction == dir || split.children.len() <= 1 {
                split.direction = dir;
                let at = if before { 0 } else { split.children.len() };
                split.insert_child(at, LayoutNode::leaf(key));
                return;
            }
        }
        self.wrap_root(key, dir, before);
    }

    fn dock_center(&mut self, key: &str, sib_path: &[usize]) {
        let Some((index, parent_path)) = sib_path.split_last() else {
            self.dock_center_root(key);
            return;
        };
        let Some(root) = self.root.as_mut() else {
            return;
        };
        let Some(parent) = root.node_at_mut(parent_path) else {
            return;
        };
        match parent {
            LayoutNode::Split(split) => {
                // the tab group takes over the sibling's slot, dividers kept
                let Some(slot) = split.children.get_mut(*index) else {
                    return;
                };
                let sibling = std::mem::replace(slot, LayoutNode::leaf(String::new()));
                *slot = LayoutNode::Tab(TabNode::with_children(vec![
                    sibling,
                    LayoutNode::leaf(key),
                ]));
            }
            LayoutNode::Tab(tab) => {
                // the sibling is already tabbed; the new panel joins its group
                tab.insert_child(*index + 1, LayoutNode::leaf(key));
            }
            LayoutNode::Leaf(_) => {}
        }
    }

    fn dock_center_root(&mut self, key: &str) {
        let single_leaf = matches!(
            self.root.as_ref(),
            Some(LayoutNode::Split(split))
                if split.children.len() == 1 && matches!(split.children[0], LayoutNode::Leaf(_))
        );
        if single_leaf {
            self.dock_center(key, &[0]);
        } else if let Some(LayoutNode::Tab(tab)) = self.root.as_mut() {
            let at = tab.children.len();
            tab.insert_child(at, LayoutNode::leaf(key));
        } else {
            // no single tab target exists; dock at the right edge instead
            self.dock_side_root(key, Direction::Horizontal, false);
        }
    }

    fn wrap_root(&mut self, key: &str, dir: Direction, before: bool) {
        let Some(old_root) = self.root.take() else {
            self.root = Some(LayoutNode::Split(SplitNode::with_children(
                dir,
                vec![LayoutNode::leaf(key)],
            )));
            return;
        };
        let mut wrapper = SplitNode::with_children(dir, vec![old_root]);
        wrapper.insert_child(usize::from(!before), LayoutNode::leaf(key));
        self.root = Some(LayoutNode::Split(wrapper));
    }

    /// Refreshes every docked panel's last-location hint and tabbed flag
    /// from the current tree structure.
    pub(crate) fn sync_tree_state(&mut self) {
        let mut seen: Vec<(String, TreePath, bool)> = Vec::new();
        if let Some(root) = self.root.as_ref() {
            root.visit_leaves(|path, key, in_tab| {
                seen.push((key.to_owned(), path.to_vec(), in_tab));
            });
        }
        for (key, path, in_tab) in seen {
            if let Some(panel) = self.panels.get_mut(&key) {
                panel.set_last_location(Some(path));
                panel.set_tabbed(in_tab);
            }
        }
    }
}
