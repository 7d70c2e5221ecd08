//! Persisted layout records and the store/load codec.
//!
//! A stored layout is a flat map of named records: the reserved
//! `MainWindow` and `FloatingNodes` entries plus one entry per container,
//! named by pre-order traversal number. The root container is always `"0"`
//! and nests its child containers inline, so a load only reads the three
//! reserved names. Identity keys are the sole join between a live panel and
//! its record; titles and geometry always come from the record on load.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use ratatui::layout::Direction;
use serde::{Deserialize, Serialize};

use crate::area::DockArea;
use crate::error::DockError;
use crate::layout::tree::{self, LayoutNode, SplitNode, TabNode};
use crate::layout::FloatRect;
use crate::panel::Panel;

pub const MAIN_WINDOW: &str = "MainWindow";
pub const FLOATING_NODES: &str = "FloatingNodes";

const ROOT_RECORD: &str = "0";

/// Serialized split orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl From<Direction> for Orientation {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Horizontal => Orientation::Horizontal,
            Direction::Vertical => Orientation::Vertical,
        }
    }
}

impl From<Orientation> for Direction {
    fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Direction::Horizontal,
            Orientation::Vertical => Direction::Vertical,
        }
    }
}

/// A docked panel reference inside a container record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafRecord {
    pub setting_name: String,
    pub title: String,
}

/// A floating panel entry under the `FloatingNodes` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatingRecord {
    pub setting_name: String,
    pub title: String,
    pub size: [f64; 2],
    pub position: [f64; 2],
    #[serde(default)]
    pub minimized: bool,
}

/// A named record in the persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum Record {
    Split {
        orientation: Orientation,
        divider_positions: Vec<f64>,
        children: Vec<ChildRecord>,
    },
    Tab {
        selected_index: usize,
        children: Vec<ChildRecord>,
    },
    FloatingNodes {
        children: Vec<FloatingRecord>,
    },
    MainWindow {
        size: [f64; 2],
        position: [f64; 2],
    },
}

/// A container child: either a nested container record or a leaf reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildRecord {
    Pane(Box<Record>),
    Leaf(LeafRecord),
}

/// The whole persisted document: record name to record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutDocument {
    pub records: BTreeMap<String, Record>,
}

impl LayoutDocument {
    /// Encodes the surface's current state together with the outer window
    /// geometry, which the engine does not own and reads only here.
    pub fn encode(area: &DockArea, window: FloatRect) -> Self {
        let mut records = BTreeMap::new();

        let mut floating = Vec::new();
        for key in &area.undocked {
            let Some(panel) = area.panels.get(key) else {
                continue;
            };
            if !panel.floating() || panel.closed() || panel.ignore_store() {
                continue;
            }
            let rect = panel.floating_rect().unwrap_or_default();
            floating.push(FloatingRecord {
                setting_name: key.clone(),
                title: panel.title().to_owned(),
                size: rect.size(),
                position: rect.position(),
                minimized: panel.minimized(),
            });
        }
        records.insert(
            FLOATING_NODES.to_owned(),
            Record::FloatingNodes { children: floating },
        );

        if let Some(root) = area.root.as_ref() {
            let mut counter = 0usize;
            let mut named = Vec::new();
            if let LayoutNode::Leaf(_) = root {
                // a bare leaf root is stored as a single-child split
                let wrapped = LayoutNode::Split(SplitNode::with_children(
                    Direction::Horizontal,
                    vec![root.clone()],
                ));
                encode_node(&wrapped, area, &mut counter, &mut named);
            } else {
                encode_node(root, area, &mut counter, &mut named);
            }
            for (name, record) in named {
                records.insert(name, record);
            }
        }

        records.insert(
            MAIN_WINDOW.to_owned(),
            Record::MainWindow {
                size: window.size(),
                position: window.position(),
            },
        );

        Self { records }
    }

    pub fn main_window(&self) -> Option<FloatRect> {
        match self.records.get(MAIN_WINDOW) {
            Some(Record::MainWindow { size, position }) => {
                Some(FloatRect::from_parts(*size, *position))
            }
            _ => None,
        }
    }
}

fn encode_node(
    node: &LayoutNode,
    area: &DockArea,
    counter: &mut usize,
    named: &mut Vec<(String, Record)>,
) -> Option<ChildRecord> {
    match node {
        LayoutNode::Leaf(key) => {
            let panel = area.panels.get(key);
            if panel.is_some_and(Panel::ignore_store) {
                return None;
            }
            let title = panel
                .map(|p| p.title().to_owned())
                .unwrap_or_else(|| key.clone());
            Some(ChildRecord::Leaf(LeafRecord {
                setting_name: key.clone(),
                title,
            }))
        }
        LayoutNode::Split(split) => {
            let name = counter.to_string();
            *counter += 1;
            let children: Vec<ChildRecord> = split
                .children
                .iter()
                .filter_map(|child| encode_node(child, area, counter, named))
                .collect();
            if children.is_empty() {
                return None;
            }
            let record = Record::Split {
                orientation: split.direction.into(),
                divider_positions: split.dividers.clone(),
                children,
            };
            named.push((name, record.clone()));
            Some(ChildRecord::Pane(Box::new(record)))
        }
        LayoutNode::Tab(tab) => {
            let name = counter.to_string();
            *counter += 1;
            let children: Vec<ChildRecord> = tab
                .children
                .iter()
                .filter_map(|child| encode_node(child, area, counter, named))
                .collect();
            if children.is_empty() {
                return None;
            }
            let record = Record::Tab {
                selected_index: tab.selected,
                children,
            };
            named.push((name, record.clone()));
            Some(ChildRecord::Pane(Box::new(record)))
        }
    }
}

/// Outcome of a load: outer window geometry for the caller to apply, and
/// every identity key that could not be resolved to a live panel.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub main_window: Option<FloatRect>,
    pub missing: Vec<String>,
}

impl DockArea {
    /// Stores the current layout as JSON at `path`. `window` is the outer
    /// window geometry, read from the UI layer at store time.
    pub fn store<P: AsRef<Path>>(&self, path: P, window: FloatRect) -> Result<(), DockError> {
        let doc = LayoutDocument::encode(self, window);
        let json = serde_json::to_string_pretty(&doc)?;
        fs::write(path.as_ref(), json)?;
        tracing::debug!(path = %path.as_ref().display(), "stored layout");
        Ok(())
    }

    /// Loads a layout from `path`. Keys without a live panel are reported
    /// in the returned [`LoadReport`] and skipped.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport, DockError> {
        self.load_with(path, |_| None)
    }

    /// Loads a layout from `path`, consulting `resolver` for any identity
    /// key not currently registered. A read or parse failure leaves the
    /// in-memory state untouched.
    pub fn load_with<P, F>(&mut self, path: P, resolver: F) -> Result<LoadReport, DockError>
    where
        P: AsRef<Path>,
        F: FnMut(&str) -> Option<Panel>,
    {
        let text = fs::read_to_string(path.as_ref())?;
        let doc: LayoutDocument = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded layout");
        Ok(self.apply_document(&doc, resolver))
    }

    /// Rebuilds the surface from a decoded document.
    ///
    /// The surface is first normalized to a clean baseline: the tree is
    /// cleared and every panel unfloated. Panels named by the document are
    /// then re-floated or re-docked; panels the document does not mention
    /// are closed into the undocked set.
    pub fn apply_document<F>(&mut self, doc: &LayoutDocument, mut resolver: F) -> LoadReport
    where
        F: FnMut(&str) -> Option<Panel>,
    {
        let mut missing = Vec::new();

        self.root = None;
        self.undocked.clear();
        for panel in self.panels.values_mut() {
            panel.set_floating(false);
        }

        if let Some(Record::FloatingNodes { children }) = doc.records.get(FLOATING_NODES) {
            for record in children {
                if !self.resolve_panel(&record.setting_name, &mut resolver) {
                    tracing::warn!(key = %record.setting_name, "floating panel is not present");
                    missing.push(record.setting_name.clone());
                    continue;
                }
                if let Some(panel) = self.panels.get_mut(&record.setting_name) {
                    panel.set_title(record.title.clone());
                    panel.set_floating(true);
                    panel.set_floating_rect(Some(FloatRect::from_parts(
                        record.size,
                        record.position,
                    )));
                    panel.set_minimized(record.minimized);
                    panel.set_closed(false);
                }
                self.undocked.insert(record.setting_name.clone());
            }
        }

        if let Some(record) = doc.records.get(ROOT_RECORD) {
            self.root = self.build_container(record, &mut resolver, &mut missing);
            tree::normalize(&mut self.root);
        }

        let docked: BTreeSet<String> = self.docked_keys().into_iter().collect();
        let mut to_close = Vec::new();
        for key in self.panels.keys() {
            if !docked.contains(key) && !self.undocked.contains(key) {
                to_close.push(key.clone());
            }
        }
        for key in to_close {
            if let Some(panel) = self.panels.get_mut(&key) {
                panel.set_floating(false);
                panel.set_closed(true);
            }
            self.undocked.insert(key);
        }

        self.sync_tree_state();

        LoadReport {
            main_window: doc.main_window(),
            missing,
        }
    }

    fn build_container<F>(
        &mut self,
        record: &Record,
        resolver: &mut F,
        missing: &mut Vec<String>,
    ) -> Option<LayoutNode>
    where
        F: FnMut(&str) -> Option<Panel>,
    {
        match record {
            Record::Split {
                orientation,
                divider_positions,
                children,
            } => {
                let built: Vec<LayoutNode> = children
                    .iter()
                    .filter_map(|child| self.build_child(child, resolver, missing))
                    .collect();
                if built.is_empty() {
                    return None;
                }
                let mut split = SplitNode {
                    direction: (*orientation).into(),
                    children: built,
                    dividers: divider_positions.clone(),
                };
                if split.dividers.len() != split.children.len().saturating_sub(1) {
                    split.reset_dividers();
                }
                Some(LayoutNode::Split(split))
            }
            Record::Tab {
                selected_index,
                children,
            } => {
                let built: Vec<LayoutNode> = children
                    .iter()
                    .filter_map(|child| self.build_child(child, resolver, missing))
                    .collect();
                if built.is_empty() {
                    return None;
                }
                let selected = (*selected_index).min(built.len() - 1);
                Some(LayoutNode::Tab(TabNode {
                    children: built,
                    selected,
                }))
            }
            _ => None,
        }
    }

    fn build_child<F>(
        &mut self,
        child: &ChildRecord,
        resolver: &mut F,
        missing: &mut Vec<String>,
    ) -> Option<LayoutNode>
    where
        F: FnMut(&str) -> Option<Panel>,
    {
        match child {
            ChildRecord::Pane(record) => self.build_container(record, resolver, missing),
            ChildRecord::Leaf(leaf) => {
                if !self.resolve_panel(&leaf.setting_name, resolver) {
                    tracing::warn!(key = %leaf.setting_name, "docked panel is not present");
                    missing.push(leaf.setting_name.clone());
                    return None;
                }
                if let Some(panel) = self.panels.get_mut(&leaf.setting_name) {
                    panel.set_title(leaf.title.clone());
                    panel.set_closed(false);
                    panel.set_floating(false);
                }
                self.undocked.remove(&leaf.setting_name);
                Some(LayoutNode::leaf(leaf.setting_name.clone()))
            }
        }
    }

    /// Ensures a panel for `key` is registered, consulting the resolver for
    /// unknown keys. The resolver must create the panel under the requested
    /// key; a mismatched key counts as unresolved.
    fn resolve_panel<F>(&mut self, key: &str, resolver: &mut F) -> bool
    where
        F: FnMut(&str) -> Option<Panel>,
    {
        if self.panels.contains_key(key) {
            return true;
        }
        match resolver(key) {
            Some(panel) if panel.key() == key => {
                self.panels.insert(key.to_owned(), panel);
                true
            }
            Some(panel) => {
                tracing::warn!(key, resolved = panel.key(), "resolver returned a mismatched key");
                false
            }
            None => false,
        }
    }
}
