//! Docking layout engine for multi-panel application windows.
//!
//! The engine maintains a tree of split and tab containers over leaf
//! panels, restructures it as panels are docked and undocked, and persists
//! the whole arrangement (including floating panels) across sessions. It
//! owns structure and state only: rendering, drag capture, overlays, and
//! window chrome belong to the embedding UI layer, which drives the engine
//! through [`DockArea`].

pub mod area;
pub mod error;
pub mod layout;
pub mod panel;
pub mod persist;

pub use area::DockArea;
pub use error::DockError;
pub use layout::{DockPosition, FloatRect, LayoutNode, SplitNode, TabNode, TreePath};
pub use panel::Panel;
pub use persist::{LayoutDocument, LoadReport};
