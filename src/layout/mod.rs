pub mod tree;

pub use tree::{LayoutNode, SplitNode, TabNode, TreePath};

use ratatui::layout::Direction;

/// Docking position relative to a sibling node (or the whole layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockPosition {
    Center,
    Top,
    Right,
    Bottom,
    Left,
}

impl DockPosition {
    /// The split direction required to honor this position, or `None` for
    /// `Center` (which stacks into a tab group instead of splitting).
    pub fn direction(self) -> Option<Direction> {
        match self {
            DockPosition::Left | DockPosition::Right => Some(Direction::Horizontal),
            DockPosition::Top | DockPosition::Bottom => Some(Direction::Vertical),
            DockPosition::Center => None,
        }
    }

    /// Whether the docked node lands before its sibling in child order.
    pub fn inserts_before(self) -> bool {
        matches!(self, DockPosition::Top | DockPosition::Left)
    }
}

/// Floating rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FloatRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> [f64; 2] {
        [self.width, self.height]
    }

    pub fn position(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn from_parts(size: [f64; 2], position: [f64; 2]) -> Self {
        Self {
            x: position[0],
            y: position[1],
            width: size[0],
            height: size[1],
        }
    }
}
