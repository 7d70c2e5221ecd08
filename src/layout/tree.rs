use ratatui::layout::Direction;

/// Child indices walked from the root to reach a node.
///
/// Paths are the only form of upward reference in the tree: ownership flows
/// strictly root-to-leaf, and a node's parent is found by dropping the last
/// index of its path. Every structural mutation invalidates previously
/// computed paths, so callers re-resolve before each edit.
pub type TreePath = Vec<usize>;

/// A node in the docking layout tree.
///
/// The tree is a closed set of three shapes: a leaf referencing a panel by
/// its identity key, a split holding side-by-side regions, and a tab group
/// holding stacked panels. Containers always hold at least one child while
/// attached; [`normalize`] restores that invariant after removals.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    Leaf(String),
    Split(SplitNode),
    Tab(TabNode),
}

/// Ordered side-by-side regions with divider fractions between them.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitNode {
    pub direction: Direction,
    pub children: Vec<LayoutNode>,
    /// Divider fractions in `[0, 1]`, one fewer than the children.
    pub dividers: Vec<f64>,
}

/// Stacked panels, one visible at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct TabNode {
    pub children: Vec<LayoutNode>,
    pub selected: usize,
}

impl SplitNode {
    pub fn with_children(direction: Direction, children: Vec<LayoutNode>) -> Self {
        let mut split = Self {
            direction,
            children,
            dividers: Vec::new(),
        };
        split.reset_dividers();
        split
    }

    /// Distributes the dividers evenly for the current child count.
    pub fn reset_dividers(&mut self) {
        let count = self.children.len();
        self.dividers = (1..count).map(|i| i as f64 / count as f64).collect();
    }

    pub fn insert_child(&mut self, index: usize, node: LayoutNode) {
        let index = index.min(self.children.len());
        self.children.insert(index, node);
        self.reset_dividers();
    }

    pub fn remove_child(&mut self, index: usize) -> Option<LayoutNode> {
        if index >= self.children.len() {
            return None;
        }
        let child = self.children.remove(index);
        if !self.dividers.is_empty() {
            let divider = index.min(self.dividers.len() - 1);
            self.dividers.remove(divider);
        }
        Some(child)
    }
}

impl TabNode {
    pub fn with_children(children: Vec<LayoutNode>) -> Self {
        Self {
            children,
            selected: 0,
        }
    }

    pub fn insert_child(&mut self, index: usize, node: LayoutNode) {
        let index = index.min(self.children.len());
        self.children.insert(index, node);
    }

    pub fn remove_child(&mut self, index: usize) -> Option<LayoutNode> {
        if index >= self.children.len() {
            return None;
        }
        let child = self.children.remove(index);
        self.selected = self.selected.min(self.children.len().saturating_sub(1));
        Some(child)
    }
}

impl LayoutNode {
    pub fn leaf(key: impl Into<String>) -> Self {
        Self::Leaf(key.into())
    }

    pub fn leaf_key(&self) -> Option<&str> {
        match self {
            LayoutNode::Leaf(key) => Some(key),
            _ => None,
        }
    }

    pub fn children(&self) -> &[LayoutNode] {
        match self {
            LayoutNode::Leaf(_) => &[],
            LayoutNode::Split(split) => &split.children,
            LayoutNode::Tab(tab) => &tab.children,
        }
    }

    /// Swaps a child in place. The slot keeps its position and, for a
    /// split, the divider fractions around it.
    pub fn replace_child(&mut self, index: usize, node: LayoutNode) -> Option<LayoutNode> {
        let slot = match self {
            LayoutNode::Leaf(_) => None,
            LayoutNode::Split(split) => split.children.get_mut(index),
            LayoutNode::Tab(tab) => tab.children.get_mut(index),
        }?;
        Some(std::mem::replace(slot, node))
    }

    pub fn insert_child(&mut self, index: usize, node: LayoutNode) {
        match self {
            LayoutNode::Leaf(_) => {}
            LayoutNode::Split(split) => split.insert_child(index, node),
            LayoutNode::Tab(tab) => tab.insert_child(index, node),
        }
    }

    pub fn remove_child(&mut self, index: usize) -> Option<LayoutNode> {
        match self {
            LayoutNode::Leaf(_) => None,
            LayoutNode::Split(split) => split.remove_child(index),
            LayoutNode::Tab(tab) => tab.remove_child(index),
        }
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&LayoutNode> {
        let mut current = self;
        for &index in path {
            current = current.children().get(index)?;
        }
        Some(current)
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut LayoutNode> {
        let mut current = self;
        for &index in path {
            let children = match current {
                LayoutNode::Leaf(_) => return None,
                LayoutNode::Split(split) => &mut split.children,
                LayoutNode::Tab(tab) => &mut tab.children,
            };
            current = children.get_mut(index)?;
        }
        Some(current)
    }

    /// Depth-first path to the leaf holding `key`.
    pub fn path_to_leaf(&self, key: &str) -> Option<TreePath> {
        fn walk(node: &LayoutNode, key: &str, path: &mut TreePath) -> bool {
            match node {
                LayoutNode::Leaf(k) => k == key,
                _ => {
                    for (index, child) in node.children().iter().enumerate() {
                        path.push(index);
                        if walk(child, key, path) {
                            return true;
                        }
                        path.pop();
                    }
                    false
                }
            }
        }

        let mut path = TreePath::new();
        walk(self, key, &mut path).then_some(path)
    }

    pub fn contains_leaf(&self, key: &str) -> bool {
        match self {
            LayoutNode::Leaf(k) => k == key,
            _ => self.children().iter().any(|child| child.contains_leaf(key)),
        }
    }

    /// Pre-order visit of every leaf with its path and whether it sits
    /// directly inside a tab group.
    pub fn visit_leaves<F>(&self, mut visit: F)
    where
        F: FnMut(&[usize], &str, bool),
    {
        fn walk<F: FnMut(&[usize], &str, bool)>(
            node: &LayoutNode,
            path: &mut TreePath,
            in_tab: bool,
            visit: &mut F,
        ) {
            match node {
                LayoutNode::Leaf(key) => visit(path, key, in_tab),
                LayoutNode::Split(split) => {
                    for (index, child) in split.children.iter().enumerate() {
                        path.push(index);
                        walk(child, path, false, visit);
                        path.pop();
                    }
                }
                LayoutNode::Tab(tab) => {
                    for (index, child) in tab.children.iter().enumerate() {
                        path.push(index);
                        walk(child, path, true, visit);
                        path.pop();
                    }
                }
            }
        }

        let mut path = TreePath::new();
        walk(self, &mut path, false, &mut visit);
    }

    pub fn leaf_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        self.visit_leaves(|_, key, _| keys.push(key.to_owned()));
        keys
    }

    fn take_only_child(&mut self) -> Option<LayoutNode> {
        match self {
            LayoutNode::Leaf(_) => None,
            LayoutNode::Split(split) => split.children.pop(),
            LayoutNode::Tab(tab) => tab.children.pop(),
        }
    }
}

/// Restores the structural invariants bottom-up after a removal or a
/// partially resolved rebuild: emptied containers are dropped (clearing the
/// root if it empties), a tab group reduced to one leaf is replaced by that
/// leaf, and any other non-root container reduced to one child is replaced
/// by its child. The root split may keep a single child.
pub fn normalize(root: &mut Option<LayoutNode>) {
    if let Some(node) = root.as_mut()
        && !normalize_node(node, true)
    {
        *root = None;
    }
}

fn normalize_node(node: &mut LayoutNode, is_root: bool) -> bool {
    match node {
        LayoutNode::Leaf(_) => return true,
        LayoutNode::Split(split) => {
            let mut index = 0;
            while index < split.children.len() {
                if normalize_node(&mut split.children[index], false) {
                    index += 1;
                } else {
                    split.remove_child(index);
                }
            }
            if split.children.is_empty() {
                return false;
            }
        }
        LayoutNode::Tab(tab) => {
            let mut index = 0;
            while index < tab.children.len() {
                if normalize_node(&mut tab.children[index], false) {
                    index += 1;
                } else {
                    tab.remove_child(index);
                }
            }
            if tab.children.is_empty() {
                return false;
            }
        }
    }

    let collapse = match &*node {
        LayoutNode::Split(split) if split.children.len() == 1 => !is_root,
        // A tab of one leaf is disallowed everywhere; a tab holding one
        // container collapses like any other single-child container.
        LayoutNode::Tab(tab) if tab.children.len() == 1 => {
            matches!(tab.children[0], LayoutNode::Leaf(_)) || !is_root
        }
        _ => false,
    };
    if collapse && let Some(child) = node.take_only_child() {
        *node = child;
    }
    true
}
