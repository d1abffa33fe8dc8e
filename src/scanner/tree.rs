use std::path::Path;

use super::catalog::FileEntry;
use super::walker;
use crate::common::safety::PathValidator;

/// Index of a node within its `FileTree`. Parent links are plain indices,
/// never owning references, so the tree cannot form an ownership cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// An expandable view of a `FileEntry` for interactive drill-down.
#[derive(Debug)]
pub struct TreeNode {
    pub entry: FileEntry,
    pub parent: Option<NodeId>,
    /// None until the node has been expanded once; cached thereafter and
    /// never re-fetched on re-expand.
    children: Option<Vec<NodeId>>,
    pub is_expanded: bool,
    pub is_selected: bool,
    pub is_loading: bool,
}

impl TreeNode {
    fn new(entry: FileEntry, parent: Option<NodeId>) -> Self {
        Self {
            entry,
            parent,
            children: None,
            is_expanded: false,
            is_selected: false,
            is_loading: false,
        }
    }

    pub fn is_expandable(&self) -> bool {
        self.entry.is_dir
    }

    pub fn has_loaded_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.entry.path
    }
}

/// Arena-backed browsable tree over a category's scan results.
///
/// Expansion is lazy: child items and their recursive sizes are computed on
/// the first expand of a node and cached on it; subsequent expands only
/// toggle visibility. Full scans never pre-expand beyond the one-level
/// roll-up the scanner already produced.
#[derive(Debug)]
pub struct FileTree {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
    validator: PathValidator,
}

impl FileTree {
    pub fn new(entries: Vec<FileEntry>, validator: PathValidator) -> Self {
        let mut tree = Self { nodes: Vec::new(), roots: Vec::new(), validator };
        for entry in entries {
            let id = tree.push(TreeNode::new(entry, None));
            tree.roots.push(id);
        }
        tree
    }

    fn push(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    /// Children loaded so far; empty for unexpanded or leaf nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].children.as_deref().unwrap_or(&[])
    }

    /// Distance from the root, following parent indices.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent.0].parent;
        }
        depth
    }

    /// Expands a directory node, listing and sizing its immediate children
    /// on first call. Non-directories are a no-op with no children.
    pub fn expand(&mut self, id: NodeId) -> &[NodeId] {
        if !self.nodes[id.0].is_expandable() {
            return &[];
        }
        if self.nodes[id.0].children.is_none() {
            self.nodes[id.0].is_loading = true;
            let path = self.nodes[id.0].entry.path.clone();
            let entries = walker::list_children(&path, &self.validator);
            let child_ids: Vec<NodeId> = entries
                .into_iter()
                .map(|entry| self.push(TreeNode::new(entry, Some(id))))
                .collect();
            let node = &mut self.nodes[id.0];
            node.children = Some(child_ids);
            node.is_loading = false;
        }
        self.nodes[id.0].is_expanded = true;
        self.children(id)
    }

    pub fn collapse(&mut self, id: NodeId) {
        self.nodes[id.0].is_expanded = false;
    }

    /// Expand on first use, then flip visibility without re-scanning.
    pub fn toggle(&mut self, id: NodeId) {
        if self.nodes[id.0].is_expanded {
            self.collapse(id);
        } else {
            self.expand(id);
        }
    }

    pub fn toggle_selection(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        node.is_selected = !node.is_selected;
    }
}
