use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Folder,
}

/// One entry of a directory listing as sent by the file service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeEntry {
    pub title: String,
    pub key: String,
    #[serde(default)]
    pub folder: bool,
    #[serde(default)]
    pub lazy: bool,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeEntry>,
}

impl TreeEntry {
    pub fn kind(&self) -> NodeKind {
        if self.folder {
            NodeKind::Folder
        } else {
            NodeKind::File
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub key: String,
    pub title: String,
    pub path: String,
    pub kind: NodeKind,
    pub expanded: bool,
    /// `false` until the children of a lazy folder have been fetched.
    pub loaded: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// In-memory model of the displayed file tree.
///
/// Nodes live in an arena; removed slots stay empty so ids handed out to
/// callers never point at a different node later.
#[derive(Debug, Clone)]
pub struct FileTree {
    root_path: String,
    root_key: String,
    nodes: Vec<Option<TreeNode>>,
    by_key: HashMap<String, NodeId>,
    root: NodeId,
}

impl FileTree {
    pub fn new(root_path: &str, root_key: &str) -> Self {
        let root = TreeNode {
            key: root_key.to_string(),
            title: crate::utils::file_name(root_path).to_string(),
            path: root_path.to_string(),
            kind: NodeKind::Folder,
            expanded: true,
            loaded: false,
            parent: None,
            children: Vec::new(),
        };
        let mut by_key = HashMap::new();
        by_key.insert(root_key.to_string(), NodeId(0));
        Self {
            root_path: root_path.to_string(),
            root_key: root_key.to_string(),
            nodes: vec![Some(root)],
            by_key,
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn find_by_key(&self, key: &str) -> Option<NodeId> {
        self.by_key.get(key).copied()
    }

    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.as_ref().map(|n| n.path == path).unwrap_or(false))
            .map(|(index, _)| NodeId(index))
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// True when `id` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Appends entries (and their nested children) below `parent`.
    pub fn add_children(&mut self, parent: NodeId, entries: Vec<TreeEntry>) -> Vec<NodeId> {
        let mut added = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(id) = self.insert_entry(parent, entry) {
                added.push(id);
            }
        }
        if let Some(node) = self.get_mut(parent) {
            node.loaded = true;
        }
        added
    }

    fn insert_entry(&mut self, parent: NodeId, entry: TreeEntry) -> Option<NodeId> {
        self.get(parent)?;
        let id = NodeId(self.nodes.len());
        let nested = entry.children;
        let node = TreeNode {
            kind: if entry.folder { NodeKind::Folder } else { NodeKind::File },
            key: entry.key,
            title: entry.title,
            path: entry.path,
            expanded: false,
            loaded: !entry.lazy || !nested.is_empty(),
            parent: Some(parent),
            children: Vec::new(),
        };
        if let Some(previous) = self.by_key.insert(node.key.clone(), id) {
            log::debug!("Tree key {} re-bound from {:?} to {:?}", node.key, previous, id);
        }
        self.nodes.push(Some(node));
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.push(id);
        }
        for child in nested {
            self.insert_entry(id, child);
        }
        Some(id)
    }

    /// Replaces the children of `parent` with a fresh listing.
    pub fn replace_children(&mut self, parent: NodeId, entries: Vec<TreeEntry>) -> Vec<NodeId> {
        let old: Vec<NodeId> = self
            .get(parent)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in old {
            self.remove(child);
        }
        self.add_children(parent, entries)
    }

    /// Removes a node together with its subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || self.get(id).is_none() {
            return false;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(parent_node) = self.get_mut(parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        self.drop_subtree(id);
        true
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
            if self.by_key.get(&node.key) == Some(&id) {
                self.by_key.remove(&node.key);
            }
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }

    /// Renames a node and rewrites the path of everything below it.
    pub fn rename(&mut self, id: NodeId, new_title: &str) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        let new_path = format!("{}{}", crate::utils::parent_dir(&node.path), new_title);
        if let Some(node) = self.get_mut(id) {
            node.title = new_title.to_string();
        }
        self.repath(id, &new_path);
        true
    }

    /// Moves a node below `new_parent`, rewriting paths.
    pub fn move_to(&mut self, id: NodeId, new_parent: NodeId) -> bool {
        if id == self.root || id == new_parent || self.is_descendant_of(new_parent, id) {
            return false;
        }
        let (Some(node), Some(target)) = (self.get(id), self.get(new_parent)) else {
            return false;
        };
        let new_path = crate::utils::join_path(&target.path, &node.title);
        if let Some(old_parent) = self.parent(id) {
            if let Some(parent_node) = self.get_mut(old_parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = Some(new_parent);
        }
        if let Some(target) = self.get_mut(new_parent) {
            target.children.push(id);
        }
        self.repath(id, &new_path);
        true
    }

    fn repath(&mut self, id: NodeId, new_path: &str) {
        let children = match self.get_mut(id) {
            Some(node) => {
                node.path = new_path.to_string();
                node.children.clone()
            }
            None => return,
        };
        for child in children {
            let title = match self.get(child) {
                Some(node) => node.title.clone(),
                None => continue,
            };
            let child_path = crate::utils::join_path(new_path, &title);
            self.repath(child, &child_path);
        }
    }

    /// Serializes a subtree back into entries, letting the caller rewrite
    /// each entry (used to mint fresh keys for copies).
    pub fn to_entry<F>(&self, id: NodeId, rewrite: &mut F) -> Option<TreeEntry>
    where
        F: FnMut(&mut TreeEntry),
    {
        let node = self.get(id)?;
        let children = node
            .children
            .iter()
            .filter_map(|child| self.to_entry(*child, rewrite))
            .collect();
        let mut entry = TreeEntry {
            title: node.title.clone(),
            key: node.key.clone(),
            folder: node.is_folder(),
            lazy: node.is_folder() && !node.loaded,
            path: node.path.clone(),
            children,
        };
        rewrite(&mut entry);
        Some(entry)
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        if let Some(node) = self.get_mut(id) {
            node.expanded = expanded;
        }
    }

    pub fn toggle_expanded(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.expanded = !node.expanded;
        }
    }

    pub fn mark_unloaded(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.loaded = false;
        }
    }

    /// Titles of the direct children, in display order.
    pub fn child_titles(&self, id: NodeId) -> Vec<String> {
        self.get(id)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| self.get(*child).map(|n| n.title.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PasteMode {
    Copy,
    Cut,
}

/// The single pending cut/copy awaiting a paste.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ClipboardState {
    #[default]
    Empty,
    Holding { node: NodeId, mode: PasteMode },
}

impl ClipboardState {
    pub fn is_empty(&self) -> bool {
        matches!(self, ClipboardState::Empty)
    }

    pub fn mode(&self) -> Option<PasteMode> {
        match self {
            ClipboardState::Empty => None,
            ClipboardState::Holding { mode, .. } => Some(*mode),
        }
    }
}
