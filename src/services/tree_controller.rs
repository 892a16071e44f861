use crate::handlers::errors::{CommandError, CommandResult};
use crate::models::{
    ClipboardState, FileTree, NodeId, PasteMode, SyntaxMode, TreeEntry, ViewedFile,
};
use crate::services::gate::RequestGate;
use crate::services::notifier::Notifier;
use crate::services::remote::{RemoteError, RemoteFileService};
use crate::utils::{file_name, join_path, lock, parent_dir};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

pub const PROJECT_TREE_KEY: &str = "pfolder";
pub const WORKSPACE_TREE_KEY: &str = "0";
pub const WORKSPACE_TREE_ROOT: &str = "runner_workdir";

pub const EMPTY_CLIPBOARD: &str = "Clipoard is empty. Make a copy first!";
pub const MOVE_INTO_DESCENDANT: &str = "ERROR: Cannot move a node to it's sub node.";
pub const OPERATION_COMPLETE: &str = "Operation complete!";

/// Context menu entries of the file tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MenuItem {
    Edit,
    View,
    Md5sum,
    Favorite,
    Refresh,
    NewFile,
    NewFolder,
    Rename,
    Delete,
    Cut,
    Copy,
    Paste,
}

/// An action picked from the context menu or the keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeAction {
    Cut,
    Copy,
    Paste,
    Edit,
    View,
    Md5sum,
    Refresh,
    NewFolder(String),
    NewFile(String),
    Delete,
    Rename(String),
    Favorite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKey {
    Space,
    Char(char),
    Other,
}

/// What a key press on a tree node leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Run this action on the focused node.
    Action(TreeAction),
    /// Open the context menu on the focused node.
    OpenMenu,
    /// Consumed without effect (a menu is open).
    Swallowed,
    /// Not handled by the tree.
    Ignored,
}

/// Which tree is on screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TreeRoot {
    Project,
    Workspace,
}

struct TreeState {
    project: FileTree,
    workspace: FileTree,
    root: TreeRoot,
    clipboard: ClipboardState,
    menu_open: bool,
}

impl TreeState {
    fn tree(&self) -> &FileTree {
        match self.root {
            TreeRoot::Project => &self.project,
            TreeRoot::Workspace => &self.workspace,
        }
    }

    /// The tree a request was issued against, whichever one is on screen now.
    fn tree_for(&mut self, root: TreeRoot) -> &mut FileTree {
        match root {
            TreeRoot::Project => &mut self.project,
            TreeRoot::Workspace => &mut self.workspace,
        }
    }

    fn release_clipboard(&mut self, root: TreeRoot, id: NodeId) {
        if self.root == root
            && matches!(self.clipboard, ClipboardState::Holding { node, .. } if node == id)
        {
            self.clipboard = ClipboardState::Empty;
        }
    }
}

/// Node fields captured before a request, so no lock is held while waiting.
#[derive(Debug, Clone)]
struct NodeInfo {
    root: TreeRoot,
    id: NodeId,
    key: String,
    title: String,
    path: String,
    folder: bool,
    parent: Option<NodeId>,
    expanded: bool,
}

/// Maps tree actions onto the file service and keeps the displayed tree
/// in sync with confirmed results only.
#[derive(Clone)]
pub struct TreeController {
    state: Arc<Mutex<TreeState>>,
    remote: Arc<dyn RemoteFileService>,
    notifier: Arc<dyn Notifier>,
    gate: Arc<RequestGate>,
}

impl TreeController {
    pub fn new(
        project_root: &str,
        remote: Arc<dyn RemoteFileService>,
        notifier: Arc<dyn Notifier>,
        gate: Arc<RequestGate>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(TreeState {
                project: FileTree::new(project_root, PROJECT_TREE_KEY),
                workspace: FileTree::new(WORKSPACE_TREE_ROOT, WORKSPACE_TREE_KEY),
                root: TreeRoot::Project,
                clipboard: ClipboardState::Empty,
                menu_open: false,
            })),
            remote,
            notifier,
            gate,
        }
    }

    pub fn current_root(&self) -> TreeRoot {
        lock(&self.state).root
    }

    /// Path shown as "Current work tree".
    pub fn base_path(&self) -> String {
        match self.current_root() {
            TreeRoot::Project => lock(&self.state).project.root_path().to_string(),
            TreeRoot::Workspace => "workspace/".to_string(),
        }
    }

    /// Toggles between the project tree and the whole workspace tree.
    /// A pending cut or copy does not survive the switch.
    pub fn switch_root(&self) -> TreeRoot {
        let mut state = lock(&self.state);
        state.root = match state.root {
            TreeRoot::Project => TreeRoot::Workspace,
            TreeRoot::Workspace => TreeRoot::Project,
        };
        state.clipboard = ClipboardState::Empty;
        log::info!("Current work tree: {:?}", state.root);
        state.root
    }

    /// Runs `f` against the displayed tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&FileTree) -> R) -> R {
        f(lock(&self.state).tree())
    }

    pub fn root(&self) -> NodeId {
        self.with_tree(|tree| tree.root())
    }

    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.with_tree(|tree| tree.find_by_path(path))
    }

    pub fn clipboard(&self) -> ClipboardState {
        lock(&self.state).clipboard.clone()
    }

    pub fn set_menu_open(&self, open: bool) {
        lock(&self.state).menu_open = open;
    }

    fn node_info(&self, id: NodeId) -> CommandResult<NodeInfo> {
        let state = lock(&self.state);
        let tree = state.tree();
        let node = tree
            .get(id)
            .ok_or_else(|| CommandError::not_found(format!("tree node {:?}", id)))?;
        Ok(NodeInfo {
            root: state.root,
            id,
            key: node.key.clone(),
            title: node.title.clone(),
            path: node.path.clone(),
            folder: node.is_folder(),
            parent: node.parent(),
            expanded: node.expanded,
        })
    }

    /// Menu entries that do not apply to `id`.
    pub fn disabled_menu_items(&self, id: NodeId) -> CommandResult<Vec<MenuItem>> {
        let node = self.node_info(id)?;
        Ok(if node.folder {
            vec![MenuItem::Edit, MenuItem::View, MenuItem::Md5sum, MenuItem::Favorite]
        } else {
            vec![MenuItem::NewFile, MenuItem::NewFolder, MenuItem::Refresh, MenuItem::Paste]
        })
    }

    /// Keyboard handling on the focused node.
    pub fn handle_key(&self, key: TreeKey, ctrl: bool) -> KeyOutcome {
        if lock(&self.state).menu_open {
            return KeyOutcome::Swallowed;
        }
        match (key, ctrl) {
            (TreeKey::Space, _) => KeyOutcome::OpenMenu,
            (TreeKey::Char(c), true) => match c.to_ascii_lowercase() {
                'c' => KeyOutcome::Action(TreeAction::Copy),
                'x' => KeyOutcome::Action(TreeAction::Cut),
                'v' => KeyOutcome::Action(TreeAction::Paste),
                _ => KeyOutcome::Ignored,
            },
            _ => KeyOutcome::Ignored,
        }
    }

    /// Fetches the first level of the displayed tree.
    pub async fn load_root(&self) -> CommandResult<usize> {
        let root = self.root();
        self.load_children(root).await
    }

    /// Fetches (or refetches) the children of a folder.
    pub async fn load_children(&self, id: NodeId) -> CommandResult<usize> {
        let node = self.node_info(id)?;
        self.list_into(&node, false).await
    }

    /// Reloads a folder and shows its children.
    pub async fn refresh(&self, id: NodeId) -> CommandResult<usize> {
        let node = self.node_info(id)?;
        self.reload(&node).await
    }

    async fn reload(&self, node: &NodeInfo) -> CommandResult<usize> {
        self.list_into(node, true).await
    }

    async fn list_into(&self, node: &NodeInfo, expand: bool) -> CommandResult<usize> {
        let entries = self
            .remote
            .list_directory(&node.path, &node.key)
            .await
            .map_err(|e| self.report(e))?;
        let mut state = lock(&self.state);
        let tree = state.tree_for(node.root);
        let added = tree.replace_children(node.id, entries);
        if expand {
            tree.set_expanded(node.id, true);
        }
        Ok(added.len())
    }

    pub fn toggle_expanded(&self, id: NodeId) {
        let mut state = lock(&self.state);
        let root = state.root;
        state.tree_for(root).toggle_expanded(id);
    }

    pub fn copy(&self, id: NodeId) -> CommandResult<()> {
        self.hold(id, PasteMode::Copy)
    }

    pub fn cut(&self, id: NodeId) -> CommandResult<()> {
        self.hold(id, PasteMode::Cut)
    }

    fn hold(&self, id: NodeId, mode: PasteMode) -> CommandResult<()> {
        let mut state = lock(&self.state);
        if state.tree().get(id).is_none() {
            return Err(CommandError::not_found(format!("tree node {:?}", id)));
        }
        state.clipboard = ClipboardState::Holding { node: id, mode };
        Ok(())
    }

    /// Pastes the clipboard node into the folder `target`.
    ///
    /// A cut moves the node and is refused locally when `target` is the
    /// node itself or lies below it; the clipboard is kept in that case. A
    /// copy into the node's own folder becomes copy-as under a free name,
    /// and the folder is listed again. Any other copy or move updates the
    /// displayed tree only after the service confirms, in the tree the
    /// request was issued from.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The service confirmed the operation
    /// * `Err(CommandError::ValidationError)` - Empty clipboard, or a cut
    ///   into its own subtree
    /// * `Err(CommandError)` - The service refused or could not be reached
    ///
    /// The clipboard is emptied after every attempt that reached the service.
    pub async fn paste(&self, target: NodeId) -> CommandResult<()> {
        let (source, mode) = match self.clipboard() {
            ClipboardState::Empty => {
                self.notifier.alert(EMPTY_CLIPBOARD);
                return Err(CommandError::validation(EMPTY_CLIPBOARD));
            }
            ClipboardState::Holding { node, mode } => (node, mode),
        };
        let target_info = self.node_info(target)?;
        let source_info = match self.node_info(source) {
            Ok(info) => info,
            Err(e) => {
                lock(&self.state).clipboard = ClipboardState::Empty;
                return Err(e);
            }
        };

        let result = match mode {
            PasteMode::Cut => {
                let into_itself = self.with_tree(|tree| {
                    target == source || tree.is_descendant_of(target, source)
                });
                if into_itself {
                    self.notifier.error(MOVE_INTO_DESCENDANT);
                    return Err(CommandError::validation(MOVE_INTO_DESCENDANT));
                }
                self.paste_moved(&source_info, &target_info).await
            }
            PasteMode::Copy if source_info.parent == Some(target) => {
                self.paste_duplicate(&source_info, &target_info).await
            }
            PasteMode::Copy => self.paste_copied(&source_info, &target_info).await,
        };

        lock(&self.state).clipboard = ClipboardState::Empty;
        result
    }

    async fn paste_moved(&self, source: &NodeInfo, target: &NodeInfo) -> CommandResult<()> {
        self.confirm(
            self.remote
                .move_items(std::slice::from_ref(&source.path), &target.path)
                .await,
        )?;
        let mut state = lock(&self.state);
        let tree = state.tree_for(source.root);
        if target.expanded {
            tree.move_to(source.id, target.id);
        } else {
            tree.remove(source.id);
            tree.mark_unloaded(target.id);
        }
        Ok(())
    }

    async fn paste_copied(&self, source: &NodeInfo, target: &NodeInfo) -> CommandResult<()> {
        self.confirm(
            self.remote
                .copy(std::slice::from_ref(&source.path), &target.path)
                .await,
        )?;
        let mut state = lock(&self.state);
        let tree = state.tree_for(target.root);
        if target.expanded {
            let old_prefix = source.path.clone();
            let new_prefix = join_path(&target.path, &source.title);
            let entry = tree.to_entry(source.id, &mut |entry: &mut TreeEntry| {
                entry.key = uuid::Uuid::new_v4().to_string();
                entry.path = entry.path.replacen(&old_prefix, &new_prefix, 1);
            });
            if let Some(entry) = entry {
                tree.add_children(target.id, vec![entry]);
            }
        } else {
            tree.mark_unloaded(target.id);
        }
        Ok(())
    }

    /// Copy into the source's own folder becomes a duplicate under a free name.
    async fn paste_duplicate(&self, source: &NodeInfo, target: &NodeInfo) -> CommandResult<()> {
        let taken = lock(&self.state).tree_for(target.root).child_titles(target.id);
        let new_name = duplicate_name(&source.title, &taken);
        log::info!("Duplicating {} as {}", source.path, new_name);
        self.confirm(
            self.remote
                .copy_as(&target.path, &source.title, &new_name)
                .await,
        )?;
        self.reload(target).await.map(|_| ())
    }

    pub async fn create_file(&self, parent: NodeId, name: &str) -> CommandResult<bool> {
        if name.is_empty() {
            return Ok(false);
        }
        let node = self.node_info(parent)?;
        self.confirm(self.remote.create_file(&node.path, name).await)?;
        self.reload(&node).await?;
        Ok(true)
    }

    pub async fn create_folder(&self, parent: NodeId, name: &str) -> CommandResult<bool> {
        if name.is_empty() {
            return Ok(false);
        }
        let node = self.node_info(parent)?;
        self.confirm(self.remote.create_folder(&node.path, name).await)?;
        self.reload(&node).await?;
        Ok(true)
    }

    pub async fn delete(&self, id: NodeId) -> CommandResult<()> {
        let node = self.node_info(id)?;
        let dir = parent_dir(&node.path);
        self.confirm(self.remote.delete(&dir, &[node.title.clone()]).await)?;
        let mut state = lock(&self.state);
        state.tree_for(node.root).remove(id);
        state.release_clipboard(node.root, id);
        Ok(())
    }

    pub async fn rename(&self, id: NodeId, new_name: &str) -> CommandResult<()> {
        let node = self.node_info(id)?;
        let dir = parent_dir(&node.path);
        self.confirm(self.remote.rename(&node.path, &dir, new_name).await)?;
        lock(&self.state).tree_for(node.root).rename(id, new_name);
        Ok(())
    }

    /// Read-only content of a file node.
    pub async fn view(&self, id: NodeId) -> CommandResult<ViewedFile> {
        let node = self.node_info(id)?;
        let content = self
            .remote
            .view_file(&parent_dir(&node.path), &node.title)
            .await
            .map_err(|e| self.report(e))?;
        Ok(ViewedFile {
            title: format!("Content of file: {}", node.title),
            mode: SyntaxMode::for_path(&node.path),
            content,
        })
    }

    /// MD5 sum of a file; `None` while another request holds the gate.
    pub async fn md5sum(&self, path: &str) -> CommandResult<Option<String>> {
        let Some(_guard) = self.gate.try_begin() else {
            log::debug!("md5sum for {} skipped, a request is in flight", path);
            return Ok(None);
        };
        let sum = self.remote.md5sum(path).await.map_err(|e| self.report(e))?;
        self.notifier
            .info(&format!("Md5sum for file [{}]: {}", file_name(path), sum));
        Ok(Some(sum))
    }

    pub fn node_path(&self, id: NodeId) -> CommandResult<String> {
        self.node_info(id).map(|node| node.path)
    }

    pub fn is_folder(&self, id: NodeId) -> CommandResult<bool> {
        self.node_info(id).map(|node| node.folder)
    }

    /// Reports the outcome of a mutating request.
    fn confirm(&self, result: Result<(), RemoteError>) -> CommandResult<()> {
        match result {
            Ok(()) => {
                self.notifier.confirm(OPERATION_COMPLETE);
                Ok(())
            }
            Err(RemoteError::Rejected(message)) => {
                log::warn!("File operation rejected: {}", message);
                let message = format!("Error: {}", message);
                self.notifier.error(&message);
                Err(CommandError::remote(message))
            }
            Err(e) => Err(self.report(e)),
        }
    }

    fn report(&self, error: RemoteError) -> CommandError {
        log::error!("File service request failed: {}", error);
        self.notifier.error(&error.to_string());
        error.into()
    }
}

/// First free `<stem>_copy[N]<.ext>` name among `taken`.
pub fn duplicate_name(title: &str, taken: &[String]) -> String {
    let (stem, extension) = match title.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext)),
        _ => (title, String::new()),
    };
    let mut candidate = format!("{}_copy{}", stem, extension);
    let mut counter = 2;
    while taken.iter().any(|name| *name == candidate) {
        candidate = format!("{}_copy{}{}", stem, counter, extension);
        counter += 1;
    }
    candidate
}
