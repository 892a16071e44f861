pub mod errors;

use crate::config::EditorConfig;
use crate::models::*;
use crate::services::*;
use crate::utils::{join_path, lock};
use errors::{CommandError, CommandResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a tree action produced, for the host to render.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    Done,
    Opened(OpenOutcome),
    Viewed(ViewedFile),
    Checksum(Option<String>),
    Favorite(Option<usize>),
    /// The action does not apply to the node.
    Ignored,
}

/// Command facade over the editor, the file tree, favourites and the forms.
/// One instance lives for the whole page session.
pub struct Workbench {
    config: EditorConfig,
    notifier: Arc<dyn Notifier>,
    editor: EditorSessionManager,
    tree: TreeController,
    favorites: Mutex<Favorites>,
    account: AccountService,
    cloning: CloneService,
}

impl Workbench {
    pub fn new(
        config: EditorConfig,
        remote: Arc<dyn RemoteFileService>,
        factory: Arc<dyn EditorFactory>,
        store: Arc<dyn ClientStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let gate = Arc::new(RequestGate::new());
        let tab_list = TabListWriter::new(
            Arc::clone(&store),
            Duration::from_millis(config.persistence.tab_list_debounce_ms),
        );
        let editor = EditorSessionManager::new(
            Arc::clone(&remote),
            factory,
            Arc::clone(&notifier),
            Arc::clone(&gate),
            TabLayout::new(config.layout),
            tab_list,
        );
        let tree = TreeController::new(
            &config.workspace.current_project(),
            Arc::clone(&remote),
            Arc::clone(&notifier),
            gate,
        );
        let favorites = Favorites::load(store, Arc::clone(&notifier));
        let account = AccountService::new(Arc::clone(&remote), Arc::clone(&notifier));
        let cloning = CloneService::new(remote, Arc::clone(&notifier), &config.workspace.workdir);

        Self {
            config,
            notifier,
            editor,
            tree,
            favorites: Mutex::new(favorites),
            account,
            cloning,
        }
    }

    /// Wires the HTTP file service and the JSON file store from `config`.
    pub fn connect(
        config: EditorConfig,
        factory: Arc<dyn EditorFactory>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let remote = Arc::new(HttpFileService::new(&config.server)?);
        let store = Arc::new(FileStore::open(&config.persistence.store_path)?);
        log::info!(
            "Connected to {} with store {}",
            config.server.base_url,
            store.path().display()
        );
        Ok(Self::new(config, remote, factory, store, notifier))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn editor(&self) -> &EditorSessionManager {
        &self.editor
    }

    pub fn tree(&self) -> &TreeController {
        &self.tree
    }

    // Session start

    /// Reopens the tabs of the previous session and lists the tree root.
    pub async fn start(&self) -> CommandResult<Vec<TabId>> {
        let paths = self.editor.tab_list().load();
        log::info!("Starting workbench, restoring {} tab(s)", paths.len());
        let opened = self.editor.restore(&paths).await;
        if let Err(e) = self.tree.load_root().await {
            log::warn!("Could not list {}: {}", self.tree.base_path(), e);
        }
        Ok(opened)
    }

    /// Writes pending state before the host goes away.
    pub fn shutdown(&self) -> CommandResult<()> {
        log::info!("Shutting down workbench");
        self.cloning.abort();
        self.editor.tab_list().flush().map_err(CommandError::from)
    }

    // Editor handlers

    pub async fn open_file(&self, path: &str) -> CommandResult<OpenOutcome> {
        log::info!("Open file requested: {}", path);
        self.editor.open(path).await
    }

    pub async fn save(&self, id: TabId) -> CommandResult<SaveOutcome> {
        log::info!("Save requested for tab {}", id);
        self.editor.save(id).await
    }

    /// Ctrl-S on the active tab.
    pub async fn save_active(&self) -> CommandResult<SaveOutcome> {
        self.editor.save_active().await
    }

    pub fn close_tab(&self, id: TabId) -> CommandResult<()> {
        log::info!("Close requested for tab {}", id);
        self.editor.close(id)
    }

    pub fn switch_tab(&self, id: TabId) -> CommandResult<()> {
        self.editor.switch_active(id)
    }

    pub fn content_changed(&self, id: TabId) -> bool {
        self.editor.content_changed(id)
    }

    pub fn resize_tab_bar(&self, width: u32) {
        log::debug!("Tab bar resized to {}px", width);
        self.editor.set_bar_width(width);
    }

    pub fn tabs(&self) -> Vec<TabSnapshot> {
        self.editor.tabs()
    }

    pub fn navigation_warning(&self) -> Option<&'static str> {
        self.editor.navigation_warning()
    }

    /// Checksum of the file in the active tab.
    pub async fn md5_active(&self) -> CommandResult<Option<String>> {
        let Some(path) = self.editor.active_path() else {
            return Ok(None);
        };
        self.tree.md5sum(&path).await
    }

    /// Lists the checked workspace projects as `develop` entries of the
    /// buildout file in the active tab.
    pub async fn add_develop(&self, projects: &[String]) -> CommandResult<bool> {
        let paths: Vec<String> = projects
            .iter()
            .map(|project| join_path(&self.config.workspace.workdir, project))
            .collect();
        log::info!("Adding {} develop project(s)", paths.len());
        self.editor.add_develop(&paths).await
    }

    // File tree handlers

    pub async fn tree_action(&self, node: NodeId, action: TreeAction) -> CommandResult<ActionResult> {
        log::info!("Tree action {:?} on {:?}", action, node);
        let folder = self.tree.is_folder(node)?;
        match action {
            TreeAction::Edit | TreeAction::View | TreeAction::Md5sum | TreeAction::Favorite
                if folder =>
            {
                Ok(ActionResult::Ignored)
            }
            TreeAction::NewFile(_) | TreeAction::NewFolder(_) | TreeAction::Refresh
            | TreeAction::Paste
                if !folder =>
            {
                Ok(ActionResult::Ignored)
            }
            TreeAction::Edit => {
                let path = self.tree.node_path(node)?;
                self.editor.open(&path).await.map(ActionResult::Opened)
            }
            TreeAction::Favorite => {
                let path = self.tree.node_path(node)?;
                let added = lock(&self.favorites).add(&path);
                added.map(ActionResult::Favorite)
            }
            TreeAction::View => self.tree.view(node).await.map(ActionResult::Viewed),
            TreeAction::Md5sum => {
                let path = self.tree.node_path(node)?;
                self.tree.md5sum(&path).await.map(ActionResult::Checksum)
            }
            TreeAction::Refresh => self.tree.refresh(node).await.map(|_| ActionResult::Done),
            TreeAction::Copy => self.tree.copy(node).map(|_| ActionResult::Done),
            TreeAction::Cut => self.tree.cut(node).map(|_| ActionResult::Done),
            TreeAction::Paste => self.tree.paste(node).await.map(|_| ActionResult::Done),
            TreeAction::NewFile(name) => self.tree.create_file(node, &name).await.map(done_if),
            TreeAction::NewFolder(name) => {
                self.tree.create_folder(node, &name).await.map(done_if)
            }
            TreeAction::Delete => self.tree.delete(node).await.map(|_| ActionResult::Done),
            TreeAction::Rename(name) => {
                self.tree.rename(node, &name).await.map(|_| ActionResult::Done)
            }
        }
    }

    pub async fn handle_tree_key(
        &self,
        node: NodeId,
        key: TreeKey,
        ctrl: bool,
    ) -> CommandResult<KeyOutcome> {
        let outcome = self.tree.handle_key(key, ctrl);
        if let KeyOutcome::Action(action) = &outcome {
            self.tree_action(node, action.clone()).await?;
        }
        Ok(outcome)
    }

    pub fn switch_tree_root(&self) -> TreeRoot {
        self.tree.switch_root()
    }

    // Favourites handlers

    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        let entries = lock(&self.favorites).entries();
        if entries.is_empty() {
            self.notifier.info(EMPTY_FAVORITES_MESSAGE);
        }
        entries
    }

    pub fn add_active_to_favorites(&self) -> CommandResult<Option<usize>> {
        match self.editor.active_path() {
            Some(path) => lock(&self.favorites).add(&path),
            None => Ok(None),
        }
    }

    pub async fn open_favorite(&self, index: usize) -> CommandResult<OpenOutcome> {
        let path = lock(&self.favorites)
            .get(index)
            .map(str::to_string)
            .ok_or_else(|| CommandError::not_found(format!("favourite #{}", index)))?;
        self.editor.open(&path).await
    }

    pub fn remove_favorite(&self, index: usize) -> CommandResult<String> {
        lock(&self.favorites).remove(index)
    }

    // Account and clone handlers

    pub async fn submit_account(&self, form: &AccountForm) -> CommandResult<SubmitOutcome> {
        log::info!("Account form submitted for {}", form.username);
        self.account.submit(form).await
    }

    /// Clone button: starts a clone, or stops the running one.
    pub fn toggle_clone(&self, form: &CloneForm) -> CommandResult<CloneStatus> {
        log::info!("Clone button pressed");
        self.cloning.toggle(form)
    }

    pub fn clone_status(&self) -> CloneStatus {
        self.cloning.status()
    }

    pub async fn wait_for_clone(&self) -> Option<CommandResult<String>> {
        self.cloning.wait_idle().await;
        self.cloning.last_result()
    }
}

fn done_if(applied: bool) -> ActionResult {
    if applied {
        ActionResult::Done
    } else {
        ActionResult::Ignored
    }
}
