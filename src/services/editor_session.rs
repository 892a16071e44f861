use crate::handlers::errors::{CommandError, CommandResult};
use crate::models::{SyntaxMode, TabId, TabSnapshot};
use crate::services::gate::RequestGate;
use crate::services::layout::{TabLayout, TabWidths};
use crate::services::notifier::Notifier;
use crate::services::persistence::TabListWriter;
use crate::services::registry::{
    EditorBuffer, EditorFactory, SessionRegistry, TabSession, UnsavedGuard,
};
use crate::services::remote::RemoteFileService;
use crate::utils::{is_directory_path, lock};
use std::sync::{Arc, Mutex};

pub const TOO_MANY_TABS: &str = "Sorry! We cannot add more item, please close unused tab";
pub const BUILDOUT_NOT_FOUND: &str =
    "Can not found part [buildout]! Please make sure that you have a cfg file";

const BUILDOUT_SECTION: &str = "[buildout]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new tab was created and its content loaded.
    Opened(TabId),
    /// The file was already open; its tab was selected.
    Activated(TabId),
    /// Directory path, or another request is in flight.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Nothing to save, or a save is already running.
    Skipped,
}

struct EditorState {
    registry: SessionRegistry,
    unsaved: UnsavedGuard,
    bar_width: u32,
    widths: Option<TabWidths>,
}

/// Opens, saves, closes and switches editor tabs.
///
/// State sits behind a mutex that is never held across an `.await`, so a
/// save can be requested while another one is still waiting on the
/// service; the per-session busy flag turns the second one into a no-op.
#[derive(Clone)]
pub struct EditorSessionManager {
    state: Arc<Mutex<EditorState>>,
    remote: Arc<dyn RemoteFileService>,
    factory: Arc<dyn EditorFactory>,
    notifier: Arc<dyn Notifier>,
    gate: Arc<RequestGate>,
    layout: TabLayout,
    tab_list: TabListWriter,
}

impl EditorSessionManager {
    pub fn new(
        remote: Arc<dyn RemoteFileService>,
        factory: Arc<dyn EditorFactory>,
        notifier: Arc<dyn Notifier>,
        gate: Arc<RequestGate>,
        layout: TabLayout,
        tab_list: TabListWriter,
    ) -> Self {
        let bar_width = layout.settings().tab_bar_width;
        Self {
            state: Arc::new(Mutex::new(EditorState {
                registry: SessionRegistry::new(),
                unsaved: UnsavedGuard::default(),
                bar_width,
                widths: None,
            })),
            remote,
            factory,
            notifier,
            gate,
            layout,
            tab_list,
        }
    }

    /// Opens `path` in a new tab, or selects the tab already showing it.
    ///
    /// The tab is created right away in a loading state so the strip and
    /// the persisted tab list reflect it while the content is fetched. A
    /// failed read removes the tab again and raises an error notice.
    ///
    /// # Arguments
    ///
    /// * `path` - Workspace path of the file to open
    ///
    /// # Returns
    ///
    /// * `Ok(OpenOutcome::Opened)` - A new tab was created and filled
    /// * `Ok(OpenOutcome::Activated)` - The file was already open
    /// * `Ok(OpenOutcome::Ignored)` - `path` is a directory, or a request
    ///   holds the global gate
    /// * `Err(CommandError::CapacityError)` - The strip has no room left
    pub async fn open(&self, path: &str) -> CommandResult<OpenOutcome> {
        if is_directory_path(path) || self.gate.is_busy() {
            log::debug!("Ignoring open request for {}", path);
            return Ok(OpenOutcome::Ignored);
        }

        let id = {
            let mut state = lock(&self.state);
            if let Some(existing) = state.registry.find(path) {
                activate(&mut state.registry, existing);
                return Ok(OpenOutcome::Activated(existing));
            }
            if state.registry.len() >= self.layout.max_tabs(state.bar_width) {
                self.notifier.info(TOO_MANY_TABS);
                return Err(CommandError::capacity(TOO_MANY_TABS));
            }

            let pending = self
                .layout
                .resize_tabs(state.bar_width, state.registry.len(), true);
            if pending.is_some() {
                state.widths = pending;
            }
            let id = state.registry.allocate_id(path);
            let buffer = self.factory.create(id, path);
            state.registry.insert(TabSession::loading(id, path, buffer));
            activate(&mut state.registry, id);
            self.tab_list.schedule(state.registry.paths());
            id
        };
        log::info!("Opening {} in tab {}", path, id);

        match self.remote.read_file(path).await {
            Ok(content) => {
                let mut state = lock(&self.state);
                match state.registry.get_mut(id) {
                    Some(session) if session.path == path => {
                        let mode = SyntaxMode::for_path(path);
                        session.buffer.set_value(&content);
                        session.buffer.set_mode(&mode);
                        session.mode = mode;
                        session.title = session.file_name().to_string();
                        session.busy = false;
                    }
                    _ => log::warn!("Tab {} disappeared while {} was loading", id, path),
                }
                Ok(OpenOutcome::Opened(id))
            }
            Err(e) => {
                log::error!("Failed to open {}: {}", path, e);
                self.notifier
                    .error(&format!("Unable to open file: {}\n{}", path, e));
                let mut state = lock(&self.state);
                self.discard(&mut state, id);
                Err(e.into())
            }
        }
    }

    /// Reopens the tabs of a previous session, in order.
    pub async fn restore(&self, paths: &[String]) -> Vec<TabId> {
        let mut opened = Vec::new();
        for path in paths {
            match self.open(path).await {
                Ok(OpenOutcome::Opened(id)) | Ok(OpenOutcome::Activated(id)) => opened.push(id),
                Ok(OpenOutcome::Ignored) => {}
                Err(e) => log::warn!("Could not restore tab {}: {}", path, e),
            }
        }
        opened
    }

    /// Pushes the buffer of `id` to the service if it has unsaved changes.
    ///
    /// The session is flagged busy for the duration of the request, which
    /// makes a second save of the same tab a no-op and blocks closing it.
    /// On success the dirty marker is cleared and the unsaved counter drops
    /// by one; on failure both stay as they were.
    ///
    /// # Returns
    ///
    /// * `Ok(SaveOutcome::Saved)` - The service stored the content
    /// * `Ok(SaveOutcome::Skipped)` - The tab is clean or already saving
    /// * `Err(CommandError)` - Unknown tab, or the service refused the write
    pub async fn save(&self, id: TabId) -> CommandResult<SaveOutcome> {
        let (path, content) = {
            let mut state = lock(&self.state);
            let session = state
                .registry
                .get_mut(id)
                .ok_or_else(|| CommandError::not_found(format!("tab {}", id)))?;
            if !session.dirty || session.busy {
                return Ok(SaveOutcome::Skipped);
            }
            session.busy = true;
            (session.path.clone(), session.buffer.value())
        };
        log::info!("Saving {}", path);

        let result = self.remote.write_file(&path, &content).await;

        let mut state = lock(&self.state);
        let saved = result.is_ok();
        if let Some(session) = state.registry.get_mut(id) {
            session.busy = false;
            if saved {
                session.mark_clean();
            }
        }
        if saved {
            state.unsaved.release();
        }
        drop(state);

        match result {
            Ok(()) => Ok(SaveOutcome::Saved),
            Err(e) => {
                log::error!("Failed to save {}: {}", path, e);
                self.notifier.error(&e.to_string());
                Err(e.into())
            }
        }
    }

    pub async fn save_active(&self) -> CommandResult<SaveOutcome> {
        match self.active() {
            Some(id) => self.save(id).await,
            None => Ok(SaveOutcome::Skipped),
        }
    }

    /// Closes a tab and destroys its buffer.
    ///
    /// When the closed tab was active, the tab to its left becomes active
    /// (or the new first tab when it sat at index 0). A dirty tab gives
    /// back its share of the unsaved counter.
    ///
    /// # Errors
    ///
    /// `BusyError` while the tab is loading or saving, `NotFound` for an
    /// unknown id.
    pub fn close(&self, id: TabId) -> CommandResult<()> {
        let mut state = lock(&self.state);
        let session = state
            .registry
            .get(id)
            .ok_or_else(|| CommandError::not_found(format!("tab {}", id)))?;
        if session.busy {
            let message = format!("{} is being saved, please wait", session.file_name());
            self.notifier.alert(&message);
            return Err(CommandError::busy(message));
        }
        log::info!("Closing {}", session.path);
        self.discard(&mut state, id);
        Ok(())
    }

    /// Removes a session, moving activation to a neighbour first.
    fn discard(&self, state: &mut EditorState, id: TabId) {
        let Some(index) = state.registry.position(id) else {
            return;
        };
        let was_active = state.registry.at(index).map(|s| s.active).unwrap_or(false);
        if was_active && state.registry.len() > 1 {
            let neighbour = if index == 0 { 1 } else { index - 1 };
            if let Some(next) = state.registry.at(neighbour).map(|s| s.id) {
                activate(&mut state.registry, next);
            }
        }

        if let Some(mut session) = state.registry.remove(id) {
            session.buffer.destroy();
            if session.dirty {
                state.unsaved.release();
            }
        }
        self.relayout(state);
        self.tab_list.schedule(state.registry.paths());
    }

    pub fn switch_active(&self, id: TabId) -> CommandResult<()> {
        let mut state = lock(&self.state);
        if state.registry.get(id).is_none() {
            return Err(CommandError::not_found(format!("tab {}", id)));
        }
        activate(&mut state.registry, id);
        Ok(())
    }

    /// Records a buffer mutation reported by the editor widget.
    pub fn content_changed(&self, id: TabId) -> bool {
        let mut state = lock(&self.state);
        let Some(session) = state.registry.get_mut(id) else {
            return false;
        };
        if session.busy || session.dirty {
            return false;
        }
        session.mark_dirty();
        state.unsaved.acquire();
        true
    }

    /// Replaces the buffer text as a user edit would.
    pub fn edit(&self, id: TabId, content: &str) -> CommandResult<()> {
        {
            let mut state = lock(&self.state);
            let session = state
                .registry
                .get_mut(id)
                .ok_or_else(|| CommandError::not_found(format!("tab {}", id)))?;
            session.buffer.set_value(content);
        }
        self.content_changed(id);
        Ok(())
    }

    /// Adds a `develop =` entry listing `projects` below the `[buildout]`
    /// header of the active buffer.
    ///
    /// The projects are first resolved to real paths by the service. The
    /// buffer is read again once the reply arrives, so edits made while
    /// waiting are kept.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The entry was inserted and the tab marked dirty
    /// * `Ok(false)` - Nothing to add, no active tab, or the tab is busy
    /// * `Err(CommandError::ValidationError)` - No `[buildout]` section
    pub async fn add_develop(&self, projects: &[String]) -> CommandResult<bool> {
        if projects.is_empty() {
            return Ok(false);
        }
        let id = {
            let state = lock(&self.state);
            let Some(id) = state.registry.active() else {
                return Ok(false);
            };
            let Some(session) = state.registry.get(id) else {
                return Ok(false);
            };
            if session.busy {
                return Ok(false);
            }
            if buildout_header_end(&session.buffer.value()).is_none() {
                self.notifier.alert(BUILDOUT_NOT_FOUND);
                return Err(CommandError::validation(BUILDOUT_NOT_FOUND));
            }
            id
        };

        let resolved = match self.remote.get_path(projects).await {
            Ok(resolved) => resolved,
            Err(e) => {
                log::error!("Could not resolve develop paths: {}", e);
                self.notifier.error(&e.to_string());
                return Err(e.into());
            }
        };
        if resolved.is_empty() {
            return Ok(false);
        }

        let updated = self
            .with_buffer(id, |buffer| {
                let content = insert_develop(&buffer.value(), &resolved)?;
                buffer.set_value(&content);
                Some(())
            })
            .flatten();
        if updated.is_none() {
            log::warn!("Tab {} lost its [buildout] section while paths were resolved", id);
            self.notifier.alert(BUILDOUT_NOT_FOUND);
            return Err(CommandError::validation(BUILDOUT_NOT_FOUND));
        }
        log::info!("Added {} develop path(s) to tab {}", resolved.len(), id);
        self.content_changed(id);
        Ok(true)
    }

    /// Runs `f` against the buffer of `id`.
    pub fn with_buffer<R>(&self, id: TabId, f: impl FnOnce(&mut dyn EditorBuffer) -> R) -> Option<R> {
        let mut state = lock(&self.state);
        state
            .registry
            .get_mut(id)
            .map(|session| f(&mut *session.buffer))
    }

    pub fn content(&self, id: TabId) -> Option<String> {
        self.with_buffer(id, |buffer| buffer.value())
    }

    /// The tab strip width changed.
    pub fn set_bar_width(&self, width: u32) {
        let mut state = lock(&self.state);
        state.bar_width = width;
        self.relayout(&mut state);
    }

    fn relayout(&self, state: &mut EditorState) {
        if let Some(widths) = self
            .layout
            .resize_tabs(state.bar_width, state.registry.len(), false)
        {
            state.widths = Some(widths);
        }
    }

    pub fn max_tabs(&self) -> usize {
        let state = lock(&self.state);
        self.layout.max_tabs(state.bar_width)
    }

    pub fn widths(&self) -> Option<TabWidths> {
        lock(&self.state).widths
    }

    pub fn active(&self) -> Option<TabId> {
        lock(&self.state).registry.active()
    }

    pub fn active_path(&self) -> Option<String> {
        let state = lock(&self.state);
        let id = state.registry.active()?;
        state.registry.get(id).map(|s| s.path.clone())
    }

    pub fn find(&self, path: &str) -> Option<TabId> {
        lock(&self.state).registry.find(path)
    }

    pub fn len(&self) -> usize {
        lock(&self.state).registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tab_paths(&self) -> Vec<String> {
        lock(&self.state).registry.paths()
    }

    pub fn unsaved_count(&self) -> usize {
        lock(&self.state).unsaved.count()
    }

    /// Message to show before leaving the page, if anything is unsaved.
    pub fn navigation_warning(&self) -> Option<&'static str> {
        lock(&self.state).unsaved.warning()
    }

    pub fn snapshot(&self, id: TabId) -> Option<TabSnapshot> {
        self.tabs().into_iter().find(|tab| tab.id == id)
    }

    pub fn tabs(&self) -> Vec<TabSnapshot> {
        let state = lock(&self.state);
        let count = state.registry.len();
        state
            .registry
            .iter()
            .enumerate()
            .map(|(index, session)| {
                let width = match state.widths {
                    Some(w) if index + 1 == count => w.last,
                    Some(w) => w.each,
                    None => 0,
                };
                TabSnapshot {
                    id: session.id,
                    path: session.path.clone(),
                    title: session.title.clone(),
                    dirty: session.dirty,
                    busy: session.busy,
                    active: session.active,
                    width,
                }
            })
            .collect()
    }

    pub fn tab_list(&self) -> &TabListWriter {
        &self.tab_list
    }
}

/// Inserts a `develop =` block after the `[buildout]` header line.
///
/// Returns `None` when `content` has no `[buildout]` section.
pub fn insert_develop(content: &str, paths: &[String]) -> Option<String> {
    let at = buildout_header_end(content)?;
    let mut block = String::from("\ndevelop =");
    for path in paths {
        block.push_str("\n\t");
        block.push_str(path);
    }
    let mut result = String::with_capacity(content.len() + block.len());
    result.push_str(&content[..at]);
    result.push_str(&block);
    result.push_str(&content[at..]);
    Some(result)
}

/// Byte offset of the end of the `[buildout]` header line.
fn buildout_header_end(content: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let text = line.trim_end_matches(['\r', '\n']);
        if text.trim() == BUILDOUT_SECTION {
            return Some(offset + text.len());
        }
        offset += line.len();
    }
    None
}

fn activate(registry: &mut SessionRegistry, id: TabId) {
    if registry.get(id).map(|s| s.active).unwrap_or(true) {
        return;
    }
    if let Some(previous) = registry.active() {
        if let Some(session) = registry.get_mut(previous) {
            session.active = false;
        }
    }
    if let Some(session) = registry.get_mut(id) {
        session.active = true;
        session.buffer.resize();
    }
}
