use crate::models::{SyntaxMode, TabId};
use crate::utils::file_name;

pub const LOADING_TITLE: &str = "Loading file...";
pub const UNSAVED_MARKER: char = '*';
pub const UNSAVED_WARNING: &str =
    "You have unsaved changes. Your changes will be lost if you don't save them";

/// Text buffer of an embedded code editor.
pub trait EditorBuffer: Send {
    fn value(&self) -> String;

    fn set_value(&mut self, content: &str);

    fn set_mode(&mut self, mode: &SyntaxMode);

    /// Called when the buffer becomes visible again.
    fn resize(&mut self) {}

    /// Releases the widget. The buffer is dropped right after.
    fn destroy(&mut self) {}
}

/// Creates a buffer for every new tab.
pub trait EditorFactory: Send + Sync {
    fn create(&self, id: TabId, path: &str) -> Box<dyn EditorBuffer>;
}

/// Plain in-memory buffer, for headless use.
#[derive(Debug, Default, Clone)]
pub struct TextBuffer {
    content: String,
    mode: SyntaxMode,
}

impl TextBuffer {
    pub fn mode(&self) -> &SyntaxMode {
        &self.mode
    }
}

impl EditorBuffer for TextBuffer {
    fn value(&self) -> String {
        self.content.clone()
    }

    fn set_value(&mut self, content: &str) {
        self.content = content.to_string();
    }

    fn set_mode(&mut self, mode: &SyntaxMode) {
        self.mode = mode.clone();
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextBufferFactory;

impl EditorFactory for TextBufferFactory {
    fn create(&self, _id: TabId, _path: &str) -> Box<dyn EditorBuffer> {
        Box::new(TextBuffer::default())
    }
}

/// Editor state of one open file.
pub struct TabSession {
    pub id: TabId,
    pub path: String,
    pub title: String,
    pub mode: SyntaxMode,
    pub buffer: Box<dyn EditorBuffer>,
    pub dirty: bool,
    pub busy: bool,
    pub active: bool,
}

impl TabSession {
    /// A tab whose content is still being fetched.
    pub fn loading(id: TabId, path: &str, buffer: Box<dyn EditorBuffer>) -> Self {
        Self {
            id,
            path: path.to_string(),
            title: LOADING_TITLE.to_string(),
            mode: SyntaxMode::text(),
            buffer,
            dirty: false,
            busy: true,
            active: false,
        }
    }

    pub fn file_name(&self) -> &str {
        file_name(&self.path)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.title = format!("{}{}", UNSAVED_MARKER, self.title);
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
        if let Some(stripped) = self.title.strip_prefix(UNSAVED_MARKER) {
            self.title = stripped.to_string();
        }
    }
}

impl std::fmt::Debug for TabSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabSession")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("title", &self.title)
            .field("dirty", &self.dirty)
            .field("busy", &self.busy)
            .field("active", &self.active)
            .finish()
    }
}

/// Open tabs in strip order. The registry owns every session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<TabSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TabSession> {
        self.sessions.iter()
    }

    pub fn get(&self, id: TabId) -> Option<&TabSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: TabId) -> Option<&mut TabSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn position(&self, id: TabId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    pub fn at(&self, index: usize) -> Option<&TabSession> {
        self.sessions.get(index)
    }

    /// The session holding `path`, compared by path and not by hash.
    pub fn find(&self, path: &str) -> Option<TabId> {
        self.sessions.iter().find(|s| s.path == path).map(|s| s.id)
    }

    /// Identifier for a new session on `path`. Starts from the path hash and
    /// steps past ids already taken by a different path.
    pub fn allocate_id(&self, path: &str) -> TabId {
        let mut id = TabId::of(path);
        while self.get(id).is_some() {
            log::warn!("Tab id {} already used, probing next for {}", id, path);
            id = TabId::from_raw(id.value().wrapping_add(1));
        }
        id
    }

    pub fn insert(&mut self, session: TabSession) {
        self.sessions.push(session);
    }

    pub fn remove(&mut self, id: TabId) -> Option<TabSession> {
        let index = self.position(id)?;
        Some(self.sessions.remove(index))
    }

    pub fn active(&self) -> Option<TabId> {
        self.sessions.iter().find(|s| s.active).map(|s| s.id)
    }

    pub fn paths(&self) -> Vec<String> {
        self.sessions.iter().map(|s| s.path.clone()).collect()
    }
}

/// Process-wide count of sessions with unsaved changes; while nonzero the
/// host should warn before navigating away.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UnsavedGuard {
    count: usize,
}

impl UnsavedGuard {
    pub fn acquire(&mut self) {
        if self.count == 0 {
            log::debug!("Navigation warning armed");
        }
        self.count += 1;
    }

    pub fn release(&mut self) {
        self.count = self.count.saturating_sub(1);
        if self.count == 0 {
            log::debug!("Navigation warning disarmed");
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_armed(&self) -> bool {
        self.count > 0
    }

    pub fn warning(&self) -> Option<&'static str> {
        self.is_armed().then_some(UNSAVED_WARNING)
    }
}
