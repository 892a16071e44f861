//! In-memory collaborators shared by the test modules.

use crate::config::LayoutSettings;
use crate::models::{AccountUpdate, CloneRequest, SyntaxMode, TabId, TreeEntry};
use crate::services::*;
use crate::utils::{join_path, lock};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// File service double: serves files and listings from memory, records
/// every call and fails the operations it is told to.
#[derive(Default)]
pub struct FakeRemote {
    files: Mutex<HashMap<String, String>>,
    listings: Mutex<HashMap<String, Vec<TreeEntry>>>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, RemoteError>>,
    save_hold: Mutex<Option<Arc<Notify>>>,
    clone_hold: Mutex<Option<Arc<Notify>>>,
    browser_hold: Mutex<Option<Arc<Notify>>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        lock(&self.files).insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_listing(self, dir: &str, entries: Vec<TreeEntry>) -> Self {
        lock(&self.listings).insert(dir.to_string(), entries);
        self
    }

    pub fn fail(&self, operation: &'static str, error: RemoteError) {
        lock(&self.failures).insert(operation, error);
    }

    pub fn heal(&self, operation: &'static str) {
        lock(&self.failures).remove(operation);
    }

    /// Makes every write wait until the returned handle is notified.
    pub fn hold_saves(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *lock(&self.save_hold) = Some(Arc::clone(&notify));
        notify
    }

    pub fn hold_clones(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *lock(&self.clone_hold) = Some(Arc::clone(&notify));
        notify
    }

    /// Makes delete, rename, copy and move wait until notified.
    pub fn hold_browser(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *lock(&self.browser_hold) = Some(Arc::clone(&notify));
        notify
    }

    async fn browser_wait(&self) {
        let hold = lock(&self.browser_hold).clone();
        if let Some(hold) = hold {
            hold.notified().await;
        }
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Number of calls to `operation`.
    pub fn count(&self, operation: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.split(' ').next() == Some(operation))
            .count()
    }

    pub fn content(&self, path: &str) -> Option<String> {
        lock(&self.files).get(path).cloned()
    }

    fn record(&self, operation: &'static str, detail: String) -> RemoteResult<()> {
        lock(&self.calls).push(format!("{} {}", operation, detail));
        match lock(&self.failures).get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteFileService for FakeRemote {
    async fn read_file(&self, path: &str) -> RemoteResult<String> {
        self.record("read_file", path.to_string())?;
        self.content(path).ok_or_else(|| RemoteError::Transport {
            status: Some(404),
            body: String::new(),
        })
    }

    async fn write_file(&self, path: &str, content: &str) -> RemoteResult<()> {
        self.record("write_file", path.to_string())?;
        let hold = lock(&self.save_hold).clone();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        lock(&self.files).insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn md5sum(&self, path: &str) -> RemoteResult<String> {
        self.record("md5sum", path.to_string())?;
        Ok(format!("{:032x}", self.content(path).unwrap_or_default().len()))
    }

    async fn list_directory(&self, dir: &str, key: &str) -> RemoteResult<Vec<TreeEntry>> {
        self.record("list_directory", format!("{} {}", dir, key))?;
        Ok(lock(&self.listings).get(dir).cloned().unwrap_or_default())
    }

    async fn create_file(&self, dir: &str, name: &str) -> RemoteResult<()> {
        self.record("create_file", format!("{} {}", dir, name))
    }

    async fn create_folder(&self, dir: &str, name: &str) -> RemoteResult<()> {
        self.record("create_folder", format!("{} {}", dir, name))
    }

    async fn delete(&self, dir: &str, files: &[String]) -> RemoteResult<()> {
        self.record("delete", format!("{} {}", dir, files.join(FILES_SEPARATOR)))?;
        self.browser_wait().await;
        Ok(())
    }

    async fn rename(&self, path: &str, dir: &str, new_name: &str) -> RemoteResult<()> {
        self.record("rename", format!("{} {} {}", path, dir, new_name))?;
        self.browser_wait().await;
        Ok(())
    }

    async fn copy(&self, sources: &[String], dest_dir: &str) -> RemoteResult<()> {
        self.record("copy", format!("{} {}", sources.join(FILES_SEPARATOR), dest_dir))?;
        self.browser_wait().await;
        Ok(())
    }

    async fn move_items(&self, sources: &[String], dest_dir: &str) -> RemoteResult<()> {
        self.record("move_items", format!("{} {}", sources.join(FILES_SEPARATOR), dest_dir))?;
        self.browser_wait().await;
        Ok(())
    }

    async fn copy_as(&self, dir: &str, name: &str, new_name: &str) -> RemoteResult<()> {
        self.record("copy_as", format!("{} {} {}", dir, name, new_name))
    }

    async fn view_file(&self, dir: &str, name: &str) -> RemoteResult<String> {
        self.record("view_file", format!("{} {}", dir, name))?;
        Ok(self.content(&join_path(dir, name)).unwrap_or_default())
    }

    async fn clone_repository(&self, request: &CloneRequest) -> RemoteResult<String> {
        self.record("clone_repository", format!("{} {}", request.repo, request.name))?;
        let hold = lock(&self.clone_hold).clone();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        Ok("cloned".to_string())
    }

    async fn get_path(&self, files: &[String]) -> RemoteResult<Vec<String>> {
        self.record("get_path", files.join("#"))?;
        Ok(files
            .iter()
            .map(|file| join_path("/srv/slapgrid", file.trim_start_matches('/')))
            .collect())
    }

    async fn update_account(&self, account: &AccountUpdate, existing: bool) -> RemoteResult<()> {
        self.record(
            "update_account",
            format!("{} existing={} password={}", account.username, existing, !account.password.is_empty()),
        )
    }
}

/// Editor widget double counting lifecycle calls.
#[derive(Default, Clone)]
pub struct CountingFactory {
    pub destroyed: Arc<AtomicUsize>,
    pub resized: Arc<AtomicUsize>,
}

struct CountingBuffer {
    content: String,
    destroyed: Arc<AtomicUsize>,
    resized: Arc<AtomicUsize>,
}

impl EditorBuffer for CountingBuffer {
    fn value(&self) -> String {
        self.content.clone()
    }

    fn set_value(&mut self, content: &str) {
        self.content = content.to_string();
    }

    fn set_mode(&mut self, _mode: &SyntaxMode) {}

    fn resize(&mut self) {
        self.resized.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&mut self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

impl EditorFactory for CountingFactory {
    fn create(&self, _id: TabId, _path: &str) -> Box<dyn EditorBuffer> {
        Box::new(CountingBuffer {
            content: String::new(),
            destroyed: Arc::clone(&self.destroyed),
            resized: Arc::clone(&self.resized),
        })
    }
}

pub fn file_entry(dir: &str, title: &str, key: &str) -> TreeEntry {
    TreeEntry {
        title: title.to_string(),
        key: key.to_string(),
        folder: false,
        lazy: false,
        path: join_path(dir, title),
        children: Vec::new(),
    }
}

pub fn folder_entry(dir: &str, title: &str, key: &str) -> TreeEntry {
    TreeEntry {
        folder: true,
        lazy: true,
        ..file_entry(dir, title, key)
    }
}

/// Pieces of an editor wired to fakes.
pub struct EditorFixture {
    pub manager: EditorSessionManager,
    pub remote: Arc<FakeRemote>,
    pub notices: NoticeQueue,
    pub store: Arc<MemoryStore>,
    pub gate: Arc<RequestGate>,
    pub factory: CountingFactory,
}

pub fn editor_fixture(remote: FakeRemote) -> EditorFixture {
    let remote = Arc::new(remote);
    let notices = NoticeQueue::new();
    let store = Arc::new(MemoryStore::new());
    let gate = Arc::new(RequestGate::new());
    let factory = CountingFactory::default();
    let tab_list = TabListWriter::new(store.clone(), Duration::from_millis(20));
    let manager = EditorSessionManager::new(
        remote.clone(),
        Arc::new(factory.clone()),
        Arc::new(notices.clone()),
        Arc::clone(&gate),
        TabLayout::new(LayoutSettings::default()),
        tab_list,
    );
    EditorFixture {
        manager,
        remote,
        notices,
        store,
        gate,
        factory,
    }
}
