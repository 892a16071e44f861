// Utility functions for path handling and persisted list encoding

/// Separator used for lists kept in the client store.
pub const LIST_SEPARATOR: char = '#';

/// Last path component, splitting on `/`, `\` and `:`.
pub fn file_name(path: &str) -> &str {
    match path.rfind(['/', '\\', ':']) {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Directory part of `path`, trailing slash included (`"a/b/c"` -> `"a/b/"`).
pub fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(index) => path[..=index].to_string(),
        None => "/".to_string(),
    }
}

pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Directory paths are the ones ending with a slash.
pub fn is_directory_path(path: &str) -> bool {
    path.ends_with('/')
}

pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Locks a mutex, recovering the data if a previous holder panicked.
pub fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
