use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an open tab, derived from the file path.
///
/// The value is the 32-bit string hash used by the tab strip (`31 * h + c`
/// over UTF-16 code units, wrapping). Collisions are possible, so the
/// registry always compares the path as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(i32);

impl TabId {
    pub fn of(path: &str) -> Self {
        let hash = path
            .encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));
        Self(hash)
    }

    pub fn from_raw(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Syntax highlighting mode selected for a buffer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyntaxMode {
    pub name: String,
    pub mode: String,
}

impl SyntaxMode {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: format!("ace/mode/{}", name),
        }
    }

    pub fn text() -> Self {
        Self::named("text")
    }

    /// Picks a mode from the file name or its extension.
    pub fn for_path(path: &str) -> Self {
        let file_name = crate::utils::file_name(path);
        let by_name = match file_name {
            "Makefile" | "makefile" | "GNUmakefile" => Some("makefile"),
            "Dockerfile" => Some("dockerfile"),
            _ => None,
        };
        if let Some(name) = by_name {
            return Self::named(name);
        }

        let extension = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
            _ => return Self::text(),
        };
        let name = match extension.as_str() {
            "py" => "python",
            "js" => "javascript",
            "json" => "json",
            "cfg" | "ini" | "conf" => "ini",
            "sh" | "bash" => "sh",
            "html" | "htm" | "pt" => "html",
            "css" => "css",
            "xml" | "zcml" | "rss" => "xml",
            "md" | "markdown" => "markdown",
            "rs" => "rust",
            "yml" | "yaml" => "yaml",
            "toml" => "toml",
            "c" | "h" | "cc" | "cpp" | "hpp" => "c_cpp",
            "rb" => "ruby",
            "php" => "php",
            "sql" => "sql",
            "java" => "java",
            "go" => "golang",
            "in" | "jinja2" | "j2" => "django",
            _ => "text",
        };
        Self::named(name)
    }
}

impl Default for SyntaxMode {
    fn default() -> Self {
        Self::text()
    }
}

/// Read-only view of a tab, handed to renderers and tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabSnapshot {
    pub id: TabId,
    pub path: String,
    pub title: String,
    pub dirty: bool,
    pub busy: bool,
    pub active: bool,
    pub width: u32,
}

/// Content returned by the read-only viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewedFile {
    pub title: String,
    pub content: String,
    pub mode: SyntaxMode,
}
