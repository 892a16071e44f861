use serde::{Deserialize, Serialize};

pub const CODE_SUCCESS: i32 = 1;

/// Two-field reply used by every JSON endpoint of the file service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteResponse {
    pub code: i32,
    #[serde(default)]
    pub result: String,
}

impl RemoteResponse {
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            code: CODE_SUCCESS,
            result: result.into(),
        }
    }

    pub fn failure(result: impl Into<String>) -> Self {
        Self {
            code: 0,
            result: result.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }
}

/// Operation codes understood by the `fileBrowser` endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[repr(u8)]
pub enum FileBrowserOp {
    List = 1,
    CreateFile = 2,
    CreateFolder = 3,
    Delete = 4,
    Copy = 5,
    Rename = 6,
    Move = 7,
    View = 9,
    CopyAs = 14,
    LazyList = 20,
}

impl FileBrowserOp {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Form fields of a `fileBrowser` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileBrowserRequest {
    pub opt: u8,
    pub dir: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filename: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub files: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub newfilename: String,
}

impl FileBrowserRequest {
    pub fn new(op: FileBrowserOp, dir: impl Into<String>) -> Self {
        Self {
            opt: op.code(),
            dir: dir.into(),
            ..Default::default()
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn files(mut self, files: impl Into<String>) -> Self {
        self.files = files.into();
        self
    }

    pub fn newfilename(mut self, newfilename: impl Into<String>) -> Self {
        self.newfilename = newfilename.into();
        self
    }
}
