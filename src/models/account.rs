use serde::{Deserialize, Serialize};

/// Raw fields of the account settings form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub recovery_code: String,
    /// An account already exists; the password may then be left empty.
    pub has_account: bool,
}

/// Validated account fields as posted to the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountUpdate {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub rcode: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SecurityMode {
    #[default]
    None,
    Ssh,
    Https,
}

/// Raw fields of the repository clone form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CloneForm {
    pub repository_url: String,
    pub project_name: String,
    pub user_name: String,
    pub email: String,
    pub mode: SecurityMode,
    pub username: String,
    pub password: String,
}

/// Validated clone request as posted to the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CloneRequest {
    pub repo: String,
    pub name: String,
    pub email: String,
    pub user: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CloneStatus {
    #[default]
    Idle,
    Cloning,
}
