use crate::handlers::errors::{CommandError, CommandResult};
use crate::models::{AccountForm, AccountUpdate};
use crate::services::gate::RequestGate;
use crate::services::notifier::Notifier;
use crate::services::remote::RemoteFileService;
use regex::Regex;
use std::sync::{Arc, OnceLock};

pub const MIN_CREDENTIAL_LENGTH: usize = 6;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid name regex"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([a-zA-Z0-9_.\-])+@(([a-zA-Z0-9\-])+\.)+([a-zA-Z0-9]{2,4})+$")
            .expect("valid email regex")
    })
}

fn recovery_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid recovery code regex"))
}

/// User names, project names and passwords share one character set.
pub fn is_valid_name(value: &str) -> bool {
    name_pattern().is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value)
}

/// Checks the account form field by field and stops at the first problem.
pub fn validate_account(form: &AccountForm) -> CommandResult<AccountUpdate> {
    if form.username.is_empty() || !is_valid_name(&form.username) {
        return Err(CommandError::validation("Invalid user name. Please check it!"));
    }
    if form.username.chars().count() < MIN_CREDENTIAL_LENGTH {
        return Err(CommandError::validation(
            "Username must have at least 6 characters",
        ));
    }
    if form.name.is_empty() {
        return Err(CommandError::validation("Please enter your name and surname!"));
    }
    if !is_valid_email(&form.email) {
        return Err(CommandError::validation("Please enter a valid email adress!"));
    }
    if !form.has_account && !is_valid_name(&form.password) {
        return Err(CommandError::validation("Please enter your new password!"));
    }

    let has_password = !form.password.is_empty();
    if has_password {
        if form.password.chars().count() < MIN_CREDENTIAL_LENGTH {
            return Err(CommandError::validation(
                "The password must have at least 6 characters",
            ));
        }
        if !is_valid_name(&form.password) {
            return Err(CommandError::validation("Please enter your new password!"));
        }
        if form.password != form.confirm_password {
            return Err(CommandError::validation("your password does not match!"));
        }
    }
    if !recovery_code_pattern().is_match(&form.recovery_code) {
        return Err(CommandError::validation(
            "Please enter your password recovery code.",
        ));
    }

    Ok(AccountUpdate {
        name: form.name.clone(),
        username: form.username.clone(),
        email: form.email.clone(),
        password: if has_password {
            form.password.clone()
        } else {
            String::new()
        },
        rcode: form.recovery_code.clone(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// A previous submission is still waiting for its answer.
    Ignored,
}

pub struct AccountService {
    remote: Arc<dyn RemoteFileService>,
    notifier: Arc<dyn Notifier>,
    in_flight: RequestGate,
}

impl AccountService {
    pub fn new(remote: Arc<dyn RemoteFileService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            remote,
            notifier,
            in_flight: RequestGate::new(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_busy()
    }

    pub async fn submit(&self, form: &AccountForm) -> CommandResult<SubmitOutcome> {
        let update = match validate_account(form) {
            Ok(update) => update,
            Err(e) => {
                self.notifier.alert(&e.to_string());
                return Err(e);
            }
        };
        let Some(_guard) = self.in_flight.try_begin() else {
            log::debug!("Account submission already in flight");
            return Ok(SubmitOutcome::Ignored);
        };

        match self.remote.update_account(&update, form.has_account).await {
            Ok(()) => {
                log::info!("Account settings saved for {}", update.username);
                Ok(SubmitOutcome::Submitted)
            }
            Err(e) => {
                log::error!("Account update failed: {}", e);
                self.notifier.error(&e.to_string());
                Err(e.into())
            }
        }
    }
}
