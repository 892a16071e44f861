use crate::handlers::errors::{CommandError, CommandResult};
use crate::models::{CloneForm, CloneRequest, CloneStatus, SecurityMode};
use crate::services::account::{is_valid_email, is_valid_name};
use crate::services::notifier::Notifier;
use crate::services::remote::RemoteFileService;
use crate::utils::{join_path, lock};
use regex::Regex;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const CLONE_SUCCESS: &str = "Your repository is cloned!";
const HTTPS_PREFIX: &str = "https://";

fn repository_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9./:~@_\-]+$").expect("valid url regex"))
}

/// Builds the clone request from the form, checking fields in display order.
/// HTTPS credentials end up inside the repository URL.
pub fn validate_clone(form: &CloneForm, workdir: &str) -> CommandResult<CloneRequest> {
    let mut repo = form.repository_url.clone();
    if repo.is_empty() || !repository_url_pattern().is_match(&repo) {
        return Err(CommandError::validation("Invalid url for the repository"));
    }
    if form.project_name.is_empty() || !is_valid_name(&form.project_name) {
        return Err(CommandError::validation("Invalid project name"));
    }
    if !form.email.is_empty() && !is_valid_email(&form.email) {
        return Err(CommandError::validation("Please enter a valid email adress!"));
    }

    if form.mode == SecurityMode::Https {
        if form.username.is_empty() || !is_valid_name(&form.username) {
            return Err(CommandError::validation("Please enter a correct username"));
        }
        if form.password.is_empty() {
            return Err(CommandError::validation("Please enter your password"));
        }
        let Some(rest) = repo.strip_prefix(HTTPS_PREFIX) else {
            return Err(CommandError::validation(
                "The URL of your repository should start with 'https://'",
            ));
        };
        repo = format!("{}{}:{}@{}", HTTPS_PREFIX, form.username, form.password, rest);
    } else if repo.starts_with(HTTPS_PREFIX) {
        return Err(CommandError::validation(
            "Please select HTTPS Security Mode for this repository",
        ));
    }

    Ok(CloneRequest {
        repo,
        name: join_path(workdir, &form.project_name),
        email: form.email.clone(),
        user: form.user_name.clone(),
    })
}

#[derive(Default)]
struct CloneState {
    task: Option<JoinHandle<()>>,
    /// Bumped on every start and abort; a run only settles its own generation.
    generation: u64,
    last_result: Option<CommandResult<String>>,
}

/// Clone button behaviour: the first press starts a clone, a press while
/// cloning aborts it.
#[derive(Clone)]
pub struct CloneService {
    remote: Arc<dyn RemoteFileService>,
    notifier: Arc<dyn Notifier>,
    workdir: String,
    state: Arc<Mutex<CloneState>>,
    status: Arc<watch::Sender<CloneStatus>>,
}

impl CloneService {
    pub fn new(
        remote: Arc<dyn RemoteFileService>,
        notifier: Arc<dyn Notifier>,
        workdir: &str,
    ) -> Self {
        let (status, _) = watch::channel(CloneStatus::Idle);
        Self {
            remote,
            notifier,
            workdir: workdir.to_string(),
            state: Arc::new(Mutex::new(CloneState::default())),
            status: Arc::new(status),
        }
    }

    pub fn status(&self) -> CloneStatus {
        *self.status.borrow()
    }

    /// Outcome of the last clone that ran to completion.
    pub fn last_result(&self) -> Option<CommandResult<String>> {
        lock(&self.state).last_result.clone()
    }

    /// Starts a clone, or aborts the running one. Returns the new status.
    pub fn toggle(&self, form: &CloneForm) -> CommandResult<CloneStatus> {
        if self.status() == CloneStatus::Cloning {
            self.abort();
            return Ok(CloneStatus::Idle);
        }

        let request = match validate_clone(form, &self.workdir) {
            Ok(request) => request,
            Err(e) => {
                self.notifier.alert(&e.to_string());
                return Err(e);
            }
        };
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| CommandError::internal(format!("No async runtime: {}", e)))?;

        let mut state = lock(&self.state);
        state.generation += 1;
        let generation = state.generation;
        self.status.send_replace(CloneStatus::Cloning);
        let service = self.clone();
        state.task = Some(handle.spawn(async move {
            service.run(request, generation).await;
        }));
        Ok(CloneStatus::Cloning)
    }

    async fn run(&self, request: CloneRequest, generation: u64) {
        let result = self.remote.clone_repository(&request).await;
        let outcome = match result {
            Ok(message) => {
                log::info!("Repository cloned into {}", request.name);
                self.notifier.confirm(CLONE_SUCCESS);
                Ok(message)
            }
            Err(e) => {
                log::error!("Clone into {} failed: {}", request.name, e);
                self.notifier.error(&e.to_string());
                Err(CommandError::from(e))
            }
        };
        self.settle(generation, outcome);
    }

    /// Records the outcome of run `generation` and goes back to idle.
    ///
    /// # Returns
    ///
    /// `false` when the run was aborted or superseded by a newer one, in
    /// which case nothing changes.
    pub(crate) fn settle(&self, generation: u64, outcome: CommandResult<String>) -> bool {
        let mut state = lock(&self.state);
        if state.generation != generation {
            log::debug!("Dropping outcome of stale clone run {}", generation);
            return false;
        }
        state.last_result = Some(outcome);
        state.task = None;
        self.status.send_replace(CloneStatus::Idle);
        true
    }

    /// Cancels the in-flight clone request, if any.
    pub fn abort(&self) {
        let mut state = lock(&self.state);
        state.generation += 1;
        if let Some(task) = state.task.take() {
            task.abort();
            log::info!("Clone request cancelled");
        }
        self.status.send_replace(CloneStatus::Idle);
    }

    /// Resolves once no clone is running.
    pub async fn wait_idle(&self) {
        let mut receiver = self.status.subscribe();
        let result = receiver
            .wait_for(|status| *status == CloneStatus::Idle)
            .await
            .map(|_| ());
        if let Err(e) = result {
            log::debug!("Clone status channel closed: {}", e);
        }
    }
}
