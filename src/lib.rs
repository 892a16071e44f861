// Modules
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

pub use config::{load_config, EditorConfig};
pub use handlers::errors::{CommandError, CommandResult};
pub use handlers::{ActionResult, Workbench};

/// Installs the `env_logger` backend, honouring `RUST_LOG` and defaulting
/// to `info`. Safe to call more than once.
pub fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    if let Err(e) = builder.try_init() {
        log::debug!("Logger already initialised: {}", e);
    }
}
